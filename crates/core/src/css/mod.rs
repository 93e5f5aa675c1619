//! Styles that feed layout.
//!
//! There is no cascade: a node's layout style is its tag default overlaid
//! with its inline `style` attribute.

pub mod declaration;
pub mod selector;

use crate::dom::Node;
use declaration::StyleDeclaration;

/// Computed layout styles for a single element.
/// Only the properties that affect bounding box computation.
#[derive(Debug, Clone)]
pub struct LayoutStyle {
    pub display: Display,
    pub position: Position,

    // Box model
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub min_height: Dimension,
    pub max_width: Dimension,
    pub max_height: Dimension,
    pub margin: Edges,
    pub padding: Edges,
    pub border_width: Edges,

    // Offsets for positioned elements
    pub top: Dimension,
    pub right: Dimension,
    pub bottom: Dimension,
    pub left: Dimension,

    // Flex
    pub flex_direction: FlexDirection,
    pub flex_wrap: bool,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub gap: f32,

    // Text
    pub font_size: f32,
    pub line_height: f32,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            position: Position::Static,
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            min_height: Dimension::Auto,
            max_width: Dimension::Auto,
            max_height: Dimension::Auto,
            margin: Edges::zero(),
            padding: Edges::zero(),
            border_width: Edges::zero(),
            top: Dimension::Auto,
            right: Dimension::Auto,
            bottom: Dimension::Auto,
            left: Dimension::Auto,
            flex_direction: FlexDirection::Row,
            flex_wrap: false,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            gap: 0.0,
            font_size: 16.0,
            line_height: 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Display {
    Block,
    Inline,
    InlineBlock,
    Flex,
    Grid,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Static,
    Relative,
    Absolute,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlexDirection {
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Px(f32),
    Percent(f32),
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub fn zero() -> Self {
        Self::all(0.0)
    }

    pub fn all(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

/// Layout style of an element: tag default, then the `hidden`,
/// `width`/`height` attributes, then the inline style.
pub fn compute_style(node: &Node) -> LayoutStyle {
    let mut style = default_style_for_tag(node.local_name());

    if node.has_attribute("hidden") {
        style.display = Display::None;
    }
    if let Some(w) = node.get_attribute("width").and_then(|v| parse_dimension(&v)) {
        style.width = w;
    }
    if let Some(h) = node.get_attribute("height").and_then(|v| parse_dimension(&v)) {
        style.height = h;
    }

    apply_declarations(&node.style(), &mut style);
    style
}

/// Default layout styles based on HTML tag.
fn default_style_for_tag(tag: &str) -> LayoutStyle {
    let mut style = LayoutStyle::default();

    match tag {
        "a" | "span" | "strong" | "em" | "b" | "i" | "u" | "small" | "sub" | "sup" | "label"
        | "abbr" | "cite" | "code" | "kbd" | "mark" | "q" | "s" | "samp" | "time" | "var" => {
            style.display = Display::Inline;
        }
        "h1" => {
            style.font_size = 32.0;
            style.margin = Edges { top: 21.0, right: 0.0, bottom: 21.0, left: 0.0 };
        }
        "h2" => {
            style.font_size = 24.0;
            style.margin = Edges { top: 19.0, right: 0.0, bottom: 19.0, left: 0.0 };
        }
        "p" => {
            style.margin = Edges { top: 16.0, right: 0.0, bottom: 16.0, left: 0.0 };
        }
        "button" | "select" | "textarea" | "img" => {
            style.display = Display::InlineBlock;
        }
        "input" => {
            style.display = Display::InlineBlock;
            style.width = Dimension::Px(173.0);
            style.height = Dimension::Px(21.0);
        }
        "head" | "meta" | "link" | "title" | "script" | "style" | "noscript" | "template" => {
            style.display = Display::None;
        }
        "body" => {
            style.margin = Edges::all(8.0);
        }
        _ => {}
    }

    style
}

fn apply_declarations(declarations: &StyleDeclaration, style: &mut LayoutStyle) {
    for (property, value) in declarations.iter() {
        let value = value.trim_end_matches("!important").trim();
        match property {
            "display" => {
                style.display = match value {
                    "none" => Display::None,
                    "inline" => Display::Inline,
                    "inline-block" => Display::InlineBlock,
                    "flex" | "inline-flex" => Display::Flex,
                    "grid" | "inline-grid" => Display::Grid,
                    _ => Display::Block,
                };
            }
            "position" => {
                style.position = match value {
                    "relative" => Position::Relative,
                    "absolute" => Position::Absolute,
                    "fixed" => Position::Fixed,
                    _ => Position::Static,
                };
            }
            "width" => set_dimension(&mut style.width, value),
            "height" => set_dimension(&mut style.height, value),
            "min-width" => set_dimension(&mut style.min_width, value),
            "min-height" => set_dimension(&mut style.min_height, value),
            "max-width" => set_dimension(&mut style.max_width, value),
            "max-height" => set_dimension(&mut style.max_height, value),
            "top" => set_dimension(&mut style.top, value),
            "right" => set_dimension(&mut style.right, value),
            "bottom" => set_dimension(&mut style.bottom, value),
            "left" => set_dimension(&mut style.left, value),
            "margin" => style.margin = parse_edges(value),
            "padding" => style.padding = parse_edges(value),
            "border-width" => style.border_width = parse_edges(value),
            "margin-top" => set_px(&mut style.margin.top, value),
            "margin-right" => set_px(&mut style.margin.right, value),
            "margin-bottom" => set_px(&mut style.margin.bottom, value),
            "margin-left" => set_px(&mut style.margin.left, value),
            "padding-top" => set_px(&mut style.padding.top, value),
            "padding-right" => set_px(&mut style.padding.right, value),
            "padding-bottom" => set_px(&mut style.padding.bottom, value),
            "padding-left" => set_px(&mut style.padding.left, value),
            "flex-direction" => {
                style.flex_direction = match value {
                    "row-reverse" => FlexDirection::RowReverse,
                    "column" => FlexDirection::Column,
                    "column-reverse" => FlexDirection::ColumnReverse,
                    _ => FlexDirection::Row,
                };
            }
            "flex-wrap" => style.flex_wrap = value == "wrap",
            "flex-grow" => {
                if let Ok(v) = value.parse() {
                    style.flex_grow = v;
                }
            }
            "flex-shrink" => {
                if let Ok(v) = value.parse() {
                    style.flex_shrink = v;
                }
            }
            "gap" => set_px(&mut style.gap, value),
            "font-size" => set_px(&mut style.font_size, value),
            "line-height" => {
                if let Ok(v) = value.parse::<f32>() {
                    style.line_height = v;
                } else if let Some(v) = parse_px(value) {
                    style.line_height = v / style.font_size;
                }
            }
            _ => {} // not layout-relevant
        }
    }
}

fn set_dimension(target: &mut Dimension, value: &str) {
    if let Some(dim) = parse_dimension(value) {
        *target = dim;
    }
}

fn set_px(target: &mut f32, value: &str) {
    if let Some(v) = parse_px(value) {
        *target = v;
    }
}

fn parse_dimension(value: &str) -> Option<Dimension> {
    let value = value.trim();
    if value == "auto" {
        return Some(Dimension::Auto);
    }
    if let Some(num) = value.strip_suffix('%') {
        return num.trim().parse::<f32>().ok().map(|v| Dimension::Percent(v / 100.0));
    }
    parse_px(value)
        .or_else(|| value.parse::<f32>().ok())
        .map(Dimension::Px)
}

fn parse_px(value: &str) -> Option<f32> {
    let value = value.trim();
    if value == "0" {
        return Some(0.0);
    }
    if let Some(v) = value.strip_suffix("px") {
        return v.trim().parse().ok();
    }
    // 1em/1rem approximated as 16px
    if let Some(v) = value.strip_suffix("rem").or_else(|| value.strip_suffix("em")) {
        return v.trim().parse::<f32>().ok().map(|v| v * 16.0);
    }
    None
}

fn parse_edges(value: &str) -> Edges {
    let parts: Vec<f32> = value
        .split_whitespace()
        .map(|v| parse_px(v).unwrap_or(0.0))
        .collect();

    match *parts.as_slice() {
        [a] => Edges::all(a),
        [v, h] => Edges { top: v, right: h, bottom: v, left: h },
        [t, h, b] => Edges { top: t, right: h, bottom: b, left: h },
        [t, r, b, l] => Edges { top: t, right: r, bottom: b, left: l },
        _ => Edges::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_style_overrides_tag_default() {
        let el = Node::new_element("span");
        el.set_css_text("display: block; width: 50%; margin: 1px 2px");
        let style = compute_style(&el);
        assert_eq!(style.display, Display::Block);
        assert_eq!(style.width, Dimension::Percent(0.5));
        assert_eq!(style.margin, Edges { top: 1.0, right: 2.0, bottom: 1.0, left: 2.0 });
    }

    #[test]
    fn hidden_attribute_removes_from_layout() {
        let el = Node::new_element("div");
        el.set_attribute("hidden", "");
        assert_eq!(compute_style(&el).display, Display::None);
    }

    #[test]
    fn em_and_bare_numbers() {
        assert_eq!(parse_dimension("2em"), Some(Dimension::Px(32.0)));
        assert_eq!(parse_dimension("1.5rem"), Some(Dimension::Px(24.0)));
        assert_eq!(parse_dimension("12"), Some(Dimension::Px(12.0)));
        assert_eq!(parse_dimension("wide"), None);
    }
}
