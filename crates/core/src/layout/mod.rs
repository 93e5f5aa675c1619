use crate::css;
use crate::dom::{Node, NodeType};
use serde::Serialize;
use taffy::prelude::*;

/// A bounding box, as returned by `getBoundingClientRect`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DomRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DomRect {
    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

struct TreeBuilder<'a> {
    tree: TaffyTree,
    target: &'a Node,
    found: Option<NodeId>,
    viewport_width: f32,
}

impl TreeBuilder<'_> {
    fn build(&mut self, node: &Node, font_size: f32, line_height: f32) -> Option<NodeId> {
        match node.node_type() {
            NodeType::Text => {
                let text = node.text_content();
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                // Text: estimate size from character count
                let char_width = font_size * 0.6;
                let text_width = text.chars().count() as f32 * char_width;
                let style = Style {
                    min_size: Size {
                        width: Dimension::Length(text_width.min(self.viewport_width)),
                        height: Dimension::Auto,
                    },
                    size: Size {
                        width: Dimension::Auto,
                        height: Dimension::Length(font_size * line_height),
                    },
                    ..Default::default()
                };
                self.tree.new_leaf(style).ok()
            }
            NodeType::Element => {
                let style = css::compute_style(node);
                if style.display == css::Display::None {
                    // not rendered; a target in here keeps a zero rect
                    let hidden = Style {
                        display: Display::None,
                        ..Default::default()
                    };
                    return self.tree.new_leaf(hidden).ok();
                }

                // A shadow host renders its shadow tree instead of its children.
                let children = match node.shadow_root() {
                    Some(root) => root.child_nodes(),
                    None => node.child_nodes(),
                };
                let child_ids: Vec<NodeId> = children
                    .iter()
                    .filter_map(|c| self.build(c, style.font_size, style.line_height))
                    .collect();

                let id = self
                    .tree
                    .new_with_children(to_taffy_style(&style), &child_ids)
                    .ok()?;
                if node == self.target {
                    self.found = Some(id);
                }
                Some(id)
            }
            _ => None,
        }
    }
}

/// Lay out `document` in a viewport of the given size and return the
/// page-relative box of `target`. `None` when the target is not rendered
/// (disconnected, or inside a `display: none` subtree).
pub fn bounding_box(
    document: &Node,
    target: &Node,
    viewport_width: f32,
    viewport_height: f32,
) -> Option<DomRect> {
    let root = document.children().into_iter().next()?;

    let mut builder = TreeBuilder {
        tree: TaffyTree::new(),
        target,
        found: None,
        viewport_width,
    };
    let root_id = builder.build(&root, 16.0, 1.2)?;
    let target_id = builder.found?;
    let mut tree = builder.tree;

    tree.compute_layout(
        root_id,
        Size {
            width: AvailableSpace::Definite(viewport_width),
            height: AvailableSpace::Definite(viewport_height),
        },
    )
    .ok()?;

    let layout = tree.layout(target_id).ok()?;
    let mut rect = DomRect {
        x: layout.location.x,
        y: layout.location.y,
        width: layout.size.width,
        height: layout.size.height,
    };
    let mut current = tree.parent(target_id);
    while let Some(id) = current {
        let location = tree.layout(id).ok()?.location;
        rect.x += location.x;
        rect.y += location.y;
        current = tree.parent(id);
    }
    Some(rect)
}

fn to_taffy_style(style: &css::LayoutStyle) -> Style {
    Style {
        display: match style.display {
            css::Display::Block => Display::Block,
            css::Display::Flex => Display::Flex,
            css::Display::Grid => Display::Grid,
            css::Display::None => Display::None,
            // Inline and InlineBlock approximated as Flex for taffy
            css::Display::Inline | css::Display::InlineBlock => Display::Flex,
        },
        position: match style.position {
            css::Position::Relative | css::Position::Static => Position::Relative,
            css::Position::Absolute | css::Position::Fixed => Position::Absolute,
        },
        size: Size {
            width: to_taffy_dim(style.width),
            height: to_taffy_dim(style.height),
        },
        min_size: Size {
            width: to_taffy_dim(style.min_width),
            height: to_taffy_dim(style.min_height),
        },
        max_size: Size {
            width: to_taffy_dim(style.max_width),
            height: to_taffy_dim(style.max_height),
        },
        margin: Rect {
            top: LengthPercentageAuto::Length(style.margin.top),
            right: LengthPercentageAuto::Length(style.margin.right),
            bottom: LengthPercentageAuto::Length(style.margin.bottom),
            left: LengthPercentageAuto::Length(style.margin.left),
        },
        padding: Rect {
            top: LengthPercentage::Length(style.padding.top),
            right: LengthPercentage::Length(style.padding.right),
            bottom: LengthPercentage::Length(style.padding.bottom),
            left: LengthPercentage::Length(style.padding.left),
        },
        border: Rect {
            top: LengthPercentage::Length(style.border_width.top),
            right: LengthPercentage::Length(style.border_width.right),
            bottom: LengthPercentage::Length(style.border_width.bottom),
            left: LengthPercentage::Length(style.border_width.left),
        },
        inset: Rect {
            top: to_taffy_inset(style.top),
            right: to_taffy_inset(style.right),
            bottom: to_taffy_inset(style.bottom),
            left: to_taffy_inset(style.left),
        },
        flex_direction: match style.flex_direction {
            css::FlexDirection::Row => FlexDirection::Row,
            css::FlexDirection::RowReverse => FlexDirection::RowReverse,
            css::FlexDirection::Column => FlexDirection::Column,
            css::FlexDirection::ColumnReverse => FlexDirection::ColumnReverse,
        },
        flex_wrap: if style.flex_wrap {
            FlexWrap::Wrap
        } else {
            FlexWrap::NoWrap
        },
        flex_grow: style.flex_grow,
        flex_shrink: style.flex_shrink,
        gap: Size {
            width: LengthPercentage::Length(style.gap),
            height: LengthPercentage::Length(style.gap),
        },
        ..Default::default()
    }
}

fn to_taffy_dim(dim: css::Dimension) -> Dimension {
    match dim {
        css::Dimension::Px(v) => Dimension::Length(v),
        css::Dimension::Percent(v) => Dimension::Percent(v),
        css::Dimension::Auto => Dimension::Auto,
    }
}

fn to_taffy_inset(dim: css::Dimension) -> LengthPercentageAuto {
    match dim {
        css::Dimension::Px(v) => LengthPercentageAuto::Length(v),
        css::Dimension::Percent(v) => LengthPercentageAuto::Percent(v),
        css::Dimension::Auto => LengthPercentageAuto::Auto,
    }
}
