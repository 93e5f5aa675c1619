/// CSS selector matching against the live tree.
/// Supports: tag, universal, .class, #id, attribute selectors with the
/// common operators, descendant/child/sibling combinators, comma lists,
/// and a handful of structural pseudo-classes.
use crate::dom::Node;

/// A comma-separated list of selectors; matches when any member matches.
#[derive(Debug, Clone)]
pub struct SelectorList {
    pub selectors: Vec<Selector>,
}

/// A single selector (one part of a comma-separated list).
#[derive(Debug, Clone)]
pub struct Selector {
    pub parts: Vec<SelectorPart>,
}

/// A component of a selector chain.
#[derive(Debug, Clone)]
pub enum SelectorPart {
    /// Matches a tag name: `div`, `button`, etc.
    Tag(String),
    /// Matches a class: `.foo`
    Class(String),
    /// Matches an ID: `#bar`
    Id(String),
    /// Matches an attribute: `[type]`, `[type="submit"]`, `[class~=x]`
    Attribute(String, Option<(AttrOp, String)>),
    /// Descendant combinator (space)
    Descendant,
    /// Child combinator (>)
    Child,
    /// Next-sibling combinator (+)
    Adjacent,
    /// Subsequent-sibling combinator (~)
    Sibling,
    /// Universal selector (*)
    Universal,
    PseudoClass(PseudoClass),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Root,
    Not(SelectorList),
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

impl SelectorList {
    /// Parse a selector list. `None` when any member is malformed.
    pub fn parse(input: &str) -> Option<Self> {
        let selectors = split_top_level(input)
            .into_iter()
            .map(|s| parse_selector(&s))
            .collect::<Option<Vec<_>>>()?;
        if selectors.is_empty() {
            return None;
        }
        Some(Self { selectors })
    }

    pub fn matches(&self, element: &Node) -> bool {
        element.is_element() && self.selectors.iter().any(|s| s.matches(element))
    }
}

/// Split on commas that are not nested in parentheses, brackets or quotes.
fn split_top_level(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            current.push(c);
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Parse a single selector string into a Selector.
fn parse_selector(input: &str) -> Option<Selector> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            '.' => {
                flush_tag(&mut current, &mut parts);
                chars.next();
                let class_name = read_ident(&mut chars);
                if class_name.is_empty() {
                    return None;
                }
                parts.push(SelectorPart::Class(class_name));
            }
            '#' => {
                flush_tag(&mut current, &mut parts);
                chars.next();
                let id_name = read_ident(&mut chars);
                if id_name.is_empty() {
                    return None;
                }
                parts.push(SelectorPart::Id(id_name));
            }
            '[' => {
                flush_tag(&mut current, &mut parts);
                chars.next();
                parts.push(read_attribute(&mut chars)?);
            }
            ':' => {
                flush_tag(&mut current, &mut parts);
                chars.next();
                // pseudo-elements never match an element
                if chars.peek() == Some(&':') {
                    return None;
                }
                parts.push(SelectorPart::PseudoClass(read_pseudo(&mut chars)?));
            }
            '>' | '+' | '~' => {
                flush_tag(&mut current, &mut parts);
                chars.next();
                skip_whitespace(&mut chars);
                parts.push(match ch {
                    '>' => SelectorPart::Child,
                    '+' => SelectorPart::Adjacent,
                    _ => SelectorPart::Sibling,
                });
            }
            ' ' | '\t' | '\n' | '\r' => {
                flush_tag(&mut current, &mut parts);
                chars.next();
                skip_whitespace(&mut chars);
                // Check if next char is a combinator
                if let Some(&next) = chars.peek() {
                    if next != '>' && next != '+' && next != '~' {
                        parts.push(SelectorPart::Descendant);
                    }
                }
            }
            '*' => {
                flush_tag(&mut current, &mut parts);
                chars.next();
                parts.push(SelectorPart::Universal);
            }
            c if c.is_alphanumeric() || c == '-' || c == '_' => {
                current.push(c);
                chars.next();
            }
            _ => return None,
        }
    }

    flush_tag(&mut current, &mut parts);

    let selector = Selector { parts };
    if selector.is_well_formed() {
        Some(selector)
    } else {
        None
    }
}

fn flush_tag(current: &mut String, parts: &mut Vec<SelectorPart>) {
    let tag = current.trim().to_string();
    if !tag.is_empty() {
        parts.push(SelectorPart::Tag(tag.to_ascii_lowercase()));
        current.clear();
    }
}

fn read_ident(chars: &mut Chars) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

fn skip_whitespace(chars: &mut Chars) {
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else {
            break;
        }
    }
}

/// Reads the rest of `[name op "value"]` after the opening bracket.
fn read_attribute(chars: &mut Chars) -> Option<SelectorPart> {
    skip_whitespace(chars);
    let name = read_ident(chars);
    if name.is_empty() {
        return None;
    }
    skip_whitespace(chars);

    let op = match chars.next()? {
        ']' => return Some(SelectorPart::Attribute(name.to_ascii_lowercase(), None)),
        '=' => AttrOp::Equals,
        c => {
            if chars.next()? != '=' {
                return None;
            }
            match c {
                '~' => AttrOp::Includes,
                '|' => AttrOp::DashMatch,
                '^' => AttrOp::Prefix,
                '$' => AttrOp::Suffix,
                '*' => AttrOp::Substring,
                _ => return None,
            }
        }
    };

    skip_whitespace(chars);
    let mut value = String::new();
    match chars.peek().copied() {
        Some(quote @ ('"' | '\'')) => {
            chars.next();
            loop {
                match chars.next()? {
                    c if c == quote => break,
                    c => value.push(c),
                }
            }
        }
        _ => value = read_ident(chars),
    }
    skip_whitespace(chars);
    if chars.next()? != ']' {
        return None;
    }
    Some(SelectorPart::Attribute(
        name.to_ascii_lowercase(),
        Some((op, value)),
    ))
}

fn read_pseudo(chars: &mut Chars) -> Option<PseudoClass> {
    let name = read_ident(chars).to_ascii_lowercase();
    match name.as_str() {
        "first-child" => Some(PseudoClass::FirstChild),
        "last-child" => Some(PseudoClass::LastChild),
        "only-child" => Some(PseudoClass::OnlyChild),
        "empty" => Some(PseudoClass::Empty),
        "root" => Some(PseudoClass::Root),
        "not" => {
            if chars.next()? != '(' {
                return None;
            }
            let mut depth = 1;
            let mut inner = String::new();
            for c in chars.by_ref() {
                if c == '(' {
                    depth += 1;
                } else if c == ')' {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                inner.push(c);
            }
            if depth != 0 {
                return None;
            }
            SelectorList::parse(&inner).map(PseudoClass::Not)
        }
        _ => None,
    }
}

fn is_combinator(part: &SelectorPart) -> bool {
    matches!(
        part,
        SelectorPart::Descendant | SelectorPart::Child | SelectorPart::Adjacent | SelectorPart::Sibling
    )
}

impl Selector {
    fn is_well_formed(&self) -> bool {
        let (Some(first), Some(last)) = (self.parts.first(), self.parts.last()) else {
            return false;
        };
        if is_combinator(first) || is_combinator(last) {
            return false;
        }
        !self
            .parts
            .windows(2)
            .any(|w| is_combinator(&w[0]) && is_combinator(&w[1]))
    }

    /// Split into compound segments, each paired with the combinator that
    /// follows it.
    fn segments(&self) -> Vec<(Vec<&SelectorPart>, Option<&SelectorPart>)> {
        let mut segments = Vec::new();
        let mut current_segment: Vec<&SelectorPart> = Vec::new();
        for part in &self.parts {
            if is_combinator(part) {
                segments.push((std::mem::take(&mut current_segment), Some(part)));
            } else {
                current_segment.push(part);
            }
        }
        segments.push((current_segment, None));
        segments
    }

    pub fn matches(&self, element: &Node) -> bool {
        let segments = self.segments();
        match_from(&segments, segments.len() - 1, element)
    }
}

/// Match segment `index` against `element`, then the remaining segments
/// (right to left) against its relatives, backtracking where needed.
fn match_from(
    segments: &[(Vec<&SelectorPart>, Option<&SelectorPart>)],
    index: usize,
    element: &Node,
) -> bool {
    if !segment_matches(&segments[index].0, element) {
        return false;
    }
    if index == 0 {
        return true;
    }

    match segments[index - 1].1 {
        Some(SelectorPart::Child) => {
            parent_element(element).is_some_and(|p| match_from(segments, index - 1, &p))
        }
        Some(SelectorPart::Adjacent) => previous_element_sibling(element)
            .is_some_and(|s| match_from(segments, index - 1, &s)),
        Some(SelectorPart::Sibling) => {
            let mut current = previous_element_sibling(element);
            while let Some(sibling) = current {
                if match_from(segments, index - 1, &sibling) {
                    return true;
                }
                current = previous_element_sibling(&sibling);
            }
            false
        }
        _ => {
            let mut current = parent_element(element);
            while let Some(ancestor) = current {
                if match_from(segments, index - 1, &ancestor) {
                    return true;
                }
                current = parent_element(&ancestor);
            }
            false
        }
    }
}

fn parent_element(node: &Node) -> Option<Node> {
    node.parent_node().filter(Node::is_element)
}

fn previous_element_sibling(node: &Node) -> Option<Node> {
    let mut current = node.previous_sibling();
    while let Some(sibling) = current {
        if sibling.is_element() {
            return Some(sibling);
        }
        current = sibling.previous_sibling();
    }
    None
}

fn next_element_sibling(node: &Node) -> Option<Node> {
    let mut current = node.next_sibling();
    while let Some(sibling) = current {
        if sibling.is_element() {
            return Some(sibling);
        }
        current = sibling.next_sibling();
    }
    None
}

fn segment_matches(segment: &[&SelectorPart], element: &Node) -> bool {
    for part in segment {
        let ok = match part {
            SelectorPart::Tag(t) => {
                if element.is_html() {
                    element.local_name() == t
                } else {
                    element.local_name().eq_ignore_ascii_case(t)
                }
            }
            SelectorPart::Class(c) => element.class_list().contains(c),
            SelectorPart::Id(i) => element.get_attribute("id").as_deref() == Some(i.as_str()),
            SelectorPart::Attribute(name, expected) => match element.get_attribute(name) {
                None => false,
                Some(actual) => match expected {
                    None => true,
                    Some((op, value)) => attribute_matches(*op, &actual, value),
                },
            },
            SelectorPart::PseudoClass(pseudo) => pseudo_matches(pseudo, element),
            SelectorPart::Universal => true,
            _ => true, // combinators are handled by match_from
        };
        if !ok {
            return false;
        }
    }
    true
}

fn attribute_matches(op: AttrOp, actual: &str, value: &str) -> bool {
    match op {
        AttrOp::Equals => actual == value,
        AttrOp::Includes => actual.split_whitespace().any(|t| t == value),
        AttrOp::DashMatch => actual == value || actual.starts_with(&format!("{value}-")),
        AttrOp::Prefix => !value.is_empty() && actual.starts_with(value),
        AttrOp::Suffix => !value.is_empty() && actual.ends_with(value),
        AttrOp::Substring => !value.is_empty() && actual.contains(value),
    }
}

fn pseudo_matches(pseudo: &PseudoClass, element: &Node) -> bool {
    match pseudo {
        PseudoClass::FirstChild => {
            parent_element_or_root(element) && previous_element_sibling(element).is_none()
        }
        PseudoClass::LastChild => {
            parent_element_or_root(element) && next_element_sibling(element).is_none()
        }
        PseudoClass::OnlyChild => {
            parent_element_or_root(element)
                && previous_element_sibling(element).is_none()
                && next_element_sibling(element).is_none()
        }
        PseudoClass::Empty => element
            .child_nodes()
            .iter()
            .all(|c| !c.is_element() && !(c.is_text() && !c.text_content().is_empty())),
        PseudoClass::Root => element
            .parent_node()
            .is_some_and(|p| p.node_type() == crate::dom::NodeType::Document),
        PseudoClass::Not(list) => !list.matches(element),
    }
}

/// Structural pseudo-classes need a parent to be meaningful.
fn parent_element_or_root(element: &Node) -> bool {
    element.parent_node().is_some()
}

/// All elements below `root` matching `list`, in tree order.
pub fn select_all(root: &Node, list: &SelectorList) -> Vec<Node> {
    root.descendants()
        .into_iter()
        .filter(|n| list.matches(n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn doc() -> Node {
        parse_html(
            r#"<div id="outer" class="box wide">
                 <ul><li class="a">1</li><li class="b" data-k="x-y">2</li><li>3</li></ul>
                 <p lang="en-US">text</p>
               </div>"#,
        )
    }

    fn ids(nodes: &[Node]) -> Vec<String> {
        nodes.iter().map(|n| n.text_content()).collect()
    }

    #[test]
    fn rejects_malformed_selectors() {
        for bad in ["", "div >", "> p", "a,,b", ".", "#", "p::before", "a:hover", "[x"] {
            assert!(SelectorList::parse(bad).is_none(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn compound_and_descendant() {
        let doc = doc();
        assert_eq!(doc.query_selector_all("div#outer.box.wide").len(), 1);
        assert_eq!(ids(&doc.query_selector_all("div li")), vec!["1", "2", "3"]);
        assert_eq!(ids(&doc.query_selector_all("div > li")), Vec::<String>::new());
        assert_eq!(ids(&doc.query_selector_all("div > ul > li.b")), vec!["2"]);
    }

    #[test]
    fn sibling_combinators() {
        let doc = doc();
        assert_eq!(ids(&doc.query_selector_all("li.a + li")), vec!["2"]);
        assert_eq!(ids(&doc.query_selector_all("li.a ~ li")), vec!["2", "3"]);
    }

    #[test]
    fn attributes_and_pseudo_classes() {
        let doc = doc();
        assert_eq!(ids(&doc.query_selector_all("[data-k|=x]")), vec!["2"]);
        assert_eq!(ids(&doc.query_selector_all("[data-k^='x']")), vec!["2"]);
        assert_eq!(ids(&doc.query_selector_all("li:not(.a, .b)")), vec!["3"]);
        assert_eq!(ids(&doc.query_selector_all("li:first-child")), vec!["1"]);
        assert_eq!(ids(&doc.query_selector_all("li:last-child")), vec!["3"]);
        assert_eq!(doc.query_selector_all(":root").len(), 1);
    }

    #[test]
    fn comma_list_keeps_tree_order() {
        let doc = doc();
        let found = doc.query_selector_all("p, ul");
        let names: Vec<String> = found.iter().map(|n| n.node_name()).collect();
        assert_eq!(names, vec!["UL", "P"]);
    }
}
