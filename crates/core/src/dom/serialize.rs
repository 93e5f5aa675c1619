//! HTML serialization for `innerHTML` / `outerHTML`.

use super::{Node, NodeType};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

pub(super) fn serialize_children(node: &Node, out: &mut String) {
    let raw = node.is_html() && RAW_TEXT_ELEMENTS.contains(&node.local_name());
    for child in node.child_nodes() {
        if raw && child.is_text() {
            out.push_str(&child.character_data());
        } else {
            serialize_node(&child, out);
        }
    }
}

pub(super) fn serialize_node(node: &Node, out: &mut String) {
    match node.node_type() {
        NodeType::Element => {
            let tag = node.local_name();
            out.push('<');
            out.push_str(tag);
            for attr in node.attributes() {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');
            if node.is_html() && VOID_ELEMENTS.contains(&tag) {
                return;
            }
            serialize_children(node, out);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeType::Text => escape(&node.character_data(), false, out),
        NodeType::Comment => {
            out.push_str("<!--");
            out.push_str(&node.character_data());
            out.push_str("-->");
        }
        NodeType::Document | NodeType::Fragment | NodeType::ShadowRoot => {
            serialize_children(node, out)
        }
    }
}

fn escape(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::parse_html;

    #[test]
    fn round_trips_body_markup() {
        let doc = parse_html(r#"<div class="a" title='x"y'>1 &lt; 2<br><img src=""></div>"#);
        let body = doc.query_selector("body").unwrap();
        assert_eq!(
            body.inner_html(),
            r#"<div class="a" title="x&quot;y">1 &lt; 2<br><img src=""></div>"#
        );
    }
}
