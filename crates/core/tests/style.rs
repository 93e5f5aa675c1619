use std::collections::BTreeMap;

use dom_aid::{load, AidConfig, DomAid, Node};
use pretty_assertions::assert_eq;

fn setup() -> (DomAid, Node) {
    let aid = load(
        r#"<section><p id="p" data-empty="" title="hello">text</p></section>"#,
        AidConfig::default(),
    );
    let p = aid.document().query_selector("#p").unwrap();
    (aid, p)
}

#[test]
fn test_predicates() {
    let (aid, p) = setup();
    assert!(aid.is_element(&p));
    assert!(!aid.is_element(&p.first_child().unwrap()));
    assert!(!aid.is_element(&aid.document()));
    assert!(aid.is(&p, "P"));
    assert!(aid.is(&p, "p"));
    assert!(!aid.is(&p, "div"));
    assert!(aid.matches(&p, "section > p[title]"));
    assert!(!aid.matches(&p, "div p"));
    assert!(!aid.matches(&p, "p[["));
}

#[test]
fn test_has_attr_treats_empty_value_as_present() {
    let (aid, p) = setup();
    assert_eq!(aid.has_attr("title", &p).as_deref(), Some("hello"));
    assert_eq!(aid.has_attr("data-empty", &p).as_deref(), Some(""));
    assert_eq!(aid.has_attr("missing", &p), None);
    assert_eq!(aid.has_attr("title", &Node::new_text("x")), None);
}

#[test]
fn test_set_style_hyphenates_camel_case() {
    let (aid, p) = setup();
    aid.set_style([("backgroundColor", "blue"), ("width", "20px")], &p);
    assert_eq!(p.style_property("background-color"), "blue");
    assert_eq!(
        p.get_attribute("style").as_deref(),
        Some("background-color: blue; width: 20px;")
    );
}

#[test]
fn test_remove_style_forms() {
    let (aid, p) = setup();
    p.set_css_text("color: red; margin-top: 1px; font-size: 2px; border-top-width: 3px; width: 4px");

    aid.remove_style("color", &p);
    aid.remove_style(["marginTop", "fontSize"], &p);
    let mut rules = BTreeMap::new();
    rules.insert("borderTopWidth".to_string(), "3px".to_string());
    aid.remove_style(&rules, &p);

    assert_eq!(p.get_attribute("style").as_deref(), Some("width: 4px;"));
}

#[test]
fn test_remove_style_splits_whitespace_separated_names() {
    let (aid, p) = setup();
    p.set_css_text("color: red; width: 4px; height: 2px");
    aid.remove_style("color width", &p);
    assert_eq!(p.get_attribute("style").as_deref(), Some("height: 2px;"));
}

#[test]
fn test_remove_style_on_shadow_host_clears_value() {
    let (aid, p) = setup();
    p.attach_shadow().unwrap();
    aid.set_style([("paddingLeft", "4px")], &p);
    aid.remove_style([("paddingLeft", "4px")], &p);
    assert_eq!(p.style_property("padding-left"), "");
}

#[test]
fn test_set_attrs() {
    let (aid, p) = setup();
    aid.set_attrs([("title", "changed"), ("aria-label", "para")], &p);
    assert_eq!(p.get_attribute("title").as_deref(), Some("changed"));
    assert_eq!(p.get_attribute("aria-label").as_deref(), Some("para"));

    let text = p.first_child().unwrap();
    aid.set_attrs([("title", "x")], &text);
    aid.set_style([("color", "red")], &text);
    assert_eq!(p.get_attribute("style"), None);
}

#[test]
fn test_show_clears_display_instead_of_restoring() {
    let (aid, p) = setup();
    p.set_style_property("display", "inline-block");
    aid.hide(&p);
    assert_eq!(p.style_property("display"), "none");
    aid.show(&p);
    assert_eq!(p.style_property("display"), "");
}

#[test]
fn test_hide_list_skips_non_elements() {
    let (aid, p) = setup();
    let section = p.parent_node().unwrap();
    let targets = vec![p.clone(), Node::new_text("t"), section.clone()];
    aid.hide(&targets);
    assert_eq!(p.style_property("display"), "none");
    assert_eq!(section.style_property("display"), "none");
}
