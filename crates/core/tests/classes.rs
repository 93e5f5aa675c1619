use dom_aid::{load, AidConfig, ClassMode, DomAid, Node};
use pretty_assertions::assert_eq;

fn aid_with(mode: ClassMode) -> DomAid {
    let config = AidConfig {
        class_mode: mode,
        ..Default::default()
    };
    load(r#"<div id="target" class="base"></div>"#, config)
}

fn target(aid: &DomAid) -> Node {
    aid.document().query_selector("#target").unwrap()
}

#[test]
fn test_added_classes_are_present_in_both_modes() {
    for mode in [ClassMode::Native, ClassMode::Legacy] {
        let aid = aid_with(mode);
        let el = target(&aid);
        aid.add_class("one  two\tthree x- -y", &el);
        for name in ["base", "one", "two", "three", "x-", "-y"] {
            assert!(aid.has_class(name, &el), "{mode:?}: missing {name}");
        }
        assert!(!aid.has_class("on", &el), "{mode:?}: partial name matched");
    }
}

#[test]
fn test_legacy_add_concatenates_class_string() {
    let aid = aid_with(ClassMode::Legacy);
    let el = target(&aid);
    aid.add_class("base extra", &el);
    // the legacy path does not dedupe
    assert_eq!(el.class_name(), "base base extra");

    let native = aid_with(ClassMode::Native);
    let el = target(&native);
    native.add_class("base extra", &el);
    assert_eq!(el.class_name(), "base extra");
}

#[test]
fn test_remove_class_is_idempotent() {
    for mode in [ClassMode::Native, ClassMode::Legacy] {
        let aid = aid_with(mode);
        let el = target(&aid);
        aid.add_class("keep", &el);
        aid.remove_class("gone", &el);
        assert_eq!(el.class_name(), "base keep", "{mode:?}");
        aid.remove_class("gone", &el);
        assert_eq!(el.class_name(), "base keep", "{mode:?}");
    }
}

#[test]
fn test_legacy_remove_keeps_hyphenated_classes_and_spacing() {
    let aid = aid_with(ClassMode::Legacy);
    let el = target(&aid);
    el.set_class_name("a-b  c");
    aid.remove_class("a", &el);
    assert_eq!(el.class_name(), "a-b  c");
    aid.remove_class("a", &el);
    assert_eq!(el.class_name(), "a-b  c");

    el.set_class_name("a a-b b a c");
    aid.remove_class("a b", &el);
    assert_eq!(el.class_name(), "a-b c");
}

#[test]
fn test_emptied_class_attribute_is_removed() {
    for mode in [ClassMode::Native, ClassMode::Legacy] {
        let aid = aid_with(mode);
        let el = target(&aid);
        aid.add_class("x", &el);
        aid.remove_class(vec!["base", "x"], &el);
        assert!(!el.has_attribute("class"), "{mode:?}: class attribute left behind");
        assert_eq!(el.outer_html(), r#"<div id="target"></div>"#);
    }
}

#[test]
fn test_remove_class_accepts_string_or_list() {
    let aid = aid_with(ClassMode::Native);
    let el = target(&aid);
    aid.add_class("a b c d", &el);
    aid.remove_class("a c", &el);
    assert_eq!(el.class_name(), "base b d");
    aid.remove_class(["b", "d"], &el);
    assert_eq!(el.class_name(), "base");
}

#[test]
fn test_legacy_remove_ignores_case() {
    let aid = aid_with(ClassMode::Legacy);
    let el = target(&aid);
    el.set_class_name("Alpha  beta GAMMA");
    aid.remove_class("alpha gamma", &el);
    assert_eq!(el.class_name(), "beta");
}

#[test]
fn test_toggle_class() {
    let aid = aid_with(ClassMode::Legacy);
    let el = target(&aid);
    aid.toggle_class("open", &el);
    assert!(aid.has_class("open", &el));
    aid.toggle_class("open", &el);
    assert!(!aid.has_class("open", &el));
}

#[test]
fn test_class_helpers_ignore_non_elements() {
    let aid = aid_with(ClassMode::Native);
    let text = Node::new_text("plain");
    aid.add_class("x", &text);
    aid.remove_class("x", &text);
    aid.toggle_class("x", &text);
    assert!(!aid.has_class("x", &text));
    assert_eq!(text.text_content(), "plain");
}
