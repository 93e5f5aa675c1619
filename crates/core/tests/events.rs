use std::cell::RefCell;
use std::rc::Rc;

use dom_aid::event::CustomEventInit;
use dom_aid::window::CustomEventConstructor;
use dom_aid::{
    load, AidConfig, DomAid, DomError, EventData, Node, PayloadRetention, Window, WindowConfig,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

type Seen = Rc<RefCell<Vec<Option<Value>>>>;

fn setup(retention: PayloadRetention) -> DomAid {
    let config = AidConfig {
        payload_retention: retention,
        ..Default::default()
    };
    load(r#"<div id="target"></div>"#, config)
}

fn target(aid: &DomAid) -> Node {
    aid.document().query_selector("#target").unwrap()
}

fn record_detail(node: &Node, name: &str) -> Seen {
    let seen: Seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    node.add_event_listener(name, move |event| sink.borrow_mut().push(event.detail()));
    seen
}

#[test]
fn test_payload_visible_synchronously_then_gone_after_a_turn() {
    for retention in [PayloadRetention::DispatchScoped, PayloadRetention::Deferred] {
        let aid = setup(retention);
        let el = target(&aid);
        let seen = record_detail(&el, "test.foo");

        aid.trigger("test.foo", &el, Some(json!({"a": 1}).into())).unwrap();
        aid.window().run_pending_tasks();
        aid.trigger("test.foo", &el, None).unwrap();

        assert_eq!(*seen.borrow(), vec![Some(json!({"a": 1})), None], "{retention:?}");
    }
}

#[test]
fn test_every_handler_of_a_dispatch_sees_payload() {
    let aid = setup(PayloadRetention::DispatchScoped);
    let el = target(&aid);
    let first = record_detail(&el, "save");
    let second = record_detail(&el, "save");

    aid.trigger("save", &el, Some(json!("doc").into())).unwrap();
    assert_eq!(*first.borrow(), vec![Some(json!("doc"))]);
    assert_eq!(*second.borrow(), vec![Some(json!("doc"))]);
    assert!(!aid.has_payload("save"));
    assert_eq!(aid.window().pending_tasks(), 0);
}

#[test]
fn test_deferred_retention_clears_on_next_turn() {
    let aid = setup(PayloadRetention::Deferred);
    let el = target(&aid);
    let seen = record_detail(&el, "save");

    aid.trigger("save", &el, Some(json!(1).into())).unwrap();
    assert!(aid.has_payload("save"));
    // same turn, no new data: still visible
    aid.trigger("save", &el, None).unwrap();
    assert_eq!(aid.window().run_pending_tasks(), 2);
    assert!(!aid.has_payload("save"));
    aid.trigger("save", &el, None).unwrap();

    assert_eq!(*seen.borrow(), vec![Some(json!(1)), Some(json!(1)), None]);
}

#[test]
fn test_deferred_clear_drops_a_rewritten_payload() {
    let aid = setup(PayloadRetention::Deferred);
    let el = target(&aid);
    let seen = record_detail(&el, "tick");

    aid.trigger("tick", &el, Some(json!(1).into())).unwrap();
    // stored without being read, before the scheduled clear runs
    aid.trigger("tick", &Node::new_element("p"), Some(json!(2).into())).unwrap();
    aid.window().run_pending_tasks();
    aid.trigger("tick", &el, None).unwrap();

    assert_eq!(*seen.borrow(), vec![Some(json!(1)), None]);
}

#[test]
fn test_unread_payload_waits_for_a_reader() {
    let aid = setup(PayloadRetention::DispatchScoped);
    let el = target(&aid);
    aid.trigger("later", &el, Some(json!([1, 2]).into())).unwrap();
    assert!(aid.has_payload("later"));

    let seen = record_detail(&el, "later");
    aid.trigger("later", &el, None).unwrap();
    assert_eq!(*seen.borrow(), vec![Some(json!([1, 2]))]);
}

#[test]
fn test_null_data_keeps_stored_payload() {
    let aid = setup(PayloadRetention::DispatchScoped);
    let el = target(&aid);
    aid.trigger("n", &el, Some(json!("kept").into())).unwrap();
    let seen = record_detail(&el, "n");
    aid.trigger("n", &el, Some(Value::Null.into())).unwrap();
    assert_eq!(*seen.borrow(), vec![Some(json!("kept"))]);
}

#[test]
fn test_lazy_payload_is_evaluated_per_read() {
    let aid = setup(PayloadRetention::DispatchScoped);
    let el = target(&aid);
    let reads = Rc::new(RefCell::new(0));
    let counter = reads.clone();
    let data = EventData::lazy(move || {
        *counter.borrow_mut() += 1;
        json!(*counter.borrow())
    });
    let first = record_detail(&el, "lazy");
    let second = record_detail(&el, "lazy");

    aid.trigger("lazy", &el, Some(data)).unwrap();
    assert_eq!(*first.borrow(), vec![Some(json!(1))]);
    assert_eq!(*second.borrow(), vec![Some(json!(2))]);
}

#[test]
fn test_event_object_is_cached_per_name() {
    let aid = setup(PayloadRetention::DispatchScoped);
    let el = target(&aid);
    let body = aid.body().unwrap();

    aid.trigger("test.foo", &body, None).unwrap();
    let event = aid.custom_event("test.foo").unwrap();
    assert_eq!(event.target(), Some(body));
    assert_eq!(event.interface(), "CustomEvent");
    assert!(!event.bubbles());

    aid.trigger("test.foo", &el, None).unwrap();
    assert_eq!(aid.custom_event("test.foo"), Some(event.clone()));
    assert_eq!(event.target(), Some(el));
    assert_eq!(aid.custom_event_names(), vec!["test.foo"]);
}

#[test]
fn test_events_do_not_bubble() {
    let aid = setup(PayloadRetention::DispatchScoped);
    let el = target(&aid);
    let on_body = record_detail(&aid.body().unwrap(), "ping");
    aid.trigger("ping", &el, Some(json!(true).into())).unwrap();
    assert!(on_body.borrow().is_empty());
}

#[test]
fn test_constructor_installed_when_window_lacks_one() {
    let config = AidConfig {
        window: WindowConfig {
            native_custom_event: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let aid = load(r#"<div id="target"></div>"#, config);
    assert!(aid.window().custom_event_constructor().is_none());

    let el = target(&aid);
    let seen = record_detail(&el, "legacy");
    aid.trigger("legacy", &el, Some(json!({"ok": true}).into())).unwrap();

    assert!(aid.window().custom_event_constructor().is_some());
    assert_eq!(*seen.borrow(), vec![Some(json!({"ok": true}))]);
}

#[test]
fn test_failed_construction_is_reported() {
    let aid = setup(PayloadRetention::DispatchScoped);
    let failing: CustomEventConstructor = Rc::new(|name: &str, _init: CustomEventInit| -> Result<_, _> {
        Err(DomError::NotSupported(name.to_string()))
    });
    aid.window().set_custom_event_constructor(Some(failing));
    let err = aid.trigger("broken", &target(&aid), None).unwrap_err();
    assert!(matches!(err, DomError::EventUnavailable(ref name) if name == "broken"));
    assert_eq!(err.to_string(), "unable to trigger custom event: broken");
    assert_eq!(aid.custom_event("broken"), None);
}

#[test]
fn test_handlers_may_trigger_other_events() {
    let aid = Rc::new(setup(PayloadRetention::DispatchScoped));
    let el = target(&aid);
    let inner = record_detail(&el, "inner");

    let (facade, node) = (aid.clone(), el.clone());
    el.add_event_listener("outer", move |event| {
        let detail = event.detail();
        facade.trigger("inner", &node, detail.map(EventData::from)).unwrap();
    });

    aid.trigger("outer", &el, Some(json!("relay").into())).unwrap();
    assert_eq!(*inner.borrow(), vec![Some(json!("relay"))]);
    assert!(!aid.has_payload("outer"));
}

#[test]
fn test_retargeted_environment_keeps_cached_events() {
    let aid = setup(PayloadRetention::DispatchScoped);
    aid.trigger("kept", &target(&aid), None).unwrap();

    let other = Window::from_html("<p></p>", WindowConfig::default());
    aid.set_environment(other);
    assert!(aid.custom_event("kept").is_some());

    let p = aid.document().query_selector("p").unwrap();
    let seen = record_detail(&p, "kept");
    aid.trigger("kept", &p, Some(json!(5).into())).unwrap();
    assert_eq!(*seen.borrow(), vec![Some(json!(5))]);
}
