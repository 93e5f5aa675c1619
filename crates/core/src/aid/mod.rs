//! `DomAid`: small helpers over the DOM for classes, styles, attributes,
//! tree edits, queries, geometry and custom events.
//!
//! A `DomAid` is bound to an [`Environment`] (a window and its document).
//! Helpers given an invalid target do nothing; the exceptions are
//! [`DomAid::parent`], which reports a non-element start, and
//! [`DomAid::trigger`], which reports an event that cannot be produced.

pub mod args;
pub mod class;
pub mod payload;

use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::css::declaration::hyphenate;
use crate::dom::{self, Node};
use crate::error::DomError;
use crate::event::{CustomEventInit, Detail, Event};
use crate::layout::DomRect;
use crate::window::{CustomEventConstructor, Window, WindowConfig};
use args::{Content, IntoContents, IntoElements, IntoNames};
use class::{ClassMode, ClassStrategy};
use payload::{CustomEventRegistry, EventData, PayloadRetention, PayloadStore};

/// Settings for a `DomAid` and, through `load`, its window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AidConfig {
    pub class_mode: ClassMode,
    pub payload_retention: PayloadRetention,
    pub window: WindowConfig,
}

impl AidConfig {
    pub fn from_json(json: &str) -> Result<Self, DomError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The window a `DomAid` works against, with its document and the
/// document's `html` and `body` elements.
#[derive(Clone)]
pub struct Environment {
    window: Rc<Window>,
    document: Node,
    html: Option<Node>,
    body: Option<Node>,
}

impl Environment {
    pub fn new(window: Rc<Window>) -> Self {
        let document = window.document();
        let html = document.children().into_iter().find(|n| n.local_name() == "html");
        let body = html
            .as_ref()
            .and_then(|html| html.children().into_iter().find(|n| n.local_name() == "body"));
        Self {
            window,
            document,
            html,
            body,
        }
    }

    pub fn window(&self) -> &Rc<Window> {
        &self.window
    }

    pub fn document(&self) -> &Node {
        &self.document
    }

    pub fn html(&self) -> Option<&Node> {
        self.html.as_ref()
    }

    pub fn body(&self) -> Option<&Node> {
        self.body.as_ref()
    }
}

/// Viewport metrics returned by `dims` without an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub bottom: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Dims {
    Element(DomRect),
    Viewport(Viewport),
}

impl Dims {
    pub fn top(&self) -> f32 {
        match self {
            Dims::Element(rect) => rect.top(),
            Dims::Viewport(viewport) => viewport.top,
        }
    }

    pub fn bottom(&self) -> f32 {
        match self {
            Dims::Element(rect) => rect.bottom(),
            Dims::Viewport(viewport) => viewport.bottom,
        }
    }

    pub fn width(&self) -> f32 {
        match self {
            Dims::Element(rect) => rect.width,
            Dims::Viewport(viewport) => viewport.width,
        }
    }

    pub fn height(&self) -> f32 {
        match self {
            Dims::Element(rect) => rect.height,
            Dims::Viewport(viewport) => viewport.height,
        }
    }
}

struct State {
    env: RefCell<Environment>,
    events: RefCell<CustomEventRegistry>,
    payloads: RefCell<PayloadStore>,
    retention: PayloadRetention,
}

pub struct DomAid {
    state: Rc<State>,
    classes: Box<dyn ClassStrategy>,
    scratch: OnceCell<Node>,
}

impl DomAid {
    pub fn new(window: Rc<Window>) -> Self {
        Self::with_config(window, &AidConfig::default())
    }

    pub fn with_config(window: Rc<Window>, config: &AidConfig) -> Self {
        debug!(
            class_mode = ?config.class_mode,
            retention = ?config.payload_retention,
            "dom aid created"
        );
        Self {
            state: Rc::new(State {
                env: RefCell::new(Environment::new(window)),
                events: RefCell::new(CustomEventRegistry::default()),
                payloads: RefCell::new(PayloadStore::default()),
                retention: config.payload_retention,
            }),
            classes: config.class_mode.strategy(),
            scratch: OnceCell::new(),
        }
    }

    /// Point every later call at another window. Cached events and stored
    /// payloads are kept.
    pub fn set_environment(&self, window: Rc<Window>) {
        debug!("environment replaced");
        *self.state.env.borrow_mut() = Environment::new(window);
    }

    pub fn environment(&self) -> Environment {
        self.state.env.borrow().clone()
    }

    pub fn window(&self) -> Rc<Window> {
        self.state.env.borrow().window.clone()
    }

    pub fn document(&self) -> Node {
        self.state.env.borrow().document.clone()
    }

    pub fn html(&self) -> Option<Node> {
        self.state.env.borrow().html.clone()
    }

    pub fn body(&self) -> Option<Node> {
        self.state.env.borrow().body.clone()
    }

    pub fn media(&self, query: &str) -> bool {
        self.window().match_media(query).matches
    }

    pub fn is_element(&self, node: &Node) -> bool {
        node.is_element()
    }

    /// Whether `element` is an element with the given tag, case-insensitively.
    pub fn is(&self, element: &Node, tag: &str) -> bool {
        element.is_element() && element.local_name().eq_ignore_ascii_case(tag)
    }

    /// The attribute's value, `Some("")` for an empty attribute, `None` when
    /// it is missing or `element` is not an element.
    pub fn has_attr(&self, name: &str, element: &Node) -> Option<String> {
        if !element.is_element() {
            return None;
        }
        element.get_attribute(name)
    }

    pub fn matches(&self, element: &Node, selector: &str) -> bool {
        element.is_element() && element.matches(selector)
    }

    pub fn has_class(&self, name: &str, element: &Node) -> bool {
        element.is_element() && self.classes.contains(element, name)
    }

    /// Add whitespace-separated class names.
    pub fn add_class(&self, names: &str, element: &Node) {
        if !element.is_element() {
            return;
        }
        let names: Vec<String> = names.split_whitespace().map(str::to_string).collect();
        if names.is_empty() {
            return;
        }
        self.classes.add(element, &names);
    }

    /// Remove class names. A `class` attribute left empty is removed.
    pub fn remove_class(&self, names: impl IntoNames, element: &Node) {
        if !element.is_element() {
            return;
        }
        let names: Vec<String> = names
            .into_names()
            .iter()
            .flat_map(|n| n.split_whitespace())
            .map(str::to_string)
            .collect();
        self.classes.remove(element, &names);
        if element.get_attribute("class").as_deref() == Some("") {
            element.remove_attribute("class");
        }
    }

    pub fn toggle_class(&self, name: &str, element: &Node) {
        if !element.is_element() {
            return;
        }
        element.class_list().toggle(name);
    }

    /// Assign inline style properties. Names may be camelCase or hyphenated.
    pub fn set_style<K, V>(&self, rules: impl IntoIterator<Item = (K, V)>, element: &Node)
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if !element.is_element() {
            return;
        }
        for (name, value) in rules {
            element.set_style_property(&hyphenate(name.as_ref()), value.as_ref());
        }
    }

    /// Remove inline style properties. On a shadow host the property is set
    /// to the empty string instead of removed.
    pub fn remove_style(&self, rules: impl IntoNames, element: &Node) {
        if !element.is_element() {
            return;
        }
        let shadow_host = element.shadow_root().is_some();
        let names = rules.into_names();
        for name in names.iter().flat_map(|n| n.split_whitespace()) {
            let property = hyphenate(name);
            if shadow_host {
                element.set_style_property(&property, "");
            } else {
                element.remove_style_property(&property);
            }
        }
    }

    pub fn set_attrs<K, V>(&self, attrs: impl IntoIterator<Item = (K, V)>, element: &Node)
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if !element.is_element() {
            return;
        }
        for (name, value) in attrs {
            element.set_attribute(name.as_ref(), value.as_ref());
        }
    }

    pub fn hide(&self, targets: impl IntoElements) {
        for element in targets.into_elements().iter().filter(|n| n.is_element()) {
            element.set_style_property("display", "none");
        }
    }

    /// Clear the inline `display`, so the element falls back to its
    /// stylesheet or default display.
    pub fn show(&self, targets: impl IntoElements) {
        for element in targets.into_elements().iter().filter(|n| n.is_element()) {
            element.set_style_property("display", "");
        }
    }

    /// Parse markup into detached nodes, in source order. The scratch
    /// document's body is the container the markup is parsed into; it is
    /// created once and left empty after each call.
    pub fn string_to_nodes(&self, html: &str) -> Vec<Node> {
        let scratch = self.scratch.get_or_init(dom::create_html_document);
        let Some(body) = scratch.query_selector("body") else {
            return Vec::new();
        };
        body.set_inner_html(html);
        let nodes = body.child_nodes();
        for node in &nodes {
            node.detach();
        }
        nodes
    }

    /// Remove every child of `element`, or of the body when `None`.
    pub fn empty(&self, element: Option<&Node>) {
        if let Some(target) = element.cloned().or_else(|| self.body()) {
            target.set_text_content("");
        }
    }

    /// Append nodes and parsed markup to `parent` (the body by default) in
    /// one insertion. Blank markup and non-insertable nodes are skipped.
    pub fn add(&self, contents: impl IntoContents, parent: Option<&Node>) {
        let Some(parent) = parent.cloned().or_else(|| self.body()) else {
            return;
        };
        let mut nodes = Vec::new();
        for content in contents.into_contents() {
            match content {
                Content::Markup(markup) => {
                    let markup = markup.trim();
                    if !markup.is_empty() {
                        nodes.extend(self.string_to_nodes(markup));
                    }
                }
                Content::Node(node) => {
                    if (node.is_element() || node.is_text()) && !node.contains(&parent) {
                        nodes.push(node);
                    }
                }
            }
        }
        if nodes.is_empty() {
            return;
        }

        let fragment = Node::new_fragment();
        for node in &nodes {
            if let Err(err) = fragment.append_child(node) {
                debug!(%err, "skipping node");
            }
        }
        if let Err(err) = parent.append_child(&fragment) {
            debug!(%err, "add failed");
        }
    }

    /// Insert a node, or the first element parsed from markup, as the first
    /// child of `parent` (the body by default).
    pub fn prepend(&self, content: impl Into<Content>, parent: Option<&Node>) {
        let Some(parent) = parent.cloned().or_else(|| self.body()) else {
            return;
        };
        let node = match content.into() {
            Content::Markup(markup) => {
                let markup = markup.trim();
                if markup.is_empty() {
                    return;
                }
                self.string_to_nodes(markup).into_iter().next()
            }
            Content::Node(node) => Some(node),
        };
        let Some(node) = node.filter(Node::is_element) else {
            return;
        };
        let first = parent.first_child();
        if let Err(err) = parent.insert_before(&node, first.as_ref()) {
            debug!(%err, "prepend failed");
        }
    }

    /// All matches of `selector` under `root` (the document by default), or
    /// `None` when nothing matches.
    pub fn find(&self, selector: &str, root: Option<&Node>) -> Option<Vec<Node>> {
        let root = root.cloned().unwrap_or_else(|| self.document());
        let found = root.query_selector_all(selector);
        if found.is_empty() {
            None
        } else {
            Some(found)
        }
    }

    /// The nearest ancestor of `element` matching `selector`, or the direct
    /// parent without one. A shadow root is stepped over to its host.
    pub fn parent(&self, element: &Node, selector: Option<&str>) -> Result<Option<Node>, DomError> {
        if !element.is_element() {
            return Err(DomError::NotAnElement);
        }
        let mut current = element.clone();
        loop {
            let Some(mut parent) = current.parent_node() else {
                return Ok(None);
            };
            if parent.is_shadow_root() {
                match parent.host() {
                    Some(host) => parent = host,
                    None => return Ok(None),
                }
            }
            match selector {
                None => return Ok(Some(parent)),
                Some(selector) if parent.matches(selector) => return Ok(Some(parent)),
                Some(_) => current = parent,
            }
        }
    }

    /// The element's viewport-relative box, or the viewport itself.
    pub fn dims(&self, element: Option<&Node>) -> Dims {
        let window = self.window();
        match element {
            Some(element) => Dims::Element(window.bounding_client_rect(element)),
            None => {
                let top = window.page_y_offset();
                let height = window.inner_height();
                Dims::Viewport(Viewport {
                    top,
                    width: window.inner_width(),
                    height,
                    bottom: top + height,
                })
            }
        }
    }

    /// Dispatch the custom event `name` on `target`. Listeners read `data`
    /// through `event.detail()`; `None` or a JSON null keeps whatever
    /// payload is already stored under `name`.
    pub fn trigger(&self, name: &str, target: &Node, data: Option<EventData>) -> Result<(), DomError> {
        if let Some(data) = data.filter(|d| !d.is_null()) {
            self.state.payloads.borrow_mut().store(name, data);
        }
        let event = self.custom_event_for(name)?;
        trace!(event = name, "trigger");
        target.dispatch_event(&event)?;
        if self.state.retention == PayloadRetention::DispatchScoped {
            self.state.payloads.borrow_mut().clear_if_read(name);
        }
        Ok(())
    }

    /// The cached event object for `name`, if it has been triggered.
    pub fn custom_event(&self, name: &str) -> Option<Event> {
        self.state.events.borrow().get(name)
    }

    pub fn custom_event_names(&self) -> Vec<String> {
        self.state.events.borrow().names()
    }

    /// Whether a payload is stored under `name`.
    pub fn has_payload(&self, name: &str) -> bool {
        self.state.payloads.borrow().contains(name)
    }

    fn custom_event_for(&self, name: &str) -> Result<Event, DomError> {
        if let Some(event) = self.custom_event(name) {
            return Ok(event);
        }
        let window = self.window();
        let constructor = match window.custom_event_constructor() {
            Some(constructor) => constructor,
            None => {
                debug!("installing CustomEvent constructor");
                let constructor = custom_event_polyfill(&window);
                window.set_custom_event_constructor(Some(constructor.clone()));
                constructor
            }
        };
        let init = CustomEventInit {
            detail: Some(detail_reader(&self.state)),
            ..Default::default()
        };
        let event = constructor(name, init).map_err(|err| {
            debug!(%err, event = name, "custom event construction failed");
            DomError::EventUnavailable(name.to_string())
        })?;
        self.state.events.borrow_mut().insert(name, event.clone());
        Ok(event)
    }
}

/// A `CustomEvent` constructor built on `createEvent` and
/// `initCustomEvent`, for windows that lack one.
fn custom_event_polyfill(window: &Rc<Window>) -> CustomEventConstructor {
    let window = Rc::downgrade(window);
    Rc::new(move |event_type: &str, init: CustomEventInit| -> Result<Event, DomError> {
        let window = window
            .upgrade()
            .ok_or_else(|| DomError::EventUnavailable(event_type.to_string()))?;
        let event = window.create_event("CustomEvent")?;
        event.init_custom_event(event_type, init.bubbles, init.cancelable, init.detail);
        Ok(event)
    })
}

fn detail_reader(state: &Rc<State>) -> Detail {
    let state = Rc::downgrade(state);
    Rc::new(move |name: &str| state.upgrade().and_then(|state| read_payload(&state, name)))
}

fn read_payload(state: &Rc<State>, name: &str) -> Option<Value> {
    let data = state.payloads.borrow().get(name)?;
    let value = data.resolve();
    if value.is_null() {
        return None;
    }
    state.payloads.borrow_mut().mark_read(name);
    if state.retention == PayloadRetention::Deferred {
        let weak = Rc::downgrade(state);
        let name = name.to_string();
        let window = state.env.borrow().window.clone();
        window.set_timeout(move || {
            if let Some(state) = weak.upgrade() {
                trace!(event = %name, "payload cleared");
                state.payloads.borrow_mut().clear(&name);
            }
        });
    }
    Some(value)
}
