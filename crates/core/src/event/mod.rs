//! Events, listeners and dispatch.
//!
//! Dispatch is synchronous: `dispatch_event` runs every matching listener on
//! the target and, for bubbling events, on each ancestor before returning.
//! Bubbling stops at a shadow root; it does not cross into the host's tree.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::trace;

use crate::dom::Node;
use crate::error::DomError;

/// Getter behind `event.detail`. It receives the event's type so a single
/// getter can serve many event names.
pub type Detail = Rc<dyn Fn(&str) -> Option<Value>>;

/// A listener callback.
pub type Handler = Rc<dyn Fn(&Event)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

thread_local! {
    static NEXT_LISTENER: Cell<u64> = const { Cell::new(1) };
}

impl ListenerId {
    fn next() -> Self {
        NEXT_LISTENER.with(|next| {
            let id = next.get();
            next.set(id + 1);
            ListenerId(id)
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListenerOptions {
    /// Remove the listener before its first invocation.
    pub once: bool,
}

pub(crate) struct Listener {
    id: ListenerId,
    event_type: String,
    handler: Handler,
    once: bool,
}

/// Options for `Event::new_custom`, like a `CustomEventInit` dictionary.
#[derive(Clone, Default)]
pub struct CustomEventInit {
    pub bubbles: bool,
    pub cancelable: bool,
    pub detail: Option<Detail>,
}

struct EventInner {
    interface: &'static str,
    event_type: RefCell<String>,
    bubbles: Cell<bool>,
    cancelable: Cell<bool>,
    initialized: Cell<bool>,
    detail: RefCell<Option<Detail>>,
    target: RefCell<Option<Node>>,
    current_target: RefCell<Option<Node>>,
    dispatching: Cell<bool>,
    propagation_stopped: Cell<bool>,
    default_prevented: Cell<bool>,
}

/// A shared handle to an event object. Cloning is cheap; equality is identity.
#[derive(Clone)]
pub struct Event(Rc<EventInner>);

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("interface", &self.0.interface)
            .field("type", &*self.0.event_type.borrow())
            .field("bubbles", &self.0.bubbles.get())
            .field("target", &*self.0.target.borrow())
            .finish()
    }
}

impl Event {
    fn blank(interface: &'static str) -> Self {
        Event(Rc::new(EventInner {
            interface,
            event_type: RefCell::new(String::new()),
            bubbles: Cell::new(false),
            cancelable: Cell::new(false),
            initialized: Cell::new(false),
            detail: RefCell::new(None),
            target: RefCell::new(None),
            current_target: RefCell::new(None),
            dispatching: Cell::new(false),
            propagation_stopped: Cell::new(false),
            default_prevented: Cell::new(false),
        }))
    }

    /// `new CustomEvent(type, init)`.
    pub fn new_custom(event_type: &str, init: CustomEventInit) -> Self {
        let event = Self::blank("CustomEvent");
        event.init_custom_event(event_type, init.bubbles, init.cancelable, init.detail);
        event
    }

    /// `document.createEvent(interface)`: an uninitialized event that has to
    /// go through `init_custom_event` before it can be dispatched.
    pub fn create(interface: &str) -> Result<Self, DomError> {
        let interface = match interface.to_ascii_lowercase().as_str() {
            "event" | "events" | "htmlevents" => "Event",
            "customevent" => "CustomEvent",
            _ => return Err(DomError::NotSupported(interface.to_string())),
        };
        Ok(Self::blank(interface))
    }

    /// Ignored while the event is being dispatched.
    pub fn init_custom_event(
        &self,
        event_type: &str,
        bubbles: bool,
        cancelable: bool,
        detail: Option<Detail>,
    ) {
        if self.0.dispatching.get() {
            return;
        }
        *self.0.event_type.borrow_mut() = event_type.to_string();
        self.0.bubbles.set(bubbles);
        self.0.cancelable.set(cancelable);
        *self.0.detail.borrow_mut() = detail;
        *self.0.target.borrow_mut() = None;
        self.0.propagation_stopped.set(false);
        self.0.default_prevented.set(false);
        self.0.initialized.set(true);
    }

    pub fn interface(&self) -> &'static str {
        self.0.interface
    }

    pub fn event_type(&self) -> String {
        self.0.event_type.borrow().clone()
    }

    pub fn bubbles(&self) -> bool {
        self.0.bubbles.get()
    }

    pub fn cancelable(&self) -> bool {
        self.0.cancelable.get()
    }

    /// The node the event was last dispatched to.
    pub fn target(&self) -> Option<Node> {
        self.0.target.borrow().clone()
    }

    pub fn current_target(&self) -> Option<Node> {
        self.0.current_target.borrow().clone()
    }

    pub fn has_detail(&self) -> bool {
        self.0.detail.borrow().is_some()
    }

    /// Read `event.detail`. Runs the detail getter every time.
    pub fn detail(&self) -> Option<Value> {
        let getter = self.0.detail.borrow().clone()?;
        let event_type = self.event_type();
        getter(&event_type)
    }

    pub fn prevent_default(&self) {
        if self.0.cancelable.get() {
            self.0.default_prevented.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.0.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.0.propagation_stopped.set(true);
    }

    pub fn is_dispatching(&self) -> bool {
        self.0.dispatching.get()
    }
}

impl Node {
    pub fn add_event_listener(
        &self,
        event_type: &str,
        handler: impl Fn(&Event) + 'static,
    ) -> ListenerId {
        self.add_event_listener_with_options(event_type, handler, ListenerOptions::default())
    }

    pub fn add_event_listener_with_options(
        &self,
        event_type: &str,
        handler: impl Fn(&Event) + 'static,
        options: ListenerOptions,
    ) -> ListenerId {
        let id = ListenerId::next();
        self.0.listeners.borrow_mut().push(Listener {
            id,
            event_type: event_type.to_string(),
            handler: Rc::new(handler),
            once: options.once,
        });
        id
    }

    /// Returns whether a listener was removed.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.0.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.0
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.event_type == event_type)
            .count()
    }

    /// Dispatch `event` with this node as its target. Returns `false` when a
    /// listener cancelled the event.
    pub fn dispatch_event(&self, event: &Event) -> Result<bool, DomError> {
        if event.0.dispatching.get() {
            return Err(DomError::InvalidState(format!(
                "event '{}' is already being dispatched",
                event.event_type()
            )));
        }
        if !event.0.initialized.get() {
            return Err(DomError::InvalidState("event is not initialized".to_string()));
        }

        let mut path = vec![self.clone()];
        if event.bubbles() {
            let mut current = self.parent_node();
            while let Some(node) = current {
                current = node.parent_node();
                path.push(node);
            }
        }
        trace!(event = %event.event_type(), path = path.len(), "dispatch");

        event.0.dispatching.set(true);
        event.0.propagation_stopped.set(false);
        event.0.default_prevented.set(false);
        *event.0.target.borrow_mut() = Some(self.clone());

        for node in &path {
            if event.0.propagation_stopped.get() {
                break;
            }
            *event.0.current_target.borrow_mut() = Some(node.clone());
            node.invoke_listeners(event);
        }

        *event.0.current_target.borrow_mut() = None;
        event.0.dispatching.set(false);
        Ok(!event.default_prevented())
    }

    fn invoke_listeners(&self, event: &Event) {
        let event_type = event.event_type();
        // Listeners added during dispatch do not run for this event.
        let snapshot: Vec<(ListenerId, Handler, bool)> = self
            .0
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.event_type == event_type)
            .map(|l| (l.id, l.handler.clone(), l.once))
            .collect();

        for (id, handler, once) in snapshot {
            let registered = self.0.listeners.borrow().iter().any(|l| l.id == id);
            if !registered {
                continue;
            }
            if once {
                self.remove_event_listener(id);
            }
            handler(event);
        }
    }
}
