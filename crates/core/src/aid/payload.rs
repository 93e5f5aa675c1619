//! Custom event cache and the payloads handed to listeners through
//! `event.detail`.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::Event;

/// Data attached to a `trigger` call.
#[derive(Clone)]
pub enum EventData {
    Value(Value),
    /// Re-evaluated on every `detail` read.
    Lazy(Rc<dyn Fn() -> Value>),
}

impl EventData {
    pub fn lazy(producer: impl Fn() -> Value + 'static) -> Self {
        EventData::Lazy(Rc::new(producer))
    }

    pub fn resolve(&self) -> Value {
        match self {
            EventData::Value(value) => value.clone(),
            EventData::Lazy(producer) => producer(),
        }
    }

    pub(crate) fn is_null(&self) -> bool {
        matches!(self, EventData::Value(Value::Null))
    }
}

impl fmt::Debug for EventData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventData::Value(value) => f.debug_tuple("Value").field(value).finish(),
            EventData::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl From<Value> for EventData {
    fn from(value: Value) -> Self {
        EventData::Value(value)
    }
}

/// When a payload that has been read leaves the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadRetention {
    /// Cleared as soon as the dispatch that read it returns.
    #[default]
    DispatchScoped,
    /// Cleared by a zero-delay task on the window after the first read.
    /// Whatever payload is stored when the task runs is the one dropped.
    Deferred,
}

struct Entry {
    data: EventData,
    read: bool,
}

#[derive(Default)]
pub(crate) struct PayloadStore {
    entries: HashMap<String, Entry>,
}

impl PayloadStore {
    pub fn store(&mut self, name: &str, data: EventData) {
        self.entries.insert(name.to_string(), Entry { data, read: false });
    }

    pub fn get(&self, name: &str) -> Option<EventData> {
        self.entries.get(name).map(|entry| entry.data.clone())
    }

    pub fn mark_read(&mut self, name: &str) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.read = true;
        }
    }

    pub fn clear(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn clear_if_read(&mut self, name: &str) -> bool {
        if self.entries.get(name).is_some_and(|entry| entry.read) {
            return self.clear(name);
        }
        false
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

/// One event object per name, created on first trigger and reused after.
#[derive(Default)]
pub(crate) struct CustomEventRegistry {
    events: HashMap<String, Event>,
}

impl CustomEventRegistry {
    pub fn get(&self, name: &str) -> Option<Event> {
        self.events.get(name).cloned()
    }

    pub fn insert(&mut self, name: &str, event: Event) {
        self.events.insert(name.to_string(), event);
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.events.keys().cloned().collect();
        names.sort();
        names
    }
}
