//! The window a document lives in: viewport metrics, scroll position, a
//! zero-delay task queue and the `CustomEvent` constructor slot.

pub mod media;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::dom::{self, Node};
use crate::error::DomError;
use crate::event::{CustomEventInit, Event};
use crate::layout::{self, DomRect};
use media::MediaQueryList;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaType {
    #[default]
    Screen,
    Print,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Screen => "screen",
            MediaType::Print => "print",
        }
    }
}

/// Viewport and capability settings for a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub inner_width: f32,
    pub inner_height: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
    /// Whether the window provides a native `CustomEvent` constructor.
    pub native_custom_event: bool,
    pub color_scheme: ColorScheme,
    pub media_type: MediaType,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            inner_width: 1024.0,
            inner_height: 768.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            native_custom_event: true,
            color_scheme: ColorScheme::Light,
            media_type: MediaType::Screen,
        }
    }
}

/// `new CustomEvent(type, init)` as installed on a window.
pub type CustomEventConstructor = Rc<dyn Fn(&str, CustomEventInit) -> Result<Event, DomError>>;

type Task = Box<dyn FnOnce()>;

pub struct Window {
    document: Node,
    config: RefCell<WindowConfig>,
    tasks: RefCell<VecDeque<Task>>,
    custom_event: RefCell<Option<CustomEventConstructor>>,
}

impl Window {
    /// A window holding an empty HTML document.
    pub fn new(config: WindowConfig) -> Rc<Self> {
        Self::with_document(dom::create_html_document(), config)
    }

    pub fn from_html(html: &str, config: WindowConfig) -> Rc<Self> {
        Self::with_document(dom::parse_html(html), config)
    }

    pub fn with_document(document: Node, config: WindowConfig) -> Rc<Self> {
        let custom_event: Option<CustomEventConstructor> = if config.native_custom_event {
            Some(Rc::new(|event_type: &str, init: CustomEventInit| -> Result<Event, DomError> {
                Ok(Event::new_custom(event_type, init))
            }))
        } else {
            None
        };
        debug!(
            width = config.inner_width,
            height = config.inner_height,
            native_custom_event = config.native_custom_event,
            "window created"
        );
        Rc::new(Self {
            document,
            config: RefCell::new(config),
            tasks: RefCell::new(VecDeque::new()),
            custom_event: RefCell::new(custom_event),
        })
    }

    pub fn document(&self) -> Node {
        self.document.clone()
    }

    pub fn config(&self) -> WindowConfig {
        self.config.borrow().clone()
    }

    pub fn inner_width(&self) -> f32 {
        self.config.borrow().inner_width
    }

    pub fn inner_height(&self) -> f32 {
        self.config.borrow().inner_height
    }

    pub fn page_x_offset(&self) -> f32 {
        self.config.borrow().scroll_x
    }

    pub fn page_y_offset(&self) -> f32 {
        self.config.borrow().scroll_y
    }

    pub fn scroll_to(&self, x: f32, y: f32) {
        let mut config = self.config.borrow_mut();
        config.scroll_x = x.max(0.0);
        config.scroll_y = y.max(0.0);
    }

    pub fn resize(&self, width: f32, height: f32) {
        let mut config = self.config.borrow_mut();
        config.inner_width = width;
        config.inner_height = height;
    }

    /// Queue `task` to run on the next turn, like `setTimeout(task, 0)`.
    pub fn set_timeout(&self, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Run the tasks queued so far. Tasks they queue wait for the next call.
    /// Returns how many tasks ran.
    pub fn run_pending_tasks(&self) -> usize {
        let turn: Vec<Task> = self.tasks.borrow_mut().drain(..).collect();
        let count = turn.len();
        for task in turn {
            task();
        }
        if count > 0 {
            trace!(count, "ran pending tasks");
        }
        count
    }

    pub fn match_media(&self, query: &str) -> MediaQueryList {
        let matches = media::evaluate(query, &self.config.borrow());
        MediaQueryList {
            media: query.trim().to_string(),
            matches,
        }
    }

    pub fn custom_event_constructor(&self) -> Option<CustomEventConstructor> {
        self.custom_event.borrow().clone()
    }

    pub fn set_custom_event_constructor(&self, constructor: Option<CustomEventConstructor>) {
        *self.custom_event.borrow_mut() = constructor;
    }

    /// `document.createEvent(interface)`.
    pub fn create_event(&self, interface: &str) -> Result<Event, DomError> {
        Event::create(interface)
    }

    /// `element.getBoundingClientRect()`: the element's box relative to the
    /// viewport. All zeros when the element is not rendered.
    pub fn bounding_client_rect(&self, element: &Node) -> DomRect {
        let config = self.config.borrow();
        if element.shadow_including_root() != self.document {
            return DomRect::default();
        }
        match layout::bounding_box(
            &self.document,
            element,
            config.inner_width,
            config.inner_height,
        ) {
            Some(rect) => DomRect {
                x: rect.x - config.scroll_x,
                y: rect.y - config.scroll_y,
                ..rect
            },
            None => DomRect::default(),
        }
    }
}
