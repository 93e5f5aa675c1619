//! DOM convenience helpers over a live in-memory document.
//!
//! Markup is parsed with html5ever into a mutable tree of [`dom::Node`]s
//! hosted by a [`window::Window`]. [`DomAid`] layers the helpers on top.

pub mod aid;
pub mod css;
pub mod dom;
pub mod error;
pub mod event;
pub mod layout;
pub mod window;

pub use aid::args::{Content, IntoContents, IntoElements, IntoNames};
pub use aid::class::{ClassMode, ClassStrategy};
pub use aid::payload::{EventData, PayloadRetention};
pub use aid::{AidConfig, Dims, DomAid, Environment, Viewport};
pub use dom::Node;
pub use error::DomError;
pub use event::Event;
pub use layout::DomRect;
pub use window::{Window, WindowConfig};

/// Parse `html` into a fresh window and return helpers bound to it.
/// This is the primary entry point.
pub fn load(html: &str, config: AidConfig) -> DomAid {
    let window = Window::from_html(html, config.window.clone());
    DomAid::with_config(window, &config)
}
