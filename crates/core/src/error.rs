use thiserror::Error;

/// Errors surfaced by the DOM host and the `trigger` path of the facade.
///
/// Most facade operations never fail: given a node that is not an element
/// they simply do nothing.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("node is not an element")]
    NotAnElement,
    #[error("unable to trigger custom event: {0}")]
    EventUnavailable(String),
    #[error("not supported: {0}")]
    NotSupported(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("node cannot be inserted at this position")]
    HierarchyRequest,
    #[error("node is not a child of this parent")]
    NotFound,
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
