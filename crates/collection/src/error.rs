use thiserror::Error;

/// Failure reported by a listener during a notification pass.
///
/// The collection logs these and carries on with the remaining listeners;
/// they never reach the caller that triggered the mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    /// The listener could not complete its work.
    #[error("listener failed: {0}")]
    Failed(String),

    /// The listener could not push its output to a rendering surface.
    #[error("render failed: {0}")]
    Render(String),

    /// The listener panicked; the payload message is preserved.
    #[error("listener panicked: {0}")]
    Panicked(String),
}

/// Result type for listener callbacks.
pub type Result<T> = std::result::Result<T, ListenerError>;
