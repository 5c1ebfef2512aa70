use thiserror::Error;

/// Everything that can end a load cycle. Each variant carries a message
/// suitable for the error panel; the state machine treats all of them the
/// same way (transition to `Failed`, clear page state, stop the cycle).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The metadata API base is missing or still set to the placeholder.
    /// Raised before any network activity.
    #[error("configuration error: {0}")]
    Config(String),

    /// The metadata request failed at the transport or HTTP level, or the
    /// server returned an empty body.
    #[error("metadata fetch failed: {0}")]
    Fetch(String),

    /// The metadata payload was malformed or lacked a storage path.
    #[error("invalid metadata payload: {0}")]
    Validation(String),

    /// Document load, page rasterization, or surface paint failed.
    #[error("page render failed: {0}")]
    Render(String),
}
