use thiserror::Error;

/// Fatal failures: the dashboard cannot start, or stops serving.
#[derive(Debug, Error)]
pub enum DashError {
    /// The dataset could not be fetched or parsed.
    #[error("dataset unavailable from {source_id}: {reason}")]
    DataUnavailable { source_id: String, reason: String },

    /// The HTTP listener could not be bound.
    #[error("cannot listen on {addr}: {reason}")]
    Bind { addr: String, reason: String },

    /// The listener stopped accepting requests while serving.
    #[error("listener on {addr} failed: {reason}")]
    Listener { addr: String, reason: String },
}

/// Per-interaction failures. Contained within a session: the selection is
/// left untouched and rendering carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("row index {index} is out of range for a table of {len} rows")]
    InvalidSelection { index: usize, len: usize },

    #[error("malformed interaction event: {0}")]
    MalformedEvent(String),
}
