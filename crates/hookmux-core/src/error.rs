//! Error types shared by the store and the record types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookmuxError {
    #[error("invalid pane id: {0:?}")]
    InvalidPaneId(String),

    #[error("unknown pane state: {0:?}")]
    UnknownState(String),

    #[error("unknown response: {0:?}")]
    UnknownResponse(String),

    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
