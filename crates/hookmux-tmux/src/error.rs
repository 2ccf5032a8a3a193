//! Errors from talking to tmux.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TmuxError {
    /// No tmux server is listening on the selected socket.
    #[error("no tmux server running")]
    NoServer,

    #[error("tmux command failed: {0}")]
    CommandFailed(String),

    #[error("failed to parse list-panes line {line_num}: {detail}")]
    ParseError { line_num: usize, detail: String },

    #[error("tmux io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TmuxError {
    /// Classify a failed invocation from its stderr.
    pub(crate) fn from_failure(code: Option<i32>, stderr: &str) -> Self {
        let stderr = stderr.trim();
        if stderr.contains("no server running") || stderr.starts_with("error connecting to") {
            return Self::NoServer;
        }
        Self::CommandFailed(format!("exit code {}: {stderr}", code.unwrap_or(-1)))
    }
}
