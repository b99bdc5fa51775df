use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    /// The request did not complete within its timeout and was cancelled.
    #[error("Request aborted after {} ms", .timeout.as_millis())]
    RequestAborted { timeout: Duration },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Expected a response body but the server sent no content")]
    NoContent,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RequestFailed { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
