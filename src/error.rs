//! Errors returned by backend calls.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection refused, timeout, DNS failure, ...
    #[error("Connection error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Backend returned {}{}", .status, message_suffix(.message))]
    Status {
        status: StatusCode,
        /// `error` field of the response body, if any
        message: Option<String>,
    },
    #[error("Malformed response body: {0}")]
    Decode(String),
}

impl BackendError {
    /// True when the backend could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self, BackendError::Transport(_))
    }

    /// Reason suitable for a one-line log message
    pub fn reason(&self) -> String {
        match self {
            BackendError::Status {
                message: Some(m), ..
            } => m.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Transport(e)
        }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {}", m),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;
