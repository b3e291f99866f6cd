// Backend error types

use thiserror::Error;

/// Connection parameters are missing or unusable.
///
/// Produced by the client factory instead of a client; every consumer
/// checks for it before the first backend call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error(
        "Missing required backend settings: {}. Please ensure they are set in the config file or environment.",
        .0.join(", ")
    )]
    Missing(Vec<&'static str>),
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Failed to build backend HTTP client: {0}")]
    Client(String),
}

/// A query against the backend failed.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response (DNS, connect, timeout, TLS)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered with an error payload
    #[error("{message}")]
    Query {
        message: String,
        code: Option<String>,
        /// PostgREST `details`, kept out of the message
        details: Option<String>,
        status: u16,
    },
    /// The response body could not be decoded
    #[error("Failed to decode backend response: {0}")]
    Decode(String),
    /// More rows came back than the query allows
    #[error("Expected at most {expected} row(s), got {actual}")]
    Ambiguous { expected: usize, actual: usize },
}

/// PostgREST code for "requested a single object, found none"
pub const NO_ROWS_CODE: &str = "PGRST116";

impl BackendError {
    /// Machine-readable error code, when one is available
    pub fn code(&self) -> Option<String> {
        match self {
            Self::Query { code, .. } => code.clone(),
            Self::Transport(e) if e.is_timeout() => Some("TIMEOUT".to_string()),
            Self::Transport(_) => Some("TRANSPORT".to_string()),
            Self::Decode(_) => Some("DECODE".to_string()),
            Self::Ambiguous { .. } => Some("AMBIGUOUS".to_string()),
        }
    }

    /// HTTP status of an error response, if the backend answered at all
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::Query { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) | Self::Ambiguous { .. } => None,
        }
    }

    /// Extra context the backend attached to an error response
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Query { details, .. } => details.as_deref(),
            Self::Transport(_) | Self::Decode(_) | Self::Ambiguous { .. } => None,
        }
    }

    /// Whether the backend reported an empty single-object result
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::Query { code: Some(code), .. } if code == NO_ROWS_CODE)
    }

    #[cfg(test)]
    pub fn query(message: &str, code: &str) -> Self {
        Self::Query {
            message: message.to_string(),
            code: Some(code.to_string()),
            details: None,
            status: 400,
        }
    }
}
