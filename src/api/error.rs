//! API client error types

use std::fmt;

/// Errors that can occur while talking to the log service
///
/// Nothing here is retried: every variant propagates to the caller and
/// ends the current invocation.
#[derive(Debug)]
pub enum ApiError {
    /// Credentials or client settings are missing or invalid
    Configuration(String),
    /// Connection could not be established or the request failed in flight
    Transport(String),
    /// The service answered with a non-2xx status
    Status { status: u16, body: String },
    /// The response body was not the JSON shape we expected
    Decode(String),
    /// A system or group name did not resolve to an id
    NotFound { kind: &'static str, name: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Self::Transport(msg) => write!(f, "Transport error: {}", msg),
            Self::Status { status, body } => {
                write!(
                    f,
                    "Could not satisfy request. HTTP Status ({}), Body {}",
                    status, body
                )
            }
            Self::Decode(msg) => write!(f, "Failed to decode response: {}", msg),
            Self::NotFound { kind, name } => write!(f, "{} \"{}\" not found", kind, name),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
