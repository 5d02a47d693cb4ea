// src/error.rs

use std::fmt;

/// Global Client Error Enum.
/// Every operation in the crate returns this type; `message()` is what the user sees.
#[derive(Debug)]
pub enum ClientError {
    // 401 / 403, or rejected credentials
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // Quiz or comment list could not be fetched
    LoadError(String),

    // Attempt or comment mutation failed
    SubmissionError(String),

    // 400 / 409 / 422, or client-side validation
    BadRequest(String),

    // Any other non-success status
    Api { status: u16, message: String },

    // Connection refused, DNS, TLS...
    Transport(String),

    // Response body did not match the expected shape
    Decode(String),

    // Token storage could not be written
    Storage(String),

    // A submission is already outstanding
    Busy,
}

impl ClientError {
    /// The single human-readable string surfaced to the user.
    pub fn message(&self) -> String {
        match self {
            ClientError::AuthError(msg)
            | ClientError::NotFound(msg)
            | ClientError::LoadError(msg)
            | ClientError::SubmissionError(msg)
            | ClientError::BadRequest(msg)
            | ClientError::Transport(msg)
            | ClientError::Decode(msg)
            | ClientError::Storage(msg) => msg.clone(),
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Busy => "A submission is already in progress".to_string(),
        }
    }

    /// Maps a non-success HTTP status and the server's message to a variant.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ClientError::AuthError(message),
            404 => ClientError::NotFound(message),
            400 | 409 | 422 => ClientError::BadRequest(message),
            _ => ClientError::Api { status, message },
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Api { status, message } => write!(f, "{} ({})", message, status),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for ClientError {}

/// Converts `reqwest::Error` into `Transport` or `Decode`.
/// Allows using `?` operator on requests.
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::BadRequest(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::BadRequest(err.to_string())
    }
}
