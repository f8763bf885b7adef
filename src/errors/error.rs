//! Error types for the Copilot chat client.

use thiserror::Error;

/// Result type alias for Copilot operations
pub type CopilotResult<T> = Result<T, CopilotError>;

/// Main error type for the Copilot chat client.
///
/// Every failure surfaces as one of these variants; the client performs no
/// retries, so each error reaches the caller exactly once.
#[derive(Error, Debug, Clone)]
pub enum CopilotError {
    /// Configuration error (invalid base URL, missing required settings)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration issue
        message: String,
    },

    /// Validation error (empty or whitespace-only question)
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the validation issue
        message: String,
    },

    /// Authentication error (no access token set when one is required)
    #[error("Authentication required: {message}")]
    Authentication {
        /// Description of the authentication issue
        message: String,
    },

    /// Non-2xx response from the Copilot backend.
    ///
    /// The message is taken from the error body's `detail` or `message`
    /// field when one parses, otherwise a generic fallback.
    #[error("HTTP {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message derived from the error body
        message: String,
    },

    /// Network error (connection failed, timeout, DNS issues)
    #[error("Network error: {message}")]
    Network {
        /// Description of the network issue
        message: String,
    },

    /// The request was cancelled through its abort handle.
    ///
    /// Distinguished from other failures so callers can tell "user
    /// cancelled" apart from "request failed".
    #[error("Request was cancelled")]
    Cancelled,

    /// Protocol error (unreadable response body, body that is not a
    /// plausible JSON object)
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol issue
        message: String,
    },

    /// Internal error (unexpected conditions, library bugs)
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal issue
        message: String,
    },
}

impl CopilotError {
    /// Returns true if this error represents a caller-initiated cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CopilotError::Cancelled)
    }
}

// Conversions from common error types
impl From<reqwest::Error> for CopilotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CopilotError::Network {
                message: format!("Request timed out: {}", err),
            }
        } else if err.is_connect() {
            CopilotError::Network {
                message: format!("Connection failed: {}", err),
            }
        } else {
            CopilotError::Network {
                message: format!("Network error: {}", err),
            }
        }
    }
}

impl From<serde_json::Error> for CopilotError {
    fn from(err: serde_json::Error) -> Self {
        CopilotError::Protocol {
            message: format!("JSON serialization/deserialization error: {}", err),
        }
    }
}

impl From<url::ParseError> for CopilotError {
    fn from(err: url::ParseError) -> Self {
        CopilotError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}
