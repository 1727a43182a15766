//! Error types shared across the workspace.
//!
//! One `thiserror` hierarchy covers every failure the server reports:
//! configuration problems surface as [`ConfigError`], everything else as a
//! variant of [`Error`]. Tool-call handling leans on the `Display` output
//! of these types, so the messages are written for end users, not logs.

use thiserror::Error;

/// Configuration failures: a required environment variable is missing or
/// holds a value that cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("Required environment variable {0} is not set")]
    MissingEnvVar(String),

    /// An environment variable has an unusable value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl ConfigError {
    pub fn missing_env_var(name: impl Into<String>) -> Self {
        ConfigError::MissingEnvVar(name.into())
    }

    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue(name.into(), reason.into())
    }
}

/// Unified error type.
///
/// `Api` and `Timeout` come out of the request adapter, `Validation` from
/// parameter checking, `Io` and `Json` from the installer's file patching.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors, lifted transparently
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The DALL-E API refused the request or could not be reached.
    ///
    /// When the upstream reply carried an error payload, `message` is the
    /// API's own description; a transport failure uses status code 0.
    #[error("DALL-E API error: {message}")]
    Api {
        /// HTTP status returned by the API, 0 when no reply arrived
        status_code: u16,
        /// Human-readable description of the failure
        message: String,
    },

    /// Parameters rejected before any request was issued
    #[error("Validation error: {0}")]
    Validation(String),

    /// File system I/O
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The outbound request hit its deadline
    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),
}

impl Error {
    /// An API error from an HTTP status and message.
    ///
    /// ```
    /// use openai_mcp_common::error::Error;
    ///
    /// let err = Error::api(400, "invalid prompt");
    /// assert_eq!(err.to_string(), "DALL-E API error: invalid prompt");
    /// ```
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status_code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn timeout(seconds: u64) -> Self {
        Error::Timeout(seconds)
    }
}

/// Workspace-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
