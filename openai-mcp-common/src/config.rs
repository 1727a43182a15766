//! Process configuration, sourced from the environment.

use crate::error::ConfigError;

/// Everything the server reads from its environment.
///
/// The API key is deliberately optional here: the server starts without
/// one, and each `generate_image` call fails individually until a key is
/// provided. See [`Config::require_api_key`].
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key
    pub api_key: Option<String>,
    /// HTTP server port
    pub port: u16,
}

impl Config {
    /// Read the environment, after loading a `.env` file when one exists.
    ///
    /// An empty `OPENAI_API_KEY` counts as absent.
    ///
    /// # Errors
    /// `ConfigError::InvalidValue` when `PORT` is set but does not parse
    /// as a port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| {
                ConfigError::invalid_value("PORT", format!("'{}' is not a valid port number", raw))
            })?,
            Err(_) => 8080,
        };

        Ok(Self { api_key, port })
    }

    /// The API key, or the error each tool call reports while it is
    /// missing.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ConfigError::missing_env_var("OPENAI_API_KEY"))
    }
}
