//! Shared plumbing for the OpenAI MCP server: configuration, the error
//! hierarchy, the DALL-E model registry, transport selection, the server
//! runner, and log setup.

pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod tracing;
pub mod transport;

#[cfg(test)]
mod error_test;

pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use models::{DalleModel, ModelRegistry, DALLE_MODELS};
pub use server::{McpServerBuilder, ServerError, shutdown_channel};
pub use transport::{Transport, TransportArgs, TransportMode};
