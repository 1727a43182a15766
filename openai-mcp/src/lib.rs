//! OpenAI MCP Server Library
//!
//! This library exposes OpenAI's DALL-E image generation API as an MCP tool.

pub mod handler;
pub mod install;
pub mod server;

pub use handler::{DalleImage, DalleResponse, ImageGenerateParams, ImageHandler};
pub use server::{ImageGenerateToolParams, ImageServer};
