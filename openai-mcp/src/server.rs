//! MCP Server implementation for the OpenAI image server.
//!
//! This module provides the MCP server handler that exposes the
//! `generate_image` tool for text-to-image generation with DALL-E.
//!
//! Error handling is two-tier: anticipated domain failures (missing
//! credential, upstream API errors, parameter validation) are returned as
//! error content inside the tool-call envelope, while protocol-level
//! problems (unknown tool, malformed arguments) are raised as MCP errors.

use crate::handler::{
    ImageGenerateParams, ImageHandler, DalleResponse, DEFAULT_MODEL, DEFAULT_QUALITY,
    DEFAULT_RESPONSE_FORMAT, DEFAULT_SIZE, DEFAULT_STYLE,
};
use openai_mcp_common::config::Config;
use openai_mcp_common::error::Error;
use rmcp::{
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    ErrorData as McpError, ServerHandler,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::borrow::Cow;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// A tool exposed by this server: name, description, and input schema.
pub struct ToolDef {
    /// Tool name as advertised to clients
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Input schema builder
    pub input_schema: fn() -> Map<String, Value>,
}

/// Static tool catalog. `call_tool` carries one dispatch arm per entry.
pub const TOOLS: &[ToolDef] = &[ToolDef {
    name: "generate_image",
    description: "Generate an image using OpenAI's DALL-E API",
    input_schema: generate_image_schema,
}];

fn generate_image_schema() -> Map<String, Value> {
    let schema = json!({
        "type": "object",
        "properties": {
            "prompt": {
                "type": "string",
                "description": "Text description of the desired image",
            },
            "model": {
                "type": "string",
                "description": "DALL-E model to use (dall-e-2 or dall-e-3)",
                "enum": ["dall-e-2", "dall-e-3"],
            },
            "n": {
                "type": "number",
                "description": "Number of images to generate (1-10)",
                "minimum": 1,
                "maximum": 10,
            },
            "size": {
                "type": "string",
                "description": "Size of the generated image",
                "enum": ["256x256", "512x512", "1024x1024", "1792x1024", "1024x1792"],
            },
            "quality": {
                "type": "string",
                "description": "Quality of the generated image",
                "enum": ["standard", "hd"],
            },
            "style": {
                "type": "string",
                "description": "Style of the generated image",
                "enum": ["vivid", "natural"],
            },
            "response_format": {
                "type": "string",
                "description": "Format of the response",
                "enum": ["url", "b64_json"],
            },
            "user": {
                "type": "string",
                "description": "A unique identifier for the end-user",
            },
        },
        "required": ["prompt"],
    });
    match schema {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Tool parameters wrapper for generate_image.
#[derive(Debug, Deserialize)]
pub struct ImageGenerateToolParams {
    /// Text description of the desired image
    pub prompt: String,
    /// DALL-E model to use (default: dall-e-3)
    #[serde(default)]
    pub model: Option<String>,
    /// Number of images to generate (1-10)
    #[serde(default)]
    pub n: Option<u8>,
    /// Size of the generated image
    #[serde(default)]
    pub size: Option<String>,
    /// Quality of the generated image
    #[serde(default)]
    pub quality: Option<String>,
    /// Style of the generated image
    #[serde(default)]
    pub style: Option<String>,
    /// Format of the response
    #[serde(default)]
    pub response_format: Option<String>,
    /// A unique identifier for the end-user
    #[serde(default)]
    pub user: Option<String>,
}

impl From<ImageGenerateToolParams> for ImageGenerateParams {
    fn from(params: ImageGenerateToolParams) -> Self {
        Self {
            prompt: params.prompt,
            model: params.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            n: params.n.unwrap_or(1),
            size: params.size.unwrap_or_else(|| DEFAULT_SIZE.to_string()),
            quality: params.quality.unwrap_or_else(|| DEFAULT_QUALITY.to_string()),
            style: params.style.unwrap_or_else(|| DEFAULT_STYLE.to_string()),
            response_format: params
                .response_format
                .unwrap_or_else(|| DEFAULT_RESPONSE_FORMAT.to_string()),
            user: params.user,
        }
    }
}

/// Success payload for generate_image.
///
/// Only the first image's descriptor is surfaced, even when `n` > 1; `url`
/// carries the image URL or the inline base64 data, whichever the response
/// format produced.
#[derive(Debug, Serialize)]
struct ImageSummary {
    created: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    revised_prompt: Option<String>,
}

impl ImageSummary {
    fn from_response(response: DalleResponse) -> Option<Self> {
        let first = response.data.into_iter().next()?;
        Some(Self {
            created: response.created,
            url: first.url.or(first.b64_json),
            revised_prompt: first.revised_prompt,
        })
    }
}

/// MCP Server for DALL-E image generation.
#[derive(Clone)]
pub struct ImageServer {
    /// Handler for image generation, created on first credentialed call
    handler: Arc<RwLock<Option<ImageHandler>>>,
    /// Server configuration
    config: Config,
}

impl ImageServer {
    /// Create a new ImageServer with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            handler: Arc::new(RwLock::new(None)),
            config,
        }
    }

    /// Create a new ImageServer with a pre-built handler (for testing).
    #[cfg(test)]
    pub fn with_handler(config: Config, handler: ImageHandler) -> Self {
        Self {
            handler: Arc::new(RwLock::new(Some(handler))),
            config,
        }
    }

    /// Initialize the handler (called lazily on first use).
    ///
    /// Fails with a configuration error when no API key is available, which
    /// the caller reports as tool-error content.
    async fn ensure_handler(&self) -> Result<(), Error> {
        let mut handler = self.handler.write().await;
        if handler.is_none() {
            let api_key = self.config.require_api_key()?;
            *handler = Some(ImageHandler::new(api_key));
        }
        Ok(())
    }

    /// Generate an image from a text prompt.
    pub async fn generate_image(
        &self,
        params: ImageGenerateToolParams,
    ) -> Result<CallToolResult, McpError> {
        info!(prompt = %params.prompt, "Generating image");

        // A missing credential is an anticipated failure: report it inside
        // the tool-call envelope so the client can render it as tool output.
        if let Err(e) = self.ensure_handler().await {
            return Ok(CallToolResult::error(vec![Content::text(e.to_string())]));
        }

        let handler_guard = self.handler.read().await;
        let handler = handler_guard
            .as_ref()
            .ok_or_else(|| McpError::internal_error("Handler not initialized", None))?;

        let gen_params: ImageGenerateParams = params.into();
        match handler.generate_image(gen_params).await {
            Ok(response) => {
                let summary = ImageSummary::from_response(response).ok_or_else(|| {
                    McpError::internal_error("Empty image list in successful response", None)
                })?;
                let text = serde_json::to_string_pretty(&summary).map_err(|e| {
                    McpError::internal_error(format!("Failed to encode result: {}", e), None)
                })?;
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }

    /// Dispatch a tool call by name.
    async fn dispatch(
        &self,
        name: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<CallToolResult, McpError> {
        match name {
            "generate_image" => {
                let tool_params: ImageGenerateToolParams = arguments
                    .map(|args| serde_json::from_value(Value::Object(args)))
                    .transpose()
                    .map_err(|e| {
                        McpError::invalid_params(format!("Invalid parameters: {}", e), None)
                    })?
                    .ok_or_else(|| McpError::invalid_params("Missing parameters", None))?;

                self.generate_image(tool_params).await
            }
            _ => Err(McpError::invalid_params(
                format!("Unknown tool: {}", name),
                None,
            )),
        }
    }
}

impl ServerHandler for ImageServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "MCP server for OpenAI API integration. \
                 Use generate_image to create images from text prompts \
                 with DALL-E."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<rmcp::model::ListToolsResult, McpError>> + Send + '_
    {
        async move {
            use rmcp::model::{ListToolsResult, Tool};

            let tools = TOOLS
                .iter()
                .map(|def| Tool {
                    name: Cow::Borrowed(def.name),
                    description: Some(Cow::Borrowed(def.description)),
                    input_schema: Arc::new((def.input_schema)()),
                    annotations: None,
                    icons: None,
                    meta: None,
                    output_schema: None,
                    title: None,
                })
                .collect();

            Ok(ListToolsResult {
                tools,
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        params: rmcp::model::CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move { self.dispatch(params.name.as_ref(), params.arguments).await }
    }
}
