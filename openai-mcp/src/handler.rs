//! Image generation handler for the OpenAI MCP server.
//!
//! This module provides the `ImageHandler` struct and parameter types for
//! text-to-image generation using OpenAI's DALL-E API.

use openai_mcp_common::error::Error;
use openai_mcp_common::models::{DalleModel, ModelRegistry, DALLE_MODELS};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Base URL of the OpenAI API.
pub const OPENAI_API_BASE_URL: &str = "https://api.openai.com";

/// Path of the image generation endpoint.
const GENERATIONS_PATH: &str = "/v1/images/generations";

/// Default model for image generation.
pub const DEFAULT_MODEL: &str = "dall-e-3";

/// Default image size.
pub const DEFAULT_SIZE: &str = "1024x1024";

/// Default image quality.
pub const DEFAULT_QUALITY: &str = "standard";

/// Default image style.
pub const DEFAULT_STYLE: &str = "vivid";

/// Default response format.
pub const DEFAULT_RESPONSE_FORMAT: &str = "url";

/// Minimum number of images that can be generated.
pub const MIN_IMAGES: u8 = 1;

/// Maximum number of images that can be generated.
pub const MAX_IMAGES: u8 = 10;

/// Valid sizes across all models.
pub const VALID_SIZES: &[&str] = &[
    "256x256",
    "512x512",
    "1024x1024",
    "1792x1024",
    "1024x1792",
];

/// Valid image qualities.
pub const VALID_QUALITIES: &[&str] = &["standard", "hd"];

/// Valid image styles.
pub const VALID_STYLES: &[&str] = &["vivid", "natural"];

/// Valid response formats.
pub const VALID_RESPONSE_FORMATS: &[&str] = &["url", "b64_json"];

/// Upper bound on the outbound API call.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Text-to-image generation parameters.
///
/// Every optional field carries its documented default after
/// deserialization, so the request sent upstream never has an absent field
/// (except `user`, which is omitted when not supplied).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImageGenerateParams {
    /// Text prompt describing the image to generate.
    pub prompt: String,

    /// Model to use for generation. Defaults to "dall-e-3".
    #[serde(default = "default_model")]
    pub model: String,

    /// Number of images to generate (1-10).
    #[serde(default = "default_n")]
    pub n: u8,

    /// Size of the generated image as a WxH string.
    #[serde(default = "default_size")]
    pub size: String,

    /// Quality of the generated image: "standard" or "hd".
    #[serde(default = "default_quality")]
    pub quality: String,

    /// Style of the generated image: "vivid" or "natural".
    #[serde(default = "default_style")]
    pub style: String,

    /// Response format: "url" or "b64_json".
    #[serde(default = "default_response_format")]
    pub response_format: String,

    /// Opaque end-user identifier forwarded for upstream abuse tracking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_n() -> u8 {
    1
}

fn default_size() -> String {
    DEFAULT_SIZE.to_string()
}

fn default_quality() -> String {
    DEFAULT_QUALITY.to_string()
}

fn default_style() -> String {
    DEFAULT_STYLE.to_string()
}

fn default_response_format() -> String {
    DEFAULT_RESPONSE_FORMAT.to_string()
}

/// One rejected parameter: which field, and what was wrong with it.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ImageGenerateParams {
    /// Check every parameter against the fixed enumerations and the
    /// resolved model's constraints, collecting all violations rather than
    /// stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let model = ModelRegistry::resolve_dalle(&self.model);

        if model.is_none() {
            errors.push(ValidationError {
                field: "model".to_string(),
                message: format!(
                    "Unknown model '{}'. Valid models: {}",
                    self.model,
                    DALLE_MODELS
                        .iter()
                        .map(|m| m.id)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            });
        }

        if let Some(model) = model {
            // Validate size against the model's supported sizes
            if !model.supported_sizes.contains(&self.size.as_str()) {
                errors.push(ValidationError {
                    field: "size".to_string(),
                    message: format!(
                        "Invalid size '{}'. Valid options for {}: {}",
                        self.size,
                        model.id,
                        model.supported_sizes.join(", ")
                    ),
                });
            }

            // Validate n against the model's per-request limit
            if self.n > model.max_images {
                errors.push(ValidationError {
                    field: "n".to_string(),
                    message: format!(
                        "{} supports at most {} image(s) per request, got {}",
                        model.id, model.max_images, self.n
                    ),
                });
            }
        } else {
            // If model is unknown, validate against the common size list
            if !VALID_SIZES.contains(&self.size.as_str()) {
                errors.push(ValidationError {
                    field: "size".to_string(),
                    message: format!(
                        "Invalid size '{}'. Valid options: {}",
                        self.size,
                        VALID_SIZES.join(", ")
                    ),
                });
            }
        }

        // Validate n range
        if self.n < MIN_IMAGES || self.n > MAX_IMAGES {
            errors.push(ValidationError {
                field: "n".to_string(),
                message: format!(
                    "n must be between {} and {}, got {}",
                    MIN_IMAGES, MAX_IMAGES, self.n
                ),
            });
        }

        // Validate quality
        if !VALID_QUALITIES.contains(&self.quality.as_str()) {
            errors.push(ValidationError {
                field: "quality".to_string(),
                message: format!(
                    "Invalid quality '{}'. Valid options: {}",
                    self.quality,
                    VALID_QUALITIES.join(", ")
                ),
            });
        }

        // Validate style
        if !VALID_STYLES.contains(&self.style.as_str()) {
            errors.push(ValidationError {
                field: "style".to_string(),
                message: format!(
                    "Invalid style '{}'. Valid options: {}",
                    self.style,
                    VALID_STYLES.join(", ")
                ),
            });
        }

        // Validate response format
        if !VALID_RESPONSE_FORMATS.contains(&self.response_format.as_str()) {
            errors.push(ValidationError {
                field: "response_format".to_string(),
                message: format!(
                    "Invalid response_format '{}'. Valid options: {}",
                    self.response_format,
                    VALID_RESPONSE_FORMATS.join(", ")
                ),
            });
        }

        if self.prompt.trim().is_empty() {
            errors.push(ValidationError {
                field: "prompt".to_string(),
                message: "Prompt cannot be empty".to_string(),
            });
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// The resolved model definition, when the name is known.
    pub fn get_model(&self) -> Option<&'static DalleModel> {
        ModelRegistry::resolve_dalle(&self.model)
    }
}

/// Image generation handler.
///
/// Handles image generation requests using the DALL-E API. Holds the API
/// credential and an HTTP client; issues exactly one outbound call per
/// invocation, with no retries.
pub struct ImageHandler {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl ImageHandler {
    /// Create a new ImageHandler with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, OPENAI_API_BASE_URL.to_string())
    }

    /// Create a new ImageHandler against a custom base URL (for testing).
    pub fn with_base_url(api_key: impl Into<String>, base_url: String) -> Self {
        Self {
            api_key: api_key.into(),
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Get the image generation endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, GENERATIONS_PATH)
    }

    /// Generate images from a text prompt.
    ///
    /// # Arguments
    /// * `params` - Image generation parameters (already defaulted)
    ///
    /// # Returns
    /// * `Ok(DalleResponse)` - The upstream response, passed through opaquely
    /// * `Err(Error)` - If validation fails or the API call fails
    #[instrument(level = "info", name = "generate_image", skip(self, params), fields(model = %params.model, size = %params.size))]
    pub async fn generate_image(&self, params: ImageGenerateParams) -> Result<DalleResponse, Error> {
        // All violations in one message, before any network traffic
        params.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            Error::validation(messages.join("; "))
        })?;

        // Resolve the model to get the canonical ID
        let model = params
            .get_model()
            .ok_or_else(|| Error::validation(format!("Unknown model: {}", params.model)))?;

        info!(model_id = model.id, "Generating image with DALL-E API");

        // The wire request carries the canonical model ID, not the caller's alias
        let mut request = DalleRequest::from(&params);
        request.model = model.id.to_string();

        let endpoint = self.endpoint();
        debug!(endpoint = %endpoint, "Calling DALL-E API");

        let response = self
            .http
            .post(&endpoint)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(REQUEST_TIMEOUT_SECS)
                } else {
                    Error::api(0, format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), upstream_error_message(&body)));
        }

        // Parse response
        let api_response: DalleResponse = response.json().await.map_err(|e| {
            Error::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })?;

        if api_response.data.is_empty() {
            return Err(Error::api(status.as_u16(), "No images returned from API"));
        }

        info!(
            count = api_response.data.len(),
            created = api_response.created,
            "Received images from API"
        );

        Ok(api_response)
    }
}

/// Extract a human-readable message from a DALL-E error body.
///
/// The API reports failures as `{"error": {"message": "..."}}`; anything
/// else falls back to a generic message.
fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<DalleErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| "Unknown error".to_string())
}

// =============================================================================
// API Request/Response Types
// =============================================================================

/// DALL-E API request body.
///
/// All fields except `user` are concrete: defaults have been merged in
/// before this struct is built.
#[derive(Debug, Clone, Serialize)]
pub struct DalleRequest {
    /// Text prompt describing the image
    pub prompt: String,
    /// Model identifier
    pub model: String,
    /// Number of images to generate
    pub n: u8,
    /// Image size as WxH
    pub size: String,
    /// Image quality
    pub quality: String,
    /// Image style
    pub style: String,
    /// Response format
    pub response_format: String,
    /// End-user identifier, omitted when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl From<&ImageGenerateParams> for DalleRequest {
    fn from(params: &ImageGenerateParams) -> Self {
        Self {
            prompt: params.prompt.clone(),
            model: params.model.clone(),
            n: params.n,
            size: params.size.clone(),
            quality: params.quality.clone(),
            style: params.style.clone(),
            response_format: params.response_format.clone(),
            user: params.user.clone(),
        }
    }
}

/// DALL-E API response.
#[derive(Debug, Clone, Deserialize)]
pub struct DalleResponse {
    /// Creation timestamp reported by the API
    pub created: u64,
    /// Generated images, in order
    #[serde(default)]
    pub data: Vec<DalleImage>,
}

/// A single generated image descriptor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DalleImage {
    /// URL of the generated image (response_format "url")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Base64-encoded image data (response_format "b64_json")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
    /// Prompt as rewritten by the model, when supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

/// DALL-E API error body.
#[derive(Debug, Deserialize)]
struct DalleErrorBody {
    #[serde(default)]
    error: Option<DalleErrorDetail>,
}

/// DALL-E API error detail.
#[derive(Debug, Deserialize)]
struct DalleErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params: ImageGenerateParams = serde_json::from_str(r#"{"prompt": "a cat"}"#).unwrap();
        assert_eq!(params.model, DEFAULT_MODEL);
        assert_eq!(params.n, 1);
        assert_eq!(params.size, DEFAULT_SIZE);
        assert_eq!(params.quality, DEFAULT_QUALITY);
        assert_eq!(params.style, DEFAULT_STYLE);
        assert_eq!(params.response_format, DEFAULT_RESPONSE_FORMAT);
        assert!(params.user.is_none());
    }

    fn valid_params() -> ImageGenerateParams {
        ImageGenerateParams {
            prompt: "A beautiful sunset over mountains".to_string(),
            model: "dall-e-3".to_string(),
            n: 1,
            size: "1024x1024".to_string(),
            quality: "hd".to_string(),
            style: "natural".to_string(),
            response_format: "url".to_string(),
            user: None,
        }
    }

    #[test]
    fn test_valid_params() {
        assert!(valid_params().validate().is_ok());
    }

    #[test]
    fn test_invalid_n_zero() {
        let mut params = valid_params();
        params.n = 0;

        let result = params.validate();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.field == "n"));
    }

    #[test]
    fn test_invalid_n_too_high() {
        let mut params = valid_params();
        params.model = "dall-e-2".to_string();
        params.n = 11;

        let result = params.validate();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.field == "n"));
    }

    #[test]
    fn test_n_above_model_limit() {
        // dall-e-3 only supports a single image per request
        let mut params = valid_params();
        params.n = 2;

        let result = params.validate();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.field == "n"));
    }

    #[test]
    fn test_n_within_model_limit() {
        let mut params = valid_params();
        params.model = "dall-e-2".to_string();
        params.size = "512x512".to_string();
        params.n = 10;

        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_invalid_size() {
        let mut params = valid_params();
        params.size = "640x480".to_string();

        let result = params.validate();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.field == "size"));
    }

    #[test]
    fn test_size_unsupported_by_model() {
        // 256x256 is a dall-e-2 size
        let mut params = valid_params();
        params.size = "256x256".to_string();

        let result = params.validate();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        let size_error = errors.iter().find(|e| e.field == "size").unwrap();
        assert!(
            size_error.message.contains("dall-e-3"),
            "Error should name the model: {}",
            size_error.message
        );
    }

    #[test]
    fn test_invalid_model() {
        let mut params = valid_params();
        params.model = "unknown-model".to_string();

        let result = params.validate();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.field == "model"));
    }

    #[test]
    fn test_invalid_quality() {
        let mut params = valid_params();
        params.quality = "ultra".to_string();

        let result = params.validate();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.field == "quality"));
    }

    #[test]
    fn test_invalid_style() {
        let mut params = valid_params();
        params.style = "abstract".to_string();

        let result = params.validate();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.field == "style"));
    }

    #[test]
    fn test_invalid_response_format() {
        let mut params = valid_params();
        params.response_format = "png".to_string();

        let result = params.validate();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.field == "response_format"));
    }

    #[test]
    fn test_empty_prompt() {
        let mut params = valid_params();
        params.prompt = "   ".to_string();

        let result = params.validate();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.field == "prompt"));
    }

    #[test]
    fn test_validation_multiple_errors() {
        let params = ImageGenerateParams {
            prompt: "   ".to_string(),
            model: "unknown-model".to_string(),
            n: 0,
            size: "invalid".to_string(),
            quality: "ultra".to_string(),
            style: "abstract".to_string(),
            response_format: "png".to_string(),
            user: None,
        };

        let result = params.validate();
        assert!(result.is_err());

        let errors = result.unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"prompt"));
        assert!(fields.contains(&"model"));
        assert!(fields.contains(&"n"));
        assert!(fields.contains(&"size"));
        assert!(fields.contains(&"quality"));
        assert!(fields.contains(&"style"));
        assert!(fields.contains(&"response_format"));
    }

    #[test]
    fn test_get_model() {
        let params = valid_params();
        let model = params.get_model();
        assert!(model.is_some());
        assert_eq!(model.unwrap().id, "dall-e-3");
    }

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError {
            field: "prompt".to_string(),
            message: "cannot be empty".to_string(),
        };

        let display = format!("{}", error);
        assert_eq!(display, "prompt: cannot be empty");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let params = ImageGenerateParams {
            prompt: "A cat".to_string(),
            model: "dall-e-2".to_string(),
            n: 2,
            size: "512x512".to_string(),
            quality: "standard".to_string(),
            style: "vivid".to_string(),
            response_format: "b64_json".to_string(),
            user: Some("user-1234".to_string()),
        };

        let json = serde_json::to_string(&params).unwrap();
        let deserialized: ImageGenerateParams = serde_json::from_str(&json).unwrap();

        assert_eq!(params, deserialized);
    }

    #[test]
    fn test_endpoint_url() {
        let handler = ImageHandler::new("sk-test");
        assert_eq!(
            handler.endpoint(),
            "https://api.openai.com/v1/images/generations"
        );
    }

    #[test]
    fn test_upstream_error_message_conventional_shape() {
        let body = r#"{"error": {"message": "invalid prompt"}}"#;
        assert_eq!(upstream_error_message(body), "invalid prompt");
    }

    #[test]
    fn test_upstream_error_message_missing_message() {
        let body = r#"{"error": {"code": "server_error"}}"#;
        assert_eq!(upstream_error_message(body), "Unknown error");
    }

    #[test]
    fn test_upstream_error_message_not_json() {
        assert_eq!(upstream_error_message("<html>502</html>"), "Unknown error");
        assert_eq!(upstream_error_message(""), "Unknown error");
    }
}
