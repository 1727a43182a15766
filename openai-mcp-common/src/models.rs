//! Static DALL-E model definitions.
//!
//! The registry maps model names (and convenience aliases) to the
//! constraints the API enforces per model, so parameter validation can
//! reject a request locally with a message that names the real limit.

use serde::Serialize;

/// Constraints for one DALL-E model.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DalleModel {
    /// Canonical model identifier, as sent on the wire
    pub id: &'static str,
    /// Accepted spellings besides the canonical id
    #[serde(skip)]
    pub aliases: &'static [&'static str],
    /// Image sizes this model can produce, as WxH strings
    pub supported_sizes: &'static [&'static str],
    /// Per-request image count limit
    pub max_images: u8,
}

/// DALL-E 2: up to 10 images per request, square sizes only.
pub const DALL_E_2: DalleModel = DalleModel {
    id: "dall-e-2",
    aliases: &["dalle-2", "dalle2"],
    supported_sizes: &["256x256", "512x512", "1024x1024"],
    max_images: 10,
};

/// DALL-E 3: one image per request, square and wide/tall sizes.
pub const DALL_E_3: DalleModel = DalleModel {
    id: "dall-e-3",
    aliases: &["dalle-3", "dalle3"],
    supported_sizes: &["1024x1024", "1792x1024", "1024x1792"],
    max_images: 1,
};

/// Every model this server accepts.
pub const DALLE_MODELS: &[DalleModel] = &[DALL_E_2, DALL_E_3];

/// Lookup over the static definitions.
pub struct ModelRegistry;

impl ModelRegistry {
    /// Resolve a model name or alias to its definition.
    ///
    /// ```
    /// use openai_mcp_common::models::ModelRegistry;
    ///
    /// assert!(ModelRegistry::resolve_dalle("dall-e-3").is_some());
    /// assert!(ModelRegistry::resolve_dalle("dalle-3").is_some());
    /// assert!(ModelRegistry::resolve_dalle("dall-e-9").is_none());
    /// ```
    pub fn resolve_dalle(name: &str) -> Option<&'static DalleModel> {
        DALLE_MODELS
            .iter()
            .find(|model| model.id == name || model.aliases.contains(&name))
    }

    /// All model definitions, for listings and error messages.
    pub fn list_dalle_models() -> &'static [DalleModel] {
        DALLE_MODELS
    }
}
