use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::backend::ExtractionBackend;
use crate::models::{FALLBACK_DEFAULT_MODEL, FALLBACK_MODELS, ModelsResponse, RawResponse};

pub const USING_DEFAULT_MODELS_MESSAGE: &str = "Using default models.";
pub const MODEL_LIST_UNAVAILABLE_MESSAGE: &str = "Unable to fetch model list.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    models: Vec<String>,
    default_model: String,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::fallback()
    }
}

impl ModelCatalog {
    pub fn fallback() -> Self {
        Self {
            models: FALLBACK_MODELS.iter().map(ToString::to_string).collect(),
            default_model: FALLBACK_DEFAULT_MODEL.to_string(),
        }
    }

    /// Builds a catalog from a backend list. Returns `None` for an empty
    /// list; a missing default becomes the first entry.
    pub fn from_models(models: Vec<String>, default_model: Option<String>) -> Option<Self> {
        let first = models.first()?.clone();
        Some(Self {
            models,
            default_model: default_model.unwrap_or(first),
        })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.models.iter().any(|model| model == model_id)
    }
}

/// Result of the one-time catalog lookup. `advisory` is set whenever the
/// fallback catalog stays in effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogResolution {
    pub catalog: ModelCatalog,
    pub advisory: Option<String>,
}

impl CatalogResolution {
    fn fallback(advisory: impl Into<String>) -> Self {
        Self {
            catalog: ModelCatalog::fallback(),
            advisory: Some(advisory.into()),
        }
    }
}

/// Shared flag telling an in-flight lookup whether its owner still exists.
#[derive(Debug, Clone)]
pub struct LivenessToken {
    alive: Arc<AtomicBool>,
}

impl Default for LivenessToken {
    fn default() -> Self {
        Self::new()
    }
}

impl LivenessToken {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn invalidate(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

/// Turns the `/models` response into a catalog, keeping the fallback on any
/// failure or empty list.
pub fn catalog_from_response(response: &RawResponse) -> CatalogResolution {
    if !response.is_success() {
        return CatalogResolution::fallback(MODEL_LIST_UNAVAILABLE_MESSAGE);
    }

    let parsed = match serde_json::from_str::<ModelsResponse>(&response.body) {
        Ok(parsed) => parsed,
        Err(error) => return CatalogResolution::fallback(error.to_string()),
    };

    match ModelCatalog::from_models(parsed.models.unwrap_or_default(), parsed.default) {
        Some(catalog) => CatalogResolution {
            catalog,
            advisory: None,
        },
        None => CatalogResolution::fallback(USING_DEFAULT_MODELS_MESSAGE),
    }
}

/// Fetches the model catalog once. Returns `None` when `token` was
/// invalidated before the response arrived, so the caller applies nothing.
pub async fn resolve_catalog<B>(backend: &B, token: &LivenessToken) -> Option<CatalogResolution>
where
    B: ExtractionBackend,
{
    let settled = backend.models().await;
    if !token.is_alive() {
        tracing::debug!("discarding model catalog for a torn-down view");
        return None;
    }

    let resolution = match settled {
        Ok(response) => catalog_from_response(&response),
        Err(error) => CatalogResolution::fallback(error.message()),
    };

    match &resolution.advisory {
        Some(advisory) => tracing::warn!(%advisory, "using fallback model catalog"),
        None => tracing::info!(
            models = resolution.catalog.models().len(),
            default = resolution.catalog.default_model(),
            "model catalog loaded"
        ),
    }
    Some(resolution)
}
