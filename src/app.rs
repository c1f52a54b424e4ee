use std::path::PathBuf;

use crate::backend::ExtractionBackend;
use crate::catalog::{CatalogResolution, LivenessToken, ModelCatalog, resolve_catalog};
use crate::download::{DownloadSink, ExportFormat};
use crate::error::ClientError;
use crate::health::HealthProbe;
use crate::upload::{SelectedFile, UploadOrchestrator, UploadOutcome};

/// The whole client view: model picker, upload form, results, and the
/// health panel, all talking to one backend.
pub struct ExtractorApp<B> {
    backend: B,
    liveness: LivenessToken,
    catalog: ModelCatalog,
    catalog_applied: bool,
    model_advisory: Option<String>,
    selected_model: String,
    upload: UploadOrchestrator,
    health: HealthProbe,
}

impl<B> ExtractorApp<B>
where
    B: ExtractionBackend,
{
    pub fn new(backend: B) -> Self {
        let catalog = ModelCatalog::fallback();
        let selected_model = catalog.default_model().to_string();
        Self {
            backend,
            liveness: LivenessToken::new(),
            catalog,
            catalog_applied: false,
            model_advisory: None,
            selected_model,
            upload: UploadOrchestrator::new(),
            health: HealthProbe::new(),
        }
    }

    /// Resolves the model catalog. Only the first call has any effect.
    pub async fn mount(&mut self) {
        if self.catalog_applied {
            return;
        }
        let resolution = resolve_catalog(&self.backend, &self.liveness).await;
        self.apply_catalog(resolution);
    }

    /// Applies a lookup result produced with this app's liveness token.
    /// `None` (a discarded lookup) and any result after the first are ignored.
    pub fn apply_catalog(&mut self, resolution: Option<CatalogResolution>) {
        let Some(resolution) = resolution else {
            return;
        };
        if self.catalog_applied || !self.liveness.is_alive() {
            return;
        }
        self.catalog_applied = true;

        if resolution.advisory.is_none() {
            self.selected_model = resolution.catalog.default_model().to_string();
        }
        self.catalog = resolution.catalog;
        self.model_advisory = resolution.advisory;
    }

    pub fn liveness(&self) -> LivenessToken {
        self.liveness.clone()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn model_advisory(&self) -> Option<&str> {
        self.model_advisory.as_deref()
    }

    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    pub fn select_model(&mut self, model_id: impl Into<String>) {
        let model_id = model_id.into();
        if !self.catalog.contains(&model_id) {
            tracing::warn!(model_id, "selected model is not in the active catalog");
        }
        self.selected_model = model_id;
    }

    pub fn select_file(&mut self, file: Option<SelectedFile>) -> Result<(), ClientError> {
        self.upload.select_file(file)
    }

    pub async fn submit(&mut self) -> UploadOutcome {
        self.upload.submit(&self.backend, &self.selected_model).await
    }

    pub fn upload(&self) -> &UploadOrchestrator {
        &self.upload
    }

    pub fn export(&self, format: ExportFormat, sink: &DownloadSink) -> Result<PathBuf, ClientError> {
        sink.export(format, self.upload.rows())
    }

    pub async fn check_health(&mut self) -> &HealthProbe {
        self.health.run(&self.backend).await;
        &self.health
    }

    pub fn health(&self) -> &HealthProbe {
        &self.health
    }

    pub fn close_health(&mut self) {
        self.health.close();
    }

    /// Marks the view as gone; lookups still in flight will be discarded.
    pub fn teardown(&self) {
        self.liveness.invalidate();
    }
}

impl<B> Drop for ExtractorApp<B> {
    fn drop(&mut self) {
        self.liveness.invalidate();
    }
}
