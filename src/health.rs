use crate::backend::ExtractionBackend;
use crate::error::ClientError;
use crate::models::{HealthSnapshot, RawResponse};

pub const HEALTH_UNAVAILABLE_MESSAGE: &str = "Health endpoint unavailable.";

/// On-demand dependency check. Each run replaces the previous snapshot or
/// error wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthProbe {
    open: bool,
    loading: bool,
    snapshot: Option<HealthSnapshot>,
    error: Option<String>,
}

pub fn snapshot_from_response(response: &RawResponse) -> Result<HealthSnapshot, String> {
    if !response.is_success() {
        return Err(HEALTH_UNAVAILABLE_MESSAGE.to_string());
    }
    serde_json::from_str::<HealthSnapshot>(&response.body).map_err(|error| error.to_string())
}

impl HealthProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run<B>(&mut self, backend: &B)
    where
        B: ExtractionBackend,
    {
        self.begin();
        let settled = backend.health().await;
        self.finish(settled);
    }

    /// Opens the view and enters the loading state for a new request.
    pub fn begin(&mut self) {
        self.open = true;
        self.loading = true;
        self.error = None;
    }

    /// Records the settled request, replacing any earlier snapshot or error.
    pub fn finish(&mut self, settled: Result<RawResponse, ClientError>) {
        let settled = settled
            .map_err(|error| error.message().to_string())
            .and_then(|response| snapshot_from_response(&response));

        match settled {
            Ok(snapshot) => {
                tracing::info!(services = snapshot.services.len(), "health snapshot received");
                self.snapshot = Some(snapshot);
                self.error = None;
            }
            Err(error) => {
                tracing::warn!(%error, "health probe failed");
                self.snapshot = None;
                self.error = Some(error);
            }
        }
        self.loading = false;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn snapshot(&self) -> Option<&HealthSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Text rendering of the health view.
    pub fn render(&self) -> String {
        if self.loading {
            return "Loading status…".to_string();
        }
        if let Some(error) = &self.error {
            return error.clone();
        }
        let Some(snapshot) = &self.snapshot else {
            return "No health data available.".to_string();
        };

        let mut lines = vec![format!("Snapshot: {}", snapshot.display_timestamp())];
        lines.extend(snapshot.services.iter().map(|service| {
            format!(
                "{}: {} - {}",
                service.name,
                if service.connected { "connected" } else { "offline" },
                service.message
            )
        }));
        lines.join("\n")
    }
}
