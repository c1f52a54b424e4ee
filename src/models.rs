use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const FALLBACK_MODELS: [&str; 3] = ["gemini-2.5-flash", "gemini-2.5-pro", "gemini-3-pro-preview"];
pub const FALLBACK_DEFAULT_MODEL: &str = FALLBACK_MODELS[1];

pub const PROCESS_PDF_PATH: &str = "process-pdf";
pub const MODELS_PATH: &str = "models";
pub const HEALTH_PATH: &str = "health";

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Body of `GET /models`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ModelsResponse {
    #[serde(default)]
    pub models: Option<Vec<String>>,
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServiceStatus {
    pub name: String,
    pub connected: bool,
    pub message: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HealthSnapshot {
    pub timestamp: String,
    pub services: Vec<ServiceStatus>,
}

impl HealthSnapshot {
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|timestamp| timestamp.with_timezone(&Utc))
    }

    pub fn display_timestamp(&self) -> String {
        self.observed_at().map_or_else(
            || self.timestamp.clone(),
            |timestamp| timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        )
    }
}

/// Status and raw text body of one backend response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::{FALLBACK_DEFAULT_MODEL, HealthSnapshot, RawResponse};

    #[test]
    fn fallback_default_is_second_model() {
        assert_eq!(FALLBACK_DEFAULT_MODEL, "gemini-2.5-pro");
    }

    #[test]
    fn success_covers_2xx_only() {
        assert!(RawResponse::new(200, "").is_success());
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(199, "").is_success());
        assert!(!RawResponse::new(300, "").is_success());
        assert!(!RawResponse::new(422, "").is_success());
    }

    #[test]
    fn health_timestamp_formats_rfc3339_and_keeps_other_text() {
        let parsed = HealthSnapshot {
            timestamp: "2025-03-04T05:06:07.123456Z".to_string(),
            services: Vec::new(),
        };
        let raw = HealthSnapshot {
            timestamp: "yesterday".to_string(),
            services: Vec::new(),
        };

        assert_eq!(parsed.display_timestamp(), "2025-03-04 05:06:07 UTC");
        assert_eq!(raw.display_timestamp(), "yesterday");
    }
}
