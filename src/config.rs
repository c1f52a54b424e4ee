use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 600;

pub const BASE_URL_ENV: &str = "AUTHOR_EXTRACT_BASE_URL";
pub const TIMEOUT_ENV: &str = "AUTHOR_EXTRACT_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Url,
    pub request_timeout: Duration,
    pub output_dir: PathBuf,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            output_dir: PathBuf::from("."),
        })
    }

    /// Reads the base URL and timeout from the environment, falling back to
    /// the defaults when a variable is unset.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url)?;

        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            config = config.with_timeout_secs(raw.trim().parse::<u64>()?)?;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ClientError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_timeout_secs(mut self, seconds: u64) -> Result<Self, ClientError> {
        if seconds == 0 {
            return Err(ClientError::Config(
                "request timeout must be at least 1 second".to_string(),
            ));
        }
        self.request_timeout = Duration::from_secs(seconds);
        Ok(self)
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    let url = Url::parse(&with_slash)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::Config(format!(
            "unsupported base url scheme: {}",
            url.scheme()
        )));
    }
    Ok(url)
}
