use std::future::Future;

use reqwest::Client;
use reqwest::multipart::{Form, Part};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::{HEALTH_PATH, MODELS_PATH, PROCESS_PDF_PATH, RawResponse};
use crate::upload::SelectedFile;

/// The three calls the client makes against the extraction service.
///
/// Implementations return the status and raw text body of any response that
/// arrived; `Err` is reserved for transport failures (unreachable host,
/// timeout, body read errors).
pub trait ExtractionBackend {
    fn process_pdf(
        &self,
        file: &SelectedFile,
        model_id: &str,
    ) -> impl Future<Output = Result<RawResponse, ClientError>>;

    fn models(&self) -> impl Future<Output = Result<RawResponse, ClientError>>;

    fn health(&self) -> impl Future<Output = Result<RawResponse, ClientError>>;
}

pub struct HttpBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("author-extract/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    async fn get(&self, path: &str) -> Result<RawResponse, ClientError> {
        let url = self.config.endpoint(path)?;
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        read_response(response).await
    }
}

impl ExtractionBackend for HttpBackend {
    async fn process_pdf(
        &self,
        file: &SelectedFile,
        model_id: &str,
    ) -> Result<RawResponse, ClientError> {
        let url = self.config.endpoint(PROCESS_PDF_PATH)?;
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .map_err(|error| {
                ClientError::Validation(format!(
                    "invalid media type '{}': {error}",
                    file.media_type
                ))
            })?;
        let form = Form::new()
            .part("file", part)
            .text("model_id", model_id.to_string());

        tracing::debug!(%url, file = %file.name, bytes = file.bytes.len(), model_id, "POST");
        let response = self.client.post(url).multipart(form).send().await?;
        read_response(response).await
    }

    async fn models(&self) -> Result<RawResponse, ClientError> {
        self.get(MODELS_PATH).await
    }

    async fn health(&self) -> Result<RawResponse, ClientError> {
        self.get(HEALTH_PATH).await
    }
}

async fn read_response(response: reqwest::Response) -> Result<RawResponse, ClientError> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    tracing::debug!(status, body_len = body.len(), "response received");
    Ok(RawResponse { status, body })
}
