use async_trait::async_trait;
use thiserror::Error;

use crate::core::config::BackendConfig;
use crate::features::reports::services::ReportPayload;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to build report request: {0}")]
    Payload(String),

    #[error("report request failed: {0}")]
    Transport(String),

    #[error("backend responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Persists submitted reports
#[async_trait]
pub trait ReportBackend: Send + Sync {
    async fn create(&self, payload: ReportPayload) -> Result<(), BackendError>;
}

/// Village backend reached over HTTP
pub struct ReportApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ReportApiClient {
    pub fn new(config: &BackendConfig) -> reqwest::Result<Self> {
        Ok(Self {
            http_client: reqwest::Client::builder().timeout(config.timeout).build()?,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl ReportBackend for ReportApiClient {
    async fn create(&self, payload: ReportPayload) -> Result<(), BackendError> {
        let url = format!("{}/reports", self.base_url);
        let has_image = payload.image.is_some();
        let form = payload
            .into_multipart()
            .map_err(|e| BackendError::Payload(e.to_string()))?;

        tracing::debug!("Posting report to {} (image: {})", url, has_image);

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Report request failed: {}", e);
                BackendError::Transport(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Backend error: HTTP {} - {}", status, body);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
