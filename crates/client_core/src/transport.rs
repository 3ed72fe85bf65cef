use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use shared::{
    domain::{ScoreId, ScoreRecord},
    error::GatewayRejection,
    protocol::{ScoresResponse, UpdateScoreRequest, UPLOAD_FIELD},
};
use tracing::debug;

use crate::{
    config::ClientSettings,
    types::{SelectedFile, UploadReceipt},
};

/// Backend that accepts one image per request and processes it into scores.
#[async_trait]
pub trait ImageProcessor: Send + Sync {
    async fn process_image(&self, file: &SelectedFile) -> Result<UploadReceipt>;
}

/// Backend holding the authoritative score history.
#[async_trait]
pub trait ScoreQuery: Send + Sync {
    async fn fetch_scores(&self) -> Result<Vec<ScoreRecord>>;
    async fn update_score(&self, id: ScoreId, update: &UpdateScoreRequest) -> Result<()>;
}

/// HTTP client for the score gateway, serving both backend roles.
#[derive(Clone)]
pub struct HttpGateway {
    http: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("failed to build gateway http client")?;
        Ok(Self::with_client(http, settings.gateway_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

async fn ensure_success(response: Response, operation: &'static str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GatewayRejection::from_body(operation, status.as_u16(), &body).into())
}

#[async_trait]
impl ImageProcessor for HttpGateway {
    async fn process_image(&self, file: &SelectedFile) -> Result<UploadReceipt> {
        let bytes = file.read().await?;
        let size_bytes = bytes.len();
        let mut part = Part::bytes(bytes).file_name(file.filename().to_string());
        if let Some(mime_type) = file.mime_type() {
            part = part
                .mime_str(mime_type)
                .with_context(|| format!("invalid mime type '{mime_type}'"))?;
        }

        debug!(filename = file.filename(), size_bytes, "posting image to gateway");
        let response = self
            .http
            .post(format!("{}/upload", self.base_url))
            .multipart(Form::new().part(UPLOAD_FIELD, part))
            .send()
            .await
            .context("failed to reach gateway upload endpoint")?;
        let response = ensure_success(response, "upload").await?;
        let body = response.text().await.unwrap_or_default();
        Ok(UploadReceipt::from_body(&body))
    }
}

#[async_trait]
impl ScoreQuery for HttpGateway {
    async fn fetch_scores(&self) -> Result<Vec<ScoreRecord>> {
        let response = self
            .http
            .get(format!("{}/scores", self.base_url))
            .send()
            .await
            .context("failed to reach gateway score endpoint")?;
        let body: ScoresResponse = ensure_success(response, "score query")
            .await?
            .json()
            .await
            .context("malformed score history payload")?;
        Ok(body.into_records())
    }

    async fn update_score(&self, id: ScoreId, update: &UpdateScoreRequest) -> Result<()> {
        let response = self
            .http
            .put(format!("{}/scores/{}", self.base_url, id.0))
            .json(update)
            .send()
            .await
            .context("failed to reach gateway score endpoint")?;
        ensure_success(response, "score update").await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
