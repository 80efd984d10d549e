//! reqwest-backed `BackendApi`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{
    BackendApi, GENERATE_PATH, HEALTH_PATH, PLATFORMS_PATH, PUBLISH_PATH, PUBLISH_STATUS_PATH,
    STATUS_PATH, TONES_PATH,
};
use crate::config::BackendConfig;
use crate::error::ApiError;
use crate::types::{
    GenerationRequest, GenerationResult, HealthResponse, Platform, PlatformList, PublishRequest,
    PublishResponse, PublishStatusResponse, StatusResponse, Tone, ToneList,
};

pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .no_proxy()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        debug!(url = %url, "GET");
        let response = self.client.get(&url).send().await.map_err(map_http_error)?;
        decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        debug!(url = %url, "POST");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_http_error)?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(status.as_u16(), &body));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Protocol(format!("Failed to decode response: {}", e)))
}

/// Error for a non-success status; FastAPI-style `detail` bodies are unwrapped.
pub fn status_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| match v.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .unwrap_or_else(|| body.trim().to_string());
    match status {
        404 => ApiError::NotFound(message),
        _ => ApiError::Http { status, message },
    }
}

fn map_http_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout(error.to_string())
    } else if error.is_connect() {
        ApiError::ConnectionFailed(error.to_string())
    } else if let Some(status) = error.status() {
        ApiError::Http {
            status: status.as_u16(),
            message: error.to_string(),
        }
    } else {
        ApiError::Transport(format!("HTTP error: {}", error))
    }
}

#[async_trait]
impl BackendApi for BackendClient {
    async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.get(HEALTH_PATH).await
    }

    async fn status(&self) -> Result<StatusResponse, ApiError> {
        self.get(STATUS_PATH).await
    }

    async fn platforms(&self) -> Result<Vec<Platform>, ApiError> {
        let list: PlatformList = self.get(PLATFORMS_PATH).await?;
        Ok(list.platforms)
    }

    async fn tones(&self) -> Result<Vec<Tone>, ApiError> {
        let list: ToneList = self.get(TONES_PATH).await?;
        Ok(list.tones)
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ApiError> {
        request.validate()?;
        self.post(GENERATE_PATH, request).await
    }

    async fn publish_status(&self) -> Result<PublishStatusResponse, ApiError> {
        self.get(PUBLISH_STATUS_PATH).await
    }

    async fn publish(&self, request: &PublishRequest) -> Result<PublishResponse, ApiError> {
        self.post(PUBLISH_PATH, request).await
    }
}
