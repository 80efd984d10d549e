//! In-process `BackendApi` double for unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::BackendApi;
use crate::error::ApiError;
use crate::types::{
    GenerationRequest, GenerationResult, HealthResponse, Platform, PublishRequest,
    PublishResponse, PublishStatusResponse, StatusResponse, Tone,
};

/// Each endpoint answers with its configured value, or fails when unset.
#[derive(Default)]
pub struct MockBackend {
    pub health: Mutex<Option<HealthResponse>>,
    pub status: Mutex<Option<StatusResponse>>,
    pub platforms: Mutex<Option<Vec<Platform>>>,
    pub tones: Mutex<Option<Vec<Tone>>>,
    pub generated: Mutex<Option<GenerationResult>>,
    pub publish_status: Mutex<Option<PublishStatusResponse>>,
    pub publish_response: Mutex<Option<PublishResponse>>,
    pub publish_calls: Mutex<Vec<PublishRequest>>,
    /// When set, `publish` waits for a notification before answering.
    pub publish_gate: Mutex<Option<Arc<Notify>>>,
}

fn unavailable() -> ApiError {
    ApiError::ConnectionFailed("backend unavailable".to_string())
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.health.lock().clone().ok_or_else(unavailable)
    }

    async fn status(&self) -> Result<StatusResponse, ApiError> {
        self.status.lock().clone().ok_or_else(unavailable)
    }

    async fn platforms(&self) -> Result<Vec<Platform>, ApiError> {
        self.platforms.lock().clone().ok_or_else(unavailable)
    }

    async fn tones(&self) -> Result<Vec<Tone>, ApiError> {
        self.tones.lock().clone().ok_or_else(unavailable)
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<GenerationResult, ApiError> {
        self.generated.lock().clone().ok_or_else(unavailable)
    }

    async fn publish_status(&self) -> Result<PublishStatusResponse, ApiError> {
        self.publish_status.lock().clone().ok_or_else(unavailable)
    }

    async fn publish(&self, request: &PublishRequest) -> Result<PublishResponse, ApiError> {
        self.publish_calls.lock().push(request.clone());
        let gate = self.publish_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.publish_response.lock().clone().ok_or_else(unavailable)
    }
}
