//! Backend REST surface
//!
//! `BackendApi` abstracts every request/response endpoint the client consumes,
//! so the publishing client and health monitor can run against a real HTTP
//! backend or a test double. `BackendClient` is the reqwest implementation.

use async_trait::async_trait;
use tracing::warn;

use crate::catalog::{fallback_platforms, fallback_tones};
use crate::error::ApiError;
use crate::types::{
    GenerationRequest, GenerationResult, HealthResponse, Platform, PublishRequest,
    PublishResponse, PublishStatusResponse, StatusResponse, Tone,
};

pub mod client;
pub mod monitor;

#[cfg(test)]
pub(crate) mod mock;

pub use client::BackendClient;
pub use monitor::{check_once, HealthMonitor, ServiceHealth};

pub const HEALTH_PATH: &str = "/health";
pub const STATUS_PATH: &str = "/status";
pub const PLATFORMS_PATH: &str = "/platforms";
pub const TONES_PATH: &str = "/tones";
pub const GENERATE_PATH: &str = "/generate";
pub const PUBLISH_STATUS_PATH: &str = "/linkedin/status";
pub const PUBLISH_PATH: &str = "/linkedin/post";

#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn health(&self) -> Result<HealthResponse, ApiError>;

    async fn status(&self) -> Result<StatusResponse, ApiError>;

    async fn platforms(&self) -> Result<Vec<Platform>, ApiError>;

    async fn tones(&self) -> Result<Vec<Tone>, ApiError>;

    /// Blocking generation without progress events.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ApiError>;

    async fn publish_status(&self) -> Result<PublishStatusResponse, ApiError>;

    async fn publish(&self, request: &PublishRequest) -> Result<PublishResponse, ApiError>;
}

/// Platforms from the backend, or the built-in catalog if discovery fails.
pub async fn platforms_or_fallback<A: BackendApi + ?Sized>(api: &A) -> Vec<Platform> {
    match api.platforms().await {
        Ok(platforms) if !platforms.is_empty() => platforms,
        Ok(_) => {
            warn!("Backend advertised no platforms, using built-in catalog");
            fallback_platforms()
        }
        Err(e) => {
            warn!(error = %e, "Platform discovery failed, using built-in catalog");
            fallback_platforms()
        }
    }
}

/// Tones from the backend, or the built-in catalog if discovery fails.
pub async fn tones_or_fallback<A: BackendApi + ?Sized>(api: &A) -> Vec<Tone> {
    match api.tones().await {
        Ok(tones) if !tones.is_empty() => tones,
        Ok(_) => {
            warn!("Backend advertised no tones, using built-in catalog");
            fallback_tones()
        }
        Err(e) => {
            warn!(error = %e, "Tone discovery failed, using built-in catalog");
            fallback_tones()
        }
    }
}
