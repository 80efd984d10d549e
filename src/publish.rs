//! One-shot publishing to the external social integration.
//!
//! `PublishingClient` wraps `GET /linkedin/status` and `POST /linkedin/post`
//! with its own configured/posting/error state. Neither operation returns an
//! error: failures are reported through the state and the returned response.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::backend::BackendApi;
use crate::types::{PublishCapabilities, PublishRequest, PublishResponse, Visibility};

pub const STATUS_CHECK_FAILED: &str = "Failed to check LinkedIn configuration";
pub const POST_FAILED: &str = "Failed to post to LinkedIn";
pub const EMPTY_CONTENT: &str = "Content cannot be empty";
pub const ALREADY_POSTING: &str = "A post is already in progress";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishState {
    pub is_configured: bool,
    pub capabilities: Option<PublishCapabilities>,
    pub is_posting: bool,
    pub posting_error: Option<String>,
    pub last_post_url: Option<String>,
}

pub struct PublishingClient<A: BackendApi> {
    api: Arc<A>,
    state: Mutex<PublishState>,
}

impl<A: BackendApi> PublishingClient<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Mutex::new(PublishState::default()),
        }
    }

    pub fn state(&self) -> PublishState {
        self.state.lock().clone()
    }

    /// Query whether the integration is configured.
    pub async fn check_status(&self) -> PublishState {
        let outcome = self.api.publish_status().await;
        let mut state = self.state.lock();
        match outcome {
            Ok(status) => {
                state.is_configured = status.configured;
                state.capabilities = status.capabilities;
                state.posting_error = status.error;
            }
            Err(e) => {
                warn!(error = %e, "Publish status check failed");
                state.is_configured = false;
                state.capabilities = None;
                state.posting_error = Some(STATUS_CHECK_FAILED.to_string());
            }
        }
        state.clone()
    }

    /// Publish `content`. At most one publish runs at a time; a second call
    /// while one is in flight is rejected without touching the backend.
    pub async fn publish(
        &self,
        content: &str,
        image_path: Option<&str>,
        visibility: Visibility,
    ) -> PublishResponse {
        if content.trim().is_empty() {
            return PublishResponse::local_failure(EMPTY_CONTENT);
        }

        {
            let mut state = self.state.lock();
            if state.is_posting {
                warn!("Publish rejected, another post is in flight");
                return PublishResponse::local_failure(ALREADY_POSTING);
            }
            state.is_posting = true;
            state.posting_error = None;
        }

        let request = PublishRequest {
            content: content.to_string(),
            image_path: image_path.map(str::to_string),
            visibility,
        };
        let outcome = self.api.publish(&request).await;

        let mut state = self.state.lock();
        state.is_posting = false;
        match outcome {
            Ok(response) => {
                if response.success {
                    info!(url = ?response.url, "Post published");
                    state.posting_error = None;
                } else {
                    state.posting_error =
                        Some(response.error.clone().unwrap_or_else(|| POST_FAILED.to_string()));
                }
                state.last_post_url = response.url.clone();
                response
            }
            Err(e) => {
                error!(error = %e, "Publish request failed");
                let message = e.to_string();
                state.posting_error = Some(message.clone());
                PublishResponse::local_failure(message)
            }
        }
    }

    /// Clear posting progress, error and last URL. Configuration is kept.
    pub fn reset_posting_state(&self) {
        let mut state = self.state.lock();
        state.is_posting = false;
        state.posting_error = None;
        state.last_post_url = None;
    }

    pub fn set_posting_error(&self, error: Option<String>) {
        self.state.lock().posting_error = error;
    }
}
