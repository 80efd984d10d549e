//! Inbound progress events on the generation stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::types::GenerationResult;

/// Fixed status vocabulary pushed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Connected,
    Started,
    Research,
    Content,
    Image,
    Completed,
    Error,
}

impl ProgressStatus {
    pub const ALL: [ProgressStatus; 7] = [
        ProgressStatus::Connected,
        ProgressStatus::Started,
        ProgressStatus::Research,
        ProgressStatus::Content,
        ProgressStatus::Image,
        ProgressStatus::Completed,
        ProgressStatus::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::Connected => "connected",
            ProgressStatus::Started => "started",
            ProgressStatus::Research => "research",
            ProgressStatus::Content => "content",
            ProgressStatus::Image => "image",
            ProgressStatus::Completed => "completed",
            ProgressStatus::Error => "error",
        }
    }

    /// Progress percentage reached when this status arrives.
    ///
    /// `connected` only moves progress when it releases the pending request,
    /// so it has no fixed value here.
    pub fn progress(self) -> Option<u8> {
        match self {
            ProgressStatus::Started => Some(20),
            ProgressStatus::Research => Some(40),
            ProgressStatus::Content => Some(70),
            ProgressStatus::Image => Some(90),
            ProgressStatus::Completed => Some(100),
            ProgressStatus::Error => Some(0),
            ProgressStatus::Connected => None,
        }
    }
}

/// One message from the backend, as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressEvent {
    pub fn new(status: ProgressStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Decode a raw text frame.
    pub fn decode(raw: &str) -> Result<Self, ApiError> {
        serde_json::from_str(raw)
            .map_err(|e| ApiError::Protocol(format!("Malformed progress message: {}", e)))
    }

    /// Decode the result carried by a `completed` event.
    ///
    /// The backend may send the result as an object or as a JSON string that
    /// still has to be parsed.
    pub fn completion_result(&self) -> Result<GenerationResult, ApiError> {
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| ApiError::Protocol("Completion event carried no result".to_string()))?;
        let parsed = match data {
            Value::String(encoded) => serde_json::from_str(encoded),
            other => serde_json::from_value(other.clone()),
        };
        parsed.map_err(|e| ApiError::Protocol(format!("Malformed completion payload: {}", e)))
    }
}
