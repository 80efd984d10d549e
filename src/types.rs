//! Data model shared by the session controller, history cache and backend client.
//!
//! Field names follow the backend's JSON contract (snake_case on the wire).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Minimum topic length, in characters, after trimming.
pub const TOPIC_MIN_CHARS: usize = 3;
/// Maximum topic length, in characters, after trimming.
pub const TOPIC_MAX_CHARS: usize = 100;

/// A content generation job as submitted by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    pub platform: String,
    pub tone: String,
}

impl GenerationRequest {
    pub fn new(
        topic: impl Into<String>,
        platform: impl Into<String>,
        tone: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            platform: platform.into(),
            tone: tone.into(),
        }
    }

    /// Reject malformed requests before anything is sent to the backend.
    pub fn validate(&self) -> Result<(), ApiError> {
        let topic_chars = self.topic.trim().chars().count();
        if topic_chars < TOPIC_MIN_CHARS {
            return Err(ApiError::Validation(format!(
                "Topic must be at least {} characters long",
                TOPIC_MIN_CHARS
            )));
        }
        if topic_chars > TOPIC_MAX_CHARS {
            return Err(ApiError::Validation(format!(
                "Topic must be at most {} characters long",
                TOPIC_MAX_CHARS
            )));
        }
        if self.platform.trim().is_empty() {
            return Err(ApiError::Validation("Please select a platform".to_string()));
        }
        if self.tone.trim().is_empty() {
            return Err(ApiError::Validation("Please select a tone".to_string()));
        }
        Ok(())
    }
}

/// Final output of a generation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    pub topic: String,
    pub platform: String,
    pub tone: String,
    #[serde(rename = "research_bullet_points", default)]
    pub research_points: Vec<String>,
    #[serde(rename = "generated_content", default)]
    pub content: String,
    #[serde(default)]
    pub word_count: u64,
    #[serde(rename = "generated_image_path", default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub execution_time_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A target platform advertised by `GET /platforms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    pub display_name: String,
    pub max_length: Option<u32>,
    pub description: String,
}

/// A writing tone advertised by `GET /tones`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tone {
    pub name: String,
    pub display_name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformList {
    pub platforms: Vec<Platform>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneList {
    pub tones: Vec<Tone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}

/// `GET /status` payload. Workflow details are opaque to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub workflow_status: Map<String, Value>,
    #[serde(default)]
    pub dependencies: Map<String, Value>,
    #[serde(default)]
    pub health: String,
}

/// Audience for a published post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Public,
    Connections,
    LoggedInMembers,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "PUBLIC",
            Visibility::Connections => "CONNECTIONS",
            Visibility::LoggedInMembers => "LOGGED_IN_MEMBERS",
        }
    }
}

impl std::str::FromStr for Visibility {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "PUBLIC" => Ok(Visibility::Public),
            "CONNECTIONS" => Ok(Visibility::Connections),
            "LOGGED_IN_MEMBERS" => Ok(Visibility::LoggedInMembers),
            other => Err(ApiError::Validation(format!(
                "Unknown visibility '{}' (expected PUBLIC, CONNECTIONS or LOGGED_IN_MEMBERS)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResponse {
    pub success: bool,
    #[serde(rename = "linkedin_post_id", default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(rename = "linkedin_url", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub execution_time_seconds: f64,
}

impl PublishResponse {
    /// A response produced locally, without a backend round trip.
    pub fn local_failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            post_id: None,
            url: None,
            error: Some(error.into()),
            execution_time_seconds: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishCapabilities {
    pub text_posting: bool,
    pub image_posting: bool,
    pub video_posting: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishStatusResponse {
    pub configured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<PublishCapabilities>,
}
