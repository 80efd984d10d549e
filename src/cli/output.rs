//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::ConnectionFailed(detail) => format!(
            "Unable to connect to backend server. Please check that the backend is running.\n  ({})",
            detail
        ),
        ApiError::Validation(msg) => msg.clone(),
        ApiError::Backend(msg) => format!("Generation failed: {}", msg),
        other => other.to_string(),
    }
}
