//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::FrameNotFound(id) => format!("No frame with id '{}' in the input stream", id),
        other => other.to_string(),
    }
}
