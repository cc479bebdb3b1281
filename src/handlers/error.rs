// src/handlers/error.rs
use std::fmt;

use warp::http::StatusCode;
use warp::reject::Reject;

/// Route failure carried through a warp rejection and rendered as
/// `{"error": message}` with `status`.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl fmt::Display) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, message.to_string())
    }

    /// Cache or subscriber file could not be read or written.
    pub fn storage_error(message: impl fmt::Display) -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, format!("Storage error: {}", message))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}
impl Reject for ApiError {}
