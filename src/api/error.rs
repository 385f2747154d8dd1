//! HTTP mapping of service errors.

use crate::error::ScanError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

impl ScanError {
    /// Status code this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScanError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ScanError::NotFound(_) => StatusCode::NOT_FOUND,
            ScanError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ScanError::Io(_) | ScanError::Corrupt(_) | ScanError::Export(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the log.
        let detail = match &self {
            ScanError::InvalidInput(_) => "Invalid domain".to_string(),
            ScanError::NotFound(_) => "Scan not found".to_string(),
            ScanError::Unavailable => self.to_string(),
            ScanError::Export(_) => {
                error!("{}", self);
                "Failed to export scan".to_string()
            }
            ScanError::Io(_) | ScanError::Corrupt(_) => {
                error!("{}", self);
                "Internal server error".to_string()
            }
        };

        let body = Json(serde_json::json!({ "detail": detail }));

        (status, body).into_response()
    }
}
