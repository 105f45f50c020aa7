// HTTP error envelope
//
// Every failure leaves the service as `{"detail": "..."}` with a status
// in one of two classes: 4xx when the caller's input or the source's
// availability is at fault, 5xx when this service is.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::downloader::DownloadError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl From<DownloadError> for ApiError {
    fn from(e: DownloadError) -> Self {
        if e.is_client_error() {
            Self::bad_request(e.to_string())
        } else {
            Self::internal(e.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, detail = %self.detail, "request failed");
        } else {
            warn!(status = %self.status, detail = %self.detail, "request rejected");
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_errors_split_into_two_classes() {
        let e = ApiError::from(DownloadError::InvalidUrl("nope".into()));
        assert_eq!(e.status, StatusCode::BAD_REQUEST);

        let e = ApiError::from(DownloadError::NetworkTimeout);
        assert_eq!(e.status, StatusCode::BAD_REQUEST);

        let e = ApiError::from(DownloadError::ArtifactMissing("gone".into()));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);

        let e = ApiError::from(DownloadError::ToolNotFound("yt-dlp".into()));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
