use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Failure taxonomy for the HTTP API. Bodies are always `{"error": ...}`;
/// upstream and database detail stays in the logs, never in the response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed request input.
    #[error("{0}")]
    Validation(String),
    /// No refresh token (or sample credentials) available.
    #[error("eloverblik credentials are not configured")]
    NotConfigured,
    /// The Eloverblik API call failed; the message carries internal detail.
    #[error("upstream request failed: {0}")]
    Upstream(String),
    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Upstream(e.to_string())
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured | Self::Upstream(_) | Self::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::NotConfigured => "No refresh token configured".to_string(),
            Self::Upstream(_) => "Failed to fetch data from Eloverblik".to_string(),
            Self::Storage(_) => "Database error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request_with_the_given_message() {
        let err = ApiError::Validation("Missing required data".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Missing required data");
    }

    #[test]
    fn upstream_detail_is_not_surfaced() {
        let err = ApiError::Upstream("token endpoint returned 403: secret detail".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Failed to fetch data from Eloverblik");
    }

    #[test]
    fn storage_errors_stay_generic() {
        let err = ApiError::from(sqlx::Error::PoolClosed);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Database error");
    }
}
