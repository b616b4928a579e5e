use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
    /// Non-success response from the completion endpoint, forwarded with the
    /// original status code and body so callers see the upstream diagnostics.
    #[error("completion request failed: {status}")]
    CompletionFailed { status: StatusCode, detail: String },
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    pub fn upstream<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, json!({ "error": msg })),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            ApiError::CompletionFailed { status, detail } => (
                status,
                json!({ "error": "completion_request_failed", "detail": detail }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_failed_keeps_upstream_status() {
        let err = ApiError::CompletionFailed {
            status: StatusCode::TOO_MANY_REQUESTS,
            detail: "rate limited".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn bad_request_maps_to_400() {
        let response = ApiError::BadRequest("empty upload".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
