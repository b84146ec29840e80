use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kartei_import::ImportError;
use kartei_store::error::StoreError;
use serde_json::json;
use thiserror::Error;

/// Request-level failures, rendered as `{"error", "message"}` JSON bodies.
/// Per-row import failures never show up here; they travel inside the
/// confirm summary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or invalid bearer token")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("phone already exists: {0}")]
    DuplicatePhone(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DuplicatePhone(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "unauthorized",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::DuplicatePhone(_) => "duplicate_phone",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicatePhone(phone) => ApiError::DuplicatePhone(phone),
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Core(core) => ApiError::BadRequest(core.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Store(store) => ApiError::from(store),
            ImportError::Csv(csv) => ApiError::Internal(csv.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use kartei_store::error::StoreError;

    #[test]
    fn statuses_match_variants() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::DuplicatePhone("+491512345678".to_string()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::NotFound("+491512345678".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn duplicate_phone_store_error_maps_to_conflict() {
        let err = ApiError::from(StoreError::DuplicatePhone("+491512345678".to_string()));
        assert_eq!(err.code(), "duplicate_phone");
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn response_body_carries_code_and_message() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("parse body");
        assert_eq!(json["error"], "unauthorized");
        assert!(json["message"].as_str().is_some());
    }
}
