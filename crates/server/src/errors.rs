use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::errors::ServiceError;
use thiserror::Error;

pub const INVALID_ID_DETAIL: &str = "Invalid ID";
pub const NOT_FOUND_DETAIL: &str = "Department not found";

/// Error body: `{"detail": "..."}`. The HTTP status is the only machine
/// readable signal.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into() }
    }

    /// Map a service failure; `internal_detail` replaces whatever the store
    /// reported so nothing from the driver reaches the caller.
    pub fn from_service(err: ServiceError, internal_detail: &str) -> Self {
        match err {
            ServiceError::InvalidIdentifier(_) => Self::new(StatusCode::BAD_REQUEST, INVALID_ID_DETAIL),
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, NOT_FOUND_DETAIL),
            ServiceError::Db(_) | ServiceError::Internal(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, internal_detail)
            }
        }
    }
}

/// Malformed input keeps the status axum picked (400, 415 or 422) and
/// moves the rejection text into `detail`.
impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: &self.detail })).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::InvalidIdentifier("x".into()), StatusCode::BAD_REQUEST, INVALID_ID_DETAIL),
            (ServiceError::not_found("department"), StatusCode::NOT_FOUND, NOT_FOUND_DETAIL),
            (ServiceError::Db("socket closed".into()), StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            (ServiceError::Internal("vanished".into()), StatusCode::INTERNAL_SERVER_ERROR, "boom"),
        ];
        for (err, status, detail) in cases {
            let mapped = JsonApiError::from_service(err, "boom");
            assert_eq!(mapped.status, status);
            assert_eq!(mapped.detail, detail);
        }
    }

    #[tokio::test]
    async fn rejections_render_a_detail_body() {
        use axum::extract::{FromRequestParts, Query};
        use axum::http::Request;

        #[derive(Debug, serde::Deserialize)]
        struct NeedsName {
            #[allow(dead_code)]
            name: String,
        }

        let (mut parts, _) = Request::builder().uri("/x?skip=1").body(()).unwrap().into_parts();
        let rejection = Query::<NeedsName>::from_request_parts(&mut parts, &()).await.unwrap_err();
        let mapped = JsonApiError::from(rejection);
        assert_eq!(mapped.status, StatusCode::BAD_REQUEST);
        assert!(mapped.detail.contains("name"));

        let resp = mapped.into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["detail"].as_str().is_some_and(|d| d.contains("missing field")));
    }
}
