//! HTTP surface: routing, shared state, and error mapping.

pub mod handlers;
pub mod rate_limit;

pub use rate_limit::RateLimiter;

use crate::ads::AdStudio;
use crate::image::ImageStudio;
use crate::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

pub const API_PREFIX: &str = "/api/v1";

/// Header carrying the caller-supplied rate-limit identifier.
pub const CLIENT_ID_HEADER: &str = "client-id";

/// Shared service instances, constructed once at startup and injected into
/// every handler.
#[derive(Clone)]
pub struct AppState {
    pub ads: Arc<AdStudio>,
    pub images: Arc<ImageStudio>,
    pub limiter: Arc<RateLimiter>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/generate", post(handlers::generate_ad))
        .route("/generate-stream", post(handlers::generate_ad_stream))
        .route("/generate-image", post(handlers::generate_image))
        .route("/images/:file_name", get(handlers::get_image));

    Router::new()
        .nest(API_PREFIX, v1)
        .route("/healthcheck", get(handlers::healthcheck))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Handler-level error wrapper mapping domain errors to HTTP responses.
///
/// Every error body carries a fresh request id so operators can correlate
/// a user-visible failure with logs.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Error::RateLimited => (StatusCode::FORBIDDEN, "rate_limit_exceeded"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "generation_failed"),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }

        let body = json!({
            "error": code,
            "message": self.0.to_string(),
            "request_id": Uuid::new_v4().to_string(),
        });
        (status, Json(body)).into_response()
    }
}
