//! Request handlers for the ad and image generation endpoints.

use super::{ApiError, AppState, CLIENT_ID_HEADER};
use crate::image::storage::detect_image_mime;
use crate::models::{
    AdRequest, AdResponse, AdTone, AdType, ImageRequest, ImageResult, StreamEvent,
};
use crate::Error;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use futures::StreamExt;
use serde_json::json;
use std::convert::Infallible;
use validator::Validate;

/// Liveness probe; reports no dependency state.
pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
    }))
}

/// POST /api/v1/generate
pub async fn generate_ad(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AdRequest>,
) -> Result<Json<AdResponse>, ApiError> {
    enforce_rate_limit(&state, &headers)?;
    validate(&request)?;

    let (ad_type, ad_tone) = resolve_settings(&request);
    let response = state.ads.generate(&request, ad_type, ad_tone).await?;
    Ok(Json(response))
}

/// POST /api/v1/generate-stream
///
/// Responds with newline-delimited JSON events. Caching and proxy buffering
/// are disabled end-to-end so fragments reach the client as produced.
pub async fn generate_ad_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AdRequest>,
) -> Result<Response, ApiError> {
    enforce_rate_limit(&state, &headers)?;
    validate(&request)?;

    let (ad_type, ad_tone) = resolve_settings(&request);
    let events = state.ads.generate_streaming(request, ad_type, ad_tone);
    let body = Body::from_stream(events.map(|event| Ok::<_, Infallible>(ndjson_line(&event))));

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("X-Accel-Buffering", "no")
        .body(body)
        .unwrap())
}

/// POST /api/v1/generate-image
///
/// A `null` body is a valid 200: no image was provided or produced.
pub async fn generate_image(
    State(state): State<AppState>,
    Json(request): Json<ImageRequest>,
) -> Result<Json<Option<ImageResult>>, ApiError> {
    validate(&request)?;

    let result = state
        .images
        .resolve_image(
            &request.product_name,
            request.brand_name.as_deref(),
            request.description.as_deref(),
            request.image_url.as_deref(),
            None,
            request.generate_image,
        )
        .await;
    Ok(Json(result))
}

/// GET /api/v1/images/{file_name}
pub async fn get_image(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, ApiError> {
    let path = state.images.store().resolve(&file_name)?;
    let bytes = tokio::fs::read(&path).await.map_err(Error::from)?;
    let content_type = detect_image_mime(&bytes);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(bytes))
        .unwrap())
}

/// Defaults for absent ad settings are applied here, before the prompt
/// registry ever sees the values.
fn resolve_settings(request: &AdRequest) -> (AdType, AdTone) {
    (
        request.ad_type.unwrap_or_default(),
        request.ad_tone.unwrap_or_default(),
    )
}

fn enforce_rate_limit(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let client_id = headers
        .get(CLIENT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::Validation(format!("{} header is required", CLIENT_ID_HEADER)))?;

    if !state.limiter.check(client_id) {
        return Err(ApiError(Error::RateLimited));
    }
    Ok(())
}

fn validate<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError(Error::Validation(e.to_string())))
}

fn ndjson_line(event: &StreamEvent) -> String {
    match serde_json::to_string(event) {
        Ok(line) => line + "\n",
        Err(e) => {
            tracing::error!("Failed to serialize stream event: {}", e);
            format!(
                "{}\n",
                json!({
                    "status": "error",
                    "message": "event serialization failed",
                    "error_code": "generation_failed",
                    "request_id": uuid::Uuid::new_v4().to_string(),
                })
            )
        }
    }
}
