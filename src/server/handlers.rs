use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::domain::GenerationOptions;
use crate::errors::EpaperError;
use crate::server::AppState;

fn error_response(status: StatusCode, message: impl std::fmt::Display) -> Response {
    (status, Json(json!({ "error": message.to_string() }))).into_response()
}

fn join_failure(e: tokio::task::JoinError) -> Response {
    error!(error = %e, "Blocking task failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

pub async fn list_templates(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.catalog.list_templates())
}

pub async fn list_categories(State(state): State<Arc<AppState>>) -> Response {
    match tokio::task::spawn_blocking(move || state.catalog.list_categories()).await {
        Ok(categories) => Json(categories).into_response(),
        Err(e) => join_failure(e),
    }
}

pub async fn preview_articles(
    State(state): State<Arc<AppState>>,
    Json(options): Json<GenerationOptions>,
) -> Response {
    match tokio::task::spawn_blocking(move || state.catalog.preview_articles(&options)).await {
        Ok(Ok(preview)) => Json(preview).into_response(),
        Ok(Err(e @ EpaperError::InvalidInput(_))) => error_response(StatusCode::BAD_REQUEST, e),
        Ok(Err(e)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
        Err(e) => join_failure(e),
    }
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(options): Json<GenerationOptions>,
) -> Response {
    match tokio::task::spawn_blocking(move || state.generator.generate(&options)).await {
        Ok(result) if result.success => Json(result).into_response(),
        Ok(result) => (StatusCode::UNPROCESSABLE_ENTITY, Json(result)).into_response(),
        Err(e) => join_failure(e),
    }
}
