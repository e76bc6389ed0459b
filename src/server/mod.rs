use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use crate::errors::EpaperResult;

pub mod handlers;
pub mod state;

pub use state::AppState;

/// Mount point used when the public base is not a local path.
pub const FILES_ROUTE: &str = "/epapers";

/// Route the document directory is served under, derived from the public
/// base so returned `pdfUrl`s resolve against this server.
pub fn files_route(public_base: &str) -> String {
    let trimmed = public_base.trim_end_matches('/');
    if trimmed.starts_with('/') && !trimmed.starts_with("//") {
        trimmed.to_string()
    } else {
        FILES_ROUTE.to_string()
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();
    let files = ServeDir::new(&state.output_dir);
    let route = files_route(&state.public_base);

    Router::new()
        .route("/api/epaper/templates", get(handlers::list_templates))
        .route("/api/epaper/categories", get(handlers::list_categories))
        .route("/api/epaper/preview", post(handlers::preview_articles))
        .route("/api/epaper/generate", post(handlers::generate))
        .nest_service(&route, files)
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, addr: &str) -> EpaperResult<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "E-paper API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
