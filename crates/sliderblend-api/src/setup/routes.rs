//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sliderblend_core::Config;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Headroom on top of the document limit for multipart boundaries and headers.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router {
    // The validator reports oversized files precisely; the body limit only stops
    // clients from streaming far past it.
    let upload_limit = config.max_document_size_bytes() + MULTIPART_OVERHEAD_BYTES;

    let upload_routes = Router::new()
        .route("/file/upload", post(handlers::files::upload_file))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(upload_limit));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/bot/chunk", post(handlers::bot::create_chunk_job))
        .route("/process/{id}", get(handlers::process::get_process_status))
        .merge(upload_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
