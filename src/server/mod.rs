//! HTTP transport for the conversion handler.
//!
//! Provides REST endpoints for:
//! - `POST /convert`: multipart upload, answered with a DOCX attachment
//! - `POST /convert-base64`: JSON `{fileData, fileName?}`, answered with base64 JSON
//! - `POST /api/pdf2word`: either of the above, chosen by `Content-Type`
//! - `GET /health`, `GET /api/health`
//!
//! All three conversion routes share [`crate::Handler::convert`]; errors are
//! rendered as `{"error": "..."}` with 400 or 500 by [`error`].

pub mod error;
pub mod routes;

use crate::handler::Handler;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and part headers on top of the file itself.
const ENVELOPE_OVERHEAD: usize = 64 * 1024;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub handler: Handler,
}

/// Build the application router.
///
/// Used by the `pdf2word-server` binary and by the integration tests.
pub fn router(handler: Handler) -> Router {
    // base64 inflates the payload by a third
    let body_limit = handler
        .config()
        .max_upload_bytes
        .saturating_mul(4)
        .div_ceil(3)
        .saturating_add(ENVELOPE_OVERHEAD);
    let state = Arc::new(AppState { handler });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/health", get(routes::health))
        .route("/convert", post(routes::convert_upload))
        .route("/convert-base64", post(routes::convert_base64))
        .route("/api/pdf2word", post(routes::convert_any))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
