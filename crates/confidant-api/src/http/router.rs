//! Axum router configuration with middleware.
//!
//! Two routes, both HTML: `GET /` serves the page and `POST /chat` returns
//! the fragment HTMX appends to the history. Middleware: request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::page::index))
        .route("/chat", post(handlers::chat::chat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
