//! `GET /`: the chat page.

use axum::extract::State;
use axum::response::Html;

use crate::http::error::AppError;
use crate::state::AppState;

/// Serve the page shell. History is not pre-populated.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(state.views.index_page()?))
}
