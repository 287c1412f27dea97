//! `POST /chat`: run one exchange and return the bubbles to append.

use axum::Form;
use axum::extract::State;
use axum::response::Html;
use serde::Deserialize;

use crate::http::error::AppError;
use crate::state::AppState;

/// Form body of the chat form.
///
/// A request without `prompt` is rejected by the `Form` extractor with 422
/// before this handler runs, so nothing is read, generated, or written.
#[derive(Debug, Deserialize)]
pub struct ChatForm {
    pub prompt: String,
}

pub async fn chat(
    State(state): State<AppState>,
    Form(form): Form<ChatForm>,
) -> Result<Html<String>, AppError> {
    let exchange = state.chat_service.exchange(&form.prompt).await?;
    Ok(Html(state.views.exchange_fragment(&exchange)?))
}
