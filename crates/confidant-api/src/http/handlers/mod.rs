//! Axum route handlers.

pub mod chat;
pub mod page;
