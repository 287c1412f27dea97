//! HTTP layer: two routes serving HTML for an HTMX-driven page.

pub mod error;
pub mod handlers;
pub mod router;
pub mod views;
