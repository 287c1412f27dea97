//! Shared domain types for Confidant.
//!
//! Turns, LLM request/response shapes, configuration, and the error types
//! shared by the core and infrastructure crates.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod error;
pub mod llm;
pub mod turn;
