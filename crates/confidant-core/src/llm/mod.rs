//! Completion client abstractions for Confidant.
//!
//! - `LlmProvider`: RPITIT trait for concrete completion backends
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch

pub mod box_provider;
pub mod provider;
