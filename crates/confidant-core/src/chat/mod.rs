//! The chat pipeline: history, prompt assembly, completion, persistence.
//!
//! `TurnRepository` is the port the infrastructure layer implements;
//! `ChatService` sequences one exchange end to end.

pub mod prompt;
pub mod repository;
pub mod service;
