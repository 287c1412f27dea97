//! Infrastructure layer for Confidant.
//!
//! Implements the traits defined in `confidant-core`: the SQLite turn store
//! and the completion client for the local inference engine. Also hosts the
//! engine process manager, the model downloader, and the config loader.

pub mod config;
pub mod llm;
pub mod model;
pub mod sqlite;
