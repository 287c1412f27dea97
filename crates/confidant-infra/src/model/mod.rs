//! Model artifact management.

pub mod download;
