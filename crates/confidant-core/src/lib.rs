//! Chat pipeline and port (trait) definitions for Confidant.
//!
//! This crate defines the traits the infrastructure layer implements and the
//! service that sequences an exchange. It depends only on `confidant-types` --
//! never on `confidant-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
