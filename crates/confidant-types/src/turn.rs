//! Conversation turn types for Confidant.
//!
//! A turn is one recorded message in the single, global conversation log.
//! Turns are created two at a time (user then assistant) and never change.

use serde::{Deserialize, Serialize};

pub use crate::llm::MessageRole;
use crate::llm::Message;

/// One persisted chat message.
///
/// `id` is assigned by the store and strictly increases with insertion order,
/// so ordering by `id` is chronological ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: i64,
    pub role: MessageRole,
    pub content: String,
}

impl Turn {
    /// The role/content pair sent to the model for this turn.
    pub fn to_message(&self) -> Message {
        Message::new(self.role, self.content.clone())
    }
}

/// The two turns written by one successful chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub user: Turn,
    pub assistant: Turn,
}
