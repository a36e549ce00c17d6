//! Message types for marketplace messaging

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message entity
///
/// Append-only: `body` is immutable after creation, only `read_by` grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub read_by: Vec<ReadReceipt>,
    pub created_at: DateTime<Utc>,
}

/// Read receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub user_id: Uuid,
    pub read_at: DateTime<Utc>,
}

impl Message {
    /// Create a new message. The sender has read their own message.
    pub fn new(conversation_id: Uuid, sender_id: Uuid, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            body,
            read_by: vec![ReadReceipt {
                user_id: sender_id,
                read_at: now,
            }],
            created_at: now,
        }
    }

    pub fn is_read_by(&self, user_id: &Uuid) -> bool {
        self.read_by.iter().any(|r| r.user_id == *user_id)
    }

    /// Unread means: addressed to `user_id` (they did not send it) and no
    /// receipt from them yet.
    pub fn is_unread_by(&self, user_id: &Uuid) -> bool {
        self.sender_id != *user_id && !self.is_read_by(user_id)
    }

    /// Add a read receipt for `user_id`. Idempotent; returns whether the
    /// receipt was newly added.
    pub fn mark_read_by(&mut self, user_id: Uuid) -> bool {
        if self.is_read_by(&user_id) {
            return false;
        }
        self.read_by.push(ReadReceipt {
            user_id,
            read_at: Utc::now(),
        });
        true
    }
}
