//! Conversation types for marketplace messaging

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persistent thread between exactly two users, scoped to one listing.
///
/// Participants carry unordered-pair semantics: (A, B) and (B, A) describe
/// the same conversation. The pair is stored sorted so equality and the
/// uniqueness key fall out of the representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub participants: [Uuid; 2],
    pub listing_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
}

/// Uniqueness key: sorted participant pair plus listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    low: Uuid,
    high: Uuid,
    listing_id: Uuid,
}

impl ConversationKey {
    pub fn new(a: Uuid, b: Uuid, listing_id: Uuid) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            low,
            high,
            listing_id,
        }
    }
}

impl Conversation {
    /// Create a new conversation between two users about a listing.
    ///
    /// Both timestamps start at creation time; `last_message_at` advances
    /// only when a message is appended.
    pub fn new(a: Uuid, b: Uuid, listing_id: Uuid) -> Self {
        let now = Utc::now();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            id: Uuid::new_v4(),
            participants: [low, high],
            listing_id,
            created_at: now,
            last_message_at: now,
        }
    }

    pub fn key(&self) -> ConversationKey {
        ConversationKey::new(self.participants[0], self.participants[1], self.listing_id)
    }

    pub fn is_participant(&self, user_id: &Uuid) -> bool {
        self.participants.contains(user_id)
    }

    /// The peer of `user_id`, or `None` if they are not a participant.
    pub fn other_participant(&self, user_id: &Uuid) -> Option<Uuid> {
        if self.participants[0] == *user_id {
            Some(self.participants[1])
        } else if self.participants[1] == *user_id {
            Some(self.participants[0])
        } else {
            None
        }
    }

    /// Record message activity. Never moves the clock backwards.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        if at > self.last_message_at {
            self.last_message_at = at;
        }
    }
}
