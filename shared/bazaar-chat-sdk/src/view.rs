//! Read-model view types
//!
//! Denormalized shapes assembled for the conversation sidebar. The core
//! only ever reads user and listing data; both are referenced by id and
//! owned elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public profile fields of a user, as exposed by the user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Listing fields needed to build a conversation preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub seller_id: Uuid,
}

/// One sidebar row: a conversation joined with its peer, listing and
/// latest message. Missing peer or listing (deleted account/listing)
/// degrade to `None` rather than dropping the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: Uuid,
    pub other_user: Option<UserProfile>,
    pub listing: Option<ListingSummary>,
    pub last_message_at: DateTime<Utc>,
    pub last_message_preview: Option<String>,
}
