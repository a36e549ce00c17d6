//! Read-side assembly: the conversation sidebar and unread totals
//!
//! Pure reads. Nothing here mutates read-sets or last-activity; that is
//! the job of the write-side handlers.

use std::sync::Arc;

use bazaar_core::{with_read_retries, Result, RetryPolicy};
use uuid::Uuid;

use crate::domain::ConversationSummary;
use crate::infrastructure::{ConversationStore, ListingCatalog, MessageStore, UserDirectory};

/// Denormalized per-user conversation list.
pub struct ConversationReadModel {
    conversations: Arc<ConversationStore>,
    messages: Arc<MessageStore>,
    users: Arc<dyn UserDirectory>,
    listings: Arc<dyn ListingCatalog>,
    retry: RetryPolicy,
}

impl ConversationReadModel {
    pub fn new(
        conversations: Arc<ConversationStore>,
        messages: Arc<MessageStore>,
        users: Arc<dyn UserDirectory>,
        listings: Arc<dyn ListingCatalog>,
    ) -> Self {
        Self {
            conversations,
            messages,
            users,
            listings,
            retry: RetryPolicy::default(),
        }
    }

    /// One row per conversation of `user_id`, in directory order (most
    /// recent activity first). A deleted peer or listing leaves that field
    /// empty instead of dropping the row.
    pub async fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<ConversationSummary>> {
        let conversations = self.conversations.list_for_user(user_id).await?;
        let mut rows = Vec::with_capacity(conversations.len());

        for conversation in conversations {
            let other_user = match conversation.other_participant(user_id) {
                Some(peer) => {
                    with_read_retries(&self.retry, || self.users.profile(&peer)).await?
                }
                None => None,
            };
            let listing = with_read_retries(&self.retry, || {
                self.listings.summary(&conversation.listing_id)
            })
            .await?;
            let last = self.messages.last_message(&conversation.id).await?;

            rows.push(ConversationSummary {
                conversation_id: conversation.id,
                other_user,
                listing,
                last_message_at: last
                    .as_ref()
                    .map(|m| m.created_at)
                    .unwrap_or(conversation.last_message_at),
                last_message_preview: last.map(|m| m.body),
            });
        }
        Ok(rows)
    }
}

/// On-demand unread totals.
///
/// Recomputed from the message log instead of a maintained counter: the
/// scan is bounded by one user's message volume, and recomputation cannot
/// drift under concurrent send/read races. Exact at rest.
pub struct UnreadAggregator {
    conversations: Arc<ConversationStore>,
    messages: Arc<MessageStore>,
    retry: RetryPolicy,
}

impl UnreadAggregator {
    pub fn new(conversations: Arc<ConversationStore>, messages: Arc<MessageStore>) -> Self {
        Self {
            conversations,
            messages,
            retry: RetryPolicy::default(),
        }
    }

    /// Unread messages for `user_id` across their own conversations only.
    pub async fn count_for(&self, user_id: &Uuid) -> Result<u64> {
        with_read_retries(&self.retry, || self.scan(user_id)).await
    }

    async fn scan(&self, user_id: &Uuid) -> Result<u64> {
        let conversations = self.conversations.list_for_user(user_id).await?;
        let mut total = 0u64;
        for conversation in conversations {
            total += self
                .messages
                .count_unread_in(&conversation.id, user_id)
                .await? as u64;
        }
        Ok(total)
    }
}
