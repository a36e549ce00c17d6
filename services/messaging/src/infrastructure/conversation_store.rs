//! Conversation store - directory of buyer/seller threads

use bazaar_core::{BazaarError, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Conversation, ConversationKey};

/// In-memory conversation directory.
///
/// `index` enforces the uniqueness invariant: at most one conversation per
/// (unordered participant pair, listing). Creation goes through the index
/// entry so concurrent callers with the same key serialize on one shard
/// lock and the loser observes the winner's conversation.
pub struct ConversationStore {
    by_id: DashMap<Uuid, Conversation>,
    index: DashMap<ConversationKey, Uuid>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            by_id: DashMap::new(),
            index: DashMap::new(),
        }
    }

    /// Find the conversation for (current, other, listing) or create it.
    ///
    /// A lookup hit returns the conversation unchanged: last-activity moves
    /// only when a message is appended.
    pub async fn get_or_create(
        &self,
        current_user: Uuid,
        other_user: Uuid,
        listing_id: Uuid,
    ) -> Result<Conversation> {
        if current_user == other_user {
            return Err(BazaarError::InvalidArgument(
                "cannot start a conversation with yourself".to_string(),
            ));
        }

        let key = ConversationKey::new(current_user, other_user, listing_id);
        let mut created = false;
        let id = *self.index.entry(key).or_insert_with(|| {
            let conversation = Conversation::new(current_user, other_user, listing_id);
            let id = conversation.id;
            self.by_id.insert(id, conversation);
            created = true;
            id
        });

        if created {
            debug!(conversation_id = %id, %listing_id, "conversation created");
        }

        self.by_id.get(&id).map(|c| c.clone()).ok_or_else(|| {
            BazaarError::Internal(format!("conversation index points at missing id {id}"))
        })
    }

    /// Get conversation by id
    pub async fn get(&self, id: &Uuid) -> Result<Option<Conversation>> {
        Ok(self.by_id.get(id).map(|c| c.clone()))
    }

    /// Get conversation by id, enforcing participant access.
    pub async fn get_for_participant(&self, id: &Uuid, user_id: &Uuid) -> Result<Conversation> {
        let conversation = self
            .get(id)
            .await?
            .ok_or_else(|| BazaarError::NotFound(format!("conversation {id}")))?;
        if !conversation.is_participant(user_id) {
            return Err(BazaarError::Forbidden(
                "not a participant of this conversation".to_string(),
            ));
        }
        Ok(conversation)
    }

    /// List a user's conversations, most recent activity first, ties broken
    /// by conversation id for a stable order.
    pub async fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<Conversation>> {
        let mut conversations: Vec<Conversation> = self
            .by_id
            .iter()
            .filter(|entry| entry.value().is_participant(user_id))
            .map(|entry| entry.value().clone())
            .collect();
        conversations.sort_by(|a, b| {
            b.last_message_at
                .cmp(&a.last_message_at)
                .then(a.id.cmp(&b.id))
        });
        Ok(conversations)
    }

    /// Bump last-activity to `at` (never backwards). Called on append only.
    pub async fn touch(&self, id: &Uuid, at: DateTime<Utc>) -> Result<()> {
        match self.by_id.get_mut(id) {
            Some(mut conversation) => {
                conversation.touch(at);
                Ok(())
            }
            None => Err(BazaarError::NotFound(format!("conversation {id}"))),
        }
    }

    /// Account-deletion cascade: drop every conversation the user is part
    /// of and free their uniqueness keys. Returns the removed ids so the
    /// message log can cascade too.
    pub async fn purge_user(&self, user_id: &Uuid) -> Result<Vec<Uuid>> {
        let doomed: Vec<Conversation> = self
            .by_id
            .iter()
            .filter(|entry| entry.value().is_participant(user_id))
            .map(|entry| entry.value().clone())
            .collect();

        let mut removed = Vec::with_capacity(doomed.len());
        for conversation in doomed {
            self.index.remove(&conversation.key());
            self.by_id.remove(&conversation.id);
            removed.push(conversation.id);
        }
        debug!(%user_id, count = removed.len(), "conversations purged");
        Ok(removed)
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_or_create_returns_existing_for_either_order() {
        let store = ConversationStore::new();
        let (a, b, listing) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let first = store.get_or_create(a, b, listing).await.unwrap();
        let second = store.get_or_create(b, a, listing).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.list_for_user(&a).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_pair_different_listing_is_a_new_conversation() {
        let store = ConversationStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let one = store.get_or_create(a, b, Uuid::new_v4()).await.unwrap();
        let two = store.get_or_create(a, b, Uuid::new_v4()).await.unwrap();

        assert_ne!(one.id, two.id);
    }

    #[tokio::test]
    async fn test_self_conversation_rejected() {
        let store = ConversationStore::new();
        let user = Uuid::new_v4();

        let result = store.get_or_create(user, user, Uuid::new_v4()).await;
        assert!(matches!(result, Err(BazaarError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_concurrent_get_or_create_yields_one_conversation() {
        let store = Arc::new(ConversationStore::new());
        let (a, b, listing) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let (x, y) = if i % 2 == 0 { (a, b) } else { (b, a) };
                    store.get_or_create(x, y, listing).await.unwrap().id
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for task in tasks {
            ids.insert(task.await.unwrap());
        }
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_does_not_bump_activity() {
        let store = ConversationStore::new();
        let (a, b, listing) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let created = store.get_or_create(a, b, listing).await.unwrap();
        let fetched = store.get_or_create(a, b, listing).await.unwrap();

        assert_eq!(created.last_message_at, fetched.last_message_at);
    }

    #[tokio::test]
    async fn test_get_for_participant_access() {
        let store = ConversationStore::new();
        let (a, b, listing) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let conversation = store.get_or_create(a, b, listing).await.unwrap();

        assert!(store.get_for_participant(&conversation.id, &a).await.is_ok());

        let missing = store.get_for_participant(&Uuid::new_v4(), &a).await;
        assert!(matches!(missing, Err(BazaarError::NotFound(_))));

        let outsider = store
            .get_for_participant(&conversation.id, &Uuid::new_v4())
            .await;
        assert!(matches!(outsider, Err(BazaarError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_list_for_user_orders_by_activity_then_id() {
        let store = ConversationStore::new();
        let a = Uuid::new_v4();

        let one = store
            .get_or_create(a, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();
        let two = store
            .get_or_create(a, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        let later = Utc::now() + chrono::Duration::seconds(60);
        store.touch(&one.id, later).await.unwrap();

        let listed = store.list_for_user(&a).await.unwrap();
        assert_eq!(listed[0].id, one.id);
        assert_eq!(listed[1].id, two.id);

        // Same activity timestamp: ids ascending for determinism.
        store.touch(&two.id, later).await.unwrap();
        let listed = store.list_for_user(&a).await.unwrap();
        let mut expected = vec![one.id, two.id];
        expected.sort();
        assert_eq!(vec![listed[0].id, listed[1].id], expected);
    }

    #[tokio::test]
    async fn test_purge_user_cascades_and_frees_key() {
        let store = ConversationStore::new();
        let (a, b, listing) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let old = store.get_or_create(a, b, listing).await.unwrap();

        let removed = store.purge_user(&a).await.unwrap();
        assert_eq!(removed, vec![old.id]);
        assert!(store.list_for_user(&b).await.unwrap().is_empty());

        let fresh = store.get_or_create(a, b, listing).await.unwrap();
        assert_ne!(fresh.id, old.id);
    }
}
