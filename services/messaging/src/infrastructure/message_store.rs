//! Message store - append-only log per conversation

use bazaar_core::{BazaarError, Result};
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{Conversation, Message};

/// In-memory message log, keyed by conversation.
///
/// Appends and read-set updates for one conversation take the log entry's
/// exclusive lock, so `append` and `mark_read` never interleave on the same
/// messages and no read receipt is lost.
pub struct MessageStore {
    logs: DashMap<Uuid, Vec<Message>>,
    max_body_len: usize,
}

impl MessageStore {
    pub fn new(max_body_len: usize) -> Self {
        Self {
            logs: DashMap::new(),
            max_body_len,
        }
    }

    /// Append a message to a conversation.
    ///
    /// The stored timestamp is server-assigned and clamped so creation
    /// order within the log is non-decreasing; callers must bump the
    /// conversation's last-activity with the returned message's timestamp.
    pub async fn append(
        &self,
        conversation: &Conversation,
        sender_id: Uuid,
        body: &str,
    ) -> Result<Message> {
        if !conversation.is_participant(&sender_id) {
            return Err(BazaarError::Forbidden(
                "sender is not a participant of this conversation".to_string(),
            ));
        }

        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(BazaarError::InvalidArgument(
                "message body is empty".to_string(),
            ));
        }
        if trimmed.len() > self.max_body_len {
            return Err(BazaarError::InvalidArgument(format!(
                "message body exceeds {} bytes",
                self.max_body_len
            )));
        }

        let mut log = self.logs.entry(conversation.id).or_insert_with(Vec::new);
        let mut message = Message::new(conversation.id, sender_id, trimmed.to_string());
        if let Some(last) = log.last() {
            if message.created_at < last.created_at {
                message.created_at = last.created_at;
            }
        }
        log.push(message.clone());
        Ok(message)
    }

    /// Ordered history of a conversation, oldest first, ties broken by
    /// message id. Read-only: repeated calls return the same sequence.
    pub async fn list_for(
        &self,
        conversation: &Conversation,
        requester: &Uuid,
    ) -> Result<Vec<Message>> {
        if !conversation.is_participant(requester) {
            return Err(BazaarError::Forbidden(
                "not a participant of this conversation".to_string(),
            ));
        }
        let mut messages: Vec<Message> = self
            .logs
            .get(&conversation.id)
            .map(|log| log.clone())
            .unwrap_or_default();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    /// Add `user_id` to the read-set of every message they have not sent
    /// and not yet read. Idempotent; returns how many were newly marked.
    pub async fn mark_read(&self, conversation_id: &Uuid, user_id: Uuid) -> Result<usize> {
        let Some(mut log) = self.logs.get_mut(conversation_id) else {
            return Ok(0);
        };
        let mut newly_read = 0;
        for message in log.iter_mut() {
            if message.sender_id != user_id && message.mark_read_by(user_id) {
                newly_read += 1;
            }
        }
        Ok(newly_read)
    }

    /// Messages in one conversation still unread by `user_id`.
    pub async fn count_unread_in(&self, conversation_id: &Uuid, user_id: &Uuid) -> Result<usize> {
        Ok(self
            .logs
            .get(conversation_id)
            .map(|log| log.iter().filter(|m| m.is_unread_by(user_id)).count())
            .unwrap_or(0))
    }

    /// Latest message of a conversation, if any.
    pub async fn last_message(&self, conversation_id: &Uuid) -> Result<Option<Message>> {
        Ok(self
            .logs
            .get(conversation_id)
            .and_then(|log| log.last().cloned()))
    }

    /// Cascade companion to conversation deletion.
    pub async fn remove_conversation(&self, conversation_id: &Uuid) {
        self.logs.remove(conversation_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> (Conversation, Uuid, Uuid) {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        (Conversation::new(a, b, Uuid::new_v4()), a, b)
    }

    #[tokio::test]
    async fn test_append_trims_body() {
        let store = MessageStore::new(10000);
        let (conv, a, _) = conversation();

        let message = store.append(&conv, a, "  hi there  ").await.unwrap();
        assert_eq!(message.body, "hi there");
    }

    #[tokio::test]
    async fn test_whitespace_only_body_rejected() {
        let store = MessageStore::new(10000);
        let (conv, a, _) = conversation();

        let result = store.append(&conv, a, "   ").await;
        assert!(matches!(result, Err(BazaarError::InvalidArgument(_))));
        assert!(store.list_for(&conv, &a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let store = MessageStore::new(8);
        let (conv, a, _) = conversation();

        let result = store.append(&conv, a, "way past the cap").await;
        assert!(matches!(result, Err(BazaarError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_non_participant_cannot_append() {
        let store = MessageStore::new(10000);
        let (conv, a, _) = conversation();

        let result = store.append(&conv, Uuid::new_v4(), "hi").await;
        assert!(matches!(result, Err(BazaarError::Forbidden(_))));
        assert!(store.list_for(&conv, &a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fresh_message_read_by_sender_only() {
        let store = MessageStore::new(10000);
        let (conv, a, b) = conversation();

        let message = store.append(&conv, a, "hi").await.unwrap();
        assert!(message.is_read_by(&a));
        assert!(!message.is_read_by(&b));
    }

    #[tokio::test]
    async fn test_list_is_ordered_and_idempotent() {
        let store = MessageStore::new(10000);
        let (conv, a, b) = conversation();

        store.append(&conv, a, "one").await.unwrap();
        store.append(&conv, b, "two").await.unwrap();
        store.append(&conv, a, "three").await.unwrap();

        let first = store.list_for(&conv, &a).await.unwrap();
        let bodies: Vec<&str> = first.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);
        for pair in first.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }

        let second = store.list_for(&conv, &b).await.unwrap();
        let ids: Vec<Uuid> = second.iter().map(|m| m.id).collect();
        assert_eq!(ids, first.iter().map(|m| m.id).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_list_requires_participant() {
        let store = MessageStore::new(10000);
        let (conv, a, _) = conversation();
        store.append(&conv, a, "hi").await.unwrap();

        let result = store.list_for(&conv, &Uuid::new_v4()).await;
        assert!(matches!(result, Err(BazaarError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let store = MessageStore::new(10000);
        let (conv, a, b) = conversation();

        for body in ["one", "two", "three"] {
            store.append(&conv, a, body).await.unwrap();
        }

        assert_eq!(store.count_unread_in(&conv.id, &b).await.unwrap(), 3);
        assert_eq!(store.mark_read(&conv.id, b).await.unwrap(), 3);
        assert_eq!(store.count_unread_in(&conv.id, &b).await.unwrap(), 0);
        assert_eq!(store.mark_read(&conv.id, b).await.unwrap(), 0);

        // The sender never owes themselves an unread.
        assert_eq!(store.count_unread_in(&conv.id, &a).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_on_unknown_conversation_is_noop() {
        let store = MessageStore::new(10000);
        assert_eq!(
            store.mark_read(&Uuid::new_v4(), Uuid::new_v4()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_last_message_and_cascade() {
        let store = MessageStore::new(10000);
        let (conv, a, _) = conversation();

        assert!(store.last_message(&conv.id).await.unwrap().is_none());
        store.append(&conv, a, "first").await.unwrap();
        let latest = store.append(&conv, a, "second").await.unwrap();
        assert_eq!(
            store.last_message(&conv.id).await.unwrap().unwrap().id,
            latest.id
        );

        store.remove_conversation(&conv.id).await;
        assert!(store.last_message(&conv.id).await.unwrap().is_none());
    }
}
