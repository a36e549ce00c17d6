//! Mark read handler

use bazaar_core::Result;
use uuid::Uuid;

use crate::infrastructure::{ConversationStore, MessageStore};

/// Mark read command
pub struct MarkReadCommand {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
}

/// Mark read result
pub struct MarkReadResult {
    pub newly_read: usize,
}

/// Mark every message of the conversation as read by the caller.
/// Idempotent; participant access is enforced before touching the log.
pub async fn handle(
    conversations: &ConversationStore,
    messages: &MessageStore,
    cmd: MarkReadCommand,
) -> Result<MarkReadResult> {
    conversations
        .get_for_participant(&cmd.conversation_id, &cmd.user_id)
        .await?;
    let newly_read = messages.mark_read(&cmd.conversation_id, cmd.user_id).await?;
    Ok(MarkReadResult { newly_read })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::BazaarError;

    #[tokio::test]
    async fn test_mark_read_requires_participant() {
        let conversations = ConversationStore::new();
        let messages = MessageStore::new(10000);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let conv = conversations
            .get_or_create(a, b, Uuid::new_v4())
            .await
            .unwrap();

        let result = handle(
            &conversations,
            &messages,
            MarkReadCommand {
                conversation_id: conv.id,
                user_id: Uuid::new_v4(),
            },
        )
        .await;
        assert!(matches!(result, Err(BazaarError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_mark_read_counts_and_is_idempotent() {
        let conversations = ConversationStore::new();
        let messages = MessageStore::new(10000);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let conv = conversations
            .get_or_create(a, b, Uuid::new_v4())
            .await
            .unwrap();

        messages.append(&conv, a, "one").await.unwrap();
        messages.append(&conv, a, "two").await.unwrap();

        let cmd = |user| MarkReadCommand {
            conversation_id: conv.id,
            user_id: user,
        };

        let first = handle(&conversations, &messages, cmd(b)).await.unwrap();
        assert_eq!(first.newly_read, 2);

        let again = handle(&conversations, &messages, cmd(b)).await.unwrap();
        assert_eq!(again.newly_read, 0);
    }
}
