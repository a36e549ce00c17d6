//! Send message handler

use bazaar_core::{BazaarError, Result};
use tracing::debug;
use uuid::Uuid;

use crate::domain::Message;
use crate::infrastructure::{ConnectionRegistry, ConversationStore, MessageStore};

/// Send message command
pub struct SendMessageCommand {
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
}

/// Send message result
pub struct SendMessageResult {
    pub message: Message,
    /// Connections the payload was pushed to; zero when the peer is offline.
    pub live_deliveries: usize,
}

/// Persist a message, bump the conversation's activity, and fan out to the
/// peer's live connections. Broadcast problems never fail the send; the
/// log is authoritative and the peer catches up on next fetch.
pub async fn handle(
    conversations: &ConversationStore,
    messages: &MessageStore,
    registry: &ConnectionRegistry,
    cmd: SendMessageCommand,
) -> Result<SendMessageResult> {
    let conversation = conversations
        .get(&cmd.conversation_id)
        .await?
        .ok_or_else(|| BazaarError::NotFound(format!("conversation {}", cmd.conversation_id)))?;

    let message = messages.append(&conversation, cmd.sender_id, &cmd.body).await?;

    // Message first, then the activity bump: a reader may briefly see the
    // new message with the old last_message_at, never a bumped timestamp
    // with no message behind it.
    conversations.touch(&conversation.id, message.created_at).await?;

    let mut live_deliveries = 0;
    if let Some(peer) = conversation.other_participant(&cmd.sender_id) {
        live_deliveries = registry.publish(&peer, &message);
        debug!(
            conversation_id = %conversation.id,
            %peer,
            live_deliveries,
            "message broadcast"
        );
    }

    Ok(SendMessageResult {
        message,
        live_deliveries,
    })
}
