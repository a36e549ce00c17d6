//! API module - REST and WebSocket

pub mod rest;
pub mod websocket;

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    routing::{delete, get, post, put},
    Router,
};
use bazaar_core::BazaarError;
use uuid::Uuid;

use crate::config::MessagingConfig;
use crate::infrastructure::{
    ConnectionRegistry, ConversationStore, InMemoryListingCatalog, InMemoryUserDirectory,
    MessageStore,
};
use crate::read_model::{ConversationReadModel, UnreadAggregator};

/// Shared handler state: the stores, the live-connection registry and the
/// read-side views over them.
#[derive(Clone)]
pub struct AppState {
    pub conversations: Arc<ConversationStore>,
    pub messages: Arc<MessageStore>,
    pub registry: Arc<ConnectionRegistry>,
    pub users: Arc<InMemoryUserDirectory>,
    pub listings: Arc<InMemoryListingCatalog>,
    pub read_model: Arc<ConversationReadModel>,
    pub unread: Arc<UnreadAggregator>,
}

impl AppState {
    pub fn new(config: &MessagingConfig) -> Self {
        let conversations = Arc::new(ConversationStore::new());
        let messages = Arc::new(MessageStore::new(config.max_message_len));
        let registry = Arc::new(ConnectionRegistry::new(config.ws_send_buffer));
        let users = Arc::new(InMemoryUserDirectory::new());
        let listings = Arc::new(InMemoryListingCatalog::new());
        let read_model = Arc::new(ConversationReadModel::new(
            conversations.clone(),
            messages.clone(),
            users.clone(),
            listings.clone(),
        ));
        let unread = Arc::new(UnreadAggregator::new(
            conversations.clone(),
            messages.clone(),
        ));
        Self {
            conversations,
            messages,
            registry,
            users,
            listings,
            read_model,
            unread,
        }
    }
}

/// Caller identity, resolved by the identity provider upstream and passed
/// through verbatim. The core treats the id as opaque and trusted.
pub struct CurrentUser(pub Uuid);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = rest::ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| BazaarError::Auth("missing x-user-id header".to_string()))?;
        let user_id = raw
            .parse::<Uuid>()
            .map_err(|_| BazaarError::Auth("malformed x-user-id header".to_string()))?;
        Ok(Self(user_id))
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::ready_check))
        // Conversation endpoints
        .route(
            "/chat/v1/conversations",
            post(rest::start_conversation).get(rest::list_conversations),
        )
        .route("/chat/v1/conversations/{id}", get(rest::get_conversation))
        // Message endpoints
        .route(
            "/chat/v1/conversations/{id}/messages",
            post(rest::send_message).get(rest::list_messages),
        )
        .route("/chat/v1/conversations/{id}/read", post(rest::mark_read))
        .route("/chat/v1/messages/unread", get(rest::unread_count))
        // Directory sync from the user/listing services
        .route("/chat/v1/directory/users", put(rest::upsert_user_profile))
        .route(
            "/chat/v1/directory/users/{id}",
            delete(rest::delete_user_profile),
        )
        .route(
            "/chat/v1/directory/listings",
            put(rest::upsert_listing_summary),
        )
        .route(
            "/chat/v1/directory/listings/{id}",
            delete(rest::delete_listing_summary),
        )
        // WebSocket
        .route("/chat/v1/ws", get(websocket::ws_handler))
        .with_state(state)
}
