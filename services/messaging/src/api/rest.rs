//! REST API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bazaar_core::BazaarError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AppState, CurrentUser};
use crate::domain::{Conversation, ConversationSummary, ListingSummary, Message, UserProfile};
use crate::handlers;

/// Generic API response
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }

    pub fn error(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            error: Some(message.into()),
        })
    }
}

/// Error wrapper mapping the shared taxonomy onto HTTP responses.
#[derive(Debug)]
pub struct ApiError(BazaarError);

impl From<BazaarError> for ApiError {
    fn from(err: BazaarError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ApiResponse::<()>::error(format!("{}: {}", self.0.error_code(), self.0));
        (status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn ready_check() -> &'static str {
    "OK"
}

// Conversation handlers
#[derive(Debug, Deserialize)]
pub struct StartConversationRequest {
    pub other_user_id: Uuid,
    pub listing_id: Uuid,
}

/// "Chat with Seller": find or create the conversation for
/// (caller, other user, listing).
pub async fn start_conversation(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<StartConversationRequest>,
) -> ApiResult<Conversation> {
    let conversation = state
        .conversations
        .get_or_create(user_id, req.other_user_id, req.listing_id)
        .await?;
    Ok(ApiResponse::success(conversation))
}

/// Sidebar list: denormalized, most recent activity first.
pub async fn list_conversations(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Vec<ConversationSummary>> {
    let rows = state.read_model.list_for_user(&user_id).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Conversation> {
    let conversation = state
        .conversations
        .get_for_participant(&id, &user_id)
        .await?;
    Ok(ApiResponse::success(conversation))
}

// Message handlers
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(conversation_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Message> {
    let result = handlers::send_message::handle(
        &state.conversations,
        &state.messages,
        &state.registry,
        handlers::send_message::SendMessageCommand {
            conversation_id,
            sender_id: user_id,
            body: req.body,
        },
    )
    .await?;
    Ok(ApiResponse::success(result.message))
}

/// Ordered history. Reading never marks anything read; that is an
/// explicit, separate call.
pub async fn list_messages(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<Vec<Message>> {
    let conversation = state
        .conversations
        .get_for_participant(&conversation_id, &user_id)
        .await?;
    let messages = state.messages.list_for(&conversation, &user_id).await?;
    Ok(ApiResponse::success(messages))
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub newly_read: usize,
}

pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<MarkReadResponse> {
    let result = handlers::mark_read::handle(
        &state.conversations,
        &state.messages,
        handlers::mark_read::MarkReadCommand {
            conversation_id,
            user_id,
        },
    )
    .await?;
    Ok(ApiResponse::success(MarkReadResponse {
        newly_read: result.newly_read,
    }))
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

pub async fn unread_count(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<UnreadCountResponse> {
    let count = state.unread.count_for(&user_id).await?;
    Ok(ApiResponse::success(UnreadCountResponse { count }))
}

// Directory sync handlers
pub async fn upsert_user_profile(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> StatusCode {
    state.users.upsert(profile);
    StatusCode::NO_CONTENT
}

/// Account deleted upstream: drop the profile and cascade the user's
/// conversations and their message logs.
pub async fn delete_user_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> std::result::Result<StatusCode, ApiError> {
    state.users.remove(&user_id);
    let removed = state.conversations.purge_user(&user_id).await?;
    for conversation_id in &removed {
        state.messages.remove_conversation(conversation_id).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upsert_listing_summary(
    State(state): State<AppState>,
    Json(listing): Json<ListingSummary>,
) -> StatusCode {
    state.listings.upsert(listing);
    StatusCode::NO_CONTENT
}

/// Listing removed upstream. Conversations about it stay; the sidebar
/// simply loses the listing preview.
pub async fn delete_listing_summary(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> StatusCode {
    state.listings.remove(&listing_id);
    StatusCode::NO_CONTENT
}
