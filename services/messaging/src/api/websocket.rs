//! WebSocket handler for real-time message delivery
//!
//! Protocol: the client joins with its user id, then receives
//! `message_received` pushes for messages addressed to it. Delivery order
//! is not guaranteed; clients re-sort by the log's creation order.

use axum::{
    extract::ws::{Message as Frame, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use super::AppState;
use crate::domain::Message as ChatMessage;

/// WebSocket upgrade handler
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Server-to-client WebSocket messages
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    Connected { connection_id: String },
    Joined { user_id: String },
    MessageReceived { message: ChatMessage },
    Pong,
    Error { code: String, message: String },
}

/// Client-to-server WebSocket messages
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join { user_id: Uuid },
    Ping,
}

struct Session {
    user_id: Uuid,
    connection_id: Uuid,
    receiver: mpsc::Receiver<ChatMessage>,
}

/// Handle one WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let welcome = WsMessage::Connected {
        connection_id: Uuid::new_v4().to_string(),
    };
    if send_event(&mut sender, &welcome).await.is_err() {
        return;
    }

    let mut session: Option<Session> = None;

    loop {
        tokio::select! {
            pushed = async {
                match session.as_mut() {
                    Some(s) => s.receiver.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                match pushed {
                    Some(message) => {
                        let event = WsMessage::MessageReceived { message };
                        if send_event(&mut sender, &event).await.is_err() {
                            break;
                        }
                    }
                    // The registry dropped our sender (buffer overflow):
                    // this connection is done, the client reconnects and
                    // reconciles from the log.
                    None => break,
                }
            }
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Frame::Text(text))) => {
                        let parsed = serde_json::from_str::<ClientMessage>(&text);
                        match parsed {
                            Ok(ClientMessage::Join { user_id }) => {
                                if session.is_some() {
                                    let event = WsMessage::Error {
                                        code: "already_joined".to_string(),
                                        message: "connection is already joined".to_string(),
                                    };
                                    if send_event(&mut sender, &event).await.is_err() {
                                        break;
                                    }
                                    continue;
                                }
                                let handle = state.registry.join(user_id);
                                debug!(%user_id, connection_id = %handle.connection_id, "websocket joined");
                                session = Some(Session {
                                    user_id,
                                    connection_id: handle.connection_id,
                                    receiver: handle.receiver,
                                });
                                let event = WsMessage::Joined {
                                    user_id: user_id.to_string(),
                                };
                                if send_event(&mut sender, &event).await.is_err() {
                                    break;
                                }
                            }
                            Ok(ClientMessage::Ping) => {
                                if send_event(&mut sender, &WsMessage::Pong).await.is_err() {
                                    break;
                                }
                            }
                            Err(_) => {
                                let event = WsMessage::Error {
                                    code: "bad_frame".to_string(),
                                    message: "unrecognized client message".to_string(),
                                };
                                if send_event(&mut sender, &event).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Frame::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    if let Some(session) = session {
        state.registry.leave(&session.user_id, &session.connection_id);
        debug!(user_id = %session.user_id, connection_id = %session.connection_id, "websocket left");
    }
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Frame>,
    event: &WsMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => sender.send(Frame::Text(json.into())).await,
        Err(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_wire_format() {
        let user_id = Uuid::new_v4();
        let json = format!(r#"{{"type":"join","user_id":"{user_id}"}}"#);
        let parsed: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, ClientMessage::Join { user_id: u } if u == user_id));

        let parsed: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(parsed, ClientMessage::Ping));
    }

    #[test]
    fn test_server_message_wire_format() {
        let message = ChatMessage::new(Uuid::new_v4(), Uuid::new_v4(), "hi".to_string());
        let event = WsMessage::MessageReceived { message };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"message_received""#));
        assert!(json.contains(r#""body":"hi""#));
    }
}
