//! Connection registry - live fan-out to connected users
//!
//! An explicit, injected registry (no ambient singleton): sockets join
//! under their user id, publishers route by recipient id without knowing
//! connection details. Delivery is best-effort; the message store stays
//! the source of truth.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::Message;

struct Connection {
    id: Uuid,
    tx: mpsc::Sender<Message>,
}

/// Receiving end handed to a joined socket.
pub struct ConnectionHandle {
    pub connection_id: Uuid,
    pub receiver: mpsc::Receiver<Message>,
}

pub struct ConnectionRegistry {
    channels: DashMap<Uuid, Vec<Connection>>,
    buffer_size: usize,
}

impl ConnectionRegistry {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: DashMap::new(),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Register a live connection for `user_id`. A user may hold several
    /// connections (devices/tabs); all of them receive broadcasts.
    pub fn join(&self, user_id: Uuid) -> ConnectionHandle {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let connection_id = Uuid::new_v4();
        self.channels
            .entry(user_id)
            .or_insert_with(Vec::new)
            .push(Connection {
                id: connection_id,
                tx,
            });
        debug!(%user_id, %connection_id, "connection joined");
        ConnectionHandle {
            connection_id,
            receiver: rx,
        }
    }

    /// Remove a connection; the user's channel entry goes with the last one.
    pub fn leave(&self, user_id: &Uuid, connection_id: &Uuid) {
        if let Some(mut connections) = self.channels.get_mut(user_id) {
            connections.retain(|c| c.id != *connection_id);
        }
        self.channels.remove_if(user_id, |_, v| v.is_empty());
        debug!(%user_id, %connection_id, "connection left");
    }

    /// Route `message` to every connection joined under `recipient`.
    ///
    /// Never blocks and never errors toward the sender: nobody joined is a
    /// silent drop, and a connection whose buffer is full is disconnected
    /// instead of backpressuring the publisher. Returns the number of
    /// connections the payload was handed to, for logging only.
    pub fn publish(&self, recipient: &Uuid, message: &Message) -> usize {
        let Some(mut connections) = self.channels.get_mut(recipient) else {
            return 0;
        };
        let mut delivered = 0;
        connections.retain(|connection| match connection.tx.try_send(message.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(%recipient, connection_id = %connection.id, "send buffer full, dropping connection");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
        delivered
    }

    pub fn connection_count(&self, user_id: &Uuid) -> usize {
        self.channels.get(user_id).map(|c| c.len()).unwrap_or(0)
    }
}
