use std::collections::HashMap;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::notify::protocol::ServerEvent;

/// Identifies one WebSocket connection, so a disconnect can only remove itself.
pub type ConnectionId = Uuid;

/// A handle to send events to one connected client.
#[derive(Debug, Clone)]
struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<ServerEvent>,
}

/// Outcome of pushing an event to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// No live connection is registered for the user.
    NotConnected,
    /// A connection is registered but its session has already gone away.
    Closed,
}

/// Process-wide map from user id to that user's live notification channel.
///
/// The most recent connection for a user wins. Removal is conditional on the
/// connection id so a stale disconnect never drops a newer registration.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<Uuid, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for `user_id`, replacing any earlier one.
    /// Returns the connection id and the receiver the session should drain.
    pub async fn register(
        &self,
        user_id: Uuid,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ConnectionHandle {
            id: Uuid::new_v4(),
            sender: tx,
        };
        let connection_id = handle.id;

        let previous = self.connections.write().await.insert(user_id, handle);
        if let Some(previous) = previous {
            tracing::debug!(
                %user_id,
                replaced = %previous.id,
                "notification connection replaced"
            );
        }

        (connection_id, rx)
    }

    /// Remove the entry for `user_id` only if it still belongs to `connection_id`.
    pub async fn unregister(&self, user_id: Uuid, connection_id: ConnectionId) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(&user_id) {
            Some(handle) if handle.id == connection_id => {
                connections.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    /// Push an event to the user's live connection, if there is one.
    pub async fn send(&self, user_id: Uuid, event: ServerEvent) -> Delivery {
        let connections = self.connections.read().await;
        match connections.get(&user_id) {
            // A failed send means the session dropped its receiver; its own
            // unregister call cleans the entry up.
            Some(handle) => match handle.sender.send(event) {
                Ok(()) => Delivery::Delivered,
                Err(_) => Delivery::Closed,
            },
            None => Delivery::NotConnected,
        }
    }

    pub async fn is_connected(&self, user_id: Uuid) -> bool {
        self.connections.read().await.contains_key(&user_id)
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
