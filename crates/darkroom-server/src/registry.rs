//! Session Registry: bookkeeping of live WebSocket connections.

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::ChannelError;
use crate::protocol::ServerMessage;

/// Unique connection identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub String);

impl Default for ConnectionId {
    fn default() -> Self {
        Self(format!("conn_{}", Uuid::now_v7()))
    }
}

impl ConnectionId {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection id -> outbound queue of that connection's writer task.
pub struct SessionRegistry {
    connections: DashMap<ConnectionId, mpsc::Sender<ServerMessage>>,
    send_queue_capacity: usize,
}

impl SessionRegistry {
    pub fn new(send_queue_capacity: usize) -> Self {
        Self {
            connections: DashMap::new(),
            send_queue_capacity: send_queue_capacity.max(1),
        }
    }

    /// Register a new connection and return its ID + the receiving end of
    /// its send queue.
    pub fn register(&self) -> (ConnectionId, mpsc::Receiver<ServerMessage>) {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::channel(self.send_queue_capacity);
        self.connections.insert(id.clone(), tx);
        tracing::debug!(connection_id = %id, "connection registered");
        (id, rx)
    }

    /// Remove a connection. Returns `false` if it was not registered.
    pub fn unregister(&self, id: &ConnectionId) -> bool {
        let removed = self.connections.remove(id).is_some();
        if removed {
            tracing::debug!(connection_id = %id, "connection unregistered");
        }
        removed
    }

    /// Queue a message for one connection, waiting for room in its queue.
    pub async fn send(&self, id: &ConnectionId, message: ServerMessage) -> Result<(), ChannelError> {
        // Clone the sender out so no map shard lock is held across the await.
        let tx = self
            .connections
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(ChannelError::NotRegistered)?;
        tx.send(message).await.map_err(|_| ChannelError::Closed)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
