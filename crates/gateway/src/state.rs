use std::{
    collections::HashMap,
    sync::Arc,
    time::Instant,
};

use tokio::sync::{RwLock, mpsc};

use {banter_completion::FallbackDispatcher, banter_config::ReplyMode};

// ── Connected client ─────────────────────────────────────────────────────

/// A WebSocket client currently connected to the gateway.
#[derive(Debug)]
pub struct ConnectedClient {
    pub conn_id: String,
    /// Channel feeding this client's write loop.
    pub sender: mpsc::UnboundedSender<String>,
    pub connected_at: Instant,
}

impl ConnectedClient {
    /// Send a serialized frame to this client. Returns false when the write
    /// loop has gone away.
    pub fn send(&self, frame: &str) -> bool {
        self.sender.send(frame.to_string()).is_ok()
    }
}

// ── Gateway state ────────────────────────────────────────────────────────

/// Shared gateway runtime state, wrapped in Arc for use across tasks.
pub struct GatewayState {
    /// All connected WebSocket clients, keyed by conn_id.
    pub clients: RwLock<HashMap<String, ConnectedClient>>,
    /// Produces the reply for each inbound chat message.
    pub dispatcher: FallbackDispatcher,
    /// Whether replies go back to the origin connection or to everyone.
    pub reply_mode: ReplyMode,
    /// Server version string.
    pub version: String,
}

impl GatewayState {
    pub fn new(dispatcher: FallbackDispatcher, reply_mode: ReplyMode) -> Arc<Self> {
        Arc::new(Self {
            clients: RwLock::new(HashMap::new()),
            dispatcher,
            reply_mode,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// Register a new client connection.
    pub async fn register_client(&self, client: ConnectedClient) {
        let conn_id = client.conn_id.clone();
        self.clients.write().await.insert(conn_id, client);
    }

    /// Remove a client by conn_id. Returns the removed client if found.
    pub async fn remove_client(&self, conn_id: &str) -> Option<ConnectedClient> {
        self.clients.write().await.remove(conn_id)
    }

    /// Number of connected clients.
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Send a frame to one client. Returns false when the client is gone.
    pub async fn send_to(&self, conn_id: &str, frame: &str) -> bool {
        self.clients
            .read()
            .await
            .get(conn_id)
            .map(|client| client.send(frame))
            .unwrap_or(false)
    }
}
