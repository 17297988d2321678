use std::sync::Arc;

use tracing::debug;

use banter_protocol::ServerFrame;

use crate::state::GatewayState;

/// Send a frame to every connected client.
///
/// Clients whose write loop has gone away are skipped; their entry is
/// cleaned up when the read loop exits.
pub async fn broadcast(state: &Arc<GatewayState>, frame: &ServerFrame) {
    let json = frame.to_json();
    let clients = state.clients.read().await;
    debug!(clients = clients.len(), "broadcasting frame");
    for client in clients.values() {
        client.send(&json);
    }
}

/// Broadcast a system notice to every connected client.
pub async fn broadcast_system(state: &Arc<GatewayState>, text: impl Into<String>) {
    broadcast(state, &ServerFrame::system(text)).await;
}
