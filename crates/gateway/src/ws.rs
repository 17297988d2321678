use std::{net::SocketAddr, sync::Arc};

use {
    axum::extract::ws::{Message, WebSocket},
    futures::{SinkExt, stream::StreamExt},
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use {
    banter_config::ReplyMode,
    banter_protocol::{ClientFrame, FrameError, MAX_PAYLOAD_BYTES, ServerFrame},
};

use crate::{
    broadcast::{broadcast, broadcast_system},
    state::{ConnectedClient, GatewayState},
};

/// Handle a single WebSocket connection through its full lifecycle:
/// register → message loop → cleanup.
pub async fn handle_connection(socket: WebSocket, state: Arc<GatewayState>, remote_addr: SocketAddr) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    info!(conn_id = %conn_id, remote_ip = %remote_addr.ip(), "ws: new connection");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (client_tx, mut client_rx) = mpsc::unbounded_channel::<String>();

    // Write loop: forwards frames from the client_tx channel to the socket.
    let write_conn_id = conn_id.clone();
    let write_handle = tokio::spawn(async move {
        while let Some(msg) = client_rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                debug!(conn_id = %write_conn_id, "ws: write loop closed");
                break;
            }
        }
    });

    state
        .register_client(ConnectedClient {
            conn_id: conn_id.clone(),
            sender: client_tx.clone(),
            connected_at: std::time::Instant::now(),
        })
        .await;
    broadcast_system(&state, "a user joined the chat").await;

    // ── Message loop ─────────────────────────────────────────────────────

    while let Some(msg) = ws_rx.next().await {
        let text = match msg {
            Ok(Message::Text(t)) => t.to_string(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "ws: read error");
                break;
            },
        };

        let frame = match ClientFrame::parse(&text) {
            Ok(frame) => frame,
            Err(FrameError::Oversized { len }) => {
                warn!(conn_id = %conn_id, size = len, "ws: payload too large");
                let notice = ServerFrame::system(format!(
                    "message too large (max {MAX_PAYLOAD_BYTES} bytes)"
                ));
                let _ = client_tx.send(notice.to_json());
                continue;
            },
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "ws: invalid frame");
                let _ = client_tx.send(ServerFrame::system("invalid frame").to_json());
                continue;
            },
        };

        let ClientFrame::Chat { text } = frame;

        // One task per message: a slow upstream never blocks this read loop,
        // and concurrent messages resolve independently.
        let task_state = Arc::clone(&state);
        let origin = conn_id.clone();
        tokio::spawn(async move {
            let reply = task_state.dispatcher.dispatch(&text).await;
            let frame = ServerFrame::chat(reply);
            match task_state.reply_mode {
                ReplyMode::Origin => {
                    if !task_state.send_to(&origin, &frame.to_json()).await {
                        debug!(conn_id = %origin, "ws: origin gone before reply, dropped");
                    }
                },
                ReplyMode::Broadcast => broadcast(&task_state, &frame).await,
            }
        });
    }

    // ── Cleanup ──────────────────────────────────────────────────────────

    let duration = state
        .remove_client(&conn_id)
        .await
        .map(|client| client.connected_at.elapsed())
        .unwrap_or_default();
    broadcast_system(&state, "a user left the chat").await;

    info!(
        conn_id = %conn_id,
        duration_secs = duration.as_secs(),
        "ws: connection closed"
    );

    drop(client_tx);
    write_handle.abort();
}
