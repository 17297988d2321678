use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        extract::{ConnectInfo, State, WebSocketUpgrade},
        response::{IntoResponse, Json},
        routing::get,
    },
    tower_http::cors::{Any, CorsLayer},
    tracing::info,
};

use {
    banter_completion::{FallbackDispatcher, HttpCompletionClient},
    banter_config::{BanterConfig, ReplyMode},
    banter_protocol::PROTOCOL_VERSION,
};

use crate::{state::GatewayState, ws::handle_connection};

// ── Shared app state ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayState>,
}

// ── Server startup ───────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
pub fn build_gateway_app(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_upgrade_handler))
        .layer(cors)
        .with_state(AppState { gateway: state })
}

/// Start the gateway HTTP + WebSocket server and serve until shutdown.
pub async fn start_gateway(config: &BanterConfig) -> anyhow::Result<()> {
    let backend = Arc::new(HttpCompletionClient::from_config(&config.provider));
    let dispatcher = FallbackDispatcher::from_config(config, backend);
    let state = GatewayState::new(dispatcher, config.chat.reply);

    let app = build_gateway_app(Arc::clone(&state));
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;

    // Startup banner. The key itself must never appear in logs.
    let key_status = if config.provider.resolve_api_key().is_some() {
        "set"
    } else {
        "missing (unauthenticated)"
    };
    let reply_mode = match config.chat.reply {
        ReplyMode::Origin => "origin",
        ReplyMode::Broadcast => "broadcast",
    };
    let lines = vec![
        format!("banter gateway v{}", state.version),
        format!("protocol v{PROTOCOL_VERSION}, listening on http://{addr} (ws at /ws)"),
        format!("provider: {}", config.provider.base_url),
        format!("api key: {key_status}"),
        format!("models: {}", config.models.candidates.join(", ")),
        format!("reply mode: {reply_mode}"),
    ];
    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) + 4;
    info!("┌{}┐", "─".repeat(width));
    for line in &lines {
        info!("│  {:<w$}│", line, w = width - 2);
    }
    info!("└{}┘", "─".repeat(width));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let count = state.gateway.client_count().await;
    Json(serde_json::json!({
        "status": "ok",
        "version": state.gateway.version,
        "protocol": PROTOCOL_VERSION,
        "connections": count,
    }))
}

async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state.gateway, addr))
}
