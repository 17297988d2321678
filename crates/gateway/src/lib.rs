//! Gateway: WebSocket/HTTP server and reply routing.
//!
//! Lifecycle:
//! 1. Load config, build the completion client and fallback dispatcher
//! 2. Bind address, start HTTP server (health endpoint)
//! 3. Attach WebSocket upgrade handler
//! 4. Per connection: register → message loop → cleanup
//!
//! Every inbound chat message runs on its own task, so a slow upstream
//! completion never blocks a socket's read loop or the other clients.

pub mod broadcast;
pub mod server;
pub mod state;
pub mod ws;
