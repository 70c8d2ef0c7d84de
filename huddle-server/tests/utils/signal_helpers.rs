use anyhow::Result;
use huddle_server::{AppState, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;

/// Timeout for a single expected frame (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

/// Window in which no frame must arrive for "nothing happened" assertions (ms).
pub const QUIET_PERIOD_MS: u64 = 300;

/// Serves the full router on an ephemeral localhost port.
pub async fn start_test_server(config: ServerConfig) -> Result<(SocketAddr, Arc<AppState>)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = Arc::new(AppState::new(&config));

    let app = huddle_server::router(state.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("[TestServer] stopped: {}", e);
        }
    });

    Ok((addr, state))
}

/// Polls `check` until it holds or the signal timeout elapses.
pub async fn eventually<F>(mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_millis(SIGNAL_TIMEOUT_MS);
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    check()
}
