//! Shared helpers: an in-process hub on an ephemeral port and a thin
//! WebSocket peer client.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::LazyLock;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use signal_hub::app_state::AppState;
use signal_hub::config::{AllowedOrigins, RelayConfig};
use signal_hub::server;

/// How long a test waits for an expected frame.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// How long a test waits to be sure nothing arrives.
pub const SILENCE: Duration = Duration::from_millis(300);

static TRACING: LazyLock<()> = LazyLock::new(|| {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

pub fn enable_tracing() {
    LazyLock::force(&TRACING);
}

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestHub {
    pub addr: SocketAddr,
    pub state: AppState,
}

impl TestHub {
    /// Spawns a hub that accepts any origin.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(RelayConfig {
            allowed_origins: AllowedOrigins::any(),
            ..RelayConfig::default()
        })
        .await
    }

    pub async fn spawn_with(config: RelayConfig) -> anyhow::Result<Self> {
        enable_tracing();
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = AppState::new(config);
        let _ = tokio::spawn(server::serve(
            listener,
            state.clone(),
            std::future::pending(),
        ));
        Ok(Self { addr, state })
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path)
    }

    /// Connects a peer and consumes its `user-list`, returning the ids in it.
    pub async fn join(&self) -> anyhow::Result<(Socket, Vec<String>)> {
        let (mut socket, _) = connect_async(self.ws_url()).await?;
        let snapshot = recv(&mut socket).await?;
        anyhow::ensure!(snapshot["type"] == "user-list", "expected user-list, got {snapshot}");
        let ids = snapshot["payload"]["ids"]
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("user-list without ids: {snapshot}"))?
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        Ok((socket, ids))
    }

    pub async fn peer_count(&self) -> usize {
        self.state.relay.registry().len().await
    }
}

/// Receives the next envelope, skipping control frames.
pub async fn recv(socket: &mut Socket) -> anyhow::Result<Value> {
    tokio::time::timeout(RECV_TIMEOUT, next_envelope(socket))
        .await
        .map_err(|_| anyhow::anyhow!("timed out waiting for envelope"))?
}

async fn next_envelope(socket: &mut Socket) -> anyhow::Result<Value> {
    while let Some(frame) = socket.next().await {
        match frame? {
            Message::Text(text) => return Ok(serde_json::from_str(text.as_str())?),
            Message::Close(_) => anyhow::bail!("socket closed"),
            _ => {}
        }
    }
    anyhow::bail!("stream ended")
}

/// Fails if an envelope arrives within [`SILENCE`].
pub async fn expect_silence(socket: &mut Socket) -> anyhow::Result<()> {
    match tokio::time::timeout(SILENCE, recv(socket)).await {
        Err(_) | Ok(Err(_)) => Ok(()),
        Ok(Ok(msg)) => anyhow::bail!("unexpected envelope: {msg}"),
    }
}

pub async fn send(socket: &mut Socket, envelope: Value) -> anyhow::Result<()> {
    socket.send(Message::text(envelope.to_string())).await?;
    Ok(())
}

/// Polls `check` until it holds or [`RECV_TIMEOUT`] passes.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
