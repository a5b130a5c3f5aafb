//! Test harness: a scripted stand-in for the arena server.
//!
//! The real server owns the simulation; these tests only need something that
//! accepts a WebSocket, records what the client sends, and pushes canned
//! snapshots back.

use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use arena_shared::{config::ClientConfig, math::Vec2, net::Snapshot};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};
use tracing::debug;

/// Listener on an ephemeral localhost port.
pub struct ScriptedServer {
    listener: TcpListener,
}

impl ScriptedServer {
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts one client and completes the WebSocket handshake.
    pub async fn accept_one(&self) -> anyhow::Result<ServerConn> {
        let (stream, peer) = self.listener.accept().await.context("tcp accept")?;
        let ws = accept_async(stream).await.context("websocket handshake")?;
        debug!(%peer, "Scripted server accepted client");
        Ok(ServerConn { ws })
    }
}

/// Binds a scripted server and returns a client config pointing at it.
pub async fn bind_ephemeral() -> anyhow::Result<(ScriptedServer, ClientConfig)> {
    let listener = TcpListener::bind("127.0.0.1:0").await.context("tcp bind")?;
    let addr = listener.local_addr()?;
    let cfg = ClientConfig {
        server_url: format!("ws://{addr}/ws/"),
        username: "tester".to_string(),
        ..ClientConfig::default()
    };
    Ok((ScriptedServer { listener }, cfg))
}

/// Server side of one accepted connection.
pub struct ServerConn {
    ws: WebSocketStream<TcpStream>,
}

impl ServerConn {
    pub async fn send_text(&mut self, text: impl Into<String>) -> anyhow::Result<()> {
        self.ws
            .send(Message::Text(text.into()))
            .await
            .context("server send")
    }

    pub async fn send_snapshot(&mut self, snap: &Snapshot) -> anyhow::Result<()> {
        self.send_text(serde_json::to_string(snap)?).await
    }

    /// Next JSON message from the client, or `None` on timeout or close.
    pub async fn recv_json(&mut self, timeout: Duration) -> anyhow::Result<Option<Value>> {
        loop {
            let next = match tokio::time::timeout(timeout, self.ws.next()).await {
                Ok(next) => next,
                Err(_) => return Ok(None),
            };
            match next {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(serde_json::from_str(&text).context("client sent bad json")?))
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e).context("server recv"),
            }
        }
    }

    pub async fn close(mut self) -> anyhow::Result<()> {
        self.ws.close(None).await.context("server close")
    }
}

/// Snapshot with the local player at `(x, y)` and one enemy beside it.
pub fn sample_snapshot(timestamp: i64, x: f32, y: f32) -> Snapshot {
    let mut snap = Snapshot::at(timestamp, Vec2::new(x, y));
    snap.enemies.push(arena_shared::net::Enemy {
        coords: Vec2::new(x + 25.0, y),
        dir: 0.0,
        username: "rival".to_string(),
    });
    snap.bullets.push(Vec2::new(x, y + 10.0));
    snap
}
