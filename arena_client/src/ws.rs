//! WebSocket session.
//!
//! Splits the socket into a writer task, fed through `ChannelTransport`, and
//! a read half the event loop polls. Text frames are the only payload the
//! server sends; pings are answered by tungstenite itself.

use std::time::Duration;

use anyhow::Context;
use arena_shared::{
    config::{ArenaSettings, ClientConfig},
    render::Renderer,
};
use futures::{stream::SplitStream, SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::mpsc, time::Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::{
    client::{ChannelTransport, GameClient},
    view::DisplayState,
};

type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// A connected client plus the read half of its socket.
pub struct WsSession {
    pub client: GameClient<ChannelTransport>,
    reader: WsReader,
    started: Instant,
    open: bool,
}

impl WsSession {
    /// Connects to `cfg.server_url` and sends `JoinGame`.
    pub async fn connect(cfg: &ClientConfig, arena: ArenaSettings) -> anyhow::Result<Self> {
        info!(url = %cfg.server_url, "Connecting to server");
        let (stream, _response) = connect_async(cfg.server_url.as_str())
            .await
            .with_context(|| format!("websocket connect {}", cfg.server_url))?;
        let (mut sink, reader) = stream.split();

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                if let Err(e) = sink.send(Message::Text(text)).await {
                    warn!(error = %e, "WebSocket write failed");
                    break;
                }
            }
            let _ = sink.close().await;
            debug!("Writer task finished");
        });

        let mut client = GameClient::new(cfg, arena, ChannelTransport::new(tx));
        client.on_open();

        Ok(Self {
            client,
            reader,
            started: Instant::now(),
            open: true,
        })
    }

    /// Milliseconds since the session started; the local monotonic clock.
    pub fn local_now(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Waits for the next frame from the server and dispatches it.
    ///
    /// Returns false once the connection has closed; further calls then
    /// wait forever, so the caller can keep it in a `select!` harmlessly.
    pub async fn recv(&mut self) -> bool {
        if !self.open {
            std::future::pending::<()>().await;
        }
        match self.reader.next().await {
            Some(Ok(msg)) => self.dispatch(msg),
            Some(Err(e)) => {
                self.client.on_error(&anyhow::Error::new(e));
                self.close();
            }
            None => self.close(),
        }
        self.open
    }

    /// Like `recv`, but gives up after `timeout`. Returns false on timeout
    /// or once the connection has closed.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> bool {
        if !self.open {
            return false;
        }
        tokio::time::timeout(timeout, self.recv())
            .await
            .unwrap_or(false)
    }

    /// Runs one render frame at the current local time.
    pub fn frame<R: Renderer>(&mut self, renderer: &mut R) -> Option<DisplayState> {
        let now = self.local_now();
        self.client.frame(renderer, now)
    }

    fn dispatch(&mut self, msg: Message) {
        match msg {
            Message::Text(text) => {
                let now = self.local_now();
                self.client.on_message(&text, now);
            }
            Message::Close(frame) => {
                debug!(?frame, "Server sent close");
                self.close();
            }
            other => debug!(?other, "Ignoring non-text frame"),
        }
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.client.on_close();
        }
    }
}
