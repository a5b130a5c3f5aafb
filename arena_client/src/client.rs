//! Client implementation.
//!
//! The client maintains:
//! - A transport to the server (join on open, one `GameAction` per frame)
//! - Snapshot history for render-delay selection
//! - Input state fed by host events
//! - The per-frame pipeline: sample, select, translate, render, transmit
//!
//! Everything here runs on one thread. Message callbacks and frame ticks
//! never interleave, so the snapshot buffer needs no locking.

use arena_shared::{
    config::{ArenaSettings, ClientConfig},
    math::Vec2,
    net::{
        decode_server_msg, encode_client_msg, normalize_username, ClientMsg, ServerMsg, Snapshot,
    },
    render::{Renderer, ENEMY_COLOR, PLAYER_COLOR},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    input::{build_action, InputEvent, InputSampler},
    interp::{Selector, SnapshotBuffer},
    view::DisplayState,
};

/// Transport readiness, modelled on the WebSocket `readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closed,
}

/// Outgoing half of the duplex channel to the server.
pub trait Transport {
    fn ready_state(&self) -> ReadyState;
    fn set_ready_state(&mut self, state: ReadyState);
    fn send_text(&mut self, text: String) -> anyhow::Result<()>;
}

/// Forwards text frames to a writer task over an unbounded channel.
#[derive(Debug)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<String>,
    state: ReadyState,
}

impl ChannelTransport {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            tx,
            state: ReadyState::Connecting,
        }
    }
}

impl Transport for ChannelTransport {
    fn ready_state(&self) -> ReadyState {
        if self.tx.is_closed() {
            ReadyState::Closed
        } else {
            self.state
        }
    }

    fn set_ready_state(&mut self, state: ReadyState) {
        self.state = state;
    }

    fn send_text(&mut self, text: String) -> anyhow::Result<()> {
        self.tx
            .send(text)
            .map_err(|_| anyhow::anyhow!("writer task has shut down"))
    }
}

/// Counters reported by `status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub snapshots_received: u64,
    pub malformed_dropped: u64,
    pub frames_rendered: u64,
    pub actions_sent: u64,
}

/// High-level game client.
pub struct GameClient<T: Transport> {
    pub username: String,
    pub input: InputSampler,
    pub snaps: SnapshotBuffer,
    pub selector: Selector,
    pub stats: ClientStats,

    transport: T,
    screen: Vec2,
    arena: ArenaSettings,
    warned_malformed: bool,
}

impl<T: Transport> GameClient<T> {
    pub fn new(cfg: &ClientConfig, arena: ArenaSettings, transport: T) -> Self {
        let screen = Vec2::new(cfg.screen_width, cfg.screen_height);
        Self {
            username: normalize_username(&cfg.username),
            input: InputSampler::new(center_of(screen)),
            snaps: SnapshotBuffer::new(cfg.buffer_capacity, cfg.eviction),
            selector: Selector::new(cfg.render_delay_ms, cfg.selection),
            stats: ClientStats::default(),
            transport,
            screen,
            arena,
            warned_malformed: false,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn ready_state(&self) -> ReadyState {
        self.transport.ready_state()
    }

    pub fn screen_center(&self) -> Vec2 {
        center_of(self.screen)
    }

    /// Resizes the viewport; the player stays centered and aim follows the new center.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.screen = Vec2::new(width, height);
        self.input.set_center(center_of(self.screen));
    }

    /// Transport opened: announce ourselves.
    pub fn on_open(&mut self) {
        self.transport.set_ready_state(ReadyState::Open);
        info!(username = %self.username, "Connected, joining game");
        self.send(&ClientMsg::JoinGame {
            username: self.username.clone(),
        });
    }

    /// Transport failed. The last snapshot keeps being drawn.
    pub fn on_error(&mut self, err: &anyhow::Error) {
        warn!(error = %err, "Transport error");
    }

    pub fn on_close(&mut self) {
        self.transport.set_ready_state(ReadyState::Closed);
        info!(
            buffered = self.snaps.len(),
            "Connection closed, holding last state"
        );
    }

    /// Handles one text frame from the server. Malformed frames are dropped.
    pub fn on_message(&mut self, text: &str, local_now: f64) {
        match decode_server_msg(text) {
            Ok(ServerMsg::Snapshot(snap)) => self.ingest(snap, local_now),
            Err(e) => {
                self.stats.malformed_dropped += 1;
                if self.warned_malformed {
                    debug!(error = %e, "Dropped malformed server message");
                } else {
                    warn!(error = %e, "Dropped malformed server message");
                    self.warned_malformed = true;
                }
            }
        }
    }

    /// Buffers a snapshot, seeding the clock offset from the first one.
    pub fn ingest(&mut self, snap: Snapshot, local_now: f64) {
        if self.selector.observe(snap.timestamp, local_now) {
            info!(server_timestamp = snap.timestamp, "First snapshot received");
        }
        self.snaps.insert(snap);
        self.stats.snapshots_received += 1;
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        self.input.handle(event);
    }

    /// Runs one frame. Returns `None`, drawing and sending nothing, until
    /// the first snapshot has arrived.
    pub fn frame<R: Renderer>(
        &mut self,
        renderer: &mut R,
        local_now: f64,
    ) -> Option<DisplayState> {
        let input = self.input.sample();
        let view = {
            let snap = self.selector.display(&self.snaps, local_now)?;
            DisplayState::project(&snap, self.screen_center())
        };

        self.render(renderer, &view, input.aim_direction);
        self.stats.frames_rendered += 1;

        if self.send(&build_action(input)) {
            self.stats.actions_sent += 1;
        }
        Some(view)
    }

    fn render<R: Renderer>(&self, renderer: &mut R, view: &DisplayState, aim: f32) {
        renderer.clear(self.screen.x, self.screen.y);
        renderer.draw_arena_border(
            view.arena_origin.x,
            view.arena_origin.y,
            self.arena.arena_width,
            self.arena.arena_height,
        );
        renderer.draw_background_grid(view.world_player.x, view.world_player.y);
        renderer.draw_player(view.player.x, view.player.y, aim, &self.username, PLAYER_COLOR);
        for enemy in &view.enemies {
            renderer.draw_enemy(
                enemy.coords.x,
                enemy.coords.y,
                enemy.dir,
                &enemy.username,
                ENEMY_COLOR,
            );
        }
        for bullet in &view.bullets {
            renderer.draw_bullet(bullet.x, bullet.y);
        }
    }

    /// Sends only while the transport is open; anything else is dropped.
    ///
    /// Returns true if the message was handed to the transport.
    fn send(&mut self, msg: &ClientMsg) -> bool {
        if self.transport.ready_state() != ReadyState::Open {
            return false;
        }
        let sent = encode_client_msg(msg).and_then(|text| self.transport.send_text(text));
        match sent {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Send failed");
                false
            }
        }
    }

    /// Human-readable state summary.
    pub fn status_lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        out.push(format!("State: {:?}", self.ready_state()));
        out.push(format!("Username: {}", self.username));
        out.push(format!(
            "Snapshots buffered: {}/{}",
            self.snaps.len(),
            self.snaps.capacity()
        ));
        if let Some(newest) = self.snaps.newest() {
            out.push(format!("Newest server timestamp: {}", newest.timestamp));
        }
        out.push(format!(
            "Render delay: {}ms ({:?})",
            self.selector.render_delay_ms(),
            self.selector.mode()
        ));
        if let Some(offset) = self.selector.offset() {
            out.push(format!(
                "Clock offset: server {} @ local {:.1}ms",
                offset.server_epoch, offset.local_epoch
            ));
        }
        let input = self.input.sample();
        let mouse = self.input.mouse();
        out.push(format!(
            "Aim: {:.3} rad (mouse {:.0},{:.0})",
            input.aim_direction, mouse.x, mouse.y
        ));
        out.push(format!(
            "Received: {}  Malformed: {}  Frames: {}  Actions: {}",
            self.stats.snapshots_received,
            self.stats.malformed_dropped,
            self.stats.frames_rendered,
            self.stats.actions_sent
        ));
        out
    }
}

fn center_of(screen: Vec2) -> Vec2 {
    Vec2::new(screen.x / 2.0, screen.y / 2.0)
}
