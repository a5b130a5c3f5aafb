//! Configuration system.
//!
//! Loads client configuration and arena settings from JSON strings/files.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// What happens when the snapshot buffer exceeds its capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Drop the entry with the lowest timestamp.
    #[default]
    EvictOldest,
    /// Drop the entry with the highest timestamp.
    EvictNewest,
}

/// How the display snapshot is produced from the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Render the buffered snapshot nearest to the render target.
    #[default]
    Nearest,
    /// Blend positions of the two snapshots bracketing the render target.
    Blend,
}

/// Root client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket endpoint, e.g. `ws://127.0.0.1:8080/ws/`.
    pub server_url: String,
    /// Name sent in `JoinGame`.
    #[serde(default)]
    pub username: String,
    /// Viewport size in pixels.
    #[serde(default = "default_screen_width")]
    pub screen_width: f32,
    #[serde(default = "default_screen_height")]
    pub screen_height: f32,
    /// Frame rate of the render loop.
    #[serde(default = "default_frame_hz")]
    pub frame_hz: u32,
    /// How far behind the estimated server clock to render, in milliseconds.
    #[serde(default = "default_render_delay_ms")]
    pub render_delay_ms: f64,
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    #[serde(default)]
    pub eviction: EvictionPolicy,
    #[serde(default)]
    pub selection: SelectionMode,
    /// Optional path to the arena settings file.
    #[serde(default)]
    pub settings_path: Option<String>,
}

fn default_screen_width() -> f32 {
    800.0
}

fn default_screen_height() -> f32 {
    600.0
}

fn default_frame_hz() -> u32 {
    60
}

fn default_render_delay_ms() -> f64 {
    70.0
}

fn default_buffer_capacity() -> usize {
    1000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8080/ws/".to_string(),
            username: String::new(),
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            frame_hz: default_frame_hz(),
            render_delay_ms: default_render_delay_ms(),
            buffer_capacity: default_buffer_capacity(),
            eviction: EvictionPolicy::default(),
            selection: SelectionMode::default(),
            settings_path: None,
        }
    }
}

impl ClientConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Reads and parses a config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parse config {}", path.display()))
    }
}

/// Arena dimensions published by the server alongside the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaSettings {
    pub arena_width: f32,
    pub arena_height: f32,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            arena_width: 2000.0,
            arena_height: 2000.0,
        }
    }
}

impl ArenaSettings {
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parse settings {}", path.display()))
    }
}
