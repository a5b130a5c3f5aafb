//! Wire protocol.
//!
//! Goals:
//! - Mirror the JSON text frames exchanged with the arena server.
//! - Keep serialization explicit: every message type is a plain serde struct.
//!
//! Client -> server frames carry a `type` tag. Server -> client snapshots are
//! bare objects with no tag.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Username substituted for a blank one on join.
pub const DEFAULT_USERNAME: &str = "Unnamed";

/// Client -> server message envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMsg {
    /// Sent once when the transport opens.
    JoinGame { username: String },
    /// Sent every frame while the transport is open.
    GameAction(GameAction),
}

/// Per-frame input intent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct GameAction {
    pub forward: bool,
    pub left: bool,
    pub back: bool,
    pub right: bool,
    pub firing: bool,
    /// Radians, screen center toward the mouse, rotated a quarter turn.
    pub aim_direction: f32,
}

/// Server -> client message envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ServerMsg {
    Snapshot(Snapshot),
}

/// Another player as seen by the local client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enemy {
    pub coords: Vec2,
    /// Facing, radians.
    pub dir: f32,
    pub username: String,
}

/// Authoritative world snapshot.
///
/// Immutable once received; the client only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    /// Server clock, milliseconds.
    pub timestamp: i64,
    pub my_coords: Vec2,
    #[serde(default)]
    pub enemies: Vec<Enemy>,
    #[serde(default)]
    pub bullets: Vec<Vec2>,
}

impl Snapshot {
    /// Snapshot with only a timestamp and the local player's position.
    pub fn at(timestamp: i64, my_coords: Vec2) -> Self {
        Self {
            timestamp,
            my_coords,
            enemies: Vec::new(),
            bullets: Vec::new(),
        }
    }
}

/// Serializes a client message into a text frame.
pub fn encode_client_msg(msg: &ClientMsg) -> anyhow::Result<String> {
    serde_json::to_string(msg).context("serialize client msg")
}

/// Parses a text frame received from the server.
pub fn decode_server_msg(text: &str) -> anyhow::Result<ServerMsg> {
    serde_json::from_str(text).context("deserialize server msg")
}

/// Applies the server's blank-name rule.
pub fn normalize_username(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        DEFAULT_USERNAME.to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn join_game_has_type_tag() {
        let text = encode_client_msg(&ClientMsg::JoinGame {
            username: "ana".into(),
        })
        .unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v, json!({"type": "JoinGame", "username": "ana"}));
    }

    #[test]
    fn game_action_fields_are_flat() {
        let text = encode_client_msg(&ClientMsg::GameAction(GameAction {
            forward: true,
            firing: true,
            aim_direction: 1.5,
            ..GameAction::default()
        }))
        .unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["type"], "GameAction");
        assert_eq!(v["forward"], true);
        assert_eq!(v["left"], false);
        assert_eq!(v["back"], false);
        assert_eq!(v["right"], false);
        assert_eq!(v["firing"], true);
        assert_eq!(v["aim_direction"], 1.5);
    }

    #[test]
    fn decodes_untagged_snapshot() {
        let text = r#"{
            "timestamp": 1200,
            "my_coords": {"x": 10.0, "y": 20.5},
            "enemies": [{"coords": {"x": 1, "y": 2}, "dir": 0.25, "username": "bob"}],
            "bullets": [{"x": 3.0, "y": 4.0}]
        }"#;
        let ServerMsg::Snapshot(snap) = decode_server_msg(text).unwrap();
        assert_eq!(snap.timestamp, 1200);
        assert_eq!(snap.my_coords, Vec2::new(10.0, 20.5));
        assert_eq!(snap.enemies[0].username, "bob");
        assert_eq!(snap.enemies[0].coords, Vec2::new(1.0, 2.0));
        assert_eq!(snap.bullets, vec![Vec2::new(3.0, 4.0)]);
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let ServerMsg::Snapshot(snap) =
            decode_server_msg(r#"{"timestamp": 5, "my_coords": {"x": 0, "y": 0}}"#).unwrap();
        assert!(snap.enemies.is_empty());
        assert!(snap.bullets.is_empty());
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        assert!(decode_server_msg("not json").is_err());
        assert!(decode_server_msg(r#"{"timestamp": "soon"}"#).is_err());
        assert!(decode_server_msg(r#"{"my_coords": {"x": 0, "y": 0}}"#).is_err());
    }

    #[test]
    fn blank_username_is_replaced() {
        assert_eq!(normalize_username("   "), DEFAULT_USERNAME);
        assert_eq!(normalize_username(" eve "), "eve");
    }
}
