//! World-to-screen translation.
//!
//! The camera follows the local player: every world coordinate is shifted by
//! the same offset so the player lands on the screen center.

use arena_shared::{
    math::Vec2,
    net::{Enemy, Snapshot},
};

/// Returns `translate(x, y)` mapping world space to screen space such that
/// `(player_x, player_y)` maps to `(center_x, center_y)`.
pub fn make_translator(
    player_x: f32,
    player_y: f32,
    center_x: f32,
    center_y: f32,
) -> impl Fn(f32, f32) -> Vec2 + Copy {
    let dx = center_x - player_x;
    let dy = center_y - player_y;
    move |x, y| Vec2::new(x + dx, y + dy)
}

/// A snapshot projected into screen space for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    /// Server timestamp of the snapshot this was derived from.
    pub timestamp: i64,
    /// Local player in world space, for the scrolling background.
    pub world_player: Vec2,
    pub player: Vec2,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Vec2>,
    /// Screen position of the world origin, i.e. the arena's top-left corner.
    pub arena_origin: Vec2,
}

impl DisplayState {
    pub fn project(snap: &Snapshot, center: Vec2) -> Self {
        let translate = make_translator(snap.my_coords.x, snap.my_coords.y, center.x, center.y);
        let at = |p: Vec2| translate(p.x, p.y);

        Self {
            timestamp: snap.timestamp,
            world_player: snap.my_coords,
            player: at(snap.my_coords),
            enemies: snap
                .enemies
                .iter()
                .map(|e| Enemy {
                    coords: at(e.coords),
                    dir: e.dir,
                    username: e.username.clone(),
                })
                .collect(),
            bullets: snap.bullets.iter().map(|b| at(*b)).collect(),
            arena_origin: translate(0.0, 0.0),
        }
    }
}
