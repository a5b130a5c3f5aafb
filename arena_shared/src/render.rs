//! Rendering abstraction.
//!
//! This crate intentionally does not depend on a graphics backend.
//! All coordinates handed to a renderer are already in screen space.

use tracing::trace;

/// Sprite colour of the local player.
pub const PLAYER_COLOR: &str = "red";
/// Sprite colour of every other player.
pub const ENEMY_COLOR: &str = "blue";

/// The drawing surface the client paints each frame.
pub trait Renderer {
    fn clear(&mut self, width: f32, height: f32);
    fn draw_player(&mut self, x: f32, y: f32, direction: f32, label: &str, color: &str);
    fn draw_enemy(&mut self, x: f32, y: f32, direction: f32, label: &str, color: &str);
    fn draw_bullet(&mut self, x: f32, y: f32);
    fn draw_arena_border(&mut self, origin_x: f32, origin_y: f32, width: f32, height: f32);
    /// Takes world (untranslated) coordinates so the grid scrolls with the player.
    fn draw_background_grid(&mut self, world_x: f32, world_y: f32);
}

/// A no-op renderer useful for headless runs.
#[derive(Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn clear(&mut self, _width: f32, _height: f32) {}
    fn draw_player(&mut self, _x: f32, _y: f32, _direction: f32, _label: &str, _color: &str) {}
    fn draw_enemy(&mut self, _x: f32, _y: f32, _direction: f32, _label: &str, _color: &str) {}
    fn draw_bullet(&mut self, _x: f32, _y: f32) {}
    fn draw_arena_border(&mut self, _origin_x: f32, _origin_y: f32, _width: f32, _height: f32) {}
    fn draw_background_grid(&mut self, _world_x: f32, _world_y: f32) {}
}

/// Emits every draw call as a `trace` event.
#[derive(Default)]
pub struct TraceRenderer;

impl Renderer for TraceRenderer {
    fn clear(&mut self, width: f32, height: f32) {
        trace!(width, height, "clear");
    }

    fn draw_player(&mut self, x: f32, y: f32, direction: f32, label: &str, color: &str) {
        trace!(x, y, direction, label, color, "draw_player");
    }

    fn draw_enemy(&mut self, x: f32, y: f32, direction: f32, label: &str, color: &str) {
        trace!(x, y, direction, label, color, "draw_enemy");
    }

    fn draw_bullet(&mut self, x: f32, y: f32) {
        trace!(x, y, "draw_bullet");
    }

    fn draw_arena_border(&mut self, origin_x: f32, origin_y: f32, width: f32, height: f32) {
        trace!(origin_x, origin_y, width, height, "draw_arena_border");
    }

    fn draw_background_grid(&mut self, world_x: f32, world_y: f32) {
        trace!(world_x, world_y, "draw_background_grid");
    }
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear {
        width: f32,
        height: f32,
    },
    Player {
        x: f32,
        y: f32,
        direction: f32,
        label: String,
        color: String,
    },
    Enemy {
        x: f32,
        y: f32,
        direction: f32,
        label: String,
        color: String,
    },
    Bullet {
        x: f32,
        y: f32,
    },
    ArenaBorder {
        origin_x: f32,
        origin_y: f32,
        width: f32,
        height: f32,
    },
    BackgroundGrid {
        world_x: f32,
        world_y: f32,
    },
}

/// Keeps every draw call in order; for tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<DrawCall>,
}

impl RecordingRenderer {
    pub fn take(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self, width: f32, height: f32) {
        self.calls.push(DrawCall::Clear { width, height });
    }

    fn draw_player(&mut self, x: f32, y: f32, direction: f32, label: &str, color: &str) {
        self.calls.push(DrawCall::Player {
            x,
            y,
            direction,
            label: label.to_string(),
            color: color.to_string(),
        });
    }

    fn draw_enemy(&mut self, x: f32, y: f32, direction: f32, label: &str, color: &str) {
        self.calls.push(DrawCall::Enemy {
            x,
            y,
            direction,
            label: label.to_string(),
            color: color.to_string(),
        });
    }

    fn draw_bullet(&mut self, x: f32, y: f32) {
        self.calls.push(DrawCall::Bullet { x, y });
    }

    fn draw_arena_border(&mut self, origin_x: f32, origin_y: f32, width: f32, height: f32) {
        self.calls.push(DrawCall::ArenaBorder {
            origin_x,
            origin_y,
            width,
            height,
        });
    }

    fn draw_background_grid(&mut self, world_x: f32, world_y: f32) {
        self.calls.push(DrawCall::BackgroundGrid { world_x, world_y });
    }
}
