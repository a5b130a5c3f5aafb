//! Input handling.
//!
//! The host (window, terminal, test harness) pushes discrete events into an
//! `InputSampler`; the frame loop reads a copy of the current state once per
//! frame. Both run on the same thread, so the sampler needs no locking.

use std::f32::consts::FRAC_PI_2;

use arena_shared::{
    math::{heading, Vec2},
    net::{ClientMsg, GameAction},
};

/// Movement keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Forward,
    Left,
    Back,
    Right,
}

impl Key {
    /// Maps DOM-style key codes for W/A/S/D.
    pub fn from_key_code(code: u32) -> Option<Self> {
        match code {
            87 => Some(Key::Forward),
            65 => Some(Key::Left),
            83 => Some(Key::Back),
            68 => Some(Key::Right),
            _ => None,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(Key::Forward),
            'a' => Some(Key::Left),
            's' => Some(Key::Back),
            'd' => Some(Key::Right),
            _ => None,
        }
    }
}

/// Raw input events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyChanged { key: Key, pressed: bool },
    MouseMoved { x: f32, y: f32 },
    MouseButton { pressed: bool },
}

/// User input state at a moment in time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub forward: bool,
    pub left: bool,
    pub back: bool,
    pub right: bool,
    pub firing: bool,
    pub aim_direction: f32,
}

/// Sprite-facing angle from the screen center toward the mouse.
///
/// The `+π/2` term rotates the angle into the sprite's frame, whose forward
/// axis is the screen vertical.
pub fn aim_direction(mouse: Vec2, center: Vec2) -> f32 {
    heading(mouse, center) + FRAC_PI_2
}

/// Tracks key, button and mouse state between frames.
#[derive(Debug, Default)]
pub struct InputSampler {
    state: InputState,
    mouse: Vec2,
    center: Vec2,
}

impl InputSampler {
    pub fn new(center: Vec2) -> Self {
        Self {
            center,
            ..Self::default()
        }
    }

    /// Applies one event. Last event wins; there is no debouncing.
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyChanged { key, pressed } => {
                let flag = match key {
                    Key::Forward => &mut self.state.forward,
                    Key::Left => &mut self.state.left,
                    Key::Back => &mut self.state.back,
                    Key::Right => &mut self.state.right,
                };
                *flag = pressed;
            }
            InputEvent::MouseMoved { x, y } => self.mouse = Vec2::new(x, y),
            InputEvent::MouseButton { pressed } => self.state.firing = pressed,
        }
    }

    /// Screen center used for aiming; changes on resize.
    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    pub fn mouse(&self) -> Vec2 {
        self.mouse
    }

    /// Current state with the aim recomputed from the latest mouse position.
    pub fn sample(&self) -> InputState {
        InputState {
            aim_direction: aim_direction(self.mouse, self.center),
            ..self.state
        }
    }
}

/// Packages sampled input as an outgoing `GameAction`.
pub fn build_action(input: InputState) -> ClientMsg {
    ClientMsg::GameAction(GameAction {
        forward: input.forward,
        left: input.left,
        back: input.back,
        right: input.right,
        firing: input.firing,
        aim_direction: input.aim_direction,
    })
}
