//! `arena_shared`
//!
//! Libraries shared by the arena client and its tests.
//!
//! Design goals:
//! - Wire types mirror the server's JSON frames exactly.
//! - Rendering is a trait so the client stays backend agnostic.
//! - No `unsafe`.

pub mod config;
pub mod math;
pub mod net;
pub mod render;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::config::*;
    pub use crate::math::*;
    pub use crate::net::*;
    pub use crate::render::*;
}
