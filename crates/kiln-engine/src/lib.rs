//! Kiln engine crate.
//!
//! The frame pipeline of a 2D engine: drawables are built into vertex meshes,
//! grouped into paint-ordered batches and submitted through a backend-agnostic
//! renderer, while the engine loop sequences delta time, input latching and
//! device lifecycle events.

pub mod assets;
pub mod core;
pub mod device;
pub mod input;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod paint;
