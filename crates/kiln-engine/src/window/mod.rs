//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and wires them to an `Engine`:
//! resizes go through the lifecycle queue, input through the latch.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
