//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates platform events into `InputEvent`s and feeds the
//! `InputLatch`; the frame loop decays and latches once per frame.

mod frame;
mod latch;
pub mod platform;
mod types;

pub use frame::InputFrame;
pub use latch::{InputLatch, SCROLL_LINE_PX};
pub use types::{ButtonState, InputEvent, Key, Modifiers, MouseButton, WheelDelta};
