//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per window (or per render loop)
//! - call `tick()` once per frame to obtain `FrameTime`
//! - `FrameLimiter::wait` at the end of the frame when a target rate is set

mod frame_clock;
mod limiter;

pub use frame_clock::{FPS_WINDOW, FpsCounter, FrameClock, FrameTime};
pub use limiter::FrameLimiter;
