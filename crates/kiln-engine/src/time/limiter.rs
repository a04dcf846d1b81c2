use std::time::{Duration, Instant};

/// Sleeps out the remainder of a frame to hold a target frame rate.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameLimiter {
    target: Option<Duration>,
}

impl FrameLimiter {
    /// `None` or `Some(0)` disables limiting.
    pub fn from_fps(target_fps: Option<u32>) -> Self {
        let target = target_fps
            .filter(|&fps| fps > 0)
            .map(|fps| Duration::from_nanos(1_000_000_000 / fps as u64));
        Self { target }
    }

    #[inline]
    pub fn target(&self) -> Option<Duration> {
        self.target
    }

    /// Time left in the frame that started at `frame_start`, if any.
    pub fn remaining(&self, frame_start: Instant, now: Instant) -> Option<Duration> {
        let target = self.target?;
        let elapsed = now.saturating_duration_since(frame_start);
        target.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    /// Blocks until the target frame duration has passed since `frame_start`.
    pub fn wait(&self, frame_start: Instant) {
        if let Some(rest) = self.remaining(frame_start, Instant::now()) {
            std::thread::sleep(rest);
        }
    }
}
