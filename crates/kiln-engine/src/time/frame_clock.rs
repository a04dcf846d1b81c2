use std::time::{Duration, Instant};

/// How often the rolling FPS figure is republished.
pub const FPS_WINDOW: Duration = Duration::from_millis(500);

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds (clamped).
    pub dt: f32,

    /// Sum of clamped deltas since the clock started, in seconds.
    pub total: f64,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,

    /// Frames per second averaged over the last completed window; `0.0` until the first one.
    pub fps: f32,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped to avoid pathological values when the application is paused
/// by the debugger, minimized, or stalls.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    total: f64,
    dt_min: Duration,
    dt_max: Duration,
    fps: FpsCounter,
}

impl FrameClock {
    /// Creates a new clock with default clamps (100µs..250ms).
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self::starting_at(Instant::now(), dt_min, dt_max)
    }

    pub(crate) fn starting_at(start: Instant, dt_min: Duration, dt_max: Duration) -> Self {
        Self {
            last: start,
            frame_index: 0,
            total: 0.0,
            dt_min,
            dt_max,
            fps: FpsCounter::new(start),
        }
    }

    /// Resets the clock baseline.
    ///
    /// Useful when resuming from suspension so neither the next delta nor the
    /// next FPS figure spans the pause.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    /// Resets the baseline as if the pause ended at `now`.
    pub fn reset_at(&mut self, now: Instant) {
        self.last = now;
        self.fps.restart(now);
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock as if the tick happened at `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;
        self.total += dt.as_secs_f64();
        let fps = self.fps.frame(now);

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            total: self.total,
            now,
            frame_index: self.frame_index,
            fps,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolling frames-per-second average, republished every [`FPS_WINDOW`].
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(start: Instant) -> Self {
        Self {
            window_start: start,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Counts one frame ending at `now` and returns the current average.
    pub fn frame(&mut self, now: Instant) -> f32 {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= FPS_WINDOW {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.window_start = now;
        }
        self.fps
    }

    /// Starts a fresh window at `now`, keeping the last published figure.
    pub fn restart(&mut self, now: Instant) {
        self.window_start = now;
        self.frames = 0;
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(start: Instant) -> FrameClock {
        FrameClock::starting_at(start, Duration::from_millis(1), Duration::from_millis(100))
    }

    #[test]
    fn delta_is_clamped_both_ways() {
        let t0 = Instant::now();
        let mut c = clock(t0);
        let fast = c.tick_at(t0);
        assert!((fast.dt - 0.001).abs() < 1e-6);

        let slow = c.tick_at(t0 + Duration::from_secs(5));
        assert!((slow.dt - 0.1).abs() < 1e-6);
        assert_eq!(slow.frame_index, 1);
    }

    #[test]
    fn total_accumulates_clamped_deltas() {
        let t0 = Instant::now();
        let mut c = clock(t0);
        c.tick_at(t0 + Duration::from_millis(16));
        let ft = c.tick_at(t0 + Duration::from_millis(32));
        assert!((ft.total - 0.032).abs() < 1e-9);
    }

    #[test]
    fn fps_publishes_after_window() {
        let t0 = Instant::now();
        let mut fps = FpsCounter::new(t0);
        for i in 1..30 {
            assert_eq!(fps.frame(t0 + Duration::from_millis(i * 16)), 0.0);
        }
        // 30th frame lands at 510ms.
        let v = fps.frame(t0 + Duration::from_millis(510));
        assert!((v - 30.0 / 0.51).abs() < 0.01);
    }

    #[test]
    fn reset_excludes_the_pause_from_fps() {
        let t0 = Instant::now();
        let mut c = clock(t0);
        for i in 1..=10 {
            c.tick_at(t0 + Duration::from_millis(i * 16));
        }

        let resumed = t0 + Duration::from_secs(2);
        c.reset_at(resumed);
        let first = c.tick_at(resumed + Duration::from_millis(16));
        assert_eq!(first.fps, 0.0);
        assert!((first.dt - 0.016).abs() < 1e-6);

        let mut last = first;
        for i in 2..=32 {
            last = c.tick_at(resumed + Duration::from_millis(i * 16));
        }
        // 32 frames over 512ms, none of them spanning the pause.
        assert!((last.fps - 32.0 / 0.512).abs() < 0.01);
    }
}
