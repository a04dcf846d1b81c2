use std::time::Duration;

use anyhow::{Result, bail, ensure};

use crate::paint::Color;

/// Highest frame-rate target accepted by [`FrameConfig`].
pub const MAX_TARGET_FPS: u32 = 1000;

/// Smallest batch budget that holds one sprite or rectangle quad.
pub const MIN_BATCH_VERTICES: usize = 4;

/// Engine configuration.
///
/// All fields have usable defaults; call [`validate`](Self::validate) before
/// handing a hand-built config to [`Engine`](super::Engine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub assets: AssetConfig,
    pub batching: BatchConfig,
    pub frame: FrameConfig,
    pub clear_color: Color,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            assets: AssetConfig::default(),
            batching: BatchConfig::default(),
            frame: FrameConfig::default(),
            clear_color: Color::BLACK,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.assets.memory_limit > 0,
            "assets.memory_limit must be greater than zero"
        );
        ensure!(
            self.batching.max_batch_vertices >= MIN_BATCH_VERTICES,
            "batching.max_batch_vertices must be at least {MIN_BATCH_VERTICES} (got {})",
            self.batching.max_batch_vertices
        );

        let frame = &self.frame;
        if frame.dt_min > frame.dt_max {
            bail!(
                "frame.dt_min ({:?}) is greater than frame.dt_max ({:?})",
                frame.dt_min,
                frame.dt_max
            );
        }
        if let Some(fps) = frame.target_fps {
            ensure!(
                (1..=MAX_TARGET_FPS).contains(&fps),
                "frame.target_fps must be in 1..={MAX_TARGET_FPS} (got {fps}); use None to disable limiting"
            );
        }
        ensure!(self.clear_color.is_finite(), "clear_color must be finite");
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AssetConfig {
    /// Byte budget for decoded textures.
    pub memory_limit: usize,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            memory_limit: 256 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BatchConfig {
    /// Upper bound on vertices per batch (and so per draw call).
    pub max_batch_vertices: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_vertices: 65_536,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameConfig {
    /// `None` runs unthrottled (vsync still applies on windowed backends).
    pub target_fps: Option<u32>,
    pub dt_min: Duration,
    pub dt_max: Duration,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_fps: None,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_batch_size_below_one_quad() {
        let mut cfg = EngineConfig::default();
        for size in [0, 1, 3] {
            cfg.batching.max_batch_vertices = size;
            let err = cfg.validate().unwrap_err();
            assert!(err.to_string().contains("max_batch_vertices"), "{size}");
        }
        cfg.batching.max_batch_vertices = MIN_BATCH_VERTICES;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_zero_memory_budget() {
        let mut cfg = EngineConfig::default();
        cfg.assets.memory_limit = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_inverted_dt_clamps() {
        let mut cfg = EngineConfig::default();
        cfg.frame.dt_min = Duration::from_millis(50);
        cfg.frame.dt_max = Duration::from_millis(10);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn target_fps_bounds() {
        let mut cfg = EngineConfig::default();
        for (fps, ok) in [(Some(0), false), (Some(1), true), (Some(1000), true), (Some(1001), false), (None, true)] {
            cfg.frame.target_fps = fps;
            assert_eq!(cfg.validate().is_ok(), ok, "target_fps = {fps:?}");
        }
    }
}
