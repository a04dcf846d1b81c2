//! Core engine-facing contracts.
//!
//! This module defines the interface between the platform loop and game code:
//! the `App` callbacks, their per-frame contexts, the engine configuration and
//! the `Engine` that sequences each frame.

mod app;
mod config;
mod ctx;
mod engine;

pub use app::{App, AppControl};
pub use config::{AssetConfig, BatchConfig, EngineConfig, FrameConfig, MAX_TARGET_FPS, MIN_BATCH_VERTICES};
pub use ctx::{FrameCtx, RenderCtx};
pub use engine::{Engine, FrameOutcome, MAX_RECOVERY_ATTEMPTS};
