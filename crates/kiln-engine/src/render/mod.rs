//! Frame rendering.
//!
//! Drawables become vertices (`geometry`), vertices become ordered batches
//! (`batch`), and batches are submitted through the `Renderer` façade to a
//! `GpuBackend`.
//!
//! Convention:
//! - CPU geometry is in surface pixels (top-left origin, +Y down).
//! - The vertex shader converts to NDC using a viewport uniform.

mod backend;
pub mod batch;
mod error;
pub mod geometry;
mod renderer;

pub use backend::{HeadlessBackend, WgpuBackend};
pub use batch::{Batch, BatchAssembler};
pub use error::{ErrorClass, RenderError};
pub use renderer::{FrameHandle, FrameStats, Renderer, SurfaceRenderer};
