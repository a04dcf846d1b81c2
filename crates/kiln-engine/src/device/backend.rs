use crate::paint::Color;
use crate::render::{Batch, RenderError};

use super::{LifecycleSender, SurfaceSize, SurfaceTarget};

/// GPU-specific half of the renderer.
///
/// The [`DeviceSurfaceManager`](super::DeviceSurfaceManager) decides *when*
/// each call happens; implementations only do the work. No backend type
/// crosses this boundary.
pub trait GpuBackend {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Acquires a device and builds the swap chain for `target`.
    ///
    /// Asynchronous loss notifications must be routed through `lifecycle`.
    fn create(
        &mut self,
        target: &SurfaceTarget,
        size: SurfaceSize,
        lifecycle: &LifecycleSender,
    ) -> Result<(), RenderError>;

    /// Rebuilds size-dependent swap resources. `size` is never zero-area.
    fn recreate_swapchain(&mut self, size: SurfaceSize) -> Result<(), RenderError>;

    /// Releases every device resource. Must be safe to call repeatedly.
    fn destroy(&mut self);

    /// Records and submits one frame: clear, then one draw call per batch.
    ///
    /// Returns the number of draw calls issued.
    fn draw(&mut self, batches: &[Batch], clear: Color) -> Result<u32, RenderError>;

    /// Presents the frame recorded by the last `draw`.
    fn present(&mut self) -> Result<(), RenderError>;
}
