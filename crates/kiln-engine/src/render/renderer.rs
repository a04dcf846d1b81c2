use crate::device::{
    DeviceSurfaceManager, DeviceSurfaceState, GpuBackend, LifecycleSender, SurfaceSize,
    SurfaceTarget,
};
use crate::paint::Color;

use super::{Batch, RenderError};

/// Token for one frame between `begin_frame` and `present`.
#[derive(Debug)]
pub struct FrameHandle {
    index: u64,
    submitted: bool,
    batches: usize,
    draw_calls: u32,
    vertices: usize,
}

impl FrameHandle {
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    #[inline]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }
}

/// Recorded after a successful present.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub frame_index: u64,
    pub batches: usize,
    pub draw_calls: u32,
    pub vertices: usize,
}

/// Per-frame submit contract, independent of the GPU API behind it.
///
/// Per frame: `begin_frame`, at most one `submit`, then `present`.
pub trait Renderer {
    fn initialize(&mut self, target: SurfaceTarget, size: SurfaceSize) -> Result<(), RenderError>;

    /// Resizing to the current size is a no-op.
    fn resize(&mut self, size: SurfaceSize) -> Result<(), RenderError>;

    /// Applies resize and device-loss notifications queued since the last frame.
    fn apply_lifecycle(&mut self) -> Result<(), RenderError>;

    /// Opens a frame, applying any lifecycle events still queued.
    fn begin_frame(&mut self) -> FrameHandle;

    fn submit(&mut self, frame: &mut FrameHandle, batches: &[Batch]) -> Result<(), RenderError>;

    fn present(&mut self, frame: FrameHandle) -> Result<FrameStats, RenderError>;

    fn set_clear_color(&mut self, color: Color);

    fn state(&self) -> DeviceSurfaceState;

    fn last_stats(&self) -> Option<FrameStats>;

    fn surface_size(&self) -> SurfaceSize;

    /// True while the surface has zero area (e.g. a minimized window).
    fn awaiting_surface(&self) -> bool;

    /// Handle for platform callbacks (resize, device loss).
    fn lifecycle_sender(&self) -> LifecycleSender;

    fn shutdown(&mut self);
}

/// The [`Renderer`] façade over a [`DeviceSurfaceManager`].
pub struct SurfaceRenderer<B> {
    manager: DeviceSurfaceManager<B>,
    clear_color: Color,
    next_frame: u64,
    open_frame: Option<u64>,
    last_stats: Option<FrameStats>,
}

impl<B: GpuBackend> SurfaceRenderer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            manager: DeviceSurfaceManager::new(backend),
            clear_color: Color::BLACK,
            next_frame: 0,
            open_frame: None,
            last_stats: None,
        }
    }

    #[inline]
    pub fn manager(&self) -> &DeviceSurfaceManager<B> {
        &self.manager
    }

    #[inline]
    pub fn backend(&self) -> &B {
        self.manager.backend()
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        self.manager.backend_mut()
    }

    #[inline]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    fn check_open(&self, frame: &FrameHandle) -> Result<(), RenderError> {
        if self.open_frame != Some(frame.index) {
            return Err(RenderError::InvalidFrame("stale frame handle"));
        }
        Ok(())
    }
}

impl<B: GpuBackend> Renderer for SurfaceRenderer<B> {
    fn initialize(&mut self, target: SurfaceTarget, size: SurfaceSize) -> Result<(), RenderError> {
        self.manager.initialize(target, size)
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), RenderError> {
        self.manager.resize(size)
    }

    fn apply_lifecycle(&mut self) -> Result<(), RenderError> {
        self.manager.apply_lifecycle()
    }

    fn begin_frame(&mut self) -> FrameHandle {
        if let Err(e) = self.manager.apply_lifecycle() {
            log::warn!("lifecycle update failed: {e}");
        }

        let index = self.next_frame;
        self.next_frame += 1;
        self.open_frame = Some(index);
        FrameHandle {
            index,
            submitted: false,
            batches: 0,
            draw_calls: 0,
            vertices: 0,
        }
    }

    fn submit(&mut self, frame: &mut FrameHandle, batches: &[Batch]) -> Result<(), RenderError> {
        self.check_open(frame)?;
        if frame.submitted {
            return Err(RenderError::InvalidFrame("frame already submitted"));
        }

        let draw_calls = self.manager.draw(batches, self.clear_color)?;
        frame.submitted = true;
        frame.batches = batches.len();
        frame.draw_calls = draw_calls;
        frame.vertices = batches.iter().map(|b| b.vertices.len()).sum();
        Ok(())
    }

    fn present(&mut self, frame: FrameHandle) -> Result<FrameStats, RenderError> {
        self.check_open(&frame)?;
        self.open_frame = None;

        if !frame.submitted {
            // Nothing drawn this frame; still clear the surface.
            self.manager.draw(&[], self.clear_color)?;
        }
        self.manager.present()?;

        let stats = FrameStats {
            frame_index: frame.index,
            batches: frame.batches,
            draw_calls: frame.draw_calls,
            vertices: frame.vertices,
        };
        self.last_stats = Some(stats);
        Ok(stats)
    }

    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    fn state(&self) -> DeviceSurfaceState {
        self.manager.state()
    }

    fn last_stats(&self) -> Option<FrameStats> {
        self.last_stats
    }

    fn surface_size(&self) -> SurfaceSize {
        self.manager.size()
    }

    fn awaiting_surface(&self) -> bool {
        self.manager.awaiting_surface()
    }

    fn lifecycle_sender(&self) -> LifecycleSender {
        self.manager.lifecycle_sender()
    }

    fn shutdown(&mut self) {
        self.open_frame = None;
        self.manager.shutdown();
    }
}
