use crate::device::{GpuBackend, LifecycleSender, SurfaceSize, SurfaceTarget};
use crate::paint::Color;
use crate::render::{Batch, RenderError};

/// Backend that draws nothing and counts everything.
///
/// Used for tests and `--headless` runs. Faults can be injected to exercise
/// the device state machine without a GPU.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    alive: bool,
    size: SurfaceSize,
    lifecycle: Option<LifecycleSender>,
    frame_pending: bool,

    creates: u32,
    recreations: u32,
    destroys: u32,
    draws: u32,
    presents: u32,
    last_draw_calls: u32,
    last_vertices: usize,
    last_clear: Color,

    fail_next_create: bool,
    failing_recreates: u32,
    lose_on_next_present: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    // ── fault injection ──

    /// The next `create` fails with `InitFailed`.
    pub fn fail_next_create(&mut self) {
        self.fail_next_create = true;
    }

    /// The next `times` swap-chain rebuilds fail with `SurfaceError`.
    pub fn fail_recreates(&mut self, times: u32) {
        self.failing_recreates = times;
    }

    /// The next `present` reports device loss synchronously.
    pub fn lose_device_on_next_present(&mut self) {
        self.lose_on_next_present = true;
    }

    /// Reports device loss through the lifecycle queue, as a driver callback would.
    pub fn report_device_lost(&self) {
        if let Some(tx) = &self.lifecycle {
            tx.device_lost();
        }
    }

    // ── counters ──

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    #[inline]
    pub fn creates(&self) -> u32 {
        self.creates
    }

    #[inline]
    pub fn recreations(&self) -> u32 {
        self.recreations
    }

    #[inline]
    pub fn destroys(&self) -> u32 {
        self.destroys
    }

    #[inline]
    pub fn draws(&self) -> u32 {
        self.draws
    }

    #[inline]
    pub fn presents(&self) -> u32 {
        self.presents
    }

    #[inline]
    pub fn last_draw_calls(&self) -> u32 {
        self.last_draw_calls
    }

    #[inline]
    pub fn last_vertices(&self) -> usize {
        self.last_vertices
    }

    #[inline]
    pub fn last_clear(&self) -> Color {
        self.last_clear
    }
}

impl GpuBackend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn create(
        &mut self,
        _target: &SurfaceTarget,
        size: SurfaceSize,
        lifecycle: &LifecycleSender,
    ) -> Result<(), RenderError> {
        if std::mem::take(&mut self.fail_next_create) {
            return Err(RenderError::InitFailed("injected create failure".into()));
        }
        self.alive = true;
        self.size = size;
        self.lifecycle = Some(lifecycle.clone());
        self.creates += 1;
        Ok(())
    }

    fn recreate_swapchain(&mut self, size: SurfaceSize) -> Result<(), RenderError> {
        if !self.alive {
            return Err(RenderError::DeviceNotReady);
        }
        if self.failing_recreates > 0 {
            self.failing_recreates -= 1;
            return Err(RenderError::SurfaceError("injected recreate failure".into()));
        }
        self.size = size;
        self.recreations += 1;
        Ok(())
    }

    fn destroy(&mut self) {
        if self.alive {
            self.destroys += 1;
        }
        self.alive = false;
        self.frame_pending = false;
    }

    fn draw(&mut self, batches: &[Batch], clear: Color) -> Result<u32, RenderError> {
        if !self.alive {
            return Err(RenderError::DeviceNotReady);
        }
        self.draws += 1;
        self.last_draw_calls = batches.len() as u32;
        self.last_vertices = batches.iter().map(|b| b.vertices.len()).sum();
        self.last_clear = clear;
        self.frame_pending = true;
        Ok(self.last_draw_calls)
    }

    fn present(&mut self) -> Result<(), RenderError> {
        if std::mem::take(&mut self.lose_on_next_present) {
            return Err(RenderError::DeviceLost);
        }
        if !std::mem::take(&mut self.frame_pending) {
            return Err(RenderError::InvalidFrame("present without a drawn frame"));
        }
        self.presents += 1;
        Ok(())
    }
}
