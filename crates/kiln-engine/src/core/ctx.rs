use crate::assets::TextureCache;
use crate::device::{DeviceSurfaceState, SurfaceSize};
use crate::input::InputLatch;
use crate::paint::Color;
use crate::render::FrameStats;
use crate::scene::{DrawList, Drawable};
use crate::time::FrameTime;

/// Read-only view of the engine passed to [`App::update`](super::App::update).
///
/// The texture cache takes `&self` for loads and unloads, so assets can be
/// managed from here.
pub struct FrameCtx<'a> {
    pub time: FrameTime,
    pub input: &'a InputLatch,
    pub assets: &'a TextureCache,
    pub surface_size: SurfaceSize,
    pub device_state: DeviceSurfaceState,
    /// Statistics of the last presented frame.
    pub last_stats: Option<FrameStats>,
}

/// Per-frame drawing context passed to [`App::redraw`](super::App::redraw).
pub struct RenderCtx<'a> {
    pub time: FrameTime,
    pub surface_size: SurfaceSize,
    pub assets: &'a TextureCache,
    draw_list: &'a mut DrawList,
    clear_color: Color,
}

impl<'a> RenderCtx<'a> {
    pub(crate) fn new(
        time: FrameTime,
        surface_size: SurfaceSize,
        assets: &'a TextureCache,
        draw_list: &'a mut DrawList,
        clear_color: Color,
    ) -> Self {
        Self {
            time,
            surface_size,
            assets,
            draw_list,
            clear_color,
        }
    }

    /// Enqueues a drawable. Submission order breaks paint-order ties.
    #[inline]
    pub fn draw(&mut self, drawable: Drawable) {
        self.draw_list.push(drawable);
    }

    pub fn draw_all(&mut self, drawables: impl IntoIterator<Item = Drawable>) {
        self.draw_list.extend(drawables);
    }

    /// Number of drawables enqueued so far this frame.
    #[inline]
    pub fn queued(&self) -> usize {
        self.draw_list.len()
    }

    /// Overrides the clear color from this frame on.
    #[inline]
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    #[inline]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }
}
