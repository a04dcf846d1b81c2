use super::ctx::{FrameCtx, RenderCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`Engine`](super::Engine).
///
/// Per frame, `update` runs once with freshly latched input, then `redraw`
/// fills the draw list.
pub trait App {
    /// Game logic. Input "just pressed" state is visible here for exactly one frame.
    fn update(&mut self, ctx: &FrameCtx<'_>) -> AppControl {
        let _ = ctx;
        AppControl::Continue
    }

    /// Enqueues this frame's drawables.
    fn redraw(&mut self, ctx: &mut RenderCtx<'_>);
}
