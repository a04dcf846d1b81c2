use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::assets::{TextureCache, TextureLoader};
use crate::device::{DeviceSurfaceState, LifecycleSender, SurfaceSize, SurfaceTarget};
use crate::input::{InputEvent, InputLatch};
use crate::paint::Color;
use crate::render::{Batch, BatchAssembler, ErrorClass, FrameHandle, FrameStats, RenderError, Renderer};
use crate::scene::DrawList;
use crate::time::{FrameClock, FrameLimiter};

use super::app::{App, AppControl};
use super::config::EngineConfig;
use super::ctx::{FrameCtx, RenderCtx};

/// Consecutive failed re-initializations tolerated before giving up.
pub const MAX_RECOVERY_ATTEMPTS: u32 = 3;

/// What one call to [`Engine::run_frame`] produced.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameOutcome {
    pub control: AppControl,
    /// `None` when the frame was skipped.
    pub presented: Option<FrameStats>,
}

/// Single-window frame loop.
///
/// Owns the renderer, the clocks, the input latch and the texture cache, and
/// sequences one frame per [`run_frame`](Self::run_frame) call:
///
/// 1. apply queued lifecycle events, re-initialize after device loss
/// 2. tick the clock
/// 3. decay, then latch input
/// 4. `App::update`
/// 5. `begin_frame`, `App::redraw`, batch assembly
/// 6. submit (skipped when there are no batches), present
/// 7. sleep out the frame when a target rate is set
pub struct Engine<R> {
    renderer: R,
    target: Option<SurfaceTarget>,

    clock: FrameClock,
    limiter: FrameLimiter,
    input: InputLatch,
    assets: Arc<TextureCache>,
    assembler: BatchAssembler,
    draw_list: DrawList,

    clear_color: Color,
    failed_recoveries: u32,
    shut_down: bool,
}

impl<R: Renderer> Engine<R> {
    pub fn new(mut renderer: R, config: EngineConfig) -> Result<Self> {
        config.validate().context("invalid engine configuration")?;

        renderer.set_clear_color(config.clear_color);

        Ok(Self {
            renderer,
            target: None,
            clock: FrameClock::with_clamps(config.frame.dt_min, config.frame.dt_max),
            limiter: FrameLimiter::from_fps(config.frame.target_fps),
            input: InputLatch::new(),
            assets: Arc::new(TextureCache::new(config.assets.memory_limit)),
            assembler: BatchAssembler::new(config.batching.max_batch_vertices),
            draw_list: DrawList::new(),
            clear_color: config.clear_color,
            failed_recoveries: 0,
            shut_down: false,
        })
    }

    /// Creates the device on `target`. The target is kept for re-initialization
    /// after device loss.
    pub fn initialize(&mut self, target: SurfaceTarget, size: SurfaceSize) -> Result<(), RenderError> {
        self.target = Some(target.clone());
        let res = self.renderer.initialize(target, size);
        if res.is_ok() {
            self.clock.reset();
        }
        res
    }

    // ── accessors ──

    #[inline]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[inline]
    pub fn assets(&self) -> &Arc<TextureCache> {
        &self.assets
    }

    #[inline]
    pub fn input(&self) -> &InputLatch {
        &self.input
    }

    #[inline]
    pub fn state(&self) -> DeviceSurfaceState {
        self.renderer.state()
    }

    #[inline]
    pub fn limiter(&self) -> FrameLimiter {
        self.limiter
    }

    #[inline]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Handle for resize and device-loss notifications from platform callbacks.
    pub fn lifecycle_sender(&self) -> LifecycleSender {
        self.renderer.lifecycle_sender()
    }

    /// Starts a background decoder inserting into this engine's cache.
    pub fn spawn_loader(&self) -> Result<TextureLoader> {
        TextureLoader::spawn(Arc::clone(&self.assets))
    }

    /// Folds a platform input event into the latch. It becomes visible to the
    /// next frame's update.
    #[inline]
    pub fn handle_input(&mut self, event: InputEvent) {
        self.input.apply_event(event);
    }

    // ── frame loop ──

    /// Runs one frame. Transient failures skip the frame; only unrecoverable
    /// ones are returned.
    pub fn run_frame<A: App + ?Sized>(&mut self, app: &mut A) -> Result<FrameOutcome, RenderError> {
        if self.shut_down {
            return Ok(FrameOutcome {
                control: AppControl::Exit,
                presented: None,
            });
        }

        let frame_start = Instant::now();

        if let Err(e) = self.renderer.apply_lifecycle() {
            self.on_frame_error(e)?;
        }
        self.recover()?;

        let time = self.clock.tick();

        self.input.decay();
        self.input.latch();

        let control = {
            let ctx = FrameCtx {
                time,
                input: &self.input,
                assets: &self.assets,
                surface_size: self.renderer.surface_size(),
                device_state: self.renderer.state(),
                last_stats: self.renderer.last_stats(),
            };
            app.update(&ctx)
        };

        let frame = self.renderer.begin_frame();

        self.draw_list.clear();
        let clear_color = {
            let mut ctx = RenderCtx::new(
                time,
                self.renderer.surface_size(),
                &self.assets,
                &mut self.draw_list,
                self.clear_color,
            );
            app.redraw(&mut ctx);
            ctx.clear_color()
        };
        if clear_color != self.clear_color {
            self.clear_color = clear_color;
            self.renderer.set_clear_color(clear_color);
        }

        let batches = self.assembler.assemble(&mut self.draw_list, self.assets.as_ref());

        let presented = match self.submit_and_present(frame, &batches) {
            Ok(stats) => Some(stats),
            Err(e) => {
                self.on_frame_error(e)?;
                None
            }
        };
        drop(batches);

        self.limiter.wait(frame_start);

        Ok(FrameOutcome { control, presented })
    }

    fn submit_and_present(&mut self, mut frame: FrameHandle, batches: &[Batch]) -> Result<FrameStats, RenderError> {
        if !batches.is_empty() {
            self.renderer.submit(&mut frame, batches)?;
        }
        self.renderer.present(frame)
    }

    /// Re-creates the device after loss, or after a failed swap-chain rebuild
    /// left the renderer uninitialized.
    fn recover(&mut self) -> Result<(), RenderError> {
        let state = self.renderer.state();
        if !matches!(state, DeviceSurfaceState::Lost | DeviceSurfaceState::Uninitialized) {
            return Ok(());
        }
        let Some(target) = self.target.clone() else {
            return Ok(());
        };
        if self.renderer.awaiting_surface() {
            log::trace!("recovery deferred until the surface has a non-zero size");
            return Ok(());
        }

        let size = self.renderer.surface_size();
        match self.renderer.initialize(target, size) {
            Ok(()) => {
                log::info!("renderer recovered from {state} at {size}");
                self.failed_recoveries = 0;
                self.clock.reset();
                Ok(())
            }
            Err(e) => {
                self.failed_recoveries += 1;
                if self.failed_recoveries >= MAX_RECOVERY_ATTEMPTS {
                    log::error!("giving up after {} failed re-initializations: {e}", self.failed_recoveries);
                    return Err(e);
                }
                log::warn!(
                    "re-initialization failed ({}/{MAX_RECOVERY_ATTEMPTS}): {e}",
                    self.failed_recoveries
                );
                Ok(())
            }
        }
    }

    fn on_frame_error(&mut self, err: RenderError) -> Result<(), RenderError> {
        match err.class() {
            ErrorClass::Unrecoverable => {
                log::error!("frame failed: {err}");
                Err(err)
            }
            ErrorClass::Transient => {
                log::warn!("frame skipped: {err}");
                Ok(())
            }
            ErrorClass::Degraded => {
                log::debug!("frame skipped: {err}");
                Ok(())
            }
        }
    }

    /// Releases the device. Later frames return [`AppControl::Exit`] without
    /// running callbacks.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.target = None;
        self.draw_list.clear();
        self.renderer.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::coords::Vec2;
    use crate::input::{ButtonState, Key};
    use crate::render::{HeadlessBackend, SurfaceRenderer};
    use crate::scene::{Drawable, Shape};

    const SIZE: SurfaceSize = SurfaceSize::new(320, 240);

    type TestEngine = Engine<SurfaceRenderer<HeadlessBackend>>;

    fn engine() -> TestEngine {
        let mut e = Engine::new(SurfaceRenderer::new(HeadlessBackend::new()), EngineConfig::default()).unwrap();
        e.initialize(SurfaceTarget::Headless, SIZE).unwrap();
        e
    }

    /// Records what each callback observed.
    #[derive(Default)]
    struct Scripted {
        rects: usize,
        updates: u32,
        redraws: u32,
        space_seen: Vec<bool>,
        exit_after: Option<u32>,
    }

    impl App for Scripted {
        fn update(&mut self, ctx: &FrameCtx<'_>) -> AppControl {
            self.updates += 1;
            self.space_seen.push(ctx.input.just_pressed(Key::Space));
            match self.exit_after {
                Some(n) if self.updates >= n => AppControl::Exit,
                _ => AppControl::Continue,
            }
        }

        fn redraw(&mut self, ctx: &mut RenderCtx<'_>) {
            self.redraws += 1;
            for i in 0..self.rects {
                ctx.draw(Drawable::shape(
                    Shape::Rect { size: Vec2::splat(8.0) },
                    Vec2::new(i as f32 * 10.0, 0.0),
                    Color::WHITE,
                ));
            }
        }
    }

    // ── ordering ──

    #[test]
    fn empty_frame_skips_submit_but_presents() {
        let mut e = engine();
        let out = e.run_frame(&mut Scripted::default()).unwrap();
        let stats = out.presented.unwrap();
        assert_eq!(stats.batches, 0);
        assert_eq!(e.renderer().backend().presents(), 1);
    }

    #[test]
    fn shapes_merge_into_one_batch() {
        let mut e = engine();
        let mut app = Scripted {
            rects: 3,
            ..Scripted::default()
        };
        let stats = e.run_frame(&mut app).unwrap().presented.unwrap();
        assert_eq!(stats.batches, 1);
        assert_eq!(stats.vertices, 12);
        assert_eq!((app.updates, app.redraws), (1, 1));
    }

    #[test]
    fn input_is_latched_before_update_for_one_frame() {
        let mut e = engine();
        let mut app = Scripted::default();

        e.handle_input(InputEvent::Key {
            key: Key::Space,
            state: ButtonState::Pressed,
            repeat: false,
        });
        e.run_frame(&mut app).unwrap();
        e.run_frame(&mut app).unwrap();

        assert_eq!(app.space_seen, vec![true, false]);
        assert!(e.input().is_held(Key::Space));
    }

    #[test]
    fn exit_is_reported_after_present() {
        let mut e = engine();
        let mut app = Scripted {
            exit_after: Some(1),
            ..Scripted::default()
        };
        let out = e.run_frame(&mut app).unwrap();
        assert_eq!(out.control, AppControl::Exit);
        assert!(out.presented.is_some());
    }

    // ── lifecycle ──

    #[test]
    fn device_loss_recovers_at_next_frame() {
        let mut e = engine();
        let mut app = Scripted {
            rects: 1,
            ..Scripted::default()
        };

        e.renderer().backend().report_device_lost();
        let out = e.run_frame(&mut app).unwrap();

        // Loss is applied and recovered within the same frame boundary.
        assert!(out.presented.is_some());
        assert_eq!(e.state(), DeviceSurfaceState::Ready);
        assert_eq!(e.renderer().backend().creates(), 2);
        assert_eq!(e.renderer().backend().destroys(), 1);
    }

    #[test]
    fn queued_resizes_coalesce() {
        let mut e = engine();
        let tx = e.lifecycle_sender();
        tx.resized(SurfaceSize::new(100, 100));
        tx.resized(SurfaceSize::new(200, 100));
        e.run_frame(&mut Scripted::default()).unwrap();

        assert_eq!(e.renderer().surface_size(), SurfaceSize::new(200, 100));
        assert_eq!(e.renderer().backend().recreations(), 1);
    }

    #[test]
    fn minimized_surface_skips_frames() {
        let mut e = engine();
        e.lifecycle_sender().resized(SurfaceSize::new(0, 0));
        let out = e.run_frame(&mut Scripted::default()).unwrap();
        assert_eq!(out.presented, None);
        assert_eq!(e.state(), DeviceSurfaceState::Recreating);

        e.lifecycle_sender().resized(SIZE);
        let out = e.run_frame(&mut Scripted::default()).unwrap();
        assert!(out.presented.is_some());
    }

    #[test]
    fn loss_while_minimized_recovers_only_after_restore() {
        let mut e = engine();
        let mut app = Scripted::default();
        e.lifecycle_sender().resized(SurfaceSize::new(0, 0));
        e.run_frame(&mut app).unwrap();
        e.renderer().backend().report_device_lost();

        for _ in 0..MAX_RECOVERY_ATTEMPTS + 1 {
            let out = e.run_frame(&mut app).unwrap();
            assert_eq!(out.presented, None);
        }
        assert_eq!(e.state(), DeviceSurfaceState::Lost);
        assert_eq!(e.renderer().backend().creates(), 1);

        let restored = SurfaceSize::new(640, 360);
        e.lifecycle_sender().resized(restored);
        let out = e.run_frame(&mut app).unwrap();
        assert!(out.presented.is_some());
        assert_eq!(e.renderer().surface_size(), restored);
        assert_eq!(e.renderer().backend().creates(), 2);
    }

    #[test]
    fn repeated_recovery_failure_is_fatal() {
        let mut e = engine();
        e.renderer().backend().report_device_lost();
        e.renderer_mut().backend_mut().fail_next_create();
        let mut app = Scripted::default();

        // First failure is tolerated; the frame is skipped.
        let out = e.run_frame(&mut app).unwrap();
        assert_eq!(out.presented, None);
        assert_eq!(e.state(), DeviceSurfaceState::Lost);

        let mut last = Ok(());
        for _ in 1..MAX_RECOVERY_ATTEMPTS {
            e.renderer_mut().backend_mut().fail_next_create();
            last = e.run_frame(&mut app).map(|_| ());
        }
        assert!(matches!(last, Err(RenderError::InitFailed(_))));
    }

    #[test]
    fn shutdown_stops_the_loop() {
        let mut e = engine();
        e.shutdown();
        let mut app = Scripted::default();
        let out = e.run_frame(&mut app).unwrap();
        assert_eq!(out.control, AppControl::Exit);
        assert_eq!(app.updates, 0);
        assert!(e.initialize(SurfaceTarget::Headless, SIZE).is_err());
    }

    // ── config ──

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.batching.max_batch_vertices = 0;
        assert!(Engine::new(SurfaceRenderer::new(HeadlessBackend::new()), cfg).is_err());
    }

    #[test]
    fn limiter_holds_target_rate() {
        let mut cfg = EngineConfig::default();
        cfg.frame.target_fps = Some(100);
        let mut e = Engine::new(SurfaceRenderer::new(HeadlessBackend::new()), cfg).unwrap();
        e.initialize(SurfaceTarget::Headless, SIZE).unwrap();

        let t0 = Instant::now();
        e.run_frame(&mut Scripted::default()).unwrap();
        assert!(t0.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn redraw_can_change_clear_color() {
        struct Tint;
        impl App for Tint {
            fn redraw(&mut self, ctx: &mut RenderCtx<'_>) {
                ctx.set_clear_color(Color::WHITE);
            }
        }

        let mut e = engine();
        e.run_frame(&mut Tint).unwrap();
        assert_eq!(e.renderer().backend().last_clear(), Color::WHITE);
        assert_eq!(e.renderer().clear_color(), Color::WHITE);
    }
}
