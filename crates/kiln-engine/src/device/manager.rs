use crate::paint::Color;
use crate::render::{Batch, RenderError};

use super::lifecycle::{self, LifecycleQueue, LifecycleSender, PendingLifecycle};
use super::{DeviceSurfaceState, GpuBackend, SurfaceSize, SurfaceTarget};

/// Owns the device/surface state machine around a [`GpuBackend`].
///
/// Transitions:
/// - `Uninitialized → Ready` on `initialize`
/// - `Ready → Recreating → Ready` on `resize`; a zero-area size parks in `Recreating`
/// - `Ready → Lost` on device loss; backend resources are destroyed
/// - `Lost → Ready` on `initialize`, once the surface has a non-zero size
/// - `shutdown` is terminal
pub struct DeviceSurfaceManager<B> {
    backend: B,
    state: DeviceSurfaceState,

    target: Option<SurfaceTarget>,
    /// Size of the live swap chain, or the size to create at next.
    size: SurfaceSize,
    recreations: u64,
    /// The platform surface last reported zero area.
    parked: bool,
    shut_down: bool,

    lifecycle_tx: LifecycleSender,
    lifecycle_rx: LifecycleQueue,
}

impl<B: GpuBackend> DeviceSurfaceManager<B> {
    pub fn new(backend: B) -> Self {
        let (lifecycle_tx, lifecycle_rx) = lifecycle::channel();
        Self {
            backend,
            state: DeviceSurfaceState::Uninitialized,
            target: None,
            size: SurfaceSize::default(),
            recreations: 0,
            parked: false,
            shut_down: false,
            lifecycle_tx,
            lifecycle_rx,
        }
    }

    #[inline]
    pub fn state(&self) -> DeviceSurfaceState {
        self.state
    }

    #[inline]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Number of successful swap-chain rebuilds since creation.
    #[inline]
    pub fn recreations(&self) -> u64 {
        self.recreations
    }

    /// True while the surface has zero area. Re-creation after a loss waits
    /// for a non-zero resize.
    #[inline]
    pub fn awaiting_surface(&self) -> bool {
        self.parked
    }

    #[inline]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Handle for platform callbacks to report resizes and device loss.
    #[inline]
    pub fn lifecycle_sender(&self) -> LifecycleSender {
        self.lifecycle_tx.clone()
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn initialize(&mut self, target: SurfaceTarget, size: SurfaceSize) -> Result<(), RenderError> {
        if self.shut_down {
            return Err(RenderError::InitFailed("device manager has been shut down".into()));
        }

        match self.state {
            DeviceSurfaceState::Ready => {
                log::debug!("{}: initialize while ready; ignored", self.backend.name());
                Ok(())
            }
            DeviceSurfaceState::Recreating => self.resize(size),
            DeviceSurfaceState::Uninitialized | DeviceSurfaceState::Lost => {
                self.create(target, size)
            }
        }
    }

    /// Re-creates the device on the last target after a loss.
    pub fn reinitialize(&mut self) -> Result<(), RenderError> {
        if self.parked {
            return Err(RenderError::DeviceNotReady);
        }
        let target = self
            .target
            .clone()
            .ok_or_else(|| RenderError::InitFailed("no surface target to re-initialize".into()))?;
        self.initialize(target, self.size)
    }

    fn create(&mut self, target: SurfaceTarget, size: SurfaceSize) -> Result<(), RenderError> {
        if size.is_zero() {
            return Err(RenderError::InitFailed(format!("surface size {size} has zero area")));
        }

        match self.backend.create(&target, size, &self.lifecycle_tx) {
            Ok(()) => {
                log::info!("{}: device ready at {size} (was {})", self.backend.name(), self.state);
                self.state = DeviceSurfaceState::Ready;
                self.target = Some(target);
                self.size = size;
                self.parked = false;
                Ok(())
            }
            Err(e) => {
                log::error!("{}: initialization failed: {e}", self.backend.name());
                // Keep the target so a later `reinitialize` can retry.
                self.target = Some(target);
                self.size = size;
                Err(match e {
                    RenderError::InitFailed(_) => e,
                    other => RenderError::InitFailed(other.to_string()),
                })
            }
        }
    }

    pub fn resize(&mut self, size: SurfaceSize) -> Result<(), RenderError> {
        self.parked = size.is_zero();
        match self.state {
            DeviceSurfaceState::Uninitialized | DeviceSurfaceState::Lost => {
                // Applied at the next initialize.
                if !size.is_zero() {
                    self.size = size;
                }
                Ok(())
            }
            DeviceSurfaceState::Ready | DeviceSurfaceState::Recreating if size.is_zero() => {
                if self.state.is_ready() {
                    log::debug!("{}: zero-area surface; parking", self.backend.name());
                }
                self.state = DeviceSurfaceState::Recreating;
                Ok(())
            }
            // The swap chain at `self.size` was never torn down while parked.
            _ if size == self.size => {
                self.state = DeviceSurfaceState::Ready;
                Ok(())
            }
            DeviceSurfaceState::Ready | DeviceSurfaceState::Recreating => self.recreate(size),
        }
    }

    fn recreate(&mut self, size: SurfaceSize) -> Result<(), RenderError> {
        let prior = self.size;
        self.state = DeviceSurfaceState::Recreating;

        let err = match self.backend.recreate_swapchain(size) {
            Ok(()) => {
                self.recreations += 1;
                self.size = size;
                self.state = DeviceSurfaceState::Ready;
                log::debug!("{}: swap chain recreated at {size}", self.backend.name());
                return Ok(());
            }
            Err(RenderError::DeviceLost) => {
                self.enter_lost();
                return Err(RenderError::DeviceLost);
            }
            Err(e) => e,
        };

        log::warn!("{}: recreate at {size} failed: {err}", self.backend.name());
        let surface_err = match err {
            RenderError::SurfaceError(_) => err,
            other => RenderError::SurfaceError(other.to_string()),
        };

        if !prior.is_zero() && self.backend.recreate_swapchain(prior).is_ok() {
            self.recreations += 1;
            self.state = DeviceSurfaceState::Ready;
            log::info!("{}: restored swap chain at {prior}", self.backend.name());
        } else {
            log::error!("{}: could not restore swap chain; destroying", self.backend.name());
            self.backend.destroy();
            self.state = DeviceSurfaceState::Uninitialized;
        }
        Err(surface_err)
    }

    /// Applies queued platform notifications. Called at the frame boundary only.
    pub fn apply_lifecycle(&mut self) -> Result<(), RenderError> {
        let PendingLifecycle {
            resize,
            device_lost,
        } = self.lifecycle_rx.drain();

        if device_lost {
            if let Some(size) = resize {
                self.parked = size.is_zero();
                if !self.parked {
                    self.size = size;
                }
            }
            self.enter_lost();
            return Ok(());
        }
        match resize {
            Some(size) => self.resize(size),
            None => Ok(()),
        }
    }

    fn enter_lost(&mut self) {
        if matches!(
            self.state,
            DeviceSurfaceState::Ready | DeviceSurfaceState::Recreating
        ) {
            log::warn!("{}: device lost; releasing resources", self.backend.name());
            self.backend.destroy();
            self.state = DeviceSurfaceState::Lost;
        }
    }

    /// Fails unless frames can be submitted right now.
    pub fn ensure_ready(&self) -> Result<(), RenderError> {
        match self.state {
            DeviceSurfaceState::Ready => Ok(()),
            // Nothing to draw into until the surface has area again.
            DeviceSurfaceState::Lost if self.parked => Err(RenderError::DeviceNotReady),
            DeviceSurfaceState::Lost => Err(RenderError::DeviceLost),
            DeviceSurfaceState::Uninitialized | DeviceSurfaceState::Recreating => {
                Err(RenderError::DeviceNotReady)
            }
        }
    }

    pub fn draw(&mut self, batches: &[Batch], clear: Color) -> Result<u32, RenderError> {
        self.ensure_ready()?;
        self.backend.draw(batches, clear).inspect_err(|e| self.on_frame_error(e))
    }

    pub fn present(&mut self) -> Result<(), RenderError> {
        self.ensure_ready()?;
        self.backend.present().inspect_err(|e| self.on_frame_error(e))
    }

    fn on_frame_error(&mut self, err: &RenderError) {
        if *err == RenderError::DeviceLost {
            self.enter_lost();
        }
    }

    /// Destroys backend resources. The manager cannot be initialized again.
    pub fn shutdown(&mut self) {
        if self.state != DeviceSurfaceState::Uninitialized {
            self.backend.destroy();
        }
        self.state = DeviceSurfaceState::Uninitialized;
        self.target = None;
        self.shut_down = true;
        log::info!("{}: shut down", self.backend.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBackend;

    fn ready(size: SurfaceSize) -> DeviceSurfaceManager<HeadlessBackend> {
        let mut m = DeviceSurfaceManager::new(HeadlessBackend::new());
        m.initialize(SurfaceTarget::Headless, size).unwrap();
        m
    }

    const SIZE: SurfaceSize = SurfaceSize::new(800, 600);

    // ── initialize ──

    #[test]
    fn failed_init_stays_uninitialized() {
        let mut m = DeviceSurfaceManager::new(HeadlessBackend::new());
        m.backend_mut().fail_next_create();
        let err = m.initialize(SurfaceTarget::Headless, SIZE).unwrap_err();
        assert!(matches!(err, RenderError::InitFailed(_)));
        assert_eq!(m.state(), DeviceSurfaceState::Uninitialized);

        m.reinitialize().unwrap();
        assert_eq!(m.state(), DeviceSurfaceState::Ready);
    }

    #[test]
    fn zero_sized_init_is_rejected() {
        let mut m = DeviceSurfaceManager::new(HeadlessBackend::new());
        let err = m.initialize(SurfaceTarget::Headless, SurfaceSize::new(0, 10));
        assert!(matches!(err, Err(RenderError::InitFailed(_))));
        assert_eq!(m.backend().creates(), 0);
    }

    #[test]
    fn initialize_when_ready_is_a_no_op() {
        let mut m = ready(SIZE);
        m.initialize(SurfaceTarget::Headless, SIZE).unwrap();
        assert_eq!(m.backend().creates(), 1);
    }

    #[test]
    fn shutdown_is_terminal() {
        let mut m = ready(SIZE);
        m.shutdown();
        assert_eq!(m.state(), DeviceSurfaceState::Uninitialized);
        assert!(!m.backend().is_alive());
        let err = m.initialize(SurfaceTarget::Headless, SIZE).unwrap_err();
        assert!(matches!(err, RenderError::InitFailed(_)));
    }

    // ── resize ──

    #[test]
    fn same_size_resize_does_not_recreate() {
        let mut m = ready(SIZE);
        m.resize(SurfaceSize::new(1024, 768)).unwrap();
        m.resize(SurfaceSize::new(1024, 768)).unwrap();
        assert_eq!(m.recreations(), 1);
        assert_eq!(m.state(), DeviceSurfaceState::Ready);
    }

    #[test]
    fn zero_area_parks_until_nonzero() {
        let mut m = ready(SIZE);
        m.resize(SurfaceSize::new(0, 0)).unwrap();
        assert_eq!(m.state(), DeviceSurfaceState::Recreating);
        assert_eq!(m.ensure_ready(), Err(RenderError::DeviceNotReady));

        m.resize(SurfaceSize::new(320, 200)).unwrap();
        assert_eq!(m.state(), DeviceSurfaceState::Ready);
        assert_eq!(m.size(), SurfaceSize::new(320, 200));
    }

    #[test]
    fn loss_while_parked_waits_for_nonzero_size() {
        let mut m = ready(SIZE);
        let tx = m.lifecycle_sender();
        tx.resized(SurfaceSize::new(0, 0));
        m.apply_lifecycle().unwrap();
        tx.device_lost();
        m.apply_lifecycle().unwrap();

        assert_eq!(m.state(), DeviceSurfaceState::Lost);
        assert!(m.awaiting_surface());
        assert_eq!(m.ensure_ready(), Err(RenderError::DeviceNotReady));
        assert_eq!(m.reinitialize(), Err(RenderError::DeviceNotReady));
        assert_eq!(m.backend().creates(), 1);

        tx.resized(SurfaceSize::new(640, 480));
        m.apply_lifecycle().unwrap();
        assert!(!m.awaiting_surface());
        m.reinitialize().unwrap();
        assert_eq!(m.state(), DeviceSurfaceState::Ready);
        assert_eq!(m.size(), SurfaceSize::new(640, 480));
        assert_eq!(m.backend().creates(), 2);
    }

    #[test]
    fn zero_resize_queued_with_loss_parks() {
        let mut m = ready(SIZE);
        let tx = m.lifecycle_sender();
        tx.resized(SurfaceSize::new(0, 0));
        tx.device_lost();
        m.apply_lifecycle().unwrap();

        assert_eq!(m.state(), DeviceSurfaceState::Lost);
        assert!(m.awaiting_surface());
        assert_eq!(m.size(), SIZE);
    }

    #[test]
    fn restore_to_prior_size_after_park_skips_recreate() {
        let mut m = ready(SIZE);
        m.resize(SurfaceSize::new(0, 0)).unwrap();
        m.resize(SIZE).unwrap();
        assert_eq!(m.state(), DeviceSurfaceState::Ready);
        assert_eq!(m.recreations(), 0);
    }

    #[test]
    fn failed_resize_falls_back_to_prior_size() {
        let mut m = ready(SIZE);
        m.backend_mut().fail_recreates(1);
        let err = m.resize(SurfaceSize::new(10, 10)).unwrap_err();
        assert!(matches!(err, RenderError::SurfaceError(_)));
        assert_eq!(m.state(), DeviceSurfaceState::Ready);
        assert_eq!(m.size(), SIZE);
    }

    #[test]
    fn failed_fallback_destroys_resources() {
        let mut m = ready(SIZE);
        m.backend_mut().fail_recreates(2);
        assert!(m.resize(SurfaceSize::new(10, 10)).is_err());
        assert_eq!(m.state(), DeviceSurfaceState::Uninitialized);
        assert_eq!(m.backend().destroys(), 1);
    }

    // ── lifecycle ──

    #[test]
    fn queued_resizes_apply_at_boundary() {
        let mut m = ready(SIZE);
        let tx = m.lifecycle_sender();
        tx.resized(SurfaceSize::new(100, 100));
        tx.resized(SurfaceSize::new(200, 150));
        assert_eq!(m.size(), SIZE);

        m.apply_lifecycle().unwrap();
        assert_eq!(m.size(), SurfaceSize::new(200, 150));
        assert_eq!(m.recreations(), 1);
    }

    #[test]
    fn queued_loss_destroys_and_recovers() {
        let mut m = ready(SIZE);
        m.backend().report_device_lost();
        m.apply_lifecycle().unwrap();
        assert_eq!(m.state(), DeviceSurfaceState::Lost);
        assert!(!m.backend().is_alive());
        assert_eq!(m.ensure_ready(), Err(RenderError::DeviceLost));

        m.reinitialize().unwrap();
        assert_eq!(m.state(), DeviceSurfaceState::Ready);
        assert_eq!(m.backend().creates(), 2);
    }

    #[test]
    fn present_loss_enters_lost() {
        let mut m = ready(SIZE);
        m.draw(&[], Color::BLACK).unwrap();
        m.backend_mut().lose_device_on_next_present();
        assert_eq!(m.present(), Err(RenderError::DeviceLost));
        assert_eq!(m.state(), DeviceSurfaceState::Lost);
    }
}
