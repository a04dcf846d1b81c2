use core::fmt;

/// Lifecycle state of the GPU device and its surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum DeviceSurfaceState {
    /// No backend resources exist.
    #[default]
    Uninitialized,
    /// Device and swap chain are usable.
    Ready,
    /// The device was invalidated; resources are destroyed until re-initialized.
    Lost,
    /// Swap resources are being rebuilt, or parked on a zero-area surface.
    Recreating,
}

impl DeviceSurfaceState {
    #[inline]
    pub fn is_ready(self) -> bool {
        self == DeviceSurfaceState::Ready
    }
}

impl fmt::Display for DeviceSurfaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceSurfaceState::Uninitialized => "uninitialized",
            DeviceSurfaceState::Ready => "ready",
            DeviceSurfaceState::Lost => "lost",
            DeviceSurfaceState::Recreating => "recreating",
        };
        f.write_str(s)
    }
}
