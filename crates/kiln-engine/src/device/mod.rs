//! GPU device + surface management.
//!
//! This module is responsible for:
//! - the device/surface state machine (`DeviceSurfaceManager`)
//! - the backend seam (`GpuBackend`) and surface targets
//! - queuing platform lifecycle notifications until the frame boundary

mod backend;
mod init;
pub mod lifecycle;
mod manager;
mod state;
mod surface;

pub use backend::GpuBackend;
pub use init::GpuInit;
pub use lifecycle::{LifecycleEvent, LifecycleSender};
pub use manager::DeviceSurfaceManager;
pub use state::DeviceSurfaceState;
pub use surface::{SurfaceSize, SurfaceSource, SurfaceTarget};

pub(crate) use surface::{choose_alpha_mode, choose_present_mode, choose_surface_format};
