//! `GpuBackend` implementations.

mod headless;
mod wgpu;

pub use headless::HeadlessBackend;
pub use self::wgpu::WgpuBackend;
