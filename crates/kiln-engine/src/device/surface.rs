use std::fmt;
use std::sync::Arc;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

/// Anything a GPU surface can be created from.
///
/// Implemented for every thread-safe window handle provider, including
/// `winit::window::Window`.
pub trait SurfaceSource: HasWindowHandle + HasDisplayHandle + Send + Sync {}

impl<T> SurfaceSource for T where T: HasWindowHandle + HasDisplayHandle + Send + Sync + ?Sized {}

/// Where frames are presented.
#[derive(Clone)]
pub enum SurfaceTarget {
    /// A platform window. The backend keeps the `Arc`, so the window outlives the surface.
    Window(Arc<dyn SurfaceSource>),
    /// No presentable surface (tests, offline runs).
    Headless,
}

impl fmt::Debug for SurfaceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceTarget::Window(_) => f.write_str("SurfaceTarget::Window(..)"),
            SurfaceTarget::Headless => f.write_str("SurfaceTarget::Headless"),
        }
    }
}

/// Drawable size in physical pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Minimized windows report a zero-area size.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for SurfaceSize {
    #[inline]
    fn from(s: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(s.width, s.height)
    }
}

impl fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if caps.formats.contains(&f) {
                return Some(f);
            }
        }
    }

    Some(caps.formats[0])
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

pub(crate) fn choose_present_mode(
    caps: &wgpu::SurfaceCapabilities,
    vsync: bool,
) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate]
        .into_iter()
        .find(|m| caps.present_modes.contains(m))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(
        formats: Vec<wgpu::TextureFormat>,
        present_modes: Vec<wgpu::PresentMode>,
    ) -> wgpu::SurfaceCapabilities {
        let mut caps = wgpu::SurfaceCapabilities::default();
        caps.formats = formats;
        caps.present_modes = present_modes;
        caps.alpha_modes = vec![wgpu::CompositeAlphaMode::Opaque];
        caps
    }

    #[test]
    fn srgb_format_is_preferred() {
        let c = caps(
            vec![wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Rgba8UnormSrgb],
            vec![],
        );
        assert_eq!(choose_surface_format(&c, true), Some(wgpu::TextureFormat::Rgba8UnormSrgb));
        assert_eq!(choose_surface_format(&c, false), Some(wgpu::TextureFormat::Bgra8Unorm));
        assert_eq!(choose_surface_format(&caps(vec![], vec![]), true), None);
    }

    #[test]
    fn present_mode_falls_back_to_fifo() {
        let c = caps(vec![], vec![wgpu::PresentMode::Fifo, wgpu::PresentMode::Immediate]);
        assert_eq!(choose_present_mode(&c, true), wgpu::PresentMode::Fifo);
        assert_eq!(choose_present_mode(&c, false), wgpu::PresentMode::Immediate);
        let fifo_only = caps(vec![], vec![wgpu::PresentMode::Fifo]);
        assert_eq!(choose_present_mode(&fifo_only, false), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn unsupported_alpha_mode_is_replaced() {
        let c = caps(vec![], vec![]);
        assert_eq!(
            choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
    }

    #[test]
    fn zero_area_sizes() {
        assert!(SurfaceSize::new(0, 600).is_zero());
        assert!(!SurfaceSize::new(1, 1).is_zero());
    }
}
