/// Device and surface options for [`WgpuBackend`](crate::render::WgpuBackend).
///
/// Unsupported preferences fall back to what the surface offers; only
/// `required_features` and `required_limits` can make device creation fail.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB swap-chain format when the surface has one.
    pub prefer_srgb: bool,

    /// Synchronize presentation with the display refresh.
    ///
    /// `true` selects FIFO. `false` prefers Mailbox, then Immediate, and falls
    /// back to FIFO, which every surface supports.
    pub vsync: bool,

    /// Composite alpha mode; `None` or an unsupported mode picks the first supported one.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Features the device must expose. Empty by default.
    pub required_features: wgpu::Features,

    pub required_limits: wgpu::Limits,

    /// Frames the CPU may queue ahead of the display. A hint.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            vsync: true,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
