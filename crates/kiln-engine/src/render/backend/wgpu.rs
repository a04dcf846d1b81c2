use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use bytemuck::{Pod, Zeroable};

use crate::assets::{AssetId, TextureAsset};
use crate::device::{
    GpuBackend, GpuInit, LifecycleSender, SurfaceSize, SurfaceTarget, choose_alpha_mode,
    choose_present_mode, choose_surface_format,
};
use crate::paint::Color;
use crate::render::geometry::Vertex;
use crate::render::{Batch, RenderError};

const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// wgpu implementation of [`GpuBackend`].
///
/// One pipeline draws every batch: positions in surface pixels, a viewport
/// uniform at group 0 and the batch texture at group 1. Shapes bind a 1x1
/// white texture.
pub struct WgpuBackend {
    init: GpuInit,
    gpu: Option<GpuState>,
}

impl WgpuBackend {
    pub fn new(init: GpuInit) -> Self {
        Self { init, gpu: None }
    }

    /// Returns the active color target format, if a device exists.
    pub fn surface_format(&self) -> Option<wgpu::TextureFormat> {
        self.gpu.as_ref().map(|g| g.format)
    }

    /// Number of textures currently resident on the GPU.
    pub fn resident_textures(&self) -> usize {
        self.gpu.as_ref().map_or(0, |g| g.textures.len())
    }
}

impl GpuBackend for WgpuBackend {
    fn name(&self) -> &'static str {
        "wgpu"
    }

    fn create(
        &mut self,
        target: &SurfaceTarget,
        size: SurfaceSize,
        lifecycle: &LifecycleSender,
    ) -> Result<(), RenderError> {
        self.destroy();
        let gpu = pollster::block_on(GpuState::new(&self.init, target, size, lifecycle))?;
        self.gpu = Some(gpu);
        Ok(())
    }

    fn recreate_swapchain(&mut self, size: SurfaceSize) -> Result<(), RenderError> {
        let gpu = self.gpu.as_mut().ok_or(RenderError::DeviceNotReady)?;
        gpu.check_device()?;
        gpu.resize(size)
    }

    fn destroy(&mut self) {
        if self.gpu.take().is_some() {
            log::debug!("wgpu: device resources released");
        }
    }

    fn draw(&mut self, batches: &[Batch], clear: Color) -> Result<u32, RenderError> {
        let gpu = self.gpu.as_mut().ok_or(RenderError::DeviceNotReady)?;
        gpu.draw(batches, clear)
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let gpu = self.gpu.as_mut().ok_or(RenderError::DeviceNotReady)?;
        gpu.present()
    }
}

// ── device state ──────────────────────────────────────────────────────────

enum PresentTarget {
    Surface {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    Offscreen {
        texture: wgpu::Texture,
    },
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    source: Weak<TextureAsset>,
}

struct GpuState {
    // Dropped first: a surface texture must not outlive its surface.
    acquired: Option<wgpu::SurfaceTexture>,
    offscreen_drawn: bool,

    textures: HashMap<AssetId, GpuTexture>,
    sprite: SpritePipeline,

    vertex_buf: Option<wgpu::Buffer>,
    vertex_capacity: usize,
    index_buf: Option<wgpu::Buffer>,
    index_capacity: usize,

    target: PresentTarget,
    format: wgpu::TextureFormat,
    size: SurfaceSize,
    device_lost: Arc<AtomicBool>,

    device: wgpu::Device,
    queue: wgpu::Queue,
    _instance: wgpu::Instance,
}

impl GpuState {
    async fn new(
        init: &GpuInit,
        target: &SurfaceTarget,
        size: SurfaceSize,
        lifecycle: &LifecycleSender,
    ) -> Result<Self, RenderError> {
        // Use all backends to allow wgpu to select the optimal platform backend.
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = match target {
            SurfaceTarget::Window(source) => Some(
                instance
                    .create_surface(Arc::clone(source))
                    .map_err(|e| RenderError::InitFailed(format!("failed to create surface: {e}")))?,
            ),
            SurfaceTarget::Headless => None,
        };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: surface.as_ref(),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::InitFailed(format!("no suitable GPU adapter: {e}")))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("kiln device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| RenderError::InitFailed(format!("failed to create device: {e}")))?;

        let device_lost = Arc::new(AtomicBool::new(false));
        {
            let flag = Arc::clone(&device_lost);
            let lifecycle = lifecycle.clone();
            device.set_device_lost_callback(move |reason, message| {
                // Our own teardown reports `Destroyed`.
                if matches!(reason, wgpu::DeviceLostReason::Destroyed) {
                    return;
                }
                log::error!("wgpu: device lost ({reason:?}): {message}");
                flag.store(true, Ordering::Release);
                lifecycle.device_lost();
            });
        }

        check_surface_size(size, device.limits().max_texture_dimension_2d)
            .map_err(|e| RenderError::InitFailed(e.to_string()))?;

        let (target, format) = match surface {
            Some(surface) => {
                let caps = surface.get_capabilities(&adapter);
                let format = choose_surface_format(&caps, init.prefer_srgb).ok_or_else(|| {
                    RenderError::InitFailed("no supported surface formats".into())
                })?;
                let config = wgpu::SurfaceConfiguration {
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    format,
                    width: size.width,
                    height: size.height,
                    present_mode: choose_present_mode(&caps, init.vsync),
                    alpha_mode: choose_alpha_mode(&caps, init.alpha_mode),
                    view_formats: vec![],
                    desired_maximum_frame_latency: init.desired_maximum_frame_latency,
                };
                let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
                surface.configure(&device, &config);
                scoped(scope.pop().await, |e| {
                    RenderError::InitFailed(format!("surface configuration failed: {e}"))
                })?;
                (PresentTarget::Surface { surface, config }, format)
            }
            None => (
                PresentTarget::Offscreen {
                    texture: offscreen_texture(&device, size),
                },
                OFFSCREEN_FORMAT,
            ),
        };

        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let sprite = SpritePipeline::new(&device, &queue, format);
        scoped(scope.pop().await, RenderError::PipelineSetup)?;
        let info = adapter.get_info();
        log::info!(
            "wgpu: {} ({:?}), format {format:?}, {size}",
            info.name,
            info.backend
        );

        Ok(Self {
            acquired: None,
            offscreen_drawn: false,
            textures: HashMap::new(),
            sprite,
            vertex_buf: None,
            vertex_capacity: 0,
            index_buf: None,
            index_capacity: 0,
            target,
            format,
            size,
            device_lost,
            device,
            queue,
            _instance: instance,
        })
    }

    fn check_device(&self) -> Result<(), RenderError> {
        if self.device_lost.load(Ordering::Acquire) {
            return Err(RenderError::DeviceLost);
        }
        Ok(())
    }

    /// Reconfigures the color target. On error the caller restores a known
    /// good size; `self.size` is left at the previous value.
    fn resize(&mut self, size: SurfaceSize) -> Result<(), RenderError> {
        check_surface_size(size, self.device.limits().max_texture_dimension_2d)?;
        self.acquired = None;

        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        match &mut self.target {
            PresentTarget::Surface { surface, config } => {
                config.width = size.width;
                config.height = size.height;
                surface.configure(&self.device, config);
            }
            PresentTarget::Offscreen { texture } => {
                *texture = offscreen_texture(&self.device, size);
            }
        }
        scoped(pollster::block_on(scope.pop()), |e| {
            RenderError::SurfaceError(format!("configure at {size} failed: {e}"))
        })?;

        self.size = size;
        Ok(())
    }

    /// Converts a `SurfaceError` into a render error, reconfiguring when the
    /// swap chain is merely out of date.
    fn map_surface_error(&self, err: wgpu::SurfaceError) -> RenderError {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                if let PresentTarget::Surface { surface, config } = &self.target {
                    surface.configure(&self.device, config);
                }
                RenderError::SurfaceError(format!("{err}; surface reconfigured"))
            }
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            wgpu::SurfaceError::Timeout => RenderError::SurfaceError(err.to_string()),
            wgpu::SurfaceError::Other => RenderError::SurfaceError(err.to_string()),
        }
    }

    fn draw(&mut self, batches: &[Batch], clear: Color) -> Result<u32, RenderError> {
        self.check_device()?;

        let view = match &self.target {
            PresentTarget::Surface { surface, .. } => {
                self.acquired = None;
                let frame = surface
                    .get_current_texture()
                    .map_err(|e| self.map_surface_error(e))?;
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.acquired = Some(frame);
                view
            }
            PresentTarget::Offscreen { texture } => {
                texture.create_view(&wgpu::TextureViewDescriptor::default())
            }
        };

        for batch in batches {
            if let Some(asset) = &batch.texture {
                self.ensure_texture(asset);
            }
        }
        self.sprite.write_viewport(&self.queue, self.size);

        // Batch indices are local; each draw rebases with `base_vertex`.
        let vertex_count: usize = batches.iter().map(|b| b.vertices.len()).sum();
        let index_count: usize = batches.iter().map(|b| b.indices.len()).sum();
        if index_count > 0 {
            self.ensure_buffer_capacity(vertex_count, index_count);
            let vertices: Vec<Vertex> = batches.iter().flat_map(|b| b.vertices.iter().copied()).collect();
            let indices: Vec<u32> = batches.iter().flat_map(|b| b.indices.iter().copied()).collect();
            if let (Some(vb), Some(ib)) = (self.vertex_buf.as_ref(), self.index_buf.as_ref()) {
                self.queue.write_buffer(vb, 0, bytemuck::cast_slice(&vertices));
                self.queue.write_buffer(ib, 0, bytemuck::cast_slice(&indices));
            }
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("kiln frame encoder"),
            });

        let mut draw_calls = 0u32;
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("kiln sprite pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: clear.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let (Some(vb), Some(ib)) = (self.vertex_buf.as_ref(), self.index_buf.as_ref())
                && index_count > 0
            {
                rpass.set_pipeline(&self.sprite.pipeline);
                rpass.set_bind_group(0, &self.sprite.viewport_bg, &[]);
                rpass.set_vertex_buffer(0, vb.slice(..));
                rpass.set_index_buffer(ib.slice(..), wgpu::IndexFormat::Uint32);

                let mut base_vertex = 0i32;
                let mut first_index = 0u32;
                for batch in batches {
                    let count = batch.indices.len() as u32;
                    let bind_group = match batch.texture_id() {
                        None => Some(&self.sprite.white.bind_group),
                        Some(id) => self.textures.get(&id).map(|t| &t.bind_group),
                    };
                    if let Some(bind_group) = bind_group {
                        rpass.set_bind_group(1, bind_group, &[]);
                        rpass.draw_indexed(first_index..first_index + count, base_vertex, 0..1);
                        draw_calls += 1;
                    }
                    base_vertex += batch.vertices.len() as i32;
                    first_index += count;
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.offscreen_drawn = true;
        Ok(draw_calls)
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.check_device()?;

        match &self.target {
            PresentTarget::Surface { .. } => {
                let frame = self
                    .acquired
                    .take()
                    .ok_or(RenderError::InvalidFrame("present without an acquired frame"))?;
                frame.present();
            }
            PresentTarget::Offscreen { .. } => {
                if !std::mem::take(&mut self.offscreen_drawn) {
                    return Err(RenderError::InvalidFrame("present without a drawn frame"));
                }
            }
        }

        // Release GPU copies of textures nothing references anymore.
        let before = self.textures.len();
        self.textures.retain(|_, t| t.source.strong_count() > 0);
        let released = before - self.textures.len();
        if released > 0 {
            log::debug!("wgpu: released {released} unreferenced textures");
        }
        Ok(())
    }

    fn ensure_texture(&mut self, asset: &Arc<TextureAsset>) {
        if self.textures.contains_key(&asset.id()) {
            return;
        }
        let max = self.device.limits().max_texture_dimension_2d;
        if asset.width() > max || asset.height() > max {
            log::warn!(
                "wgpu: texture {} is {}x{}, above the device limit of {max}; skipped",
                asset.id(),
                asset.width(),
                asset.height()
            );
            return;
        }
        let gpu = upload_texture(&self.device, &self.queue, &self.sprite, asset);
        self.textures.insert(asset.id(), gpu);
    }

    fn ensure_buffer_capacity(&mut self, vertices: usize, indices: usize) {
        if vertices > self.vertex_capacity || self.vertex_buf.is_none() {
            let cap = vertices.next_power_of_two().max(64);
            self.vertex_buf = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("kiln vertex buffer"),
                size: (cap * std::mem::size_of::<Vertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.vertex_capacity = cap;
        }
        if indices > self.index_capacity || self.index_buf.is_none() {
            let cap = indices.next_power_of_two().max(64);
            self.index_buf = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("kiln index buffer"),
                size: (cap * std::mem::size_of::<u32>()) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.index_capacity = cap;
        }
    }
}

/// Rejects color targets larger than the device can allocate.
fn check_surface_size(size: SurfaceSize, max_dimension: u32) -> Result<(), RenderError> {
    if size.width > max_dimension || size.height > max_dimension {
        return Err(RenderError::SurfaceError(format!(
            "{size} exceeds the device limit of {max_dimension}px per side"
        )));
    }
    Ok(())
}

/// Maps an error captured by a validation scope through `make`.
fn scoped(captured: Option<wgpu::Error>, make: impl FnOnce(String) -> RenderError) -> Result<(), RenderError> {
    match captured {
        None => Ok(()),
        Some(err) => {
            log::error!("wgpu: {err}");
            Err(make(err.to_string()))
        }
    }
}

fn offscreen_texture(device: &wgpu::Device, size: SurfaceSize) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("kiln offscreen target"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: OFFSCREEN_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    sprite: &SpritePipeline,
    asset: &Arc<TextureAsset>,
) -> GpuTexture {
    let (texture, bind_group) = create_bound_texture(
        device,
        queue,
        &sprite.texture_bgl,
        &sprite.sampler,
        asset.width(),
        asset.height(),
        asset.pixels(),
    );
    GpuTexture {
        _texture: texture,
        bind_group,
        source: Arc::downgrade(asset),
    }
}

fn create_bound_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> (wgpu::Texture, wgpu::BindGroup) {
    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("kiln texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        extent,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("kiln texture bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    (texture, bind_group)
}

// ── pipeline ──────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ViewportUniform {
    viewport: [f32; 2],
    _pad: [f32; 2], // 16-byte alignment
}

const VERTEX_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x2, // pos
    1 => Float32x2, // uv
    2 => Float32x4  // color
];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

struct WhiteTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct SpritePipeline {
    pipeline: wgpu::RenderPipeline,
    texture_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    viewport_ubo: wgpu::Buffer,
    viewport_bg: wgpu::BindGroup,
    white: WhiteTexture,
}

impl SpritePipeline {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let shader_src = include_str!("shaders/sprite.wgsl");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("kiln sprite shader"),
            source: wgpu::ShaderSource::Wgsl(shader_src.into()),
        });

        let viewport_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kiln viewport bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ViewportUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kiln texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("kiln sprite pipeline layout"),
            bind_group_layouts: &[&viewport_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("kiln sprite pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("kiln sprite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kiln viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let viewport_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kiln viewport bind group"),
            layout: &viewport_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        let (texture, bind_group) =
            create_bound_texture(device, queue, &texture_bgl, &sampler, 1, 1, &[0xff; 4]);

        Self {
            pipeline,
            texture_bgl,
            sampler,
            viewport_ubo,
            viewport_bg,
            white: WhiteTexture {
                _texture: texture,
                bind_group,
            },
        }
    }

    fn write_viewport(&self, queue: &wgpu::Queue, size: SurfaceSize) {
        let u = ViewportUniform {
            viewport: [size.width.max(1) as f32, size.height.max(1) as f32],
            _pad: [0.0; 2],
        };
        queue.write_buffer(&self.viewport_ubo, 0, bytemuck::bytes_of(&u));
    }
}
