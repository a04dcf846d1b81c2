use std::time::Instant;

use anyhow::{Context, Result, bail};

use kiln_engine::assets::{AssetId, SpritesheetGrid};
use kiln_engine::coords::{Rect, Vec2};
use kiln_engine::core::{App, AppControl, Engine, EngineConfig, FrameCtx, RenderCtx};
use kiln_engine::device::{GpuInit, SurfaceSize, SurfaceTarget};
use kiln_engine::input::Key;
use kiln_engine::logging::{LoggingConfig, init_logging};
use kiln_engine::paint::Color;
use kiln_engine::render::{HeadlessBackend, SurfaceRenderer, WgpuBackend};
use kiln_engine::scene::{Drawable, Shape, Sprite};
use kiln_engine::window::{Runtime, RuntimeConfig};

const CHECKER: u32 = 64;
const BALLS: usize = 48;
const DEFAULT_HEADLESS_FRAMES: u64 = 600;

enum Mode {
    Windowed,
    Headless { frames: u64 },
}

fn parse_args() -> Result<Mode> {
    let mut args = std::env::args().skip(1);
    let mut mode = Mode::Windowed;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--headless" => {
                let frames = match args.next() {
                    Some(n) => n
                        .parse()
                        .with_context(|| format!("invalid frame count {n:?}"))?,
                    None => DEFAULT_HEADLESS_FRAMES,
                };
                mode = Mode::Headless { frames };
            }
            other => bail!("unknown argument {other:?}; usage: kiln-demo [--headless [FRAMES]]"),
        }
    }
    Ok(mode)
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    match parse_args()? {
        Mode::Windowed => run_windowed(),
        Mode::Headless { frames } => run_headless(frames),
    }
}

fn run_windowed() -> Result<()> {
    let renderer = SurfaceRenderer::new(WgpuBackend::new(GpuInit::default()));
    let engine = Engine::new(renderer, config())?;

    let runtime = RuntimeConfig {
        title: "kiln demo".to_string(),
        ..RuntimeConfig::default()
    };
    Runtime::run(runtime, engine, Bounce::new())
}

fn run_headless(frames: u64) -> Result<()> {
    let mut engine = Engine::new(SurfaceRenderer::new(HeadlessBackend::new()), config())?;
    engine
        .initialize(SurfaceTarget::Headless, SurfaceSize::new(1280, 720))
        .context("headless initialization failed")?;

    let mut app = Bounce::new();
    let started = Instant::now();
    let mut presented = 0u64;

    for _ in 0..frames {
        let outcome = engine.run_frame(&mut app).context("frame failed")?;
        if outcome.presented.is_some() {
            presented += 1;
        }
        if outcome.control == AppControl::Exit {
            break;
        }
    }

    let backend = engine.renderer().backend();
    log::info!(
        "headless: {presented}/{frames} frames in {:.2?}; last frame {} draw calls, {} vertices",
        started.elapsed(),
        backend.last_draw_calls(),
        backend.last_vertices(),
    );
    engine.shutdown();
    Ok(())
}

fn config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.clear_color = Color::from_hex(0x101418ff);
    config.assets.memory_limit = 16 * 1024 * 1024;
    config
}

struct Ball {
    pos: Vec2,
    vel: Vec2,
    textured: bool,
}

/// Balls bouncing inside the surface. Space toggles spinning, Escape quits.
struct Bounce {
    checker: Option<AssetId>,
    /// Quadrants of the checker texture.
    frames: Vec<Rect>,
    balls: Vec<Ball>,
    spin: bool,
    angle: f32,
    bounds: Vec2,
    last_report: u64,
}

impl Bounce {
    fn new() -> Self {
        let balls = (0..BALLS)
            .map(|i| {
                let t = i as f32;
                Ball {
                    pos: Vec2::new(40.0 + (t * 97.0) % 1100.0, 40.0 + (t * 53.0) % 600.0),
                    vel: Vec2::new(60.0 + (t * 13.0) % 140.0, 45.0 + (t * 29.0) % 120.0),
                    textured: i % 3 != 0,
                }
            })
            .collect();

        Self {
            checker: None,
            frames: Vec::new(),
            balls,
            spin: true,
            angle: 0.0,
            bounds: Vec2::new(1280.0, 720.0),
            last_report: 0,
        }
    }

    fn ensure_texture(&mut self, ctx: &FrameCtx<'_>) {
        if self.checker.is_some_and(|id| ctx.assets.contains(id)) {
            return;
        }
        let grid = SpritesheetGrid::new(2, 2, CHECKER / 2, CHECKER / 2);
        match ctx.assets.insert_rgba(CHECKER, CHECKER, checkerboard(CHECKER)) {
            Ok(id) => {
                self.checker = Some(id);
                self.frames = grid.uv_rects(CHECKER, CHECKER).unwrap_or_else(|e| {
                    log::warn!("checker frames unavailable: {e}");
                    vec![Rect::UNIT]
                });
            }
            Err(e) => {
                log::warn!("checker texture unavailable: {e}");
                self.checker = None;
            }
        }
    }
}

impl App for Bounce {
    fn update(&mut self, ctx: &FrameCtx<'_>) -> AppControl {
        if ctx.input.just_pressed(Key::Escape) {
            return AppControl::Exit;
        }
        if ctx.input.just_pressed(Key::Space) {
            self.spin = !self.spin;
        }

        self.ensure_texture(ctx);

        let size = ctx.surface_size;
        if !size.is_zero() {
            self.bounds = Vec2::new(size.width as f32, size.height as f32);
        }

        let dt = ctx.time.dt;
        for ball in &mut self.balls {
            ball.pos = ball.pos + ball.vel * dt;
            if ball.pos.x < 0.0 || ball.pos.x > self.bounds.x {
                ball.vel.x = -ball.vel.x;
                ball.pos.x = ball.pos.x.clamp(0.0, self.bounds.x);
            }
            if ball.pos.y < 0.0 || ball.pos.y > self.bounds.y {
                ball.vel.y = -ball.vel.y;
                ball.pos.y = ball.pos.y.clamp(0.0, self.bounds.y);
            }
        }
        if self.spin {
            self.angle += dt * std::f32::consts::FRAC_PI_2;
        }

        if ctx.time.frame_index >= self.last_report + 300 {
            self.last_report = ctx.time.frame_index;
            if let Some(stats) = ctx.last_stats {
                log::info!(
                    "{:.0} fps, {} batches, {} vertices, textures {:.1}% of budget",
                    ctx.time.fps,
                    stats.batches,
                    stats.vertices,
                    ctx.assets.memory_usage_percent(),
                );
            }
        }

        AppControl::Continue
    }

    fn redraw(&mut self, ctx: &mut RenderCtx<'_>) {
        ctx.draw(
            Drawable::shape(Shape::Rect { size: self.bounds }, Vec2::ZERO, Color::from_hex(0x1c2430ff))
                .with_order(-1),
        );

        for (i, ball) in self.balls.iter().enumerate() {
            let drawable = match (ball.textured, self.checker) {
                (true, Some(id)) if !self.frames.is_empty() => {
                    let sprite = Sprite {
                        size: Some(Vec2::splat(32.0)),
                        uv: self.frames[i % self.frames.len()],
                        ..Sprite::new(id)
                    };
                    Drawable::sprite(sprite, ball.pos)
                        .with_origin(Vec2::splat(16.0))
                        .with_rotation(self.angle)
                }
                _ => Drawable::shape(
                    Shape::Circle {
                        radius: 14.0,
                        segments: 24,
                    },
                    ball.pos,
                    Color::from_hex(0xf2a65aff),
                ),
            };
            ctx.draw(drawable.with_order(i as i32 % 4));
        }

        ctx.draw(
            Drawable::shape(
                Shape::Line {
                    from: Vec2::new(0.0, self.bounds.y - 2.0),
                    to: Vec2::new(self.bounds.x, self.bounds.y - 2.0),
                    thickness: 4.0,
                },
                Vec2::ZERO,
                Color::WHITE.with_opacity(0.5),
            )
            .with_order(10),
        );

        // Path through the first few balls.
        let path: Vec<Vec2> = self.balls.iter().take(6).map(|b| b.pos).collect();
        ctx.draw(
            Drawable::shape(
                Shape::Polyline {
                    points: path,
                    thickness: 3.0,
                },
                Vec2::ZERO,
                Color::from_hex(0x5ab0f2ff).with_opacity(0.6),
            )
            .with_order(5),
        );
    }
}

fn checkerboard(size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let light = ((x / 8) + (y / 8)) % 2 == 0;
            let v = if light { 230 } else { 60 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    pixels
}
