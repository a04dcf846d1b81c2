//! End-to-end frame pipeline scenarios driven through the headless backend.

use kiln_engine::assets::{AssetError, AssetId, TextureCache};
use kiln_engine::coords::Vec2;
use kiln_engine::core::{App, AppControl, Engine, EngineConfig, FrameCtx, RenderCtx};
use kiln_engine::device::{DeviceSurfaceState, SurfaceSize, SurfaceTarget};
use kiln_engine::input::{ButtonState, InputEvent, InputLatch, Key, MouseButton};
use kiln_engine::paint::Color;
use kiln_engine::render::geometry;
use kiln_engine::render::{BatchAssembler, HeadlessBackend, RenderError, Renderer, SurfaceRenderer};
use kiln_engine::scene::{DrawList, Drawable, Shape, Sprite};

const SIZE: SurfaceSize = SurfaceSize::new(800, 600);

fn headless_engine(config: EngineConfig) -> Engine<SurfaceRenderer<HeadlessBackend>> {
    let mut engine = Engine::new(SurfaceRenderer::new(HeadlessBackend::new()), config).unwrap();
    engine.initialize(SurfaceTarget::Headless, SIZE).unwrap();
    engine
}

fn solid(cache: &TextureCache, side: u32) -> AssetId {
    cache
        .insert_rgba(side, side, vec![255; (side * side * 4) as usize])
        .unwrap()
}

/// Draws the given sprites at increasing paint order.
struct Sprites(Vec<AssetId>);

impl App for Sprites {
    fn redraw(&mut self, ctx: &mut RenderCtx<'_>) {
        for (i, id) in self.0.iter().enumerate() {
            ctx.draw(Drawable::sprite(Sprite::new(*id), Vec2::new(i as f32 * 20.0, 0.0)).with_order(i as i32));
        }
    }
}

// ── batching ──

#[test]
fn alternating_textures_produce_three_batches() {
    let mut engine = headless_engine(EngineConfig::default());
    let t1 = solid(engine.assets(), 4);
    let t2 = solid(engine.assets(), 4);

    let out = engine.run_frame(&mut Sprites(vec![t1, t2, t1])).unwrap();
    let stats = out.presented.unwrap();

    assert_eq!(stats.batches, 3);
    assert_eq!(stats.draw_calls, 3);
    assert_eq!(engine.renderer().backend().last_draw_calls(), 3);
}

#[test]
fn flattened_batches_match_meshes_in_paint_order() {
    let cache = TextureCache::new(1 << 20);
    let tex = solid(&cache, 8);

    let drawables = vec![
        Drawable::shape(Shape::Rect { size: Vec2::splat(10.0) }, Vec2::ZERO, Color::WHITE).with_order(2),
        Drawable::sprite(Sprite::new(tex), Vec2::new(5.0, 5.0)).with_order(0),
        Drawable::shape(
            Shape::Circle {
                radius: 4.0,
                segments: 8,
            },
            Vec2::new(30.0, 30.0),
            Color::BLACK,
        )
        .with_order(2),
        Drawable::shape(Shape::Rect { size: Vec2::ONE }, Vec2::ONE, Color::WHITE).with_order(1),
    ];

    // Stable sort by order: sprite(0), rect(1), rect(2), circle(2).
    let expected: Vec<_> = [1usize, 3, 0, 2]
        .iter()
        .flat_map(|&i| {
            let d = &drawables[i];
            let size = d.texture().map(|_| (8, 8));
            geometry::build(d, size).vertices
        })
        .collect();

    let mut list = DrawList::new();
    list.extend(drawables);
    let batches = BatchAssembler::new(1024).assemble(&mut list, &cache);

    let flattened: Vec<_> = batches.iter().flat_map(|b| b.vertices.iter().copied()).collect();
    assert_eq!(flattened, expected);
    // Sprite, then the three shapes merged.
    assert_eq!(batches.len(), 2);
}

#[test]
fn missing_texture_is_dropped_not_fatal() {
    let mut engine = headless_engine(EngineConfig::default());
    let t1 = solid(engine.assets(), 4);
    let gone = solid(engine.assets(), 4);
    assert!(engine.assets().unload(gone));

    let out = engine.run_frame(&mut Sprites(vec![t1, gone])).unwrap();
    let stats = out.presented.unwrap();
    assert_eq!(stats.batches, 1);
    assert_eq!(stats.vertices, 4);
}

// ── texture budget ──

#[test]
fn over_budget_load_leaves_cache_unchanged() {
    let mut config = EngineConfig::default();
    config.assets.memory_limit = 10 * 1024;
    let engine = headless_engine(config);
    let cache = engine.assets();

    // 8 KB: 32x64 RGBA8.
    cache.insert_rgba(32, 64, vec![0; 8192]).unwrap();
    assert_eq!(cache.memory_usage(), 8192);

    // 5 KB: 32x40 RGBA8.
    let err = cache.insert_rgba(32, 40, vec![0; 5120]).unwrap_err();
    assert!(matches!(
        err,
        AssetError::MemoryExceeded {
            requested_total: 13312,
            limit: 10240
        }
    ));
    assert_eq!(cache.memory_usage(), 8192);
    assert_eq!(cache.len(), 1);
}

// ── device lifecycle ──

#[test]
fn submit_before_initialize_is_not_ready() {
    let mut renderer = SurfaceRenderer::new(HeadlessBackend::new());
    let cache = TextureCache::new(1024);
    let mut list = DrawList::new();
    list.push(Drawable::shape(Shape::Rect { size: Vec2::ONE }, Vec2::ZERO, Color::WHITE));
    let batches = BatchAssembler::new(64).assemble(&mut list, &cache);

    let mut frame = renderer.begin_frame();
    assert_eq!(renderer.submit(&mut frame, &batches), Err(RenderError::DeviceNotReady));
    assert_eq!(renderer.state(), DeviceSurfaceState::Uninitialized);
}

#[test]
fn device_loss_mid_session() {
    let mut renderer = SurfaceRenderer::new(HeadlessBackend::new());
    renderer.initialize(SurfaceTarget::Headless, SIZE).unwrap();
    let frame = renderer.begin_frame();
    renderer.present(frame).unwrap();

    renderer.lifecycle_sender().device_lost();
    let mut frame = renderer.begin_frame();
    assert_eq!(renderer.state(), DeviceSurfaceState::Lost);
    assert_eq!(renderer.submit(&mut frame, &[]), Err(RenderError::DeviceLost));

    renderer.initialize(SurfaceTarget::Headless, SIZE).unwrap();
    assert_eq!(renderer.state(), DeviceSurfaceState::Ready);
    let frame = renderer.begin_frame();
    assert!(renderer.present(frame).is_ok());
}

#[test]
fn same_size_resize_twice_recreates_once() {
    let mut renderer = SurfaceRenderer::new(HeadlessBackend::new());
    renderer.initialize(SurfaceTarget::Headless, SIZE).unwrap();

    let bigger = SurfaceSize::new(1024, 768);
    renderer.resize(bigger).unwrap();
    renderer.resize(bigger).unwrap();
    renderer.resize(bigger).unwrap();

    assert_eq!(renderer.manager().recreations(), 1);
    assert_eq!(renderer.surface_size(), bigger);
}

#[test]
fn failed_resize_falls_back_to_prior_size() {
    let mut renderer = SurfaceRenderer::new(HeadlessBackend::new());
    renderer.initialize(SurfaceTarget::Headless, SIZE).unwrap();
    renderer.backend_mut().fail_recreates(1);

    let err = renderer.resize(SurfaceSize::new(1920, 1080)).unwrap_err();
    assert!(matches!(err, RenderError::SurfaceError(_)));
    assert_eq!(renderer.state(), DeviceSurfaceState::Ready);
    assert_eq!(renderer.surface_size(), SIZE);
}

#[test]
fn engine_survives_device_loss() {
    let mut engine = headless_engine(EngineConfig::default());
    let tex = solid(engine.assets(), 4);
    let mut app = Sprites(vec![tex]);

    engine.run_frame(&mut app).unwrap();
    engine.lifecycle_sender().device_lost();
    let out = engine.run_frame(&mut app).unwrap();

    assert_eq!(out.presented.map(|s| s.batches), Some(1));
    assert_eq!(engine.state(), DeviceSurfaceState::Ready);
}

// ── input ──

#[test]
fn decay_empties_transient_state_only() {
    let mut latch = InputLatch::new();
    latch.apply_event(InputEvent::Key {
        key: Key::Enter,
        state: ButtonState::Pressed,
        repeat: false,
    });
    latch.apply_event(InputEvent::PointerButton {
        button: MouseButton::Right,
        state: ButtonState::Pressed,
    });
    latch.apply_event(InputEvent::PointerMoved(Vec2::new(1.0, 1.0)));
    latch.apply_event(InputEvent::PointerMoved(Vec2::new(4.0, 5.0)));
    latch.decay();
    latch.latch();
    assert!(latch.just_pressed(Key::Enter));

    latch.decay();
    assert!(latch.pressed_keys().is_empty());
    assert!(!latch.button_just_pressed(MouseButton::Right));
    assert_eq!(latch.pointer_delta(), Vec2::ZERO);
    assert!(latch.is_held(Key::Enter));
    assert!(latch.is_button_held(MouseButton::Right));

    latch.decay();
    assert!(latch.frame().is_empty());
    assert!(latch.is_held(Key::Enter));
}

/// Counts how many updates observed a press.
#[derive(Default)]
struct PressCounter {
    seen: u32,
}

impl App for PressCounter {
    fn update(&mut self, ctx: &FrameCtx<'_>) -> AppControl {
        if ctx.input.just_pressed(Key::A) {
            self.seen += 1;
        }
        AppControl::Continue
    }

    fn redraw(&mut self, _ctx: &mut RenderCtx<'_>) {}
}

#[test]
fn press_is_visible_to_exactly_one_update() {
    let mut engine = headless_engine(EngineConfig::default());
    let mut app = PressCounter::default();

    engine.handle_input(InputEvent::Key {
        key: Key::A,
        state: ButtonState::Pressed,
        repeat: false,
    });
    for _ in 0..4 {
        engine.run_frame(&mut app).unwrap();
    }
    assert_eq!(app.seen, 1);
}
