use std::sync::Arc;

use anyhow::{Context, Result, anyhow};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, Engine};
use crate::device::{SurfaceSize, SurfaceTarget};
use crate::input::platform::winit::translate_window_event;
use crate::render::Renderer;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "kiln".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            resizable: true,
        }
    }
}

/// Entry point for windowed runs.
///
/// Opens one window, binds the engine's renderer to it and drives
/// [`Engine::run_frame`] from redraw requests until the window closes or the
/// app asks to exit.
pub struct Runtime;

impl Runtime {
    pub fn run<R, A>(config: RuntimeConfig, engine: Engine<R>, app: A) -> Result<()>
    where
        R: Renderer + 'static,
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState::new(config, engine, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct RuntimeState<R, A> {
    config: RuntimeConfig,
    engine: Engine<R>,
    app: A,

    window: Option<Arc<Window>>,
    close_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<R, A> RuntimeState<R, A>
where
    R: Renderer,
    A: App,
{
    fn new(config: RuntimeConfig, engine: Engine<R>, app: A) -> Self {
        Self {
            config,
            engine,
            app,
            window: None,
            close_requested: false,
            failure: None,
        }
    }

    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(self.config.resizable);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = SurfaceSize::from(window.inner_size());
        self.engine
            .initialize(SurfaceTarget::Window(window.clone()), size)
            .context("renderer initialization failed")?;

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.close_requested = true;
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.pre_present_notify();
        }

        match self.engine.run_frame(&mut self.app) {
            Ok(outcome) => {
                if outcome.control == AppControl::Exit {
                    self.close_requested = true;
                }
            }
            Err(e) => self.fail(event_loop, anyhow!(e).context("frame failed")),
        }
    }
}

impl<R, A> ApplicationHandler for RuntimeState<R, A>
where
    R: Renderer,
    A: App,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.open_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Close is honored here, after the last frame's present.
        if self.close_requested {
            self.engine.shutdown();
            self.window = None;
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }

            WindowEvent::Resized(size) => {
                self.engine.lifecycle_sender().resized((*size).into());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                self.engine.lifecycle_sender().resized(window.inner_size().into());
            }

            WindowEvent::RedrawRequested => {
                if !self.close_requested {
                    self.redraw(event_loop);
                }
            }

            _ => {
                if let Some(ev) = translate_window_event(&event) {
                    self.engine.handle_input(ev);
                }
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.engine.shutdown();
    }
}
