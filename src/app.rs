//! Window and event loop.
//!
//! Input mutates the [`ViewParams`], the [`RedrawCoordinator`] turns changes
//! into at most one redraw request per batch of events, and the selected
//! [`Renderer`] draws a snapshot of the view.

use log::{debug, error, warn};
use winit::{
    dpi::PhysicalSize,
    event::{
        ElementState, Event, KeyboardInput, MouseButton, MouseScrollDelta, WindowEvent,
    },
    event_loop::EventLoop,
    window::{Window, WindowBuilder},
};

use crate::{
    backend::{self, BackendKind, Renderer},
    config::Config,
    controls::{self, Input, Outcome},
    error::{BackendError, StartupError},
    gfx::{self, Gpu},
    redraw::RedrawCoordinator,
    screen::{self, Position},
    view::ViewParams,
};

const TITLE: &str = "Julia set";

struct Session {
    window: Window,
    surface: wgpu::Surface,
    surface_configuration: wgpu::SurfaceConfiguration,
    gpu: Gpu,
    renderer: Box<dyn Renderer>,
    view: ViewParams,
    coordinator: RedrawCoordinator,
    cursor: Position,
}

impl Session {
    fn input(&mut self, input: Input) -> Outcome {
        let outcome = controls::apply(&mut self.view, input);
        if outcome == Outcome::Redraw {
            self.coordinator.invalidate();
        }
        outcome
    }

    fn resize(&mut self, size: screen::Size) {
        if !self.coordinator.resize(size) {
            return;
        }
        debug!("resizing to {:?}", size);

        self.view.resize(size);
        if !size.is_empty() {
            self.surface_configuration.width = size.width;
            self.surface_configuration.height = size.height;
            self.surface
                .configure(&self.gpu.device, &self.surface_configuration);
        }
        self.renderer.resize(&self.gpu, size);
    }

    fn redraw(&mut self) -> Result<(), wgpu::SurfaceError> {
        if self.view.viewport().is_empty() {
            return Ok(());
        }

        // Input can't reach the view while the frame is drawn from this copy.
        let snapshot = self.view;

        let surface_texture = self.surface.get_current_texture()?;
        let target = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer.draw(&self.gpu, &snapshot, &target);
        surface_texture.present();

        self.window
            .set_title(&title(&snapshot, self.renderer.kind()));
        Ok(())
    }

    fn reconfigure(&mut self) {
        if !self.view.viewport().is_empty() {
            self.surface
                .configure(&self.gpu.device, &self.surface_configuration);
        }
        self.coordinator.invalidate();
    }
}

fn title(view: &ViewParams, backend: BackendKind) -> String {
    let c = view.c();
    format!(
        "{}  c = {:.3} {:+.3}i  scale {:.0}  iterations {}  [{}]",
        TITLE,
        c.real,
        c.imaginary,
        view.scale(),
        view.max_iterations(),
        backend
    )
}

/// Wheel deltas from winit are positive away from the user; the view expects
/// negative for zooming in.
fn wheel_delta(delta: MouseScrollDelta) -> f64 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -(y as f64),
        MouseScrollDelta::PixelDelta(position) => -position.y,
    }
}

pub fn run(config: Config) -> Result<(), StartupError> {
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(TITLE)
        .with_inner_size(PhysicalSize::new(
            config.window_size.width,
            config.window_size.height,
        ))
        .build(&event_loop)?;

    let instance = wgpu::Instance::new(Gpu::backends());
    let surface = unsafe { instance.create_surface(&window) };
    let gpu = Gpu::request(&instance, Some(&surface))?;

    let size = screen::Size::from(window.inner_size());
    let format = gfx::preferred_format(&surface.get_supported_formats(&gpu.adapter))
        .ok_or(BackendError::NoSurfaceFormat)?;
    let surface_configuration = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width,
        height: size.height,
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode: wgpu::CompositeAlphaMode::Auto,
    };
    if !size.is_empty() {
        surface.configure(&gpu.device, &surface_configuration);
    }

    let view = config.initial_view(size)?;
    let renderer = backend::select(config.backend, &gpu, format, &view, config.threads)?;

    let mut session = Session {
        window,
        surface,
        surface_configuration,
        gpu,
        renderer,
        view,
        coordinator: RedrawCoordinator::new(size),
        cursor: Position::default(),
    };

    event_loop.run(move |event, _, control_flow| {
        // Nothing changes between inputs, so sleep until the next one.
        control_flow.set_wait();

        match event {
            Event::MainEventsCleared => {
                if session.coordinator.take() {
                    session.window.request_redraw();
                }
            }
            Event::WindowEvent { window_id, event } if window_id == session.window.id() => {
                let outcome = match event {
                    WindowEvent::CloseRequested => Outcome::Exit,
                    WindowEvent::Resized(size) => {
                        session.resize(size.into());
                        Outcome::Ignored
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        session.resize((*new_inner_size).into());
                        Outcome::Ignored
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        session.cursor = Position::new(position.x, position.y);
                        Outcome::Ignored
                    }
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    } => session.input(Input::Click(session.cursor)),
                    WindowEvent::MouseWheel { delta, .. } => {
                        session.input(Input::Wheel(wheel_delta(delta)))
                    }
                    WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(key),
                                ..
                            },
                        ..
                    } => session.input(Input::Key(key)),
                    _ => Outcome::Ignored,
                };
                if outcome == Outcome::Exit {
                    control_flow.set_exit();
                }
            }
            Event::RedrawRequested(window_id) if window_id == session.window.id() => {
                match session.redraw() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        session.reconfigure()
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("out of memory presenting frame");
                        control_flow.set_exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => warn!("timed out acquiring frame"),
                }
            }
            _ => {}
        }
    })
}
