//! Desktop host: a winit window driving a [`SnowEffect`] on a [`GpuSurface`].
//!
//! Controls: the mouse position steers the wind, `P` toggles the performance
//! overlay (shown in the title bar), `R` resets the piles, `Space` pauses and
//! resumes, `Escape` quits.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::config::SnowConfig;
use crate::effect::SnowEffect;
use crate::error::SnowError;
use crate::gpu::GpuSurface;
use crate::visuals::Rgba;

const WINDOW_TITLE: &str = "Snowfall";

/// Open a window and run the effect until it is closed.
///
/// `background` overrides the default night-sky fill behind the snow.
pub fn run(config: SnowConfig, background: Option<Rgba>) -> Result<(), SnowError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, background);
    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

pub struct App {
    config: SnowConfig,
    background: Option<Rgba>,
    window: Option<Arc<Window>>,
    effect: Option<SnowEffect<GpuSurface>>,
    clock: Instant,
    error: Option<SnowError>,
}

impl App {
    pub fn new(config: SnowConfig, background: Option<Rgba>) -> Self {
        Self {
            config,
            background,
            window: None,
            effect: None,
            clock: Instant::now(),
            error: None,
        }
    }

    fn now_ms(&self) -> f64 {
        self.clock.elapsed().as_secs_f64() * 1000.0
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SnowError> {
        let window_attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        let mut surface = pollster::block_on(GpuSurface::new(window.clone()))?;
        if let Some(background) = self.background {
            surface.set_background(background);
        }

        let mut effect = SnowEffect::new(self.config.clone(), size.width as f32, size.height as f32);
        effect.attach_surface(surface);
        effect.start();

        window.request_redraw();
        self.window = Some(window);
        self.effect = Some(effect);
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) -> bool {
        let Some(effect) = self.effect.as_mut() else {
            return false;
        };
        match key {
            KeyCode::KeyP => {
                let visible = effect.toggle_overlay();
                info!(visible, "overlay toggled");
            }
            KeyCode::KeyR => effect.reset(),
            KeyCode::Space => {
                if effect.is_running() {
                    effect.stop();
                } else {
                    effect.start();
                }
            }
            KeyCode::Escape => return true,
            _ => {}
        }
        false
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                error!("failed to open the snow window: {e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(effect) = self.effect.as_mut() {
                    effect.stop();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(effect) = self.effect.as_mut() {
                    if let Some(gpu) = effect.surface_mut() {
                        gpu.resize(physical_size);
                    }
                    effect.resize(physical_size.width as f32, physical_size.height as f32);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(effect) = self.effect.as_mut() {
                    effect.pointer_move(position.x as f32, position.y as f32);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                if let Some(effect) = self.effect.as_mut() {
                    effect.pointer_wind(0.0);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if self.handle_key(key) {
                    event_loop.exit();
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                let now = self.now_ms();
                let Some(effect) = self.effect.as_mut() else {
                    return;
                };
                if !effect.is_running() {
                    return;
                }
                effect.on_tick(now);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
