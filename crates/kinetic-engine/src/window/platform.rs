use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::core::{Display, PlatformEvent};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::input::InputState;
use crate::paint::Color;
use crate::render::shapes::circle::CircleRenderer;
use crate::render::shapes::sprite::SpriteRenderer;
use crate::render::shapes::text::TextRenderer;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::DrawList;
use crate::text::FontSystem;

use super::translate::translate_input_event;

/// Startup pumps allowed before giving up on the window appearing.
const STARTUP_PUMPS: u32 = 500;
const STARTUP_PUMP_TIMEOUT: Duration = Duration::from_millis(10);

/// Window configuration.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub title: String,
    /// Inner size in logical pixels.
    pub size: LogicalSize<f64>,
    pub resizable: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "kinetic".to_string(),
            size: LogicalSize::new(640.0, 480.0),
            resizable: false,
        }
    }
}

/// Window, GPU surface and keyboard input behind one handle.
///
/// Created once with [`Platform::open`]; dropping it releases the surface,
/// the device and the window, in that order.
pub struct Platform {
    shell: Shell,
    circles: CircleRenderer,
    sprites: SpriteRenderer,
    text: TextRenderer,
    // Dropped after the window it created.
    event_loop: EventLoop<()>,
}

impl Platform {
    /// Creates the event loop, opens the window and initializes the GPU.
    ///
    /// Blocks until the window exists or startup fails.
    pub fn open(config: PlatformConfig, gpu_init: GpuInit) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut shell = Shell::new(config, gpu_init);

        for _ in 0..STARTUP_PUMPS {
            let status = event_loop.pump_app_events(Some(STARTUP_PUMP_TIMEOUT), &mut shell);

            if let Some(err) = shell.init_error.take() {
                return Err(err);
            }
            if shell.surface.is_some() {
                log::info!("platform ready");
                return Ok(Self {
                    shell,
                    circles: CircleRenderer::new(),
                    sprites: SpriteRenderer::new(),
                    text: TextRenderer::new(),
                    event_loop,
                });
            }
            if let PumpStatus::Exit(code) = status {
                bail!("event loop exited during startup (code {code})");
            }
        }

        bail!("window did not become available during startup")
    }
}

impl Display for Platform {
    fn poll_events(&mut self) -> Vec<PlatformEvent> {
        let status = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.shell);
        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop exited (code {code})");
            self.shell.pending.push(PlatformEvent::Quit);
        }

        std::mem::take(&mut self.shell.pending)
    }

    fn input(&self) -> &InputState {
        &self.shell.input_state
    }

    fn present(&mut self, clear: Color, draw_list: &mut DrawList, fonts: &FontSystem) -> Result<()> {
        let Some(surface) = self.shell.surface.as_mut() else {
            return Ok(());
        };
        if !surface.gpu.is_drawable() {
            return Ok(());
        }

        let mut frame = match surface.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                return match surface.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => bail!("surface can no longer present"),
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Ok(()),
                };
            }
        };

        // Clear pass, dropped before the renderers borrow the encoder.
        {
            let _pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("kinetic clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let gpu = &surface.gpu;
        let rctx = RenderCtx::new(
            gpu.device(),
            gpu.queue(),
            gpu.surface_format(),
            surface.viewport(),
            surface.window.scale_factor() as f32,
        );

        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            // Each renderer draws its own command kind, so kinds layer in this
            // order: shapes, then sprites, then text.
            self.circles.render(&rctx, &mut target, draw_list);
            self.sprites.render(&rctx, &mut target, draw_list);
            self.text.render(&rctx, &mut target, draw_list, fonts);
        }

        gpu.submit(frame);
        Ok(())
    }
}

impl Drop for Platform {
    fn drop(&mut self) {
        log::info!("platform released");
    }
}

// ── winit handler ─────────────────────────────────────────────────────────

/// Window plus the GPU context bound to it.
struct WindowSurface {
    // Dropped before `window`.
    gpu: Gpu<'static>,
    window: Arc<Window>,
}

impl WindowSurface {
    fn viewport(&self) -> Viewport {
        let logical: LogicalSize<f64> = self.window.inner_size().to_logical(self.window.scale_factor());
        Viewport::new(logical.width as f32, logical.height as f32)
    }
}

/// Receives winit callbacks during each pump.
struct Shell {
    config: PlatformConfig,
    gpu_init: GpuInit,
    surface: Option<WindowSurface>,
    init_error: Option<anyhow::Error>,

    input_state: InputState,
    pending: Vec<PlatformEvent>,
}

impl Shell {
    fn new(config: PlatformConfig, gpu_init: GpuInit) -> Self {
        Self {
            config,
            gpu_init,
            surface: None,
            init_error: None,
            input_state: InputState::default(),
            pending: Vec::new(),
        }
    }

    fn create_surface(&self, event_loop: &ActiveEventLoop) -> Result<WindowSurface> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.size)
            .with_resizable(self.config.resizable);

        let window = Arc::new(event_loop.create_window(attrs).context("failed to create window")?);

        let gpu = pollster::block_on(Gpu::new(
            Arc::clone(&window),
            window.inner_size(),
            self.gpu_init.clone(),
        ))
        .context("GPU initialization failed")?;

        Ok(WindowSurface { gpu, window })
    }

    fn resize_to_window(&mut self) {
        let Some(surface) = self.surface.as_mut() else { return };
        let size = surface.window.inner_size();
        surface.gpu.resize(size);
        self.pending.push(PlatformEvent::Resized {
            width: size.width,
            height: size.height,
        });
    }
}

impl ApplicationHandler for Shell {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() || self.init_error.is_some() {
            return;
        }

        match self.create_surface(event_loop) {
            Ok(surface) => {
                self.input_state.focused = surface.window.has_focus();
                self.surface = Some(surface);
            }
            Err(e) => self.init_error = Some(e),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(ev) = translate_input_event(&event) {
            self.input_state.apply_event(ev);
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.pending.push(PlatformEvent::Quit);
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.resize_to_window();
            }
            WindowEvent::Focused(focused) => {
                self.pending.push(PlatformEvent::FocusChanged(focused));
            }
            _ => {}
        }
    }
}
