use anyhow::{Context, Result};
use egui::Context as EguiContext;
use range_input::Action;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

const WINDOW_SIZE: PhysicalSize<u32> = PhysicalSize::new(1024, 768);

/// One runnable scene. The app owns the window and GPU; a demo owns its
/// state, its renderer and its input mapping.
pub trait Demo {
    fn title(&self) -> &'static str;

    /// Called once the device exists.
    fn setup(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<()>;

    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32);

    /// Advance by `dt` wall-clock seconds.
    fn update(&mut self, dt: f32);

    fn handle_key(&mut self, key: KeyCode, pressed: bool) -> Action;

    fn handle_mouse_button(&mut self, _button: MouseButton, _pressed: bool) {}

    fn handle_mouse_motion(&mut self, _dx: f32, _dy: f32) {}

    /// Whether the pointer should be hidden and confined to the window.
    fn wants_cursor_grab(&self) -> bool {
        false
    }

    fn render(&self, device: &wgpu::Device, queue: &wgpu::Queue, view: &wgpu::TextureView);

    fn draw_ui(&mut self, _ctx: &EguiContext) {}
}

/// Window, surface and device, created together on resume.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, title: &str, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(title)
            .with_inner_size(WINDOW_SIZE);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("range_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
    }

    fn apply_cursor_grab(&self, grab: bool) {
        self.window.set_cursor_visible(!grab);
        let mode = if grab {
            CursorGrabMode::Confined
        } else {
            CursorGrabMode::None
        };
        if let Err(e) = self.window.set_cursor_grab(mode) {
            // Some platforms only support one of the two grab modes.
            let fallback = grab && self.window.set_cursor_grab(CursorGrabMode::Locked).is_ok();
            if !fallback {
                tracing::debug!("cursor grab unavailable: {e}");
            }
        }
    }

    /// Draw the demo, then the egui overlay on top, and present.
    fn redraw<D: Demo>(&mut self, demo: &mut D, egui_ctx: &EguiContext) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        demo.render(&self.device, &self.queue, &view);

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| demo.draw_ui(ctx));
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
        self.window.request_redraw();
    }
}

struct App<D: Demo> {
    demo: D,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    last_frame: Instant,
    cursor_grabbed: bool,
    failure: Option<anyhow::Error>,
}

impl<D: Demo> ApplicationHandler for App<D> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        let ready = Gpu::new(event_loop, self.demo.title(), &self.egui_ctx).and_then(|gpu| {
            self.demo.setup(
                &gpu.device,
                &gpu.queue,
                gpu.config.format,
                gpu.config.width,
                gpu.config.height,
            )?;
            Ok(gpu)
        });
        match ready {
            Ok(gpu) => {
                self.last_frame = Instant::now();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialise graphics: {e:#}");
                self.failure = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if !reaches_demo(response.consumed, input_state(&event)) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
                self.demo
                    .resize(&gpu.device, gpu.config.width, gpu.config.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let action = self.demo.handle_key(key, key_state == ElementState::Pressed);
                if action == Action::Quit {
                    tracing::info!("quit requested");
                    event_loop.exit();
                }
            }
            WindowEvent::MouseInput {
                button,
                state: btn_state,
                ..
            } => {
                self.demo
                    .handle_mouse_button(button, btn_state == ElementState::Pressed);
                let grab = self.demo.wants_cursor_grab();
                if grab != self.cursor_grabbed {
                    gpu.apply_cursor_grab(grab);
                    self.cursor_grabbed = grab;
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.last_frame).as_secs_f32().min(0.1);
                self.last_frame = now;
                self.demo.update(dt);
                gpu.redraw(&mut self.demo, &self.egui_ctx);
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.demo
                .handle_mouse_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

/// Pressed or released state of a key or mouse button event.
fn input_state(event: &WindowEvent) -> Option<ElementState> {
    match event {
        WindowEvent::KeyboardInput { event, .. } => Some(event.state),
        WindowEvent::MouseInput { state, .. } => Some(*state),
        _ => None,
    }
}

/// Releases reach the demo even when egui consumed them, so held keys and
/// the fire trigger cannot get stuck down.
fn reaches_demo(consumed_by_ui: bool, state: Option<ElementState>) -> bool {
    !consumed_by_ui || state == Some(ElementState::Released)
}

/// Open a window and drive `demo` until it quits or the window closes.
pub fn run<D: Demo>(demo: D) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        demo,
        gpu: None,
        egui_ctx: EguiContext::default(),
        last_frame: Instant::now(),
        cursor_grabbed: false,
        failure: None,
    };
    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
