use range_input::Action;
use range_render_wgpu::{OrbitAxis, OrbitCamera, TriangleRenderer};
use winit::keyboard::KeyCode;

use crate::app::Demo;

/// Orbit steps per second.
const ORBIT_RATE: f64 = 60.0;

/// Two translucent triangles seen from a camera circling the origin.
pub struct TrianglesDemo {
    camera: OrbitCamera,
    renderer: Option<TriangleRenderer>,
    paused: bool,
    tick_accumulator: f64,
}

impl TrianglesDemo {
    pub fn new() -> Self {
        Self {
            camera: OrbitCamera::default(),
            renderer: None,
            paused: false,
            tick_accumulator: 0.0,
        }
    }

    fn advance_orbit(&mut self, dt: f32) -> u32 {
        if self.paused {
            return 0;
        }
        let step = 1.0 / ORBIT_RATE;
        self.tick_accumulator += dt as f64;
        let mut ran = 0;
        while self.tick_accumulator >= step {
            self.tick_accumulator -= step;
            let before = self.camera.axis();
            self.camera.advance();
            if self.camera.axis() != before {
                tracing::debug!(axis = ?self.camera.axis(), "orbit axis switched");
            }
            ran += 1;
        }
        ran
    }
}

impl Default for TrianglesDemo {
    fn default() -> Self {
        Self::new()
    }
}

impl Demo for TrianglesDemo {
    fn title(&self) -> &'static str {
        "Range: triangles"
    }

    fn setup(
        &mut self,
        device: &wgpu::Device,
        _queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> anyhow::Result<()> {
        self.camera.aspect = width as f32 / height.max(1) as f32;
        self.renderer = Some(TriangleRenderer::new(device, format));
        Ok(())
    }

    fn resize(&mut self, _device: &wgpu::Device, width: u32, height: u32) {
        self.camera.aspect = width as f32 / height.max(1) as f32;
    }

    fn update(&mut self, dt: f32) {
        self.advance_orbit(dt);
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) -> Action {
        if !pressed {
            return Action::Noop;
        }
        match key {
            KeyCode::Escape => Action::Quit,
            KeyCode::KeyP => {
                self.paused = !self.paused;
                tracing::info!(paused = self.paused, "orbit toggled");
                Action::Noop
            }
            _ => Action::Noop,
        }
    }

    fn render(&self, device: &wgpu::Device, queue: &wgpu::Queue, view: &wgpu::TextureView) {
        if let Some(renderer) = &self.renderer {
            renderer.render(device, queue, view, &self.camera);
        }
    }

    fn draw_ui(&mut self, ctx: &egui::Context) {
        let axis = match self.camera.axis() {
            OrbitAxis::Y => "Y",
            OrbitAxis::X => "X",
        };
        let eye = self.camera.eye();
        egui::Window::new("Orbit")
            .default_pos([10.0, 10.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Axis: {axis}"));
                ui.label(format!("Angle: {:.3} rad", self.camera.angle));
                ui.label(format!("Eye: ({:.2}, {:.2}, {:.2})", eye.x, eye.y, eye.z));
                ui.checkbox(&mut self.paused, "Paused (P)");
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_advances_at_fixed_rate() {
        let mut d = TrianglesDemo::new();
        let start = d.camera.angle;
        // Nudge past the boundary so float drift cannot drop the last tick.
        assert_eq!(d.advance_orbit(0.25 + 1e-6), 15);
        assert!((d.camera.angle - start - 15.0 * d.camera.step).abs() < 1e-4);
    }

    #[test]
    fn pause_freezes_orbit() {
        let mut d = TrianglesDemo::new();
        d.handle_key(KeyCode::KeyP, true);
        let start = d.camera.angle;
        assert_eq!(d.advance_orbit(1.0), 0);
        assert_eq!(d.camera.angle, start);
        d.handle_key(KeyCode::KeyP, false);
        d.handle_key(KeyCode::KeyP, true);
        assert!(d.advance_orbit(1.0) > 0);
    }

    #[test]
    fn escape_quits() {
        let mut d = TrianglesDemo::new();
        assert_eq!(d.handle_key(KeyCode::Escape, true), Action::Quit);
        assert_eq!(d.handle_key(KeyCode::Escape, false), Action::Noop);
    }

    #[test]
    fn reaches_x_phase_after_one_turn() {
        let mut d = TrianglesDemo::new();
        d.advance_orbit(12.5);
        assert_eq!(d.camera.axis(), OrbitAxis::X);
    }
}
