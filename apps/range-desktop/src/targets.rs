use glam::Vec3;
use range_input::{Action, EdgeTrigger};
use range_kernel::{Arena, ArenaConfig, ConfigError};
use range_render_wgpu::{ArenaRenderer, FlyCamera};
use std::collections::HashSet;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::app::Demo;

const SPRINT_MULTIPLIER: f32 = 3.0;

/// Shoot-the-target scene: a fly camera inside the arena, left click fires.
pub struct TargetsDemo {
    arena: Arena,
    camera: FlyCamera,
    renderer: Option<ArenaRenderer>,
    keys_held: HashSet<KeyCode>,
    fire: EdgeTrigger,
    looking: bool,
    tick_accumulator: f64,
}

impl TargetsDemo {
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            arena: Arena::new(config)?,
            camera: FlyCamera::default(),
            renderer: None,
            keys_held: HashSet::new(),
            fire: EdgeTrigger::new(),
            looking: false,
            tick_accumulator: 0.0,
        })
    }

    /// Movement intent from the held keys, in the camera's local frame.
    fn movement(&self) -> Vec3 {
        let held = |k| self.keys_held.contains(&k);
        let mut local = Vec3::ZERO;
        if held(KeyCode::KeyW) {
            local.z += 1.0;
        }
        if held(KeyCode::KeyS) {
            local.z -= 1.0;
        }
        if held(KeyCode::KeyD) {
            local.x += 1.0;
        }
        if held(KeyCode::KeyA) {
            local.x -= 1.0;
        }
        if held(KeyCode::Space) {
            local.y += 1.0;
        }
        if held(KeyCode::ControlLeft) {
            local.y -= 1.0;
        }
        if held(KeyCode::ShiftLeft) {
            local *= SPRINT_MULTIPLIER;
        }
        local
    }

    fn apply(&mut self, action: Action, dt: f32) {
        match action {
            Action::Fire => {
                match self
                    .arena
                    .launch(self.camera.position, self.camera.forward())
                {
                    Ok(id) => tracing::debug!(%id, "fireball launched"),
                    Err(e) => tracing::warn!("launch rejected: {e}"),
                }
            }
            Action::Look { dx, dy } => self.camera.rotate(dx, dy),
            Action::Move(local) => self.camera.translate_local(local, dt),
            Action::Quit | Action::Noop => {}
        }
    }

    /// Run as many fixed ticks as `dt` covers, then drain the arena's event
    /// log into the trace output. Returns how many ticks ran.
    fn advance_arena(&mut self, dt: f32) -> u32 {
        let tick = self.arena.config().tick_seconds();
        self.tick_accumulator += dt as f64;
        let mut ran = 0;
        while self.tick_accumulator >= tick {
            self.tick_accumulator -= tick;
            let report = self.arena.step();
            for (fireball, target) in &report.hits {
                tracing::info!(%fireball, %target, "target destroyed");
            }
            ran += 1;
        }
        for event in self.arena.drain_events() {
            tracing::trace!(?event, "arena event");
        }
        ran
    }
}

impl Demo for TargetsDemo {
    fn title(&self) -> &'static str {
        "Range: targets"
    }

    fn setup(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> anyhow::Result<()> {
        self.camera.aspect = width as f32 / height.max(1) as f32;
        self.renderer = Some(ArenaRenderer::new(device, queue, format, width, height)?);
        Ok(())
    }

    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.camera.aspect = width as f32 / height.max(1) as f32;
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(device, width, height);
        }
    }

    fn update(&mut self, dt: f32) {
        let intent = Action::Move(self.movement());
        if !intent.is_noop() {
            self.apply(intent, dt);
        }
        self.advance_arena(dt);
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) -> Action {
        if !pressed {
            self.keys_held.remove(&key);
            return Action::Noop;
        }
        self.keys_held.insert(key);
        match key {
            KeyCode::Escape => Action::Quit,
            _ => Action::Noop,
        }
    }

    fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => {
                if self.fire.update(pressed) {
                    self.apply(Action::Fire, 0.0);
                }
            }
            MouseButton::Right => self.looking = pressed,
            _ => {}
        }
    }

    fn handle_mouse_motion(&mut self, dx: f32, dy: f32) {
        if self.looking {
            self.apply(Action::Look { dx, dy }, 0.0);
        }
    }

    fn wants_cursor_grab(&self) -> bool {
        self.looking
    }

    fn render(&self, device: &wgpu::Device, queue: &wgpu::Queue, view: &wgpu::TextureView) {
        if let Some(renderer) = &self.renderer {
            renderer.render(device, queue, view, &self.camera, &self.arena);
        }
    }

    fn draw_ui(&mut self, ctx: &egui::Context) {
        let summary = self.arena.summary();
        let accuracy = if summary.stats.shots == 0 {
            0.0
        } else {
            summary.stats.hits as f64 / summary.stats.shots as f64 * 100.0
        };
        egui::Window::new("Range")
            .default_pos([10.0, 10.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Time: {:.1}s", summary.elapsed));
                ui.label(format!(
                    "Targets: {} / {}",
                    summary.targets,
                    self.arena.config().max_targets
                ));
                ui.label(format!("Fireballs: {}", summary.fireballs));
                ui.separator();
                ui.label(format!("Shots: {}", summary.stats.shots));
                ui.label(format!("Hits: {}", summary.stats.hits));
                ui.label(format!("Accuracy: {accuracy:.0}%"));
                ui.separator();
                ui.small("WASD move, right drag look, left click fire");
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> TargetsDemo {
        TargetsDemo::new(ArenaConfig::default()).unwrap()
    }

    #[test]
    fn left_click_fires_once_per_press() {
        let mut d = demo();
        d.handle_mouse_button(MouseButton::Left, true);
        d.handle_mouse_button(MouseButton::Left, true);
        assert_eq!(d.arena.fireballs().len(), 1);
        d.handle_mouse_button(MouseButton::Left, false);
        d.handle_mouse_button(MouseButton::Left, true);
        assert_eq!(d.arena.fireballs().len(), 2);
        assert_eq!(d.arena.stats().shots, 2);
    }

    #[test]
    fn fireball_leaves_along_camera_forward() {
        let mut d = demo();
        d.handle_mouse_button(MouseButton::Left, true);
        let fb = &d.arena.fireballs()[0];
        assert_eq!(fb.origin(), d.camera.position);
        assert!(fb.direction().abs_diff_eq(d.camera.forward(), 1e-6));
    }

    #[test]
    fn escape_quits() {
        let mut d = demo();
        assert_eq!(d.handle_key(KeyCode::Escape, true), Action::Quit);
        assert_eq!(d.handle_key(KeyCode::KeyW, true), Action::Noop);
    }

    #[test]
    fn held_keys_build_movement() {
        let mut d = demo();
        d.handle_key(KeyCode::KeyW, true);
        d.handle_key(KeyCode::KeyD, true);
        assert_eq!(d.movement(), Vec3::new(1.0, 0.0, 1.0));
        d.handle_key(KeyCode::KeyW, false);
        assert_eq!(d.movement(), Vec3::new(1.0, 0.0, 0.0));
        d.handle_key(KeyCode::ShiftLeft, true);
        assert_eq!(d.movement(), Vec3::new(SPRINT_MULTIPLIER, 0.0, 0.0));
    }

    #[test]
    fn look_only_while_right_button_held() {
        let mut d = demo();
        let yaw = d.camera.yaw;
        d.handle_mouse_motion(100.0, 0.0);
        assert_eq!(d.camera.yaw, yaw);
        d.handle_mouse_button(MouseButton::Right, true);
        assert!(d.wants_cursor_grab());
        d.handle_mouse_motion(100.0, 0.0);
        assert!(d.camera.yaw > yaw);
    }

    #[test]
    fn accumulator_runs_fixed_ticks() {
        let mut d = demo();
        assert_eq!(d.advance_arena(0.5 / 60.0), 0);
        // Two halves make one tick; allow a rounding miss.
        let ran = d.advance_arena(0.5 / 60.0 + 1e-6);
        assert_eq!(ran, 1);
        assert_eq!(d.advance_arena(1.0), 60);
        assert_eq!(d.arena.tick(), 61);
    }

    #[test]
    fn release_after_ui_swallowed_press_rearms_fire() {
        let mut d = demo();
        // The press went to the UI; only the release reaches the demo.
        d.handle_mouse_button(MouseButton::Left, false);
        d.handle_mouse_button(MouseButton::Left, true);
        assert_eq!(d.arena.stats().shots, 1);
        d.handle_mouse_button(MouseButton::Left, false);
        d.handle_mouse_button(MouseButton::Left, true);
        assert_eq!(d.arena.stats().shots, 2);
    }

    #[test]
    fn released_key_stops_movement() {
        let mut d = demo();
        d.handle_key(KeyCode::KeyW, true);
        d.handle_key(KeyCode::KeyW, false);
        assert_eq!(d.movement(), Vec3::ZERO);
        let start = d.camera.position;
        d.update(0.1);
        assert_eq!(d.camera.position, start);
    }

    #[test]
    fn event_log_stays_bounded() {
        let mut d = demo();
        for frame in 0..36_000 {
            if frame % 50 == 0 {
                d.handle_mouse_button(MouseButton::Left, true);
                d.handle_mouse_button(MouseButton::Left, false);
            }
            d.update(0.1);
            assert!(d.arena.events().is_empty());
        }
        assert!(d.arena.tick() > 200_000);
        assert_eq!(d.arena.stats().shots, 720);
    }

    #[test]
    fn update_moves_camera_without_gpu() {
        let mut d = demo();
        let start = d.camera.position;
        d.handle_key(KeyCode::KeyW, true);
        d.update(0.1);
        assert!(d.camera.position.z < start.z);
        assert!(d.arena.tick() >= 5);
    }
}
