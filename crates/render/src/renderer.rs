use glam::Vec3;
use range_kernel::Arena;
use std::fmt::Write;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            fov_degrees: 45.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads arena state and a view configuration, then produces
/// output. It never mutates the arena.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given arena and view.
    fn render(&self, arena: &Arena, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable dump of the arena.
///
/// Used by the CLI and in tests of the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, arena: &Arena, view: &RenderView) -> String {
        let s = arena.summary();
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "=== Arena (tick={}, t={:.2}s) ===",
            s.tick, s.elapsed
        );
        let _ = writeln!(
            out,
            "Targets: {}  Fireballs: {}  Shots: {}  Hits: {}",
            s.targets, s.fireballs, s.stats.shots, s.stats.hits
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        );

        for t in arena.targets() {
            let p = t.position;
            let _ = writeln!(
                out,
                "  target {} pos=({:.2}, {:.2}, {:.2}) spin={:.3} scale={:.3}",
                t.id,
                p.x,
                p.y,
                p.z,
                t.spin(),
                t.scale()
            );
        }
        for f in arena.fireballs() {
            let p = f.position();
            let _ = writeln!(
                out,
                "  fireball {} pos=({:.2}, {:.2}, {:.2}) dist={:.2} scale={:.3}",
                f.id,
                p.x,
                p.y,
                p.z,
                f.distance(),
                f.scale()
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use range_kernel::ArenaConfig;

    #[test]
    fn debug_renderer_empty_arena() {
        let arena = Arena::new(ArenaConfig::default()).unwrap();
        let output = DebugTextRenderer::new().render(&arena, &RenderView::default());

        assert!(output.contains("tick=0"));
        assert!(output.contains("Targets: 0"));
        assert!(!output.contains("target #"));
    }

    #[test]
    fn debug_renderer_lists_entities() {
        let mut arena = Arena::new(ArenaConfig::default()).unwrap();
        arena.place_target(Vec3::new(1.0, 2.0, 3.0));
        arena.launch(Vec3::ZERO, Vec3::X).unwrap();

        let output = DebugTextRenderer::new().render(&arena, &RenderView::default());

        assert!(output.contains("Targets: 1  Fireballs: 1  Shots: 1"));
        assert!(output.contains("target #0 pos=(1.00, 2.00, 3.00)"));
        assert!(output.contains("fireball #1"));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 45.0);
        assert_eq!(view.target, Vec3::ZERO);
    }
}
