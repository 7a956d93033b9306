//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderer cannot mutate arena state.
//! - Render state derives from arena state and view.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "range-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
