use glam::Vec3;

/// A high-level action produced by the desktop front end.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Launch a fireball from the camera.
    Fire,
    /// Turn the camera by a pointer delta in pixels.
    Look { dx: f32, dy: f32 },
    /// Move the camera in its local frame: x right, y up, z forward.
    Move(Vec3),
    /// Close the window.
    Quit,
    /// No-op (used for input mapping that hasn't been bound yet).
    Noop,
}

impl Action {
    /// Actions that leave the world untouched.
    pub fn is_noop(&self) -> bool {
        match self {
            Action::Noop => true,
            Action::Look { dx, dy } => *dx == 0.0 && *dy == 0.0,
            Action::Move(v) => *v == Vec3::ZERO,
            _ => false,
        }
    }
}
