use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Fly camera with position, yaw, pitch, and projection parameters.
/// Camera motion is NOT part of the arena ... it lives outside the kernel boundary.
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub speed: f32,
    pub sensitivity: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            yaw: -90.0_f32.to_radians(),
            pitch: 0.0,
            fov: 45.0_f32.to_radians(),
            aspect: 4.0 / 3.0,
            near: 0.1,
            far: 100.0,
            speed: 3.0,
            sensitivity: 0.005,
        }
    }
}

impl FlyCamera {
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Move along the camera frame: `local.x` right, `local.y` world up,
    /// `local.z` forward. `local` is a unit-ish intent, scaled by speed and dt.
    pub fn translate_local(&mut self, local: Vec3, dt: f32) {
        let delta = self.right() * local.x + Vec3::Y * local.y + self.forward() * local.z;
        self.position += delta * self.speed * dt;
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch -= dy * self.sensitivity;
        self.pitch = self.pitch.clamp(
            -89.0_f32.to_radians(),
            89.0_f32.to_radians(),
        );
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Axis the orbit camera is currently circling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitAxis {
    /// Eye moves in the XZ plane.
    Y,
    /// Eye moves in the YZ plane.
    X,
}

/// Camera that circles the origin: one full turn around Y, then one around X,
/// then starts over.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub radius: f32,
    /// Current orbit angle. Kept in `[π/2, 4π + π/2)`.
    pub angle: f32,
    /// Angle added per tick.
    pub step: f32,
    /// Offset subtracted from the eye position.
    pub bias: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius: 2.0,
            angle: FRAC_PI_2,
            step: PI / 360.0,
            bias: Vec3::ZERO,
            fov: 45.0_f32.to_radians(),
            aspect: 16.0 / 10.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl OrbitCamera {
    const Y_PHASE_END: f32 = TAU + FRAC_PI_2;
    const CYCLE_END: f32 = 2.0 * TAU + FRAC_PI_2;

    pub fn axis(&self) -> OrbitAxis {
        if self.angle < Self::Y_PHASE_END {
            OrbitAxis::Y
        } else {
            OrbitAxis::X
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (c, s) = (self.radius * self.angle.cos(), self.radius * self.angle.sin());
        let eye = match self.axis() {
            OrbitAxis::Y => Vec3::new(c, 0.0, s),
            OrbitAxis::X => Vec3::new(0.0, c, s),
        };
        eye - self.bias
    }

    pub fn advance(&mut self) {
        self.angle += self.step;
        if self.angle >= Self::CYCLE_END {
            self.angle -= 2.0 * TAU;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.eye();
        let dir = (-eye).normalize_or_zero();
        // look_at degenerates when looking straight along the up vector.
        let up = if dir.dot(Vec3::Y).abs() > 0.999 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(eye, Vec3::ZERO, up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = FlyCamera::default();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 5.0));
        // Looks down -Z at the origin.
        assert!(cam.forward().abs_diff_eq(-Vec3::Z, 1e-6));
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn camera_movement() {
        let mut cam = FlyCamera::default();
        let start = cam.position;
        cam.translate_local(Vec3::Z, 1.0);
        assert!(cam.position.abs_diff_eq(start - Vec3::Z * 3.0, 1e-5));
        cam.translate_local(Vec3::X, 1.0);
        assert!(cam.position.x > 2.9);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = FlyCamera::default();
        cam.rotate(0.0, -1.0e5);
        assert!(cam.pitch <= 89.0_f32.to_radians());
        assert!(cam.forward().is_finite());
    }

    #[test]
    fn orbit_starts_on_positive_z() {
        let cam = OrbitCamera::default();
        assert_eq!(cam.axis(), OrbitAxis::Y);
        assert!(cam.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-5));
    }

    #[test]
    fn orbit_switches_axis_then_repeats() {
        let mut cam = OrbitCamera::default();
        let mut switched_at = None;
        let mut wrapped_at = None;
        for i in 1..=1500 {
            let before = cam.angle;
            cam.advance();
            if switched_at.is_none() && cam.axis() == OrbitAxis::X {
                switched_at = Some(i);
            }
            if wrapped_at.is_none() && cam.angle < before {
                wrapped_at = Some(i);
                assert_eq!(cam.axis(), OrbitAxis::Y);
                assert!((cam.angle - FRAC_PI_2).abs() < 1e-2);
            }
        }
        let switched_at = switched_at.unwrap();
        assert!((719..=721).contains(&switched_at), "{switched_at}");
        // A full cycle is 4π at π/360 per tick.
        let wrapped_at = wrapped_at.unwrap();
        assert!((1439..=1441).contains(&wrapped_at), "{wrapped_at}");
    }

    #[test]
    fn orbit_keeps_radius_and_finite_view() {
        let mut cam = OrbitCamera::default();
        for _ in 0..1440 {
            assert!((cam.eye().length() - 2.0).abs() < 1e-4);
            assert!(cam.view_projection().is_finite());
            cam.advance();
        }
    }

    #[test]
    fn orbit_bias_shifts_eye() {
        let cam = OrbitCamera {
            bias: Vec3::new(1.0, 0.0, 0.0),
            ..OrbitCamera::default()
        };
        assert!((cam.eye().x + 1.0).abs() < 1e-5);
    }
}
