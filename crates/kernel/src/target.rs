use glam::{Mat4, Vec3};
use rand::Rng;
use range_common::{EntityId, Skin, inverse_distance_scale, spin_model, wrap_angle};
use std::f32::consts::TAU;

/// A spherical target floating around the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: EntityId,
    pub position: Vec3,
    pub skin: Skin,
    spin: f32,
}

impl Target {
    pub fn new(id: EntityId, position: Vec3) -> Self {
        Self {
            id,
            position,
            skin: Skin::Gold,
            spin: 0.0,
        }
    }

    /// Place a target uniformly in angle on a shell `[r_min, r_max]` around the origin.
    pub fn random<R: Rng>(id: EntityId, rng: &mut R, r_min: f32, r_max: f32) -> Self {
        let r = if r_max > r_min {
            rng.gen_range(r_min..=r_max)
        } else {
            r_min
        };
        let phi = rng.gen_range(0.0..TAU);
        let psi = rng.gen_range(0.0..TAU);
        let position = Vec3::new(phi.cos() * psi.sin() * r, phi.sin() * r, phi.cos() * psi.cos() * r);
        Self::new(id, position)
    }

    /// Current spin angle, always within `[-π, π)`.
    pub fn spin(&self) -> f32 {
        self.spin
    }

    pub fn advance(&mut self, spin_step: f32) {
        self.spin = wrap_angle(self.spin + spin_step);
    }

    /// Shrink factor relative to the origin.
    pub fn scale(&self) -> f32 {
        inverse_distance_scale(self.position.length())
    }

    pub fn model_matrix(&self) -> Mat4 {
        spin_model(self.position, self.spin, self.scale())
    }

    /// Strictly closer than `radius` to `point`.
    pub fn is_close_to(&self, point: Vec3, radius: f32) -> bool {
        self.position.distance(point) < radius
    }
}
