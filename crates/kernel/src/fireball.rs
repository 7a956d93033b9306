use glam::{Mat4, Vec3};
use range_common::{EntityId, Skin, inverse_distance_scale, spin_model, wrap_angle};

use crate::error::ArenaError;

/// A spinning projectile flying in a straight line from its launch point.
///
/// Like targets, its size is `1 / |position|`. Launched from the origin it
/// only ever shrinks; launched from elsewhere it can grow while passing
/// the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Fireball {
    pub id: EntityId,
    pub skin: Skin,
    origin: Vec3,
    direction: Vec3,
    distance: f32,
    spin: f32,
}

impl Fireball {
    /// Launch from `origin` along `direction` (normalized here).
    pub fn launch(
        id: EntityId,
        origin: Vec3,
        direction: Vec3,
        start_distance: f32,
    ) -> Result<Self, ArenaError> {
        if !origin.is_finite() {
            return Err(ArenaError::InvalidOrigin(origin.to_array()));
        }
        let direction = direction
            .try_normalize()
            .ok_or(ArenaError::InvalidDirection(direction.to_array()))?;
        Ok(Self {
            id,
            skin: Skin::Lava,
            origin,
            direction,
            distance: start_distance,
            spin: 0.0,
        })
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit flight direction.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Distance travelled from the launch point.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn spin(&self) -> f32 {
        self.spin
    }

    pub fn position(&self) -> Vec3 {
        self.origin + self.direction * self.distance
    }

    /// Shrink factor relative to the origin.
    pub fn scale(&self) -> f32 {
        inverse_distance_scale(self.position().length())
    }

    pub fn is_visible(&self, min_scale: f32) -> bool {
        self.scale() >= min_scale
    }

    pub fn advance(&mut self, distance_step: f32, spin_step: f32) {
        self.distance += distance_step;
        self.spin = wrap_angle(self.spin + spin_step);
    }

    pub fn model_matrix(&self) -> Mat4 {
        spin_model(self.position(), self.spin, self.scale())
    }
}
