use glam::{Mat4, Quat, Vec3};
use std::f32::consts::{PI, TAU};

/// Wrap an angle in radians into `[-π, π)`.
///
/// Works for any finite input, including values several turns away from
/// zero. Non-finite input is returned unchanged.
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can round up to TAU for inputs just below a multiple of it.
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

/// `1 / distance`, the shrink factor that makes far sprites look smaller.
pub fn inverse_distance_scale(distance: f32) -> f32 {
    if distance == 0.0 {
        f32::INFINITY
    } else {
        1.0 / distance
    }
}

/// Compose `translate(position) * rotate_z(angle) * scale(uniform)`.
pub fn spin_model(position: Vec3, angle: f32, scale: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(Vec3::splat(scale), Quat::from_rotation_z(angle), position)
}
