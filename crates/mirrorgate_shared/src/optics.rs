//! Snell's law helpers for bending a watched position across a surface with
//! different optical densities on each side. Angles are in radians.

use glam::{Quat, Vec3};

/// Below this distance from the middle point, or from the normal line, the
/// incidence plane is undefined and no bending is applied.
pub const DEGENERATE_EPSILON: f32 = 1.0e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Refraction {
    Refracted(f32),
    TotalInternalReflection,
}

impl Refraction {
    pub fn angle(self) -> Option<f32> {
        match self {
            Self::Refracted(angle) => Some(angle),
            Self::TotalInternalReflection => None,
        }
    }
}

/// Angle between the ray from `position` to `middle` and the surface normal
/// line, in `[0, PI/2]`. Degenerate input yields `0`.
pub fn incidence_angle(position: Vec3, middle: Vec3, normal: Vec3) -> f32 {
    let ray = middle - position;
    let normal = normal.normalize_or_zero();
    if ray.length() <= DEGENERATE_EPSILON || normal == Vec3::ZERO {
        return 0.0;
    }

    ray.normalize().dot(normal).abs().clamp(0.0, 1.0).acos()
}

/// Solves `n1 * sin(incidence) = n2 * sin(refraction)`.
pub fn refraction_angle(incidence: f32, n1: f32, n2: f32) -> Refraction {
    let sine = n1 / n2 * incidence.sin();
    if !sine.is_finite() || sine.abs() > 1.0 {
        return Refraction::TotalInternalReflection;
    }
    Refraction::Refracted(sine.asin())
}

/// Rotation about the middle point, within the incidence plane, that turns
/// `position` towards the surface normal on its own side by `angle`.
pub fn bend_rotation(position: Vec3, middle: Vec3, normal: Vec3, angle: f32) -> Option<Quat> {
    let offset = position - middle;
    let normal = normal.normalize_or_zero();
    let side_normal = if offset.dot(normal) >= 0.0 {
        normal
    } else {
        -normal
    };

    let axis = offset.cross(side_normal);
    if axis.length() <= DEGENERATE_EPSILON || !angle.is_finite() {
        return None;
    }
    Some(Quat::from_axis_angle(axis.normalize(), angle))
}

pub fn rotate_about_point(point: Vec3, pivot: Vec3, rotation: Quat) -> Vec3 {
    pivot + rotation * (point - pivot)
}
