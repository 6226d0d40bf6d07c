use std::f32::consts::PI;

use glam::Quat;

use crate::surface::PortalSurface;
use crate::transform::Transform;

/// Rotation that maps `source`-relative directions to `destination`-relative ones.
/// The half turn about local up makes the two surfaces face each other.
pub fn paired_rotation(source: &PortalSurface, destination: &PortalSurface) -> Quat {
    (destination.rotation * Quat::from_rotation_y(PI) * source.rotation.inverse()).normalize()
}

/// Re-expresses `transform` relative to `source`, then places it at the same
/// relative pose behind `destination`.
pub fn compute_paired_transform(
    transform: &Transform,
    source: &PortalSurface,
    destination: &PortalSurface,
) -> Transform {
    let rotation = paired_rotation(source, destination);
    Transform {
        translation: destination.location + rotation * (transform.translation - source.location),
        rotation: (rotation * transform.rotation).normalize(),
        scale: transform.scale,
    }
}
