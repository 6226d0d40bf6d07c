use glam::{EulerRot, Quat};
use mirrorgate_shared::clip::ClipPlane;
use mirrorgate_shared::optics::{
    bend_rotation, incidence_angle, refraction_angle, rotate_about_point, Refraction,
};
use mirrorgate_shared::pairing::compute_paired_transform;
use mirrorgate_shared::surface::PortalSurface;
use mirrorgate_shared::transform::Transform;
use tracing::trace;

use crate::camera::CameraType;
use crate::settings::CaptureSettings;

#[derive(Debug, Clone, Copy)]
pub struct CaptureContext<'a> {
    pub camera_type: CameraType,
    pub exit_in_front: bool,
    pub refractive_index_1: f32,
    pub refractive_index_2: f32,
    pub owner: &'a PortalSurface,
    pub linked: &'a PortalSurface,
    pub settings: &'a CaptureSettings,
}

impl CaptureContext<'_> {
    pub fn refracts(&self) -> bool {
        self.camera_type != CameraType::Mirror && self.refractive_index_1 != self.refractive_index_2
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSolution {
    pub transform: Transform,
    pub total_reflection: bool,
}

/// The two computations a camera variant may replace. Both have working defaults.
pub trait CaptureModel {
    fn view_transform(&self, ctx: &CaptureContext<'_>, watched: &Transform) -> ViewSolution {
        refracted_view_transform(ctx, watched)
    }

    fn clip_plane(&self, ctx: &CaptureContext<'_>) -> ClipPlane {
        surface_clip_plane(ctx)
    }
}

/// Straight portal mapping with Snell refraction between the two indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnellModel;

impl CaptureModel for SnellModel {}

pub fn refracted_view_transform(ctx: &CaptureContext<'_>, watched: &Transform) -> ViewSolution {
    let mut modified = *watched;
    let mut total_reflection = false;

    if ctx.refracts() {
        let middle = ctx.owner.middle_point();
        let normal = ctx.owner.forward();
        let position = modified.translation;

        let incidence = incidence_angle(position, middle, normal);
        match refraction_angle(incidence, ctx.refractive_index_1, ctx.refractive_index_2) {
            Refraction::TotalInternalReflection => {
                trace!("Total internal reflection at incidence {incidence:.3} rad");
                total_reflection = true;
            }
            Refraction::Refracted(refraction) => {
                if let Some(rotation) =
                    bend_rotation(position, middle, normal, incidence - refraction)
                {
                    modified.translation = rotate_about_point(position, middle, rotation);
                    // Only the yaw part turns the camera; pitch and roll would tilt the horizon.
                    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
                    modified.rotation = (Quat::from_rotation_y(yaw) * modified.rotation).normalize();
                }
            }
        }
    }

    ViewSolution {
        transform: compute_paired_transform(&modified, ctx.owner, ctx.linked),
        total_reflection,
    }
}

pub fn surface_clip_plane(ctx: &CaptureContext<'_>) -> ClipPlane {
    let target = if ctx.camera_type == CameraType::Portal {
        ctx.linked
    } else {
        ctx.owner
    };

    let flip = ctx.camera_type == CameraType::Mirror || ctx.exit_in_front;
    let normal = if flip {
        target.forward()
    } else {
        -target.forward()
    };

    ClipPlane::new(
        normal,
        target.location + ctx.settings.clip_plane_offset * normal,
    )
}
