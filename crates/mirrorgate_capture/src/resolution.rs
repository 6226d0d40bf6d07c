use glam::{UVec2, Vec3};

use crate::settings::CaptureSettings;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameContext {
    pub viewer_location: Option<Vec3>,
    pub viewport: Option<UVec2>,
}

impl FrameContext {
    pub fn new(viewer_location: Vec3, viewport: UVec2) -> Self {
        Self {
            viewer_location: Some(viewer_location),
            viewport: Some(viewport),
        }
    }

    pub fn distance_to(&self, location: Vec3) -> Option<f32> {
        self.viewer_location.map(|viewer| viewer.distance(location))
    }

    pub fn viewport_cap(&self) -> Option<u32> {
        let viewport = self.viewport?;
        let smaller = viewport.x.min(viewport.y);
        if smaller == 0 {
            return None;
        }
        smaller.checked_next_power_of_two()
    }
}

pub fn interpolated_render_size(settings: &CaptureSettings, distance: f32) -> u32 {
    let span = settings.far_distance - settings.near_distance;
    let mut alpha = ((distance - settings.near_distance) / span).clamp(0.0, 1.0);
    if alpha.is_nan() {
        alpha = 0.0;
    }

    let max = settings.max_texture_size as f32;
    let min = settings.min_texture_size as f32;
    (max + (min - max) * alpha) as u32
}

pub fn calculate_render_size(settings: &CaptureSettings, distance: f32, frame: &FrameContext) -> u32 {
    let size = interpolated_render_size(settings, distance)
        .max(1)
        .next_power_of_two();

    match frame.viewport_cap() {
        Some(cap) => size.max(settings.min_texture_size).min(cap),
        None => size,
    }
}
