use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use mirrorgate_shared::clip::{oblique_projection, ClipPlane};
use mirrorgate_shared::transform::Transform;

use crate::render_target::RenderTarget;

#[derive(Debug, Clone, Copy)]
pub struct CaptureRequest<'a> {
    pub transform: Transform,
    pub projection: Mat4,
    pub clip_plane: Option<ClipPlane>,
    pub render_target: &'a RenderTarget,
    pub render_target_generation: u64,
}

impl CaptureRequest<'_> {
    pub fn view_matrix(&self) -> Mat4 {
        self.transform.view_matrix()
    }

    /// Projection with its near plane moved onto the clip plane, if there is one.
    pub fn clipped_projection(&self) -> Mat4 {
        match &self.clip_plane {
            Some(plane) => oblique_projection(self.projection, self.view_matrix(), plane),
            None => self.projection,
        }
    }

    pub fn uniform(&self) -> CaptureUniform {
        let clip_plane = self
            .clip_plane
            .map(|plane| plane.to_vec4().to_array())
            .unwrap_or([0.0; 4]);
        CaptureUniform {
            view_proj: (self.projection * self.view_matrix()).to_cols_array_2d(),
            clip_plane,
            camera_position: self.transform.translation.extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CaptureUniform {
    pub view_proj: [[f32; 4]; 4],
    pub clip_plane: [f32; 4],
    pub camera_position: [f32; 4],
}

/// The renderer side of a capture: rasterize the scene as described by the request.
pub trait CaptureBackend {
    fn capture(&mut self, request: &CaptureRequest<'_>);
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRecord {
    pub transform: Transform,
    pub projection: Mat4,
    pub clip_plane: Option<ClipPlane>,
    pub target_name: String,
    pub target_size: u32,
    pub target_generation: u64,
}

/// Backend that renders nothing and remembers every request it was given.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub records: Vec<CaptureRecord>,
}

impl RecordingBackend {
    pub fn last(&self) -> Option<&CaptureRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CaptureBackend for RecordingBackend {
    fn capture(&mut self, request: &CaptureRequest<'_>) {
        self.records.push(CaptureRecord {
            transform: request.transform,
            projection: request.projection,
            clip_plane: request.clip_plane,
            target_name: request.render_target.name.clone(),
            target_size: request.render_target.size,
            target_generation: request.render_target_generation,
        });
    }
}
