use glam::{Mat4, Vec3, Vec4};

/// Plane that discards everything on the side opposite its normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlane {
    pub normal: Vec3,
    pub point: Vec3,
}

impl ClipPlane {
    pub fn new(normal: Vec3, point: Vec3) -> Self {
        Self { normal, point }
    }

    pub fn to_vec4(&self) -> Vec4 {
        self.normal.extend(-self.normal.dot(self.point))
    }

    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point - self.point)
    }
}

/// Replaces the near plane of `projection` with `plane`, for backends without
/// a user clip plane. Expects glam's zero-to-one depth range.
pub fn oblique_projection(projection: Mat4, view: Mat4, plane: &ClipPlane) -> Mat4 {
    let clip_plane_camera = view.inverse().transpose() * plane.to_vec4();
    let q = projection.inverse()
        * Vec4::new(
            clip_plane_camera.x.signum(),
            clip_plane_camera.y.signum(),
            1.0,
            1.0,
        );
    let denom = clip_plane_camera.dot(q);
    if denom.abs() < 1e-5 || !denom.is_finite() {
        return projection;
    }

    let c = clip_plane_camera / denom;
    let mut m = projection.to_cols_array_2d();
    m[0][2] = c.x;
    m[1][2] = c.y;
    m[2][2] = c.z;
    m[3][2] = c.w;
    Mat4::from_cols_array_2d(&m)
}
