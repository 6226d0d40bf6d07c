use glam::Mat4;
use mirrorgate_shared::clip::ClipPlane;
use mirrorgate_shared::surface::{Actor, ActorId, PortalSurface, SurfaceId, SurfaceWorld};
use mirrorgate_shared::transform::Transform;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::backend::{CaptureBackend, CaptureRequest};
use crate::model::{CaptureContext, CaptureModel, SnellModel};
use crate::render_target::{RenderTarget, RenderTargetSlot};
use crate::resolution::{calculate_render_size, FrameContext};
use crate::settings::CaptureSettings;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraType {
    #[default]
    Portal,
    Mirror,
    PortalStatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Captured,
    SkippedNoOwner,
}

/// Virtual camera attached to a portal or mirror surface. Once per frame it
/// places itself behind the linked surface, clips away what lies in front of
/// that surface and asks the backend for one capture.
#[derive(Debug)]
pub struct PortalCamera<M = SnellModel> {
    attach_parent: ActorId,
    camera_type: CameraType,
    linked_portal: Option<SurfaceId>,
    owner_portal: Option<SurfaceId>,
    exit_in_front: bool,
    weight: f32,
    refractive_index_1: f32,
    refractive_index_2: f32,
    is_total_reflection: bool,
    render_target: RenderTargetSlot,
    cached_render_size: u32,
    last_distance_to_camera: f32,
    world_transform: Transform,
    clip_plane: Option<ClipPlane>,
    configured: bool,
    settings: CaptureSettings,
    model: M,
}

impl PortalCamera<SnellModel> {
    pub fn new(attach_parent: ActorId) -> Self {
        Self::with_settings(attach_parent, CaptureSettings::default())
    }

    pub fn with_settings(attach_parent: ActorId, settings: CaptureSettings) -> Self {
        Self::with_model(attach_parent, settings, SnellModel)
    }
}

impl<M: CaptureModel> PortalCamera<M> {
    pub fn with_model(attach_parent: ActorId, settings: CaptureSettings, model: M) -> Self {
        Self {
            attach_parent,
            camera_type: CameraType::Portal,
            linked_portal: None,
            owner_portal: None,
            exit_in_front: false,
            weight: 0.0,
            refractive_index_1: 1.0,
            refractive_index_2: 1.0,
            is_total_reflection: false,
            render_target: RenderTargetSlot::default(),
            cached_render_size: 0,
            last_distance_to_camera: 0.0,
            world_transform: Transform::IDENTITY,
            clip_plane: None,
            configured: false,
            settings: settings.sanitize(),
            model,
        }
    }

    /// Sets the camera's identity. Only the first call takes effect.
    pub fn init(
        &mut self,
        camera_type: CameraType,
        linked_portal: Option<SurfaceId>,
        exit_in_front: bool,
        weight: f32,
    ) {
        if self.configured {
            warn!(
                "Portal camera on {:?} was already initialized; ignoring repeated init",
                self.attach_parent
            );
            return;
        }

        self.camera_type = camera_type;
        self.linked_portal = linked_portal;
        self.exit_in_front = exit_in_front;
        self.weight = weight;
        self.configured = true;
    }

    pub fn set_refractive_indices(&mut self, camera_side: f32, linked_side: f32) {
        self.refractive_index_1 = camera_side;
        self.refractive_index_2 = linked_side;
    }

    pub fn begin_play(&mut self, world: &SurfaceWorld, frame: &FrameContext) {
        if self.resolve_owner(world) {
            if let Some(owner) = self.owner_portal.and_then(|id| world.surface(id)) {
                self.world_transform = owner.pose();
            }
        }

        if self.camera_type != CameraType::Portal {
            self.exit_in_front = false;
        }
        if self.weight.is_nan() || self.weight < 0.0 {
            self.weight = 0.0;
        }
        self.apply_mirror_link();

        self.generate_default_render_target(frame);
    }

    pub fn resolve_owner(&mut self, world: &SurfaceWorld) -> bool {
        match world.actor(self.attach_parent) {
            Some(Actor::Surface(_)) => {
                self.owner_portal = Some(self.attach_parent);
                self.apply_mirror_link();
                debug!("Portal camera bound to surface {:?}", self.attach_parent);
                true
            }
            _ => false,
        }
    }

    pub fn is_owner_valid(&mut self, world: &SurfaceWorld) -> bool {
        if let Some(owner) = self.owner_portal {
            if world.surface(owner).is_some() {
                return true;
            }
            debug!("Owner surface {owner:?} is gone; resolving again");
            self.owner_portal = None;
        }
        self.resolve_owner(world)
    }

    fn apply_mirror_link(&mut self) {
        if self.camera_type == CameraType::Mirror && self.linked_portal.is_none() {
            self.linked_portal = self.owner_portal;
        }
    }

    fn surfaces<'w>(&self, world: &'w SurfaceWorld) -> Option<(&'w PortalSurface, &'w PortalSurface)> {
        let owner = world.surface(self.owner_portal?)?;
        let linked = world.surface(self.linked_portal?)?;
        Some((owner, linked))
    }

    fn context<'a>(&'a self, owner: &'a PortalSurface, linked: &'a PortalSurface) -> CaptureContext<'a> {
        CaptureContext {
            camera_type: self.camera_type,
            exit_in_front: self.exit_in_front,
            refractive_index_1: self.refractive_index_1,
            refractive_index_2: self.refractive_index_2,
            owner,
            linked,
            settings: &self.settings,
        }
    }

    /// Places the capture behind the linked surface. `None` when the owner or
    /// the linked surface cannot be found.
    pub fn compute_view_transform(
        &mut self,
        world: &SurfaceWorld,
        watched: &Transform,
    ) -> Option<Transform> {
        if !self.is_owner_valid(world) {
            return None;
        }
        let (owner, linked) = self.surfaces(world)?;

        let solution = self.model.view_transform(&self.context(owner, linked), watched);
        self.is_total_reflection = solution.total_reflection;
        self.world_transform = solution.transform;
        Some(solution.transform)
    }

    pub fn compute_clip_plane(&mut self, world: &SurfaceWorld) -> Option<ClipPlane> {
        if !self.is_owner_valid(world) {
            return None;
        }
        let (owner, linked) = self.surfaces(world)?;

        let plane = self.model.clip_plane(&self.context(owner, linked));
        self.clip_plane = Some(plane);
        Some(plane)
    }

    pub fn calculate_render_size(&self, distance: f32, frame: &FrameContext) -> u32 {
        calculate_render_size(&self.settings, distance, frame)
    }

    pub fn update_render_target(&mut self, frame: &FrameContext) {
        let Some(distance) = frame.distance_to(self.world_transform.translation) else {
            trace!("No viewer this frame; keeping render target");
            return;
        };

        let desired = self.calculate_render_size(distance, frame);
        if desired.abs_diff(self.cached_render_size) > self.settings.resize_hysteresis {
            info!(
                "Resizing portal render target: {} -> {desired} (distance: {distance:.1})",
                self.cached_render_size
            );
            self.install_render_target(RenderTarget::resized(desired));
        }

        self.last_distance_to_camera = distance;
    }

    pub fn generate_default_render_target(&mut self, frame: &FrameContext) {
        let distance = if self.last_distance_to_camera != 0.0 {
            self.last_distance_to_camera
        } else {
            frame
                .distance_to(self.world_transform.translation)
                .unwrap_or(0.0)
        };

        let size = self.calculate_render_size(distance, frame);
        debug!("Allocating default portal render target {size}x{size}");
        self.install_render_target(RenderTarget::default_texture(size));
    }

    /// Drops the render target; the next `update` allocates a fresh one.
    pub fn invalidate_render_target(&mut self) {
        drop(self.render_target.take());
    }

    fn install_render_target(&mut self, target: RenderTarget) {
        let size = target.size;
        let previous = self.render_target.replace(target);
        self.cached_render_size = size;
        drop(previous);
    }

    pub fn update<B: CaptureBackend + ?Sized>(
        &mut self,
        world: &SurfaceWorld,
        frame: &FrameContext,
        backend: &mut B,
        watched: &Transform,
        projection: Mat4,
    ) -> FrameOutcome {
        if self.render_target.is_empty() {
            self.generate_default_render_target(frame);
        }
        let fallback_size = self.cached_render_size;

        if !self.is_owner_valid(world) {
            trace!(
                "Portal camera on {:?} has no owner surface; skipping capture",
                self.attach_parent
            );
            return FrameOutcome::SkippedNoOwner;
        }

        if self.compute_view_transform(world, watched).is_some() {
            self.compute_clip_plane(world);
        }

        let (render_target, render_target_generation) = self
            .render_target
            .get_or_insert_with(|| RenderTarget::default_texture(fallback_size));
        backend.capture(&CaptureRequest {
            transform: self.world_transform,
            projection,
            clip_plane: self.clip_plane,
            render_target,
            render_target_generation,
        });
        FrameOutcome::Captured
    }

    pub fn attach_parent(&self) -> ActorId {
        self.attach_parent
    }

    pub fn camera_type(&self) -> CameraType {
        self.camera_type
    }

    pub fn linked_portal(&self) -> Option<SurfaceId> {
        self.linked_portal
    }

    pub fn owner_portal(&self) -> Option<SurfaceId> {
        self.owner_portal
    }

    pub fn exit_in_front(&self) -> bool {
        self.exit_in_front
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn refractive_indices(&self) -> (f32, f32) {
        (self.refractive_index_1, self.refractive_index_2)
    }

    pub fn is_total_reflection(&self) -> bool {
        self.is_total_reflection
    }

    pub fn render_target(&self) -> Option<&RenderTarget> {
        self.render_target.get()
    }

    pub fn render_target_generation(&self) -> u64 {
        self.render_target.generation()
    }

    pub fn cached_render_size(&self) -> u32 {
        self.cached_render_size
    }

    pub fn last_distance_to_camera(&self) -> f32 {
        self.last_distance_to_camera
    }

    pub fn world_transform(&self) -> &Transform {
        &self.world_transform
    }

    pub fn clip_plane(&self) -> Option<ClipPlane> {
        self.clip_plane
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use glam::{Mat4, Quat, UVec2, Vec3};
    use mirrorgate_shared::clip::ClipPlane;
    use mirrorgate_shared::pairing::compute_paired_transform;
    use mirrorgate_shared::surface::{Actor, ActorId, PortalSurface, SurfaceId, SurfaceWorld};
    use mirrorgate_shared::transform::Transform;

    use super::{CameraType, FrameOutcome, PortalCamera};
    use crate::backend::RecordingBackend;
    use crate::model::{CaptureContext, CaptureModel};
    use crate::render_target::{DEFAULT_TARGET_NAME, RESIZED_TARGET_NAME};
    use crate::resolution::FrameContext;
    use crate::settings::CaptureSettings;

    fn portal_pair() -> (SurfaceWorld, SurfaceId, SurfaceId) {
        let mut world = SurfaceWorld::new();
        let a = world.spawn_surface(
            PortalSurface::new(Vec3::ZERO, Quat::IDENTITY).with_middle_offset(Vec3::Y),
        );
        let b = world.spawn_surface(
            PortalSurface::new(Vec3::new(40.0, 0.0, 0.0), Quat::from_rotation_y(PI / 2.0))
                .with_middle_offset(Vec3::Y),
        );
        world.link_pair(a, b);
        (world, a, b)
    }

    fn frame_at(viewer: Vec3) -> FrameContext {
        FrameContext::new(viewer, UVec2::new(1920, 1080))
    }

    fn projection() -> Mat4 {
        Mat4::perspective_rh(70.0_f32.to_radians(), 1.0, 0.1, 1000.0)
    }

    #[test]
    fn mirror_links_to_its_own_surface() {
        let (world, a, _) = portal_pair();
        let mut camera = PortalCamera::new(a);
        camera.init(CameraType::Mirror, None, false, 1.0);
        camera.begin_play(&world, &frame_at(Vec3::new(0.0, 0.0, 10.0)));

        assert_eq!(camera.owner_portal(), Some(a));
        assert_eq!(camera.linked_portal(), camera.owner_portal());
    }

    #[test]
    fn exit_in_front_only_survives_on_portals() {
        let (world, a, b) = portal_pair();
        let frame = frame_at(Vec3::ZERO);

        for camera_type in [CameraType::Mirror, CameraType::PortalStatic] {
            let mut camera = PortalCamera::new(a);
            camera.init(camera_type, Some(b), true, 1.0);
            camera.begin_play(&world, &frame);
            assert!(!camera.exit_in_front(), "{camera_type:?} kept exit_in_front");
        }

        let mut camera = PortalCamera::new(a);
        camera.init(CameraType::Portal, Some(b), true, 1.0);
        camera.begin_play(&world, &frame);
        assert!(camera.exit_in_front());
    }

    #[test]
    fn negative_weight_is_clamped_to_zero() {
        let (world, a, b) = portal_pair();
        let mut camera = PortalCamera::new(a);
        camera.init(CameraType::Portal, Some(b), false, -5.0);
        camera.begin_play(&world, &frame_at(Vec3::ZERO));
        assert_eq!(camera.weight(), 0.0);
    }

    #[test]
    fn repeated_init_is_ignored() {
        let (_, a, b) = portal_pair();
        let mut camera = PortalCamera::new(a);
        camera.init(CameraType::Portal, Some(b), false, 2.0);
        camera.init(CameraType::Mirror, None, true, 9.0);

        assert_eq!(camera.camera_type(), CameraType::Portal);
        assert_eq!(camera.linked_portal(), Some(b));
        assert_eq!(camera.weight(), 2.0);
    }

    #[test]
    fn begin_play_sizes_default_target_from_viewer_distance() {
        let (world, a, b) = portal_pair();
        let mut camera = PortalCamera::new(a);
        camera.init(CameraType::Portal, Some(b), false, 1.0);
        camera.begin_play(&world, &frame_at(Vec3::new(0.0, 0.0, 5000.0)));

        let target = camera.render_target().expect("default target");
        assert_eq!(target.name, DEFAULT_TARGET_NAME);
        assert_eq!(target.size, 256);
        assert_eq!(camera.cached_render_size(), 256);
    }

    #[test]
    fn small_size_changes_do_not_reallocate() {
        let (world, a, b) = portal_pair();
        let mut camera = PortalCamera::new(a);
        camera.init(CameraType::Portal, Some(b), false, 1.0);
        camera.begin_play(&world, &frame_at(Vec3::new(0.0, 0.0, 100.0)));
        let generation = camera.render_target_generation();

        camera.update_render_target(&frame_at(Vec3::new(0.0, 0.0, 250.0)));

        assert_eq!(camera.render_target_generation(), generation);
        assert_eq!(camera.cached_render_size(), 1024);
        assert_eq!(camera.last_distance_to_camera(), 250.0);

        let settings = CaptureSettings {
            resize_hysteresis: 512,
            ..CaptureSettings::default()
        };
        let mut camera = PortalCamera::with_settings(a, settings);
        camera.init(CameraType::Portal, Some(b), false, 1.0);
        camera.begin_play(&world, &frame_at(Vec3::new(0.0, 0.0, 100.0)));
        let generation = camera.render_target_generation();

        // 1024 -> 512 is exactly the threshold, which is not enough.
        camera.update_render_target(&frame_at(Vec3::new(0.0, 0.0, 1900.0)));
        assert_eq!(camera.render_target_generation(), generation);
        assert_eq!(camera.cached_render_size(), 1024);
        assert_eq!(camera.render_target().map(|t| t.size), Some(1024));
    }

    #[test]
    fn large_size_changes_reallocate_to_desired_size() {
        let (world, a, b) = portal_pair();
        let mut camera = PortalCamera::new(a);
        camera.init(CameraType::Portal, Some(b), false, 1.0);
        camera.begin_play(&world, &frame_at(Vec3::new(0.0, 0.0, 100.0)));
        let generation = camera.render_target_generation();

        camera.update_render_target(&frame_at(Vec3::new(0.0, 0.0, 3000.0)));

        assert_eq!(camera.render_target_generation(), generation + 1);
        assert_eq!(camera.cached_render_size(), 256);
        let target = camera.render_target().expect("resized target");
        assert_eq!(target.dimensions(), (256, 256));
        assert_eq!(target.name, RESIZED_TARGET_NAME);
    }

    #[test]
    fn missing_viewer_keeps_target_and_distance() {
        let (world, a, b) = portal_pair();
        let mut camera = PortalCamera::new(a);
        camera.init(CameraType::Portal, Some(b), false, 1.0);
        camera.begin_play(&world, &frame_at(Vec3::new(0.0, 0.0, 100.0)));
        camera.update_render_target(&frame_at(Vec3::new(0.0, 0.0, 120.0)));
        let generation = camera.render_target_generation();

        camera.update_render_target(&FrameContext::default());

        assert_eq!(camera.render_target_generation(), generation);
        assert_eq!(camera.last_distance_to_camera(), 120.0);
    }

    #[test]
    fn invalidated_target_is_regenerated_from_last_distance() {
        let (world, a, b) = portal_pair();
        let mut camera = PortalCamera::new(a);
        camera.init(CameraType::Portal, Some(b), false, 1.0);
        camera.begin_play(&world, &frame_at(Vec3::new(0.0, 0.0, 100.0)));
        camera.update_render_target(&frame_at(Vec3::new(0.0, 0.0, 3000.0)));
        camera.invalidate_render_target();
        assert!(camera.render_target().is_none());

        let mut backend = RecordingBackend::default();
        let outcome = camera.update(
            &world,
            &FrameContext::default(),
            &mut backend,
            &Transform::from_translation(Vec3::new(0.0, 1.0, 5.0)),
            projection(),
        );

        assert_eq!(outcome, FrameOutcome::Captured);
        let record = backend.last().expect("capture recorded");
        assert_eq!(record.target_name, DEFAULT_TARGET_NAME);
        assert_eq!(record.target_size, 256);
        assert_eq!(record.target_generation, camera.render_target_generation());
        assert_eq!(camera.cached_render_size(), 256);
    }

    #[test]
    fn update_captures_once_with_paired_pose_and_clip_plane() {
        let (world, a, b) = portal_pair();
        let mut camera = PortalCamera::new(a);
        camera.init(CameraType::Portal, Some(b), false, 1.0);
        let frame = frame_at(Vec3::new(0.0, 1.7, 6.0));
        camera.begin_play(&world, &frame);

        let watched = Transform::from_yaw_pitch(Vec3::new(0.0, 1.7, 6.0), PI, 0.0);
        let mut backend = RecordingBackend::default();
        let outcome = camera.update(&world, &frame, &mut backend, &watched, projection());

        assert_eq!(outcome, FrameOutcome::Captured);
        assert_eq!(backend.len(), 1);

        let owner = world.surface(a).expect("owner");
        let linked = world.surface(b).expect("linked");
        let record = backend.last().expect("capture recorded");
        assert!(record
            .transform
            .abs_diff_eq(&compute_paired_transform(&watched, owner, linked), 1e-4));
        assert_eq!(record.projection, projection());

        let plane = record.clip_plane.expect("clip plane");
        assert!(plane.normal.abs_diff_eq(-linked.forward(), 1e-5));
        assert!(plane
            .point
            .abs_diff_eq(linked.location - 0.3 * linked.forward(), 1e-5));
        assert!(!camera.is_total_reflection());
    }

    #[test]
    fn equal_indices_on_camera_apply_no_bend() {
        let (world, a, b) = portal_pair();
        let mut camera = PortalCamera::new(a);
        camera.init(CameraType::Portal, Some(b), false, 1.0);
        camera.set_refractive_indices(1.33, 1.33);
        camera.begin_play(&world, &frame_at(Vec3::ZERO));

        let watched = Transform::from_yaw_pitch(Vec3::new(5.0, 1.0, 3.0), PI, 0.0);
        let transform = camera
            .compute_view_transform(&world, &watched)
            .expect("owner and link are valid");

        let owner = world.surface(a).expect("owner");
        let linked = world.surface(b).expect("linked");
        assert!(transform.abs_diff_eq(&compute_paired_transform(&watched, owner, linked), 1e-5));
    }

    #[test]
    fn total_reflection_sets_flag_and_still_captures() {
        let (world, a, b) = portal_pair();
        let mut camera = PortalCamera::new(a);
        camera.init(CameraType::Portal, Some(b), false, 1.0);
        camera.set_refractive_indices(1.5, 1.0);
        let frame = frame_at(Vec3::ZERO);
        camera.begin_play(&world, &frame);

        // Grazing view from far to the side of the middle point.
        let watched = Transform::new(Vec3::new(20.0, 1.0, 1.0), Quat::IDENTITY);
        let mut backend = RecordingBackend::default();
        let outcome = camera.update(&world, &frame, &mut backend, &watched, projection());

        assert_eq!(outcome, FrameOutcome::Captured);
        assert!(camera.is_total_reflection());
        let owner = world.surface(a).expect("owner");
        let linked = world.surface(b).expect("linked");
        assert!(camera
            .world_transform()
            .abs_diff_eq(&compute_paired_transform(&watched, owner, linked), 1e-4));

        // Back near the normal the flag clears again.
        let watched = Transform::new(Vec3::new(0.5, 1.0, 8.0), Quat::IDENTITY);
        camera.update(&world, &frame, &mut backend, &watched, projection());
        assert!(!camera.is_total_reflection());
        assert_eq!(backend.len(), 2);
    }

    #[test]
    fn camera_on_a_prop_skips_every_frame() {
        let (mut world, _, b) = portal_pair();
        let prop = world.spawn_prop(Vec3::new(5.0, 0.0, 5.0));
        let mut camera = PortalCamera::new(prop);
        camera.init(CameraType::Portal, Some(b), false, 1.0);
        let frame = frame_at(Vec3::ZERO);
        camera.begin_play(&world, &frame);

        let mut backend = RecordingBackend::default();
        let outcome = camera.update(&world, &frame, &mut backend, &Transform::IDENTITY, projection());

        assert_eq!(outcome, FrameOutcome::SkippedNoOwner);
        assert!(backend.is_empty());
        assert!(camera.owner_portal().is_none());
        assert!(camera.render_target().is_some());
        assert!(camera.compute_clip_plane(&world).is_none());
    }

    #[test]
    fn owner_resolves_once_the_surface_appears() {
        let mut world = SurfaceWorld::new();
        let id = ActorId(7);
        let mut camera = PortalCamera::new(id);
        camera.init(CameraType::Mirror, None, false, 1.0);
        let frame = frame_at(Vec3::ZERO);
        camera.begin_play(&world, &frame);
        assert!(camera.linked_portal().is_none());

        let mut backend = RecordingBackend::default();
        let outcome = camera.update(&world, &frame, &mut backend, &Transform::IDENTITY, projection());
        assert_eq!(outcome, FrameOutcome::SkippedNoOwner);

        world.insert(id, Actor::Surface(PortalSurface::new(Vec3::ZERO, Quat::IDENTITY)));
        let outcome = camera.update(
            &world,
            &frame,
            &mut backend,
            &Transform::from_translation(Vec3::new(0.0, 0.0, 3.0)),
            projection(),
        );

        assert_eq!(outcome, FrameOutcome::Captured);
        assert_eq!(camera.owner_portal(), Some(id));
        assert_eq!(camera.linked_portal(), Some(id));
        let plane = camera.clip_plane().expect("mirror clip plane");
        assert!(plane.normal.abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn despawned_owner_is_dropped() {
        let (mut world, a, b) = portal_pair();
        let mut camera = PortalCamera::new(a);
        camera.init(CameraType::Portal, Some(b), false, 1.0);
        camera.begin_play(&world, &frame_at(Vec3::ZERO));
        assert!(camera.is_owner_valid(&world));

        world.despawn(a);
        assert!(!camera.is_owner_valid(&world));
        assert!(camera.owner_portal().is_none());
    }

    #[test]
    fn missing_linked_surface_still_captures_from_last_pose() {
        let (mut world, a, b) = portal_pair();
        let mut camera = PortalCamera::new(a);
        camera.init(CameraType::Portal, Some(b), false, 1.0);
        let frame = frame_at(Vec3::ZERO);
        camera.begin_play(&world, &frame);
        world.despawn(b);

        let mut backend = RecordingBackend::default();
        let outcome = camera.update(
            &world,
            &frame,
            &mut backend,
            &Transform::from_translation(Vec3::new(1.0, 1.0, 4.0)),
            projection(),
        );

        assert_eq!(outcome, FrameOutcome::Captured);
        let record = backend.last().expect("capture recorded");
        assert!(record.clip_plane.is_none());
        assert!(record.transform.abs_diff_eq(&Transform::IDENTITY, 1e-6));
    }

    struct FixedPlaneModel;

    impl CaptureModel for FixedPlaneModel {
        fn clip_plane(&self, ctx: &CaptureContext<'_>) -> ClipPlane {
            ClipPlane::new(Vec3::Y, ctx.owner.location)
        }
    }

    #[test]
    fn custom_model_overrides_clip_plane_only() {
        let (world, a, b) = portal_pair();
        let mut camera = PortalCamera::with_model(a, CaptureSettings::default(), FixedPlaneModel);
        camera.init(CameraType::Portal, Some(b), false, 1.0);
        let frame = frame_at(Vec3::ZERO);
        camera.begin_play(&world, &frame);

        let watched = Transform::from_translation(Vec3::new(2.0, 1.0, 4.0));
        let mut backend = RecordingBackend::default();
        camera.update(&world, &frame, &mut backend, &watched, projection());

        let record = backend.last().expect("capture recorded");
        assert_eq!(record.clip_plane, Some(ClipPlane::new(Vec3::Y, Vec3::ZERO)));
        let owner = world.surface(a).expect("owner");
        let linked = world.surface(b).expect("linked");
        assert!(record
            .transform
            .abs_diff_eq(&compute_paired_transform(&watched, owner, linked), 1e-4));
    }
}
