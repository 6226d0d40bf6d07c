use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glam::{Mat4, Quat, UVec2, Vec3};
use mirrorgate_capture::{CameraType, CaptureSettings, FrameContext, PortalCamera};
use mirrorgate_shared::surface::{Actor, ActorId, PortalSurface, SurfaceWorld};
use mirrorgate_shared::transform::Transform;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub settings: CaptureSettings,
    #[serde(default)]
    pub viewer: ViewerSpec,
    #[serde(default)]
    pub surfaces: Vec<SurfaceSpec>,
    #[serde(default)]
    pub props: Vec<PropSpec>,
    #[serde(default)]
    pub cameras: Vec<CameraSpec>,
    #[serde(default)]
    pub frames: Vec<FrameSpec>,
}

#[derive(Debug, Deserialize)]
pub struct ViewerSpec {
    #[serde(default)]
    pub viewport: Option<[u32; 2]>,
    #[serde(default = "default_fov_degrees")]
    pub fov_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

impl Default for ViewerSpec {
    fn default() -> Self {
        Self {
            viewport: None,
            fov_degrees: default_fov_degrees(),
            near: default_near(),
            far: default_far(),
        }
    }
}

fn default_fov_degrees() -> f32 {
    70.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    10_000.0
}

fn default_weight() -> f32 {
    1.0
}

fn default_refractive_index() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurfaceSpec {
    pub id: u32,
    pub location: [f32; 3],
    #[serde(default)]
    pub yaw_degrees: f32,
    #[serde(default)]
    pub middle_offset: [f32; 3],
    #[serde(default)]
    pub linked: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropSpec {
    pub id: u32,
    pub location: [f32; 3],
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraSpec {
    pub attach_to: u32,
    #[serde(rename = "type", default)]
    pub camera_type: CameraType,
    #[serde(default)]
    pub linked: Option<u32>,
    #[serde(default)]
    pub exit_in_front: bool,
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default = "default_refractive_index")]
    pub refractive_index_1: f32,
    #[serde(default = "default_refractive_index")]
    pub refractive_index_2: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameSpec {
    pub actor_location: [f32; 3],
    #[serde(default)]
    pub actor_yaw_degrees: f32,
    #[serde(default)]
    pub actor_pitch_degrees: f32,
    #[serde(default)]
    pub viewer_location: Option<[f32; 3]>,
}

impl FrameSpec {
    pub fn watched_transform(&self) -> Transform {
        Transform::from_yaw_pitch(
            Vec3::from_array(self.actor_location),
            self.actor_yaw_degrees.to_radians(),
            self.actor_pitch_degrees.to_radians(),
        )
    }
}

#[derive(Debug)]
pub enum SceneLoadError {
    Read { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    DuplicateActor { id: u32 },
    UnknownActor { id: u32, referenced_by: String },
    NotASurface { id: u32, referenced_by: String },
}

impl fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read scene {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse scene {}: {source}", path.display())
            }
            Self::DuplicateActor { id } => write!(f, "actor id {id} is declared twice"),
            Self::UnknownActor { id, referenced_by } => {
                write!(f, "{referenced_by} references unknown actor {id}")
            }
            Self::NotASurface { id, referenced_by } => {
                write!(f, "{referenced_by} links to actor {id}, which is not a portal surface")
            }
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// A loaded scene, ready to be stepped frame by frame.
pub struct Scene {
    pub world: SurfaceWorld,
    pub cameras: Vec<PortalCamera>,
    pub frames: Vec<FrameSpec>,
    pub viewport: Option<UVec2>,
    pub projection: Mat4,
}

impl Scene {
    pub fn load(path: &Path, settings_override: Option<CaptureSettings>) -> Result<Self, SceneLoadError> {
        let contents = fs::read_to_string(path).map_err(|source| SceneLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file = toml::from_str::<SceneFile>(&contents).map_err(|source| SceneLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::build(file, settings_override)
    }

    pub fn build(file: SceneFile, settings_override: Option<CaptureSettings>) -> Result<Self, SceneLoadError> {
        let settings = settings_override.unwrap_or(file.settings).sanitize();
        let mut world = SurfaceWorld::new();

        for surface in &file.surfaces {
            let mut portal = PortalSurface::new(
                Vec3::from_array(surface.location),
                Quat::from_rotation_y(surface.yaw_degrees.to_radians()),
            )
            .with_middle_offset(Vec3::from_array(surface.middle_offset));
            portal.linked = surface.linked.map(ActorId);
            if world.insert(ActorId(surface.id), Actor::Surface(portal)).is_some() {
                return Err(SceneLoadError::DuplicateActor { id: surface.id });
            }
        }
        for prop in &file.props {
            let actor = Actor::Prop {
                location: Vec3::from_array(prop.location),
            };
            if world.insert(ActorId(prop.id), actor).is_some() {
                return Err(SceneLoadError::DuplicateActor { id: prop.id });
            }
        }
        for surface in &file.surfaces {
            if let Some(linked) = surface.linked {
                check_surface(&world, linked, || format!("surface {}", surface.id))?;
            }
        }

        let mut cameras = Vec::with_capacity(file.cameras.len());
        for (index, spec) in file.cameras.iter().enumerate() {
            if world.actor(ActorId(spec.attach_to)).is_none() {
                return Err(SceneLoadError::UnknownActor {
                    id: spec.attach_to,
                    referenced_by: format!("camera {index}"),
                });
            }
            // A portal camera without an explicit link follows its surface's link.
            let linked = match spec.linked {
                Some(id) => {
                    check_surface(&world, id, || format!("camera {index}"))?;
                    Some(ActorId(id))
                }
                None if spec.camera_type == CameraType::Mirror => None,
                None => world
                    .surface(ActorId(spec.attach_to))
                    .and_then(|surface| surface.linked),
            };

            let mut camera = PortalCamera::with_settings(ActorId(spec.attach_to), settings.clone());
            camera.init(spec.camera_type, linked, spec.exit_in_front, spec.weight);
            camera.set_refractive_indices(spec.refractive_index_1, spec.refractive_index_2);
            debug!("Camera {index}: {:?} on {:?} -> {linked:?}", spec.camera_type, spec.attach_to);
            cameras.push(camera);
        }

        let viewport = file.viewer.viewport.map(UVec2::from_array);
        let aspect = viewport
            .map(|v| v.x.max(1) as f32 / v.y.max(1) as f32)
            .unwrap_or(16.0 / 9.0);
        let projection = Mat4::perspective_rh(
            file.viewer.fov_degrees.to_radians(),
            aspect.max(0.0001),
            file.viewer.near.max(0.0001),
            file.viewer.far.max(file.viewer.near + 0.0001),
        );

        Ok(Self {
            world,
            cameras,
            frames: file.frames,
            viewport,
            projection,
        })
    }

    pub fn frame_context(&self, frame: &FrameSpec) -> FrameContext {
        let viewer = frame.viewer_location.unwrap_or(frame.actor_location);
        FrameContext {
            viewer_location: Some(Vec3::from_array(viewer)),
            viewport: self.viewport,
        }
    }
}

fn check_surface(
    world: &SurfaceWorld,
    id: u32,
    referenced_by: impl FnOnce() -> String,
) -> Result<(), SceneLoadError> {
    match world.actor(ActorId(id)) {
        Some(Actor::Surface(_)) => Ok(()),
        Some(Actor::Prop { .. }) => Err(SceneLoadError::NotASurface {
            id,
            referenced_by: referenced_by(),
        }),
        None => Err(SceneLoadError::UnknownActor {
            id,
            referenced_by: referenced_by(),
        }),
    }
}
