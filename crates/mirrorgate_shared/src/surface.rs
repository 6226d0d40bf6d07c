use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::transform::Transform;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

pub type SurfaceId = ActorId;

/// A flat portal or mirror. The surface faces along its local +Z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PortalSurface {
    pub location: Vec3,
    pub rotation: Quat,
    /// Offset of the visual middle from `location`, in surface-local space.
    pub middle_offset: Vec3,
    pub linked: Option<SurfaceId>,
}

impl PortalSurface {
    pub fn new(location: Vec3, rotation: Quat) -> Self {
        Self {
            location,
            rotation,
            middle_offset: Vec3::ZERO,
            linked: None,
        }
    }

    pub fn with_middle_offset(mut self, middle_offset: Vec3) -> Self {
        self.middle_offset = middle_offset;
        self
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn middle_point(&self) -> Vec3 {
        self.location + self.rotation * self.middle_offset
    }

    pub fn pose(&self) -> Transform {
        Transform::new(self.location, self.rotation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    Surface(PortalSurface),
    Prop { location: Vec3 },
}

impl Actor {
    pub fn location(&self) -> Vec3 {
        match self {
            Self::Surface(surface) => surface.location,
            Self::Prop { location } => *location,
        }
    }

    pub fn as_surface(&self) -> Option<&PortalSurface> {
        match self {
            Self::Surface(surface) => Some(surface),
            Self::Prop { .. } => None,
        }
    }
}

/// Registry of actors that cameras resolve their owner and linked surfaces through.
#[derive(Debug, Default)]
pub struct SurfaceWorld {
    actors: FxHashMap<ActorId, Actor>,
    next_id: u32,
}

impl SurfaceWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, actor: Actor) -> ActorId {
        while self.actors.contains_key(&ActorId(self.next_id)) {
            self.next_id += 1;
        }
        let id = ActorId(self.next_id);
        self.next_id += 1;
        self.actors.insert(id, actor);
        id
    }

    pub fn spawn_surface(&mut self, surface: PortalSurface) -> SurfaceId {
        self.spawn(Actor::Surface(surface))
    }

    pub fn spawn_prop(&mut self, location: Vec3) -> ActorId {
        self.spawn(Actor::Prop { location })
    }

    pub fn insert(&mut self, id: ActorId, actor: Actor) -> Option<Actor> {
        self.actors.insert(id, actor)
    }

    pub fn despawn(&mut self, id: ActorId) -> Option<Actor> {
        let removed = self.actors.remove(&id)?;
        for actor in self.actors.values_mut() {
            if let Actor::Surface(surface) = actor {
                if surface.linked == Some(id) {
                    surface.linked = None;
                }
            }
        }
        debug!("Despawned actor {id:?}");
        Some(removed)
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&PortalSurface> {
        self.actors.get(&id).and_then(Actor::as_surface)
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut PortalSurface> {
        match self.actors.get_mut(&id) {
            Some(Actor::Surface(surface)) => Some(surface),
            _ => None,
        }
    }

    /// Links two surfaces to each other. Fails if either id is not a surface.
    pub fn link_pair(&mut self, a: SurfaceId, b: SurfaceId) -> bool {
        if self.surface(a).is_none() || self.surface(b).is_none() {
            return false;
        }
        if let Some(surface) = self.surface_mut(a) {
            surface.linked = Some(b);
        }
        if let Some(surface) = self.surface_mut(b) {
            surface.linked = Some(a);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
