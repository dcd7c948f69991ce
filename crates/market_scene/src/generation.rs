//! One built scene: the nodes, lights, camera and resources created for a
//! single snapshot of the entity list.

use crate::backend::RenderBackend;
use crate::camera::{Camera, OrbitControls};
use crate::resources::{ResourceDesc, ResourceId, ResourceTracker};
use glam::{Vec2, Vec3};
use image::RgbaImage;

/// Identifies a generation; async results carry it back for the staleness
/// check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationToken(pub(crate) u64);

impl GenerationToken {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Result of checking a token against a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Live,
    Stale,
}

/// Billboard attached as a child of a sphere, centered on it.
#[derive(Debug, Clone)]
pub struct LogoNode {
    pub texture: ResourceId,
    pub scale: f32,
}

#[derive(Debug, Clone)]
pub struct SphereNode {
    pub entity_index: usize,
    pub position: Vec3,
    /// Accumulated idle spin around the local Y axis.
    pub rotation_y: f32,
    pub radius: f32,
    pub geometry: ResourceId,
    pub material: ResourceId,
    pub logo: Option<LogoNode>,
}

/// Label billboard; a sibling of its sphere so it never inherits the spin.
#[derive(Debug, Clone)]
pub struct LabelNode {
    pub entity_index: usize,
    pub position: Vec3,
    /// World-space width and height of the billboard.
    pub scale: Vec2,
    pub texture: ResourceId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

pub struct SceneGeneration {
    token: GenerationToken,
    pub spheres: Vec<SphereNode>,
    pub labels: Vec<LabelNode>,
    pub lights: Vec<AmbientLight>,
    /// Clear color, sRGB components in `0..=1`.
    pub background: [f32; 3],
    pub camera: Camera,
    pub controls: OrbitControls,
    resources: Vec<ResourceId>,
    pending_uploads: Vec<(ResourceId, ResourceDesc)>,
    disposed: bool,
}

impl SceneGeneration {
    pub(crate) fn new(
        token: GenerationToken,
        camera: Camera,
        controls: OrbitControls,
        background: [f32; 3],
    ) -> Self {
        Self {
            token,
            spheres: Vec::new(),
            labels: Vec::new(),
            lights: Vec::new(),
            background,
            camera,
            controls,
            resources: Vec::new(),
            pending_uploads: Vec::new(),
            disposed: false,
        }
    }

    pub fn token(&self) -> GenerationToken {
        self.token
    }

    pub fn check(&self, token: GenerationToken) -> Staleness {
        if !self.disposed && token == self.token {
            Staleness::Live
        } else {
            Staleness::Stale
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Spheres, labels and attached logos.
    pub fn node_count(&self) -> usize {
        self.spheres.len() + self.labels.len() + self.logo_count()
    }

    pub fn logo_count(&self) -> usize {
        self.spheres.iter().filter(|s| s.logo.is_some()).count()
    }

    /// Resource ids owned by this generation, in allocation order.
    pub fn resources(&self) -> &[ResourceId] {
        &self.resources
    }

    /// Allocates a resource owned by this generation and queues it for
    /// upload.
    pub(crate) fn track(&mut self, tracker: &mut ResourceTracker, desc: ResourceDesc) -> ResourceId {
        let id = tracker.allocate(desc.kind());
        self.resources.push(id);
        self.pending_uploads.push((id, desc));
        id
    }

    /// Resources allocated since the last call, for the backend to create.
    pub fn take_pending_uploads(&mut self) -> Vec<(ResourceId, ResourceDesc)> {
        std::mem::take(&mut self.pending_uploads)
    }

    /// Attaches a decoded icon to sphere `index`. Returns the new texture id,
    /// or `None` if the generation is disposed, the index is unknown, or the
    /// sphere already carries a logo.
    pub fn attach_logo(
        &mut self,
        index: usize,
        icon: RgbaImage,
        scale: f32,
        tracker: &mut ResourceTracker,
    ) -> Option<ResourceId> {
        if self.disposed {
            return None;
        }
        match self.spheres.get(index) {
            Some(sphere) if sphere.logo.is_none() => {}
            _ => return None,
        }

        let texture = self.track(tracker, ResourceDesc::SpriteTexture(icon));
        self.spheres[index].logo = Some(LogoNode { texture, scale });
        Some(texture)
    }

    /// Removes the logo of sphere `index` and releases its texture.
    pub fn detach_logo<B: RenderBackend + ?Sized>(
        &mut self,
        index: usize,
        tracker: &mut ResourceTracker,
        backend: &mut B,
    ) -> bool {
        let Some(logo) = self.spheres.get_mut(index).and_then(|s| s.logo.take()) else {
            return false;
        };
        self.resources.retain(|id| *id != logo.texture);
        if tracker.release(logo.texture) {
            backend.release_resource(logo.texture);
        }
        true
    }

    /// Applies one frame of idle spin to every sphere.
    pub fn advance_spin(&mut self, delta_rad: f32) {
        for sphere in &mut self.spheres {
            sphere.rotation_y += delta_rad;
        }
    }

    /// Releases every resource this generation owns, in the tracker and in
    /// the backend. Safe to call more than once; returns how many resources
    /// this call released.
    pub fn dispose<B: RenderBackend + ?Sized>(
        &mut self,
        tracker: &mut ResourceTracker,
        backend: &mut B,
    ) -> usize {
        if self.disposed {
            return 0;
        }
        self.disposed = true;
        self.pending_uploads.clear();

        let mut released = 0;
        for id in self.resources.drain(..) {
            if tracker.release(id) {
                backend.release_resource(id);
                released += 1;
            }
        }

        self.spheres.clear();
        self.labels.clear();
        self.lights.clear();

        log::debug!("Generation {} released {} resources", self.token.0, released);
        released
    }
}
