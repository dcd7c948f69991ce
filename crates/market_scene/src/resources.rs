//! Allocation bookkeeping for generation-owned render resources.
//!
//! Every geometry, material and texture a generation needs gets a
//! [`ResourceId`] from the [`ResourceTracker`]. The render backend mirrors
//! the same ids with real GPU objects; disposal releases both.

use image::RgbaImage;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(u64);

impl ResourceId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Geometry,
    Material,
    Texture,
}

/// What the backend has to create for a given id.
#[derive(Debug, Clone)]
pub enum ResourceDesc {
    SphereGeometry {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    SphereMaterial {
        color: [f32; 3],
        opacity: f32,
    },
    /// A billboard texture; the backend derives its sampling material.
    SpriteTexture(RgbaImage),
}

impl ResourceDesc {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceDesc::SphereGeometry { .. } => ResourceKind::Geometry,
            ResourceDesc::SphereMaterial { .. } => ResourceKind::Material,
            ResourceDesc::SpriteTexture(_) => ResourceKind::Texture,
        }
    }
}

/// Hands out resource ids and counts which of them are still live.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    next_id: u64,
    live: BTreeMap<ResourceId, ResourceKind>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, kind: ResourceKind) -> ResourceId {
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        self.live.insert(id, kind);
        id
    }

    /// Releases `id`. Returns `false` when it was already released.
    pub fn release(&mut self, id: ResourceId) -> bool {
        self.live.remove(&id).is_some()
    }

    pub fn is_live(&self, id: ResourceId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live_count_of(&self, kind: ResourceKind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }
}
