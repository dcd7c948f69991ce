//! Test doubles for the backend, icon loader and frame scheduler.

use crate::backend::RenderBackend;
use crate::builder::{SceneBuilder, SceneSettings};
use crate::entity::EntityRecord;
use crate::error::{AssetLoadError, SceneError};
use crate::generation::{GenerationToken, SceneGeneration};
use crate::icons::{IconCompletion, IconLoader, IconRequest};
use crate::layout::LayoutPolicy;
use crate::render_loop::FrameScheduler;
use crate::resources::{ResourceDesc, ResourceId, ResourceKind, ResourceTracker};
use crate::viewport::Viewport;
use image::{Rgba, RgbaImage};
use std::cell::Cell;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    Attach,
    Create(ResourceId),
    Release(ResourceId),
    Resize(Viewport),
    Render,
    Detach,
}

/// Records every call and keeps its own view of live resources.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub events: Vec<BackendEvent>,
    pub attached: bool,
    pub live: HashMap<ResourceId, ResourceKind>,
    pub renders: usize,
    pub resizes: Vec<Viewport>,
    /// Live resource count observed at each `attach`.
    pub live_at_attach: Vec<usize>,
    pub fail_attach: bool,
    pub fail_render: bool,
    /// Fail `create_resource` for textures.
    pub fail_textures: bool,
}

impl RecordingBackend {
    /// A backend that already has a surface, for driving a generation
    /// without going through the lifecycle.
    pub fn attached() -> Self {
        Self {
            attached: true,
            ..Self::default()
        }
    }

    pub fn count(&self, event: fn(&BackendEvent) -> bool) -> usize {
        self.events.iter().filter(|e| event(e)).count()
    }
}

impl RenderBackend for RecordingBackend {
    fn attach(&mut self, _viewport: Viewport) -> Result<(), SceneError> {
        self.events.push(BackendEvent::Attach);
        self.live_at_attach.push(self.live.len());
        if self.fail_attach {
            return Err(SceneError::Backend("no adapter".into()));
        }
        assert!(!self.attached, "attach while a surface is already attached");
        self.attached = true;
        Ok(())
    }

    fn create_resource(&mut self, id: ResourceId, desc: &ResourceDesc) -> Result<(), SceneError> {
        assert!(self.attached, "resource created without a surface");
        if self.fail_textures && desc.kind() == ResourceKind::Texture {
            return Err(SceneError::Backend("texture upload failed".into()));
        }
        self.events.push(BackendEvent::Create(id));
        self.live.insert(id, desc.kind());
        Ok(())
    }

    fn release_resource(&mut self, id: ResourceId) {
        self.events.push(BackendEvent::Release(id));
        self.live.remove(&id);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.events.push(BackendEvent::Resize(viewport));
        self.resizes.push(viewport);
    }

    fn render(&mut self, generation: &SceneGeneration) -> Result<(), SceneError> {
        assert!(self.attached, "render without a surface");
        assert!(!generation.is_disposed(), "render of a disposed generation");
        if self.fail_render {
            return Err(SceneError::Backend("device lost".into()));
        }
        self.events.push(BackendEvent::Render);
        self.renders += 1;
        Ok(())
    }

    fn detach(&mut self) {
        self.events.push(BackendEvent::Detach);
        self.attached = false;
    }
}

/// Icon loader whose completions are resolved by the test.
#[derive(Debug, Default)]
pub struct ManualIconLoader {
    pub requests: Vec<IconRequest>,
    ready: Vec<IconCompletion>,
    resolved: usize,
}

impl ManualIconLoader {
    /// Completes the `n`-th request ever issued.
    pub fn resolve(&mut self, n: usize, result: Result<RgbaImage, AssetLoadError>) {
        let completion = IconCompletion::for_request(&self.requests[n], result);
        self.ready.push(completion);
        self.resolved += 1;
    }
}

impl IconLoader for ManualIconLoader {
    fn request(&mut self, request: IconRequest) {
        self.requests.push(request);
    }

    fn poll(&mut self) -> Vec<IconCompletion> {
        std::mem::take(&mut self.ready)
    }

    fn pending(&self) -> usize {
        self.requests.len() - self.resolved
    }
}

#[derive(Debug, Default)]
pub struct CountingScheduler {
    requests: Cell<usize>,
}

impl CountingScheduler {
    pub fn requests(&self) -> usize {
        self.requests.get()
    }
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

pub fn icon() -> RgbaImage {
    RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]))
}

pub fn entities(n: usize) -> Vec<EntityRecord> {
    (0..n)
        .map(|i| EntityRecord::new(format!("Coin {i}"), format!("C{i}"), 10.0 * (i + 1) as f64))
        .collect()
}

/// Builds a standalone ring generation of `n` entities.
pub fn build_generation(settings: &SceneSettings, n: usize) -> (SceneGeneration, ResourceTracker) {
    let mut tracker = ResourceTracker::new();
    let mut icons = ManualIconLoader::default();
    let generation = SceneBuilder::new(settings).build(
        &entities(n),
        LayoutPolicy::default(),
        GenerationToken(1),
        Viewport::new(800, 600),
        &mut tracker,
        &mut icons,
    );
    (generation, tracker)
}
