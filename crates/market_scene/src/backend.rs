//! The seam between the scene pipeline and whatever draws it.

use crate::error::SceneError;
use crate::generation::SceneGeneration;
use crate::resources::{ResourceDesc, ResourceId};
use crate::viewport::Viewport;

/// A drawing surface plus the GPU objects mirroring a generation's
/// resources.
///
/// The lifecycle drives it strictly in order: `attach`, `create_resource`*,
/// (`render` | `resize` | `create_resource`)*, `release_resource`*,
/// `detach`. At most one generation is attached at any time.
pub trait RenderBackend {
    /// Attaches the drawing surface for a new generation.
    fn attach(&mut self, viewport: Viewport) -> Result<(), SceneError>;

    fn create_resource(&mut self, id: ResourceId, desc: &ResourceDesc) -> Result<(), SceneError>;

    /// Drops the GPU object behind `id`. Unknown ids are ignored.
    fn release_resource(&mut self, id: ResourceId);

    fn resize(&mut self, viewport: Viewport);

    fn render(&mut self, generation: &SceneGeneration) -> Result<(), SceneError>;

    /// Detaches the drawing surface. Must tolerate being called when
    /// nothing is attached.
    fn detach(&mut self);
}
