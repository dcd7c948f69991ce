// src/lib.rs
//! Scene pipeline for the market sphere viewer.
//!
//! Turns a snapshot of market entities into a 3D scene generation (one
//! translucent sphere per entity, a floating price label above it, a logo
//! attached once its icon loads) and manages the lifecycle of that
//! generation: build, render every frame, follow viewport resizes, and
//! dispose completely before the next snapshot is built.
//!
//! The GPU surface, icon fetching and frame scheduling sit behind the
//! [`RenderBackend`], [`IconLoader`] and [`FrameScheduler`] traits so the
//! whole pipeline runs headless in tests.

pub mod backend;
pub mod builder;
pub mod camera;
pub mod entity;
pub mod error;
pub mod generation;
pub mod icons;
pub mod label;
pub mod layout;
pub mod lifecycle;
pub mod render_loop;
pub mod resources;
pub mod viewport;

#[cfg(test)]
mod testing;

pub use backend::RenderBackend;
pub use builder::{SceneBuilder, SceneSettings};
pub use camera::{Camera, OrbitControls};
pub use entity::{parse_entities, EntityRecord};
pub use error::{AssetLoadError, FetchError, SceneError};
pub use generation::{GenerationToken, SceneGeneration, Staleness};
pub use icons::{IconCompletion, IconLoader, IconRequest};
pub use layout::LayoutPolicy;
pub use lifecycle::{IconPollStats, LifecycleState, LoadState, Phase, SceneLifecycle};
pub use render_loop::{FrameScheduler, RenderLoop, TickOutcome};
pub use resources::{ResourceDesc, ResourceId, ResourceKind, ResourceTracker};
pub use viewport::Viewport;
