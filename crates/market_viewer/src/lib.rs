// src/lib.rs
//! Native 3D viewer for market snapshots.
//!
//! Each entity of the snapshot is drawn as a translucent spinning sphere
//! with its logo inside and a price label floating above it. Scene
//! construction and lifecycle live in `market_scene`; this crate supplies the
//! window, the wgpu render backend, icon loading and the data source.

pub mod app;
pub mod camera;
pub mod config;
pub mod icons;
pub mod renderer;
pub mod source;
pub mod ui;
