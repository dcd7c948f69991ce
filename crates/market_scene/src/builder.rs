//! Turns an entity list into a [`SceneGeneration`].

use crate::camera::{Camera, OrbitControls};
use crate::entity::EntityRecord;
use crate::generation::{AmbientLight, GenerationToken, LabelNode, SceneGeneration, SphereNode};
use crate::icons::{IconLoader, IconRequest};
use crate::label::{rasterize, LabelStyle};
use crate::layout::{position_with_rng, LayoutPolicy};
use crate::resources::{ResourceDesc, ResourceTracker};
use crate::viewport::Viewport;
use glam::{Vec2, Vec3};
use image::RgbaImage;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

/// Every visual constant of a generation.
#[derive(Debug, Clone)]
pub struct SceneSettings {
    pub sphere_radius: f32,
    pub sphere_width_segments: u32,
    pub sphere_height_segments: u32,
    pub sphere_color: [f32; 3],
    pub sphere_opacity: f32,

    /// Vertical distance from a sphere's center to its label.
    pub label_offset: f32,
    /// World-space size of a label billboard.
    pub label_scale: Vec2,
    pub label_style: LabelStyle,
    /// World-space edge length of a logo billboard.
    pub logo_scale: f32,

    /// Idle spin per frame, radians.
    pub spin_per_frame: f32,
    /// sRGB clear color.
    pub background: [f32; 3],
    pub ambient_light: AmbientLight,

    pub camera_position: Vec3,
    pub camera_fov_deg: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    pub damping_factor: f32,

    /// Seed for [`LayoutPolicy::RandomVolume`]; fresh entropy when `None`.
    pub layout_seed: Option<u64>,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            sphere_radius: 2.0,
            sphere_width_segments: 32,
            sphere_height_segments: 32,
            sphere_color: [1.0, 1.0, 1.0],
            sphere_opacity: 0.6,
            label_offset: 3.0,
            label_scale: Vec2::new(12.0, 2.0),
            label_style: LabelStyle::default(),
            logo_scale: 1.5,
            spin_per_frame: 0.008,
            background: hex_rgb(0x181c20),
            ambient_light: AmbientLight {
                color: [1.0, 1.0, 1.0],
                intensity: 0.8,
            },
            camera_position: Vec3::new(0.0, 0.0, 30.0),
            camera_fov_deg: 60.0,
            camera_near: 0.1,
            camera_far: 1000.0,
            damping_factor: 0.05,
            layout_seed: None,
        }
    }
}

/// Converts `0xRRGGBB` into `[r, g, b]` in `0..=1`.
pub fn hex_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

pub struct SceneBuilder<'a> {
    settings: &'a SceneSettings,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(settings: &'a SceneSettings) -> Self {
        Self { settings }
    }

    /// Builds one generation for `entities`, in input order.
    ///
    /// Each entity gets a sphere at its layout position and a label
    /// billboard `label_offset` above it. Entities with an icon reference
    /// get an icon request tagged with `token`; the logo is attached later,
    /// when (and if) the load completes while this generation is live.
    pub fn build<L: IconLoader + ?Sized>(
        &self,
        entities: &[EntityRecord],
        policy: LayoutPolicy,
        token: GenerationToken,
        viewport: Viewport,
        tracker: &mut ResourceTracker,
        icons: &mut L,
    ) -> SceneGeneration {
        let s = self.settings;

        let mut camera = Camera::looking_at(
            s.camera_position,
            Vec3::ZERO,
            s.camera_fov_deg,
            s.camera_near,
            s.camera_far,
        );
        camera.set_aspect(viewport.aspect());

        let mut generation = SceneGeneration::new(
            token,
            camera,
            OrbitControls::new(s.damping_factor),
            s.background,
        );
        generation.lights.push(s.ambient_light);

        if entities.is_empty() {
            return generation;
        }

        let geometry = generation.track(
            tracker,
            ResourceDesc::SphereGeometry {
                radius: s.sphere_radius,
                width_segments: s.sphere_width_segments,
                height_segments: s.sphere_height_segments,
            },
        );

        // Rasterising is pure, so it runs in parallel; the scene graph is
        // still mutated in input order below.
        let bitmaps: Vec<RgbaImage> = entities
            .par_iter()
            .map(|entity| rasterize(&entity.label_lines(), &s.label_style))
            .collect();

        let mut rng = match s.layout_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let total = entities.len();
        let mut icon_requests = 0usize;

        for (index, (entity, bitmap)) in entities.iter().zip(bitmaps).enumerate() {
            let position = position_with_rng(index, total, policy, &mut rng);

            let material = generation.track(
                tracker,
                ResourceDesc::SphereMaterial {
                    color: s.sphere_color,
                    opacity: s.sphere_opacity,
                },
            );
            generation.spheres.push(SphereNode {
                entity_index: index,
                position,
                rotation_y: 0.0,
                radius: s.sphere_radius,
                geometry,
                material,
                logo: None,
            });

            if let Some(uri) = entity.icon() {
                icons.request(IconRequest {
                    token,
                    sphere: index,
                    uri: uri.to_string(),
                });
                icon_requests += 1;
            }

            let texture = generation.track(tracker, ResourceDesc::SpriteTexture(bitmap));
            generation.labels.push(LabelNode {
                entity_index: index,
                position: position + Vec3::Y * s.label_offset,
                scale: s.label_scale,
                texture,
            });

            log::debug!(
                "Entity {} '{}' placed at ({:.2}, {:.2}, {:.2})",
                index,
                entity.symbol,
                position.x,
                position.y,
                position.z
            );
        }

        log::info!(
            "Built generation {} | entities={} | resources={} | icon requests={}",
            token.raw(),
            total,
            generation.resources().len(),
            icon_requests
        );

        generation
    }
}
