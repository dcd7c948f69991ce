//! The wgpu render backend. Owns the GPU context, the depth target, the
//! scene pipelines and the GPU objects mirroring the live generation's
//! resources.

pub mod context;
pub mod pipelines;
pub mod targets;

use self::{
    context::GfxContext,
    pipelines::{
        billboard::{BillboardInstance, BillboardMode, BillboardPipeline, BillboardTexture},
        sphere::{SphereInstance, SphereMesh, SpherePipeline},
        SceneBindings, SceneUniform,
    },
    targets::{Targets, DEPTH_FORMAT},
};
use glam::{Mat4, Vec3};
use market_scene::{
    RenderBackend, ResourceDesc, ResourceId, SceneError, SceneGeneration, Viewport,
};
use std::collections::HashMap;
use std::sync::Arc;
use winit::window::Window;

/// Converts one sRGB component to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Clear color for an sRGB `background`, adjusted for the surface format.
pub fn clear_color(background: [f32; 3], surface_is_srgb: bool) -> wgpu::Color {
    let channel = |c: f32| {
        if surface_is_srgb {
            srgb_to_linear(c) as f64
        } else {
            c as f64
        }
    };
    wgpu::Color {
        r: channel(background[0]),
        g: channel(background[1]),
        b: channel(background[2]),
        a: 1.0,
    }
}

/// Instance data for one frame, in draw order.
#[derive(Debug, Default)]
pub struct DrawList {
    pub spheres: Vec<(ResourceId, SphereInstance)>,
    pub logos: Vec<(ResourceId, BillboardInstance)>,
    pub labels: Vec<(ResourceId, BillboardInstance)>,
}

impl DrawList {
    /// Collects every node of `generation`. `materials` maps material ids to
    /// linear RGBA; spheres whose material is unknown are skipped.
    pub fn build(generation: &SceneGeneration, materials: &HashMap<ResourceId, [f32; 4]>) -> Self {
        let mut list = DrawList::default();

        for sphere in &generation.spheres {
            let Some(color) = materials.get(&sphere.material) else {
                log::trace!("Sphere {} has no material on the GPU", sphere.entity_index);
                continue;
            };
            let model = Mat4::from_translation(sphere.position)
                * Mat4::from_rotation_y(sphere.rotation_y);
            list.spheres.push((
                sphere.geometry,
                SphereInstance {
                    model,
                    color: *color,
                },
            ));

            if let Some(logo) = &sphere.logo {
                list.logos.push((
                    logo.texture,
                    BillboardInstance::new(sphere.position.into(), [logo.scale, logo.scale]),
                ));
            }
        }

        for label in &generation.labels {
            list.labels.push((
                label.texture,
                BillboardInstance::new(label.position.into(), label.scale.into()),
            ));
        }

        list
    }

    /// Logos followed by labels, matching the billboard instance indices.
    fn billboard_instances(&self) -> Vec<BillboardInstance> {
        self.logos
            .iter()
            .chain(&self.labels)
            .map(|(_, instance)| *instance)
            .collect()
    }
}

struct Frame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// Owns all rendering-related state.
pub struct Renderer {
    pub gfx: GfxContext,
    pub egui_renderer: egui_wgpu::Renderer,
    scene: SceneBindings,
    spheres: SpherePipeline,
    billboards: BillboardPipeline,
    /// Present while a generation is attached.
    targets: Option<Targets>,
    meshes: HashMap<ResourceId, SphereMesh>,
    materials: HashMap<ResourceId, [f32; 4]>,
    textures: HashMap<ResourceId, BillboardTexture>,
    frame: Option<Frame>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window).await?;
        let color_fmt = gfx.config.format;

        let scene = SceneBindings::new(&gfx.device);
        let spheres = SpherePipeline::new(&gfx.device, &scene, color_fmt, DEPTH_FORMAT);
        let billboards = BillboardPipeline::new(&gfx.device, &scene, color_fmt, DEPTH_FORMAT);

        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, color_fmt, None, 1);

        Ok(Self {
            gfx,
            egui_renderer,
            scene,
            spheres,
            billboards,
            targets: None,
            meshes: HashMap::new(),
            materials: HashMap::new(),
            textures: HashMap::new(),
            frame: None,
        })
    }

    pub fn is_attached(&self) -> bool {
        self.targets.is_some()
    }

    /// Number of GPU objects mirroring scene resources.
    pub fn resource_count(&self) -> usize {
        self.meshes.len() + self.materials.len() + self.textures.len()
    }

    fn surface_is_srgb(&self) -> bool {
        self.gfx.config.format.is_srgb()
    }

    /// Resizes the swap chain even when no generation is attached.
    pub fn resize_surface(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gfx.resize(new_size);
    }

    /// Acquires the swap-chain texture for this frame.
    pub fn begin_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        if self.frame.is_some() {
            return Ok(());
        }
        let texture = self.gfx.surface.get_current_texture()?;
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.frame = Some(Frame { texture, view });
        Ok(())
    }

    /// Fills the acquired frame with `background` when no scene was drawn.
    pub fn clear_frame(&mut self, background: [f32; 3]) {
        let Some(frame) = &self.frame else {
            return;
        };
        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Clear Encoder"),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(background, self.surface_is_srgb())),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Draws tessellated egui output over the acquired frame.
    pub fn draw_ui(
        &mut self,
        shapes: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        let Some(frame) = &self.frame else {
            return;
        };

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        for (id, delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(&self.gfx.device, &self.gfx.queue, *id, delta);
        }

        self.egui_renderer.update_buffers(
            &self.gfx.device,
            &self.gfx.queue,
            &mut encoder,
            shapes,
            screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut render_pass, shapes, screen_descriptor);
        }

        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Presents the acquired frame, if any.
    pub fn present(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.texture.present();
        }
    }
}

impl RenderBackend for Renderer {
    fn attach(&mut self, viewport: Viewport) -> Result<(), SceneError> {
        if self.targets.is_some() {
            return Err(SceneError::Backend("surface already attached".into()));
        }
        self.gfx
            .resize(winit::dpi::PhysicalSize::new(viewport.width, viewport.height));
        self.targets = Some(Targets::new(&self.gfx.device, viewport));
        log::debug!("Surface attached at {}x{}", viewport.width, viewport.height);
        Ok(())
    }

    fn create_resource(&mut self, id: ResourceId, desc: &ResourceDesc) -> Result<(), SceneError> {
        if self.targets.is_none() {
            return Err(SceneError::Backend("no surface attached".into()));
        }

        match desc {
            ResourceDesc::SphereGeometry {
                radius,
                width_segments,
                height_segments,
            } => {
                let mesh =
                    SphereMesh::new(&self.gfx.device, *radius, *width_segments, *height_segments);
                self.meshes.insert(id, mesh);
            }
            ResourceDesc::SphereMaterial { color, opacity } => {
                let srgb = self.surface_is_srgb();
                let linear = color.map(|c| if srgb { srgb_to_linear(c) } else { c });
                self.materials
                    .insert(id, [linear[0], linear[1], linear[2], *opacity]);
            }
            ResourceDesc::SpriteTexture(image) => {
                let texture = self
                    .billboards
                    .create_texture(&self.gfx.device, &self.gfx.queue, image);
                self.textures.insert(id, texture);
            }
        }
        Ok(())
    }

    fn release_resource(&mut self, id: ResourceId) {
        let removed = self.meshes.remove(&id).is_some()
            || self.materials.remove(&id).is_some()
            || self.textures.remove(&id).is_some();
        if !removed {
            log::trace!("Release of unknown resource {}", id.raw());
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.gfx
            .resize(winit::dpi::PhysicalSize::new(viewport.width, viewport.height));
        if let Some(targets) = &mut self.targets {
            targets.resize(&self.gfx.device, viewport);
        }
    }

    fn render(&mut self, generation: &SceneGeneration) -> Result<(), SceneError> {
        let frame = self
            .frame
            .as_ref()
            .ok_or_else(|| SceneError::Backend("no frame acquired".into()))?;
        let targets = self
            .targets
            .as_ref()
            .ok_or_else(|| SceneError::Backend("no surface attached".into()))?;

        let draw = DrawList::build(generation, &self.materials);

        let ambient = generation
            .lights
            .iter()
            .fold(Vec3::ZERO, |acc, light| acc + Vec3::from(light.color) * light.intensity);
        let camera = &generation.camera;
        self.scene.write(
            &self.gfx.queue,
            &SceneUniform::new(camera.view_proj(), camera.view(), ambient),
        );

        let sphere_instances: Vec<SphereInstance> =
            draw.spheres.iter().map(|(_, instance)| *instance).collect();
        self.spheres
            .upload(&self.gfx.device, &self.gfx.queue, &sphere_instances);
        self.billboards
            .upload(&self.gfx.device, &self.gfx.queue, &draw.billboard_instances());

        let clear = clear_color(generation.background, self.gfx.config.format.is_srgb());
        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Logos first so the translucent shells blend over them.
            for (i, (texture, _)) in draw.logos.iter().enumerate() {
                if let Some(texture) = self.textures.get(texture) {
                    self.billboards.draw(
                        &mut pass,
                        &self.scene,
                        texture,
                        i as u32,
                        BillboardMode::Occluding,
                    );
                }
            }

            for (i, (geometry, _)) in draw.spheres.iter().enumerate() {
                if let Some(mesh) = self.meshes.get(geometry) {
                    self.spheres.draw(&mut pass, &self.scene, mesh, i as u32);
                }
            }

            let offset = draw.logos.len();
            for (i, (texture, _)) in draw.labels.iter().enumerate() {
                if let Some(texture) = self.textures.get(texture) {
                    self.billboards.draw(
                        &mut pass,
                        &self.scene,
                        texture,
                        (offset + i) as u32,
                        BillboardMode::Overlay,
                    );
                }
            }
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn detach(&mut self) {
        if self.targets.take().is_some() {
            log::debug!("Surface detached");
        }
        if self.resource_count() > 0 {
            log::warn!(
                "Detaching with {} GPU objects still alive; dropping them",
                self.resource_count()
            );
            self.meshes.clear();
            self.materials.clear();
            self.textures.clear();
        }
    }
}
