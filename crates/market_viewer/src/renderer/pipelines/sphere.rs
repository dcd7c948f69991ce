//! Translucent entity spheres.

use super::{InstanceBuffer, SceneBindings, SCENE_WGSL};
use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// One drawn sphere: its model matrix and material color.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereInstance {
    pub model: Mat4,
    /// Linear RGB plus opacity.
    pub color: [f32; 4],
}

/// Generates a UV sphere of `radius` centered on the origin.
///
/// Vertices form a `(width_segments + 1) x (height_segments + 1)` grid from
/// the north pole (+Y) down; the seam and pole rows are duplicated so every
/// quad has its own corners. Degenerate pole triangles are skipped.
pub fn generate_sphere(
    radius: f32,
    width_segments: u32,
    height_segments: u32,
) -> (Vec<SphereVertex>, Vec<u32>) {
    let w = width_segments.max(3);
    let h = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let normal = sphere_point(u, v);
            vertices.push(SphereVertex {
                position: (normal * radius).into(),
                normal: normal.into(),
            });
        }
    }

    let row = w + 1;
    let mut indices = Vec::with_capacity((w * (h - 1) * 6) as usize);
    for iy in 0..h {
        for ix in 0..w {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    (vertices, indices)
}

/// Unit-sphere point for texture coordinates `u` (around) and `v` (down).
fn sphere_point(u: f32, v: f32) -> Vec3 {
    let phi = u * TAU;
    let theta = v * PI;
    Vec3::new(
        -phi.cos() * theta.sin(),
        theta.cos(),
        phi.sin() * theta.sin(),
    )
}

/// GPU copy of a sphere geometry resource.
pub struct SphereMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl SphereMesh {
    pub fn new(device: &wgpu::Device, radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let (vertices, indices) = generate_sphere(radius, width_segments, height_segments);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere VB"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere IB"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertices: vertex_buffer,
            indices: index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

const SPHERE_WGSL: &str = r#"
struct VsIn {
    @location(0) position: vec3<f32>,
    @location(1) normal:   vec3<f32>,
    @location(2) m0: vec4<f32>,
    @location(3) m1: vec4<f32>,
    @location(4) m2: vec4<f32>,
    @location(5) m3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color:  vec4<f32>,
};

@vertex
fn vs_main(in: VsIn) -> VsOut {
    let model = mat4x4<f32>(in.m0, in.m1, in.m2, in.m3);
    var out: VsOut;
    out.clip = scene.view_proj * model * vec4<f32>(in.position, 1.0);
    out.normal = (model * vec4<f32>(in.normal, 0.0)).xyz;
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    // Ambient only, with a slight top-down falloff so the shape reads.
    let shade = 0.85 + 0.15 * normalize(in.normal).y;
    return vec4<f32>(in.color.rgb * scene.ambient.rgb * shade, in.color.a);
}
"#;

pub struct SpherePipeline {
    pipeline: wgpu::RenderPipeline,
    instances: InstanceBuffer,
}

impl SpherePipeline {
    pub fn new(
        device: &wgpu::Device,
        scene: &SceneBindings,
        color_fmt: wgpu::TextureFormat,
        depth_fmt: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sphere WGSL"),
            source: wgpu::ShaderSource::Wgsl(format!("{SCENE_WGSL}{SPHERE_WGSL}").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sphere Pipeline Layout"),
            bind_group_layouts: &[&scene.layout],
            push_constant_ranges: &[],
        });

        let vbuf_layouts = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<SphereVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<SphereInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![
                    2 => Float32x4,
                    3 => Float32x4,
                    4 => Float32x4,
                    5 => Float32x4,
                    6 => Float32x4
                ],
            },
        ];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sphere Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &vbuf_layouts,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Translucent: the far side shows through.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_fmt,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_fmt,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            instances: InstanceBuffer::new(device, "Sphere Instance VB"),
        }
    }

    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[SphereInstance]) {
        self.instances
            .write(device, queue, bytemuck::cast_slice(instances));
    }

    /// Draws instance `instance` of the last upload with `mesh`.
    pub fn draw<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        scene: &'a SceneBindings,
        mesh: &'a SphereMesh,
        instance: u32,
    ) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &scene.bind_group, &[]);
        rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
        rpass.set_vertex_buffer(1, self.instances.buffer().slice(..));
        rpass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..mesh.index_count, 0, instance..instance + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_counts_match_segments() {
        let (vertices, indices) = generate_sphere(2.0, 32, 32);
        assert_eq!(vertices.len(), 33 * 33);
        // Full quads on inner rows, one triangle per quad on the pole rows.
        assert_eq!(indices.len(), (30 * 32 * 6 + 2 * 32 * 3) as usize);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn vertices_lie_on_the_radius() {
        let (vertices, _) = generate_sphere(2.0, 16, 8);
        for v in &vertices {
            let p = Vec3::from(v.position);
            let n = Vec3::from(v.normal);
            assert!((p.length() - 2.0).abs() < 1e-5);
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn first_row_is_the_north_pole() {
        let (vertices, _) = generate_sphere(1.0, 8, 4);
        let pole = Vec3::from(vertices[0].position);
        assert!(pole.distance(Vec3::Y) < 1e-6);
        let south = Vec3::from(vertices[vertices.len() - 1].position);
        assert!(south.distance(-Vec3::Y) < 1e-5);
    }

    #[test]
    fn degenerate_segments_are_clamped() {
        let (vertices, indices) = generate_sphere(1.0, 1, 1);
        assert_eq!(vertices.len(), 4 * 3);
        assert_eq!(indices.len(), 2 * 3 * 3);
    }
}
