pub mod billboard;
pub mod sphere;

use glam::{Mat4, Vec3};

/// Per-frame camera and lighting data shared by every scene pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: Mat4, // 64 B
    /// World-space camera right vector; w unused.
    pub cam_right: [f32; 4], // +16
    /// World-space camera up vector; w unused.
    pub cam_up: [f32; 4], // +16
    /// Summed ambient light; w unused.
    pub ambient: [f32; 4], // +16 -> 112
}

// Buffer size must match the WGSL struct.
const _: [(); 112] = [(); core::mem::size_of::<SceneUniform>()];

impl SceneUniform {
    pub fn new(view_proj: Mat4, view: Mat4, ambient: Vec3) -> Self {
        // Rows of the view rotation are the camera basis in world space.
        let right = view.row(0).truncate();
        let up = view.row(1).truncate();
        Self {
            view_proj,
            cam_right: right.extend(0.0).into(),
            cam_up: up.extend(0.0).into(),
            ambient: ambient.extend(1.0).into(),
        }
    }
}

/// WGSL declaration matching [`SceneUniform`], prepended to every shader.
pub const SCENE_WGSL: &str = r#"
struct Scene {
    view_proj: mat4x4<f32>,
    cam_right: vec4<f32>,
    cam_up:    vec4<f32>,
    ambient:   vec4<f32>,
};
@group(0) @binding(0) var<uniform> scene: Scene;
"#;

/// The scene uniform buffer and its bind group (group 0 of every pipeline).
pub struct SceneBindings {
    pub layout: wgpu::BindGroupLayout,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl SceneBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene BGL"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<SceneUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            layout,
            buffer,
            bind_group,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, uniform: &SceneUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniform));
    }
}

/// Vertex buffer for per-instance data that grows on demand.
pub struct InstanceBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: u64,
}

impl InstanceBuffer {
    const MIN_CAPACITY: u64 = 1024;

    pub fn new(device: &wgpu::Device, label: &'static str) -> Self {
        Self {
            label,
            buffer: Self::allocate(device, label, Self::MIN_CAPACITY),
            capacity: Self::MIN_CAPACITY,
        }
    }

    fn allocate(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Uploads `bytes` from offset 0, reallocating if they do not fit.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let needed = bytes.len() as u64;
        if needed > self.capacity {
            self.capacity = needed.next_power_of_two();
            self.buffer = Self::allocate(device, self.label, self.capacity);
            log::debug!("{} grown to {} bytes", self.label, self.capacity);
        }
        queue.write_buffer(&self.buffer, 0, bytes);
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}
