//! Camera-facing textured quads for labels and logos.

use super::{InstanceBuffer, SceneBindings, SCENE_WGSL};
use image::RgbaImage;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BillboardInstance {
    pub center: [f32; 3],
    pub _pad0: f32,
    /// World-space width and height.
    pub size: [f32; 2],
    pub _pad1: [f32; 2],
}

impl BillboardInstance {
    pub fn new(center: [f32; 3], size: [f32; 2]) -> Self {
        Self {
            center,
            _pad0: 0.0,
            size,
            _pad1: [0.0; 2],
        }
    }
}

const _: [(); 32] = [(); core::mem::size_of::<BillboardInstance>()];

const BILLBOARD_WGSL: &str = r#"
struct VsIn {
    @builtin(vertex_index) vid: u32,
    @location(0) center: vec3<f32>,
    @location(1) size:   vec2<f32>,
};

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(1) @binding(0) var sprite_tex: texture_2d<f32>;
@group(1) @binding(1) var sprite_smp: sampler;

var<private> CORNERS: array<vec2<f32>, 6> = array<vec2<f32>, 6>(
    vec2<f32>(-0.5, -0.5), vec2<f32>(0.5, -0.5), vec2<f32>(0.5, 0.5),
    vec2<f32>(-0.5, -0.5), vec2<f32>(0.5, 0.5),  vec2<f32>(-0.5, 0.5),
);

@vertex
fn vs_main(in: VsIn) -> VsOut {
    let c = CORNERS[in.vid];
    let world = in.center
        + scene.cam_right.xyz * (c.x * in.size.x)
        + scene.cam_up.xyz * (c.y * in.size.y);

    var out: VsOut;
    out.clip = scene.view_proj * vec4<f32>(world, 1.0);
    out.uv = vec2<f32>(c.x + 0.5, 0.5 - c.y);
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let texel = textureSample(sprite_tex, sprite_smp, in.uv);
    if (texel.a < 0.01) {
        discard;
    }
    return texel;
}
"#;

/// GPU copy of a sprite texture resource.
pub struct BillboardTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// How a billboard interacts with the depth buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillboardMode {
    /// Writes depth so translucent geometry drawn later layers over it.
    Occluding,
    /// Depth-tested only, blended over everything already drawn.
    Overlay,
}

pub struct BillboardPipeline {
    occluding: wgpu::RenderPipeline,
    overlay: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    instances: InstanceBuffer,
}

impl BillboardPipeline {
    pub fn new(
        device: &wgpu::Device,
        scene: &SceneBindings,
        color_fmt: wgpu::TextureFormat,
        depth_fmt: wgpu::TextureFormat,
    ) -> Self {
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Billboard Texture BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Billboard Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Billboard WGSL"),
            source: wgpu::ShaderSource::Wgsl(format!("{SCENE_WGSL}{BILLBOARD_WGSL}").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Billboard Pipeline Layout"),
            bind_group_layouts: &[&scene.layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str, depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<BillboardInstance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &[
                            wgpu::VertexAttribute {
                                shader_location: 0,
                                offset: 0,
                                format: wgpu::VertexFormat::Float32x3,
                            },
                            wgpu::VertexAttribute {
                                shader_location: 1,
                                offset: 16,
                                format: wgpu::VertexFormat::Float32x2,
                            },
                        ],
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: depth_fmt,
                    depth_write_enabled: depth_write,
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
            })
        };

        Self {
            occluding: make_pipeline("Billboard Pipeline (occluding)", true),
            overlay: make_pipeline("Billboard Pipeline (overlay)", false),
            texture_layout,
            sampler,
            instances: InstanceBuffer::new(device, "Billboard Instance VB"),
        }
    }

    /// Uploads an RGBA bitmap as an sRGB texture with its own bind group.
    pub fn create_texture(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
    ) -> BillboardTexture {
        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Billboard Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        if width > 0 && height > 0 {
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                image.as_raw(),
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                size,
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Billboard Texture Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        BillboardTexture {
            _texture: texture,
            bind_group,
        }
    }

    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        instances: &[BillboardInstance],
    ) {
        self.instances
            .write(device, queue, bytemuck::cast_slice(instances));
    }

    /// Draws instance `instance` of the last upload with `texture`.
    pub fn draw<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        scene: &'a SceneBindings,
        texture: &'a BillboardTexture,
        instance: u32,
        mode: BillboardMode,
    ) {
        let pipeline = match mode {
            BillboardMode::Occluding => &self.occluding,
            BillboardMode::Overlay => &self.overlay,
        };
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &scene.bind_group, &[]);
        rpass.set_bind_group(1, &texture.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.instances.buffer().slice(..));
        rpass.draw(0..6, instance..instance + 1);
    }
}
