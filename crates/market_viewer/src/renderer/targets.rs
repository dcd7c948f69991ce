//! Depth target shared by the scene passes.

use market_scene::Viewport;

pub struct Targets {
    // Keeps the texture alive for the lifetime of the view.
    _depth_tex: wgpu::Texture,
    pub depth: wgpu::TextureView,
    pub depth_fmt: wgpu::TextureFormat,
    pub size: Viewport,
}

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

impl Targets {
    pub fn new(device: &wgpu::Device, size: Viewport) -> Self {
        // Ensure non‑zero dimensions.
        let width = size.width.max(1);
        let height = size.height.max(1);

        let depth_tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Depth Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Self {
            depth: depth_tex.create_view(&wgpu::TextureViewDescriptor::default()),
            _depth_tex: depth_tex,
            depth_fmt: DEPTH_FORMAT,
            size,
        }
    }

    /// Recreates the target if the size changed.
    pub fn resize(&mut self, device: &wgpu::Device, size: Viewport) {
        if size != self.size {
            *self = Self::new(device, size);
        }
    }
}
