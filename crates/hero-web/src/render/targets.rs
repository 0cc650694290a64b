use super::helpers;
use hero_core::{Field, PingPong};

pub(crate) const FIELD_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

pub(crate) struct FieldTarget {
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
}

impl FieldTarget {
    fn new(device: &wgpu::Device, label: &str, resolution: u32) -> Self {
        let (texture, view) = helpers::create_color_texture(
            device,
            label,
            resolution,
            resolution,
            FIELD_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        Self { texture, view }
    }
}

/// GPU field store: velocity and density ping-pong pairs plus the curl
/// scratch target, all `resolution` x `resolution`.
///
/// Fresh WebGPU textures are zero-filled, so a new store starts at rest.
pub(crate) struct SimTargets {
    resolution: u32,
    velocity: PingPong<FieldTarget>,
    density: PingPong<FieldTarget>,
    curl: FieldTarget,
}

impl SimTargets {
    pub(crate) fn new(device: &wgpu::Device, resolution: u32) -> Self {
        Self {
            resolution,
            velocity: PingPong::from_fn(|i| {
                FieldTarget::new(device, if i == 0 { "velocity_0" } else { "velocity_1" }, resolution)
            }),
            density: PingPong::from_fn(|i| {
                FieldTarget::new(device, if i == 0 { "density_0" } else { "density_1" }, resolution)
            }),
            curl: FieldTarget::new(device, "curl", resolution),
        }
    }

    pub(crate) fn resolution(&self) -> u32 {
        self.resolution
    }

    /// View holding the latest result for `field`.
    pub(crate) fn read_view(&self, field: Field) -> &wgpu::TextureView {
        match field {
            Field::Velocity => &self.velocity.read().view,
            Field::Density => &self.density.read().view,
            Field::Curl => &self.curl.view,
        }
    }

    pub(crate) fn write_view(&self, field: Field) -> &wgpu::TextureView {
        match field {
            Field::Velocity => &self.velocity.write_target().view,
            Field::Density => &self.density.write_target().view,
            Field::Curl => &self.curl.view,
        }
    }

    pub(crate) fn swap(&mut self, field: Field) {
        match field {
            Field::Velocity => self.velocity.swap(),
            Field::Density => self.density.swap(),
            Field::Curl => {}
        }
    }

    pub(crate) fn destroy(&self) {
        for t in self.velocity.iter().chain(self.density.iter()) {
            t.texture.destroy();
        }
        self.curl.texture.destroy();
    }
}
