use super::helpers;
use super::targets::SimTargets;
use super::ImageTexture;
use hero_core::{CompositeUniforms, Field, FrameOutput};

/// Draws the image plane into the swapchain.
pub(crate) struct Compositor {
    pipeline: wgpu::RenderPipeline,
    fields_bgl: wgpu::BindGroupLayout,
    images_bgl: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    placeholder: wgpu::Texture,
    placeholder_view: wgpu::TextureView,
    // (texture revision, group 1)
    images_bg: Option<(u64, wgpu::BindGroup)>,
}

impl Compositor {
    pub(crate) fn new(device: &wgpu::Device, queue: &wgpu::Queue, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("composite_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::shaders::COMPOSITE_WGSL.into()),
        });
        let fields_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("composite_fields_bgl"),
            entries: &[
                helpers::uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                helpers::sampler_entry(1),
                helpers::texture_entry(2), // velocity
                helpers::texture_entry(3), // density
            ],
        });
        let images_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("composite_images_bgl"),
            entries: &[helpers::texture_entry(0), helpers::texture_entry(1)],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("composite_pl"),
            bind_group_layouts: &[&fields_bgl, &images_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = helpers::make_pipeline(
            device,
            "composite_pipeline",
            &layout,
            &shader,
            "vs_quad",
            "fs_composite",
            surface_format,
        );
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("composite_uniforms"),
            size: std::mem::size_of::<CompositeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Bound in place of the next image until it has loaded
        let (placeholder, placeholder_view) = helpers::create_color_texture(
            device,
            "placeholder_image",
            1,
            1,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &placeholder,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[0, 0, 0, 255],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );

        Self {
            pipeline,
            fields_bgl,
            images_bgl,
            uniform_buffer,
            placeholder,
            placeholder_view,
            images_bg: None,
        }
    }

    /// Drop the cached image bind group; it references textures that are
    /// about to be destroyed.
    pub(crate) fn invalidate_images(&mut self) {
        self.images_bg = None;
    }

    fn refresh_images(
        &mut self,
        device: &wgpu::Device,
        revision: u64,
        current: &ImageTexture,
        next: Option<&ImageTexture>,
    ) {
        let stale = !matches!(&self.images_bg, Some((rev, _)) if *rev == revision);
        if stale {
            log::debug!("[gpu] rebuilding image bind group (revision {})", revision);
            let next_view = next.map(|t| &t.view).unwrap_or(&self.placeholder_view);
            let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("composite_images_bg"),
                layout: &self.images_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&current.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(next_view),
                    },
                ],
            });
            self.images_bg = Some((revision, bg));
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn encode(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clear: wgpu::Color,
        targets: &SimTargets,
        sampler: &wgpu::Sampler,
        out: &FrameOutput,
        images: Option<(&ImageTexture, Option<&ImageTexture>)>,
    ) {
        let (current, next) = match images {
            Some(pair) if out.render => pair,
            _ => {
                // Nothing to draw yet: clear only.
                let _ = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("composite_clear"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(clear),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                return;
            }
        };

        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&out.composite));
        let fields = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("composite_fields_bg"),
            layout: &self.fields_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(targets.read_view(Field::Velocity)),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(targets.read_view(Field::Density)),
                },
            ],
        });
        self.refresh_images(device, out.texture_revision, current, next);
        let Some((_, images_bg)) = &self.images_bg else {
            return;
        };
        helpers::draw_pass(
            encoder,
            "composite",
            target,
            wgpu::LoadOp::Clear(clear),
            &self.pipeline,
            &fields,
            images_bg,
            6,
        );
    }

    pub(crate) fn destroy(&mut self) {
        self.images_bg = None;
        self.placeholder.destroy();
    }
}
