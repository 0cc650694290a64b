use super::helpers;
use super::targets::{SimTargets, FIELD_FORMAT};
use hero_core::{FramePlan, Pass, SimUniforms};

/// Pipelines and per-pass uniform buffers for the fluid kernels.
///
/// Every [`Pass`] owns its uniform buffer. `queue.write_buffer` calls are
/// all applied before the encoder runs, so sharing one buffer between passes
/// would leave every pass reading the last write.
pub(crate) struct FluidPasses {
    splat: wgpu::RenderPipeline,
    curl: wgpu::RenderPipeline,
    vorticity: wgpu::RenderPipeline,
    advect: wgpu::RenderPipeline,
    fields_bgl: wgpu::BindGroupLayout,
    uniform_buffers: Vec<wgpu::Buffer>,
    uniform_bind_groups: Vec<wgpu::BindGroup>,
}

impl FluidPasses {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fluid_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::shaders::FLUID_WGSL.into()),
        });
        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("fluid_uniform_bgl"),
            entries: &[helpers::uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
        });
        let fields_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("fluid_fields_bgl"),
            entries: &[
                helpers::texture_entry(0), // src
                helpers::texture_entry(1), // aux
                helpers::sampler_entry(2),
            ],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fluid_pl"),
            bind_group_layouts: &[&uniform_bgl, &fields_bgl],
            push_constant_ranges: &[],
        });
        let make = |pass: Pass| {
            helpers::make_pipeline(
                device,
                pass.entry_point(),
                &layout,
                &shader,
                "vs_fullscreen",
                pass.entry_point(),
                FIELD_FORMAT,
            )
        };

        let mut uniform_buffers = Vec::with_capacity(Pass::ALL.len());
        let mut uniform_bind_groups = Vec::with_capacity(Pass::ALL.len());
        for pass in Pass::ALL {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(pass.label()),
                size: std::mem::size_of::<SimUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            uniform_bind_groups.push(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(pass.label()),
                layout: &uniform_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            }));
            uniform_buffers.push(buffer);
        }

        Self {
            splat: make(Pass::SplatVelocity),
            curl: make(Pass::Curl),
            vorticity: make(Pass::Vorticity),
            advect: make(Pass::AdvectVelocity),
            fields_bgl,
            uniform_buffers,
            uniform_bind_groups,
        }
    }

    fn pipeline(&self, pass: Pass) -> &wgpu::RenderPipeline {
        match pass {
            Pass::SplatVelocity | Pass::SplatDensity => &self.splat,
            Pass::Curl => &self.curl,
            Pass::Vorticity => &self.vorticity,
            Pass::AdvectVelocity | Pass::AdvectDensity => &self.advect,
        }
    }

    /// Encode the frame's passes in plan order, swapping each double-buffered
    /// output as soon as it is written.
    pub(crate) fn encode(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        targets: &mut SimTargets,
        sampler: &wgpu::Sampler,
        plan: &FramePlan,
    ) {
        for (pass, uniforms) in &plan.passes {
            let idx = pass.index();
            queue.write_buffer(&self.uniform_buffers[idx], 0, bytemuck::bytes_of(uniforms));
            let fields = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("fluid_fields_bg"),
                layout: &self.fields_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(targets.read_view(pass.source())),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(targets.read_view(pass.aux())),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            });
            helpers::draw_pass(
                encoder,
                pass.label(),
                targets.write_view(pass.output()),
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                self.pipeline(*pass),
                &self.uniform_bind_groups[idx],
                &fields,
                3,
            );
            if pass.swaps_output() {
                targets.swap(pass.output());
            }
        }
    }
}
