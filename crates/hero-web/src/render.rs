use crate::constants::{CLEAR_COLOR, MAX_IMAGE_DIMENSION};
use hero_core::{FrameOutput, Release};
use web_sys as web;

mod compositor;
mod helpers;
mod passes;
mod targets;

use compositor::Compositor;
use passes::FluidPasses;
use targets::SimTargets;

/// A decoded photograph resident on the GPU.
pub struct ImageTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl ImageTexture {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Release for ImageTexture {
    fn release(self) {
        self.texture.destroy();
    }
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    sampler: wgpu::Sampler,
    targets: SimTargets,
    passes: FluidPasses,
    compositor: Compositor,
    width: u32,
    height: u32,
    clear_color: wgpu::Color,
    disposed: bool,
}

impl GpuState {
    pub async fn new(canvas: &web::HtmlCanvasElement, sim_resolution: u32) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: Some("hero_device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sampler = helpers::linear_clamp_sampler(&device);
        let targets = SimTargets::new(&device, sim_resolution);
        let passes = FluidPasses::new(&device);
        let compositor = Compositor::new(&device, &queue, format);
        log::info!(
            "[gpu] ready: surface {}x{} {:?}, sim grid {}",
            width,
            height,
            format,
            targets.resolution()
        );
        let [r, g, b, a] = CLEAR_COLOR;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            sampler,
            targets,
            passes,
            compositor,
            width,
            height,
            clear_color: wgpu::Color { r, g, b, a },
            disposed: false,
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || self.disposed {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload RGBA8 pixels as an sRGB image texture, downscaling anything
    /// larger than the device (or [`MAX_IMAGE_DIMENSION`]) allows.
    pub fn upload_image(&self, image: image::RgbaImage) -> ImageTexture {
        let limit = self
            .device
            .limits()
            .max_texture_dimension_2d
            .min(MAX_IMAGE_DIMENSION);
        let image = if image.width() > limit || image.height() > limit {
            let scale = limit as f32 / image.width().max(image.height()) as f32;
            let w = ((image.width() as f32 * scale) as u32).max(1);
            let h = ((image.height() as f32 * scale) as u32).max(1);
            log::info!("[loader] downscaling {}x{} to {}x{}", image.width(), image.height(), w, h);
            image::imageops::resize(&image, w, h, image::imageops::FilterType::Triangle)
        } else {
            image
        };
        let (width, height) = image.dimensions();
        let (texture, view) = helpers::create_color_texture(
            &self.device,
            "hero_image",
            width,
            height,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        ImageTexture {
            texture,
            view,
            width,
            height,
        }
    }

    /// Encode the frame's simulation passes followed by the compositor and
    /// submit them together.
    pub fn execute(
        &mut self,
        out: &FrameOutput,
        current: Option<&ImageTexture>,
        next: Option<&ImageTexture>,
    ) -> Result<(), wgpu::SurfaceError> {
        if self.disposed {
            return Ok(());
        }
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.reconfigure();
                self.surface.get_current_texture()?
            }
            Err(e) => return Err(e),
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("hero_encoder"),
            });

        self.passes.encode(
            &self.device,
            &self.queue,
            &mut encoder,
            &mut self.targets,
            &self.sampler,
            &out.plan,
        );
        self.compositor.encode(
            &self.device,
            &self.queue,
            &mut encoder,
            &view,
            self.clear_color,
            &self.targets,
            &self.sampler,
            out,
            current.map(|c| (c, next)),
        );

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Destroy every GPU resource owned here. Image textures are owned by
    /// the lifecycle and released there. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.compositor.destroy();
        self.targets.destroy();
        log::info!("[gpu] disposed");
    }

    pub fn invalidate_images(&mut self) {
        self.compositor.invalidate_images();
    }
}
