use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::debug;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::runtime::Viewport;
use crate::types::{AdapterProfile, RendererConfig};

use super::context::GpuContext;
use super::pipeline::{create_slide_pipeline, PipelineLayouts, QUAD_VERTEX_COUNT};
use super::surface::BlendSurface;
use super::textures::{self, SlideLayers, SlideTextures};
use super::uniforms::SliderUniforms;

const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.04,
    g: 0.04,
    b: 0.05,
    a: 1.0,
};

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }

    fn for_context(context: &GpuContext) -> Option<Self> {
        (context.sample_count > 1).then(|| {
            Self::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        })
    }
}

/// Everything needed to draw the slide plane into the window.
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    slides_bind_group: wgpu::BindGroup,
    _slides: SlideTextures,
    surface: BlendSurface,
    multisample_target: Option<MultisampleTarget>,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        viewport: &Viewport,
        config: &RendererConfig,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(
            target,
            initial_size,
            config.antialiasing,
            config.color_space,
        )?;

        let max_layers = context.adapter_profile.max_texture_array_layers as usize;
        if config.images.len() > max_layers {
            anyhow::bail!(
                "GPU supports {max_layers} texture layers, {} images requested",
                config.images.len()
            );
        }
        let layers = SlideLayers::load(
            &config.images,
            context.adapter_profile.max_texture_dimension_2d,
        );
        let slides = textures::upload(&context.device, &context.queue, &layers, context.color_space)?;

        let layouts = PipelineLayouts::new(&context.device);
        let pipeline = create_slide_pipeline(
            &context.device,
            &layouts,
            context.surface_format,
            context.sample_count,
        )?;

        let surface = BlendSurface::new(slides.layer_count as usize, viewport);
        let uniform_buffer =
            context
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("slider uniforms"),
                    contents: bytemuck::bytes_of(surface.uniforms()),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
        let slides_bind_group = layouts.slides_bind_group(&context.device, &slides);
        let multisample_target = MultisampleTarget::for_context(&context);

        debug!(
            images = slides.layer_count,
            sample_count = context.sample_count,
            format = ?context.surface_format,
            "GPU state ready"
        );

        Ok(Self {
            context,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            slides_bind_group,
            _slides: slides,
            surface,
            multisample_target,
        })
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    pub(crate) fn surface_mut(&mut self) -> &mut BlendSurface {
        &mut self.surface
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>, viewport: &Viewport) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        let previous = self.context.size;
        self.context.resize(new_size);
        self.surface.resize(viewport);
        if self.context.size != previous {
            self.multisample_target = MultisampleTarget::for_context(&self.context);
        }
    }

    /// Reconfigures the swapchain after `Lost`/`Outdated`.
    pub(crate) fn recover_surface(&mut self) {
        self.context.reconfigure();
    }

    pub(crate) fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;

        if let Some(uniforms) = self.surface.take_dirty() {
            self.context.queue.write_buffer(
                &self.uniform_buffer,
                0,
                bytemuck::bytes_of::<SliderUniforms>(uniforms),
            );
        }

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });

        {
            let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
                Some(msaa) => (&msaa.view, Some(&view)),
                None => (&view, None),
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("slide pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &self.slides_bind_group, &[]);
            render_pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
