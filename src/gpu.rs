//! GPU backend: the whole frame in one full-screen fragment pass.

use bytemuck::{Pod, Zeroable};
use log::trace;

use crate::{
    backend::{BackendKind, Renderer},
    error::BackendError,
    frame::FrameBuffer,
    gfx::{self, Gpu},
    screen,
    uniform::Uniform,
    view::{ViewParams, MAX_ITERATIONS_LIMIT},
};

const JULIA_SHADER: &str = include_str!("julia.wgsl");

/// Fragment shader source with the loop bound filled in.
pub fn shader_source() -> String {
    JULIA_SHADER.replace("MAX_ITERATIONS_LIMIT", &MAX_ITERATIONS_LIMIT.to_string())
}

/// Corresponds to `julia.wgsl#Params`.
#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, PartialEq)]
pub struct Uniforms {
    pub resolution: [f32; 2],
    pub c: [f32; 2],
    pub center: [f32; 2],
    pub scale: f32,
    pub escape_radius: f32,
    pub max_iterations: u32,
    pub colour_mode: u32,
    pub padding: [u32; 2],
}

impl Uniforms {
    pub fn new(params: &ViewParams) -> Self {
        let viewport = params.viewport();
        let c = params.c();
        let center = params.center();
        Uniforms {
            resolution: [viewport.width as f32, viewport.height as f32],
            c: [c.real as f32, c.imaginary as f32],
            center: [center.x as f32, center.y as f32],
            scale: params.scale() as f32,
            escape_radius: params.escape_radius() as f32,
            max_iterations: params.max_iterations().min(MAX_ITERATIONS_LIMIT),
            colour_mode: params.colour_mode().flag(),
            padding: [0; 2],
        }
    }
}

pub struct GpuBackend {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniforms: Uniform<Uniforms>,
    format: wgpu::TextureFormat,
}

impl GpuBackend {
    /// Compiles and links the Julia pipeline for `format` targets.
    pub fn new(gpu: &Gpu, format: wgpu::TextureFormat, params: &ViewParams) -> Result<Self, BackendError> {
        let bind_group_layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("julia-bind-group-layout"),
                entries: &[Uniform::<Uniforms>::layout_entry(
                    0,
                    wgpu::ShaderStages::FRAGMENT,
                )],
            });

        let pipeline = gpu.quad_pipeline(
            "julia-pipeline",
            &shader_source(),
            &bind_group_layout,
            format,
        )?;

        let uniforms = Uniform::new(&gpu.device, "julia-uniforms", Uniforms::new(params));

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("julia-bind-group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.binding_resource(),
            }],
        });

        Ok(GpuBackend {
            pipeline,
            bind_group,
            uniforms,
            format,
        })
    }

    /// A backend that can render with [`GpuBackend::render_offscreen`].
    pub fn offscreen(gpu: &Gpu, params: &ViewParams) -> Result<Self, BackendError> {
        Self::new(gpu, wgpu::TextureFormat::Rgba8Unorm, params)
    }

    fn encode(
        &self,
        gpu: &Gpu,
        params: &ViewParams,
        target: &wgpu::TextureView,
    ) -> wgpu::CommandBuffer {
        self.uniforms.write(&gpu.queue, Uniforms::new(params));

        let mut command_encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("julia-encoder"),
            });
        gfx::draw_quad(
            &mut command_encoder,
            "julia-pass",
            target,
            &self.pipeline,
            &self.bind_group,
        );
        command_encoder.finish()
    }

    /// Renders into a texture and copies the result back to the host.
    pub fn render_offscreen(
        &self,
        gpu: &Gpu,
        params: &ViewParams,
    ) -> Result<FrameBuffer, BackendError> {
        if self.format != wgpu::TextureFormat::Rgba8Unorm {
            return Err(BackendError::UnsupportedFormat(self.format));
        }
        let size = params.viewport();
        if size.is_empty() {
            return Ok(FrameBuffer::new(size));
        }

        let texture = gpu.viewport_texture(
            "julia-offscreen-texture",
            size,
            self.format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        gpu.queue.submit([self.encode(gpu, params, &view)]);
        gpu.read_texture(&texture, size)
    }
}

impl Renderer for GpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu
    }

    fn resize(&mut self, _gpu: &Gpu, _size: screen::Size) {}

    fn draw(&mut self, gpu: &Gpu, params: &ViewParams, target: &wgpu::TextureView) {
        trace!("begin gpu frame");
        gpu.queue.submit([self.encode(gpu, params, target)]);
        trace!("end gpu frame");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        screen::{Position, Size},
        view::{ColourMode, Limits},
    };

    #[test]
    fn loop_bound_is_substituted() {
        let source = shader_source();
        assert!(source.contains(&format!("i < {}u", MAX_ITERATIONS_LIMIT)));
        assert!(!source.contains("MAX_ITERATIONS_LIMIT"));
    }

    #[test]
    fn uniforms_match_shader_layout() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 48);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }

    #[test]
    fn uniforms_carry_view_state() {
        let mut params = ViewParams::new(Size::new(320, 200), Limits::default());
        params.recenter(Position::new(10.0, 20.0));
        params.set_colour_mode(ColourMode::BlackWhite);
        let uniforms = Uniforms::new(&params);
        assert_eq!(uniforms.resolution, [320.0, 200.0]);
        assert_eq!(uniforms.c, [-0.8f64 as f32, 0.156f64 as f32]);
        assert_eq!(uniforms.center, [10.0, 20.0]);
        assert_eq!(uniforms.scale, 300.0);
        assert_eq!(uniforms.escape_radius, 2.0);
        assert_eq!(uniforms.max_iterations, 100);
        assert_eq!(uniforms.colour_mode, 1);
    }
}
