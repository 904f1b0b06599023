//! CPU backend: escape-time and colour for every pixel on the host, then
//! presented as a texture.

use std::num::NonZeroU32;

use log::trace;
use rayon::prelude::{IndexedParallelIterator, ParallelIterator, ParallelSliceMut};

use crate::{
    backend::{BackendKind, Renderer},
    colour::colour,
    error::BackendError,
    escape::escape_time,
    frame::{FrameBuffer, BYTES_PER_PIXEL},
    gfx::{self, Gpu},
    screen,
    view::ViewParams,
};

const BLIT_SHADER: &str = include_str!("blit.wgsl");

/// Renders complete frames. Rows are shared out over a thread pool; every
/// pixel writes only its own four bytes.
pub struct CpuRenderer {
    pool: rayon::ThreadPool,
}

impl CpuRenderer {
    pub fn new(threads: usize) -> Result<Self, BackendError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("julia-cpu-{}", index))
            .build()?;
        Ok(CpuRenderer { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn render(&self, params: &ViewParams) -> FrameBuffer {
        trace!("begin cpu render");

        let mut frame = FrameBuffer::new(params.viewport());
        if params.viewport().is_empty() {
            return frame;
        }

        let stride = frame.stride();
        let max_iterations = params.max_iterations();
        let mode = params.colour_mode();

        self.pool.install(|| {
            frame
                .as_bytes_mut()
                .par_chunks_exact_mut(stride)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, pixel) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                        let iterations = escape_time(x as u32, y as u32, params);
                        pixel.copy_from_slice(&colour(iterations, max_iterations, mode));
                    }
                });
        });

        trace!("end cpu render");
        frame
    }
}

struct FrameTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    size: screen::Size,
}

/// Presents [`CpuRenderer`] frames through a textured full-screen quad.
pub struct CpuBackend {
    renderer: CpuRenderer,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    frame_texture: Option<FrameTexture>,
    /// Parameters of the frame currently in the texture.
    presented: Option<ViewParams>,
}

impl CpuBackend {
    pub fn new(
        gpu: &Gpu,
        format: wgpu::TextureFormat,
        renderer: CpuRenderer,
    ) -> Result<Self, BackendError> {
        let bind_group_layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("blit-bind-group-layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                }],
            });

        let pipeline =
            gpu.quad_pipeline("blit-pipeline", BLIT_SHADER, &bind_group_layout, format)?;

        Ok(CpuBackend {
            renderer,
            pipeline,
            bind_group_layout,
            frame_texture: None,
            presented: None,
        })
    }

    fn ensure_frame_texture(&mut self, gpu: &Gpu, size: screen::Size) {
        let current = self
            .frame_texture
            .as_ref()
            .map_or(false, |frame_texture| frame_texture.size == size);
        if current {
            return;
        }

        let texture = gpu.viewport_texture(
            "frame-texture",
            size,
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            }],
        });
        self.presented = None;
        self.frame_texture = Some(FrameTexture {
            texture,
            bind_group,
            size,
        });
    }
}

impl Renderer for CpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Cpu
    }

    fn resize(&mut self, _gpu: &Gpu, size: screen::Size) {
        if self
            .frame_texture
            .as_ref()
            .map_or(false, |frame_texture| frame_texture.size != size)
        {
            self.frame_texture = None;
            self.presented = None;
        }
    }

    fn draw(&mut self, gpu: &Gpu, params: &ViewParams, target: &wgpu::TextureView) {
        let size = params.viewport();
        if size.is_empty() {
            return;
        }
        self.ensure_frame_texture(gpu, size);

        // Re-presenting an unchanged view doesn't need a new frame.
        if self.presented.as_ref() != Some(params) {
            let frame = self.renderer.render(params);
            if let Some(frame_texture) = &self.frame_texture {
                gpu.queue.write_texture(
                    wgpu::ImageCopyTexture {
                        texture: &frame_texture.texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    frame.as_bytes(),
                    wgpu::ImageDataLayout {
                        offset: 0,
                        bytes_per_row: NonZeroU32::new(frame.stride() as u32),
                        rows_per_image: None,
                    },
                    gfx::extent(size),
                );
            }
            self.presented = Some(*params);
        }

        let frame_texture = match &self.frame_texture {
            Some(frame_texture) => frame_texture,
            None => return,
        };
        let mut command_encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("blit-encoder"),
            });
        gfx::draw_quad(
            &mut command_encoder,
            "blit-pass",
            target,
            &self.pipeline,
            &frame_texture.bind_group,
        );
        gpu.queue.submit([command_encoder.finish()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        colour::{BLACK, WHITE},
        screen::{Position, Size},
        view::{ColourMode, Limits},
    };

    fn renderer() -> CpuRenderer {
        CpuRenderer::new(2).unwrap()
    }

    #[test]
    fn frame_matches_per_pixel_evaluation() {
        let params = ViewParams::new(Size::new(37, 23), Limits::default());
        let frame = renderer().render(&params);
        assert_eq!(frame.size(), Size::new(37, 23));
        for (x, y) in [(0, 0), (18, 11), (36, 22), (5, 20)] {
            let expected = colour(
                escape_time(x, y, &params),
                params.max_iterations(),
                params.colour_mode(),
            );
            assert_eq!(frame.pixel(x, y), Some(expected));
        }
    }

    #[test]
    fn zero_cap_paints_the_whole_frame_as_the_set() {
        let mut params = ViewParams::new(Size::new(16, 9), Limits::default());
        params.set_max_iterations(0).unwrap();
        let frame = renderer().render(&params);
        assert!(frame.as_bytes().chunks_exact(4).all(|pixel| pixel == BLACK));

        params.set_colour_mode(ColourMode::BlackWhite);
        let frame = renderer().render(&params);
        assert!(frame.as_bytes().chunks_exact(4).all(|pixel| pixel == WHITE));
    }

    #[test]
    fn thread_count_does_not_change_the_image() {
        let mut params = ViewParams::new(Size::new(64, 48), Limits::default());
        params.recenter(Position::new(20.0, 30.0));
        let single = CpuRenderer::new(1).unwrap().render(&params);
        let several = CpuRenderer::new(4).unwrap().render(&params);
        assert_eq!(single, several);
    }

    #[test]
    fn empty_viewport_renders_empty_frame() {
        let params = ViewParams::new(Size::new(0, 10), Limits::default());
        assert!(renderer().render(&params).as_bytes().is_empty());
    }
}
