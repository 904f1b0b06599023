//! Graphics device plumbing shared by both backends.

use std::{num::NonZeroU32, sync::mpsc};

use log::{debug, info};

use crate::{error::BackendError, frame::FrameBuffer, screen};

/// Vertex stage shared by every full-screen quad shader.
pub const QUAD_SHADER: &str = include_str!("quad.wgsl");

/// Adapter, device and queue for one session.
pub struct Gpu {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl Gpu {
    /// Backends to try, overridable through `WGPU_BACKEND`.
    pub fn backends() -> wgpu::Backends {
        wgpu::util::backend_bits_from_env().unwrap_or_else(wgpu::Backends::all)
    }

    /// Any adapter will do; a software one is asked for only when nothing
    /// else is available.
    fn adapter(
        instance: &wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface>,
    ) -> Option<wgpu::Adapter> {
        [false, true].into_iter().find_map(|force_fallback_adapter| {
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: Default::default(),
                force_fallback_adapter,
                compatible_surface,
            }))
        })
    }

    pub fn request(
        instance: &wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface>,
    ) -> Result<Self, BackendError> {
        let adapter = Self::adapter(instance, compatible_surface).ok_or(BackendError::NoAdapter)?;

        let info = adapter.get_info();
        info!("adapter {} ({:?}, {:?})", info.name, info.device_type, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("device"),
                features: wgpu::Features::empty(),
                limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            },
            None,
        ))?;

        Ok(Gpu {
            adapter,
            device,
            queue,
        })
    }

    /// A device with no surface attached, for offscreen rendering.
    pub fn headless() -> Result<Self, BackendError> {
        let instance = wgpu::Instance::new(Self::backends());
        Self::request(&instance, None)
    }

    /// Runs `create` inside a validation error scope, so that shader compile
    /// and pipeline link failures come back as errors instead of panics.
    pub fn validated<A>(
        &self,
        label: &str,
        create: impl FnOnce(&wgpu::Device) -> A,
    ) -> Result<A, BackendError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = create(&self.device);
        match pollster::block_on(self.device.pop_error_scope()) {
            None => Ok(value),
            Some(error) => Err(BackendError::Validation {
                label: label.to_string(),
                message: error.to_string(),
            }),
        }
    }

    /// Builds a pipeline that draws a full-screen quad (4-vertex triangle strip,
    /// no vertex buffers) with `fragment_source` providing `fragment_main`.
    pub fn quad_pipeline(
        &self,
        label: &str,
        fragment_source: &str,
        bind_group_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> Result<wgpu::RenderPipeline, BackendError> {
        self.validated(label, |device| {
            let source = format!("{}\n{}", QUAD_SHADER, fragment_source);
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &[bind_group_layout],
                push_constant_ranges: &[],
            });

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: "vertex_main",
                    buffers: &[],
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: "fragment_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
            })
        })
    }

    /// A texture the size of the viewport.
    pub fn viewport_texture(
        &self,
        label: &str,
        size: screen::Size,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
        })
    }

    /// Copies an `Rgba8Unorm` texture back to the host.
    pub fn read_texture(
        &self,
        texture: &wgpu::Texture,
        size: screen::Size,
    ) -> Result<FrameBuffer, BackendError> {
        let unpadded = size.width * 4;
        let padded = padded_bytes_per_row(unpadded);

        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback-buffer"),
            size: padded as u64 * size.height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut command_encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback-encoder"),
            });
        command_encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: NonZeroU32::new(padded),
                    rows_per_image: None,
                },
            },
            extent(size),
        );
        self.queue.submit([command_encoder.finish()]);

        let slice = readback.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|_| BackendError::ReadbackAbandoned)??;

        let mut bytes = Vec::with_capacity(size.pixel_count() * 4);
        {
            let mapped = slice.get_mapped_range();
            for row in mapped.chunks_exact(padded as usize) {
                bytes.extend_from_slice(&row[..unpadded as usize]);
            }
        }
        readback.unmap();
        debug!("read back {}x{} frame", size.width, size.height);

        FrameBuffer::from_bytes(size, bytes).ok_or(BackendError::ReadbackAbandoned)
    }
}

/// Opens a render pass over `target` and draws the full-screen quad once.
pub fn draw_quad(
    command_encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    command_encoder.push_debug_group(label);
    {
        let mut render_pass = command_encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: true,
                },
            })],
            depth_stencil_attachment: None,
        });

        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.draw(0..4, 0..1);
    }
    command_encoder.pop_debug_group();
}

/// Picks a surface format whose bytes are written unconverted, so shader
/// output and CPU frames agree. Falls back to the first supported format.
pub fn preferred_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|format| !format.describe().srgb)
        .or_else(|| formats.first().copied())
}

pub fn extent(size: screen::Size) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width,
        height: size.height,
        depth_or_array_layers: 1,
    }
}

/// Texture to buffer copies need rows aligned to `COPY_BYTES_PER_ROW_ALIGNMENT`.
pub fn padded_bytes_per_row(unpadded: u32) -> u32 {
    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (unpadded + alignment - 1) / alignment * alignment
}

/// A headless device for tests, or `None` when the machine has no adapter.
#[cfg(test)]
pub(crate) fn test_gpu() -> Option<Gpu> {
    match Gpu::headless() {
        Ok(gpu) => Some(gpu),
        Err(err) => {
            eprintln!("no graphics adapter: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backends_include_gl() {
        if std::env::var_os("WGPU_BACKEND").is_none() {
            assert!(Gpu::backends().contains(wgpu::Backends::GL));
        }
    }

    #[test]
    fn broken_shader_is_a_validation_error() {
        let gpu = match test_gpu() {
            Some(gpu) => gpu,
            None => return,
        };
        let bind_group_layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: None,
                entries: &[],
            });
        let result = gpu.quad_pipeline(
            "broken-pipeline",
            "@fragment fn fragment_main( -> {",
            &bind_group_layout,
            wgpu::TextureFormat::Rgba8Unorm,
        );
        assert!(matches!(result, Err(BackendError::Validation { .. })));
    }

    #[test]
    fn rows_are_padded_to_copy_alignment() {
        assert_eq!(padded_bytes_per_row(4), 256);
        assert_eq!(padded_bytes_per_row(256), 256);
        assert_eq!(padded_bytes_per_row(257), 512);
        assert_eq!(padded_bytes_per_row(640 * 4), 2560);
    }

    #[test]
    fn linear_formats_are_preferred() {
        let formats = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Bgra8Unorm,
        ];
        assert_eq!(
            preferred_format(&formats),
            Some(wgpu::TextureFormat::Bgra8Unorm)
        );
        assert_eq!(
            preferred_format(&[wgpu::TextureFormat::Rgba8UnormSrgb]),
            Some(wgpu::TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(preferred_format(&[]), None);
    }
}
