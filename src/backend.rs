//! Backend selection.
//!
//! Exactly one [`Renderer`] is chosen per session. Interaction code only ever
//! sees the trait, so both backends are interchangeable.

use std::{fmt, str::FromStr};

use log::{info, warn};

use crate::{
    cpu::{CpuBackend, CpuRenderer},
    error::{BackendError, ConfigError},
    gfx::Gpu,
    gpu::GpuBackend,
    screen,
    view::ViewParams,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Gpu,
    Cpu,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Gpu => "gpu",
            BackendKind::Cpu => "cpu",
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gpu" => Ok(BackendKind::Gpu),
            "cpu" => Ok(BackendKind::Cpu),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that turns [`ViewParams`] into a full-viewport image.
pub trait Renderer {
    fn kind(&self) -> BackendKind;

    /// Called after the surface has been reconfigured for `size`.
    fn resize(&mut self, gpu: &Gpu, size: screen::Size);

    /// Draws one frame into `target`. `params` is a snapshot taken when the
    /// frame started.
    fn draw(&mut self, gpu: &Gpu, params: &ViewParams, target: &wgpu::TextureView);
}

/// Picks the GPU backend when it is requested and initializes, the CPU
/// backend otherwise.
pub fn select(
    preference: BackendKind,
    gpu: &Gpu,
    format: wgpu::TextureFormat,
    params: &ViewParams,
    threads: usize,
) -> Result<Box<dyn Renderer>, BackendError> {
    select_with(preference, gpu, format, threads, || {
        GpuBackend::new(gpu, format, params)
    })
}

fn select_with(
    preference: BackendKind,
    gpu: &Gpu,
    format: wgpu::TextureFormat,
    threads: usize,
    gpu_backend: impl FnOnce() -> Result<GpuBackend, BackendError>,
) -> Result<Box<dyn Renderer>, BackendError> {
    if preference == BackendKind::Gpu {
        match gpu_backend() {
            Ok(backend) => {
                info!("rendering on the gpu");
                return Ok(Box::new(backend));
            }
            Err(error) => warn!("gpu backend unavailable, falling back to cpu: {}", error),
        }
    }

    let renderer = CpuRenderer::new(threads)?;
    info!("rendering on the cpu with {} threads", renderer.threads());
    Ok(Box::new(CpuBackend::new(gpu, format, renderer)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gfx::test_gpu, screen::Size, view::Limits};

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    fn params() -> ViewParams {
        ViewParams::new(Size::new(32, 24), Limits::default())
    }

    #[test]
    fn failed_gpu_backend_falls_back_to_cpu() {
        let gpu = match test_gpu() {
            Some(gpu) => gpu,
            None => return,
        };
        let renderer = select_with(BackendKind::Gpu, &gpu, FORMAT, 2, || {
            Err(BackendError::Validation {
                label: "julia-pipeline".to_string(),
                message: "shader failed to compile".to_string(),
            })
        })
        .unwrap();
        assert_eq!(renderer.kind(), BackendKind::Cpu);
    }

    #[test]
    fn working_gpu_backend_is_kept() {
        let gpu = match test_gpu() {
            Some(gpu) => gpu,
            None => return,
        };
        let renderer = select(BackendKind::Gpu, &gpu, FORMAT, &params(), 2).unwrap();
        assert_eq!(renderer.kind(), BackendKind::Gpu);
    }

    #[test]
    fn cpu_preference_skips_the_gpu_backend() {
        let gpu = match test_gpu() {
            Some(gpu) => gpu,
            None => return,
        };
        let renderer = select_with(BackendKind::Cpu, &gpu, FORMAT, 1, || {
            panic!("gpu backend built for a cpu preference")
        })
        .unwrap();
        assert_eq!(renderer.kind(), BackendKind::Cpu);
    }

    #[test]
    fn backend_names_round_trip() {
        for kind in [BackendKind::Gpu, BackendKind::Cpu] {
            assert_eq!(kind.name().parse::<BackendKind>(), Ok(kind));
        }
        assert_eq!("GPU".parse::<BackendKind>(), Ok(BackendKind::Gpu));
        assert!("opengl".parse::<BackendKind>().is_err());
    }
}
