use thiserror::Error;

/// A rejected parameter edit. The parameter keeps its last valid value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("escape radius must be positive, got {0}")]
    NonPositiveEscapeRadius(f64),
    #[error("escape radius must be finite")]
    NonFiniteEscapeRadius,
    #[error("max iterations must not be negative, got {0}")]
    NegativeMaxIterations(i64),
    #[error("the constant c must be finite")]
    NonFiniteConstant,
    #[error("scale must be a number, got NaN")]
    NaNScale,
}

/// Failure to bring up a rendering backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("no suitable graphics adapter")]
    NoAdapter,
    #[error("could not open graphics device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("{label}: {message}")]
    Validation { label: String, message: String },
    #[error("reading back rendered frame failed: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),
    #[error("readback finished without delivering a frame")]
    ReadbackAbandoned,
    #[error("offscreen rendering needs Rgba8Unorm, pipeline targets {0:?}")]
    UnsupportedFormat(wgpu::TextureFormat),
    #[error("no surface format available")]
    NoSurfaceFormat,
    #[error("could not start render threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Fatal failure while starting the application.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("could not open window: {0}")]
    Window(#[from] winit::error::OsError),
}

/// Invalid startup configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("scale band is empty: min {min} > max {max}")]
    EmptyScaleBand { min: f64, max: f64 },
    #[error("scale bounds must be positive and finite")]
    InvalidScaleBound,
    #[error("unknown preset {0:?}")]
    UnknownPreset(String),
    #[error("unknown colour mode {0:?}")]
    UnknownColourMode(String),
    #[error("unknown backend {0:?}")]
    UnknownBackend(String),
    #[error("{0}")]
    Cli(String),
    #[error("could not parse {what} from {value:?}")]
    Parse { what: &'static str, value: String },
    #[error(transparent)]
    Param(#[from] ParamError),
}
