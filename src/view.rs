//! View and parameter state.
//!
//! [`ViewParams`] is the single owned value describing what to draw. Interaction
//! handlers mutate it only through the transitions defined here; renderers read
//! a copy of it per frame.

use std::{fmt, str::FromStr};

use log::debug;

use crate::{
    complex::Complex,
    error::{ConfigError, ParamError},
    screen::{Position, Size},
};

/// Upper bound on the iteration cap. Also the fixed loop bound in `julia.wgsl`.
pub const MAX_ITERATIONS_LIMIT: u32 = 1000;

pub const DEFAULT_C: Complex = Complex::new(-0.8, 0.156);
pub const DEFAULT_SCALE: f64 = 300.0;
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;
pub const DEFAULT_ESCAPE_RADIUS: f64 = 2.0;

pub const DEFAULT_SCALE_MIN: f64 = 50.0;
pub const DEFAULT_SCALE_MAX: f64 = 5000.0;

/// Scale multiplier for a wheel step towards the viewer.
pub const ZOOM_IN_FACTOR: f64 = 1.2;
/// Scale multiplier for a wheel step away from the viewer.
pub const ZOOM_OUT_FACTOR: f64 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColourMode {
    /// Hue follows the escape iteration; the set itself is black.
    #[default]
    Colourful,
    /// The set is white, everything else black.
    BlackWhite,
}

impl ColourMode {
    /// Shader flag: 0 for colourful, 1 for black and white.
    pub fn flag(self) -> u32 {
        match self {
            ColourMode::Colourful => 0,
            ColourMode::BlackWhite => 1,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ColourMode::Colourful => ColourMode::BlackWhite,
            ColourMode::BlackWhite => ColourMode::Colourful,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColourMode::Colourful => "colorful",
            ColourMode::BlackWhite => "blackwhite",
        }
    }
}

impl FromStr for ColourMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "colorful" | "colourful" => Ok(ColourMode::Colourful),
            "blackwhite" | "bw" => Ok(ColourMode::BlackWhite),
            _ => Err(ConfigError::UnknownColourMode(s.to_string())),
        }
    }
}

/// Named values of `c` with well known Julia sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Default,
    Dendrite,
    Spiral,
    Rabbit,
    SiegelDisk,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Default,
        Preset::Dendrite,
        Preset::Spiral,
        Preset::Rabbit,
        Preset::SiegelDisk,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Dendrite => "dendrite",
            Preset::Spiral => "spiral",
            Preset::Rabbit => "rabbit",
            Preset::SiegelDisk => "siegel disk",
        }
    }

    pub fn c(self) -> Complex {
        match self {
            Preset::Default => DEFAULT_C,
            Preset::Dendrite => Complex::new(0.0, 1.0),
            Preset::Spiral => Complex::new(-0.75, 0.11),
            Preset::Rabbit => Complex::new(-0.123, 0.745),
            Preset::SiegelDisk => Complex::new(-0.391, -0.587),
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], " ");
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Clamping bands for scale and the iteration cap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits {
    scale_min: f64,
    scale_max: f64,
    max_iterations: u32,
}

impl Limits {
    pub fn new(scale_min: f64, scale_max: f64, max_iterations: u32) -> Result<Self, ConfigError> {
        if !(scale_min.is_finite() && scale_max.is_finite()) || scale_min <= 0.0 {
            return Err(ConfigError::InvalidScaleBound);
        }
        if scale_min > scale_max {
            return Err(ConfigError::EmptyScaleBand {
                min: scale_min,
                max: scale_max,
            });
        }
        Ok(Limits {
            scale_min,
            scale_max,
            max_iterations: max_iterations.min(MAX_ITERATIONS_LIMIT),
        })
    }

    pub fn scale_min(&self) -> f64 {
        self.scale_min
    }

    pub fn scale_max(&self) -> f64 {
        self.scale_max
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.scale_min, self.scale_max)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            scale_min: DEFAULT_SCALE_MIN,
            scale_max: DEFAULT_SCALE_MAX,
            max_iterations: MAX_ITERATIONS_LIMIT,
        }
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewParams {
    c: Complex,
    max_iterations: u32,
    scale: f64,
    escape_radius: f64,
    center: Position,
    colour_mode: ColourMode,
    limits: Limits,
    viewport: Size,
}

impl ViewParams {
    /// Defaults, centred on the viewport midpoint.
    pub fn new(viewport: Size, limits: Limits) -> Self {
        ViewParams {
            c: DEFAULT_C,
            max_iterations: DEFAULT_MAX_ITERATIONS.min(limits.max_iterations),
            scale: limits.clamp_scale(DEFAULT_SCALE),
            escape_radius: DEFAULT_ESCAPE_RADIUS,
            center: viewport.midpoint(),
            colour_mode: ColourMode::default(),
            limits,
            viewport,
        }
    }

    pub fn c(&self) -> Complex {
        self.c
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Pixels per unit of the complex plane.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn escape_radius(&self) -> f64 {
        self.escape_radius
    }

    /// The pixel that maps to `0 + 0i`.
    pub fn center(&self) -> Position {
        self.center
    }

    pub fn colour_mode(&self) -> ColourMode {
        self.colour_mode
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Starting value of the iteration for pixel `(x, y)`.
    pub fn pixel_to_point(&self, x: f64, y: f64) -> Complex {
        Complex::new(
            (x - self.center.x) / self.scale,
            (y - self.center.y) / self.scale,
        )
    }

    pub fn recenter(&mut self, position: Position) {
        debug!("recenter to ({}, {})", position.x, position.y);
        self.center = position;
    }

    /// Zoom in for a negative wheel delta, out for anything else. A zero
    /// vertical delta, as sent by horizontal scrolling, zooms out.
    pub fn zoom(&mut self, delta: f64) {
        let factor = if delta < 0.0 {
            ZOOM_IN_FACTOR
        } else {
            ZOOM_OUT_FACTOR
        };
        self.scale = self.limits.clamp_scale(self.scale * factor);
        debug!("zoom to scale {}", self.scale);
    }

    pub fn set_c(&mut self, c: Complex) -> Result<(), ParamError> {
        if !c.is_finite() {
            return Err(ParamError::NonFiniteConstant);
        }
        self.c = c;
        Ok(())
    }

    pub fn set_real(&mut self, real: f64) -> Result<(), ParamError> {
        self.set_c(Complex::new(real, self.c.imaginary))
    }

    pub fn set_imaginary(&mut self, imaginary: f64) -> Result<(), ParamError> {
        self.set_c(Complex::new(self.c.real, imaginary))
    }

    /// Negative caps are rejected; caps above the limit are clamped.
    pub fn set_max_iterations(&mut self, max_iterations: i64) -> Result<(), ParamError> {
        if max_iterations < 0 {
            return Err(ParamError::NegativeMaxIterations(max_iterations));
        }
        let limit = self.limits.max_iterations;
        self.max_iterations = u32::try_from(max_iterations).map_or(limit, |value| value.min(limit));
        Ok(())
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<(), ParamError> {
        if scale.is_nan() {
            return Err(ParamError::NaNScale);
        }
        self.scale = self.limits.clamp_scale(scale);
        Ok(())
    }

    pub fn set_escape_radius(&mut self, escape_radius: f64) -> Result<(), ParamError> {
        if !escape_radius.is_finite() {
            return Err(ParamError::NonFiniteEscapeRadius);
        }
        if escape_radius <= 0.0 {
            return Err(ParamError::NonPositiveEscapeRadius(escape_radius));
        }
        self.escape_radius = escape_radius;
        Ok(())
    }

    pub fn set_colour_mode(&mut self, colour_mode: ColourMode) {
        self.colour_mode = colour_mode;
    }

    pub fn toggle_colour_mode(&mut self) {
        self.colour_mode = self.colour_mode.toggled();
    }

    /// Replaces `c` only; scale and the iteration cap are untouched.
    pub fn select_preset(&mut self, preset: Preset) {
        debug!("preset {}", preset);
        self.c = preset.c();
    }

    /// Restores `c`, scale and the iteration cap to their defaults and
    /// recentres on the viewport midpoint.
    pub fn reset(&mut self) {
        self.c = DEFAULT_C;
        self.scale = self.limits.clamp_scale(DEFAULT_SCALE);
        self.max_iterations = DEFAULT_MAX_ITERATIONS.min(self.limits.max_iterations);
        self.center = self.viewport.midpoint();
    }

    /// Records the viewport size. The centre stays where it was.
    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
    }
}
