//! Command line configuration.

use std::{ffi::OsString, str::FromStr};

use clap::{App, Arg, ArgMatches};

use crate::{
    backend::BackendKind,
    complex::Complex,
    error::ConfigError,
    screen::Size,
    view::{
        ColourMode, Limits, Preset, ViewParams, DEFAULT_C, DEFAULT_ESCAPE_RADIUS,
        DEFAULT_MAX_ITERATIONS, DEFAULT_SCALE, DEFAULT_SCALE_MAX, DEFAULT_SCALE_MIN,
        MAX_ITERATIONS_LIMIT,
    },
};

const BACKEND: &str = "backend";
const THREADS: &str = "threads";
const SIZE: &str = "size";
const CONSTANT: &str = "c";
const PRESET: &str = "preset";
const ITERATIONS: &str = "iterations";
const SCALE: &str = "scale";
const SCALE_MIN: &str = "scale-min";
const SCALE_MAX: &str = "scale-max";
const ESCAPE_RADIUS: &str = "escape-radius";
const COLOUR_MODE: &str = "colour-mode";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub backend: BackendKind,
    /// Worker threads for the CPU backend.
    pub threads: usize,
    /// Initial window size.
    pub window_size: Size,
    pub limits: Limits,
    pub c: Complex,
    pub max_iterations: u32,
    pub scale: f64,
    pub escape_radius: f64,
    pub colour_mode: ColourMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: BackendKind::Gpu,
            threads: num_cpus::get(),
            window_size: Size::new(1024, 768),
            limits: Limits::default(),
            c: DEFAULT_C,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            scale: DEFAULT_SCALE,
            escape_radius: DEFAULT_ESCAPE_RADIUS,
            colour_mode: ColourMode::Colourful,
        }
    }
}

impl Config {
    /// Reads the process arguments. Exits with usage on `--help` or bad input.
    pub fn from_args() -> Result<Self, ConfigError> {
        Self::from_matches(&app().get_matches())
    }

    pub fn from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = app()
            .get_matches_from_safe(args)
            .map_err(|error| ConfigError::Cli(error.message))?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let limits = Limits::new(
            parse_or(matches, SCALE_MIN, DEFAULT_SCALE_MIN)?,
            parse_or(matches, SCALE_MAX, DEFAULT_SCALE_MAX)?,
            MAX_ITERATIONS_LIMIT,
        )?;

        let c = match (matches.value_of(PRESET), matches.value_of(CONSTANT)) {
            (Some(preset), _) => preset.parse::<Preset>()?.c(),
            (None, Some(c)) => parse_complex(c)?,
            (None, None) => defaults.c,
        };

        let window_size = match matches.value_of(SIZE) {
            Some(size) => {
                let (width, height) = parse_pair::<u32>(size, 'x').ok_or_else(|| {
                    ConfigError::Parse {
                        what: "window size",
                        value: size.to_string(),
                    }
                })?;
                Size::new(width, height)
            }
            None => defaults.window_size,
        };

        let config = Config {
            backend: parse_or(matches, BACKEND, defaults.backend)?,
            threads: parse_or(matches, THREADS, defaults.threads)?,
            window_size,
            limits,
            c,
            max_iterations: parse_or(matches, ITERATIONS, defaults.max_iterations)?,
            scale: parse_or(matches, SCALE, defaults.scale)?,
            escape_radius: parse_or(matches, ESCAPE_RADIUS, defaults.escape_radius)?,
            colour_mode: parse_or(matches, COLOUR_MODE, defaults.colour_mode)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the view settings by applying them to a scratch view.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.initial_view(self.window_size).map(|_| ())
    }

    /// The view the session starts with, centred on the viewport.
    pub fn initial_view(&self, viewport: Size) -> Result<ViewParams, ConfigError> {
        let mut view = ViewParams::new(viewport, self.limits);
        view.set_c(self.c)?;
        view.set_max_iterations(i64::from(self.max_iterations))?;
        view.set_scale(self.scale)?;
        view.set_escape_radius(self.escape_radius)?;
        view.set_colour_mode(self.colour_mode);
        Ok(view)
    }
}

fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("julia-explorer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Interactive Julia set explorer")
        .arg(
            Arg::with_name(BACKEND)
                .long(BACKEND)
                .short("b")
                .takes_value(true)
                .possible_values(&["gpu", "cpu"])
                .help("Preferred renderer; falls back to cpu if the gpu backend fails"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(|s| {
                    let max_threads = num_cpus::get();
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Worker threads for the cpu renderer [default: all cores]"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .validator(|s| validate_pair::<u32>(&s, 'x', "Could not parse window size"))
                .help("Initial window size, WIDTHxHEIGHT"),
        )
        .arg(
            Arg::with_name(CONSTANT)
                .long(CONSTANT)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .conflicts_with(PRESET)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse c as RE,IM"))
                .help("The constant c, RE,IM"),
        )
        .arg(
            Arg::with_name(PRESET)
                .long(PRESET)
                .short("p")
                .takes_value(true)
                .help("Named value of c: default, dendrite, spiral, rabbit, siegel-disk"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        MAX_ITERATIONS_LIMIT,
                        &format!("Iteration cap must be between 0 and {}", MAX_ITERATIONS_LIMIT),
                    )
                })
                .help("Iteration cap per pixel"),
        )
        .arg(
            Arg::with_name(SCALE)
                .long(SCALE)
                .takes_value(true)
                .help("Pixels per unit of the complex plane"),
        )
        .arg(
            Arg::with_name(SCALE_MIN)
                .long(SCALE_MIN)
                .takes_value(true)
                .help("Smallest scale zooming out can reach"),
        )
        .arg(
            Arg::with_name(SCALE_MAX)
                .long(SCALE_MAX)
                .takes_value(true)
                .help("Largest scale zooming in can reach"),
        )
        .arg(
            Arg::with_name(ESCAPE_RADIUS)
                .long(ESCAPE_RADIUS)
                .takes_value(true)
                .help("Magnitude beyond which a point has escaped"),
        )
        .arg(
            Arg::with_name(COLOUR_MODE)
                .long(COLOUR_MODE)
                .alias("color-mode")
                .takes_value(true)
                .possible_values(&["colorful", "colourful", "blackwhite"])
                .help("Colouring of the image"),
        )
}

fn parse_or<T: FromStr>(matches: &ArgMatches, name: &'static str, default: T) -> Result<T, ConfigError> {
    match matches.value_of(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::Parse {
            what: name,
            value: value.to_string(),
        }),
        None => Ok(default),
    }
}

/// Given a string and a separator, returns the two values either side of it.
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let (left, right) = s.split_once(separator)?;
    match (T::from_str(left.trim()), T::from_str(right.trim())) {
        (Ok(l), Ok(r)) => Some((l, r)),
        _ => None,
    }
}

fn parse_complex(s: &str) -> Result<Complex, ConfigError> {
    parse_pair(s, ',')
        .map(|(real, imaginary)| Complex::new(real, imaginary))
        .ok_or_else(|| ConfigError::Parse {
            what: "c",
            value: s.to_string(),
        })
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(s: &str, low: T, high: T, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(value) if value >= low && value <= high => Ok(()),
        _ => Err(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, ConfigError> {
        Config::from_iter(std::iter::once("julia-explorer").chain(args.iter().copied()))
    }

    #[test]
    fn no_arguments_gives_defaults() {
        assert_eq!(parse(&[]), Ok(Config::default()));
    }

    #[test]
    fn negative_c_is_accepted() {
        let config = parse(&["--c", "-0.391,-0.587"]).unwrap();
        assert_eq!(config.c, Complex::new(-0.391, -0.587));
    }

    #[test]
    fn preset_sets_c() {
        let config = parse(&["--preset", "siegel-disk", "--backend", "cpu"]).unwrap();
        assert_eq!(config.c, Preset::SiegelDisk.c());
        assert_eq!(config.backend, BackendKind::Cpu);
    }

    #[test]
    fn unknown_preset_is_an_error() {
        assert_eq!(
            parse(&["--preset", "mandelbrot"]),
            Err(ConfigError::UnknownPreset("mandelbrot".to_string()))
        );
    }

    #[test]
    fn escape_radius_must_be_positive() {
        assert!(matches!(
            parse(&["--escape-radius", "0"]),
            Err(ConfigError::Param(_))
        ));
    }

    #[test]
    fn inverted_scale_band_is_an_error() {
        assert!(matches!(
            parse(&["--scale-min", "900", "--scale-max", "100"]),
            Err(ConfigError::EmptyScaleBand { .. })
        ));
    }

    #[test]
    fn iteration_cap_is_range_checked() {
        assert!(matches!(
            parse(&["--iterations", "5000"]),
            Err(ConfigError::Cli(_))
        ));
        assert_eq!(parse(&["--iterations", "0"]).unwrap().max_iterations, 0);
    }

    #[test]
    fn initial_view_applies_settings() {
        let config = parse(&["--size", "640x480", "--scale", "10000", "--colour-mode", "blackwhite"])
            .unwrap();
        assert_eq!(config.window_size, Size::new(640, 480));
        let view = config.initial_view(config.window_size).unwrap();
        assert_eq!(view.scale(), DEFAULT_SCALE_MAX);
        assert_eq!(view.colour_mode(), ColourMode::BlackWhite);
        assert_eq!(view.center(), crate::screen::Position::new(320.0, 240.0));
    }
}
