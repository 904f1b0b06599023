//! Escape-time evaluation on the CPU.
//!
//! `julia.wgsl#escape_time` is the GPU twin of [`iterate`]; keep the two in step.

use crate::{complex::Complex, view::ViewParams};

/// Iterates `z → z² + c` from `z0`.
///
/// Returns the index of the first iteration whose magnitude exceeds
/// `escape_radius`, or `max_iterations` if the orbit stays bounded for the
/// whole cap. A non-finite magnitude counts as escaped.
pub fn iterate(z0: Complex, c: Complex, max_iterations: u32, escape_radius: f64) -> u32 {
    let mut z = z0;
    for iteration in 0..max_iterations {
        z = z * z + c;
        let magnitude = z.magnitude();
        if magnitude > escape_radius || magnitude.is_nan() {
            return iteration;
        }
    }
    max_iterations
}

/// Escape iteration for the pixel at `(x, y)`.
pub fn escape_time(x: u32, y: u32, params: &ViewParams) -> u32 {
    iterate(
        params.pixel_to_point(x as f64, y as f64),
        params.c(),
        params.max_iterations(),
        params.escape_radius(),
    )
}
