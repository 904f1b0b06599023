//! Colouring algorithms.
//!
//! `julia.wgsl#colour` reproduces [`colour`] on the GPU with the chroma form of
//! the HSL conversion, so the two agree only up to rounding.

use crate::view::ColourMode;

pub type Rgba = [u8; 4];

pub const BLACK: Rgba = [0, 0, 0, 255];
pub const WHITE: Rgba = [255, 255, 255, 255];

/// Saturation used for escaped pixels, in percent.
const SATURATION: f64 = 100.0;
/// Lightness used for escaped pixels, in percent.
const LIGHTNESS: f64 = 50.0;

/// Colour for a pixel that escaped after `iterations` out of `max_iterations`.
///
/// Pixels that reached the cap are in the set: black when colourful, white in
/// black and white mode.
pub fn colour(iterations: u32, max_iterations: u32, mode: ColourMode) -> Rgba {
    let in_set = iterations >= max_iterations;
    match mode {
        ColourMode::BlackWhite if in_set => WHITE,
        ColourMode::BlackWhite => BLACK,
        ColourMode::Colourful if in_set => BLACK,
        ColourMode::Colourful => {
            let hue = 360.0 * iterations as f64 / max_iterations as f64;
            let [r, g, b] = hsl_to_rgb(hue, SATURATION, LIGHTNESS);
            [r, g, b, 255]
        }
    }
}

/// Converts hue in degrees and saturation/lightness in percent to 8-bit RGB
/// ([Wikipedia](https://en.wikipedia.org/wiki/HSL_and_HSV#HSL_to_RGB)).
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
    let h = hue / 360.0;
    let s = saturation / 100.0;
    let l = lightness / 100.0;

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    };

    [to_byte(r), to_byte(g), to_byte(b)]
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_byte(channel: f64) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_and_secondary_hues() {
        assert_eq!(hsl_to_rgb(0.0, 100.0, 50.0), [255, 0, 0]);
        assert_eq!(hsl_to_rgb(60.0, 100.0, 50.0), [255, 255, 0]);
        assert_eq!(hsl_to_rgb(120.0, 100.0, 50.0), [0, 255, 0]);
        assert_eq!(hsl_to_rgb(180.0, 100.0, 50.0), [0, 255, 255]);
        assert_eq!(hsl_to_rgb(240.0, 100.0, 50.0), [0, 0, 255]);
        assert_eq!(hsl_to_rgb(300.0, 100.0, 50.0), [255, 0, 255]);
    }

    #[test]
    fn intermediate_hues_round_to_nearest() {
        assert_eq!(hsl_to_rgb(36.0, 100.0, 50.0), [255, 153, 0]);
        assert_eq!(hsl_to_rgb(90.0, 100.0, 50.0), [128, 255, 0]);
        assert_eq!(hsl_to_rgb(359.0, 100.0, 50.0), [255, 0, 4]);
    }

    #[test]
    fn unsaturated_is_grey() {
        assert_eq!(hsl_to_rgb(0.0, 0.0, 50.0), [128, 128, 128]);
        assert_eq!(hsl_to_rgb(200.0, 50.0, 25.0), [32, 74, 96]);
    }

    #[test]
    fn conversion_is_deterministic() {
        for hue in (0..360).step_by(7) {
            let hue = hue as f64;
            assert_eq!(hsl_to_rgb(hue, 100.0, 50.0), hsl_to_rgb(hue, 100.0, 50.0));
        }
    }

    #[test]
    fn set_interior_colour_depends_only_on_mode() {
        for max in [0, 1, 100, 1000] {
            assert_eq!(colour(max, max, ColourMode::Colourful), BLACK);
            assert_eq!(colour(max, max, ColourMode::BlackWhite), WHITE);
        }
    }

    #[test]
    fn escaped_pixels_are_black_in_black_and_white_mode() {
        for iterations in 0..100 {
            assert_eq!(colour(iterations, 100, ColourMode::BlackWhite), BLACK);
        }
    }

    #[test]
    fn escaped_pixels_follow_the_hue_wheel() {
        assert_eq!(colour(0, 100, ColourMode::Colourful), [255, 0, 0, 255]);
        assert_eq!(colour(15, 100, ColourMode::Colourful), [255, 229, 0, 255]);
        assert_eq!(colour(25, 100, ColourMode::Colourful), [128, 255, 0, 255]);
        assert_eq!(colour(30, 100, ColourMode::Colourful), [51, 255, 0, 255]);
    }

    #[test]
    fn escaped_pixels_are_opaque() {
        for iterations in 0..50 {
            assert_eq!(colour(iterations, 50, ColourMode::Colourful)[3], 255);
        }
    }
}
