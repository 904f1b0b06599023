//! Complex numbers for the escape-time iteration.

use std::ops::{Add, Mul};

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Complex {
    pub real: f64,
    pub imaginary: f64,
}

impl Complex {
    pub const ZERO: Self = Complex {
        real: 0.0,
        imaginary: 0.0,
    };

    pub const fn new(real: f64, imaginary: f64) -> Self {
        Complex { real, imaginary }
    }

    pub fn add(self, other: Self) -> Self {
        Complex {
            real: self.real + other.real,
            imaginary: self.imaginary + other.imaginary,
        }
    }

    pub fn multiply(self, other: Self) -> Self {
        Complex {
            real: self.real * other.real - self.imaginary * other.imaginary,
            imaginary: self.real * other.imaginary + self.imaginary * other.real,
        }
    }

    /// `sqrt(re² + im²)`. Overflow yields `inf` or `NaN`.
    pub fn magnitude(self) -> f64 {
        self.norm_sqr().sqrt()
    }

    pub fn norm_sqr(self) -> f64 {
        self.real * self.real + self.imaginary * self.imaginary
    }

    pub fn is_finite(self) -> bool {
        self.real.is_finite() && self.imaginary.is_finite()
    }
}

impl Add for Complex {
    type Output = Complex;

    fn add(self, other: Self) -> Self::Output {
        Complex::add(self, other)
    }
}

impl Mul for Complex {
    type Output = Complex;

    fn mul(self, other: Self) -> Self::Output {
        self.multiply(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_follows_complex_rule() {
        let a = Complex::new(1.0, 2.0);
        let b = Complex::new(3.0, -1.0);
        // (1 + 2i)(3 - i) = 3 - i + 6i - 2i² = 5 + 5i
        assert_eq!(a.multiply(b), Complex::new(5.0, 5.0));
        assert_eq!(a * b, b * a);
    }

    #[test]
    fn i_squared_is_minus_one() {
        let i = Complex::new(0.0, 1.0);
        assert_eq!(i * i, Complex::new(-1.0, 0.0));
    }

    #[test]
    fn add_is_componentwise() {
        let sum = Complex::new(-0.8, 0.156) + Complex::new(0.3, 0.044);
        assert!((sum.real - -0.5).abs() < 1e-12);
        assert!((sum.imaginary - 0.2).abs() < 1e-12);
    }

    #[test]
    fn magnitude_is_euclidean_length() {
        assert_eq!(Complex::new(3.0, 4.0).magnitude(), 5.0);
        assert_eq!(Complex::ZERO.magnitude(), 0.0);
    }

    #[test]
    fn overflow_propagates_to_non_finite() {
        let big = Complex::new(1e200, 1e200);
        let squared = big * big;
        assert!(!squared.is_finite());
        assert!(squared.magnitude().is_nan());
    }
}
