use std::f64::consts::TAU;

use glam::DVec2;

/// An angle normalized to the range `[0, 2π)`.
///
/// A pure value type used wherever a direction must be converted to a
/// unit vector, e.g. the brownian kick in [`crate::phases`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Angle {
    radians: f64,
}

impl Angle {
    /// Tolerance for [`Angle::approx_eq`].
    pub const TOLERANCE: f64 = 2.0 * f64::EPSILON;

    /// Creates an angle from raw radians, wrapping into `[0, 2π)`.
    pub fn new(radians: f64) -> Self {
        let mut wrapped = radians.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negatives.
        if wrapped >= TAU {
            wrapped = 0.0;
        }
        Self { radians: wrapped }
    }

    /// The angle of the vector from `a` to `b`.
    pub fn between(a: DVec2, b: DVec2) -> Self {
        let d = b - a;
        Self::new(d.y.atan2(d.x))
    }

    /// The normalized value in radians, in `[0, 2π)`.
    #[inline]
    pub fn radians(self) -> f64 {
        self.radians
    }

    /// The normalized value in degrees, in `[0, 360)`.
    pub fn degrees(self) -> f64 {
        self.radians.to_degrees()
    }

    /// Returns this angle rotated by `delta` radians, re-wrapped.
    pub fn rotated(self, delta: f64) -> Self {
        Self::new(self.radians + delta)
    }

    #[inline]
    pub fn sin(self) -> f64 {
        self.radians.sin()
    }

    #[inline]
    pub fn cos(self) -> f64 {
        self.radians.cos()
    }

    #[inline]
    pub fn tan(self) -> f64 {
        self.radians.tan()
    }

    /// The unit vector pointing along this angle.
    pub fn unit(self) -> DVec2 {
        DVec2::new(self.cos(), self.sin())
    }

    /// Approximate equality within [`Angle::TOLERANCE`].
    pub fn approx_eq(self, other: Angle) -> bool {
        (self.radians - other.radians).abs() < Self::TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn new_wraps_into_range() {
        assert!(Angle::new(TAU).radians().abs() < 1e-12);
        assert!((Angle::new(-FRAC_PI_2).radians() - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((Angle::new(3.0 * TAU + PI).radians() - PI).abs() < 1e-9);

        let a = Angle::new(1.5);
        assert!(a.radians() >= 0.0 && a.radians() < TAU);
    }

    #[test]
    fn rotated_wraps() {
        let a = Angle::new(3.0 * FRAC_PI_2).rotated(PI);
        assert!((a.radians() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn unit_vector_matches_trig() {
        let a = Angle::new(FRAC_PI_2);
        let u = a.unit();
        assert!(u.x.abs() < 1e-12);
        assert!((u.y - 1.0).abs() < 1e-12);
        assert!((u.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn between_points_along_axes() {
        let a = Angle::between(DVec2::ZERO, DVec2::new(1.0, 0.0));
        assert!(a.radians().abs() < 1e-12);

        let b = Angle::between(DVec2::ZERO, DVec2::new(0.0, -1.0));
        assert!((b.radians() - 3.0 * FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn approx_eq_is_tight() {
        let a = Angle::new(1.0);
        assert!(a.approx_eq(Angle::new(1.0 + f64::EPSILON)));
        assert!(!a.approx_eq(Angle::new(1.0 + 1e-9)));
    }

    #[test]
    fn degrees_conversion() {
        assert!((Angle::new(PI).degrees() - 180.0).abs() < 1e-9);
    }
}
