use glam::DVec2;

use crate::angle::Angle;

/// What the resampling decision phase chose to do with a point.
///
/// Recomputed fresh on every [`crate::maze::Maze::resample`] call; it
/// is not part of a point's durable identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResampleAction {
    /// Keep the point as-is.
    #[default]
    None,
    /// Keep the point and insert a midpoint between it and its cyclic
    /// successor.
    InsertAfter,
    /// Drop the point (too close to its cyclic predecessor).
    Delete,
}

/// One point of the live curve.
///
/// Forces accumulate into `delta` over a step; [`Point::apply`] folds
/// the displacement into `pos` and resets it. Once `frozen` is set the
/// position never changes again, but the point still acts as an
/// obstacle and neighbor for others.
#[derive(Clone, Copy, Debug)]
pub struct Point {
    pub pos: DVec2,
    pub delta: DVec2,
    pub frozen: bool,
    pub action: ResampleAction,
}

impl Point {
    pub fn new(pos: DVec2) -> Self {
        Self {
            pos,
            delta: DVec2::ZERO,
            frozen: false,
            action: ResampleAction::None,
        }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.pos.distance(other.pos)
    }

    pub fn sq_distance(&self, other: &Point) -> f64 {
        self.pos.distance_squared(other.pos)
    }

    /// The angle of the vector from this point to `other`.
    pub fn angle_to(&self, other: &Point) -> Angle {
        Angle::between(self.pos, other.pos)
    }

    /// Moves the point by its pending displacement and clears it.
    pub fn apply(&mut self) {
        self.pos += self.delta;
        self.delta = DVec2::ZERO;
    }

    pub fn translate(&mut self, offset: DVec2) {
        self.pos += offset;
    }

    /// Moves the point `distance` along `angle`.
    pub fn translate_along(&mut self, distance: f64, angle: Angle) {
        self.pos += distance * angle.unit();
    }

    /// Rotates the point about the origin.
    pub fn rotate(&mut self, angle: Angle) {
        let (s, c) = (angle.sin(), angle.cos());
        self.pos = DVec2::new(self.pos.x * c - self.pos.y * s, self.pos.x * s + self.pos.y * c);
    }

    /// Rotates the point about `pivot`.
    pub fn rotate_about(&mut self, pivot: DVec2, angle: Angle) {
        self.pos -= pivot;
        self.rotate(angle);
        self.pos += pivot;
    }

    /// Positional equality within twice machine epsilon, per component.
    pub fn approx_eq(&self, other: &Point) -> bool {
        let tol = 2.0 * f64::EPSILON;
        (self.pos.x - other.pos.x).abs() < tol && (self.pos.y - other.pos.y).abs() < tol
    }
}

/// Arithmetic midpoint of `a` and `b`.
pub fn bisect(a: DVec2, b: DVec2) -> DVec2 {
    (a + b) * 0.5
}

/// Closest point to `c` on the finite segment from `a` to `b`.
///
/// Uses the clamped scalar projection of `c` onto the segment; returns
/// `a` or `b` exactly when the projection parameter falls outside
/// `[0, 1]`, and `a` for a zero-length segment.
pub fn closest(a: DVec2, b: DVec2, c: DVec2) -> DVec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return a;
    }

    let t = (c - a).dot(ab) / len_sq;
    if t <= 0.0 {
        return a;
    }
    if t >= 1.0 {
        return b;
    }
    a + ab * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn apply_moves_and_clears_delta() {
        let mut p = Point::new(DVec2::new(1.0, 2.0));
        p.delta = DVec2::new(0.5, -0.25);
        p.apply();

        assert_eq!(p.pos, DVec2::new(1.5, 1.75));
        assert_eq!(p.delta, DVec2::ZERO);
    }

    #[test]
    fn new_point_starts_unfrozen_with_no_action() {
        let p = Point::new(DVec2::ZERO);
        assert!(!p.frozen);
        assert_eq!(p.action, ResampleAction::None);
        assert_eq!(p.delta, DVec2::ZERO);
    }

    #[test]
    fn rotate_about_pivot_quarter_turn() {
        let mut p = Point::new(DVec2::new(2.0, 1.0));
        p.rotate_about(DVec2::new(1.0, 1.0), Angle::new(FRAC_PI_2));

        assert!((p.pos.x - 1.0).abs() < 1e-12);
        assert!((p.pos.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn translate_along_angle() {
        let mut p = Point::new(DVec2::ZERO);
        p.translate_along(2.0, Angle::new(FRAC_PI_2));

        assert!(p.pos.x.abs() < 1e-12);
        assert!((p.pos.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn bisect_is_symmetric() {
        let a = DVec2::new(1.0, 3.0);
        let b = DVec2::new(-2.0, 7.5);
        assert_eq!(bisect(a, b), bisect(b, a));
        assert_eq!(bisect(a, b), DVec2::new(-0.5, 5.25));
    }

    #[test]
    fn closest_clamps_to_endpoints() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(2.0, 0.0);

        // Projection parameter < 0: exactly A.
        assert_eq!(closest(a, b, DVec2::new(-1.0, 5.0)), a);
        // Projection parameter > 1: exactly B.
        assert_eq!(closest(a, b, DVec2::new(3.0, -2.0)), b);
    }

    #[test]
    fn closest_projects_onto_interior() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(2.0, 0.0);

        let c = closest(a, b, DVec2::new(0.5, 3.0));
        assert_eq!(c, DVec2::new(0.5, 0.0));

        // The result always lies on the segment.
        let t = (c - a).dot(b - a) / (b - a).length_squared();
        assert!((0.0..=1.0).contains(&t));
    }

    #[test]
    fn closest_handles_zero_length_segment() {
        let a = DVec2::new(1.0, 1.0);
        assert_eq!(closest(a, a, DVec2::new(5.0, 5.0)), a);
    }

    #[test]
    fn angle_to_other_point() {
        let p = Point::new(DVec2::ZERO);
        let q = Point::new(DVec2::new(0.0, 4.0));
        assert!(p.angle_to(&q).approx_eq(Angle::new(FRAC_PI_2)));
    }

    #[test]
    fn approx_eq_tolerates_epsilon_noise() {
        let p = Point::new(DVec2::new(1.0, 1.0));
        let q = Point::new(DVec2::new(1.0 + f64::EPSILON, 1.0));
        assert!(p.approx_eq(&q));

        let r = Point::new(DVec2::new(1.0 + 1e-9, 1.0));
        assert!(!p.approx_eq(&r));
    }
}
