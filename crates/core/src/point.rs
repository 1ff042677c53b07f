//! Two-dimensional point/displacement value type.
//!
//! `Point` doubles as a position (a vector's origin) and a displacement
//! (a vector's direction). Angles are reported in degrees in `[0, 360)`,
//! measured counter-clockwise from the positive x axis.

use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A 2D point with `f64` components.
///
/// Ordering is lexicographic: x is the primary key, y the secondary.
/// This is the ordering used when points are compared as values; it is
/// deliberately *not* a magnitude comparison.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The origin / zero displacement.
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Creates a point from its components.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length `sqrt(x² + y²)`.
    pub fn length(&self) -> f64 {
        self.squared_length().sqrt()
    }

    /// Squared Euclidean length `x² + y²`.
    pub fn squared_length(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Angle in degrees in `[0, 360)`, counter-clockwise from the +x axis.
    ///
    /// The zero point reports an angle of 0.
    pub fn angle(&self) -> f64 {
        let deg = self.y.atan2(self.x).to_degrees();
        if deg < 0.0 { deg + 360.0 } else { deg }
    }

    /// Dot product.
    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (the z component of the 3D cross product).
    pub fn cross(&self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.x.partial_cmp(&other.x) {
            Some(Ordering::Equal) => self.y.partial_cmp(&other.y),
            ord => ord,
        }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Point> for f64 {
    type Output = Point;

    fn mul(self, rhs: Point) -> Point {
        rhs * self
    }
}

impl From<DVec2> for Point {
    fn from(v: DVec2) -> Self {
        Point::new(v.x, v.y)
    }
}

impl From<Point> for DVec2 {
    fn from(p: Point) -> Self {
        DVec2::new(p.x, p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    // -- Length --

    #[test]
    fn length_of_3_4_is_5() {
        assert!((Point::new(3.0, 4.0).length() - 5.0).abs() < EPS);
    }

    #[test]
    fn squared_length_avoids_the_sqrt() {
        assert!((Point::new(3.0, 4.0).squared_length() - 25.0).abs() < EPS);
    }

    #[test]
    fn zero_point_has_zero_length() {
        assert_eq!(Point::ZERO.length(), 0.0);
    }

    // -- Angle --

    #[test]
    fn angle_of_positive_x_axis_is_zero() {
        assert!(Point::new(1.0, 0.0).angle().abs() < EPS);
    }

    #[test]
    fn angle_of_positive_y_axis_is_90() {
        assert!((Point::new(0.0, 1.0).angle() - 90.0).abs() < EPS);
    }

    #[test]
    fn angle_of_negative_x_axis_is_180() {
        assert!((Point::new(-1.0, 0.0).angle() - 180.0).abs() < EPS);
    }

    #[test]
    fn angle_of_negative_y_axis_is_270() {
        assert!((Point::new(0.0, -1.0).angle() - 270.0).abs() < EPS);
    }

    #[test]
    fn angle_of_zero_point_is_zero() {
        assert_eq!(Point::ZERO.angle(), 0.0);
    }

    // -- Dot / cross --

    #[test]
    fn dot_of_orthogonal_vectors_is_zero() {
        assert_eq!(Point::new(1.0, 0.0).dot(Point::new(0.0, 1.0)), 0.0);
    }

    #[test]
    fn cross_is_antisymmetric() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 5.0);
        assert!((a.cross(b) + b.cross(a)).abs() < EPS);
    }

    #[test]
    fn cross_of_x_with_y_is_one() {
        assert_eq!(Point::new(1.0, 0.0).cross(Point::new(0.0, 1.0)), 1.0);
    }

    // -- Ordering --

    #[test]
    fn ordering_uses_x_as_primary_key() {
        assert!(Point::new(1.0, 9.0) < Point::new(2.0, 0.0));
    }

    #[test]
    fn ordering_falls_back_to_y_on_equal_x() {
        assert!(Point::new(1.0, 2.0) < Point::new(1.0, 3.0));
    }

    #[test]
    fn equal_points_compare_equal() {
        assert_eq!(Point::new(1.0, 2.0), Point::new(1.0, 2.0));
    }

    // -- Operators --

    #[test]
    fn add_and_sub_are_inverse() {
        let a = Point::new(1.5, -2.5);
        let b = Point::new(0.25, 4.0);
        let c = a + b - b;
        assert!((c.x - a.x).abs() < EPS && (c.y - a.y).abs() < EPS);
    }

    #[test]
    fn scalar_multiplication_commutes() {
        let p = Point::new(2.0, -3.0);
        assert_eq!(p * 2.0, 2.0 * p);
    }

    #[test]
    fn negation_flips_both_components() {
        assert_eq!(-Point::new(1.0, -2.0), Point::new(-1.0, 2.0));
    }

    // -- glam interop --

    #[test]
    fn dvec2_round_trip_preserves_components() {
        let p = Point::new(0.125, -7.5);
        let back = Point::from(DVec2::from(p));
        assert_eq!(p, back);
    }

    // -- Property-based tests --

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn finite() -> impl Strategy<Value = f64> {
            -1e6_f64..1e6
        }

        proptest! {
            #[test]
            fn angle_is_always_in_zero_to_360(x in finite(), y in finite()) {
                let a = Point::new(x, y).angle();
                prop_assert!((0.0..360.0).contains(&a), "angle {a} out of range");
            }

            #[test]
            fn length_squared_matches_squared_length(x in finite(), y in finite()) {
                let p = Point::new(x, y);
                let l = p.length();
                prop_assert!(
                    (l * l - p.squared_length()).abs() <= 1e-6 * p.squared_length().max(1.0),
                    "length² = {} vs squared_length = {}", l * l, p.squared_length()
                );
            }

            #[test]
            fn dot_with_self_is_squared_length(x in finite(), y in finite()) {
                let p = Point::new(x, y);
                prop_assert!((p.dot(p) - p.squared_length()).abs() < 1e-9 * p.squared_length().max(1.0));
            }
        }
    }
}
