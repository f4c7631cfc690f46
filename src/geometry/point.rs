//! Data and operations on 3D points.
//!
//! # Equality Semantics
//!
//! A [`Point`] is a plain value. Two points compare equal with `==` when their
//! coordinates are bitwise-equal under [`OrderedFloat`] semantics (so `NaN == NaN`
//! and points can be used as hash keys).
//!
//! *Identity* of a point inside a triangulation is never derived from its
//! coordinates: it is the [`VertexKey`](crate::core::triangulation_data_structure::VertexKey)
//! under which the point is stored. A third, deliberately separate predicate,
//! [`Point::approx_eq`], treats two points as the same location when they are
//! closer than [`APPROX_EQ_EPSILON`]; it exists for near-duplicate room centers
//! and is never used as primary equality.

#![forbid(unsafe_code)]

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Sub};
use thiserror::Error;

/// Distance below which two points are considered the same location by
/// [`Point::approx_eq`].
pub const APPROX_EQ_EPSILON: f64 = 0.1;

/// Errors produced when validating point coordinates.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::geometry::point::{Point, PointValidationError};
///
/// let err = Point::new([0.0, f64::NAN, 0.0]).validate().unwrap_err();
/// assert!(matches!(err, PointValidationError::NonFinite { axis: 1, .. }));
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PointValidationError {
    /// A coordinate is NaN or infinite.
    #[error("Non-finite coordinate on axis {axis}: {value}")]
    NonFinite {
        /// Axis index (0 = x, 1 = y, 2 = z).
        axis: usize,
        /// The offending value.
        value: f64,
    },
}

/// An immutable point (or vector) in 3D space.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::geometry::point::Point;
///
/// let a = Point::new([0.0, 0.0, 0.0]);
/// let b = Point::new([3.0, 4.0, 0.0]);
/// assert_eq!(a.distance(&b), 5.0);
/// assert!(!a.approx_eq(&b));
/// ```
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Point {
    coords: [f64; 3],
}

impl Point {
    /// Creates a point from its `[x, y, z]` coordinates.
    #[inline]
    #[must_use]
    pub const fn new(coords: [f64; 3]) -> Self {
        Self { coords }
    }

    /// Returns a reference to the coordinates.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> &[f64; 3] {
        &self.coords
    }

    /// The x coordinate.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.coords[0]
    }

    /// The y coordinate.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.coords[1]
    }

    /// The z coordinate.
    #[inline]
    #[must_use]
    pub const fn z(&self) -> f64 {
        self.coords[2]
    }

    /// Squared Euclidean length when the point is read as a vector from the origin.
    #[inline]
    #[must_use]
    pub fn squared_norm(&self) -> f64 {
        self.dot(self)
    }

    /// Dot product of the two points read as vectors.
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Cross product of the two points read as vectors.
    #[must_use]
    pub fn cross(&self, other: &Self) -> Self {
        let [ax, ay, az] = self.coords;
        let [bx, by, bz] = other.coords;
        Self::new([
            ay.mul_add(bz, -(az * by)),
            az.mul_add(bx, -(ax * bz)),
            ax.mul_add(by, -(ay * bx)),
        ])
    }

    /// Squared Euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        (*self - *other).squared_norm()
    }

    /// Euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns `true` if `other` lies closer than [`APPROX_EQ_EPSILON`].
    ///
    /// This is a location heuristic for near-duplicate inputs, not an equivalence
    /// relation (it is not transitive).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use voxel_dungeon::geometry::point::Point;
    ///
    /// let a = Point::new([1.0, 1.0, 1.0]);
    /// let b = Point::new([1.05, 1.0, 1.0]);
    /// assert!(a.approx_eq(&b));
    /// assert_ne!(a, b);
    /// ```
    #[inline]
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.distance(other) < APPROX_EQ_EPSILON
    }

    /// Checks that every coordinate is finite.
    ///
    /// # Errors
    ///
    /// Returns [`PointValidationError::NonFinite`] for the first NaN or infinite coordinate.
    pub fn validate(&self) -> Result<(), PointValidationError> {
        for (axis, &value) in self.coords.iter().enumerate() {
            if !value.is_finite() {
                return Err(PointValidationError::NonFinite { axis, value });
            }
        }
        Ok(())
    }

    /// Component-wise minimum.
    #[must_use]
    pub fn min(&self, other: &Self) -> Self {
        Self::new([
            self.x().min(other.x()),
            self.y().min(other.y()),
            self.z().min(other.z()),
        ])
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max(&self, other: &Self) -> Self {
        Self::new([
            self.x().max(other.x()),
            self.y().max(other.y()),
            self.z().max(other.z()),
        ])
    }
}

// =============================================================================
// STANDARD TRAIT IMPLEMENTATIONS
// =============================================================================

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for &coord in &self.coords {
            OrderedFloat(coord).hash(state);
        }
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .all(|(&a, &b)| OrderedFloat(a) == OrderedFloat(b))
    }
}

impl Eq for Point {}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x(), self.y(), self.z())
    }
}

impl From<[f64; 3]> for Point {
    #[inline]
    fn from(coords: [f64; 3]) -> Self {
        Self::new(coords)
    }
}

impl From<Point> for [f64; 3] {
    #[inline]
    fn from(point: Point) -> Self {
        point.coords
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new([self.x() + rhs.x(), self.y() + rhs.y(), self.z() + rhs.z()])
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new([self.x() - rhs.x(), self.y() - rhs.y(), self.z() - rhs.z()])
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new([self.x() * rhs, self.y() * rhs, self.z() * rhs])
    }
}

impl Div<f64> for Point {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new([self.x() / rhs, self.y() / rhs, self.z() / rhs])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    #[test]
    fn point_distance() {
        let a = Point::new([1.0, 2.0, 3.0]);
        let b = Point::new([4.0, 6.0, 3.0]);
        assert_relative_eq!(a.distance(&b), 5.0);
        assert_relative_eq!(a.distance_squared(&b), 25.0);
        assert_relative_eq!(b.distance(&a), a.distance(&b));
    }

    #[test]
    fn approx_eq_uses_fixed_epsilon() {
        let a = Point::new([0.0, 0.0, 0.0]);
        assert!(a.approx_eq(&Point::new([0.0, 0.099, 0.0])));
        assert!(!a.approx_eq(&Point::new([0.0, 0.1, 0.0])));
        assert!(!a.approx_eq(&Point::new([0.08, 0.08, 0.0])));
    }

    #[test]
    fn value_equality_is_exact() {
        let a = Point::new([0.0, 0.0, 0.0]);
        let b = Point::new([0.0, 0.0, 1e-12]);
        assert_ne!(a, b);
        assert!(a.approx_eq(&b));
        assert_eq!(a, Point::new([0.0, 0.0, 0.0]));
    }

    #[test]
    fn nan_points_hash_and_compare_consistently() {
        let a = Point::new([f64::NAN, 0.0, 0.0]);
        let b = Point::new([f64::NAN, 0.0, 0.0]);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn validate_rejects_infinite() {
        assert!(Point::new([1.0, 2.0, 3.0]).validate().is_ok());
        assert_eq!(
            Point::new([1.0, 2.0, f64::INFINITY]).validate(),
            Err(PointValidationError::NonFinite {
                axis: 2,
                value: f64::INFINITY
            })
        );
    }

    #[test]
    fn vector_operations() {
        let x = Point::new([1.0, 0.0, 0.0]);
        let y = Point::new([0.0, 1.0, 0.0]);
        assert_eq!(x.cross(&y), Point::new([0.0, 0.0, 1.0]));
        assert_relative_eq!(x.dot(&y), 0.0);
        assert_eq!((x + y) * 2.0, Point::new([2.0, 2.0, 0.0]));
        assert_eq!((x - y) / 2.0, Point::new([0.5, -0.5, 0.0]));
        assert_eq!(x.min(&y), Point::new([0.0, 0.0, 0.0]));
        assert_eq!(x.max(&y), Point::new([1.0, 1.0, 0.0]));
    }
}
