//! Circumsphere calculations for tetrahedra and triangles.
//!
//! The tetrahedron variant uses the closed-form determinant formulation: with
//! vertex rows `(x_i, y_i, z_i)` and squared norms `s_i = x_i² + y_i² + z_i²`,
//!
//! ```text
//! a  = | x_i  y_i  z_i  1 |
//! Dx = | s_i  y_i  z_i  1 |
//! Dy = -| s_i  x_i  z_i  1 |
//! Dz = | s_i  x_i  y_i  1 |
//! c  = | s_i  x_i  y_i  z_i |
//!
//! center = (Dx, Dy, Dz) / (2a)
//! r²     = (Dx² + Dy² + Dz² - 4ac) / (4a²)
//! ```
//!
//! The triangle variant gives the sphere whose great circle is the triangle's
//! circumcircle (the 2D-in-3D case).

use crate::geometry::matrix::{determinant, is_effectively_singular, matrix_from_rows};
use crate::geometry::point::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from circumsphere computations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CircumsphereError {
    /// The simplex has (numerically) zero volume or area.
    #[error("Degenerate simplex: determinant {determinant} is effectively zero")]
    Degenerate {
        /// The offending determinant (or squared normal length for triangles).
        determinant: f64,
    },
    /// The computation produced a NaN or infinite center/radius.
    #[error("Circumsphere computation produced non-finite values")]
    NonFinite,
}

/// A sphere described by its center and radius.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::geometry::point::Point;
/// use voxel_dungeon::geometry::util::circumsphere::Circumsphere;
///
/// let sphere = Circumsphere::of_tetrahedron(&[
///     Point::new([0.0, 0.0, 0.0]),
///     Point::new([2.0, 0.0, 0.0]),
///     Point::new([0.0, 2.0, 0.0]),
///     Point::new([0.0, 0.0, 2.0]),
/// ])
/// .unwrap();
/// assert!(sphere.center().distance(&Point::new([1.0, 1.0, 1.0])) < 1e-9);
/// assert!(sphere.contains(&Point::new([0.5, 0.5, 0.5])));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circumsphere {
    center: Point,
    radius: f64,
}

impl Circumsphere {
    /// Circumscribed sphere of the tetrahedron `points`.
    ///
    /// # Errors
    ///
    /// Returns [`CircumsphereError::Degenerate`] for coplanar or coincident vertices
    /// and [`CircumsphereError::NonFinite`] if the result overflows.
    pub fn of_tetrahedron(points: &[Point; 4]) -> Result<Self, CircumsphereError> {
        // Work relative to the first vertex; the formula is translation-invariant.
        let origin = points[0];
        let rel = points.map(|p| p - origin);
        let sq = rel.map(|p| p.squared_norm());

        let a = det_rows(|i| [rel[i].x(), rel[i].y(), rel[i].z(), 1.0]);

        let longest_edge_sq = (0..4)
            .flat_map(|i| (i + 1..4).map(move |j| (i, j)))
            .map(|(i, j)| rel[i].distance_squared(&rel[j]))
            .fold(0.0_f64, f64::max);
        let scale = longest_edge_sq * longest_edge_sq.sqrt();
        if is_effectively_singular(a, scale) {
            return Err(CircumsphereError::Degenerate { determinant: a });
        }

        let dx = det_rows(|i| [sq[i], rel[i].y(), rel[i].z(), 1.0]);
        let dy = -det_rows(|i| [sq[i], rel[i].x(), rel[i].z(), 1.0]);
        let dz = det_rows(|i| [sq[i], rel[i].x(), rel[i].y(), 1.0]);
        let c = det_rows(|i| [sq[i], rel[i].x(), rel[i].y(), rel[i].z()]);

        let center = Point::new([dx, dy, dz]) / (2.0 * a) + origin;
        let radius_squared =
            (4.0 * a).mul_add(-c, dz.mul_add(dz, dx.mul_add(dx, dy * dy))) / (4.0 * a * a);

        if center.validate().is_err() || !radius_squared.is_finite() {
            return Err(CircumsphereError::NonFinite);
        }

        Ok(Self {
            center,
            radius: radius_squared.max(0.0).sqrt(),
        })
    }

    /// Sphere centered on the circumcenter of the triangle `points`, in the
    /// triangle's own plane, with the circumradius as radius.
    ///
    /// # Errors
    ///
    /// Returns [`CircumsphereError::Degenerate`] for collinear or coincident vertices.
    pub fn of_triangle(points: &[Point; 3]) -> Result<Self, CircumsphereError> {
        let [a, b, c] = *points;
        let ab = b - a;
        let ac = c - a;
        let normal = ab.cross(&ac);
        let normal_sq = normal.squared_norm();

        let scale = ab.squared_norm().max(ac.squared_norm());
        if is_effectively_singular(normal_sq, scale * scale) {
            return Err(CircumsphereError::Degenerate {
                determinant: normal_sq,
            });
        }

        let offset = (normal.cross(&ab) * ac.squared_norm() + ac.cross(&normal) * ab.squared_norm())
            / (2.0 * normal_sq);
        let center = a + offset;
        if center.validate().is_err() {
            return Err(CircumsphereError::NonFinite);
        }

        Ok(Self {
            center,
            radius: offset.squared_norm().sqrt(),
        })
    }

    /// The sphere's center.
    #[inline]
    #[must_use]
    pub const fn center(&self) -> Point {
        self.center
    }

    /// The sphere's radius.
    #[inline]
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns `true` if `point` lies inside or on the sphere
    /// (`distance(center, point) <= radius`).
    #[inline]
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        self.center.distance(point) <= self.radius
    }

    /// Returns `true` if `point` lies strictly inside the sphere, shrunk by `tolerance`.
    #[inline]
    #[must_use]
    pub fn strictly_contains(&self, point: &Point, tolerance: f64) -> bool {
        self.center.distance(point) < self.radius - tolerance
    }
}

/// Determinant of the 4×4 matrix whose `i`-th row is `row(i)`.
fn det_rows(row: impl Fn(usize) -> [f64; 4]) -> f64 {
    determinant(&matrix_from_rows([row(0), row(1), row(2), row(3)]))
}
