//! Matrix operations.
//!
//! Small, stack-allocated linear algebra helpers used by the circumsphere
//! computations. Backed by `nalgebra`'s fixed-size matrices.

#![forbid(unsafe_code)]

use nalgebra::Matrix4;

/// Internal 4×4 matrix type.
pub type Matrix4x4 = Matrix4<f64>;

/// Default relative tolerance for singularity checks.
///
/// A determinant is treated as zero when its magnitude is below this value
/// multiplied by the natural scale of the matrix (see [`is_effectively_singular`]).
pub const SINGULARITY_TOLERANCE: f64 = 1e-12;

/// Builds a 4×4 matrix from rows.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::geometry::matrix::{determinant, matrix_from_rows};
///
/// let m = matrix_from_rows([
///     [2.0, 0.0, 0.0, 0.0],
///     [0.0, 3.0, 0.0, 0.0],
///     [0.0, 0.0, 4.0, 0.0],
///     [0.0, 0.0, 0.0, 1.0],
/// ]);
/// assert_eq!(determinant(&m), 24.0);
/// ```
#[must_use]
pub fn matrix_from_rows(rows: [[f64; 4]; 4]) -> Matrix4x4 {
    let [r0, r1, r2, r3] = rows;
    Matrix4x4::new(
        r0[0], r0[1], r0[2], r0[3], //
        r1[0], r1[1], r1[2], r1[3], //
        r2[0], r2[1], r2[2], r2[3], //
        r3[0], r3[1], r3[2], r3[3],
    )
}

/// Determinant of a 4×4 matrix.
#[inline]
#[must_use]
pub fn determinant(m: &Matrix4x4) -> f64 {
    m.determinant()
}

/// Returns `true` when `det` is indistinguishable from zero relative to `scale`.
///
/// `scale` is the magnitude the determinant would have for a well-conditioned
/// input of the same size (for a tetrahedron, the cube of its longest edge).
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::geometry::matrix::is_effectively_singular;
///
/// assert!(is_effectively_singular(1e-20, 1.0));
/// assert!(!is_effectively_singular(0.5, 1.0));
/// assert!(is_effectively_singular(f64::NAN, 1.0));
/// ```
#[inline]
#[must_use]
pub fn is_effectively_singular(det: f64, scale: f64) -> bool {
    !det.is_finite() || det.abs() <= SINGULARITY_TOLERANCE * scale.abs().max(f64::MIN_POSITIVE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn determinant_of_identity_is_one() {
        let m = matrix_from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert_relative_eq!(determinant(&m), 1.0);
    }

    #[test]
    fn determinant_with_repeated_rows_is_singular() {
        let m = matrix_from_rows([
            [1.0, 2.0, 3.0, 1.0],
            [1.0, 2.0, 3.0, 1.0],
            [0.0, 0.0, 1.0, 1.0],
            [5.0, 0.0, 0.0, 1.0],
        ]);
        assert!(is_effectively_singular(determinant(&m), 1.0));
    }

    #[test]
    fn rows_are_placed_in_order() {
        // Swapping two rows flips the sign.
        let a = matrix_from_rows([
            [0.0, 1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert_relative_eq!(determinant(&a), -1.0);
    }
}
