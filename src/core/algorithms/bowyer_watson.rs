//! Incremental Bowyer-Watson algorithm for 3D Delaunay triangulation.
//!
//! # Algorithm Overview
//!
//! 1. **Bootstrap**: build a regular super-tetrahedron, centered on the input
//!    bounding box, whose interior strictly contains that box.
//! 2. **Incremental insertion**: for each input point, in input order:
//!    - mark every tetrahedron whose circumsphere contains the point as bad
//!      (a local flag vector, not a field on the tetrahedron);
//!    - split the bad tetrahedra into faces and keep the faces that occur exactly
//!      once, which bound the cavity;
//!    - drop the bad tetrahedra and connect every boundary face to the point.
//! 3. **Cleanup**: discard every tetrahedron that touches a super-tetrahedron
//!    corner, then derive the unique edges and faces.
//!
//! # Connectivity
//!
//! A hull vertex whose every tetrahedron reaches a super-tetrahedron corner is
//! left without edges by the cleanup step. That happens when a nearly flat hull
//! tetrahedron has a circumsphere large enough to swallow a corner. After each
//! run the edge graph is checked with
//! [`is_connected`](crate::core::util::delaunay_validation::is_connected); a
//! disconnected result is recomputed with `super_scale` (at least 1) multiplied
//! by [`SUPER_SCALE_GROWTH`], at most [`MAX_SUPER_SCALE_RETRIES`] times.
//!
//! # Face Matching
//!
//! Cavity faces are matched structurally, by their sorted [`VertexKey`]s. Two
//! faces are the same face exactly when they have the same three vertices, so
//! near-duplicate input points can never merge two different faces. Location
//! based matching is available separately through
//! [`Triangle::almost_eq`](crate::core::triangle::Triangle::almost_eq) and the
//! opt-in [`TriangulationOptions::reject_near_duplicates`] check.
//!
//! # Degenerate Input
//!
//! Coplanar quadruples are not perturbed internally. If a new tetrahedron in a
//! cavity would be flat, insertion stops with [`TriangulationError::Simplex`]
//! naming the input index; callers that need a result should jitter their
//! points first.
//!
//! # References
//!
//! - **Bowyer, A.** "Computing Dirichlet tessellations." *The Computer Journal* 24.2 (1981): 162-166.
//! - **Watson, D.F.** "Computing the n-dimensional Delaunay tessellation with application to
//!   Voronoi polytopes." *The Computer Journal* 24.2 (1981): 167-172.

use crate::core::collections::{Entry, FaceBuffer, FaceKey, FastHashMap, fast_hash_map_with_capacity};
use crate::core::tetrahedron::Tetrahedron;
use crate::core::triangle::{SimplexError, Triangle};
use crate::core::triangulation::Triangulation;
use crate::core::triangulation_data_structure::{VertexKey, VertexStore};
use crate::core::util::delaunay_validation::is_connected;
use crate::geometry::point::{Point, PointValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Factor applied to `super_scale` each time a run is repeated.
pub const SUPER_SCALE_GROWTH: f64 = 16.0;

/// Reruns allowed after the first one leaves the edge graph disconnected.
///
/// Corners much further out than `8 * 16^2` box sides trip the flatness check
/// on small hull faces.
pub const MAX_SUPER_SCALE_RETRIES: usize = 2;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors that can occur while triangulating.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::core::algorithms::bowyer_watson::{TriangulationError, triangulate};
/// use voxel_dungeon::geometry::point::Point;
///
/// let err = triangulate(&[Point::new([0.0, 0.0, 0.0])]).unwrap_err();
/// assert_eq!(err, TriangulationError::InsufficientVertices { actual: 1 });
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TriangulationError {
    /// Fewer than four input points.
    #[error("Triangulation requires at least 4 points, got {actual}")]
    InsufficientVertices {
        /// Number of points supplied.
        actual: usize,
    },
    /// An input point has a NaN or infinite coordinate.
    #[error("Input point {index} is invalid: {source}")]
    NonFiniteCoordinate {
        /// Input index of the point.
        index: usize,
        /// Which coordinate failed.
        source: PointValidationError,
    },
    /// Two input points approximately coincide (only with
    /// [`TriangulationOptions::reject_near_duplicates`]).
    #[error("Input point {index} approximately coincides with input point {existing}")]
    NearDuplicate {
        /// Input index of the later point.
        index: usize,
        /// Input index of the earlier point.
        existing: usize,
    },
    /// No tetrahedron's circumsphere contained the point being inserted.
    #[error("Input point {index} is not enclosed by any circumsphere")]
    PointNotEnclosed {
        /// Input index of the point.
        index: usize,
    },
    /// Re-triangulating the cavity around a point produced an invalid tetrahedron.
    #[error("Failed to fill cavity for input point {index}: {source}")]
    Simplex {
        /// Input index of the point being inserted.
        index: usize,
        /// The construction failure.
        source: SimplexError,
    },
}

// =============================================================================
// OPTIONS AND STATISTICS
// =============================================================================

/// Tuning knobs for [`BowyerWatson`].
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::core::algorithms::bowyer_watson::TriangulationOptions;
///
/// let options = TriangulationOptions::default()
///     .with_reject_near_duplicates(true)
///     .with_super_scale(100.0);
/// assert!(options.reject_near_duplicates);
/// assert_eq!(options.super_margin, 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriangulationOptions {
    /// Fail with [`TriangulationError::NearDuplicate`] when two inputs lie closer
    /// than [`APPROX_EQ_EPSILON`](crate::geometry::point::APPROX_EQ_EPSILON).
    pub reject_near_duplicates: bool,
    /// Padding added on every side of the input bounding box before the
    /// super-tetrahedron is fitted around it.
    pub super_margin: f64,
    /// Extra reach of the super-tetrahedron corners, in multiples of the padded
    /// box's largest side. Each corner sits `(1.5 + super_scale) * side` from the
    /// box center along a cube diagonal. This is the starting value; see
    /// [`MAX_SUPER_SCALE_RETRIES`].
    pub super_scale: f64,
}

impl Default for TriangulationOptions {
    fn default() -> Self {
        Self {
            reject_near_duplicates: false,
            super_margin: 1.0,
            super_scale: 8.0,
        }
    }
}

impl TriangulationOptions {
    /// Sets [`Self::reject_near_duplicates`].
    #[must_use]
    pub const fn with_reject_near_duplicates(mut self, reject: bool) -> Self {
        self.reject_near_duplicates = reject;
        self
    }

    /// Sets [`Self::super_margin`].
    #[must_use]
    pub const fn with_super_margin(mut self, margin: f64) -> Self {
        self.super_margin = margin;
        self
    }

    /// Sets [`Self::super_scale`].
    #[must_use]
    pub const fn with_super_scale(mut self, scale: f64) -> Self {
        self.super_scale = scale;
        self
    }
}

/// Counters collected during one triangulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertionStatistics {
    /// Input points inserted.
    pub points_inserted: usize,
    /// Bad tetrahedra removed across all cavities.
    pub bad_tetrahedra_removed: usize,
    /// Tetrahedra created while filling cavities.
    pub tetrahedra_created: usize,
    /// Tetrahedra discarded at the end for touching a super-tetrahedron corner.
    pub super_tetrahedra_purged: usize,
    /// Largest number of boundary faces seen in a single cavity.
    pub max_cavity_faces: usize,
    /// Insertion passes made, counting reruns with a larger super-tetrahedron.
    pub runs: usize,
}

// =============================================================================
// ALGORITHM
// =============================================================================

/// Incremental Bowyer-Watson triangulator.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::core::algorithms::bowyer_watson::BowyerWatson;
/// use voxel_dungeon::core::triangulation_data_structure::VertexStore;
/// use voxel_dungeon::geometry::point::Point;
///
/// let store = VertexStore::from_points(&[
///     Point::new([0.0, 0.0, 0.0]),
///     Point::new([1.0, 0.0, 0.0]),
///     Point::new([0.0, 1.0, 0.0]),
///     Point::new([0.0, 0.0, 1.0]),
///     Point::new([1.0, 0.9, 1.2]),
/// ]);
/// let (tri, stats) = BowyerWatson::new().triangulate_with_statistics(&store).unwrap();
///
/// assert_eq!(stats.points_inserted, 5);
/// assert_eq!(tri.vertices().keys(), store.keys());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct BowyerWatson {
    options: TriangulationOptions,
}

impl BowyerWatson {
    /// Creates a triangulator with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a triangulator with the given options.
    #[must_use]
    pub const fn with_options(options: TriangulationOptions) -> Self {
        Self { options }
    }

    /// The active options.
    #[must_use]
    pub const fn options(&self) -> &TriangulationOptions {
        &self.options
    }

    /// Triangulates the points of `store`.
    ///
    /// The returned triangulation keeps the keys of `store`, so running this
    /// twice on the same store yields identical edge and triangle sets.
    ///
    /// If a run leaves some vertex without edges, the run is repeated with a
    /// larger super-tetrahedron (see the module docs). Only the last
    /// successful run is returned.
    ///
    /// # Errors
    ///
    /// See [`TriangulationError`].
    pub fn triangulate(&self, store: &VertexStore) -> Result<Triangulation, TriangulationError> {
        self.triangulate_with_statistics(store).map(|(tri, _)| tri)
    }

    /// Like [`BowyerWatson::triangulate`], also returning the counters of the
    /// run that produced the result.
    ///
    /// # Errors
    ///
    /// See [`TriangulationError`]. Errors from the first run are returned as
    /// is; a failing rerun falls back to the previous result.
    pub fn triangulate_with_statistics(
        &self,
        store: &VertexStore,
    ) -> Result<(Triangulation, InsertionStatistics), TriangulationError> {
        let inputs: Vec<(VertexKey, Point)> = store.iter().map(|(k, p)| (k, *p)).collect();
        self.validate_inputs(&inputs)?;

        let mut super_scale = self.options.super_scale.max(0.0);
        let (mut triangulation, mut stats) = self.run(store, &inputs, super_scale)?;
        let mut runs = 1;

        while runs <= MAX_SUPER_SCALE_RETRIES && !is_connected(&triangulation) {
            super_scale = super_scale.max(1.0) * SUPER_SCALE_GROWTH;
            tracing::debug!(
                runs,
                super_scale,
                "Triangulation left a vertex unconnected, retrying with a larger super-tetrahedron"
            );
            match self.run(store, &inputs, super_scale) {
                Ok(result) => (triangulation, stats) = result,
                Err(err) => {
                    tracing::warn!(%err, super_scale, "Retry failed, keeping previous triangulation");
                    break;
                }
            }
            runs += 1;
        }

        if !is_connected(&triangulation) {
            tracing::warn!(
                runs,
                super_scale,
                "Triangulation is still disconnected after enlarging the super-tetrahedron"
            );
        }
        stats.runs = runs;
        Ok((triangulation, stats))
    }

    /// One full insertion pass with corners at the given `super_scale`.
    fn run(
        &self,
        store: &VertexStore,
        inputs: &[(VertexKey, Point)],
        super_scale: f64,
    ) -> Result<(Triangulation, InsertionStatistics), TriangulationError> {
        let mut stats = InsertionStatistics::default();
        let mut working = store.clone();
        let super_keys = self.insert_super_vertices(&mut working, inputs, super_scale);
        let mut tetrahedra = vec![
            Tetrahedron::new(super_keys, &working)
                .map_err(|source| TriangulationError::Simplex { index: 0, source })?,
        ];

        for (index, &(key, point)) in inputs.iter().enumerate() {
            Self::insert_point(&mut tetrahedra, &working, index, key, &point, &mut stats)?;
        }

        let before = tetrahedra.len();
        tetrahedra.retain(|tet| !tet.contains_any_vertex(&super_keys));
        stats.super_tetrahedra_purged = before - tetrahedra.len();

        for key in super_keys {
            working.remove(key);
        }

        let triangulation = Triangulation::from_tetrahedra(working, tetrahedra);
        tracing::debug!(
            vertices = triangulation.number_of_vertices(),
            tetrahedra = triangulation.tetrahedra().len(),
            triangles = triangulation.triangles().len(),
            edges = triangulation.edges().len(),
            purged = stats.super_tetrahedra_purged,
            super_scale,
            "Bowyer-Watson triangulation complete"
        );
        Ok((triangulation, stats))
    }

    fn validate_inputs(&self, inputs: &[(VertexKey, Point)]) -> Result<(), TriangulationError> {
        if inputs.len() < 4 {
            return Err(TriangulationError::InsufficientVertices {
                actual: inputs.len(),
            });
        }
        for (index, (_, point)) in inputs.iter().enumerate() {
            point
                .validate()
                .map_err(|source| TriangulationError::NonFiniteCoordinate { index, source })?;
        }
        if self.options.reject_near_duplicates {
            for (index, (_, point)) in inputs.iter().enumerate() {
                if let Some(existing) = inputs[..index].iter().position(|(_, q)| point.approx_eq(q))
                {
                    return Err(TriangulationError::NearDuplicate { index, existing });
                }
            }
        }
        Ok(())
    }

    /// Adds the four super-tetrahedron corners to `store`.
    ///
    /// The box is padded by `super_margin` on every side. With `side` its largest
    /// extent and `reach = (1.5 + super_scale) * side`, the corners are
    /// `center + reach * (±1, ±1, ±1)` with an even number of minus signs. Each
    /// face plane lies `reach / √3` from the center while the padded box reaches
    /// at most `side * √3 / 2` from it, so any `reach > 1.5 * side` encloses the
    /// box strictly.
    fn insert_super_vertices(
        &self,
        store: &mut VertexStore,
        inputs: &[(VertexKey, Point)],
        super_scale: f64,
    ) -> [VertexKey; 4] {
        let (min, max) = inputs.iter().fold(
            (Point::new([f64::INFINITY; 3]), Point::new([f64::NEG_INFINITY; 3])),
            |(lo, hi), (_, p)| (lo.min(p), hi.max(p)),
        );
        let margin = self.options.super_margin.max(f64::EPSILON);
        let lo = min - Point::new([margin; 3]);
        let hi = max + Point::new([margin; 3]);
        let center = (lo + hi) / 2.0;
        let padded = hi - lo;
        let side = padded.x().max(padded.y()).max(padded.z());
        let reach = side * (1.5 + super_scale.max(0.0));

        tracing::debug!(
            %min,
            %max,
            %center,
            reach,
            "Super-tetrahedron bounds"
        );

        [
            store.insert(center + Point::new([reach, reach, reach])),
            store.insert(center + Point::new([reach, -reach, -reach])),
            store.insert(center + Point::new([-reach, reach, -reach])),
            store.insert(center + Point::new([-reach, -reach, reach])),
        ]
    }

    fn insert_point(
        tetrahedra: &mut Vec<Tetrahedron>,
        store: &VertexStore,
        index: usize,
        key: VertexKey,
        point: &Point,
        stats: &mut InsertionStatistics,
    ) -> Result<(), TriangulationError> {
        let bad: Vec<bool> = tetrahedra
            .iter()
            .map(|tet| tet.circumsphere_contains(point))
            .collect();
        let bad_count = bad.iter().filter(|&&b| b).count();
        if bad_count == 0 {
            return Err(TriangulationError::PointNotEnclosed { index });
        }

        let boundary = cavity_boundary(
            tetrahedra
                .iter()
                .zip(&bad)
                .filter(|(_, is_bad)| **is_bad)
                .map(|(tet, _)| tet),
        );

        let mut flags = bad.iter();
        tetrahedra.retain(|_| !flags.next().copied().unwrap_or(false));

        for face in &boundary {
            let [a, b, c] = *face.vertices();
            let tet = Tetrahedron::new([a, b, c, key], store)
                .map_err(|source| TriangulationError::Simplex { index, source })?;
            tetrahedra.push(tet);
        }

        tracing::trace!(
            index,
            bad = bad_count,
            boundary_faces = boundary.len(),
            live = tetrahedra.len(),
            "Inserted point"
        );

        stats.points_inserted += 1;
        stats.bad_tetrahedra_removed += bad_count;
        stats.tetrahedra_created += boundary.len();
        stats.max_cavity_faces = stats.max_cavity_faces.max(boundary.len());
        Ok(())
    }
}

/// Faces that occur exactly once among the faces of `bad`.
///
/// Faces shared by two bad tetrahedra are interior to the cavity and drop out.
/// The result keeps first-occurrence order.
fn cavity_boundary<'a>(bad: impl Iterator<Item = &'a Tetrahedron> + Clone) -> FaceBuffer<Triangle> {
    let mut counts: FastHashMap<FaceKey, usize> = fast_hash_map_with_capacity(32);
    for tet in bad.clone() {
        for face in tet.faces() {
            match counts.entry(face.face_key()) {
                Entry::Occupied(mut e) => *e.get_mut() += 1,
                Entry::Vacant(e) => {
                    e.insert(1);
                }
            }
        }
    }

    bad.flat_map(Tetrahedron::faces)
        .filter(|face| counts.get(&face.face_key()) == Some(&1))
        .collect()
}

/// Triangulates `points` with default options.
///
/// Each point becomes its own vertex, keyed in input order.
///
/// # Errors
///
/// See [`TriangulationError`].
pub fn triangulate(points: &[Point]) -> Result<Triangulation, TriangulationError> {
    BowyerWatson::new().triangulate(&VertexStore::from_points(points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::util::delaunay_validation::{find_delaunay_violations, is_connected};

    /// Slightly perturbed unit cube plus an interior point, in general position.
    fn cube_with_center() -> Vec<Point> {
        vec![
            Point::new([0.0, 0.0, 0.0]),
            Point::new([1.0, 0.1, 0.05]),
            Point::new([0.05, 1.1, 0.1]),
            Point::new([0.1, 0.05, 0.95]),
            Point::new([1.05, 1.0, 0.1]),
            Point::new([0.95, 0.1, 1.1]),
            Point::new([0.1, 0.9, 1.05]),
            Point::new([1.1, 1.05, 0.9]),
            Point::new([0.5, 0.45, 0.55]),
        ]
    }

    #[test]
    fn single_tetrahedron() {
        let tri = triangulate(&[
            Point::new([0.0, 0.0, 0.0]),
            Point::new([1.0, 0.0, 0.0]),
            Point::new([0.0, 1.0, 0.0]),
            Point::new([0.0, 0.0, 1.0]),
        ])
        .unwrap();
        assert_eq!(tri.tetrahedra().len(), 1);
        assert_eq!(tri.edges().len(), 6);
        assert_eq!(tri.triangles().len(), 4);
    }

    #[test]
    fn super_vertices_do_not_survive() {
        let store = VertexStore::from_points(&cube_with_center());
        let tri = BowyerWatson::new().triangulate(&store).unwrap();
        assert_eq!(tri.vertices().keys(), store.keys());
        for tet in tri.tetrahedra() {
            for key in tet.vertices() {
                assert!(store.contains_key(*key));
            }
        }
    }

    #[test]
    fn centered_cube_is_delaunay_and_connected() {
        let tri = triangulate(&cube_with_center()).unwrap();
        assert!(!tri.tetrahedra().is_empty());
        assert!(find_delaunay_violations(&tri, 1e-9).is_empty());
        assert!(is_connected(&tri));
    }

    #[test]
    fn statistics_balance() {
        let points = [
            Point::new([0.0, 0.0, 0.0]),
            Point::new([4.0, 0.5, 0.2]),
            Point::new([0.3, 3.8, 0.1]),
            Point::new([0.2, 0.4, 4.1]),
            Point::new([2.1, 1.7, 1.9]),
            Point::new([3.3, 3.1, 0.4]),
        ];
        let store = VertexStore::from_points(&points);
        let (tri, stats) = BowyerWatson::new()
            .triangulate_with_statistics(&store)
            .unwrap();
        assert_eq!(stats.points_inserted, points.len());
        // 1 super-tetrahedron + created - removed - purged = survivors.
        assert_eq!(
            1 + stats.tetrahedra_created - stats.bad_tetrahedra_removed - stats.super_tetrahedra_purged,
            tri.tetrahedra().len()
        );
        assert!(stats.max_cavity_faces >= 4);
        assert!(stats.runs >= 1);
    }

    /// Small random sets used to lose hull vertices when the cleanup removed
    /// every tetrahedron around them.
    #[test]
    fn small_random_sets_stay_connected() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        for count in [6, 12] {
            let mut rng = StdRng::seed_from_u64(0x5eed + count as u64);
            for round in 0..200 {
                let points: Vec<Point> = (0..count)
                    .map(|_| {
                        Point::new([
                            rng.random_range(-50.0..50.0),
                            rng.random_range(-50.0..50.0),
                            rng.random_range(-50.0..50.0),
                        ])
                    })
                    .collect();
                let tri = triangulate(&points)
                    .unwrap_or_else(|err| panic!("count {count}, round {round}: {err}"));
                assert!(is_connected(&tri), "count {count}, round {round}: {points:?}");
                assert!(find_delaunay_violations(&tri, 1e-7).is_empty());
            }
        }
    }

    #[test]
    fn zero_super_scale_still_connects() {
        let store = VertexStore::from_points(&cube_with_center());
        let (tri, stats) = BowyerWatson::with_options(
            TriangulationOptions::default().with_super_scale(0.0),
        )
        .triangulate_with_statistics(&store)
        .unwrap();
        assert!(is_connected(&tri));
        assert!((1..=MAX_SUPER_SCALE_RETRIES + 1).contains(&stats.runs));
    }

    #[test]
    fn rejects_too_few_points() {
        assert_eq!(
            triangulate(&[Point::default(); 3]).unwrap_err(),
            TriangulationError::InsufficientVertices { actual: 3 }
        );
    }

    #[test]
    fn rejects_non_finite_points() {
        let mut points = cube_with_center();
        points[2] = Point::new([0.0, f64::NAN, 0.0]);
        assert!(matches!(
            triangulate(&points),
            Err(TriangulationError::NonFiniteCoordinate { index: 2, .. })
        ));
    }

    #[test]
    fn near_duplicates_are_opt_in() {
        let mut points = cube_with_center();
        points.push(Point::new([0.53, 0.47, 0.52]));
        let store = VertexStore::from_points(&points);

        let strict = BowyerWatson::with_options(
            TriangulationOptions::default().with_reject_near_duplicates(true),
        );
        assert_eq!(
            strict.triangulate(&store).unwrap_err(),
            TriangulationError::NearDuplicate {
                index: 9,
                existing: 8
            }
        );
        assert!(BowyerWatson::new().triangulate(&store).is_ok());
    }

    #[test]
    fn repeated_runs_match() {
        let store = VertexStore::from_points(&cube_with_center());
        let first = BowyerWatson::new().triangulate(&store).unwrap();
        let second = BowyerWatson::new().triangulate(&store).unwrap();
        assert_eq!(first.edge_set(), second.edge_set());
        assert_eq!(first.triangle_set(), second.triangle_set());
    }
}
