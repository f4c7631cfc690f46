//! Delaunay empty-circumsphere property validation utilities.

#![forbid(unsafe_code)]

use crate::core::collections::{FastHashMap, FastHashSet, VertexKeySet};
use crate::core::triangulation::Triangulation;
use crate::core::triangulation_data_structure::VertexKey;
use serde::Serialize;

/// A tetrahedron whose circumsphere strictly contains another input vertex.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DelaunayViolation {
    /// Index of the offending tetrahedron in [`Triangulation::tetrahedra`].
    pub tetrahedron: usize,
    /// The vertex found inside its circumsphere.
    pub vertex: VertexKey,
    /// How far inside the sphere the vertex lies.
    pub depth: f64,
}

/// Finds every tetrahedron whose circumsphere contains a non-corner vertex.
///
/// A vertex counts as inside when it lies more than `tolerance` within the
/// sphere, so cospherical vertices are not reported.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::core::algorithms::bowyer_watson::triangulate;
/// use voxel_dungeon::core::util::delaunay_validation::find_delaunay_violations;
/// use voxel_dungeon::geometry::point::Point;
///
/// let tri = triangulate(&[
///     Point::new([0.0, 0.0, 0.0]),
///     Point::new([1.0, 0.1, 0.0]),
///     Point::new([0.1, 1.0, 0.2]),
///     Point::new([0.0, 0.2, 1.0]),
///     Point::new([0.4, 0.3, 0.35]),
/// ])
/// .unwrap();
/// assert!(find_delaunay_violations(&tri, 1e-9).is_empty());
/// ```
#[must_use]
pub fn find_delaunay_violations(
    triangulation: &Triangulation,
    tolerance: f64,
) -> Vec<DelaunayViolation> {
    let mut violations = Vec::new();

    for (index, tet) in triangulation.tetrahedra().iter().enumerate() {
        let sphere = tet.circumsphere();
        for (key, point) in triangulation.vertices().iter() {
            if tet.contains_vertex(key) || !sphere.strictly_contains(point, tolerance) {
                continue;
            }
            let depth = sphere.radius() - sphere.center().distance(point);
            tracing::debug!(
                tetrahedron = index,
                vertex = ?key,
                depth,
                "Delaunay violation"
            );
            violations.push(DelaunayViolation {
                tetrahedron: index,
                vertex: key,
                depth,
            });
        }
    }

    if !violations.is_empty() {
        tracing::warn!(
            count = violations.len(),
            tetrahedra = triangulation.tetrahedra().len(),
            "Triangulation violates the empty-circumsphere property"
        );
    }
    violations
}

/// Returns `true` if the triangulation's edges connect all of its vertices.
///
/// An empty triangulation counts as connected.
#[must_use]
pub fn is_connected(triangulation: &Triangulation) -> bool {
    let keys = triangulation.vertices().keys();
    let Some(&start) = keys.first() else {
        return true;
    };

    let mut adjacency: FastHashMap<VertexKey, Vec<VertexKey>> = FastHashMap::default();
    for edge in triangulation.edges() {
        adjacency.entry(edge.a()).or_default().push(edge.b());
        adjacency.entry(edge.b()).or_default().push(edge.a());
    }

    let mut visited: VertexKeySet = FastHashSet::default();
    visited.insert(start);
    let mut stack = vec![start];
    while let Some(key) = stack.pop() {
        for &next in adjacency.get(&key).into_iter().flatten() {
            if visited.insert(next) {
                stack.push(next);
            }
        }
    }

    let connected = keys.iter().all(|k| visited.contains(k));
    if !connected {
        tracing::debug!(
            visited = visited.len(),
            total = keys.len(),
            "Triangulation graph is disconnected"
        );
    }
    connected
}
