//! The finished, read-only result of a 3D Delaunay triangulation.
//!
//! A [`Triangulation`] owns a copy of the input vertices plus the surviving
//! tetrahedra, and the edges and triangles derived from them. Shared edges and
//! faces between adjacent tetrahedra appear once, in order of first appearance.

use crate::core::collections::{FastHashSet, fast_hash_set_with_capacity};
use crate::core::edge::Edge;
use crate::core::tetrahedron::Tetrahedron;
use crate::core::triangle::Triangle;
use crate::core::triangulation_data_structure::{VertexKey, VertexStore};
use crate::geometry::point::Point;
use serde::{Deserialize, Serialize};

/// Vertices, edges, triangles, and tetrahedra of a finished triangulation.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::core::algorithms::bowyer_watson::triangulate;
/// use voxel_dungeon::geometry::point::Point;
///
/// let tri = triangulate(&[
///     Point::new([0.0, 0.0, 0.0]),
///     Point::new([1.0, 0.0, 0.0]),
///     Point::new([0.0, 1.0, 0.0]),
///     Point::new([0.0, 0.0, 1.0]),
/// ])
/// .unwrap();
///
/// assert_eq!(tri.number_of_vertices(), 4);
/// assert_eq!(tri.tetrahedra().len(), 1);
/// assert_eq!(tri.triangles().len(), 4);
/// assert_eq!(tri.edges().len(), 6);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Triangulation {
    vertices: VertexStore,
    edges: Vec<Edge>,
    triangles: Vec<Triangle>,
    tetrahedra: Vec<Tetrahedron>,
}

impl Triangulation {
    /// Assembles a triangulation from its tetrahedra, deriving edges and triangles.
    pub(crate) fn from_tetrahedra(vertices: VertexStore, tetrahedra: Vec<Tetrahedron>) -> Self {
        let mut seen_edges: FastHashSet<Edge> = fast_hash_set_with_capacity(tetrahedra.len() * 6);
        let mut seen_faces: FastHashSet<Triangle> =
            fast_hash_set_with_capacity(tetrahedra.len() * 4);
        let mut edges = Vec::new();
        let mut triangles = Vec::new();

        for tet in &tetrahedra {
            for edge in tet.edges() {
                if seen_edges.insert(edge) {
                    edges.push(edge);
                }
            }
            for face in tet.faces() {
                if seen_faces.insert(face) {
                    triangles.push(face);
                }
            }
        }

        Self {
            vertices,
            edges,
            triangles,
            tetrahedra,
        }
    }

    /// The vertex store, in input order.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> &VertexStore {
        &self.vertices
    }

    /// Unique edges.
    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Unique triangular faces.
    #[inline]
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Tetrahedra.
    #[inline]
    #[must_use]
    pub fn tetrahedra(&self) -> &[Tetrahedron] {
        &self.tetrahedra
    }

    /// Number of input vertices.
    #[inline]
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Point stored under `key`.
    #[inline]
    #[must_use]
    pub fn point(&self, key: VertexKey) -> Option<&Point> {
        self.vertices.point(key)
    }

    /// Edges as an unordered set.
    #[must_use]
    pub fn edge_set(&self) -> FastHashSet<Edge> {
        self.edges.iter().copied().collect()
    }

    /// Triangles as an unordered set.
    #[must_use]
    pub fn triangle_set(&self) -> FastHashSet<Triangle> {
        self.triangles.iter().copied().collect()
    }

    /// Edges as pairs of input indices `(i, j)` with `i < j`, sorted.
    ///
    /// Unlike [`Triangulation::edge_set`] this can be compared across
    /// triangulations built from different stores.
    #[must_use]
    pub fn edge_index_pairs(&self) -> Vec<(usize, usize)> {
        let index = self.vertices.index_map();
        let mut pairs: Vec<_> = self
            .edges
            .iter()
            .filter_map(|e| {
                let i = *index.get(&e.a())?;
                let j = *index.get(&e.b())?;
                Some((i.min(j), i.max(j)))
            })
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_faces_and_edges_are_deduplicated() {
        // Two tetrahedra glued along face (0, 1, 2).
        let store = VertexStore::from_points(&[
            Point::new([0.0, 0.0, 0.0]),
            Point::new([1.0, 0.0, 0.0]),
            Point::new([0.0, 1.0, 0.0]),
            Point::new([0.2, 0.2, 1.0]),
            Point::new([0.2, 0.2, -1.0]),
        ]);
        let k = store.keys().to_vec();
        let upper = Tetrahedron::new([k[0], k[1], k[2], k[3]], &store).unwrap();
        let lower = Tetrahedron::new([k[2], k[1], k[0], k[4]], &store).unwrap();

        let tri = Triangulation::from_tetrahedra(store, vec![upper, lower]);
        assert_eq!(tri.tetrahedra().len(), 2);
        assert_eq!(tri.triangles().len(), 7);
        assert_eq!(tri.edges().len(), 9);
        assert_eq!(tri.edge_set().len(), 9);
        assert_eq!(tri.triangle_set().len(), 7);
        assert_eq!(tri.edge_index_pairs().first(), Some(&(0, 1)));
    }
}
