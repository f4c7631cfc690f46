//! Tetrahedra with cached circumspheres.
//!
//! The circumsphere is computed once, at construction, from the vertex store
//! the tetrahedron is built against, so construction fails for coplanar
//! corners instead of yielding a NaN sphere.

use crate::core::edge::Edge;
use crate::core::triangle::{SimplexError, Triangle, require_distinct, resolve_all};
use crate::core::triangulation_data_structure::{VertexKey, VertexStore, sorted_keys};
use crate::geometry::point::Point;
use crate::geometry::util::circumsphere::Circumsphere;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Corner index pairs of the 6 edges of a tetrahedron.
const EDGE_INDICES: [(usize, usize); 6] = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];

/// Corner indices of the 4 faces of a tetrahedron; face `i` omits corner `3 - i`.
const FACE_INDICES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];

/// A tetrahedron on four distinct vertices.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::core::tetrahedron::Tetrahedron;
/// use voxel_dungeon::core::triangulation_data_structure::VertexStore;
/// use voxel_dungeon::geometry::point::Point;
///
/// let store = VertexStore::from_points(&[
///     Point::new([0.0, 0.0, 0.0]),
///     Point::new([1.0, 0.0, 0.0]),
///     Point::new([0.0, 1.0, 0.0]),
///     Point::new([0.0, 0.0, 1.0]),
/// ]);
/// let k = store.keys();
/// let tet = Tetrahedron::new([k[0], k[1], k[2], k[3]], &store).unwrap();
///
/// assert!(tet.circumsphere_contains(&Point::new([0.25, 0.25, 0.25])));
/// assert_eq!(tet.faces().len(), 4);
/// assert_eq!(tet.edges().len(), 6);
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Tetrahedron {
    vertices: [VertexKey; 4],
    circumsphere: Circumsphere,
}

impl Tetrahedron {
    /// Creates a tetrahedron and caches its circumsphere.
    ///
    /// # Errors
    ///
    /// - [`SimplexError::DuplicateVertices`] if a key repeats.
    /// - [`SimplexError::VertexKeyNotFound`] if a key is not in `store`.
    /// - [`SimplexError::Degenerate`] if the corners are coplanar.
    pub fn new(vertices: [VertexKey; 4], store: &VertexStore) -> Result<Self, SimplexError> {
        require_distinct(&vertices)?;
        let points = resolve_all(&vertices, store)?;
        let circumsphere = Circumsphere::of_tetrahedron(&points)?;
        Ok(Self {
            vertices,
            circumsphere,
        })
    }

    /// Corner keys in construction order.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> &[VertexKey; 4] {
        &self.vertices
    }

    /// The cached circumsphere.
    #[inline]
    #[must_use]
    pub const fn circumsphere(&self) -> &Circumsphere {
        &self.circumsphere
    }

    /// Returns `true` if `point` lies inside or on the circumsphere.
    #[inline]
    #[must_use]
    pub fn circumsphere_contains(&self, point: &Point) -> bool {
        self.circumsphere.contains(point)
    }

    /// Returns `true` if `key` is a corner.
    #[inline]
    #[must_use]
    pub fn contains_vertex(&self, key: VertexKey) -> bool {
        self.vertices.contains(&key)
    }

    /// Returns `true` if any corner is one of `keys`.
    #[must_use]
    pub fn contains_any_vertex(&self, keys: &[VertexKey]) -> bool {
        self.vertices.iter().any(|k| keys.contains(k))
    }

    /// The 4 triangular faces.
    #[must_use]
    pub fn faces(&self) -> [Triangle; 4] {
        let v = &self.vertices;
        // Corners are distinct by construction, so faces need no re-validation.
        FACE_INDICES.map(|[i, j, k]| Triangle::from_distinct([v[i], v[j], v[k]]))
    }

    /// The 6 edges.
    #[must_use]
    pub fn edges(&self) -> [Edge; 6] {
        EDGE_INDICES.map(|(i, j)| Edge::new(self.vertices[i], self.vertices[j]))
    }

    /// Location-based equality: every corner of `self` approximately coincides
    /// with some corner of `other`.
    #[must_use]
    pub fn almost_eq(&self, other: &Self, store: &VertexStore) -> bool {
        match (
            resolve_all(&self.vertices, store),
            resolve_all(&other.vertices, store),
        ) {
            (Ok(ours), Ok(theirs)) => ours
                .iter()
                .all(|p| theirs.iter().any(|q| p.approx_eq(q))),
            _ => false,
        }
    }
}

impl PartialEq for Tetrahedron {
    fn eq(&self, other: &Self) -> bool {
        sorted_keys(self.vertices) == sorted_keys(other.vertices)
    }
}

impl Eq for Tetrahedron {}

impl Hash for Tetrahedron {
    fn hash<H: Hasher>(&self, state: &mut H) {
        sorted_keys(self.vertices).hash(state);
    }
}
