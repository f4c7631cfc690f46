//! Triangles and the errors shared by all simplex constructors.
//!
//! A [`Triangle`] keeps its three corner keys in construction order. Equality
//! and hashing use the sorted keys, so every permutation of the same three
//! vertices is the same triangle.

use crate::core::collections::FaceKey;
use crate::core::triangulation_data_structure::{VertexKey, VertexStore, sorted_keys};
use crate::geometry::point::Point;
use crate::geometry::util::circumsphere::{Circumsphere, CircumsphereError};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors from constructing triangles and tetrahedra.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::core::triangle::{SimplexError, Triangle};
/// use voxel_dungeon::core::triangulation_data_structure::VertexStore;
/// use voxel_dungeon::geometry::point::Point;
///
/// let store = VertexStore::from_points(&[Point::default(); 2]);
/// let (a, b) = (store.keys()[0], store.keys()[1]);
/// assert!(matches!(
///     Triangle::new([a, b, a]),
///     Err(SimplexError::DuplicateVertices { .. })
/// ));
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SimplexError {
    /// The same vertex was given more than once.
    #[error("Simplex requires {expected} distinct vertices, got {distinct}")]
    DuplicateVertices {
        /// Number of vertices required.
        expected: usize,
        /// Number of distinct vertices supplied.
        distinct: usize,
    },
    /// A vertex key is not present in the vertex store.
    #[error("Vertex key {key:?} not found in vertex store")]
    VertexKeyNotFound {
        /// The missing key.
        key: VertexKey,
    },
    /// The vertices are coplanar (tetrahedron) or collinear (triangle).
    #[error("Degenerate simplex: {source}")]
    Degenerate {
        /// The underlying circumsphere failure.
        #[from]
        source: CircumsphereError,
    },
}

/// Checks that `keys` are pairwise distinct.
pub(crate) fn require_distinct<const N: usize>(keys: &[VertexKey; N]) -> Result<(), SimplexError> {
    let sorted = sorted_keys(*keys);
    let distinct = 1 + sorted.windows(2).filter(|w| w[0] != w[1]).count();
    if distinct == N {
        Ok(())
    } else {
        Err(SimplexError::DuplicateVertices {
            expected: N,
            distinct,
        })
    }
}

/// Resolves `keys`, naming the first missing one on failure.
pub(crate) fn resolve_all<const N: usize>(
    keys: &[VertexKey; N],
    store: &VertexStore,
) -> Result<[Point; N], SimplexError> {
    store.resolve(keys).ok_or_else(|| {
        let key = keys
            .iter()
            .copied()
            .find(|&k| !store.contains_key(k))
            .unwrap_or(keys[0]);
        SimplexError::VertexKeyNotFound { key }
    })
}

/// A triangle on three distinct vertices.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::core::triangle::Triangle;
/// use voxel_dungeon::core::triangulation_data_structure::VertexStore;
/// use voxel_dungeon::geometry::point::Point;
///
/// let store = VertexStore::from_points(&[
///     Point::new([0.0, 0.0, 0.0]),
///     Point::new([4.0, 0.0, 0.0]),
///     Point::new([0.0, 3.0, 0.0]),
/// ]);
/// let [a, b, c] = [store.keys()[0], store.keys()[1], store.keys()[2]];
///
/// let t = Triangle::new([a, b, c]).unwrap();
/// assert_eq!(t, Triangle::new([c, a, b]).unwrap());
/// assert!((t.circumsphere(&store).unwrap().radius() - 2.5).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Triangle {
    vertices: [VertexKey; 3],
}

impl Triangle {
    /// Creates a triangle.
    ///
    /// # Errors
    ///
    /// Returns [`SimplexError::DuplicateVertices`] unless all three keys differ.
    pub fn new(vertices: [VertexKey; 3]) -> Result<Self, SimplexError> {
        require_distinct(&vertices)?;
        Ok(Self { vertices })
    }

    /// Creates a triangle from keys already known to be distinct.
    pub(crate) const fn from_distinct(vertices: [VertexKey; 3]) -> Self {
        Self { vertices }
    }

    /// Corner keys in construction order.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> &[VertexKey; 3] {
        &self.vertices
    }

    /// Sorted corner keys; equal for every permutation of the same corners.
    #[inline]
    #[must_use]
    pub fn face_key(&self) -> FaceKey {
        sorted_keys(self.vertices)
    }

    /// Returns `true` if `key` is a corner.
    #[inline]
    #[must_use]
    pub fn contains_vertex(&self, key: VertexKey) -> bool {
        self.vertices.contains(&key)
    }

    /// Resolves the corners.
    ///
    /// # Errors
    ///
    /// Returns [`SimplexError::VertexKeyNotFound`] if a corner is not in `store`.
    pub fn points(&self, store: &VertexStore) -> Result<[Point; 3], SimplexError> {
        resolve_all(&self.vertices, store)
    }

    /// Circle through the three corners, as a sphere centred in the triangle's plane.
    ///
    /// # Errors
    ///
    /// Returns [`SimplexError::Degenerate`] for collinear corners and
    /// [`SimplexError::VertexKeyNotFound`] for missing ones.
    pub fn circumsphere(&self, store: &VertexStore) -> Result<Circumsphere, SimplexError> {
        Ok(Circumsphere::of_triangle(&self.points(store)?)?)
    }

    /// Location-based equality: every corner of `self` approximately coincides
    /// with some corner of `other`.
    ///
    /// Returns `false` if any corner is missing from `store`.
    #[must_use]
    pub fn almost_eq(&self, other: &Self, store: &VertexStore) -> bool {
        match (self.points(store), other.points(store)) {
            (Ok(ours), Ok(theirs)) => ours
                .iter()
                .all(|p| theirs.iter().any(|q| p.approx_eq(q))),
            _ => false,
        }
    }
}

impl PartialEq for Triangle {
    fn eq(&self, other: &Self) -> bool {
        self.face_key() == other.face_key()
    }
}

impl Eq for Triangle {}

impl Hash for Triangle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.face_key().hash(state);
    }
}
