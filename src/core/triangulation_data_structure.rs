//! Vertex storage for triangulations.
//!
//! A [`VertexStore`] owns the input points of a triangulation. Each point is
//! stored under a [`VertexKey`], and the key, not the coordinates, is the
//! point's identity: two stored points at the same location are still two
//! distinct vertices. Every simplex in the crate refers to its corners by key.
//!
//! # Examples
//!
//! ```rust
//! use voxel_dungeon::core::triangulation_data_structure::VertexStore;
//! use voxel_dungeon::geometry::point::Point;
//!
//! let mut store = VertexStore::new();
//! let a = store.insert(Point::new([1.0, 2.0, 3.0]));
//! let b = store.insert(Point::new([1.0, 2.0, 3.0]));
//!
//! assert_ne!(a, b);
//! assert_eq!(store.point(a), store.point(b));
//! assert_eq!(store.index_of(b), Some(1));
//! ```

#![forbid(unsafe_code)]

use crate::core::collections::{FastHashMap, StorageMap, fast_hash_map_with_capacity};
use crate::geometry::point::Point;
use serde::{Deserialize, Serialize};
use slotmap::{Key, new_key_type};
use std::cmp::Ordering;

// =============================================================================
// KEY TYPES
// =============================================================================

new_key_type! {
    /// Identity of a vertex in a [`VertexStore`].
    ///
    /// Keys are stable for the lifetime of the store: removing one vertex
    /// never changes the key of another.
    pub struct VertexKey;
}

/// Total order on keys that is stable across clones of the same store.
///
/// Used to canonicalize simplices (sorted corner keys) so that equality and
/// hashing are orientation-independent.
#[inline]
#[must_use]
pub fn key_order(a: VertexKey, b: VertexKey) -> Ordering {
    a.data().as_ffi().cmp(&b.data().as_ffi())
}

/// Sorts a fixed-size array of keys with [`key_order`].
#[inline]
#[must_use]
pub fn sorted_keys<const N: usize>(mut keys: [VertexKey; N]) -> [VertexKey; N] {
    keys.sort_unstable_by(|a, b| key_order(*a, *b));
    keys
}

// =============================================================================
// VERTEX STORE
// =============================================================================

/// Keyed point storage that remembers insertion order.
///
/// Insertion order matters: the triangulation inserts points in this order,
/// and the spanning tree indexes its weight matrix by it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VertexStore {
    points: StorageMap<VertexKey, Point>,
    order: Vec<VertexKey>,
}

impl VertexStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `points`, keyed in the given order.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Self {
        let mut store = Self {
            points: StorageMap::with_capacity_and_key(points.len()),
            order: Vec::with_capacity(points.len()),
        };
        for &point in points {
            store.insert(point);
        }
        store
    }

    /// Stores `point` as a new vertex and returns its key.
    pub fn insert(&mut self, point: Point) -> VertexKey {
        let key = self.points.insert(point);
        self.order.push(key);
        key
    }

    /// Removes a vertex, returning its point.
    pub fn remove(&mut self, key: VertexKey) -> Option<Point> {
        let point = self.points.remove(key)?;
        self.order.retain(|&k| k != key);
        Some(point)
    }

    /// Looks up the point stored under `key`.
    #[inline]
    #[must_use]
    pub fn point(&self, key: VertexKey) -> Option<&Point> {
        self.points.get(key)
    }

    /// Returns `true` if `key` refers to a stored vertex.
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: VertexKey) -> bool {
        self.points.contains_key(key)
    }

    /// Keys in insertion order.
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[VertexKey] {
        &self.order
    }

    /// `(key, point)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexKey, &Point)> {
        self.order
            .iter()
            .filter_map(|&key| self.points.get(key).map(|p| (key, p)))
    }

    /// Position of `key` in insertion order.
    #[must_use]
    pub fn index_of(&self, key: VertexKey) -> Option<usize> {
        self.order.iter().position(|&k| k == key)
    }

    /// Map from key to insertion index, for repeated lookups.
    #[must_use]
    pub fn index_map(&self) -> FastHashMap<VertexKey, usize> {
        let mut map = fast_hash_map_with_capacity(self.order.len());
        for (i, &key) in self.order.iter().enumerate() {
            map.insert(key, i);
        }
        map
    }

    /// Resolves several keys at once.
    ///
    /// Returns `None` if any key is missing.
    #[must_use]
    pub fn resolve<const N: usize>(&self, keys: &[VertexKey; N]) -> Option<[Point; N]> {
        let mut out = [Point::default(); N];
        for (slot, &key) in out.iter_mut().zip(keys) {
            *slot = *self.points.get(key)?;
        }
        Some(out)
    }

    /// Number of stored vertices.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the store holds no vertices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_identity_not_location() {
        let mut store = VertexStore::new();
        let p = Point::new([0.0, 0.0, 0.0]);
        let a = store.insert(p);
        let b = store.insert(p);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.keys(), &[a, b]);
    }

    #[test]
    fn remove_keeps_other_keys_and_order() {
        let mut store = VertexStore::from_points(&[
            Point::new([0.0, 0.0, 0.0]),
            Point::new([1.0, 0.0, 0.0]),
            Point::new([2.0, 0.0, 0.0]),
        ]);
        let [a, b, c] = [store.keys()[0], store.keys()[1], store.keys()[2]];

        assert_eq!(store.remove(b), Some(Point::new([1.0, 0.0, 0.0])));
        assert_eq!(store.remove(b), None);
        assert_eq!(store.keys(), &[a, c]);
        assert_eq!(store.index_of(c), Some(1));
        assert_eq!(store.point(c), Some(&Point::new([2.0, 0.0, 0.0])));
        assert!(!store.contains_key(b));
    }

    #[test]
    fn resolve_fails_on_missing_key() {
        let mut store = VertexStore::from_points(&[
            Point::new([0.0, 0.0, 0.0]),
            Point::new([1.0, 0.0, 0.0]),
        ]);
        let [a, b] = [store.keys()[0], store.keys()[1]];
        assert!(store.resolve(&[a, b]).is_some());
        store.remove(a);
        assert!(store.resolve(&[a, b]).is_none());
    }

    #[test]
    fn sorted_keys_is_permutation_invariant() {
        let store = VertexStore::from_points(&[Point::default(); 3]);
        let [a, b, c] = [store.keys()[0], store.keys()[1], store.keys()[2]];
        assert_eq!(sorted_keys([a, b, c]), sorted_keys([c, a, b]));
        assert_eq!(sorted_keys([b, c, a]), sorted_keys([a, c, b]));
    }

    #[test]
    fn index_map_matches_insertion_order() {
        let store = VertexStore::from_points(&[Point::default(); 4]);
        let map = store.index_map();
        for (i, key) in store.keys().iter().enumerate() {
            assert_eq!(map[key], i);
        }
    }
}
