//! Undirected edges between triangulation vertices.
//!
//! An [`Edge`] joins two [`VertexKey`]s. It remembers the orientation it was
//! created with (corridors are routed from [`Edge::a`] to [`Edge::b`]), but
//! equality, ordering, and hashing use the canonical endpoint order, so
//! `Edge::new(p, q) == Edge::new(q, p)` and both hash identically.
//!
//! Identity equality compares keys. [`Edge::almost_eq`] is the separate,
//! location-based predicate built on [`Point::approx_eq`].

use crate::core::triangulation_data_structure::{VertexKey, VertexStore, key_order};
use crate::geometry::point::Point;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Undirected edge between two vertices.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::core::edge::Edge;
/// use voxel_dungeon::core::triangulation_data_structure::VertexStore;
/// use voxel_dungeon::geometry::point::Point;
///
/// let store = VertexStore::from_points(&[
///     Point::new([0.0, 0.0, 0.0]),
///     Point::new([3.0, 4.0, 0.0]),
/// ]);
/// let (p, q) = (store.keys()[0], store.keys()[1]);
///
/// let edge = Edge::new(p, q);
/// assert_eq!(edge, Edge::new(q, p));
/// assert_eq!(edge.length(&store), Some(5.0));
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Edge {
    a: VertexKey,
    b: VertexKey,
}

impl Edge {
    /// Creates an edge from `a` to `b`.
    #[inline]
    #[must_use]
    pub const fn new(a: VertexKey, b: VertexKey) -> Self {
        Self { a, b }
    }

    /// First endpoint, as given at construction.
    #[inline]
    #[must_use]
    pub const fn a(&self) -> VertexKey {
        self.a
    }

    /// Second endpoint, as given at construction.
    #[inline]
    #[must_use]
    pub const fn b(&self) -> VertexKey {
        self.b
    }

    /// Endpoints in canonical order.
    #[inline]
    #[must_use]
    pub fn canonical(&self) -> (VertexKey, VertexKey) {
        if key_order(self.a, self.b) == Ordering::Greater {
            (self.b, self.a)
        } else {
            (self.a, self.b)
        }
    }

    /// The same edge traversed the other way.
    #[inline]
    #[must_use]
    pub const fn reversed(&self) -> Self {
        Self::new(self.b, self.a)
    }

    /// Returns `true` if `key` is one of the endpoints.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: VertexKey) -> bool {
        self.a == key || self.b == key
    }

    /// Resolves both endpoints.
    #[must_use]
    pub fn points(&self, store: &VertexStore) -> Option<[Point; 2]> {
        store.resolve(&[self.a, self.b])
    }

    /// Euclidean length, or `None` if an endpoint is missing from `store`.
    #[must_use]
    pub fn length(&self, store: &VertexStore) -> Option<f64> {
        self.points(store).map(|[p, q]| p.distance(&q))
    }

    /// Location-based equality: the endpoints pairwise approximately coincide,
    /// in either orientation.
    ///
    /// Returns `false` if any endpoint is missing from `store`.
    #[must_use]
    pub fn almost_eq(&self, other: &Self, store: &VertexStore) -> bool {
        let (Some([p1, p2]), Some([q1, q2])) = (self.points(store), other.points(store)) else {
            return false;
        };
        (p1.approx_eq(&q1) && p2.approx_eq(&q2)) || (p1.approx_eq(&q2) && p2.approx_eq(&q1))
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a0, a1) = self.canonical();
        let (b0, b1) = other.canonical();
        key_order(a0, b0).then_with(|| key_order(a1, b1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collections::FastHashSet;

    fn store() -> VertexStore {
        VertexStore::from_points(&[
            Point::new([0.0, 0.0, 0.0]),
            Point::new([1.0, 0.0, 0.0]),
            Point::new([0.05, 0.0, 0.0]),
            Point::new([1.0, 0.05, 0.0]),
        ])
    }

    #[test]
    fn equality_and_hash_ignore_orientation() {
        let store = store();
        let k = store.keys();
        let forward = Edge::new(k[0], k[1]);
        let backward = Edge::new(k[1], k[0]);
        assert_eq!(forward, backward);
        assert_eq!(forward.cmp(&backward), Ordering::Equal);

        let mut set = FastHashSet::default();
        set.insert(forward);
        assert!(!set.insert(backward));
        assert_eq!(backward.a(), k[1]);
    }

    #[test]
    fn identity_differs_from_location() {
        let store = store();
        let k = store.keys();
        let e1 = Edge::new(k[0], k[1]);
        let e2 = Edge::new(k[3], k[2]);
        assert_ne!(e1, e2);
        assert!(e1.almost_eq(&e2, &store));
        assert!(!e1.almost_eq(&Edge::new(k[0], k[2]), &store));
    }

    #[test]
    fn contains_and_reverse() {
        let store = store();
        let k = store.keys();
        let e = Edge::new(k[0], k[1]);
        assert!(e.contains(k[0]) && e.contains(k[1]) && !e.contains(k[2]));
        assert_eq!(e.reversed().a(), k[1]);
        assert_eq!(e.length(&store), Some(1.0));
    }
}
