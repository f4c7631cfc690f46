//! Collection types used throughout the crate.
//!
//! Hash-based collections use `rustc_hash::FxHasher`, which is fast but not
//! DoS-resistant. Every key hashed here is produced internally (vertex keys,
//! grid coordinates), never supplied by an adversary.

use crate::core::triangulation_data_structure::VertexKey;
use crate::grid::GridPoint;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;

#[cfg(not(feature = "dense-slotmap"))]
use slotmap::SlotMap;

#[cfg(feature = "dense-slotmap")]
use slotmap::DenseSlotMap;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Storage backend for triangulation vertices.
///
/// `DenseSlotMap` under the default `dense-slotmap` feature, `SlotMap` otherwise.
#[cfg(not(feature = "dense-slotmap"))]
pub type StorageMap<K, V> = SlotMap<K, V>;

/// Storage backend for triangulation vertices.
///
/// `DenseSlotMap` under the default `dense-slotmap` feature, `SlotMap` otherwise.
#[cfg(feature = "dense-slotmap")]
pub type StorageMap<K, V> = DenseSlotMap<K, V>;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// `HashMap` using `FxHasher`.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<u64, usize> = FastHashMap::default();
/// map.insert(123, 456);
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// `HashSet` using `FxHasher`.
pub type FastHashSet<T> = FxHashSet<T>;

/// Re-export of the `Entry` API for [`FastHashMap`].
pub use std::collections::hash_map::Entry;

/// Small-optimized `Vec`: inline for up to `N` elements, heap beyond.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<i32, 8> = SmallBuffer::new();
/// buffer.push(42);
/// assert!(!buffer.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

// =============================================================================
// DOMAIN ALIASES
// =============================================================================

/// Set of vertex identities.
pub type VertexKeySet = FastHashSet<VertexKey>;

/// Set of grid coordinates (the pathfinder's "previous set").
pub type GridPointSet = FastHashSet<GridPoint>;

/// Sorted vertex keys of one triangular face, used as a structural map key.
pub type FaceKey = [VertexKey; 3];

/// Buffer sized for the faces produced while carving one cavity.
pub type FaceBuffer<T> = SmallBuffer<T, 32>;

// =============================================================================
// UTILITY FUNCTIONS
// =============================================================================

/// Creates a [`FastHashMap`] with pre-allocated capacity.
#[inline]
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, FxBuildHasher)
}

/// Creates a [`FastHashSet`] with pre-allocated capacity.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::core::collections::fast_hash_set_with_capacity;
///
/// let set = fast_hash_set_with_capacity::<u32>(50);
/// assert!(set.capacity() >= 50);
/// ```
#[inline]
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, FxBuildHasher)
}
