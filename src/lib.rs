//! # voxel-dungeon
//!
//! This is a library for laying out 3D dungeons on a voxel grid. Rooms are
//! scattered over the map, their centers are connected by a
//! [Delaunay triangulation](https://en.wikipedia.org/wiki/Delaunay_triangulation),
//! the triangulation is thinned to a
//! [minimum spanning tree](https://en.wikipedia.org/wiki/Minimum_spanning_tree)
//! plus a few random extra edges, and every remaining edge is routed through
//! the grid as a corridor that may climb or descend via staircases.
//!
//! # Features
//!
//! - 3D Bowyer–Watson triangulation with key-based vertex identity
//! - Prim's minimum spanning tree over the triangulation graph
//! - Grid pathfinding with flat moves, 3-cell staircases, and
//!   self-intersection avoidance
//! - Seeded, reproducible generation
//! - Serialization/Deserialization with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! Triangulate a point set and connect it:
//!
//! ```rust
//! use voxel_dungeon::prelude::*;
//!
//! let points = [
//!     Point::new([0.0, 0.0, 0.0]),
//!     Point::new([4.0, 0.2, 0.1]),
//!     Point::new([0.3, 4.0, 0.2]),
//!     Point::new([0.1, 0.4, 4.0]),
//!     Point::new([3.1, 2.9, 3.2]),
//! ];
//!
//! let tri = triangulate(&points).unwrap();
//! assert_eq!(tri.number_of_vertices(), 5);
//! assert!(find_delaunay_violations(&tri, 1e-9).is_empty());
//!
//! let tree = minimum_spanning_tree(&tri).unwrap();
//! assert_eq!(tree.len(), 4);
//! ```
//!
//! Generate a whole dungeon:
//!
//! ```rust
//! use voxel_dungeon::prelude::*;
//!
//! let config = DungeonConfigBuilder::default()
//!     .map_size(GridSize::new(24, 8, 24))
//!     .seed(Some(2024))
//!     .room_spawn_chance(0.4)
//!     .build()
//!     .unwrap();
//!
//! if let Ok(layout) = DungeonGenerator::new(config).unwrap().generate() {
//!     for corridor in &layout.corridors {
//!         assert_eq!(corridor.cells.first(), Some(&layout.rooms[corridor.from_room].center()));
//!         assert_eq!(corridor.cells.last(), Some(&layout.rooms[corridor.to_room].center()));
//!     }
//! }
//! ```
//!
//! # Invariants
//!
//! - **Empty circumsphere** – no input point lies strictly inside the
//!   circumsphere of any output tetrahedron (up to floating-point tolerance),
//!   checked by [`find_delaunay_violations`](core::util::delaunay_validation::find_delaunay_violations).
//! - **No super vertices** – the bounding super-tetrahedron never leaks into
//!   the output.
//! - **Spanning tree** – for `n` connected vertices the tree has exactly
//!   `n - 1` edges and minimal total length.
//! - **Self-avoiding corridors** – a routed path never revisits a cell or
//!   crosses one of its own staircases.
//!
//! # Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber.
//! Applications and tests choose their own, for example
//! `tracing_subscriber::fmt().with_env_filter("voxel_dungeon=debug").init()`.

#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// Triangulation data structures and the graph algorithms built on them.
///
/// Points are identified by [`VertexKey`](core::triangulation_data_structure::VertexKey)
/// handles into a [`VertexStore`](core::triangulation_data_structure::VertexStore);
/// edges, triangles, and tetrahedra refer to vertices only through these keys.
pub mod core {
    /// Triangulation and graph algorithms
    pub mod algorithms {
        /// Incremental Bowyer–Watson triangulation in 3D
        pub mod bowyer_watson;
        /// Minimum spanning tree and extra-edge selection
        pub mod spanning_tree;
    }
    /// High-performance collection types
    pub mod collections;
    pub mod edge;
    pub mod tetrahedron;
    pub mod triangle;
    pub mod triangulation;
    pub mod triangulation_data_structure;
    pub mod util;
    // Re-export the `core` modules.
    pub use algorithms::{bowyer_watson::*, spanning_tree::*};
    pub use edge::*;
    pub use tetrahedron::*;
    pub use triangle::*;
    pub use triangulation::*;
    pub use triangulation_data_structure::*;
    pub use util::*;
    // Note: collections module not re-exported here to avoid namespace pollution
}

/// Contains the `Point` type, small fixed-size linear algebra, and circumsphere
/// computation.
pub mod geometry {
    pub mod matrix;
    pub mod point;
    /// Geometric utility functions
    pub mod util;
    pub use matrix::*;
    pub use point::*;
    pub use util::*;
}

/// Integer voxel grids and their coordinates.
pub mod grid;

/// Best-first grid search with staircase moves.
pub mod pathfinding;

/// Room placement and the end-to-end generation pipeline.
pub mod dungeon {
    pub mod config;
    pub mod generator;
    pub mod rooms;
    pub use config::*;
    pub use generator::*;
    pub use rooms::*;
}

/// A prelude module that re-exports commonly used types.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    // Re-export from core
    pub use crate::core::{
        algorithms::{bowyer_watson::*, spanning_tree::*},
        edge::*,
        tetrahedron::*,
        triangle::*,
        triangulation::*,
        triangulation_data_structure::*,
        util::*,
    };

    // Re-export commonly used collection types from core::collections
    pub use crate::core::collections::{
        FastHashMap, FastHashSet, GridPointSet, SmallBuffer, VertexKeySet,
        fast_hash_map_with_capacity, fast_hash_set_with_capacity,
    };

    // Re-export from geometry
    pub use crate::geometry::{matrix::*, point::*, util::*};

    pub use crate::dungeon::{config::*, generator::*, rooms::*};
    pub use crate::grid::*;
    pub use crate::pathfinding::*;
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
