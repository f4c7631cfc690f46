//! Minimum spanning trees over triangulation edges.
//!
//! [`minimum_spanning_tree`] runs Prim's algorithm on a dense `V × V` weight
//! matrix indexed by each vertex's position in the triangulation's vertex
//! list. Vertex counts here are room counts, so the quadratic matrix is small.
//! Weights are Euclidean edge lengths; pairs without a triangulation edge have
//! no entry.
//!
//! A disconnected edge set is reported as [`SpanningTreeError::Disconnected`]
//! instead of producing a partial tree.

use crate::core::collections::FastHashSet;
use crate::core::edge::Edge;
use crate::core::triangulation::Triangulation;
use ordered_float::OrderedFloat;
use rand::Rng;
use thiserror::Error;

/// Errors from spanning tree construction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SpanningTreeError {
    /// The triangulation has no vertices.
    #[error("Cannot build a spanning tree over an empty graph")]
    EmptyGraph,
    /// Some vertices cannot be reached from vertex 0.
    #[error("Graph is disconnected: reached {reached} of {total} vertices")]
    Disconnected {
        /// Vertices in the tree when the frontier ran dry.
        reached: usize,
        /// Total vertices.
        total: usize,
    },
}

/// Builds a minimum spanning tree over the triangulation's edges with Prim's
/// algorithm, starting from vertex 0.
///
/// Each returned edge is oriented from the vertex already in the tree to the
/// vertex it adds, in the order vertices join.
///
/// # Errors
///
/// Returns [`SpanningTreeError::EmptyGraph`] for a triangulation with no
/// vertices and [`SpanningTreeError::Disconnected`] if the edges do not span
/// every vertex.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::core::algorithms::bowyer_watson::triangulate;
/// use voxel_dungeon::core::algorithms::spanning_tree::minimum_spanning_tree;
/// use voxel_dungeon::geometry::point::Point;
///
/// let tri = triangulate(&[
///     Point::new([0.0, 0.0, 0.0]),
///     Point::new([10.0, 0.0, 0.0]),
///     Point::new([0.0, 1.0, 0.0]),
///     Point::new([0.0, 0.0, 1.0]),
/// ])
/// .unwrap();
///
/// let tree = minimum_spanning_tree(&tri).unwrap();
/// assert_eq!(tree.len(), 3);
/// ```
pub fn minimum_spanning_tree(triangulation: &Triangulation) -> Result<Vec<Edge>, SpanningTreeError> {
    let store = triangulation.vertices();
    let keys = store.keys();
    let n = keys.len();
    if n == 0 {
        return Err(SpanningTreeError::EmptyGraph);
    }

    let index = store.index_map();
    let mut weights: Vec<Option<f64>> = vec![None; n * n];
    for edge in triangulation.edges() {
        let (Some(&i), Some(&j), Some(length)) =
            (index.get(&edge.a()), index.get(&edge.b()), edge.length(store))
        else {
            continue;
        };
        weights[i * n + j] = Some(length);
        weights[j * n + i] = Some(length);
    }

    let mut built = vec![false; n];
    built[0] = true;
    let mut reached = 1;
    let mut tree = Vec::with_capacity(n - 1);

    while reached < n {
        // Cheapest edge crossing the frontier (built -> not built).
        let next = (0..n)
            .filter(|&i| built[i])
            .flat_map(|i| (0..n).filter(|&j| !built[j]).map(move |j| (i, j)))
            .filter_map(|(i, j)| weights[i * n + j].map(|w| (OrderedFloat(w), i, j)))
            .min();

        let Some((_, from, to)) = next else {
            tracing::warn!(reached, total = n, "Spanning tree frontier is empty");
            return Err(SpanningTreeError::Disconnected { reached, total: n });
        };

        built[to] = true;
        reached += 1;
        tree.push(Edge::new(keys[from], keys[to]));
    }

    tracing::debug!(vertices = n, edges = tree.len(), "Built minimum spanning tree");
    Ok(tree)
}

/// Picks triangulation edges to add on top of `tree`.
///
/// Each triangulation edge is drawn with probability `chance`; a drawn edge
/// is kept when neither orientation is already selected. One random draw is
/// made per triangulation edge, in edge order, whether or not it is kept.
///
/// # Examples
///
/// ```rust
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use voxel_dungeon::core::algorithms::bowyer_watson::triangulate;
/// use voxel_dungeon::core::algorithms::spanning_tree::{minimum_spanning_tree, select_extra_edges};
/// use voxel_dungeon::geometry::point::Point;
///
/// let tri = triangulate(&[
///     Point::new([0.0, 0.0, 0.0]),
///     Point::new([1.0, 0.0, 0.0]),
///     Point::new([0.0, 1.0, 0.0]),
///     Point::new([0.0, 0.0, 1.0]),
/// ])
/// .unwrap();
/// let tree = minimum_spanning_tree(&tri).unwrap();
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let all = select_extra_edges(&tri, &tree, 1.0, &mut rng);
/// assert_eq!(all.len(), tri.edges().len());
/// ```
pub fn select_extra_edges<R: Rng>(
    triangulation: &Triangulation,
    tree: &[Edge],
    chance: f64,
    rng: &mut R,
) -> Vec<Edge> {
    let mut selected: Vec<Edge> = tree.to_vec();
    let mut seen: FastHashSet<Edge> = tree.iter().copied().collect();
    for &edge in triangulation.edges() {
        if rng.random::<f64>() < chance && seen.insert(edge) {
            selected.push(edge);
        }
    }
    tracing::debug!(
        tree = tree.len(),
        extra = selected.len() - tree.len(),
        "Selected corridor edges"
    );
    selected
}

/// Total Euclidean length of `edges` in `triangulation`'s vertex store.
#[must_use]
pub fn total_length(triangulation: &Triangulation, edges: &[Edge]) -> f64 {
    edges
        .iter()
        .filter_map(|e| e.length(triangulation.vertices()))
        .sum()
}
