//! Best-first search over a voxel grid with flat moves and staircases.
//!
//! A [`Pathfinder`] owns one [`Node`] per grid cell and reuses them across
//! calls; [`Pathfinder::find_path`] resets every node before searching.
//!
//! # Movement
//!
//! From any cell the search tries the 12 [`NEIGHBOR_OFFSETS`]: 4 unit moves
//! along ±X and ±Z, and 8 staircase moves `(±3, ±1, 0)` and `(0, ±1, ±3)`
//! that climb or descend one level over a 3-cell ramp. Which moves are legal
//! and what they cost is decided entirely by the caller's cost function.
//!
//! # Self-intersection
//!
//! Each node carries the set of cells consumed by the best path reaching it
//! (its "previous set"), including the 4 cells of every staircase on that
//! path. A move into a cell of the previous set is skipped, and so is a
//! staircase whose [`StairFootprint`] touches it. Returned paths therefore
//! never revisit a cell or cut through their own ramps.
//!
//! # Ordering
//!
//! The open queue is keyed by accumulated cost alone. Cost functions fold
//! their own distance-to-goal term into each step. Decrease-key is lazy: an
//! improved node is pushed again and stale queue entries are skipped on pop.

#![forbid(unsafe_code)]

use crate::core::collections::GridPointSet;
use crate::grid::{Grid, GridError, GridPoint, GridSize};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// The 12 candidate moves from a cell: 4 flat, then 8 staircases.
pub const NEIGHBOR_OFFSETS: [GridPoint; 12] = [
    GridPoint::new(1, 0, 0),
    GridPoint::new(-1, 0, 0),
    GridPoint::new(0, 0, 1),
    GridPoint::new(0, 0, -1),
    GridPoint::new(3, 1, 0),
    GridPoint::new(-3, 1, 0),
    GridPoint::new(0, 1, 3),
    GridPoint::new(0, 1, -3),
    GridPoint::new(3, -1, 0),
    GridPoint::new(-3, -1, 0),
    GridPoint::new(0, -1, 3),
    GridPoint::new(0, -1, -3),
];

/// Result of a cost function for one candidate move.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathCost {
    /// Cost added to the path by taking the move.
    pub cost: f64,
    /// Whether the move may be taken at all.
    pub traversable: bool,
    /// Whether the move is a staircase occupying a [`StairFootprint`].
    pub is_stairs: bool,
}

impl PathCost {
    /// A move that may not be taken.
    pub const BLOCKED: Self = Self {
        cost: 0.0,
        traversable: false,
        is_stairs: false,
    };

    /// A traversable flat move.
    #[must_use]
    pub const fn flat(cost: f64) -> Self {
        Self {
            cost,
            traversable: true,
            is_stairs: false,
        }
    }

    /// A traversable staircase move.
    #[must_use]
    pub const fn stairs(cost: f64) -> Self {
        Self {
            cost,
            traversable: true,
            is_stairs: true,
        }
    }
}

/// The 4 cells a staircase move occupies besides its endpoints.
///
/// For a move from `from` by `delta`, with horizontal direction `h` (the sign
/// of `delta` on X and Z) and vertical offset `v = (0, delta.y, 0)`, the
/// cells are `from + h`, `from + 2h`, `from + v + h`, and `from + v + 2h`.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::grid::GridPoint;
/// use voxel_dungeon::pathfinding::StairFootprint;
///
/// let footprint = StairFootprint::new(GridPoint::new(0, 0, 0), GridPoint::new(3, 1, 0));
/// assert_eq!(
///     footprint.cells(),
///     &[
///         GridPoint::new(1, 0, 0),
///         GridPoint::new(2, 0, 0),
///         GridPoint::new(1, 1, 0),
///         GridPoint::new(2, 1, 0),
///     ]
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StairFootprint {
    cells: [GridPoint; 4],
}

impl StairFootprint {
    /// Footprint of the move from `from` by `delta`.
    #[must_use]
    pub fn new(from: GridPoint, delta: GridPoint) -> Self {
        let horizontal = GridPoint::new(delta.x, 0, delta.z).signum();
        let vertical = GridPoint::new(0, delta.y, 0);
        Self {
            cells: [
                from + horizontal,
                from + horizontal * 2,
                from + vertical + horizontal,
                from + vertical + horizontal * 2,
            ],
        }
    }

    /// Footprint of the move from `from` to `to`.
    #[must_use]
    pub fn between(from: GridPoint, to: GridPoint) -> Self {
        Self::new(from, to - from)
    }

    /// The occupied cells.
    #[inline]
    #[must_use]
    pub const fn cells(&self) -> &[GridPoint; 4] {
        &self.cells
    }
}

/// Per-cell search state.
#[derive(Clone, Debug)]
pub struct Node {
    position: GridPoint,
    previous: Option<GridPoint>,
    previous_set: GridPointSet,
    cost: f64,
}

impl Node {
    fn new(position: GridPoint) -> Self {
        Self {
            position,
            previous: None,
            previous_set: GridPointSet::default(),
            cost: f64::INFINITY,
        }
    }

    fn reset(&mut self) {
        self.previous = None;
        self.previous_set.clear();
        self.cost = f64::INFINITY;
    }

    /// The cell this node stands for.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> GridPoint {
        self.position
    }

    /// Predecessor on the best known path, if any.
    #[inline]
    #[must_use]
    pub const fn previous(&self) -> Option<GridPoint> {
        self.previous
    }

    /// Cells consumed by the best known path to this node.
    #[inline]
    #[must_use]
    pub const fn previous_set(&self) -> &GridPointSet {
        &self.previous_set
    }

    /// Best known accumulated cost (`+∞` until reached).
    #[inline]
    #[must_use]
    pub const fn cost(&self) -> f64 {
        self.cost
    }
}

type QueueEntry = Reverse<(OrderedFloat<f64>, GridPoint)>;

/// Grid search with a caller-supplied cost function.
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::grid::{GridPoint, GridSize};
/// use voxel_dungeon::pathfinding::{PathCost, Pathfinder};
///
/// let mut pathfinder = Pathfinder::new(GridSize::new(8, 1, 8)).unwrap();
/// let path = pathfinder
///     .find_path(GridPoint::new(0, 0, 0), GridPoint::new(5, 0, 0), |a, b| {
///         if a.position().y == b.position().y {
///             PathCost::flat(1.0)
///         } else {
///             PathCost::BLOCKED
///         }
///     })
///     .unwrap();
///
/// assert_eq!(path.len(), 6);
/// assert_eq!(path.first(), Some(&GridPoint::new(0, 0, 0)));
/// assert_eq!(path.last(), Some(&GridPoint::new(5, 0, 0)));
/// ```
#[derive(Clone, Debug)]
pub struct Pathfinder {
    nodes: Grid<Node>,
    closed: Vec<bool>,
    queue: BinaryHeap<QueueEntry>,
}

impl Pathfinder {
    /// Creates a pathfinder covering a grid of `size` at offset zero.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSize`] for an empty or oversized grid.
    pub fn new(size: GridSize) -> Result<Self, GridError> {
        let nodes = Grid::from_fn(size, GridPoint::ZERO, Node::new)?;
        let cells = nodes.size().volume().unwrap_or_default();
        Ok(Self {
            nodes,
            closed: vec![false; cells],
            queue: BinaryHeap::new(),
        })
    }

    /// The searchable extent.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.nodes.size()
    }

    /// Search state of `position` from the most recent run.
    #[must_use]
    pub fn node(&self, position: GridPoint) -> Option<&Node> {
        self.nodes.get(position)
    }

    fn reset(&mut self) {
        for node in self.nodes.values_mut() {
            node.reset();
        }
        self.closed.fill(false);
        self.queue.clear();
    }

    /// Finds a path from `start` to `end`, both inclusive.
    ///
    /// `cost_fn(current, candidate)` is called for every candidate move that
    /// is in bounds, not yet closed, and outside the current node's previous
    /// set. Returns `None` when `end` cannot be reached or either endpoint is
    /// out of bounds.
    pub fn find_path<F>(&mut self, start: GridPoint, end: GridPoint, mut cost_fn: F) -> Option<Vec<GridPoint>>
    where
        F: FnMut(&Node, &Node) -> PathCost,
    {
        self.reset();
        if !self.nodes.in_bounds(start) || !self.nodes.in_bounds(end) {
            tracing::debug!(%start, %end, size = %self.nodes.size(), "Path endpoint out of bounds");
            return None;
        }

        self.nodes[start].cost = 0.0;
        self.queue.push(Reverse((OrderedFloat(0.0), start)));

        while let Some(Reverse((OrderedFloat(cost), position))) = self.queue.pop() {
            let index = self.nodes.index_of(position)?;
            if self.closed[index] || cost > self.nodes[position].cost {
                continue;
            }
            self.closed[index] = true;

            if position == end {
                return Some(self.reconstruct_path(end));
            }

            for offset in NEIGHBOR_OFFSETS {
                self.relax(position, offset, &mut cost_fn);
            }
        }

        tracing::debug!(
            %start,
            %end,
            closed = self.closed.iter().filter(|&&c| c).count(),
            "No path found"
        );
        None
    }

    fn relax<F>(&mut self, position: GridPoint, offset: GridPoint, cost_fn: &mut F)
    where
        F: FnMut(&Node, &Node) -> PathCost,
    {
        let next = position + offset;
        let Some(next_index) = self.nodes.index_of(next) else {
            return;
        };
        if self.closed[next_index] {
            return;
        }

        let current = &self.nodes[position];
        if current.previous_set.contains(&next) {
            return;
        }
        let neighbor = &self.nodes[next];

        let step = cost_fn(current, neighbor);
        if !step.traversable {
            return;
        }

        let footprint = if step.is_stairs {
            let footprint = StairFootprint::new(position, offset);
            if footprint
                .cells()
                .iter()
                .any(|cell| current.previous_set.contains(cell))
            {
                return;
            }
            Some(footprint)
        } else {
            None
        };

        let new_cost = current.cost + step.cost;
        if new_cost >= neighbor.cost {
            return;
        }

        let mut previous_set = current.previous_set.clone();
        previous_set.insert(position);
        if let Some(footprint) = footprint {
            previous_set.extend(footprint.cells().iter().copied());
        }

        let neighbor = &mut self.nodes[next];
        neighbor.cost = new_cost;
        neighbor.previous = Some(position);
        neighbor.previous_set = previous_set;
        self.queue.push(Reverse((OrderedFloat(new_cost), next)));
    }

    fn reconstruct_path(&self, end: GridPoint) -> Vec<GridPoint> {
        let mut path = vec![end];
        let mut current = end;
        while let Some(previous) = self.nodes.get(current).and_then(Node::previous) {
            path.push(previous);
            current = previous;
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_only(a: &Node, b: &Node) -> PathCost {
        if a.position().y == b.position().y {
            PathCost::flat(1.0)
        } else {
            PathCost::BLOCKED
        }
    }

    #[test]
    fn straight_flat_path() {
        let mut pathfinder = Pathfinder::new(GridSize::new(6, 1, 1)).unwrap();
        let end = GridPoint::new(5, 0, 0);
        let path = pathfinder
            .find_path(GridPoint::ZERO, end, flat_only)
            .unwrap();

        let expected: Vec<_> = (0..6).map(|x| GridPoint::new(x, 0, 0)).collect();
        assert_eq!(path, expected);
        assert_relative_eq!(pathfinder.node(end).unwrap().cost(), 5.0);
    }

    #[test]
    fn start_equals_end() {
        let mut pathfinder = Pathfinder::new(GridSize::new(3, 3, 3)).unwrap();
        let p = GridPoint::new(1, 1, 1);
        assert_eq!(pathfinder.find_path(p, p, flat_only), Some(vec![p]));
    }

    #[test]
    fn everything_blocked() {
        let mut pathfinder = Pathfinder::new(GridSize::new(5, 3, 5)).unwrap();
        let mut calls = 0;
        let path = pathfinder.find_path(GridPoint::ZERO, GridPoint::new(4, 0, 4), |_, _| {
            calls += 1;
            PathCost::BLOCKED
        });
        assert_eq!(path, None);
        // Only the start node is ever expanded: 2 flat moves stay in bounds,
        // plus (3, 1, 0) and (0, 1, 3).
        assert_eq!(calls, 4);
    }

    #[test]
    fn endpoints_out_of_bounds() {
        let mut pathfinder = Pathfinder::new(GridSize::new(2, 1, 2)).unwrap();
        assert_eq!(
            pathfinder.find_path(GridPoint::new(-1, 0, 0), GridPoint::ZERO, flat_only),
            None
        );
        assert_eq!(
            pathfinder.find_path(GridPoint::ZERO, GridPoint::new(0, 0, 2), flat_only),
            None
        );
    }

    #[test]
    fn cheaper_detour_wins() {
        // Cells with x == 2 on the direct row are expensive.
        let mut pathfinder = Pathfinder::new(GridSize::new(5, 1, 3)).unwrap();
        let path = pathfinder
            .find_path(GridPoint::new(0, 0, 1), GridPoint::new(4, 0, 1), |a, b| {
                if a.position().y != b.position().y {
                    PathCost::BLOCKED
                } else if b.position() == GridPoint::new(2, 0, 1) {
                    PathCost::flat(10.0)
                } else {
                    PathCost::flat(1.0)
                }
            })
            .unwrap();
        assert!(!path.contains(&GridPoint::new(2, 0, 1)));
        assert_eq!(path.len(), 7);
    }

    #[test]
    fn reset_between_runs() {
        let mut pathfinder = Pathfinder::new(GridSize::new(4, 1, 1)).unwrap();
        let first = pathfinder.find_path(GridPoint::ZERO, GridPoint::new(3, 0, 0), flat_only);
        let second = pathfinder.find_path(GridPoint::ZERO, GridPoint::new(3, 0, 0), flat_only);
        assert_eq!(first, second);
        assert!(pathfinder.node(GridPoint::new(3, 0, 0)).unwrap().previous().is_some());
    }

    #[test]
    fn stair_footprint_descending_along_z() {
        let footprint = StairFootprint::between(GridPoint::new(0, 2, 5), GridPoint::new(0, 1, 2));
        assert_eq!(
            footprint.cells(),
            &[
                GridPoint::new(0, 2, 4),
                GridPoint::new(0, 2, 3),
                GridPoint::new(0, 1, 4),
                GridPoint::new(0, 1, 3),
            ]
        );
    }

    /// Flat steps priced by `flat`, every climb costs 1.
    fn cheap_steps(flat: impl Fn(GridPoint, GridPoint) -> f64) -> impl FnMut(&Node, &Node) -> PathCost {
        move |a: &Node, b: &Node| {
            let (a, b) = (a.position(), b.position());
            if a.y == b.y {
                PathCost::flat(flat(a, b))
            } else {
                PathCost::stairs(1.0)
            }
        }
    }

    /// No cell repeats and no cell lies on the ramp of any staircase in the path.
    fn assert_self_avoiding(path: &[GridPoint]) {
        let visited: GridPointSet = path.iter().copied().collect();
        assert_eq!(visited.len(), path.len(), "repeated cell in {path:?}");
        for pair in path.windows(2) {
            if pair[0].y == pair[1].y {
                continue;
            }
            let footprint = StairFootprint::between(pair[0], pair[1]);
            for cell in footprint.cells() {
                assert!(
                    !visited.contains(cell),
                    "{cell} lies on the staircase {} -> {} in {path:?}",
                    pair[0],
                    pair[1]
                );
            }
        }
    }

    #[test]
    fn corridor_does_not_walk_back_over_its_own_ramp() {
        // The cheapest row on the upper level runs over the ramp just climbed,
        // so the path has to take the dearer row beside it.
        let mut pathfinder = Pathfinder::new(GridSize::new(4, 2, 3)).unwrap();
        let start = GridPoint::new(0, 0, 1);
        let end = GridPoint::new(1, 1, 0);
        let path = pathfinder
            .find_path(
                start,
                end,
                cheap_steps(|_, b| match (b.y, b.z) {
                    (0, _) => 10.0,
                    (_, 1) => 0.1,
                    _ => 1.0,
                }),
            )
            .unwrap();

        assert_self_avoiding(&path);
        assert_eq!(
            path,
            vec![
                start,
                GridPoint::new(3, 1, 1),
                GridPoint::new(3, 1, 0),
                GridPoint::new(2, 1, 0),
                end,
            ]
        );
        assert_relative_eq!(pathfinder.node(end).unwrap().cost(), 4.0);
    }

    #[test]
    fn staircase_does_not_cross_cells_already_walked() {
        // Walking the cheap row to its end and climbing back over it would cost
        // 1.4; the ramp would cover two cells of that row.
        let mut pathfinder = Pathfinder::new(GridSize::new(5, 2, 2)).unwrap();
        let end = GridPoint::new(1, 1, 0);
        let path = pathfinder
            .find_path(GridPoint::ZERO, end, |a, b| {
                let (a, b) = (a.position(), b.position());
                if a.y != b.y {
                    PathCost::stairs(if a == GridPoint::ZERO { 10.0 } else { 1.0 })
                } else if b.y == 0 && b.z == 0 {
                    PathCost::flat(0.1)
                } else {
                    PathCost::flat(1.0)
                }
            })
            .unwrap();

        assert_self_avoiding(&path);
        assert_eq!(
            path,
            vec![
                GridPoint::ZERO,
                GridPoint::new(1, 0, 0),
                GridPoint::new(2, 0, 0),
                GridPoint::new(3, 0, 0),
                GridPoint::new(4, 0, 0),
                GridPoint::new(4, 0, 1),
                GridPoint::new(1, 1, 1),
                end,
            ]
        );
        assert_relative_eq!(pathfinder.node(end).unwrap().cost(), 3.4, epsilon = 1e-9);
    }

    #[test]
    fn no_path_when_every_climb_overlaps_itself() {
        // One cell deep: every staircase that reaches `end` either covers `end`
        // or crosses the row walked to reach its foot.
        let mut pathfinder = Pathfinder::new(GridSize::new(5, 2, 1)).unwrap();
        let path = pathfinder.find_path(
            GridPoint::ZERO,
            GridPoint::new(1, 1, 0),
            cheap_steps(|_, _| 1.0),
        );
        assert_eq!(path, None);
    }
}
