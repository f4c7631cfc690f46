//! End-to-end dungeon layout generation.
//!
//! [`DungeonGenerator::generate`] runs the whole pipeline on a fresh grid:
//!
//! 1. place rooms ([`place_rooms`]);
//! 2. triangulate the (jittered) room centers;
//! 3. reduce the triangulation to a minimum spanning tree and add back a
//!    random share of the remaining edges;
//! 4. route every selected edge through the grid with one [`Pathfinder`],
//!    strictly in sequence, painting corridors and staircases as it goes so
//!    later routes see earlier ones.

use crate::core::algorithms::bowyer_watson::{BowyerWatson, TriangulationError};
use crate::core::algorithms::spanning_tree::{SpanningTreeError, minimum_spanning_tree, select_extra_edges};
use crate::core::collections::FastHashMap;
use crate::core::edge::Edge;
use crate::core::triangulation_data_structure::{VertexKey, VertexStore};
use crate::dungeon::config::{CorridorCosts, DungeonConfig};
use crate::dungeon::rooms::{Room, place_rooms};
use crate::geometry::point::Point;
use crate::grid::{CellType, Grid, GridError, GridPoint};
use crate::pathfinding::{PathCost, Pathfinder, StairFootprint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from dungeon generation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DungeonError {
    /// The configuration violates a constraint.
    #[error("Invalid dungeon configuration: {0}")]
    Config(String),
    /// Too few rooms were placed to triangulate their centers.
    #[error("Placed {found} rooms; at least 4 are required")]
    TooFewRooms {
        /// Rooms actually placed.
        found: usize,
    },
    /// The map could not be allocated.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Triangulating room centers failed.
    #[error("Failed to triangulate room centers: {0}")]
    Triangulation(#[from] TriangulationError),
    /// The triangulation did not connect every room.
    #[error("Failed to connect rooms: {0}")]
    SpanningTree(#[from] SpanningTreeError),
}

/// A pair of rooms joined by a corridor, by index into [`DungeonLayout::rooms`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorridorEdge {
    /// Room the corridor starts in.
    pub from_room: usize,
    /// Room the corridor ends in.
    pub to_room: usize,
}

/// A routed corridor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorridorPath {
    /// Room the corridor starts in.
    pub from_room: usize,
    /// Room the corridor ends in.
    pub to_room: usize,
    /// Cells from the start room's center to the end room's center, inclusive.
    pub cells: Vec<GridPoint>,
    /// Staircases along the path, in path order.
    pub stairs: Vec<StairFootprint>,
}

/// Everything produced by one generation run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DungeonLayout {
    /// Cell contents of the whole map.
    pub grid: Grid<CellType>,
    /// Placed rooms.
    pub rooms: Vec<Room>,
    /// Room pairs selected for corridors (tree edges first).
    pub corridor_edges: Vec<CorridorEdge>,
    /// Successfully routed corridors.
    pub corridors: Vec<CorridorPath>,
    /// Selected room pairs for which no route was found.
    pub unrouted: Vec<CorridorEdge>,
}

/// Generates dungeon layouts from a [`DungeonConfig`].
///
/// # Examples
///
/// ```rust
/// use voxel_dungeon::dungeon::config::DungeonConfigBuilder;
/// use voxel_dungeon::dungeon::generator::{DungeonError, DungeonGenerator};
/// use voxel_dungeon::grid::GridSize;
///
/// let config = DungeonConfigBuilder::default()
///     .map_size(GridSize::new(24, 8, 24))
///     .room_spawn_chance(0.5)
///     .seed(Some(1))
///     .build()
///     .unwrap();
/// match DungeonGenerator::new(config).unwrap().generate() {
///     Ok(layout) => assert!(layout.rooms.len() >= 4),
///     Err(DungeonError::TooFewRooms { found }) => assert!(found < 4),
///     Err(other) => panic!("{other}"),
/// }
/// ```
#[derive(Clone, Debug)]
pub struct DungeonGenerator {
    config: DungeonConfig,
}

impl DungeonGenerator {
    /// Creates a generator.
    ///
    /// # Errors
    ///
    /// Returns [`DungeonError::Config`] if `config` fails validation.
    pub fn new(config: DungeonConfig) -> Result<Self, DungeonError> {
        config.validate().map_err(DungeonError::Config)?;
        Ok(Self { config })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &DungeonConfig {
        &self.config
    }

    /// Runs the full pipeline.
    ///
    /// With a fixed [`DungeonConfig::seed`] the output is deterministic.
    ///
    /// # Errors
    ///
    /// - [`DungeonError::TooFewRooms`] if fewer than 4 rooms fit.
    /// - [`DungeonError::Triangulation`] or [`DungeonError::SpanningTree`] if
    ///   the room centers cannot be connected.
    pub fn generate(&self) -> Result<DungeonLayout, DungeonError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut grid = Grid::new(self.config.map_size, GridPoint::ZERO)?;
        let rooms = place_rooms(&self.config, &mut grid, &mut rng);
        if rooms.len() < 4 {
            return Err(DungeonError::TooFewRooms { found: rooms.len() });
        }

        let corridor_edges = self.select_corridors(&rooms, &mut rng)?;

        let mut pathfinder = Pathfinder::new(self.config.map_size)?;
        let mut corridors = Vec::with_capacity(corridor_edges.len());
        let mut unrouted = Vec::new();

        for &edge in &corridor_edges {
            let start = rooms[edge.from_room].center();
            let end = rooms[edge.to_room].center();
            let path = pathfinder.find_path(start, end, |a, b| {
                corridor_cost(&grid, &self.config.costs, a.position(), b.position(), end)
            });

            match path {
                Some(cells) => {
                    let stairs = paint_path(&mut grid, &cells);
                    corridors.push(CorridorPath {
                        from_room: edge.from_room,
                        to_room: edge.to_room,
                        cells,
                        stairs,
                    });
                }
                None => {
                    tracing::warn!(
                        from_room = edge.from_room,
                        to_room = edge.to_room,
                        %start,
                        %end,
                        "No corridor route found; skipping"
                    );
                    unrouted.push(edge);
                }
            }
        }

        tracing::debug!(
            rooms = rooms.len(),
            corridors = corridors.len(),
            unrouted = unrouted.len(),
            "Dungeon generated"
        );

        Ok(DungeonLayout {
            grid,
            rooms,
            corridor_edges,
            corridors,
            unrouted,
        })
    }

    /// Triangulates room centers and picks the room pairs to connect.
    fn select_corridors(&self, rooms: &[Room], rng: &mut StdRng) -> Result<Vec<CorridorEdge>, DungeonError> {
        let jitter = self.config.jitter;
        let points: Vec<Point> = rooms
            .iter()
            .map(|room| {
                let c = room.center();
                let mut offset = || if jitter > 0.0 { rng.random_range(-jitter..=jitter) } else { 0.0 };
                Point::new([
                    f64::from(c.x) + offset(),
                    f64::from(c.y) + offset(),
                    f64::from(c.z) + offset(),
                ])
            })
            .collect();

        let store = VertexStore::from_points(&points);
        let triangulation = BowyerWatson::with_options(self.config.triangulation).triangulate(&store)?;
        let tree = minimum_spanning_tree(&triangulation)?;
        let selected = select_extra_edges(&triangulation, &tree, self.config.corridor_chance, rng);

        let room_of: FastHashMap<VertexKey, usize> = store.index_map();
        Ok(selected
            .iter()
            .filter_map(|edge: &Edge| {
                Some(CorridorEdge {
                    from_room: *room_of.get(&edge.a())?,
                    to_room: *room_of.get(&edge.b())?,
                })
            })
            .collect())
    }
}

/// Cost of moving from `a` to `b` while routing a corridor towards `end`.
///
/// Flat moves cost the distance from `b` to `end` plus the cost of the cell
/// entered; staircase cells cannot be entered. A vertical move is a
/// staircase: both endpoints must be empty or corridor, the cells next to `a`
/// must be on the map, and the whole [`StairFootprint`] must be empty.
#[must_use]
pub fn corridor_cost(
    grid: &Grid<CellType>,
    costs: &CorridorCosts,
    a: GridPoint,
    b: GridPoint,
    end: GridPoint,
) -> PathCost {
    let delta = b - a;
    let heuristic = b.distance(end);

    if delta.y == 0 {
        let cell_cost = match grid.get(b) {
            None | Some(CellType::Stairs) => return PathCost::BLOCKED,
            Some(CellType::Room) => costs.room,
            Some(CellType::Empty) => costs.empty,
            Some(CellType::Corridor) => costs.corridor,
        };
        return PathCost::flat(heuristic + cell_cost);
    }

    let walkable = |p: GridPoint| matches!(grid.get(p), Some(CellType::Empty | CellType::Corridor));
    if !walkable(a) || !walkable(b) {
        return PathCost::BLOCKED;
    }

    let vertical = GridPoint::new(0, delta.y, 0);
    let horizontal = GridPoint::new(delta.x, 0, delta.z).signum();
    if !grid.in_bounds(a + vertical)
        || !grid.in_bounds(a + horizontal)
        || !grid.in_bounds(a + vertical + horizontal)
    {
        return PathCost::BLOCKED;
    }

    let footprint_clear = StairFootprint::new(a, delta)
        .cells()
        .iter()
        .all(|&cell| grid.get(cell) == Some(&CellType::Empty));
    if !footprint_clear {
        return PathCost::BLOCKED;
    }

    PathCost::stairs(costs.stairs + heuristic)
}

/// Paints a routed path: empty cells become corridor, and the footprint of
/// every vertical step becomes stairs. Returns the staircases in path order.
pub fn paint_path(grid: &mut Grid<CellType>, path: &[GridPoint]) -> Vec<StairFootprint> {
    let mut stairs = Vec::new();
    for (i, &cell) in path.iter().enumerate() {
        if let Some(slot) = grid.get_mut(cell).filter(|slot| **slot == CellType::Empty) {
            *slot = CellType::Corridor;
        }

        let Some(&previous) = i.checked_sub(1).and_then(|p| path.get(p)) else {
            continue;
        };
        if cell.y == previous.y {
            continue;
        }
        let footprint = StairFootprint::between(previous, cell);
        for &step in footprint.cells() {
            if let Some(slot) = grid.get_mut(step) {
                *slot = CellType::Stairs;
            }
        }
        stairs.push(footprint);
    }
    stairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSize;

    fn empty_grid(x: u32, y: u32, z: u32) -> Grid<CellType> {
        Grid::new(GridSize::new(x, y, z), GridPoint::ZERO).unwrap()
    }

    #[test]
    fn flat_costs_follow_cell_type() {
        let mut grid = empty_grid(4, 1, 1);
        let costs = CorridorCosts::default();
        let end = GridPoint::new(3, 0, 0);
        let (a, b) = (GridPoint::new(0, 0, 0), GridPoint::new(1, 0, 0));

        assert_eq!(corridor_cost(&grid, &costs, a, b, end), PathCost::flat(2.0 + 1.0));
        grid[b] = CellType::Room;
        assert_eq!(corridor_cost(&grid, &costs, a, b, end), PathCost::flat(2.0 + 5.0));
        grid[b] = CellType::Corridor;
        assert_eq!(corridor_cost(&grid, &costs, a, b, end), PathCost::flat(2.0));
        grid[b] = CellType::Stairs;
        assert!(!corridor_cost(&grid, &costs, a, b, end).traversable);
    }

    #[test]
    fn stairs_need_clear_footprint() {
        let mut grid = empty_grid(5, 2, 1);
        let costs = CorridorCosts::default();
        let (a, b) = (GridPoint::new(0, 0, 0), GridPoint::new(3, 1, 0));

        let cost = corridor_cost(&grid, &costs, a, b, b);
        assert!(cost.traversable && cost.is_stairs);
        assert!((cost.cost - 100.0).abs() < 1e-12);

        grid[GridPoint::new(2, 1, 0)] = CellType::Corridor;
        assert!(!corridor_cost(&grid, &costs, a, b, b).traversable);

        grid[GridPoint::new(2, 1, 0)] = CellType::Empty;
        grid[a] = CellType::Room;
        assert!(!corridor_cost(&grid, &costs, a, b, b).traversable);
    }

    #[test]
    fn painting_marks_corridors_and_stairs() {
        let mut grid = empty_grid(6, 2, 1);
        grid[GridPoint::new(0, 0, 0)] = CellType::Room;
        let path = [
            GridPoint::new(0, 0, 0),
            GridPoint::new(1, 0, 0),
            GridPoint::new(4, 1, 0),
            GridPoint::new(5, 1, 0),
        ];
        let stairs = paint_path(&mut grid, &path);

        assert_eq!(stairs, vec![StairFootprint::between(path[1], path[2])]);
        assert_eq!(grid[path[0]], CellType::Room);
        assert_eq!(grid[path[1]], CellType::Corridor);
        assert_eq!(grid[path[3]], CellType::Corridor);
        for &cell in stairs[0].cells() {
            assert_eq!(grid[cell], CellType::Stairs);
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = DungeonConfig {
            corridor_chance: -0.1,
            ..DungeonConfig::default()
        };
        assert!(matches!(DungeonGenerator::new(config), Err(DungeonError::Config(_))));
    }

    #[test]
    fn tiny_map_has_too_few_rooms() {
        let config = DungeonConfig {
            map_size: GridSize::new(4, 1, 4),
            generating_step: GridSize::new(4, 1, 4),
            seed: Some(5),
            ..DungeonConfig::default()
        };
        let result = DungeonGenerator::new(config).unwrap().generate();
        assert!(matches!(result, Err(DungeonError::TooFewRooms { found }) if found <= 1));
    }
}
