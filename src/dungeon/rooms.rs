//! Room placement.

use crate::dungeon::config::DungeonConfig;
use crate::grid::{CellType, Grid, GridPoint, GridSize};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An axis-aligned box of room cells centred on an integer cell.
///
/// Sizes are odd on every axis, so the room spans `size / 2` cells on each
/// side of its center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    center: GridPoint,
    size: GridSize,
}

impl Room {
    /// Creates a room.
    #[must_use]
    pub const fn new(center: GridPoint, size: GridSize) -> Self {
        Self { center, size }
    }

    /// The center cell, where corridors start and end.
    #[inline]
    #[must_use]
    pub const fn center(&self) -> GridPoint {
        self.center
    }

    /// Extent on each axis.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Lowest corner (inclusive), possibly outside the map.
    #[must_use]
    pub fn min_corner(&self) -> GridPoint {
        self.center - half_extent(self.size)
    }

    /// Highest corner (inclusive), possibly outside the map.
    #[must_use]
    pub fn max_corner(&self) -> GridPoint {
        self.center + half_extent(self.size)
    }

    /// Returns `true` if `cell` lies inside the room's box.
    #[must_use]
    pub fn contains(&self, cell: GridPoint) -> bool {
        let (lo, hi) = (self.min_corner(), self.max_corner());
        (lo.x..=hi.x).contains(&cell.x)
            && (lo.y..=hi.y).contains(&cell.y)
            && (lo.z..=hi.z).contains(&cell.z)
    }

    /// Cells of the room's box that lie inside `grid`.
    pub fn cells<'a, T>(&self, grid: &'a Grid<T>) -> impl Iterator<Item = GridPoint> + 'a {
        box_cells(self.min_corner(), self.max_corner()).filter(|&cell| grid.in_bounds(cell))
    }
}

fn half_extent(size: GridSize) -> GridPoint {
    GridPoint::new((size.x / 2) as i32, (size.y / 2) as i32, (size.z / 2) as i32)
}

/// Every cell of the inclusive box `[lo, hi]`, X fastest.
fn box_cells(lo: GridPoint, hi: GridPoint) -> impl Iterator<Item = GridPoint> {
    (lo.y..=hi.y).flat_map(move |y| {
        (lo.z..=hi.z).flat_map(move |z| (lo.x..=hi.x).map(move |x| GridPoint::new(x, y, z)))
    })
}

/// Draws a room size in `[min, max)` per axis, made odd by rounding even
/// sizes down. Equal bounds give that size.
pub fn random_room_size<R: Rng>(min: GridSize, max: GridSize, rng: &mut R) -> GridSize {
    let mut axis = |lo: u32, hi: u32| {
        let size = if lo < hi { rng.random_range(lo..hi) } else { lo };
        if size % 2 == 0 { size.saturating_sub(1).max(1) } else { size }
    };
    GridSize::new(
        axis(min.x, max.x),
        axis(min.y, max.y),
        axis(min.z, max.z),
    )
}

/// Places rooms on `grid` and marks their cells as [`CellType::Room`].
///
/// Candidate positions are visited in `generating_step` strides, Y outermost
/// and X innermost. At each one a room is attempted with probability
/// `room_spawn_chance`; it is kept if its box, grown by one cell on every side
/// and clipped to the map, is entirely empty. Rooms therefore never overlap
/// or touch.
pub fn place_rooms<R: Rng>(config: &DungeonConfig, grid: &mut Grid<CellType>, rng: &mut R) -> Vec<Room> {
    let map = config.map_size;
    let step = config.generating_step;
    let mut rooms = Vec::new();

    for y in (0..map.y).step_by(step.y as usize) {
        for z in (0..map.z).step_by(step.z as usize) {
            for x in (0..map.x).step_by(step.x as usize) {
                if !rng.random_bool(config.room_spawn_chance) {
                    continue;
                }
                let size = random_room_size(config.min_room_size, config.max_room_size, rng);
                let room = Room::new(GridPoint::new(x as i32, y as i32, z as i32), size);

                if is_area_empty(grid, &room) {
                    for cell in room.cells(grid).collect::<Vec<_>>() {
                        grid[cell] = CellType::Room;
                    }
                    tracing::trace!(center = %room.center(), size = %room.size(), "Placed room");
                    rooms.push(room);
                }
            }
        }
    }

    tracing::debug!(rooms = rooms.len(), "Room placement complete");
    rooms
}

fn is_area_empty(grid: &Grid<CellType>, room: &Room) -> bool {
    let margin = GridPoint::new(1, 1, 1);
    box_cells(room.min_corner() - margin, room.max_corner() + margin)
        .filter_map(|cell| grid.get(cell))
        .all(|&cell| cell == CellType::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::config::DungeonConfigBuilder;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn room_sizes_are_odd_and_bounded() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let size = random_room_size(GridSize::new(2, 1, 3), GridSize::new(9, 2, 8), &mut rng);
            for (axis, lo, hi) in [(size.x, 1, 9), (size.y, 1, 2), (size.z, 3, 8)] {
                assert_eq!(axis % 2, 1);
                assert!(axis >= lo && axis < hi, "{axis} not in [{lo}, {hi})");
            }
        }
        assert_eq!(
            random_room_size(GridSize::new(4, 5, 5), GridSize::new(4, 5, 5), &mut rng),
            GridSize::new(3, 5, 5)
        );
    }

    #[test]
    fn room_box_and_clipping() {
        let grid: Grid<CellType> = Grid::new(GridSize::new(4, 4, 4), GridPoint::ZERO).unwrap();
        let room = Room::new(GridPoint::new(0, 1, 0), GridSize::new(3, 1, 5));
        assert_eq!(room.min_corner(), GridPoint::new(-1, 1, -2));
        assert_eq!(room.max_corner(), GridPoint::new(1, 1, 2));
        assert!(room.contains(GridPoint::new(-1, 1, 2)));
        assert!(!room.contains(GridPoint::new(0, 0, 0)));
        // x in 0..=1, z in 0..=2 survive clipping.
        assert_eq!(room.cells(&grid).count(), 6);
    }

    #[test]
    fn placed_rooms_are_disjoint_and_painted() {
        let config = DungeonConfigBuilder::default()
            .map_size(GridSize::new(30, 6, 30))
            .generating_step(GridSize::new(3, 3, 3))
            .room_spawn_chance(0.5)
            .build()
            .unwrap();
        let mut grid = Grid::new(config.map_size, GridPoint::ZERO).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let rooms = place_rooms(&config, &mut grid, &mut rng);
        assert!(!rooms.is_empty());

        for (i, a) in rooms.iter().enumerate() {
            assert_eq!(grid[a.center()], CellType::Room);
            for b in &rooms[i + 1..] {
                assert!(a.cells(&grid).all(|cell| !b.contains(cell)));
            }
        }
        let painted = grid.iter().filter(|(_, c)| **c == CellType::Room).count();
        let expected: usize = rooms.iter().map(|r| r.cells(&grid).count()).sum();
        assert_eq!(painted, expected);
    }
}
