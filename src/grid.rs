//! Dense voxel grids.
//!
//! A [`Grid`] stores one value per integer cell of a box of [`GridSize`],
//! addressed by [`GridPoint`]. Every lookup first adds the grid's offset, so a
//! grid with offset `O` covers exactly the coordinates `c` with
//! `0 <= c + O < size` on every axis. The flat storage index of a shifted
//! coordinate `p` is `p.x + size.x * p.y + size.x * size.y * p.z`.
//!
//! Nothing is clamped or wrapped. [`Grid::get`] returns `None` outside the
//! box, and the `Index` operators panic like slice indexing does.
//!
//! # Examples
//!
//! ```rust
//! use voxel_dungeon::grid::{CellType, Grid, GridPoint, GridSize};
//!
//! let mut grid: Grid<CellType> =
//!     Grid::new(GridSize::new(4, 2, 4), GridPoint::new(1, 0, 1)).unwrap();
//!
//! assert!(grid.in_bounds(GridPoint::new(-1, 0, -1)));
//! assert!(!grid.in_bounds(GridPoint::new(3, 0, 0)));
//!
//! grid[GridPoint::new(2, 1, 2)] = CellType::Room;
//! assert_eq!(grid.get(GridPoint::new(2, 1, 2)), Some(&CellType::Room));
//! assert_eq!(grid.get(GridPoint::new(9, 9, 9)), None);
//! ```

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};
use thiserror::Error;

// =============================================================================
// COORDINATES
// =============================================================================

/// Integer coordinate of a grid cell.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridPoint {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate (vertical).
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl GridPoint {
    /// The origin.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Creates a coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component-wise sign, each component clamped to `-1..=1`.
    #[inline]
    #[must_use]
    pub const fn signum(self) -> Self {
        Self::new(self.x.signum(), self.y.signum(), self.z.signum())
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let d = other - self;
        let [x, y, z] = [f64::from(d.x), f64::from(d.y), f64::from(d.z)];
        z.mul_add(z, x.mul_add(x, y * y)).sqrt()
    }

    /// Coordinates as an array.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<[i32; 3]> for GridPoint {
    #[inline]
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl Add for GridPoint {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for GridPoint {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<i32> for GridPoint {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for GridPoint {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Extent of a grid along each axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    /// Cells along X.
    pub x: u32,
    /// Cells along Y.
    pub y: u32,
    /// Cells along Z.
    pub z: u32,
}

impl GridSize {
    /// Creates a size.
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Total number of cells, or `None` on overflow.
    #[must_use]
    pub fn volume(self) -> Option<usize> {
        usize::try_from(self.x)
            .ok()?
            .checked_mul(usize::try_from(self.y).ok()?)?
            .checked_mul(usize::try_from(self.z).ok()?)
    }

    /// Returns `true` if any axis has zero extent.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.x == 0 || self.y == 0 || self.z == 0
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}×{}", self.x, self.y, self.z)
    }
}

// =============================================================================
// CELL CONTENTS
// =============================================================================

/// What occupies a dungeon cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    /// Nothing placed yet ("None").
    #[default]
    Empty,
    /// Part of a room.
    Room,
    /// Part of a corridor.
    Corridor,
    /// Part of a staircase footprint.
    Stairs,
}

// =============================================================================
// GRID
// =============================================================================

/// Errors from grid construction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The size has a zero axis, or its cell count does not fit in memory
    /// or in `i32` coordinates.
    #[error("Invalid grid size {size}")]
    InvalidSize {
        /// The rejected size.
        size: GridSize,
    },
}

/// Dense 3D array addressed by [`GridPoint`] plus an offset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    size: GridSize,
    offset: GridPoint,
    cells: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a grid filled with `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSize`] if `size` has a zero axis, an axis
    /// beyond `i32::MAX`, or too many cells.
    pub fn new(size: GridSize, offset: GridPoint) -> Result<Self, GridError> {
        let volume = Self::checked_volume(size)?;
        Ok(Self {
            size,
            offset,
            cells: vec![T::default(); volume],
        })
    }
}

impl<T> Grid<T> {
    /// Creates a grid whose cell at each in-bounds coordinate is `init(coordinate)`.
    ///
    /// # Errors
    ///
    /// Same as [`Grid::new`].
    pub fn from_fn(
        size: GridSize,
        offset: GridPoint,
        mut init: impl FnMut(GridPoint) -> T,
    ) -> Result<Self, GridError> {
        let volume = Self::checked_volume(size)?;
        let mut cells = Vec::with_capacity(volume);
        // Storage order: x fastest, then y, then z.
        for z in 0..size.z as i32 {
            for y in 0..size.y as i32 {
                for x in 0..size.x as i32 {
                    cells.push(init(GridPoint::new(x, y, z) - offset));
                }
            }
        }
        Ok(Self {
            size,
            offset,
            cells,
        })
    }

    fn checked_volume(size: GridSize) -> Result<usize, GridError> {
        let fits_i32 = [size.x, size.y, size.z]
            .iter()
            .all(|&axis| i32::try_from(axis).is_ok());
        match size.volume() {
            Some(volume) if volume > 0 && fits_i32 => Ok(volume),
            _ => Err(GridError::InvalidSize { size }),
        }
    }

    /// The grid's extent.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// The offset added to every coordinate before indexing.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> GridPoint {
        self.offset
    }

    /// Returns `true` iff `position + offset` lies in `[0, size)` on every axis.
    #[inline]
    #[must_use]
    pub fn in_bounds(&self, position: GridPoint) -> bool {
        self.index_of(position).is_some()
    }

    /// Flat storage index of `position`, or `None` if it is out of bounds.
    #[must_use]
    pub fn index_of(&self, position: GridPoint) -> Option<usize> {
        // Widen before offsetting so extreme coordinates cannot wrap into range.
        let shifted = [
            i64::from(position.x) + i64::from(self.offset.x),
            i64::from(position.y) + i64::from(self.offset.y),
            i64::from(position.z) + i64::from(self.offset.z),
        ];
        let sizes = [self.size.x, self.size.y, self.size.z].map(i64::from);
        if shifted
            .iter()
            .zip(&sizes)
            .any(|(&coord, &size)| coord < 0 || coord >= size)
        {
            return None;
        }
        let [x, y, z] = shifted;
        let index = x + sizes[0] * y + sizes[0] * sizes[1] * z;
        usize::try_from(index).ok()
    }

    /// Checked read.
    #[inline]
    #[must_use]
    pub fn get(&self, position: GridPoint) -> Option<&T> {
        self.index_of(position).map(|i| &self.cells[i])
    }

    /// Checked write access.
    #[inline]
    pub fn get_mut(&mut self, position: GridPoint) -> Option<&mut T> {
        self.index_of(position).map(|i| &mut self.cells[i])
    }

    /// Iterates over every in-bounds coordinate with its value, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPoint, &T)> + '_ {
        let sx = self.size.x as usize;
        let sy = self.size.y as usize;
        self.cells.iter().enumerate().map(move |(i, value)| {
            let x = (i % sx) as i32;
            let y = ((i / sx) % sy) as i32;
            let z = (i / (sx * sy)) as i32;
            (GridPoint::new(x, y, z) - self.offset, value)
        })
    }

    /// Mutable access to every cell, in storage order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.cells.iter_mut()
    }
}

impl<T> Index<GridPoint> for Grid<T> {
    type Output = T;

    /// Returns the cell at `position`, or panics if it is out of bounds.
    ///
    /// Use [`Grid::get`] for a non-panicking alternative.
    fn index(&self, position: GridPoint) -> &T {
        match self.index_of(position) {
            Some(i) => &self.cells[i],
            None => panic!(
                "position {position} out of grid bounds (size {}, offset {})",
                self.size, self.offset
            ),
        }
    }
}

impl<T> IndexMut<GridPoint> for Grid<T> {
    fn index_mut(&mut self, position: GridPoint) -> &mut T {
        match self.index_of(position) {
            Some(i) => &mut self.cells[i],
            None => panic!(
                "position {position} out of grid bounds (size {}, offset {})",
                self.size, self.offset
            ),
        }
    }
}
