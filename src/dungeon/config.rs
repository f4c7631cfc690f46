//! Dungeon generation settings.
//!
//! [`DungeonConfig`] is built with the generated [`DungeonConfigBuilder`];
//! every field has a default, so `DungeonConfigBuilder::default().build()`
//! yields a usable configuration.
//!
//! # Examples
//!
//! ```rust
//! use voxel_dungeon::dungeon::config::DungeonConfigBuilder;
//! use voxel_dungeon::grid::GridSize;
//!
//! let config = DungeonConfigBuilder::default()
//!     .map_size(GridSize::new(32, 8, 32))
//!     .seed(Some(7))
//!     .build()
//!     .unwrap();
//! assert_eq!(config.corridor_chance, 0.125);
//!
//! // Inverted room size bounds are rejected.
//! assert!(DungeonConfigBuilder::default()
//!     .min_room_size(GridSize::new(9, 3, 9))
//!     .max_room_size(GridSize::new(5, 3, 5))
//!     .build()
//!     .is_err());
//! ```

use crate::core::algorithms::bowyer_watson::TriangulationOptions;
use crate::grid::GridSize;
use serde::{Deserialize, Serialize};

/// Default map extent.
pub const DEFAULT_MAP_SIZE: GridSize = GridSize::new(48, 12, 48);
/// Default stride between candidate room positions.
pub const DEFAULT_GENERATING_STEP: GridSize = GridSize::new(6, 4, 6);
/// Default inclusive lower bound on room size.
pub const DEFAULT_MIN_ROOM_SIZE: GridSize = GridSize::new(3, 1, 3);
/// Default exclusive upper bound on room size.
pub const DEFAULT_MAX_ROOM_SIZE: GridSize = GridSize::new(8, 3, 8);
/// Default probability of trying a room at a candidate position.
pub const DEFAULT_ROOM_SPAWN_CHANCE: f64 = 0.1;
/// Default probability of keeping a non-tree triangulation edge.
pub const DEFAULT_CORRIDOR_CHANCE: f64 = 0.125;
/// Default half-width of the random offset applied to room centers before
/// triangulation.
pub const DEFAULT_JITTER: f64 = 0.1;
/// Default super-tetrahedron reach for room centers.
///
/// Room centers sit on a few lattice planes, so hull tetrahedra are flat and
/// have very large circumspheres.
pub const DEFAULT_SUPER_SCALE: f64 = 256.0;

/// Per-cell costs used when routing corridors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorridorCosts {
    /// Entering an empty cell.
    pub empty: f64,
    /// Entering a room cell.
    pub room: f64,
    /// Entering an existing corridor cell.
    pub corridor: f64,
    /// Taking a staircase.
    pub stairs: f64,
}

impl Default for CorridorCosts {
    fn default() -> Self {
        Self {
            empty: 1.0,
            room: 5.0,
            corridor: 0.0,
            stairs: 100.0,
        }
    }
}

impl CorridorCosts {
    fn validate(&self) -> Result<(), String> {
        let all = [self.empty, self.room, self.corridor, self.stairs];
        if all.iter().all(|c| c.is_finite() && *c >= 0.0) {
            Ok(())
        } else {
            Err(format!("corridor costs must be finite and non-negative, got {self:?}"))
        }
    }
}

/// Settings for [`DungeonGenerator`](crate::dungeon::generator::DungeonGenerator).
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct DungeonConfig {
    /// Extent of the voxel map.
    #[builder(default = "DEFAULT_MAP_SIZE")]
    pub map_size: GridSize,
    /// Stride between candidate room positions along each axis.
    #[builder(default = "DEFAULT_GENERATING_STEP")]
    pub generating_step: GridSize,
    /// Inclusive lower bound on room size per axis.
    #[builder(default = "DEFAULT_MIN_ROOM_SIZE")]
    pub min_room_size: GridSize,
    /// Exclusive upper bound on room size per axis (equal bounds give a fixed size).
    #[builder(default = "DEFAULT_MAX_ROOM_SIZE")]
    pub max_room_size: GridSize,
    /// Probability of trying to place a room at each candidate position.
    #[builder(default = "DEFAULT_ROOM_SPAWN_CHANCE")]
    pub room_spawn_chance: f64,
    /// Probability of adding each non-tree triangulation edge as a corridor.
    #[builder(default = "DEFAULT_CORRIDOR_CHANCE")]
    pub corridor_chance: f64,
    /// Routing costs.
    #[builder(default)]
    pub costs: CorridorCosts,
    /// RNG seed; `None` seeds from the thread-local generator.
    #[builder(default)]
    pub seed: Option<u64>,
    /// Half-width of the uniform offset added to room centers before triangulation.
    #[builder(default = "DEFAULT_JITTER")]
    pub jitter: f64,
    /// Options for triangulating room centers.
    #[builder(default = "TriangulationOptions::default().with_super_scale(DEFAULT_SUPER_SCALE)")]
    pub triangulation: TriangulationOptions,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            map_size: DEFAULT_MAP_SIZE,
            generating_step: DEFAULT_GENERATING_STEP,
            min_room_size: DEFAULT_MIN_ROOM_SIZE,
            max_room_size: DEFAULT_MAX_ROOM_SIZE,
            room_spawn_chance: DEFAULT_ROOM_SPAWN_CHANCE,
            corridor_chance: DEFAULT_CORRIDOR_CHANCE,
            costs: CorridorCosts::default(),
            seed: None,
            jitter: DEFAULT_JITTER,
            triangulation: TriangulationOptions::default().with_super_scale(DEFAULT_SUPER_SCALE),
        }
    }
}

impl DungeonConfig {
    /// Checks the same constraints as the builder, for configs obtained
    /// some other way (deserialization, struct literals).
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        validate_fields(
            self.map_size,
            self.generating_step,
            self.min_room_size,
            self.max_room_size,
            [self.room_spawn_chance, self.corridor_chance],
            self.jitter,
        )?;
        self.costs.validate()
    }
}

impl DungeonConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        validate_fields(
            self.map_size.unwrap_or(DEFAULT_MAP_SIZE),
            self.generating_step.unwrap_or(DEFAULT_GENERATING_STEP),
            self.min_room_size.unwrap_or(DEFAULT_MIN_ROOM_SIZE),
            self.max_room_size.unwrap_or(DEFAULT_MAX_ROOM_SIZE),
            [
                self.room_spawn_chance.unwrap_or(DEFAULT_ROOM_SPAWN_CHANCE),
                self.corridor_chance.unwrap_or(DEFAULT_CORRIDOR_CHANCE),
            ],
            self.jitter.unwrap_or(DEFAULT_JITTER),
        )?;
        self.costs.map_or(Ok(()), |costs| costs.validate())
    }
}

fn validate_fields(
    map_size: GridSize,
    step: GridSize,
    min_room: GridSize,
    max_room: GridSize,
    chances: [f64; 2],
    jitter: f64,
) -> Result<(), String> {
    if map_size.is_empty() || map_size.volume().is_none() {
        return Err(format!("map size {map_size} must be non-empty"));
    }
    if step.is_empty() {
        return Err(format!("generating step {step} must be non-zero on every axis"));
    }
    if min_room.is_empty() {
        return Err(format!("minimum room size {min_room} must be at least 1 on every axis"));
    }
    if min_room.x > max_room.x || min_room.y > max_room.y || min_room.z > max_room.z {
        return Err(format!(
            "minimum room size {min_room} exceeds maximum room size {max_room}"
        ));
    }
    if let Some(chance) = chances.iter().find(|c| !(0.0..=1.0).contains(*c)) {
        return Err(format!("probability {chance} is outside [0, 1]"));
    }
    if !jitter.is_finite() || jitter < 0.0 || jitter >= 0.5 {
        return Err(format!("jitter {jitter} must lie in [0, 0.5)"));
    }
    Ok(())
}
