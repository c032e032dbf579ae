#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tank Battlegrounds engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems read immutable views and
//! respond with [`Command`] values, the world executes those commands via its
//! `apply` entry point in the order they were queued, and then reports
//! [`Event`] values that observers consume for presentation purposes only.

use std::path::PathBuf;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Offset from a grid-aligned position to the centre of the cell it occupies.
pub const CELL_CENTER_OFFSET: Vec2 = Vec2::new(0.5, 0.5);

/// Commands that express all permissible world mutations.
///
/// Every command is closed over its operands; the world reference is supplied
/// when the command runs. Order within a tick is significant.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Attempts to move a unit one step along the provided vector.
    MoveUnit {
        /// Identifier of the unit attempting to move.
        unit: UnitId,
        /// Discrete step applied to the unit's position.
        direction: MoveVector,
    },
    /// Points a unit's weapon at the provided location.
    AimUnit {
        /// Identifier of the unit being aimed.
        unit: UnitId,
        /// Grid-fractional point the weapon targets. May lie outside the grid.
        target: Vec2,
    },
    /// Requests that a unit fire a bullet at its current weapon target.
    Shoot {
        /// Identifier of the firing unit.
        unit: UnitId,
    },
    /// Advances a bullet one step along its fixed trajectory.
    AdvanceBullet {
        /// Identifier of the bullet in flight.
        bullet: BulletId,
    },
    /// Removes every destroyed entity from the named roster, preserving order.
    ReapDestroyed {
        /// Roster that should be filtered.
        roster: Roster,
    },
    /// Advances the tick counter by one.
    Tick,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a unit fired a new bullet.
    BulletFired {
        /// Unit that fired.
        unit: UnitId,
        /// Identifier allocated to the new bullet.
        bullet: BulletId,
        /// Position the bullet starts from.
        origin: Vec2,
        /// Position the bullet travels toward.
        target: Vec2,
    },
    /// Announces that a bullet destroyed a unit.
    UnitDestroyed {
        /// Unit that was destroyed.
        unit: UnitId,
        /// Position of the unit at the time of destruction.
        position: Vec2,
    },
    /// Indicates that the tick counter advanced.
    TimeAdvanced {
        /// Value of the tick counter after advancing.
        tick: Tick,
    },
}

/// Entity collections that may be filtered by [`Command::ReapDestroyed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Roster {
    /// The unit collection.
    Units,
    /// The bullet collection.
    Bullets,
}

/// Lifecycle state shared by units and bullets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// The entity participates in the simulation.
    Alive,
    /// The entity was destroyed. The transition is irreversible.
    Destroyed,
}

impl Status {
    /// Reports whether the status is [`Status::Alive`].
    #[must_use]
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }
}

/// Result of evaluating the terminal condition after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Every non-player unit is destroyed while the player survives.
    Victory,
    /// The player's unit is destroyed.
    Defeat,
}

/// Behaviour archetype attached to a unit.
///
/// The command pipeline never inspects the role beyond the stationary check;
/// systems use it to decide which commands to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Unit driven by the player's intents.
    Player,
    /// Stationary tower that aims at the player and fires within range.
    SentryTurret,
    /// Mobile enemy tank that aims at the player and fires within range.
    PatrolTank,
}

impl Role {
    /// Reports whether units with this role ignore movement commands.
    #[must_use]
    pub const fn is_stationary(self) -> bool {
        matches!(self, Self::SentryTurret)
    }
}

/// Four-way facing of a unit, stored as its rendering angle in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Facing toward decreasing rows (0°).
    #[default]
    North,
    /// Facing toward decreasing columns (90°).
    West,
    /// Facing toward increasing rows (180°).
    South,
    /// Facing toward increasing columns (-90°).
    East,
}

impl Orientation {
    /// Angle associated with the facing, in degrees.
    #[must_use]
    pub const fn degrees(self) -> i16 {
        match self {
            Self::North => 0,
            Self::West => 90,
            Self::South => 180,
            Self::East => -90,
        }
    }

    /// Derives the facing that results from attempting the provided move.
    ///
    /// The horizontal component is inspected first and the vertical one second,
    /// so a diagonal move ends up facing along the vertical axis. A zero
    /// vector keeps the current facing.
    #[must_use]
    pub const fn after_move(self, direction: MoveVector) -> Self {
        let mut facing = self;
        if direction.dx() < 0 {
            facing = Self::West;
        } else if direction.dx() > 0 {
            facing = Self::East;
        }
        if direction.dy() < 0 {
            facing = Self::North;
        } else if direction.dy() > 0 {
            facing = Self::South;
        }
        facing
    }
}

/// Discrete step drawn from `{-1, 0, 1} × {-1, 0, 1}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct MoveVector {
    dx: i8,
    dy: i8,
}

impl MoveVector {
    /// Vector that leaves the position untouched.
    pub const ZERO: Self = Self { dx: 0, dy: 0 };
    /// One row up.
    pub const UP: Self = Self { dx: 0, dy: -1 };
    /// One row down.
    pub const DOWN: Self = Self { dx: 0, dy: 1 };
    /// One column left.
    pub const LEFT: Self = Self { dx: -1, dy: 0 };
    /// One column right.
    pub const RIGHT: Self = Self { dx: 1, dy: 0 };

    /// Creates a move vector, rejecting components outside `-1..=1`.
    #[must_use]
    pub const fn new(dx: i8, dy: i8) -> Option<Self> {
        if dx < -1 || dx > 1 || dy < -1 || dy > 1 {
            return None;
        }
        Some(Self { dx, dy })
    }

    /// Horizontal component.
    #[must_use]
    pub const fn dx(&self) -> i8 {
        self.dx
    }

    /// Vertical component.
    #[must_use]
    pub const fn dy(&self) -> i8 {
        self.dy
    }

    /// Reports whether both components are zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Converts the step into a floating point offset.
    #[must_use]
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(f32::from(self.dx), f32::from(self.dy))
    }
}

/// Monotonic simulation tick counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Tick(u64);

impl Tick {
    /// Creates a tick from its numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric value of the tick.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns the tick that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Number of ticks elapsed since `earlier`, saturating at zero.
    #[must_use]
    pub const fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BulletId(u32);

impl BulletId {
    /// Creates a new bullet identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Cell containing the provided point, if the point has non-negative
    /// finite coordinates.
    #[must_use]
    pub fn containing(point: Vec2) -> Option<Self> {
        if !point.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        Some(Self::new(point.x as u32, point.y as u32))
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Grid-aligned position of the cell's upper-left corner.
    #[must_use]
    pub fn to_vec2(&self) -> Vec2 {
        Vec2::new(self.column as f32, self.row as f32)
    }
}

/// Coordinate of a tile within a tile sheet, measured in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRef {
    column: u32,
    row: u32,
}

impl TileRef {
    /// Creates a new tile sheet coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Column of the tile within its sheet.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Row of the tile within its sheet.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Static map geometry: dimensions and per-cell wall occupancy.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    walls: Vec<Option<TileRef>>,
}

impl Grid {
    /// Creates a grid without any walls.
    #[must_use]
    pub fn open(width: u32, height: u32) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            walls: vec![None; capacity],
        }
    }

    /// Creates a grid from row-major wall cells.
    ///
    /// Returns `None` when the cell count does not equal `width × height`.
    #[must_use]
    pub fn with_walls(width: u32, height: u32, walls: Vec<Option<TileRef>>) -> Option<Self> {
        let expected = u64::from(width) * u64::from(height);
        if u64::try_from(walls.len()).ok()? != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            walls,
        })
    }

    /// Places a wall tile at the provided cell. Out-of-range cells are ignored.
    pub fn set_wall(&mut self, cell: CellCoord, tile: Option<TileRef>) {
        if let Some(index) = self.index(cell) {
            self.walls[index] = tile;
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the point lies within `[0, width) × [0, height)`.
    #[must_use]
    pub fn is_inside(&self, position: Vec2) -> bool {
        position.x >= 0.0
            && position.x < self.width as f32
            && position.y >= 0.0
            && position.y < self.height as f32
    }

    /// Wall tile occupying the cell, or `None` when the cell is open or
    /// outside the grid.
    #[must_use]
    pub fn wall_at(&self, x: i64, y: i64) -> Option<TileRef> {
        let column = u32::try_from(x).ok()?;
        let row = u32::try_from(y).ok()?;
        self.index(CellCoord::new(column, row))
            .and_then(|index| self.walls[index])
    }

    /// Row-major wall cells.
    #[must_use]
    pub fn walls(&self) -> &[Option<TileRef>] {
        &self.walls
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.width && cell.row() < self.height {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Unit placement decoded from a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSpawn {
    /// Behaviour archetype of the spawned unit.
    pub role: Role,
    /// Cell the unit starts in.
    pub cell: CellCoord,
    /// Sprite of the unit within the units tile sheet.
    pub tile: TileRef,
}

/// The five ordered layers of a level map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Decorative ground tiles.
    Ground,
    /// Blocking wall tiles.
    Walls,
    /// Tank spawns; the first one is the player.
    Tanks,
    /// Tower spawns.
    Towers,
    /// Effects sheet metadata.
    Explosions,
}

impl LayerKind {
    /// Layers in the order they appear in a map.
    pub const ALL: [LayerKind; 5] = [
        LayerKind::Ground,
        LayerKind::Walls,
        LayerKind::Tanks,
        LayerKind::Towers,
        LayerKind::Explosions,
    ];

    /// Position of the layer within a map.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Ground => 0,
            Self::Walls => 1,
            Self::Tanks => 2,
            Self::Towers => 3,
            Self::Explosions => 4,
        }
    }
}

/// Tile sheet a layer draws from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileSheet {
    /// Path of the sheet image, as written in the map.
    pub image: String,
    /// Number of tile columns in the sheet.
    pub columns: u32,
}

/// Pixel dimensions of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellSize {
    /// Tile width in pixels.
    pub width: u32,
    /// Tile height in pixels.
    pub height: u32,
}

impl CellSize {
    /// Size as a floating point vector.
    #[must_use]
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Fully decoded level, ready to seed a world.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    /// Wall geometry.
    pub grid: Grid,
    /// Row-major decorative ground tiles.
    pub ground: Vec<Option<TileRef>>,
    /// Unit placements; the first entry is the player.
    pub spawns: Vec<UnitSpawn>,
    /// Pixel size shared by every tile layer.
    pub cell_size: CellSize,
    /// Tile sheet per layer, indexed by [`LayerKind::index`]. Empty layers
    /// carry no sheet.
    pub sheets: [Option<TileSheet>; 5],
}

impl Level {
    /// Sheet used by the provided layer, if any.
    #[must_use]
    pub fn sheet(&self, layer: LayerKind) -> Option<&TileSheet> {
        self.sheets[layer.index()].as_ref()
    }
}

/// Tunable simulation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Distance a bullet travels per tick, in cells.
    pub bullet_speed: f32,
    /// Maximum distance a bullet may travel, in cells. Also the engagement
    /// envelope of AI units.
    pub bullet_range: f32,
    /// Minimum number of ticks between two shots of the same unit.
    pub fire_delay: u64,
    /// Ticks advanced per presented frame.
    pub ticks_per_frame: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            bullet_speed: 0.1,
            bullet_range: 4.0,
            fire_delay: 10,
            ticks_per_frame: 1,
        }
    }
}

impl SimulationConfig {
    /// Checks that bullets are guaranteed to make progress and expire.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.bullet_speed.is_finite() && self.bullet_speed > 0.0) {
            return Err(ConfigError::BulletSpeed(self.bullet_speed));
        }
        if !(self.bullet_range.is_finite() && self.bullet_range > 0.0) {
            return Err(ConfigError::BulletRange(self.bullet_range));
        }
        Ok(())
    }
}

/// Simulation parameters that cannot drive a session.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Bullet speed must be a positive finite number of cells per tick.
    #[error("bullet speed must be positive and finite, got {0}")]
    BulletSpeed(f32),
    /// Bullet range must be a positive finite number of cells.
    #[error("bullet range must be positive and finite, got {0}")]
    BulletRange(f32),
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Identifier of the unit.
    pub id: UnitId,
    /// Behaviour archetype.
    pub role: Role,
    /// Grid-aligned position.
    pub position: Vec2,
    /// Current facing.
    pub orientation: Orientation,
    /// Lifecycle status.
    pub status: Status,
    /// Point the weapon is aimed at.
    pub weapon_target: Vec2,
    /// Sprite within the units sheet.
    pub tile: TileRef,
}

/// Read-only snapshot describing every unit in roster order.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view, keeping the roster order of `snapshots`.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<UnitSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the unit with the provided identifier.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }

    /// Snapshot of the player's unit.
    #[must_use]
    pub fn player(&self) -> Option<&UnitSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.role == Role::Player)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single bullet's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletSnapshot {
    /// Identifier of the bullet.
    pub id: BulletId,
    /// Unit that fired the bullet.
    pub owner: UnitId,
    /// Current position.
    pub position: Vec2,
    /// Lifecycle status.
    pub status: Status,
}

/// Read-only snapshot describing every bullet in roster order.
#[derive(Clone, Debug, Default)]
pub struct BulletView {
    snapshots: Vec<BulletSnapshot>,
}

impl BulletView {
    /// Creates a new bullet view, keeping the roster order of `snapshots`.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<BulletSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured bullet snapshots in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &BulletSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BulletSnapshot> {
        self.snapshots
    }
}

/// Reasons a level can fail to load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The level file could not be read.
    #[error("failed to read level `{path}`")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The level file is not a well-formed map document.
    #[error("malformed level document: {0}")]
    Parse(String),
    /// Only orthogonal maps are supported.
    #[error("unsupported map orientation `{0}`")]
    UnsupportedOrientation(String),
    /// The map does not have exactly five layers.
    #[error("expected 5 layers, found {0}")]
    LayerCount(usize),
    /// A layer's tile count differs from `width × height`.
    #[error("layer `{layer}` holds {found} tiles, expected {expected}")]
    LayerSize {
        /// Name of the offending layer.
        layer: String,
        /// Tile count required by the map dimensions.
        expected: usize,
        /// Tile count found in the layer.
        found: usize,
    },
    /// A tile references no known tileset.
    #[error("layer `{layer}` references tile id {gid} outside every tileset")]
    MissingTileset {
        /// Name of the offending layer.
        layer: String,
        /// Global tile id without a tileset.
        gid: u32,
    },
    /// A tile id falls outside the range of the layer's tileset.
    #[error("layer `{layer}` uses tile id {gid} outside tileset range {first}..{end}")]
    TileOutOfRange {
        /// Name of the offending layer.
        layer: String,
        /// Offending global tile id.
        gid: u32,
        /// First global id of the tileset.
        first: u32,
        /// One past the last global id of the tileset.
        end: u32,
    },
    /// Layers disagree on tile pixel dimensions.
    #[error("layer `{layer}` uses {found_width}x{found_height} tiles, expected {width}x{height}")]
    TileSizeMismatch {
        /// Name of the offending layer.
        layer: String,
        /// Expected tile width.
        width: u32,
        /// Expected tile height.
        height: u32,
        /// Tile width found.
        found_width: u32,
        /// Tile height found.
        found_height: u32,
    },
    /// Tilesets must reference a single sheet image.
    #[error("tileset `{0}` does not reference a single sheet image")]
    UnsupportedTileset(String),
    /// The tanks layer holds no spawn for the player.
    #[error("tanks layer contains no player spawn")]
    MissingPlayer,
    /// The simulation parameters are unusable.
    #[error("invalid simulation config")]
    InvalidConfig(#[from] ConfigError),
    /// The map has a zero or oversized dimension.
    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions {
        /// Map width in tiles.
        width: u32,
        /// Map height in tiles.
        height: u32,
    },
}
