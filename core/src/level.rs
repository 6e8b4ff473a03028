use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::item::{ItemId, MapItem};

/// Cardinal direction the camera faces when a level starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Toward decreasing row indices.
    #[serde(rename = "N")]
    North,
    /// Toward increasing column indices.
    #[serde(rename = "E")]
    East,
    /// Toward increasing row indices.
    #[serde(rename = "S")]
    South,
    /// Toward decreasing column indices.
    #[serde(rename = "W")]
    West,
}

impl Facing {
    /// Unit vector pointing along the facing on a y-down grid.
    ///
    /// East is 0 radians and angles grow clockwise, so south is +90 degrees and
    /// north is -90 degrees.
    #[must_use]
    pub const fn direction(self) -> DVec2 {
        match self {
            Self::North => DVec2::new(0.0, -1.0),
            Self::East => DVec2::new(1.0, 0.0),
            Self::South => DVec2::new(0.0, 1.0),
            Self::West => DVec2::new(-1.0, 0.0),
        }
    }

    /// Single-letter form used by the map file format.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::North => 'N',
            Self::East => 'E',
            Self::South => 'S',
            Self::West => 'W',
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Contents of a single grid cell.
///
/// Serialised as `0`, `1`, `"S"` or `"E"` to match the map file format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTile", into = "RawTile")]
pub enum Tile {
    /// Walkable floor.
    Empty,
    /// Solid wall.
    Wall,
    /// Start marker, walkable.
    Start,
    /// Exit marker, walkable but rendered like a wall.
    Exit,
}

impl Tile {
    /// Reports whether the tile blocks movement.
    #[must_use]
    pub const fn is_wall(self) -> bool {
        matches!(self, Self::Wall)
    }

    /// Reports whether a ray stops when it steps into this tile.
    #[must_use]
    pub const fn stops_ray(self) -> bool {
        matches!(self, Self::Wall | Self::Exit)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawTile {
    Code(u8),
    Marker(String),
}

impl TryFrom<RawTile> for Tile {
    type Error = String;

    fn try_from(raw: RawTile) -> Result<Self, Self::Error> {
        match raw {
            RawTile::Code(0) => Ok(Self::Empty),
            RawTile::Code(1) => Ok(Self::Wall),
            RawTile::Code(other) => Err(format!("unknown tile code {other}")),
            RawTile::Marker(marker) => match marker.as_str() {
                "S" => Ok(Self::Start),
                "E" => Ok(Self::Exit),
                _ => Err(format!("unknown tile marker '{marker}'")),
            },
        }
    }
}

impl From<Tile> for RawTile {
    fn from(tile: Tile) -> Self {
        match tile {
            Tile::Empty => Self::Code(0),
            Tile::Wall => Self::Code(1),
            Tile::Start => Self::Marker("S".to_owned()),
            Tile::Exit => Self::Marker("E".to_owned()),
        }
    }
}

/// Integer grid coordinate. Signed so rays and neighbours may leave the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Column index.
    pub x: i64,
    /// Row index.
    pub y: i64,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Tile containing the continuous position (floor of each component).
    #[must_use]
    pub fn containing(position: DVec2) -> Self {
        Self::new(position.x.floor() as i64, position.y.floor() as i64)
    }

    /// Centre of the tile in continuous coordinates.
    #[must_use]
    pub fn center(self) -> DVec2 {
        DVec2::new(self.x as f64 + 0.5, self.y as f64 + 0.5)
    }

    /// Largest per-axis distance between two tiles.
    #[must_use]
    pub fn chebyshev_distance(self, other: TileCoord) -> u64 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

/// Level geometry plus the items placed on it.
///
/// The structure mirrors the JSON map format one to one. Use the world's
/// `level::validate` before activating a level; nothing here enforces the
/// single start / single exit invariant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Facing applied to the camera at the start marker.
    pub start_facing: Facing,
    /// Row-major grid; `map[y][x]`.
    pub map: Vec<Vec<Tile>>,
    /// Items placed on the map, in scan order.
    #[serde(default)]
    pub items: Vec<MapItem>,
    /// Optional display name, also the key used by the map library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional ISO-8601 creation timestamp.
    #[serde(
        default,
        rename = "createdAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
}

impl LevelData {
    /// Returns the tile at `coord`, or `None` outside the grid or on ragged rows.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<Tile> {
        let x = usize::try_from(coord.x).ok()?;
        let y = usize::try_from(coord.y).ok()?;
        self.map.get(y)?.get(x).copied()
    }

    /// Reports whether movement into `coord` is blocked.
    ///
    /// Cells without tile information count as blocking.
    #[must_use]
    pub fn blocks_movement(&self, coord: TileCoord) -> bool {
        self.tile(coord).map_or(true, Tile::is_wall)
    }

    /// Finds the first cell holding `tile` in row-major order.
    #[must_use]
    pub fn find_tile(&self, tile: Tile) -> Option<TileCoord> {
        self.map.iter().enumerate().find_map(|(y, row)| {
            row.iter()
                .position(|cell| *cell == tile)
                .map(|x| TileCoord::new(x as i64, y as i64))
        })
    }

    /// Counts the cells holding `tile`.
    #[must_use]
    pub fn count_tiles(&self, tile: Tile) -> usize {
        self.map
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| **cell == tile)
            .count()
    }

    /// Items whose floor-truncated position lies on `coord`.
    pub fn items_on_tile(&self, coord: TileCoord) -> impl Iterator<Item = &MapItem> {
        self.items.iter().filter(move |item| item.tile() == coord)
    }

    /// Items within the given Chebyshev tile distance of `coord`.
    pub fn items_near(&self, coord: TileCoord, radius: u64) -> impl Iterator<Item = &MapItem> {
        self.items
            .iter()
            .filter(move |item| item.tile().chebyshev_distance(coord) <= radius)
    }

    /// Looks up a top-level map item by identifier.
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&MapItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Mutable lookup of a top-level map item by identifier.
    pub fn item_mut(&mut self, id: &ItemId) -> Option<&mut MapItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// Removes a top-level map item, returning it when present.
    pub fn remove_item(&mut self, id: &ItemId) -> Option<MapItem> {
        let index = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(index))
    }
}
