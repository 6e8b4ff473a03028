//! Map model operations: validation, construction and JSON transfer.

use dungeon_crawler_core::{Facing, LevelData, Tile};
use thiserror::Error;

/// Reasons a level fails structural validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// Width or height is zero.
    #[error("level dimensions must be positive (received {width}x{height})")]
    EmptyDimensions {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
    /// The number of rows differs from the declared height.
    #[error("expected {expected} rows but found {found}")]
    RowCount {
        /// Declared height.
        expected: u32,
        /// Rows present in the grid.
        found: usize,
    },
    /// A row's length differs from the declared width.
    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength {
        /// Index of the offending row.
        row: usize,
        /// Declared width.
        expected: u32,
        /// Cells present in the row.
        found: usize,
    },
    /// The grid does not contain exactly one start marker.
    #[error("expected exactly one start marker, found {0}")]
    StartCount(usize),
    /// The grid does not contain exactly one exit marker.
    #[error("expected exactly one exit marker, found {0}")]
    ExitCount(usize),
}

/// Checks the structural invariants of a level.
///
/// The facing is enforced by the type system; every other rule is checked
/// here and the first violation is reported.
pub fn validate(level: &LevelData) -> Result<(), LevelError> {
    if level.width == 0 || level.height == 0 {
        return Err(LevelError::EmptyDimensions {
            width: level.width,
            height: level.height,
        });
    }

    if level.map.len() != level.height as usize {
        return Err(LevelError::RowCount {
            expected: level.height,
            found: level.map.len(),
        });
    }

    if let Some((row, cells)) = level
        .map
        .iter()
        .enumerate()
        .find(|(_, cells)| cells.len() != level.width as usize)
    {
        return Err(LevelError::RowLength {
            row,
            expected: level.width,
            found: cells.len(),
        });
    }

    let starts = level.count_tiles(Tile::Start);
    if starts != 1 {
        return Err(LevelError::StartCount(starts));
    }

    let exits = level.count_tiles(Tile::Exit);
    if exits != 1 {
        return Err(LevelError::ExitCount(exits));
    }

    Ok(())
}

/// Boolean form of [`validate`].
#[must_use]
pub fn is_valid(level: &LevelData) -> bool {
    validate(level).is_ok()
}

/// Builds a walled rectangle with the start at (1,1) and the exit at
/// (width-2, height-2).
///
/// Dimensions below 3 are raised to 3. The interior must hold two cells so
/// the start and exit stay distinct, so a map 3 rows high is widened to 4
/// columns. The result always passes [`validate`].
#[must_use]
pub fn create_empty_map(width: u32, height: u32, start_facing: Facing) -> LevelData {
    let height = height.max(3);
    let width = if height == 3 { width.max(4) } else { width.max(3) };

    let mut map: Vec<Vec<Tile>> = (0..height)
        .map(|y| {
            (0..width)
                .map(|x| {
                    if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                        Tile::Wall
                    } else {
                        Tile::Empty
                    }
                })
                .collect()
        })
        .collect();

    map[1][1] = Tile::Start;
    map[height as usize - 2][width as usize - 2] = Tile::Exit;

    LevelData {
        width,
        height,
        start_facing,
        map,
        items: Vec::new(),
        name: None,
        created_at: None,
    }
}

/// Serialises a level to pretty-printed JSON.
pub fn serialize(level: &LevelData) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(level)
}

/// Parses and validates a level, returning `None` on any failure.
#[must_use]
pub fn deserialize(json: &str) -> Option<LevelData> {
    let level: LevelData = serde_json::from_str(json).ok()?;
    is_valid(&level).then_some(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_map_has_perimeter_walls_and_markers() {
        let level = create_empty_map(6, 5, Facing::South);

        assert!(is_valid(&level));
        assert_eq!(level.map[1][1], Tile::Start);
        assert_eq!(level.map[3][4], Tile::Exit);
        assert!(level.map[0].iter().all(|tile| *tile == Tile::Wall));
        assert!(level.map.iter().all(|row| row[0] == Tile::Wall));
        assert_eq!(level.map[2][2], Tile::Empty);
    }

    #[test]
    fn tiny_empty_map_is_clamped() {
        let level = create_empty_map(1, 1, Facing::North);
        assert_eq!((level.width, level.height), (4, 3));
        assert_eq!(level.map.len(), 3);
        assert_eq!(validate(&level), Ok(()));
    }

    #[test]
    fn smallest_empty_maps_keep_start_and_exit_apart() {
        for (width, height) in [(3, 3), (3, 4), (4, 3), (3, 9)] {
            let level = create_empty_map(width, height, Facing::North);
            assert_eq!(
                validate(&level),
                Ok(()),
                "{width}x{height} should produce a loadable map"
            );
            assert_ne!(
                level.find_tile(Tile::Start),
                level.find_tile(Tile::Exit),
                "{width}x{height} start and exit coincide"
            );
        }
        assert_eq!(create_empty_map(3, 3, Facing::North).width, 4);
    }
}
