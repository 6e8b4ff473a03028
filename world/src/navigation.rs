//! Breadth-first distance field over a level's walkable tiles.

use std::collections::VecDeque;

use dungeon_crawler_core::{LevelData, Tile, TileCoord};

/// Dense step-distance grid seeded from a single origin tile.
///
/// Distances default to `u32::MAX` for walls and for tiles the search never
/// reached, so callers can tell unreachable cells apart from the origin
/// component.
#[derive(Clone, Debug, Default)]
pub struct DistanceField {
    width: u32,
    height: u32,
    distances: Vec<u32>,
    reached: usize,
}

impl DistanceField {
    /// Runs a four-neighbour breadth-first search from `origin`.
    ///
    /// `is_blocked` is consulted for every candidate tile, including the
    /// origin; a blocked origin produces an empty field.
    pub fn from_origin<F>(width: u32, height: u32, origin: TileCoord, mut is_blocked: F) -> Self
    where
        F: FnMut(TileCoord) -> bool,
    {
        let width_usize = usize::try_from(width).unwrap_or(0);
        let height_usize = usize::try_from(height).unwrap_or(0);
        let cell_count = width_usize.checked_mul(height_usize).unwrap_or(0);

        let mut field = Self {
            width,
            height,
            distances: vec![u32::MAX; cell_count],
            reached: 0,
        };

        let Some(origin_index) = field.index(origin) else {
            return field;
        };
        if is_blocked(origin) {
            return field;
        }

        field.distances[origin_index] = 0;
        field.reached = 1;
        let mut queue = VecDeque::from([origin]);

        while let Some(tile) = queue.pop_front() {
            let Some(current_index) = field.index(tile) else {
                continue;
            };
            let next_distance = field.distances[current_index].saturating_add(1);

            for neighbor in neighbors(tile) {
                let Some(neighbor_index) = field.index(neighbor) else {
                    continue;
                };
                if field.distances[neighbor_index] != u32::MAX || is_blocked(neighbor) {
                    continue;
                }

                field.distances[neighbor_index] = next_distance;
                field.reached += 1;
                queue.push_back(neighbor);
            }
        }

        field
    }

    /// Searches the walkable tiles of `level` starting at `origin`.
    #[must_use]
    pub fn for_level(level: &LevelData, origin: TileCoord) -> Self {
        Self::from_origin(level.width, level.height, origin, |tile| {
            level.blocks_movement(tile)
        })
    }

    /// Steps from the origin to `tile`, or `None` when unreachable or outside.
    #[must_use]
    pub fn distance(&self, tile: TileCoord) -> Option<u32> {
        self.index(tile)
            .and_then(|index| self.distances.get(index).copied())
            .filter(|distance| *distance != u32::MAX)
    }

    /// Number of tiles reached, origin included.
    #[must_use]
    pub const fn reached(&self) -> usize {
        self.reached
    }

    /// One shortest path from the origin to `target`, both ends included.
    ///
    /// Walks back from `target` through neighbours one step closer; ties go
    /// to the first neighbour in north, east, south, west order.
    #[must_use]
    pub fn path_to(&self, target: TileCoord) -> Option<Vec<TileCoord>> {
        let mut remaining = self.distance(target)?;
        let mut path = Vec::with_capacity(remaining as usize + 1);
        let mut tile = target;
        path.push(tile);

        while remaining > 0 {
            tile = neighbors(tile)
                .into_iter()
                .find(|neighbor| self.distance(*neighbor) == Some(remaining - 1))?;
            path.push(tile);
            remaining -= 1;
        }

        path.reverse();
        Some(path)
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if tile.x < 0 || tile.y < 0 || tile.x >= i64::from(self.width) || tile.y >= i64::from(self.height)
        {
            return None;
        }
        let column = usize::try_from(tile.x).ok()?;
        let row = usize::try_from(tile.y).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Reports whether the exit marker can be walked to from the start marker.
#[must_use]
pub fn exit_reachable(level: &LevelData) -> bool {
    let (Some(start), Some(exit)) = (level.find_tile(Tile::Start), level.find_tile(Tile::Exit))
    else {
        return false;
    };
    DistanceField::for_level(level, start).distance(exit).is_some()
}

fn neighbors(tile: TileCoord) -> [TileCoord; 4] {
    [
        TileCoord::new(tile.x, tile.y - 1),
        TileCoord::new(tile.x + 1, tile.y),
        TileCoord::new(tile.x, tile.y + 1),
        TileCoord::new(tile.x - 1, tile.y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::create_empty_map;
    use dungeon_crawler_core::Facing;

    #[test]
    fn distances_grow_by_one_per_step() {
        let field = DistanceField::from_origin(3, 4, TileCoord::new(1, 2), |_| false);

        assert_eq!(field.distance(TileCoord::new(1, 2)), Some(0));
        assert_eq!(field.distance(TileCoord::new(1, 1)), Some(1));
        assert_eq!(field.distance(TileCoord::new(1, 0)), Some(2));
        assert_eq!(field.distance(TileCoord::new(0, 0)), Some(3));
        assert_eq!(field.reached(), 12);
    }

    #[test]
    fn walls_are_routed_around() {
        let wall = TileCoord::new(1, 1);
        let field = DistanceField::from_origin(3, 4, TileCoord::new(1, 2), |tile| tile == wall);

        assert_eq!(field.distance(wall), None);
        assert_eq!(field.distance(TileCoord::new(1, 0)), Some(4));
        assert_eq!(field.distance(TileCoord::new(0, 1)), Some(2));
    }

    #[test]
    fn path_follows_decreasing_distances() {
        let wall = TileCoord::new(1, 1);
        let origin = TileCoord::new(1, 2);
        let field = DistanceField::from_origin(3, 4, origin, |tile| tile == wall);

        let path = field.path_to(TileCoord::new(1, 0)).expect("target reachable");
        assert_eq!(path.len(), 5);
        assert_eq!(path.first(), Some(&origin));
        assert_eq!(path.last(), Some(&TileCoord::new(1, 0)));
        assert!(!path.contains(&wall));
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert_eq!((a.x - b.x).abs() + (a.y - b.y).abs(), 1, "{a:?} -> {b:?}");
        }

        assert_eq!(field.path_to(origin), Some(vec![origin]));
        assert_eq!(field.path_to(wall), None);
    }

    #[test]
    fn empty_map_exit_is_reachable() {
        let mut level = create_empty_map(7, 7, Facing::East);
        assert!(exit_reachable(&level));

        for y in 1..6 {
            level.map[y][3] = Tile::Wall;
        }
        assert!(!exit_reachable(&level));
    }
}
