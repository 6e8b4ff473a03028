#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Random maze generator producing playable levels.
//!
//! Corridors are carved by depth-first backtracking over the odd-aligned
//! cells of the grid, so every odd cell ends up connected. Extra walls are
//! then sprinkled over the floor in proportion to the requested complexity,
//! but only where they leave the exit reachable from the start.

use std::collections::HashSet;

use dungeon_crawler_core::{Facing, LevelData, Tile, TileCoord};
use dungeon_crawler_world::navigation::DistanceField;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Smallest width or height the generator accepts.
pub const MIN_DIMENSION: u32 = 5;

/// Fraction of the grid area turned into extra walls when unspecified.
pub const DEFAULT_COMPLEXITY: f64 = 0.3;

/// Parameters controlling a single generated maze.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MazeConfig {
    width: u32,
    height: u32,
    complexity: f64,
    seed: Option<u64>,
}

impl MazeConfig {
    /// Creates a configuration for a maze of the given size.
    ///
    /// Dimensions below [`MIN_DIMENSION`] are raised to it.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(MIN_DIMENSION),
            height: height.max(MIN_DIMENSION),
            complexity: DEFAULT_COMPLEXITY,
            seed: None,
        }
    }

    /// Sets the extra-wall density, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = if complexity.is_finite() {
            complexity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Fixes the random seed so the maze is reproducible.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Extra-wall density.
    #[must_use]
    pub const fn complexity(&self) -> f64 {
        self.complexity
    }
}

/// Generates a maze described by `config`.
///
/// Without a configured seed a fresh one is drawn and logged so the maze can
/// be reproduced later.
#[must_use]
pub fn generate_random_maze(config: MazeConfig) -> LevelData {
    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let level = generate_with_rng(config, &mut rng);
    info!(
        width = level.width,
        height = level.height,
        complexity = config.complexity,
        seed,
        "maze generated"
    );
    level
}

/// Generates a maze using the caller's random source.
#[must_use]
pub fn generate_with_rng<R: Rng + ?Sized>(config: MazeConfig, rng: &mut R) -> LevelData {
    let mut grid = Grid::filled(config.width, config.height);
    carve_passages(&mut grid, rng);

    let start = find_start(&grid);
    let exit = find_exit(&grid, start);
    grid.set(start, Tile::Start);
    grid.set(exit, Tile::Exit);

    let placed = add_extra_walls(&mut grid, config.complexity, start, exit, rng);
    debug!(placed, "extra walls placed");

    LevelData {
        width: config.width,
        height: config.height,
        start_facing: Facing::East,
        map: grid.into_rows(),
        items: Vec::new(),
        name: None,
        created_at: None,
    }
}

#[derive(Debug)]
struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Tile>,
}

impl Grid {
    fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Tile::Wall; width as usize * height as usize],
        }
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        let x = u32::try_from(tile.x).ok().filter(|x| *x < self.width)?;
        let y = u32::try_from(tile.y).ok().filter(|y| *y < self.height)?;
        Some(y as usize * self.width as usize + x as usize)
    }

    fn get(&self, tile: TileCoord) -> Option<Tile> {
        self.index(tile).map(|index| self.cells[index])
    }

    fn set(&mut self, tile: TileCoord, value: Tile) {
        if let Some(index) = self.index(tile) {
            self.cells[index] = value;
        }
    }

    fn is_open(&self, tile: TileCoord) -> bool {
        self.get(tile).map_or(false, |cell| !cell.is_wall())
    }

    fn is_interior(&self, tile: TileCoord) -> bool {
        tile.x > 0
            && tile.y > 0
            && tile.x < i64::from(self.width) - 1
            && tile.y < i64::from(self.height) - 1
    }

    fn into_rows(self) -> Vec<Vec<Tile>> {
        self.cells
            .chunks(self.width as usize)
            .map(<[Tile]>::to_vec)
            .collect()
    }
}

/// Picks a random odd index in `1..=limit - 2`.
fn random_odd<R: Rng + ?Sized>(limit: u32, rng: &mut R) -> i64 {
    let choices = (limit - 1) / 2;
    i64::from(rng.gen_range(0..choices) * 2 + 1)
}

fn carve_passages<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) {
    let origin = TileCoord::new(random_odd(grid.width, rng), random_odd(grid.height, rng));
    let mut visited = vec![false; grid.cells.len()];
    let mut stack = vec![origin];

    if let Some(index) = grid.index(origin) {
        visited[index] = true;
    }
    grid.set(origin, Tile::Empty);

    while let Some(&current) = stack.last() {
        let mut candidates: Vec<TileCoord> = [(0, -2), (2, 0), (0, 2), (-2, 0)]
            .into_iter()
            .map(|(dx, dy)| TileCoord::new(current.x + dx, current.y + dy))
            .filter(|next| grid.is_interior(*next))
            .filter(|next| grid.index(*next).map_or(false, |index| !visited[index]))
            .collect();

        if candidates.is_empty() {
            let _ = stack.pop();
            continue;
        }

        candidates.shuffle(rng);
        let next = candidates[0];
        if let Some(index) = grid.index(next) {
            visited[index] = true;
        }
        let between = TileCoord::new((current.x + next.x) / 2, (current.y + next.y) / 2);
        grid.set(between, Tile::Empty);
        grid.set(next, Tile::Empty);
        stack.push(next);
    }
}

/// First open cell scanning the top-left quadrant row by row.
fn find_start(grid: &Grid) -> TileCoord {
    let half_width = i64::from(grid.width / 2);
    let half_height = i64::from(grid.height / 2);

    (1..half_height)
        .flat_map(|y| (1..half_width).map(move |x| TileCoord::new(x, y)))
        .find(|tile| grid.is_open(*tile))
        .or_else(|| first_open(grid))
        .unwrap_or(TileCoord::new(1, 1))
}

/// First open cell scanning backwards through the bottom-right quadrant.
///
/// Falls back to the open cell nearest the bottom-right corner in reverse
/// scan order, which keeps the exit inside the carved passages.
fn find_exit(grid: &Grid, start: TileCoord) -> TileCoord {
    let half_width = i64::from(grid.width / 2);
    let half_height = i64::from(grid.height / 2);
    let last_x = i64::from(grid.width) - 2;
    let last_y = i64::from(grid.height) - 2;

    let quadrant = (half_height + 1..=last_y)
        .rev()
        .flat_map(|y| (half_width + 1..=last_x).rev().map(move |x| TileCoord::new(x, y)))
        .find(|tile| *tile != start && grid.is_open(*tile));

    quadrant
        .or_else(|| {
            (1..=last_y)
                .rev()
                .flat_map(|y| (1..=last_x).rev().map(move |x| TileCoord::new(x, y)))
                .find(|tile| *tile != start && grid.is_open(*tile))
        })
        .unwrap_or(TileCoord::new(last_x, last_y))
}

fn first_open(grid: &Grid) -> Option<TileCoord> {
    (1..i64::from(grid.height) - 1)
        .flat_map(|y| (1..i64::from(grid.width) - 1).map(move |x| TileCoord::new(x, y)))
        .find(|tile| grid.is_open(*tile))
}

/// Randomly walls off empty tiles without disconnecting start from exit.
///
/// Only a candidate on the current shortest start-to-exit path can cut the
/// route, so only those trigger a breadth-first search over the grid.
fn add_extra_walls<R: Rng + ?Sized>(
    grid: &mut Grid,
    complexity: f64,
    start: TileCoord,
    exit: TileCoord,
    rng: &mut R,
) -> usize {
    let attempts = (f64::from(grid.width) * f64::from(grid.height) * complexity).floor() as usize;
    let Some(mut route) = shortest_route(grid, start, exit) else {
        return 0;
    };
    let mut placed = 0;
    let mut searches = 0;

    for _ in 0..attempts {
        let tile = TileCoord::new(
            i64::from(rng.gen_range(1..grid.width - 1)),
            i64::from(rng.gen_range(1..grid.height - 1)),
        );
        if tile == start || tile == exit || grid.get(tile) != Some(Tile::Empty) {
            continue;
        }

        grid.set(tile, Tile::Wall);
        if !route.contains(&tile) {
            placed += 1;
            continue;
        }

        searches += 1;
        match shortest_route(grid, start, exit) {
            Some(detour) => {
                route = detour;
                placed += 1;
            }
            None => grid.set(tile, Tile::Empty),
        }
    }

    debug!(attempts, searches, "extra wall reachability checks");
    placed
}

fn shortest_route(grid: &Grid, start: TileCoord, exit: TileCoord) -> Option<HashSet<TileCoord>> {
    DistanceField::from_origin(grid.width, grid.height, start, |tile| !grid.is_open(tile))
        .path_to(exit)
        .map(|path| path.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carving_opens_every_odd_cell() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut grid = Grid::filled(11, 9);
        carve_passages(&mut grid, &mut rng);

        for y in (1..8).step_by(2) {
            for x in (1..10).step_by(2) {
                assert!(
                    grid.is_open(TileCoord::new(x, y)),
                    "odd cell ({x}, {y}) was never carved"
                );
            }
        }
    }

    #[test]
    fn perimeter_stays_solid() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let level = generate_with_rng(MazeConfig::new(12, 10), &mut rng);

        assert!(level.map[0].iter().all(|tile| *tile == Tile::Wall));
        assert!(level.map[9].iter().all(|tile| *tile == Tile::Wall));
        assert!(level.map.iter().all(|row| row[0] == Tile::Wall));
        assert!(level.map.iter().all(|row| row[11] == Tile::Wall));
    }

    #[test]
    fn quadrant_scans_pick_markers() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let level = generate_with_rng(MazeConfig::new(9, 9).with_complexity(0.0), &mut rng);

        assert_eq!(level.find_tile(Tile::Start), Some(TileCoord::new(1, 1)));
        assert_eq!(level.find_tile(Tile::Exit), Some(TileCoord::new(7, 7)));
    }

    fn open_room(width: u32, height: u32) -> Grid {
        let mut grid = Grid::filled(width, height);
        for y in 1..i64::from(height) - 1 {
            for x in 1..i64::from(width) - 1 {
                grid.set(TileCoord::new(x, y), Tile::Empty);
            }
        }
        grid
    }

    #[test]
    fn extra_walls_match_a_full_search_per_attempt() {
        let (start, exit) = (TileCoord::new(1, 1), TileCoord::new(23, 17));
        let mut grid = open_room(25, 19);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let placed = add_extra_walls(&mut grid, 1.0, start, exit, &mut rng);

        // Same draws, but every candidate is checked with a fresh search.
        let mut expected = open_room(25, 19);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..25 * 19 {
            let tile = TileCoord::new(
                i64::from(rng.gen_range(1..24)),
                i64::from(rng.gen_range(1..18)),
            );
            if tile == start || tile == exit || expected.get(tile) != Some(Tile::Empty) {
                continue;
            }
            expected.set(tile, Tile::Wall);
            if shortest_route(&expected, start, exit).is_none() {
                expected.set(tile, Tile::Empty);
            }
        }

        assert!(placed > 0);
        assert_eq!(grid.cells, expected.cells);
        assert!(shortest_route(&grid, start, exit).is_some(), "exit stays reachable");
    }

    #[test]
    fn undersized_requests_are_raised() {
        let config = MazeConfig::new(1, 2).with_complexity(f64::NAN);
        assert_eq!((config.width(), config.height()), (5, 5));
        assert_eq!(config.complexity(), 0.0);
    }
}
