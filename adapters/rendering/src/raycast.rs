//! Grid ray casting using a digital differential analyser.

use dungeon_crawler_core::{Camera, LevelData, Tile, TileCoord};
use glam::DVec2;

/// Delta used for a ray component of exactly zero.
const INFINITE_DELTA: f64 = 1e30;

/// Smallest perpendicular distance used when sizing columns.
const MIN_DISTANCE: f64 = 1e-6;

/// Grid axis whose boundary the ray crossed last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// A vertical grid line (x boundary).
    Vertical,
    /// A horizontal grid line (y boundary).
    Horizontal,
}

/// Where and how a ray stopped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Tile that stopped the ray; may lie outside the grid.
    pub tile: TileCoord,
    /// Tile contents, `None` when the ray left the grid.
    pub contents: Option<Tile>,
    /// Boundary crossed last.
    pub side: Side,
    /// Distance projected onto the view direction.
    pub perpendicular_distance: f64,
}

/// Walks `direction` from `origin` until a wall, the exit or the grid edge.
///
/// Missing rows and cells count as the edge, so ragged maps never index out
/// of range.
#[must_use]
pub fn cast_ray(level: &LevelData, origin: DVec2, direction: DVec2) -> RayHit {
    let mut tile = TileCoord::containing(origin);
    let delta = DVec2::new(axis_delta(direction.x), axis_delta(direction.y));

    let (step_x, mut side_x) = if direction.x < 0.0 {
        (-1, (origin.x - tile.x as f64) * delta.x)
    } else {
        (1, (tile.x as f64 + 1.0 - origin.x) * delta.x)
    };
    let (step_y, mut side_y) = if direction.y < 0.0 {
        (-1, (origin.y - tile.y as f64) * delta.y)
    } else {
        (1, (tile.y as f64 + 1.0 - origin.y) * delta.y)
    };

    let width = i64::from(level.width);
    let height = i64::from(level.height);

    loop {
        let side = if side_x < side_y {
            side_x += delta.x;
            tile.x += step_x;
            Side::Vertical
        } else {
            side_y += delta.y;
            tile.y += step_y;
            Side::Horizontal
        };

        let outside = tile.x < 0 || tile.y < 0 || tile.x >= width || tile.y >= height;
        let contents = if outside { None } else { level.tile(tile) };
        if contents.map_or(true, Tile::stops_ray) {
            let perpendicular_distance = match side {
                Side::Vertical => side_x - delta.x,
                Side::Horizontal => side_y - delta.y,
            };
            return RayHit {
                tile,
                contents,
                side,
                perpendicular_distance,
            };
        }
    }
}

fn axis_delta(component: f64) -> f64 {
    if component == 0.0 {
        INFINITE_DELTA
    } else {
        (1.0 / component).abs()
    }
}

/// Vertical wall slice for one screen column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallColumn {
    /// Ray result the slice was derived from.
    pub hit: RayHit,
    /// First covered row.
    pub top: f32,
    /// Row after the last covered one.
    pub bottom: f32,
}

impl WallColumn {
    /// Covered height in rows.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Casts the ray for screen column `x` and sizes the wall slice.
///
/// The slice is `screen_height / distance` rows tall, centred vertically and
/// clipped to the screen.
#[must_use]
pub fn wall_column(
    level: &LevelData,
    camera: &Camera,
    x: u32,
    screen_width: u32,
    screen_height: u32,
) -> WallColumn {
    let camera_x = 2.0 * f64::from(x) / f64::from(screen_width.max(1)) - 1.0;
    let hit = cast_ray(level, camera.position(), camera.ray_direction(camera_x));

    let screen_height = f64::from(screen_height);
    let line_height = (screen_height / hit.perpendicular_distance.max(MIN_DISTANCE)).floor();
    let top = (screen_height / 2.0 - line_height / 2.0).max(0.0);
    let bottom = (screen_height / 2.0 + line_height / 2.0).min(screen_height);

    WallColumn {
        hit,
        top: top as f32,
        bottom: bottom as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_crawler_core::Facing;

    fn corridor(length: usize) -> LevelData {
        let width = length + 2;
        let mut middle = vec![Tile::Empty; width];
        middle[0] = Tile::Wall;
        middle[width - 1] = Tile::Wall;
        middle[1] = Tile::Start;
        middle[width - 2] = Tile::Exit;
        LevelData {
            width: width as u32,
            height: 3,
            start_facing: Facing::East,
            map: vec![vec![Tile::Wall; width], middle, vec![Tile::Wall; width]],
            items: Vec::new(),
            name: None,
            created_at: None,
        }
    }

    #[test]
    fn straight_ray_measures_corridor_length() {
        let mut level = corridor(12);
        level.map[1][11] = Tile::Wall;
        level.map[1][12] = Tile::Exit;

        let hit = cast_ray(&level, DVec2::new(1.0, 1.5), DVec2::new(1.0, 0.0));

        assert_eq!(hit.tile, TileCoord::new(11, 1));
        assert_eq!(hit.side, Side::Vertical);
        assert!((hit.perpendicular_distance - 10.0).abs() < 1e-9);
    }

    #[test]
    fn exit_tile_stops_rays() {
        let level = corridor(5);
        let hit = cast_ray(&level, DVec2::new(1.5, 1.5), DVec2::new(1.0, 0.0));

        assert_eq!(hit.contents, Some(Tile::Exit));
        assert!((hit.perpendicular_distance - 3.5).abs() < 1e-9);
    }

    #[test]
    fn axis_parallel_ray_does_not_divide_by_zero() {
        let level = corridor(5);
        let hit = cast_ray(&level, DVec2::new(2.5, 1.5), DVec2::new(0.0, -1.0));

        assert_eq!(hit.side, Side::Horizontal);
        assert_eq!(hit.tile, TileCoord::new(2, 0));
        assert!((hit.perpendicular_distance - 0.5).abs() < 1e-9);
    }

    #[test]
    fn leaving_an_open_grid_counts_as_a_hit() {
        let level = LevelData {
            width: 3,
            height: 3,
            start_facing: Facing::North,
            map: vec![vec![Tile::Empty; 3], vec![Tile::Empty, Tile::Start, Tile::Empty]],
            items: Vec::new(),
            name: None,
            created_at: None,
        };

        let hit = cast_ray(&level, DVec2::new(1.5, 1.5), DVec2::new(0.0, 1.0));
        assert_eq!(hit.contents, None);
        assert_eq!(hit.tile, TileCoord::new(1, 2));

        let hit = cast_ray(&level, DVec2::new(1.5, 1.5), DVec2::new(-1.0, 0.0));
        assert_eq!(hit.tile, TileCoord::new(-1, 1));
        assert!((hit.perpendicular_distance - 1.5).abs() < 1e-9);
    }

    #[test]
    fn near_walls_fill_the_column_and_far_walls_shrink() {
        let level = corridor(20);
        let near = Camera::new(DVec2::new(1.5, 1.5), Facing::North);
        let column = wall_column(&level, &near, 50, 100, 80);
        assert_eq!((column.top, column.bottom), (0.0, 80.0));

        let far = Camera::new(DVec2::new(1.5, 1.5), Facing::East);
        let column = wall_column(&level, &far, 50, 100, 80);
        assert!(column.height() < 10.0);
        assert!((column.top + column.bottom - 80.0).abs() < 1.0);
    }
}
