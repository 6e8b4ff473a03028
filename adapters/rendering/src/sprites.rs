//! Billboard projection for items near the player.

use dungeon_crawler_core::{Camera, LevelData, MapItem};
use glam::DVec2;

/// Items farther than this along the view direction are culled.
pub const MAX_SPRITE_DEPTH: f64 = 3.0;

/// Largest Chebyshev tile distance at which items are drawn.
pub const SPRITE_TILE_RADIUS: u64 = 1;

/// Item position transformed into camera space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Horizontal screen coordinate of the sprite centre.
    pub screen_x: f64,
    /// Lateral offset in camera space.
    pub lateral: f64,
    /// Distance along the view direction.
    pub depth: f64,
    /// Euclidean distance from the camera.
    pub distance: f64,
}

/// Projects `point` through the inverse camera basis.
///
/// Returns `None` when the point lies on or behind the camera plane or the
/// basis is degenerate.
#[must_use]
pub fn project(camera: &Camera, point: DVec2, screen_width: u32) -> Option<Projection> {
    let offset = point - camera.position();
    let direction = camera.direction();
    let plane = camera.plane();

    let determinant = plane.x * direction.y - direction.x * plane.y;
    if determinant.abs() < f64::EPSILON {
        return None;
    }
    let inverse = 1.0 / determinant;

    let lateral = inverse * (direction.y * offset.x - direction.x * offset.y);
    let depth = inverse * (-plane.y * offset.x + plane.x * offset.y);
    if depth <= 0.0 {
        return None;
    }

    let half_width = f64::from(screen_width) / 2.0;
    Some(Projection {
        screen_x: half_width + (lateral / depth) * half_width,
        lateral,
        depth,
        distance: offset.length(),
    })
}

/// Item selected for drawing together with its projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleSprite<'a> {
    /// Item being drawn.
    pub item: &'a MapItem,
    /// Screen placement.
    pub projection: Projection,
    /// Whether the item shares the player's tile.
    pub on_player_tile: bool,
}

/// Items around the player that project in front of the camera, far to near.
#[must_use]
pub fn visible_sprites<'a>(
    level: &'a LevelData,
    camera: &Camera,
    screen_width: u32,
) -> Vec<VisibleSprite<'a>> {
    let player_tile = camera.tile();
    let mut sprites: Vec<VisibleSprite<'a>> = level
        .items_near(player_tile, SPRITE_TILE_RADIUS)
        .filter_map(|item| {
            let projection = project(camera, DVec2::new(item.x, item.y), screen_width)?;
            (projection.depth <= MAX_SPRITE_DEPTH).then_some(VisibleSprite {
                item,
                projection,
                on_player_tile: item.tile() == player_tile,
            })
        })
        .collect();

    sprites.sort_by(|a, b| b.projection.depth.total_cmp(&a.projection.depth));
    sprites
}

/// Square edge length for a sprite at `distance`.
#[must_use]
pub fn sprite_size(distance: f64, on_player_tile: bool) -> f64 {
    let base = if on_player_tile { 10.0 } else { 6.0 };
    (base / (1.0 + distance * 0.1)).max(2.0)
}

/// Label font size for a sprite at `distance`.
#[must_use]
pub fn label_size(distance: f64) -> f64 {
    (12.0 / (1.0 + distance * 0.1)).max(8.0)
}
