use glam::DVec2;

use crate::level::{Facing, TileCoord};

/// Length of the camera plane relative to the unit direction vector.
///
/// 0.66 yields a horizontal field of view of roughly 66 degrees.
pub const FIELD_OF_VIEW_SCALE: f64 = 0.66;

/// Continuous player viewpoint used by movement and ray casting.
///
/// `plane` always stays perpendicular to `direction` with length
/// [`FIELD_OF_VIEW_SCALE`]; both vectors only change together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    position: DVec2,
    direction: DVec2,
    plane: DVec2,
}

impl Camera {
    /// Creates a camera at `position` looking toward `facing`.
    #[must_use]
    pub fn new(position: DVec2, facing: Facing) -> Self {
        let mut camera = Self {
            position,
            direction: DVec2::X,
            plane: DVec2::ZERO,
        };
        camera.set_direction(facing);
        camera
    }

    /// Creates a camera standing in the middle of `tile`.
    #[must_use]
    pub fn at_tile(tile: TileCoord, facing: Facing) -> Self {
        Self::new(tile.center(), facing)
    }

    /// Continuous position in tile units.
    #[must_use]
    pub const fn position(&self) -> DVec2 {
        self.position
    }

    /// Unit view direction.
    #[must_use]
    pub const fn direction(&self) -> DVec2 {
        self.direction
    }

    /// Camera plane, perpendicular to the direction.
    #[must_use]
    pub const fn plane(&self) -> DVec2 {
        self.plane
    }

    /// Tile currently containing the camera.
    #[must_use]
    pub fn tile(&self) -> TileCoord {
        TileCoord::containing(self.position)
    }

    /// Points the camera along a cardinal axis and rebuilds the plane.
    pub fn set_direction(&mut self, facing: Facing) {
        self.direction = facing.direction();
        self.plane = DVec2::new(-self.direction.y, self.direction.x) * FIELD_OF_VIEW_SCALE;
    }

    /// Rotates direction and plane by `angle` radians with the same matrix.
    pub fn rotate(&mut self, angle: f64) {
        let (sin, cos) = angle.sin_cos();
        let old_direction = self.direction;
        self.direction = DVec2::new(
            old_direction.x * cos - old_direction.y * sin,
            old_direction.x * sin + old_direction.y * cos,
        );
        let old_plane = self.plane;
        self.plane = DVec2::new(
            old_plane.x * cos - old_plane.y * sin,
            old_plane.x * sin + old_plane.y * cos,
        );
    }

    /// Ray direction for a column offset in `-1.0..=1.0` across the screen.
    #[must_use]
    pub fn ray_direction(&self, camera_x: f64) -> DVec2 {
        self.direction + self.plane * camera_x
    }

    /// Applies `delta` one axis at a time, skipping any axis that would enter a
    /// blocked tile. Returns `true` when at least one axis advanced.
    ///
    /// The X step is checked against the current row and the Y step against
    /// the (possibly updated) column, which lets the camera slide along walls.
    pub fn attempt_move<F>(&mut self, delta: DVec2, blocks: F) -> bool
    where
        F: Fn(TileCoord) -> bool,
    {
        let start = self.position;

        let next_x = self.position.x + delta.x;
        if !blocks(TileCoord::containing(DVec2::new(next_x, self.position.y))) {
            self.position.x = next_x;
        }

        let next_y = self.position.y + delta.y;
        if !blocks(TileCoord::containing(DVec2::new(self.position.x, next_y))) {
            self.position.y = next_y;
        }

        self.position != start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: DVec2, expected: DVec2) {
        assert!(
            (actual - expected).length() < EPSILON,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn cardinal_directions_follow_clockwise_screen_convention() {
        let camera = Camera::new(DVec2::ZERO, Facing::East);
        assert_close(camera.direction(), DVec2::new(1.0, 0.0));
        assert_close(camera.plane(), DVec2::new(0.0, 0.66));

        let camera = Camera::new(DVec2::ZERO, Facing::North);
        assert_close(camera.direction(), DVec2::new(0.0, -1.0));
        assert_close(camera.plane(), DVec2::new(0.66, 0.0));
    }

    #[test]
    fn rotation_is_undone_by_opposite_rotation() {
        let original = Camera::new(DVec2::new(2.5, 2.5), Facing::South);
        let mut camera = original;
        for _ in 0..50 {
            camera.rotate(0.1);
        }
        for _ in 0..50 {
            camera.rotate(-0.1);
        }

        assert_close(camera.direction(), original.direction());
        assert_close(camera.plane(), original.plane());
    }

    #[test]
    fn rotation_preserves_length_and_perpendicularity() {
        let mut camera = Camera::new(DVec2::ZERO, Facing::West);
        for step in 0..200 {
            camera.rotate(if step % 3 == 0 { -0.37 } else { 0.1 });
            assert!((camera.direction().length() - 1.0).abs() < EPSILON);
            assert!((camera.plane().length() - FIELD_OF_VIEW_SCALE).abs() < EPSILON);
            assert!(camera.direction().dot(camera.plane()).abs() < EPSILON);
        }
    }

    #[test]
    fn quarter_turn_clockwise_from_east_faces_south() {
        let mut camera = Camera::new(DVec2::ZERO, Facing::East);
        camera.rotate(std::f64::consts::FRAC_PI_2);
        assert_close(camera.direction(), Facing::South.direction());
    }

    #[test]
    fn blocked_axis_is_skipped_while_open_axis_slides() {
        // Wall along column 2; everything else open.
        let blocks = |tile: TileCoord| tile.x >= 2;
        let mut camera = Camera::new(DVec2::new(1.9, 1.5), Facing::East);

        let moved = camera.attempt_move(DVec2::new(0.15, 0.15), blocks);

        assert!(moved);
        assert!((camera.position().x - 1.9).abs() < EPSILON);
        assert!((camera.position().y - 1.65).abs() < EPSILON);
    }

    #[test]
    fn fully_blocked_move_leaves_position_untouched() {
        let mut camera = Camera::new(DVec2::new(1.5, 1.5), Facing::East);
        let moved = camera.attempt_move(DVec2::new(1.0, 1.0), |_| true);
        assert!(!moved);
        assert_eq!(camera.position(), DVec2::new(1.5, 1.5));
    }
}
