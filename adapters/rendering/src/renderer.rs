use dungeon_crawler_core::{Camera, ItemKind, LevelData, Tile, EXIT_FOUND_MESSAGE};

use crate::{
    raycast::{wall_column, Side},
    sprites::{label_size, sprite_size, visible_sprites},
    Canvas, Color,
};

/// Brightness lost per tile of distance before clamping.
const DISTANCE_ATTENUATION: f64 = 0.15;

/// How far horizontal-boundary walls are pushed towards white.
const SIDE_LIGHTEN: f32 = 0.2;

/// Alpha applied to sprites on neighbouring tiles.
const ADJACENT_ALPHA: f32 = 0.5;

const HUD_MARGIN: f32 = 10.0;
const HUD_FONT: f32 = 16.0;
const HUD_LINE_HEIGHT: f32 = 20.0;

/// Colors used by the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Upper half of the screen.
    pub ceiling: Color,
    /// Lower half of the screen.
    pub floor: Color,
    /// Unshaded wall color.
    pub wall: Color,
    /// Unshaded exit color.
    pub exit: Color,
    /// Heads-up display text.
    pub text: Color,
    /// Console replies that succeeded.
    pub success: Color,
    /// Console replies that failed.
    pub failure: Color,
    /// Darkest a wall may become with distance, 0.0..=1.0.
    pub minimum_brightness: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ceiling: Color::from_rgb_u8(0x2b, 0x2b, 0x33),
            floor: Color::from_rgb_u8(0x4a, 0x44, 0x3c),
            wall: Color::from_rgb_u8(0xa8, 0xa0, 0x90),
            exit: Color::from_rgb_u8(0x3c, 0xb3, 0x71),
            text: Color::from_rgb_u8(0xf0, 0xf0, 0xf0),
            success: Color::from_rgb_u8(0x9c, 0xe0, 0x9c),
            failure: Color::from_rgb_u8(0xf0, 0x9c, 0x9c),
            minimum_brightness: 0.25,
        }
    }
}

impl Palette {
    /// Sprite fill color for an item kind.
    #[must_use]
    pub const fn item_color(kind: ItemKind) -> Color {
        match kind {
            ItemKind::Key => Color::from_rgb_u8(0xff, 0xd7, 0x00),
            ItemKind::Chest => Color::from_rgb_u8(0x8b, 0x45, 0x13),
            ItemKind::Door => Color::from_rgb_u8(0x65, 0x43, 0x21),
            ItemKind::Bed => Color::from_rgb_u8(0x4b, 0x00, 0x82),
            ItemKind::Food => Color::from_rgb_u8(0xff, 0x63, 0x47),
            ItemKind::Weapon => Color::from_rgb_u8(0xc0, 0xc0, 0xc0),
            ItemKind::Trap => Color::from_rgb_u8(0xff, 0x00, 0x00),
            ItemKind::Switch => Color::from_rgb_u8(0x00, 0xff, 0x00),
        }
    }
}

/// One console line shown on the heads-up display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HudLine {
    /// Text to show.
    pub text: String,
    /// Whether the line reports a success.
    pub success: bool,
}

/// Heads-up display contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hud {
    /// Current health.
    pub health: u32,
    /// Upper bound for health.
    pub max_health: u32,
    /// Console history, oldest first.
    pub lines: Vec<HudLine>,
    /// Command line contents while typing.
    pub input: Option<String>,
    /// Completion candidates for the command line.
    pub suggestions: Vec<String>,
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    /// Active level.
    pub level: &'a LevelData,
    /// Viewpoint.
    pub camera: &'a Camera,
    /// Overlay contents.
    pub hud: &'a Hud,
}

/// Draws scenes onto a [`Canvas`].
#[derive(Clone, Debug, Default)]
pub struct FrameRenderer {
    palette: Palette,
}

impl FrameRenderer {
    /// Creates a renderer using `palette`.
    #[must_use]
    pub const fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// Colors in use.
    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Wall color after distance attenuation and side lighting.
    ///
    /// Brightness falls monotonically with distance and never drops below
    /// the palette's minimum. Horizontal-boundary walls are lighter.
    #[must_use]
    pub fn shade(&self, base: Color, side: Side, distance: f64) -> Color {
        let falloff = (1.0 / (1.0 + distance.max(0.0) * DISTANCE_ATTENUATION)) as f32;
        let brightness = falloff.clamp(self.palette.minimum_brightness.clamp(0.0, 1.0), 1.0);
        let shaded = base.scale(brightness);
        match side {
            Side::Vertical => shaded,
            Side::Horizontal => shaded.lighten(SIDE_LIGHTEN),
        }
    }

    /// Draws walls, item sprites, the exit overlay and the HUD.
    pub fn render<C: Canvas + ?Sized>(&self, scene: &Scene<'_>, canvas: &mut C) {
        let width = canvas.width();
        let height = canvas.height();
        if width == 0 || height == 0 {
            return;
        }
        let (width_px, height_px) = (width as f32, height as f32);

        canvas.fill_rect(0.0, 0.0, width_px, height_px / 2.0, self.palette.ceiling);
        canvas.fill_rect(
            0.0,
            height_px / 2.0,
            width_px,
            height_px / 2.0,
            self.palette.floor,
        );

        let mut depths = Vec::with_capacity(width as usize);
        for x in 0..width {
            let column = wall_column(scene.level, scene.camera, x, width, height);
            let base = match column.hit.contents {
                Some(Tile::Exit) => self.palette.exit,
                _ => self.palette.wall,
            };
            let color = self.shade(base, column.hit.side, column.hit.perpendicular_distance);
            canvas.fill_rect(x as f32, column.top, 1.0, column.height(), color);
            depths.push(column.hit.perpendicular_distance);
        }

        self.draw_sprites(scene, canvas, &depths);

        if scene.level.tile(scene.camera.tile()) == Some(Tile::Exit) {
            canvas.draw_text(EXIT_FOUND_MESSAGE, 40.0, 50.0, 20.0, self.palette.text);
        }

        self.draw_hud(scene.hud, canvas);
    }

    fn draw_sprites<C: Canvas + ?Sized>(&self, scene: &Scene<'_>, canvas: &mut C, depths: &[f64]) {
        let centre_y = canvas.height() as f32 / 2.0;

        for sprite in visible_sprites(scene.level, scene.camera, canvas.width()) {
            let projection = sprite.projection;
            let size = sprite_size(projection.distance, sprite.on_player_tile) as f32;
            let left = projection.screen_x as f32 - size / 2.0;
            let right = left + size;
            let y = centre_y - size / 2.0;
            let alpha = if sprite.on_player_tile {
                1.0
            } else {
                ADJACENT_ALPHA
            };
            let border = Color::new(0.0, 0.0, 0.0, alpha);
            let fill = Palette::item_color(sprite.item.kind).with_alpha(alpha);

            for (run_left, run_right) in visible_runs(depths, projection.depth, left, right) {
                // Side borders only where the run reaches the sprite's own edge.
                let pad_left = if run_left <= left { 1.0 } else { 0.0 };
                let pad_right = if run_right >= right { 1.0 } else { 0.0 };
                canvas.fill_rect(
                    run_left - pad_left,
                    y - 1.0,
                    run_right - run_left + pad_left + pad_right,
                    size + 2.0,
                    border,
                );
                canvas.fill_rect(run_left, y, run_right - run_left, size, fill);
            }

            let centre_visible = projection.screen_x >= 0.0
                && depths
                    .get(projection.screen_x as usize)
                    .is_some_and(|wall| *wall >= projection.depth);
            if sprite.on_player_tile && centre_visible {
                let font = label_size(projection.distance) as f32;
                let label_width = canvas.measure_text(&sprite.item.name, font);
                canvas.draw_text(
                    &sprite.item.name,
                    projection.screen_x as f32 - label_width / 2.0,
                    centre_y + 15.0,
                    font,
                    self.palette.text,
                );
            }
        }
    }

    fn draw_hud<C: Canvas + ?Sized>(&self, hud: &Hud, canvas: &mut C) {
        let width = canvas.width() as f32;
        let height = canvas.height() as f32;

        let health = format!("HP {}/{}", hud.health, hud.max_health);
        let health_width = canvas.measure_text(&health, HUD_FONT);
        canvas.draw_text(
            &health,
            width - health_width - HUD_MARGIN,
            HUD_MARGIN,
            HUD_FONT,
            self.palette.text,
        );
        if hud.max_health > 0 {
            let bar_width = health_width;
            let filled = bar_width * hud.health.min(hud.max_health) as f32 / hud.max_health as f32;
            let bar_y = HUD_MARGIN + HUD_LINE_HEIGHT;
            let bar_x = width - bar_width - HUD_MARGIN;
            canvas.fill_rect(bar_x, bar_y, bar_width, 4.0, self.palette.failure.scale(0.5));
            canvas.fill_rect(bar_x, bar_y, filled, 4.0, self.palette.success);
        }

        let mut y = height - HUD_MARGIN - HUD_LINE_HEIGHT;
        if let Some(input) = &hud.input {
            canvas.draw_text(&format!("> {input}_"), HUD_MARGIN, y, HUD_FONT, self.palette.text);
            y -= HUD_LINE_HEIGHT;
            if !hud.suggestions.is_empty() {
                canvas.draw_text(
                    &hud.suggestions.join("  "),
                    HUD_MARGIN + HUD_FONT,
                    y,
                    HUD_FONT * 0.8,
                    self.palette.text.scale(0.7),
                );
                y -= HUD_LINE_HEIGHT;
            }
        }

        for line in hud.lines.iter().rev() {
            if y < HUD_MARGIN {
                break;
            }
            let color = if line.success {
                self.palette.success
            } else {
                self.palette.failure
            };
            canvas.draw_text(&line.text, HUD_MARGIN, y, HUD_FONT, color);
            y -= HUD_LINE_HEIGHT;
        }
    }
}

/// Horizontal runs of `left..right` whose columns have no wall nearer than
/// `depth`, clipped to the screen.
fn visible_runs(depths: &[f64], depth: f64, left: f32, right: f32) -> Vec<(f32, f32)> {
    let first = left.floor().max(0.0) as usize;
    let last = (right.ceil().max(0.0) as usize).min(depths.len());
    let clip = |from: usize, to: usize| ((from as f32).max(left), (to as f32).min(right));

    let mut runs = Vec::new();
    let mut start = None;
    for (column, wall) in depths.iter().enumerate().take(last).skip(first) {
        match (*wall >= depth, start) {
            (true, None) => start = Some(column),
            (false, Some(from)) => {
                runs.push(clip(from, column));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(from) = start {
        runs.push(clip(from, last));
    }
    runs
}
