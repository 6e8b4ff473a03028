#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts and the ray-casting renderer for dungeon
//! crawler adapters.

pub mod raycast;
mod renderer;
pub mod sprites;

use anyhow::Result as AnyResult;
use std::time::Duration;
use thiserror::Error;

pub use renderer::{FrameRenderer, Hud, HudLine, Palette, Scene};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Parses `#RRGGBB` or `RRGGBB` notation.
    pub fn from_hex(value: &str) -> Result<Self, RenderingError> {
        let digits = value.trim().trim_start_matches('#');
        let invalid = || RenderingError::InvalidColor {
            value: value.to_owned(),
        };
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };
        Ok(Self::from_rgb_u8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns a new color with every channel multiplied by `factor`.
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);

        Self {
            red: self.red * factor,
            green: self.green * factor,
            blue: self.blue * factor,
            alpha: self.alpha,
        }
    }

    /// Returns the color with its alpha replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Perceived brightness in the range 0.0..=1.0.
    #[must_use]
    pub fn luminance(self) -> f32 {
        0.2126 * self.red + 0.7152 * self.green + 0.0722 * self.blue
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Drawing surface supplied by the host.
///
/// Coordinates are in surface pixels with the origin at the top-left.
pub trait Canvas {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Fills an axis-aligned rectangle.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    /// Draws a single line of text with its top-left corner at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color);

    /// Approximate rendered width of `text` at `size`.
    fn measure_text(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.6
    }
}

/// Single recorded drawing operation.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Filled rectangle.
    Rect {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width in pixels.
        width: f32,
        /// Height in pixels.
        height: f32,
        /// Fill color.
        color: Color,
    },
    /// Line of text.
    Text {
        /// Text to draw.
        text: String,
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Font size in pixels.
        size: f32,
        /// Text color.
        color: Color,
    },
}

/// Canvas that records operations so a backend can replay them every
/// display refresh without re-running the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
}

impl Frame {
    /// Creates an empty frame with the provided logical size.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderingError> {
        if width == 0 || height == 0 {
            return Err(RenderingError::EmptySurface { width, height });
        }
        Ok(Self {
            width,
            height,
            ops: Vec::new(),
        })
    }

    /// Recorded operations in drawing order.
    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drops every recorded operation.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Text operations in drawing order, handy for assertions and logging.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Rect { .. } => None,
        })
    }
}

impl Canvas for Frame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color) {
        if text.is_empty() {
            return;
        }
        self.ops.push(DrawOp::Text {
            text: text.to_owned(),
            x,
            y,
            size,
            color,
        });
    }
}

/// Keys the backend reports to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Space bar.
    Space,
}

/// Press or release of a [`Key`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    /// The key went down.
    Pressed(Key),
    /// The key went up.
    Released(Key),
}

/// Input snapshot gathered by adapters before updating the frame.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Movement key transitions in arrival order.
    pub keys: Vec<KeyEvent>,
    /// Lines of text confirmed with Enter.
    pub submitted: Vec<String>,
    /// Text typed so far on the command line.
    pub typing: String,
    /// Whether `typing` changed during this frame.
    pub typing_changed: bool,
    /// Whether the player asked to quit.
    pub quit_requested: bool,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each refresh.
    pub clear_color: Color,
    /// Logical frame the renderer draws into.
    pub frame: Frame,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, frame: Frame) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            frame,
        }
    }
}

/// Rendering backend capable of presenting dungeon crawler frames.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_frame` closure receives the elapsed frame time
    /// and the input captured by the adapter, and may re-record the frame.
    /// The backend replays the recorded frame on every display refresh.
    fn run<F>(self, presentation: Presentation, update_frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Frame) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderingError {
    /// Frames need a positive size.
    #[error("frame dimensions must be positive (received {width}x{height})")]
    EmptySurface {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A color string could not be parsed.
    #[error("invalid color '{value}', expected #RRGGBB")]
    InvalidColor {
        /// Offending input.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_creation_rejects_zero_size_without_panicking() {
        let error = Frame::new(0, 10).expect_err("zero width must be rejected");
        assert_eq!(
            error,
            RenderingError::EmptySurface {
                width: 0,
                height: 10
            }
        );
    }

    #[test]
    fn hex_colors_parse_with_and_without_hash() {
        assert_eq!(
            Color::from_hex("#FFD700"),
            Ok(Color::from_rgb_u8(0xff, 0xd7, 0x00))
        );
        assert_eq!(
            Color::from_hex("8b4513"),
            Ok(Color::from_rgb_u8(0x8b, 0x45, 0x13))
        );
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#GG0000").is_err());
    }

    #[test]
    fn frame_skips_empty_operations() {
        let mut frame = Frame::new(4, 4).expect("valid frame");
        frame.fill_rect(0.0, 0.0, 0.0, 3.0, Color::from_rgb_u8(1, 2, 3));
        frame.draw_text("", 0.0, 0.0, 10.0, Color::from_rgb_u8(1, 2, 3));
        frame.draw_text("hi", 0.0, 0.0, 10.0, Color::from_rgb_u8(1, 2, 3));

        assert_eq!(frame.ops().len(), 1);
        assert_eq!(frame.texts().collect::<Vec<_>>(), vec!["hi"]);
    }

    #[test]
    fn lighten_and_scale_move_in_opposite_directions() {
        let base = Color::from_rgb_u8(100, 100, 100);
        assert!(base.lighten(0.3).luminance() > base.luminance());
        assert!(base.scale(0.5).luminance() < base.luminance());
        assert_eq!(base.with_alpha(0.5).alpha, 0.5);
    }
}
