#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the dungeon crawler.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The adapter owns the window. Each refresh it samples the keyboard into a
//! [`FrameInput`], hands it to the host together with the recorded [`Frame`],
//! and replays whatever the frame holds, scaled to fit the window.

mod text_input;

pub use self::text_input::TextInput;

use anyhow::Result;
use dungeon_crawler_rendering::{
    Canvas, Color, DrawOp, Frame, FrameInput, Key, KeyEvent, Presentation, RenderingBackend,
};
use macroquad::input::{get_char_pressed, is_key_pressed, is_key_released, KeyCode};
use std::{collections::VecDeque, time::Duration};
use tracing::info;

/// Arrow keys report movement regardless of the command line state.
const ARROW_KEYS: [(KeyCode, Key); 4] = [
    (KeyCode::Up, Key::Up),
    (KeyCode::Down, Key::Down),
    (KeyCode::Left, Key::Left),
    (KeyCode::Right, Key::Right),
];

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame rate metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
        })
    }
}

/// Keyboard state carried between refreshes.
#[derive(Debug, Default)]
struct KeyboardState {
    text: TextInput,
    /// Space only drives movement when it went down with an empty command line.
    space_moving: bool,
}

impl KeyboardState {
    fn poll(&mut self) -> FrameInput {
        let mut input = FrameInput::default();

        for (code, key) in ARROW_KEYS {
            if is_key_pressed(code) {
                input.keys.push(KeyEvent::Pressed(key));
            }
            if is_key_released(code) {
                input.keys.push(KeyEvent::Released(key));
            }
        }

        if is_key_pressed(KeyCode::Space) && self.text.is_empty() {
            self.space_moving = true;
            input.keys.push(KeyEvent::Pressed(Key::Space));
        }
        if is_key_released(KeyCode::Space) && self.space_moving {
            self.space_moving = false;
            input.keys.push(KeyEvent::Released(Key::Space));
        }

        let mut changed = false;
        while let Some(character) = get_char_pressed() {
            if !self.space_moving || character != ' ' {
                changed |= self.text.push(character);
            }
        }
        if is_key_pressed(KeyCode::Backspace) {
            changed |= self.text.backspace();
        }
        if is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter) {
            if let Some(line) = self.text.submit() {
                input.submitted.push(line);
                changed = true;
            }
        }
        if is_key_pressed(KeyCode::Escape) {
            if self.text.is_empty() {
                input.quit_requested = true;
            } else {
                self.text.clear();
                changed = true;
            }
        }

        input.typing = self.text.text().to_owned();
        input.typing_changed = changed;
        input
    }
}

/// Uniform scale and letterbox offset mapping logical frame pixels to the window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FrameMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl FrameMetrics {
    fn fit(frame: &Frame, screen_width: f32, screen_height: f32) -> Self {
        let width = frame.width() as f32;
        let height = frame.height() as f32;
        let scale = (screen_width / width).min(screen_height / height).max(0.0);
        Self {
            scale,
            offset_x: (screen_width - width * scale) * 0.5,
            offset_y: (screen_height - height * scale) * 0.5,
        }
    }

    fn x(&self, x: f32) -> f32 {
        self.offset_x + x * self.scale
    }

    fn y(&self, y: f32) -> f32 {
        self.offset_y + y * self.scale
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_frame: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Frame) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            frame,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(frame.width()).unwrap_or(i32::MAX),
            window_height: i32::try_from(frame.height()).unwrap_or(i32::MAX),
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut frame = frame;
            let background = to_macroquad_color(clear_color);
            let mut keyboard = KeyboardState::default();
            let mut fps_counter = FpsCounter::default();

            loop {
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let frame_input = keyboard.poll();
                let quit_requested = frame_input.quit_requested;
                update_frame(frame_dt, frame_input, &mut frame);
                if quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);
                let metrics = FrameMetrics::fit(
                    &frame,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                replay(&frame, &metrics);

                if let Some(FpsMetrics {
                    per_second,
                    trailing_ten_seconds,
                }) = fps_counter.record_frame(frame_dt)
                {
                    if show_fps {
                        info!(
                            fps = f64::from(per_second),
                            trailing_ten_seconds = f64::from(trailing_ten_seconds),
                            "frame rate"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn replay(frame: &Frame, metrics: &FrameMetrics) {
    for op in frame.ops() {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                color,
            } => macroquad::shapes::draw_rectangle(
                metrics.x(*x),
                metrics.y(*y),
                width * metrics.scale,
                height * metrics.scale,
                to_macroquad_color(*color),
            ),
            DrawOp::Text {
                text,
                x,
                y,
                size,
                color,
            } => {
                let size = size * metrics.scale;
                // Macroquad positions text by its baseline.
                let _ = macroquad::text::draw_text(
                    text,
                    metrics.x(*x),
                    metrics.y(*y) + size * 0.75,
                    size,
                    to_macroquad_color(*color),
                );
            }
        }
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_counter_reports_after_one_second() {
        let mut counter = FpsCounter::default();
        for _ in 0..59 {
            assert!(counter.record_frame(Duration::from_millis(16)).is_none());
        }
        let metrics = counter
            .record_frame(Duration::from_millis(100))
            .expect("a second has elapsed");
        assert!(metrics.per_second > 50.0 && metrics.per_second < 70.0);
        assert!(metrics.trailing_ten_seconds > 50.0);
    }

    #[test]
    fn frame_metrics_letterbox_wide_windows() {
        let frame = Frame::new(640, 480).expect("valid frame");
        let metrics = FrameMetrics::fit(&frame, 1280.0, 480.0);

        assert_eq!(metrics.scale, 1.0);
        assert_eq!(metrics.offset_x, 320.0);
        assert_eq!(metrics.offset_y, 0.0);
        assert_eq!(metrics.x(10.0), 330.0);
    }

    #[test]
    fn frame_metrics_scale_uniformly() {
        let frame = Frame::new(640, 480).expect("valid frame");
        let metrics = FrameMetrics::fit(&frame, 1280.0, 1200.0);

        assert_eq!(metrics.scale, 2.0);
        assert_eq!(metrics.offset_x, 0.0);
        assert_eq!(metrics.offset_y, 120.0);
        assert_eq!(metrics.y(100.0), 320.0);
    }

    #[test]
    fn vsync_maps_to_swap_interval() {
        assert_eq!(MacroquadBackend::new().with_vsync(true).swap_interval, Some(1));
        assert_eq!(MacroquadBackend::new().with_vsync(false).swap_interval, Some(0));
        assert_eq!(MacroquadBackend::new().swap_interval, None);
    }
}
