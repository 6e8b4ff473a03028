//! Optional TOML settings file.
//!
//! Every field has a default so an empty or partial file is valid:
//!
//! ```toml
//! [screen]
//! width = 800
//! height = 600
//!
//! [movement]
//! move_speed = 0.15
//! rot_speed = 0.1
//!
//! [palette]
//! wall = "#a8a090"
//!
//! [library]
//! path = "maps.json"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use dungeon_crawler_rendering::{Color, Palette};
use dungeon_crawler_system_movement::{DEFAULT_MOVE_SPEED, DEFAULT_ROT_SPEED};
use dungeon_crawler_system_session::DEFAULT_HISTORY_LEN;
use serde::Deserialize;

/// File looked up in the working directory when `--config` is absent.
const DEFAULT_CONFIG_PATH: &str = "dungeon-crawler.toml";

/// User maps file used when no library path is configured.
const DEFAULT_LIBRARY_PATH: &str = "dungeon-crawler-maps.json";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) screen: ScreenSettings,
    pub(crate) movement: MovementSettings,
    pub(crate) console: ConsoleSettings,
    pub(crate) palette: PaletteSettings,
    pub(crate) library: LibrarySettings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ScreenSettings {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MovementSettings {
    pub(crate) move_speed: f64,
    pub(crate) rot_speed: f64,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            move_speed: DEFAULT_MOVE_SPEED,
            rot_speed: DEFAULT_ROT_SPEED,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ConsoleSettings {
    pub(crate) history: usize,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            history: DEFAULT_HISTORY_LEN,
        }
    }
}

/// Hex colour overrides; unset entries keep the renderer's defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PaletteSettings {
    pub(crate) ceiling: Option<String>,
    pub(crate) floor: Option<String>,
    pub(crate) wall: Option<String>,
    pub(crate) exit: Option<String>,
    pub(crate) text: Option<String>,
    pub(crate) minimum_brightness: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LibrarySettings {
    pub(crate) path: Option<PathBuf>,
}

impl Settings {
    /// Reads `path`, or the default file when it exists, or falls back to defaults.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse settings in {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse settings toml contents")
    }

    /// Renderer palette with the configured overrides applied.
    pub(crate) fn palette(&self) -> Result<Palette> {
        let mut palette = Palette::default();
        let overrides = &self.palette;
        apply_hex(&mut palette.ceiling, overrides.ceiling.as_deref(), "ceiling")?;
        apply_hex(&mut palette.floor, overrides.floor.as_deref(), "floor")?;
        apply_hex(&mut palette.wall, overrides.wall.as_deref(), "wall")?;
        apply_hex(&mut palette.exit, overrides.exit.as_deref(), "exit")?;
        apply_hex(&mut palette.text, overrides.text.as_deref(), "text")?;
        if let Some(brightness) = overrides.minimum_brightness {
            palette.minimum_brightness = brightness.clamp(0.0, 1.0);
        }
        Ok(palette)
    }

    /// Location of the user maps file.
    pub(crate) fn library_path(&self) -> PathBuf {
        self.library
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LIBRARY_PATH))
    }
}

fn apply_hex(slot: &mut Color, value: Option<&str>, name: &str) -> Result<()> {
    if let Some(value) = value {
        *slot = Color::from_hex(value).with_context(|| format!("invalid {name} colour"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let settings = Settings::parse("").expect("empty settings parse");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.screen.width, 800);
        assert_eq!(settings.movement.move_speed, DEFAULT_MOVE_SPEED);
        assert_eq!(settings.console.history, DEFAULT_HISTORY_LEN);
        assert_eq!(settings.library_path(), PathBuf::from(DEFAULT_LIBRARY_PATH));
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let settings = Settings::parse(
            r##"
            [screen]
            width = 1024

            [movement]
            rot_speed = 0.05

            [palette]
            wall = "#ff0000"

            [library]
            path = "custom.json"
            "##,
        )
        .expect("settings parse");

        assert_eq!(settings.screen.width, 1024);
        assert_eq!(settings.screen.height, 600);
        assert_eq!(settings.movement.move_speed, DEFAULT_MOVE_SPEED);
        assert_eq!(settings.movement.rot_speed, 0.05);
        assert_eq!(settings.library_path(), PathBuf::from("custom.json"));

        let palette = settings.palette().expect("palette builds");
        assert_eq!(palette.wall, Color::from_rgb_u8(0xff, 0, 0));
        assert_eq!(palette.floor, Palette::default().floor);
    }

    #[test]
    fn unknown_keys_and_bad_colours_are_reported() {
        assert!(Settings::parse("[screen]\ndepth = 3").is_err());

        let settings = Settings::parse("[palette]\nceiling = \"not a colour\"")
            .expect("strings parse");
        assert!(settings.palette().is_err());
    }
}
