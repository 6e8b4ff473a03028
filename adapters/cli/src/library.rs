//! Built-in levels plus the user's saved maps.
//!
//! User maps live in a single JSON file holding an array of levels. The file
//! is rewritten in full on every save or delete, so the last writer wins.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{SecondsFormat, Utc};
use dungeon_crawler_core::LevelData;
use dungeon_crawler_world::level::{self, LevelError};
use thiserror::Error;
use tracing::{debug, info, warn};

const BUILT_IN_LEVELS: [&str; 1] = [include_str!("../assets/maps/level1.json")];

/// Errors raised by the map library.
#[derive(Debug, Error)]
pub(crate) enum LibraryError {
    /// The maps file could not be read or written.
    #[error("could not access map library at {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The maps file or a built-in level is not valid JSON.
    #[error("map library contains malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The level breaks a structural rule.
    #[error("invalid map: {0}")]
    InvalidLevel(#[from] LevelError),
    /// Saved maps are keyed by name.
    #[error("maps need a name before they can be saved")]
    MissingName,
}

/// Where a library entry came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Origin {
    BuiltIn,
    User,
}

#[derive(Debug)]
pub(crate) struct MapLibrary {
    path: PathBuf,
    built_in: Vec<LevelData>,
    user: Vec<LevelData>,
}

impl MapLibrary {
    /// Loads built-in levels and the user maps stored at `path`.
    ///
    /// A missing file is an empty library. Entries that fail validation are
    /// dropped with a warning.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        let path = path.into();

        let mut built_in = Vec::with_capacity(BUILT_IN_LEVELS.len());
        for json in BUILT_IN_LEVELS {
            let level: LevelData = serde_json::from_str(json)?;
            level::validate(&level)?;
            built_in.push(level);
        }

        let user = read_user_maps(&path)?;
        debug!(
            path = %path.display(),
            built_in = built_in.len(),
            user = user.len(),
            "map library opened"
        );

        Ok(Self {
            path,
            built_in,
            user,
        })
    }

    /// Every map, built-in levels first.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (Origin, &LevelData)> {
        self.built_in
            .iter()
            .map(|level| (Origin::BuiltIn, level))
            .chain(self.user.iter().map(|level| (Origin::User, level)))
    }

    /// First map called `name`, built-in levels first.
    pub(crate) fn get(&self, name: &str) -> Option<&LevelData> {
        self.entries()
            .map(|(_, level)| level)
            .find(|level| level.name.as_deref() == Some(name))
    }

    /// Default level to play when none is requested.
    pub(crate) fn first(&self) -> Option<&LevelData> {
        self.entries().map(|(_, level)| level).next()
    }

    /// Stores `level` under its name, replacing a user map with the same name.
    ///
    /// A missing `createdAt` is stamped with the current UTC time.
    pub(crate) fn save(&mut self, mut level: LevelData) -> Result<(), LibraryError> {
        level::validate(&level)?;
        let name = level.name.clone().ok_or(LibraryError::MissingName)?;
        if level.created_at.is_none() {
            level.created_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        }

        match self
            .user
            .iter_mut()
            .find(|existing| existing.name.as_deref() == Some(name.as_str()))
        {
            Some(existing) => *existing = level,
            None => self.user.push(level),
        }
        self.persist()?;
        info!(%name, path = %self.path.display(), "map saved");
        Ok(())
    }

    /// Removes the user map called `name`. Returns whether one was removed.
    pub(crate) fn delete(&mut self, name: &str) -> Result<bool, LibraryError> {
        let before = self.user.len();
        self.user.retain(|level| level.name.as_deref() != Some(name));
        if self.user.len() == before {
            return Ok(false);
        }
        self.persist()?;
        info!(%name, path = %self.path.display(), "map deleted");
        Ok(true)
    }

    fn persist(&self) -> Result<(), LibraryError> {
        let json = serde_json::to_string_pretty(&self.user)?;
        fs::write(&self.path, json).map_err(|source| LibraryError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

fn read_user_maps(path: &Path) -> Result<Vec<LevelData>, LibraryError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(LibraryError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let entries: Vec<serde_json::Value> = serde_json::from_str(&contents)?;
    let total = entries.len();
    let maps: Vec<LevelData> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<LevelData>(entry).ok())
        .filter(level::is_valid)
        .collect();
    if maps.len() != total {
        warn!(
            path = %path.display(),
            dropped = total - maps.len(),
            "skipped invalid saved maps"
        );
    }
    Ok(maps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_crawler_core::{Facing, ItemKind};
    use dungeon_crawler_world::navigation::exit_reachable;

    fn scratch_path(test: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "dungeon-crawler-library-{test}-{}.json",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    fn named(name: &str) -> LevelData {
        let mut level = level::create_empty_map(6, 6, Facing::East);
        level.name = Some(name.to_owned());
        level
    }

    #[test]
    fn built_in_level_is_valid_and_solvable() {
        let library = MapLibrary::open(scratch_path("built-in")).expect("library opens");
        let level = library.get("The Cellar").expect("built-in level present");

        assert!(exit_reachable(level), "exit must be reachable from start");
        assert!(level.items.iter().any(|item| item.kind == ItemKind::Key));
        let chest = level
            .items
            .iter()
            .find(|item| item.kind == ItemKind::Chest)
            .expect("chest present");
        assert!(chest.is_locked());
        for item in &level.items {
            assert!(
                !level.blocks_movement(item.tile()),
                "{} sits inside a wall",
                item.name
            );
        }
    }

    #[test]
    fn saved_maps_survive_reopening() {
        let path = scratch_path("reopen");
        let mut library = MapLibrary::open(&path).expect("library opens");
        library.save(named("vault")).expect("save succeeds");

        let reopened = MapLibrary::open(&path).expect("library reopens");
        let vault = reopened.get("vault").expect("saved map present");
        assert!(vault.created_at.is_some(), "save stamps createdAt");
        assert_eq!(
            reopened
                .entries()
                .filter(|(origin, _)| *origin == Origin::User)
                .count(),
            1
        );
        let _ = fs::remove_file(path);
    }

    #[test]
    fn saving_an_existing_name_replaces_it() {
        let path = scratch_path("replace");
        let mut library = MapLibrary::open(&path).expect("library opens");
        library.save(named("vault")).expect("first save");

        let mut wider = level::create_empty_map(9, 6, Facing::East);
        wider.name = Some("vault".to_owned());
        wider.created_at = Some("2024-01-01T00:00:00.000Z".to_owned());
        library.save(wider).expect("second save");

        let vault = library.get("vault").expect("map present");
        assert_eq!(vault.width, 9);
        assert_eq!(vault.created_at.as_deref(), Some("2024-01-01T00:00:00.000Z"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn delete_reports_whether_a_map_was_removed() {
        let path = scratch_path("delete");
        let mut library = MapLibrary::open(&path).expect("library opens");
        library.save(named("vault")).expect("save succeeds");

        assert!(library.delete("vault").expect("delete succeeds"));
        assert!(!library.delete("vault").expect("second delete succeeds"));
        assert!(library.get("vault").is_none());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn invalid_and_unnamed_maps_are_refused() {
        let path = scratch_path("refuse");
        let mut library = MapLibrary::open(&path).expect("library opens");

        let mut broken = named("broken");
        broken.map[1][1] = dungeon_crawler_core::Tile::Empty;
        assert!(matches!(
            library.save(broken),
            Err(LibraryError::InvalidLevel(_))
        ));

        let mut unnamed = named("x");
        unnamed.name = None;
        assert!(matches!(library.save(unnamed), Err(LibraryError::MissingName)));
        assert!(!path.exists(), "failed saves write nothing");
    }

    #[test]
    fn invalid_entries_in_the_file_are_skipped() {
        let path = scratch_path("filter");
        let good = serde_json::to_value(named("good")).expect("serialise");
        let contents = serde_json::json!([good, { "width": 3 }]).to_string();
        fs::write(&path, contents).expect("write fixture");

        let library = MapLibrary::open(&path).expect("library opens");
        assert!(library.get("good").is_some());
        assert_eq!(
            library
                .entries()
                .filter(|(origin, _)| *origin == Origin::User)
                .count(),
            1
        );
        let _ = fs::remove_file(path);
    }
}
