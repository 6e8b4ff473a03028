#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the dungeon crawler engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems translate player intents
//! into [`Command`] values, the world executes those commands via its `apply`
//! entry point, and then broadcasts [`Event`] values that systems and the
//! session react to. The map data model ([`LevelData`], [`MapItem`]) and the
//! continuous [`Camera`] live here so every crate agrees on their shape.

mod camera;
mod item;
mod level;

use std::fmt;

use glam::DVec2;

pub use camera::{Camera, FIELD_OF_VIEW_SCALE};
pub use item::{Inventory, ItemId, ItemKind, ItemProperties, MapItem, DEFAULT_MAX_HEALTH};
pub use level::{Facing, LevelData, Tile, TileCoord};

/// Message shown on the heads-up display when the player stands on the exit.
pub const EXIT_FOUND_MESSAGE: &str = "EXIT FOUND";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the active level and places the camera on its start marker.
    LoadLevel {
        /// Level that should become active.
        level: Box<LevelData>,
    },
    /// Rotates the camera direction and plane by the provided angle in radians.
    RotateCamera {
        /// Signed rotation; positive values turn clockwise on screen.
        angle: f64,
    },
    /// Moves the camera along its current direction, checking each axis for walls.
    MoveCamera {
        /// Signed distance in tiles; negative values walk backwards.
        distance: f64,
    },
    /// Places a copy of the item into the inventory.
    AddToInventory {
        /// Item being picked up.
        item: MapItem,
    },
    /// Removes an item from the inventory.
    RemoveFromInventory {
        /// Identifier of the carried item.
        item: ItemId,
    },
    /// Removes an item from the level's item list.
    RemoveMapItem {
        /// Identifier of the item on the map.
        item: ItemId,
    },
    /// Updates the `locked` flag of a map item in place.
    SetItemLocked {
        /// Identifier of the item on the map.
        item: ItemId,
        /// New lock state.
        locked: bool,
    },
    /// Updates the `open` flag of a map item in place.
    SetItemOpen {
        /// Identifier of the item on the map.
        item: ItemId,
        /// New open state.
        open: bool,
    },
    /// Moves the contents of a container onto the container's tile.
    SpillContents {
        /// Identifier of the container on the map.
        container: ItemId,
    },
    /// Restores health, saturating at the inventory maximum.
    RestoreHealth {
        /// Amount of health to restore.
        amount: u32,
    },
    /// Removes health, saturating at zero.
    TakeDamage {
        /// Amount of health to remove.
        amount: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a new level became active.
    LevelLoaded {
        /// Number of columns in the level grid.
        width: u32,
        /// Number of rows in the level grid.
        height: u32,
        /// Tile holding the start marker.
        start: TileCoord,
        /// Initial facing of the camera.
        facing: Facing,
    },
    /// Reports that a level failed validation and was not loaded.
    LevelRejected {
        /// Human readable validation failure.
        reason: String,
    },
    /// Confirms that the camera rotated.
    CameraRotated {
        /// Angle applied to direction and plane.
        angle: f64,
    },
    /// Confirms that a move was attempted, including blocked attempts.
    CameraMoved {
        /// Position before the move.
        from: DVec2,
        /// Position after the per-axis collision checks.
        to: DVec2,
    },
    /// The camera crossed into a different tile.
    TileEntered {
        /// Tile the camera now occupies.
        tile: TileCoord,
    },
    /// The camera entered the exit marker tile.
    ExitReached {
        /// Tile holding the exit marker.
        tile: TileCoord,
    },
    /// An item was copied into the inventory.
    ItemAcquired {
        /// Identifier of the acquired item.
        item: ItemId,
    },
    /// An item left the inventory.
    InventoryItemRemoved {
        /// Identifier of the removed item.
        item: ItemId,
    },
    /// An item was removed from the level's item list.
    MapItemRemoved {
        /// Identifier of the removed item.
        item: ItemId,
    },
    /// A map item's lock state changed.
    ItemLockChanged {
        /// Identifier of the item.
        item: ItemId,
        /// New lock state.
        locked: bool,
    },
    /// A map item's open state changed.
    ItemOpenChanged {
        /// Identifier of the item.
        item: ItemId,
        /// New open state.
        open: bool,
    },
    /// A container's contents were placed on its tile.
    ContentsSpilled {
        /// Identifier of the container.
        container: ItemId,
        /// Items that now lie on the map, in their original order.
        items: Vec<ItemId>,
    },
    /// Player health changed.
    HealthChanged {
        /// Current health.
        health: u32,
        /// Upper bound for health.
        max_health: u32,
    },
}

/// Canonical verbs understood by the text command engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Open a chest or door.
    Open,
    /// Close a chest or door.
    Close,
    /// Pick an item up.
    Get,
    /// Put a carried item down.
    Drop,
    /// Use an item such as a bed.
    Use,
    /// Examine an item.
    Look,
    /// Walk somewhere.
    Go,
    /// Unlock a locked chest or door with a key.
    Unlock,
    /// Lock a chest or door.
    Lock,
    /// Push an item.
    Push,
    /// Pull an item.
    Pull,
    /// Eat food.
    Eat,
    /// Drink something.
    Drink,
    /// Read an item's inscription.
    Read,
    /// Give an item away.
    Give,
    /// Put an item somewhere.
    Put,
    /// List carried items.
    Inventory,
}

impl Verb {
    /// Every canonical verb in suggestion order.
    pub const ALL: [Verb; 17] = [
        Verb::Open,
        Verb::Close,
        Verb::Get,
        Verb::Drop,
        Verb::Use,
        Verb::Look,
        Verb::Go,
        Verb::Unlock,
        Verb::Lock,
        Verb::Push,
        Verb::Pull,
        Verb::Eat,
        Verb::Drink,
        Verb::Read,
        Verb::Give,
        Verb::Put,
        Verb::Inventory,
    ];

    /// Lowercase word used when echoing the verb back to the player.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Get => "get",
            Self::Drop => "drop",
            Self::Use => "use",
            Self::Look => "look",
            Self::Go => "go",
            Self::Unlock => "unlock",
            Self::Lock => "lock",
            Self::Push => "push",
            Self::Pull => "pull",
            Self::Eat => "eat",
            Self::Drink => "drink",
            Self::Read => "read",
            Self::Give => "give",
            Self::Put => "put",
            Self::Inventory => "inventory",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Narrative outcome of a text command.
///
/// Failures are expected game outcomes ("The chest is locked.") rather than
/// system errors, so they are reported through this type instead of `Err`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandResponse {
    /// Whether the command had its intended effect.
    pub success: bool,
    /// Message displayed to the player.
    pub message: String,
}

impl CommandResponse {
    /// Creates a successful response.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Creates a failed response.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandResponse, Verb};

    #[test]
    fn verb_words_are_unique() {
        let mut words: Vec<_> = Verb::ALL.iter().map(|verb| verb.as_str()).collect();
        words.sort_unstable();
        words.dedup();
        assert_eq!(words.len(), Verb::ALL.len());
    }

    #[test]
    fn response_constructors_set_success_flag() {
        assert!(CommandResponse::success("ok").success);
        let failure = CommandResponse::failure("nope");
        assert!(!failure.success);
        assert_eq!(failure.message, "nope");
    }
}
