#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the dungeon crawler.
//!
//! The world owns the active level, the camera and the inventory. Nothing
//! outside this crate mutates them; systems describe changes as
//! [`Command`] values and [`apply`] executes them, reporting what happened as
//! [`Event`] values.

pub mod level;
pub mod navigation;

use dungeon_crawler_core::{Camera, Command, Event, Facing, Inventory, LevelData, Tile};
use glam::DVec2;
use tracing::{debug, info, warn};

/// Represents the authoritative dungeon crawler world state.
#[derive(Debug)]
pub struct World {
    level: Option<LevelData>,
    camera: Camera,
    inventory: Inventory,
}

impl World {
    /// Creates an empty world with no level loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: None,
            camera: Camera::new(DVec2::ZERO, Facing::North),
            inventory: Inventory::default(),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Camera and map item commands are ignored until a level has been loaded.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { level } => load_level(world, *level, out_events),
        Command::RotateCamera { angle } => {
            if world.level.is_none() {
                return;
            }
            world.camera.rotate(angle);
            out_events.push(Event::CameraRotated { angle });
        }
        Command::MoveCamera { distance } => {
            let Some(level) = world.level.as_ref() else {
                return;
            };

            let from = world.camera.position();
            let from_tile = world.camera.tile();
            let delta = world.camera.direction() * distance;
            let moved = world
                .camera
                .attempt_move(delta, |tile| level.blocks_movement(tile));
            let to = world.camera.position();
            out_events.push(Event::CameraMoved { from, to });
            if !moved {
                return;
            }

            let tile = world.camera.tile();
            if tile != from_tile {
                out_events.push(Event::TileEntered { tile });
                if level.tile(tile) == Some(Tile::Exit) {
                    info!(x = tile.x, y = tile.y, "exit reached");
                    out_events.push(Event::ExitReached { tile });
                }
            }
        }
        Command::AddToInventory { item } => {
            debug!(item = %item.id, name = %item.name, "item acquired");
            world.inventory.add(&item);
            out_events.push(Event::ItemAcquired { item: item.id });
        }
        Command::RemoveFromInventory { item } => {
            if world.inventory.remove(&item).is_some() {
                out_events.push(Event::InventoryItemRemoved { item });
            }
        }
        Command::RemoveMapItem { item } => {
            let Some(level) = world.level.as_mut() else {
                return;
            };
            if level.remove_item(&item).is_some() {
                out_events.push(Event::MapItemRemoved { item });
            }
        }
        Command::SetItemLocked { item, locked } => {
            let Some(target) = world.level.as_mut().and_then(|level| level.item_mut(&item))
            else {
                return;
            };
            target.properties.locked = Some(locked);
            out_events.push(Event::ItemLockChanged { item, locked });
        }
        Command::SetItemOpen { item, open } => {
            let Some(target) = world.level.as_mut().and_then(|level| level.item_mut(&item))
            else {
                return;
            };
            target.properties.open = Some(open);
            out_events.push(Event::ItemOpenChanged { item, open });
        }
        Command::SpillContents { container } => {
            let Some(level) = world.level.as_mut() else {
                return;
            };
            let Some(target) = level.item_mut(&container) else {
                return;
            };
            let contents = target.properties.contents.take().unwrap_or_default();
            if contents.is_empty() {
                return;
            }

            let (x, y) = (target.x, target.y);
            let mut spilled = Vec::with_capacity(contents.len());
            for mut item in contents {
                item.x = x;
                item.y = y;
                spilled.push(item.id.clone());
                level.items.push(item);
            }
            out_events.push(Event::ContentsSpilled {
                container,
                items: spilled,
            });
        }
        Command::RestoreHealth { amount } => {
            world.inventory.restore_health(amount);
            push_health(world, out_events);
        }
        Command::TakeDamage { amount } => {
            world.inventory.take_damage(amount);
            push_health(world, out_events);
        }
    }
}

fn load_level(world: &mut World, level: LevelData, out_events: &mut Vec<Event>) {
    if let Err(error) = level::validate(&level) {
        warn!(%error, "rejected level");
        out_events.push(Event::LevelRejected {
            reason: error.to_string(),
        });
        return;
    }

    let Some(start) = level.find_tile(Tile::Start) else {
        out_events.push(Event::LevelRejected {
            reason: "level has no start marker".to_owned(),
        });
        return;
    };

    world.camera = Camera::at_tile(start, level.start_facing);
    info!(
        name = level.name.as_deref().unwrap_or("unnamed"),
        width = level.width,
        height = level.height,
        items = level.items.len(),
        "level loaded"
    );
    out_events.push(Event::LevelLoaded {
        width: level.width,
        height: level.height,
        start,
        facing: level.start_facing,
    });
    world.level = Some(level);
}

fn push_health(world: &World, out_events: &mut Vec<Event>) {
    out_events.push(Event::HealthChanged {
        health: world.inventory.health(),
        max_health: world.inventory.max_health(),
    });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use dungeon_crawler_core::{Camera, Inventory, LevelData, MapItem, Tile, TileCoord};

    use super::World;

    /// Provides read-only access to the active level, if one is loaded.
    #[must_use]
    pub fn level(world: &World) -> Option<&LevelData> {
        world.level.as_ref()
    }

    /// Provides read-only access to the camera.
    #[must_use]
    pub fn camera(world: &World) -> &Camera {
        &world.camera
    }

    /// Provides read-only access to the carried items and health.
    #[must_use]
    pub fn inventory(world: &World) -> &Inventory {
        &world.inventory
    }

    /// Tile currently occupied by the camera.
    #[must_use]
    pub fn current_tile(world: &World) -> TileCoord {
        world.camera.tile()
    }

    /// Items lying on the camera's tile in map order.
    #[must_use]
    pub fn items_on_current_tile(world: &World) -> Vec<&MapItem> {
        let tile = current_tile(world);
        world
            .level
            .as_ref()
            .map(|level| level.items_on_tile(tile).collect())
            .unwrap_or_default()
    }

    /// Reports whether the camera stands on the exit marker.
    #[must_use]
    pub fn is_on_exit(world: &World) -> bool {
        world
            .level
            .as_ref()
            .and_then(|level| level.tile(current_tile(world)))
            == Some(Tile::Exit)
    }
}
