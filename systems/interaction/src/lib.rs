#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Item interaction engine.
//!
//! Given a verb, the item it targets and the player's inventory, the engine
//! decides the narrative response and emits the world commands that realise
//! it. It never mutates state itself.

use dungeon_crawler_core::{
    Command, CommandResponse, Event, Inventory, ItemKind, LevelData, MapItem, Verb,
};
use dungeon_crawler_system_item_registry::{definition, description_for};
use tracing::debug;

/// Pure system that resolves verbs against items and reacts to tile entry.
#[derive(Debug, Default)]
pub struct Interaction;

impl Interaction {
    /// Creates the interaction system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Executes `verb` against `target`.
    ///
    /// `target` may be a map item or an inventory copy; consumables are
    /// removed from wherever they were found.
    pub fn execute(
        &self,
        verb: Verb,
        target: &MapItem,
        inventory: &Inventory,
        out: &mut Vec<Command>,
    ) -> CommandResponse {
        let name = &target.name;
        match verb {
            Verb::Get => take(target, out),
            Verb::Look => CommandResponse::success(
                description_for(target).map_or_else(|| format!("A {name}."), str::to_owned),
            ),
            Verb::Read => match description_for(target) {
                Some(text) => CommandResponse::success(text),
                None => CommandResponse::failure(format!("There's nothing to read on the {name}.")),
            },
            Verb::Open => open(target, out),
            Verb::Close => close(target, out),
            Verb::Unlock => unlock(target, inventory, out),
            Verb::Use => match target.kind {
                ItemKind::Bed => {
                    let amount = restore_amount(target);
                    out.push(Command::RestoreHealth { amount });
                    CommandResponse::success(format!(
                        "You rest on the bed and restore {amount} health."
                    ))
                }
                ItemKind::Food => eat(target, out),
                _ => CommandResponse::failure(format!("You can't use the {name} that way.")),
            },
            Verb::Eat => match target.kind {
                ItemKind::Food => eat(target, out),
                _ => CommandResponse::failure(format!("You can't eat the {name}.")),
            },
            Verb::Inventory => list_inventory(inventory),
            Verb::Drop
            | Verb::Go
            | Verb::Lock
            | Verb::Push
            | Verb::Pull
            | Verb::Drink
            | Verb::Give
            | Verb::Put => CommandResponse::failure(format!("I don't know how to {verb} that.")),
        }
    }

    /// Applies trap damage for every tile the camera entered.
    pub fn handle(&self, events: &[Event], level: Option<&LevelData>, out: &mut Vec<Command>) {
        let Some(level) = level else {
            return;
        };

        for event in events {
            let Event::TileEntered { tile } = event else {
                continue;
            };
            for trap in level
                .items_on_tile(*tile)
                .filter(|item| item.kind == ItemKind::Trap)
            {
                let amount = trap_damage(trap);
                debug!(trap = %trap.id, amount, "trap triggered");
                out.push(Command::TakeDamage { amount });
            }
        }
    }
}

/// Lists the carried items by name.
#[must_use]
pub fn list_inventory(inventory: &Inventory) -> CommandResponse {
    if inventory.is_empty() {
        return CommandResponse::success("You are carrying nothing.");
    }
    let names: Vec<&str> = inventory.items().iter().map(|item| item.name.as_str()).collect();
    CommandResponse::success(format!("You are carrying: {}", names.join(", ")))
}

fn take(target: &MapItem, out: &mut Vec<Command>) -> CommandResponse {
    if !target.kind.is_portable() || !target.is_on_map() {
        return CommandResponse::failure(format!("You can't take the {}.", target.name));
    }

    out.push(Command::AddToInventory {
        item: target.clone(),
    });
    out.push(Command::RemoveMapItem {
        item: target.id.clone(),
    });
    CommandResponse::success(format!("You take the {}.", target.name))
}

fn open(target: &MapItem, out: &mut Vec<Command>) -> CommandResponse {
    let noun = match target.kind {
        ItemKind::Chest => "chest",
        ItemKind::Door => "door",
        _ => return CommandResponse::failure(format!("You can't open the {}.", target.name)),
    };

    if target.is_locked() {
        return CommandResponse::failure(format!("The {noun} is locked."));
    }
    if target.is_open() {
        return CommandResponse::failure(format!("The {noun} is already open."));
    }

    out.push(Command::SetItemOpen {
        item: target.id.clone(),
        open: true,
    });

    let contents = target.properties.contents.as_deref().unwrap_or_default();
    if contents.is_empty() {
        return CommandResponse::success(format!("You open the {noun}."));
    }

    out.push(Command::SpillContents {
        container: target.id.clone(),
    });
    let names: Vec<&str> = contents.iter().map(|item| item.name.as_str()).collect();
    CommandResponse::success(format!(
        "You open the {noun}. Inside you find: {}.",
        names.join(", ")
    ))
}

fn close(target: &MapItem, out: &mut Vec<Command>) -> CommandResponse {
    if !matches!(target.kind, ItemKind::Chest | ItemKind::Door) {
        return CommandResponse::failure(format!("You can't close the {}.", target.name));
    }
    if !target.is_open() {
        return CommandResponse::failure(format!("The {} is already closed.", target.name));
    }

    out.push(Command::SetItemOpen {
        item: target.id.clone(),
        open: false,
    });
    CommandResponse::success(format!("You close the {}.", target.name))
}

fn unlock(target: &MapItem, inventory: &Inventory, out: &mut Vec<Command>) -> CommandResponse {
    let name = &target.name;
    if !target.is_locked() {
        return CommandResponse::failure(format!("The {name} is not locked."));
    }
    let Some(key) = target.properties.key_id.as_ref() else {
        return CommandResponse::failure(format!("The {name} can't be unlocked."));
    };
    if !inventory.contains(key) {
        return CommandResponse::failure(format!(
            "The {name} is locked and you don't have the key."
        ));
    }

    out.push(Command::SetItemLocked {
        item: target.id.clone(),
        locked: false,
    });
    CommandResponse::success(format!("You unlock the {name} with the key."))
}

fn eat(target: &MapItem, out: &mut Vec<Command>) -> CommandResponse {
    let amount = restore_amount(target);
    out.push(Command::RestoreHealth { amount });
    out.push(if target.is_on_map() {
        Command::RemoveMapItem {
            item: target.id.clone(),
        }
    } else {
        Command::RemoveFromInventory {
            item: target.id.clone(),
        }
    });
    CommandResponse::success(format!(
        "You eat the {} and restore {amount} health.",
        target.name
    ))
}

fn restore_amount(item: &MapItem) -> u32 {
    item.properties
        .health_restore_points()
        .filter(|amount| *amount > 0)
        .or_else(|| definition(item.kind).default_properties().health_restore_points())
        .unwrap_or_default()
}

fn trap_damage(item: &MapItem) -> u32 {
    item.properties
        .damage_points()
        .filter(|amount| *amount > 0)
        .or_else(|| definition(item.kind).default_properties().damage_points())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_crawler_core::{ItemId, ItemProperties};

    fn item(kind: ItemKind, name: &str) -> MapItem {
        MapItem {
            id: ItemId::new(format!("{kind}-1")),
            kind,
            name: name.to_owned(),
            x: 1.0,
            y: 1.0,
            properties: ItemProperties::default(),
        }
    }

    #[test]
    fn defaults_fill_missing_amounts() {
        assert_eq!(restore_amount(&item(ItemKind::Bed, "cot")), 50);
        assert_eq!(restore_amount(&item(ItemKind::Food, "bread")), 25);
        assert_eq!(trap_damage(&item(ItemKind::Trap, "pit")), 20);
    }

    #[test]
    fn look_without_description_names_the_item() {
        let mut out = Vec::new();
        let response = Interaction::new().execute(
            Verb::Look,
            &item(ItemKind::Switch, "lever"),
            &Inventory::default(),
            &mut out,
        );
        assert_eq!(response, CommandResponse::success("A lever."));
        assert!(out.is_empty());
    }

    #[test]
    fn unsupported_verbs_are_reported() {
        let mut out = Vec::new();
        let response = Interaction::new().execute(
            Verb::Push,
            &item(ItemKind::Chest, "chest"),
            &Inventory::default(),
            &mut out,
        );
        assert_eq!(
            response,
            CommandResponse::failure("I don't know how to push that.")
        );
    }

    #[test]
    fn inventory_listing_joins_names() {
        let mut inventory = Inventory::default();
        assert_eq!(
            list_inventory(&inventory).message,
            "You are carrying nothing."
        );
        inventory.add(&item(ItemKind::Key, "brass key"));
        inventory.add(&item(ItemKind::Food, "bread"));
        assert_eq!(
            list_inventory(&inventory).message,
            "You are carrying: brass key, bread"
        );
    }
}
