#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static catalog of item kinds and helpers for creating and naming items.

use dungeon_crawler_core::{ItemId, ItemKind, ItemProperties, MapItem};
use uuid::Uuid;

/// Catalog entry describing the defaults for one item kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemDefinition {
    /// Kind the definition applies to.
    pub kind: ItemKind,
    /// Name used when an item is created without one.
    pub default_name: &'static str,
    /// Description used by `look` and `read` when none is provided.
    pub default_description: &'static str,
    /// Parser aliases used when the item carries none.
    pub default_aliases: &'static [&'static str],
    default_locked: Option<bool>,
    default_open: Option<bool>,
    default_health_restore: Option<f64>,
    default_damage: Option<f64>,
}

impl ItemDefinition {
    const fn plain(
        kind: ItemKind,
        default_name: &'static str,
        default_description: &'static str,
        default_aliases: &'static [&'static str],
    ) -> Self {
        Self {
            kind,
            default_name,
            default_description,
            default_aliases,
            default_locked: None,
            default_open: None,
            default_health_restore: None,
            default_damage: None,
        }
    }

    const fn closable(mut self) -> Self {
        self.default_locked = Some(false);
        self.default_open = Some(false);
        self
    }

    const fn restoring(mut self, amount: f64) -> Self {
        self.default_health_restore = Some(amount);
        self
    }

    const fn damaging(mut self, amount: f64) -> Self {
        self.default_damage = Some(amount);
        self
    }

    /// Behavioural properties every new item of this kind starts with.
    #[must_use]
    pub fn default_properties(&self) -> ItemProperties {
        ItemProperties {
            locked: self.default_locked,
            open: self.default_open,
            health_restore: self.default_health_restore,
            damage: self.default_damage,
            ..ItemProperties::default()
        }
    }

    /// Default aliases as owned strings.
    #[must_use]
    pub fn aliases(&self) -> Vec<String> {
        self.default_aliases
            .iter()
            .map(|alias| (*alias).to_owned())
            .collect()
    }
}

const DEFINITIONS: [ItemDefinition; 8] = [
    ItemDefinition::plain(ItemKind::Key, "key", "A key", &["key", "keys"]),
    ItemDefinition::plain(ItemKind::Chest, "chest", "A chest", &["chest", "box", "trunk"])
        .closable(),
    ItemDefinition::plain(ItemKind::Door, "door", "A door", &["door", "gate"]).closable(),
    ItemDefinition::plain(ItemKind::Bed, "bed", "A bed", &["bed", "cot"]).restoring(50.0),
    ItemDefinition::plain(ItemKind::Food, "food", "Food", &["food", "rations", "meal"])
        .restoring(25.0),
    ItemDefinition::plain(
        ItemKind::Weapon,
        "weapon",
        "A weapon",
        &["weapon", "sword", "knife"],
    )
    .damaging(10.0),
    ItemDefinition::plain(ItemKind::Trap, "trap", "A trap", &["trap", "pit"]).damaging(20.0),
    ItemDefinition::plain(
        ItemKind::Switch,
        "switch",
        "A switch",
        &["switch", "button", "lever"],
    ),
];

/// Looks up the catalog entry for `kind`.
#[must_use]
pub fn definition(kind: ItemKind) -> &'static ItemDefinition {
    match kind {
        ItemKind::Key => &DEFINITIONS[0],
        ItemKind::Chest => &DEFINITIONS[1],
        ItemKind::Door => &DEFINITIONS[2],
        ItemKind::Bed => &DEFINITIONS[3],
        ItemKind::Food => &DEFINITIONS[4],
        ItemKind::Weapon => &DEFINITIONS[5],
        ItemKind::Trap => &DEFINITIONS[6],
        ItemKind::Switch => &DEFINITIONS[7],
    }
}

/// Every catalog entry in kind order.
#[must_use]
pub fn definitions() -> &'static [ItemDefinition] {
    &DEFINITIONS
}

/// Creates a new item, merging `overrides` over the kind's defaults.
///
/// Missing or blank names, aliases and descriptions fall back to the catalog.
/// The identifier combines the kind, position and a random suffix so two
/// items created on the same tile never collide.
#[must_use]
pub fn create_item(
    kind: ItemKind,
    x: f64,
    y: f64,
    name: Option<&str>,
    overrides: ItemProperties,
) -> MapItem {
    let definition = definition(kind);
    let defaults = definition.default_properties();

    let aliases = overrides
        .aliases
        .filter(|aliases| !aliases.is_empty())
        .unwrap_or_else(|| definition.aliases());
    let description = overrides
        .description
        .filter(|description| !description.trim().is_empty())
        .unwrap_or_else(|| definition.default_description.to_owned());

    let properties = ItemProperties {
        locked: overrides.locked.or(defaults.locked),
        key_id: overrides.key_id,
        health_restore: overrides.health_restore.or(defaults.health_restore),
        damage: overrides.damage.or(defaults.damage),
        description: Some(description),
        aliases: Some(aliases),
        contents: overrides.contents,
        open: overrides.open.or(defaults.open),
    };

    let name = name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(definition.default_name);

    MapItem {
        id: ItemId::new(format!("{kind}-{x}-{y}-{}", Uuid::new_v4().simple())),
        kind,
        name: name.to_owned(),
        x,
        y,
        properties,
    }
}

/// Aliases the parser accepts for `item`: its own, else the catalog's.
#[must_use]
pub fn aliases_for(item: &MapItem) -> Vec<String> {
    match item.properties.aliases.as_deref() {
        Some(aliases) if !aliases.is_empty() => aliases.to_vec(),
        _ => definition(item.kind).aliases(),
    }
}

/// Non-blank description stored on the item.
#[must_use]
pub fn description_for(item: &MapItem) -> Option<&str> {
    item.properties
        .description
        .as_deref()
        .filter(|description| !description.trim().is_empty())
}

/// Case-insensitive match of `term` against the item's name or aliases.
///
/// The name matches when it contains the term; an alias matches when it
/// equals or contains the term.
#[must_use]
pub fn matches_item_name(item: &MapItem, term: &str) -> bool {
    let normalized = term.trim().to_lowercase();
    if item.name.to_lowercase().contains(&normalized) {
        return true;
    }

    aliases_for(item).iter().any(|alias| {
        let alias = alias.to_lowercase();
        alias == normalized || alias.contains(&normalized)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_kind_in_order() {
        let kinds: Vec<_> = definitions().iter().map(|entry| entry.kind).collect();
        assert_eq!(kinds, ItemKind::ALL.to_vec());
        for kind in ItemKind::ALL {
            assert_eq!(definition(kind).kind, kind);
            assert_eq!(definition(kind).default_name, kind.as_str());
        }
    }

    #[test]
    fn defaults_follow_kind() {
        assert_eq!(definition(ItemKind::Bed).default_properties().health_restore, Some(50.0));
        assert_eq!(definition(ItemKind::Food).default_properties().health_restore, Some(25.0));
        assert_eq!(definition(ItemKind::Weapon).default_properties().damage, Some(10.0));
        assert_eq!(definition(ItemKind::Trap).default_properties().damage, Some(20.0));

        let chest = definition(ItemKind::Chest).default_properties();
        assert_eq!((chest.locked, chest.open), (Some(false), Some(false)));
        assert!(definition(ItemKind::Switch).default_properties().is_empty());
    }
}
