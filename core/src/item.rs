use std::fmt;

use serde::{Deserialize, Serialize};

use crate::level::TileCoord;

/// Health every inventory starts with and cannot exceed by default.
pub const DEFAULT_MAX_HEALTH: u32 = 100;

/// The eight kinds of interactable entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Opens a matching locked chest or door.
    Key,
    /// Container that may be locked and may hold other items.
    Chest,
    /// Door that may be locked.
    Door,
    /// Resting spot that restores health.
    Bed,
    /// Edible item that restores health.
    Food,
    /// Carryable weapon.
    Weapon,
    /// Hazard that damages the player.
    Trap,
    /// Lever or button.
    Switch,
}

impl ItemKind {
    /// Every item kind in catalog order.
    pub const ALL: [ItemKind; 8] = [
        ItemKind::Key,
        ItemKind::Chest,
        ItemKind::Door,
        ItemKind::Bed,
        ItemKind::Food,
        ItemKind::Weapon,
        ItemKind::Trap,
        ItemKind::Switch,
    ];

    /// Lowercase identifier used by the map file format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Chest => "chest",
            Self::Door => "door",
            Self::Bed => "bed",
            Self::Food => "food",
            Self::Weapon => "weapon",
            Self::Trap => "trap",
            Self::Switch => "switch",
        }
    }

    /// Reports whether items of this kind can be picked up.
    #[must_use]
    pub const fn is_portable(self) -> bool {
        matches!(self, Self::Key | Self::Food | Self::Weapon)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identifier assigned to a map item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wraps the provided identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrowed string form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional behavioural properties of an item.
///
/// Every field is optional in the file format; the item registry documents
/// the per-kind defaults applied when an item is created.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProperties {
    /// Whether a chest or door needs a key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// Identifier of the key item that unlocks this item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<ItemId>,
    /// Health restored by beds and food. Any JSON number is accepted; see
    /// [`ItemProperties::health_restore_points`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_restore: Option<f64>,
    /// Damage dealt by traps and weapons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<f64>,
    /// Text shown by `look` and `read`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Alternate names accepted by the parser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
    /// Items held by a container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<MapItem>>,
    /// Whether a chest or door is open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
}

impl ItemProperties {
    /// Reports whether no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Health restore rounded to whole points, or `None` when unset or not finite.
    #[must_use]
    pub fn health_restore_points(&self) -> Option<u32> {
        self.health_restore.and_then(whole_points)
    }

    /// Damage rounded to whole points, or `None` when unset or not finite.
    #[must_use]
    pub fn damage_points(&self) -> Option<u32> {
        self.damage.and_then(whole_points)
    }
}

/// Rounds a stat to the nearest point, clamping negatives to zero.
fn whole_points(value: f64) -> Option<u32> {
    if !value.is_finite() {
        return None;
    }
    Some(value.round().clamp(0.0, f64::from(u32::MAX)) as u32)
}

/// Item placed on a level or carried in the inventory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapItem {
    /// Unique identifier.
    pub id: ItemId,
    /// Kind of item.
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Display name, e.g. "brass key".
    pub name: String,
    /// Column position in tile units.
    pub x: f64,
    /// Row position in tile units.
    pub y: f64,
    /// Behavioural properties.
    #[serde(default, skip_serializing_if = "ItemProperties::is_empty")]
    pub properties: ItemProperties,
}

impl MapItem {
    /// Coordinate stored on inventory copies to mark them as off the map.
    pub const INVENTORY_SENTINEL: f64 = -1.0;

    /// Tile containing the item.
    #[must_use]
    pub fn tile(&self) -> TileCoord {
        TileCoord::new(self.x.floor() as i64, self.y.floor() as i64)
    }

    /// Reports whether the item lies on the map rather than in an inventory.
    #[must_use]
    pub fn is_on_map(&self) -> bool {
        self.x != Self::INVENTORY_SENTINEL || self.y != Self::INVENTORY_SENTINEL
    }

    /// Copy of the item carrying the inventory position sentinel.
    #[must_use]
    pub fn to_inventory_copy(&self) -> Self {
        Self {
            x: Self::INVENTORY_SENTINEL,
            y: Self::INVENTORY_SENTINEL,
            ..self.clone()
        }
    }

    /// Whether the item is currently locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.properties.locked.unwrap_or(false)
    }

    /// Whether the item is currently open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.properties.open.unwrap_or(false)
    }

    /// Aliases stored on the item, empty when none are set.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        self.properties.aliases.as_deref().unwrap_or(&[])
    }
}

/// Items carried by the player together with their health.
#[derive(Clone, Debug, PartialEq)]
pub struct Inventory {
    items: Vec<MapItem>,
    health: u32,
    max_health: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEALTH)
    }
}

impl Inventory {
    /// Creates an empty inventory at full health.
    #[must_use]
    pub fn new(max_health: u32) -> Self {
        Self {
            items: Vec::new(),
            health: max_health,
            max_health,
        }
    }

    /// Carried items in pickup order.
    #[must_use]
    pub fn items(&self) -> &[MapItem] {
        &self.items
    }

    /// Reports whether nothing is carried.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reports whether an item with the identifier is carried.
    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    /// Stores an off-map copy of `item`.
    pub fn add(&mut self, item: &MapItem) {
        self.items.push(item.to_inventory_copy());
    }

    /// Removes the carried item with the identifier.
    pub fn remove(&mut self, id: &ItemId) -> Option<MapItem> {
        let index = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Upper bound for health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Restores health without exceeding the maximum.
    pub fn restore_health(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    /// Removes health without dropping below zero.
    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brass_key() -> MapItem {
        MapItem {
            id: ItemId::new("key-1"),
            kind: ItemKind::Key,
            name: "brass key".to_owned(),
            x: 2.5,
            y: 3.0,
            properties: ItemProperties::default(),
        }
    }

    #[test]
    fn inventory_copies_carry_position_sentinel() {
        let mut inventory = Inventory::default();
        inventory.add(&brass_key());

        let carried = &inventory.items()[0];
        assert_eq!(carried.x, -1.0);
        assert_eq!(carried.y, -1.0);
        assert!(!carried.is_on_map());
        assert!(inventory.contains(&ItemId::new("key-1")));
    }

    #[test]
    fn health_stays_within_bounds() {
        let mut inventory = Inventory::new(100);
        inventory.take_damage(30);
        assert_eq!(inventory.health(), 70);
        inventory.restore_health(50);
        assert_eq!(inventory.health(), 100);
        inventory.take_damage(500);
        assert_eq!(inventory.health(), 0);
    }

    #[test]
    fn item_json_uses_type_and_camel_case_properties() {
        let json = r#"{
            "id": "chest-1",
            "type": "chest",
            "name": "oak chest",
            "x": 4,
            "y": 5,
            "properties": { "locked": true, "keyId": "key-1" }
        }"#;
        let item: MapItem = serde_json::from_str(json).expect("valid item");
        assert_eq!(item.kind, ItemKind::Chest);
        assert!(item.is_locked());
        assert_eq!(item.properties.key_id, Some(ItemId::new("key-1")));
        assert_eq!(item.tile(), TileCoord::new(4, 5));
    }

    #[test]
    fn fractional_and_negative_stats_round_to_whole_points() {
        let json = r#"{ "healthRestore": 12.5, "damage": -4 }"#;
        let properties: ItemProperties = serde_json::from_str(json).expect("numbers parse");
        assert_eq!(properties.health_restore, Some(12.5));
        assert_eq!(properties.health_restore_points(), Some(13));
        assert_eq!(properties.damage_points(), Some(0), "negatives clamp to zero");

        let echoed = serde_json::to_value(&properties).expect("serialise");
        assert_eq!(echoed["healthRestore"], 12.5, "stored value is kept as written");
        assert_eq!(ItemProperties::default().damage_points(), None);
    }

    #[test]
    fn empty_properties_are_omitted() {
        let json = serde_json::to_value(brass_key()).expect("serialise");
        assert!(json.get("properties").is_none());
        assert_eq!(json["type"], "key");
    }
}
