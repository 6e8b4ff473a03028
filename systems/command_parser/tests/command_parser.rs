use dungeon_crawler_core::{CommandResponse, ItemKind, ItemProperties, MapItem, Verb};
use dungeon_crawler_system_command_parser::{resolve, resolve_object, suggestions, Resolution};
use dungeon_crawler_system_item_registry::create_item;

fn named(kind: ItemKind, name: &str) -> MapItem {
    create_item(kind, 2.0, 2.0, Some(name), ItemProperties::default())
}

#[test]
fn single_word_suggests_verbs_by_prefix() {
    assert_eq!(suggestions("ge", &[]), vec!["get".to_owned()]);
    assert_eq!(suggestions("p", &[]), vec!["push", "pull", "put"]);
    assert_eq!(suggestions("LO", &[]), vec!["look", "lock"]);
    assert!(suggestions("   ", &[]).is_empty());
    assert!(suggestions("xyz", &[]).is_empty());
}

#[test]
fn object_suggestions_come_from_tile_items() {
    let key = named(ItemKind::Key, "brass key");
    let chest = named(ItemKind::Chest, "oak chest");
    let items = [&key, &chest];

    assert_eq!(suggestions("get br", &items), vec!["brass key".to_owned()]);
    assert_eq!(suggestions("open box", &items), vec!["oak chest".to_owned()]);
    assert!(suggestions("get sword", &items).is_empty());
}

#[test]
fn suggestions_are_capped() {
    let keys: Vec<MapItem> = (0..8)
        .map(|index| named(ItemKind::Key, &format!("key {index}")))
        .collect();
    let items: Vec<&MapItem> = keys.iter().collect();

    assert_eq!(suggestions("get key", &items).len(), 5);
}

#[test]
fn exact_name_beats_partial_match() {
    let ring = named(ItemKind::Key, "key ring");
    let key = named(ItemKind::Key, "key");
    let items = [&ring, &key];

    let found = resolve_object("KEY", &items).expect("item resolved");
    assert_eq!(found.name, "key");
}

#[test]
fn exact_alias_beats_partial_match() {
    let boxwood = named(ItemKind::Switch, "boxwood lever");
    let chest = named(ItemKind::Chest, "oak chest");
    let items = [&boxwood, &chest];

    let found = resolve_object("box", &items).expect("item resolved");
    assert_eq!(found.name, "oak chest");
}

#[test]
fn phrase_containing_the_name_resolves() {
    let bread = named(ItemKind::Food, "bread");
    let items = [&bread];

    let found = resolve_object("the stale bread", &items).expect("item resolved");
    assert_eq!(found.name, "bread");
}

#[test]
fn resolution_failures_carry_player_messages() {
    let key = named(ItemKind::Key, "brass key");
    let items = [&key];

    let failure = |input: &str| resolve(input, &items, &[]).failure();

    assert_eq!(
        failure("dance wildly"),
        Some(CommandResponse::failure("I don't understand that verb."))
    );
    assert_eq!(
        failure("open"),
        Some(CommandResponse::failure("What do you want to open?"))
    );
    assert_eq!(
        failure("take lantern"),
        Some(CommandResponse::failure("I don't see a lantern here."))
    );
    assert_eq!(failure("i"), None);
    assert_eq!(failure("take brass key"), None);
}

#[test]
fn look_falls_back_to_carried_items() {
    let carried = vec![named(ItemKind::Key, "brass key").to_inventory_copy()];

    match resolve("examine brass key", &[], &carried) {
        Resolution::Target { verb, item } => {
            assert_eq!(verb, Verb::Look);
            assert!(!item.is_on_map());
        }
        other => panic!("unexpected resolution: {other:?}"),
    }

    assert!(matches!(
        resolve("get brass key", &[], &carried),
        Resolution::NotFound { verb: Verb::Get, .. }
    ));
}
