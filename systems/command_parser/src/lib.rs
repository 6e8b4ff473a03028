#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Free-text command parser.
//!
//! Input is normalised, the first word is mapped through a synonym table to
//! a canonical [`Verb`], and the remaining words form the object phrase that
//! is resolved against the items on the player's tile.

use dungeon_crawler_core::{CommandResponse, MapItem, Verb};
use dungeon_crawler_system_item_registry::matches_item_name;

/// Maximum number of entries returned by [`suggestions`].
pub const MAX_SUGGESTIONS: usize = 5;

/// Result of tokenising a line of input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Canonical verb, `None` when the first word is not a known verb.
    pub verb: Option<Verb>,
    /// Remaining words joined by single spaces.
    pub object: Option<String>,
    /// Input exactly as typed.
    pub raw: String,
}

/// Maps a typed word onto its canonical verb.
#[must_use]
pub fn verb_for(word: &str) -> Option<Verb> {
    let verb = match word {
        "get" | "take" | "grab" | "pick" => Verb::Get,
        "look" | "examine" | "inspect" => Verb::Look,
        "read" => Verb::Read,
        "i" | "inv" | "inventory" => Verb::Inventory,
        "open" => Verb::Open,
        "close" | "shut" => Verb::Close,
        "use" => Verb::Use,
        "drop" => Verb::Drop,
        "unlock" => Verb::Unlock,
        "lock" => Verb::Lock,
        "go" | "move" | "walk" => Verb::Go,
        "push" => Verb::Push,
        "pull" => Verb::Pull,
        "eat" => Verb::Eat,
        "drink" => Verb::Drink,
        "give" => Verb::Give,
        "put" => Verb::Put,
        _ => return None,
    };
    Some(verb)
}

/// Splits input into a verb and an object phrase.
///
/// `inventory` never carries an object. `pick up <thing>` drops the `up`.
#[must_use]
pub fn parse(input: &str) -> ParsedCommand {
    let normalized = input.trim().to_lowercase();
    let mut words = normalized.split_whitespace();

    let Some(first) = words.next() else {
        return ParsedCommand {
            verb: None,
            object: None,
            raw: input.to_owned(),
        };
    };

    let verb = verb_for(first);
    let mut rest: Vec<&str> = words.collect();
    if first == "pick" && rest.first() == Some(&"up") {
        let _ = rest.remove(0);
    }

    let object = if verb == Some(Verb::Inventory) || rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    };

    ParsedCommand {
        verb,
        object,
        raw: input.to_owned(),
    }
}

/// Finds the item an object phrase refers to.
///
/// Exact names win over exact aliases, which win over partial matches. A
/// partial match is a registry name match or the phrase containing the
/// item's name. Ties go to the first item in `items`.
#[must_use]
pub fn resolve_object<'a>(term: &str, items: &[&'a MapItem]) -> Option<&'a MapItem> {
    let normalized = term.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    let exact_name = items
        .iter()
        .find(|item| item.name.to_lowercase() == normalized);
    let exact_alias = || {
        items.iter().find(|item| {
            item.aliases()
                .iter()
                .any(|alias| alias.to_lowercase() == normalized)
        })
    };
    let partial = || {
        items.iter().find(|item| {
            matches_item_name(item, &normalized)
                || normalized.contains(&item.name.to_lowercase())
        })
    };

    exact_name.or_else(exact_alias).or_else(partial).copied()
}

/// Outcome of parsing and resolving one line of input.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution<'a> {
    /// Blank input; nothing to report.
    Empty,
    /// The first word is not a known verb.
    UnknownVerb,
    /// The verb needs an object and none was given.
    MissingObject(Verb),
    /// No item matched the object phrase.
    NotFound {
        /// Verb that was requested.
        verb: Verb,
        /// Object phrase as typed, lowercased.
        object: String,
    },
    /// Inventory listing.
    Inventory,
    /// The object phrase resolved to an item.
    Target {
        /// Verb that was requested.
        verb: Verb,
        /// Item the phrase refers to.
        item: &'a MapItem,
    },
}

impl Resolution<'_> {
    /// Response to show when resolution failed, `None` for success variants.
    #[must_use]
    pub fn failure(&self) -> Option<CommandResponse> {
        let message = match self {
            Self::Empty => String::new(),
            Self::UnknownVerb => "I don't understand that verb.".to_owned(),
            Self::MissingObject(verb) => format!("What do you want to {verb}?"),
            Self::NotFound { object, .. } => format!("I don't see a {object} here."),
            Self::Inventory | Self::Target { .. } => return None,
        };
        Some(CommandResponse::failure(message))
    }
}

/// Verbs that may target carried items when nothing on the tile matches.
#[must_use]
pub const fn reaches_inventory(verb: Verb) -> bool {
    matches!(verb, Verb::Look | Verb::Read | Verb::Use | Verb::Eat)
}

/// Parses `input` and resolves its object against the tile, then the
/// inventory for verbs that allow it.
#[must_use]
pub fn resolve<'a>(
    input: &str,
    tile_items: &[&'a MapItem],
    carried: &'a [MapItem],
) -> Resolution<'a> {
    if input.trim().is_empty() {
        return Resolution::Empty;
    }

    let parsed = parse(input);
    let Some(verb) = parsed.verb else {
        return Resolution::UnknownVerb;
    };
    if verb == Verb::Inventory {
        return Resolution::Inventory;
    }
    let Some(object) = parsed.object else {
        return Resolution::MissingObject(verb);
    };

    let on_tile = resolve_object(&object, tile_items);
    let found = on_tile.or_else(|| {
        if !reaches_inventory(verb) {
            return None;
        }
        let carried: Vec<&MapItem> = carried.iter().collect();
        resolve_object(&object, &carried)
    });

    match found {
        Some(item) => Resolution::Target { verb, item },
        None => Resolution::NotFound { verb, object },
    }
}

/// Completion candidates for partially typed input.
///
/// A single word suggests verbs with that prefix; anything longer suggests
/// names of tile items matching the object phrase.
#[must_use]
pub fn suggestions(input: &str, tile_items: &[&MapItem]) -> Vec<String> {
    let normalized = input.trim().to_lowercase();
    let words: Vec<&str> = normalized.split_whitespace().collect();

    match words.as_slice() {
        [] => Vec::new(),
        [prefix] => Verb::ALL
            .iter()
            .map(|verb| verb.as_str())
            .filter(|word| word.starts_with(*prefix))
            .take(MAX_SUGGESTIONS)
            .map(str::to_owned)
            .collect(),
        [_, object @ ..] => {
            let phrase = object.join(" ");
            tile_items
                .iter()
                .filter(|item| matches_item_name(item, &phrase))
                .take(MAX_SUGGESTIONS)
                .map(|item| item.name.clone())
                .collect()
        }
    }
}
