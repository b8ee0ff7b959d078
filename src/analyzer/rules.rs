//! Priority-ordered classification rule tables.
//!
//! An item is given a coarse [`ItemKind`] by walking [`STRUCTURED_RULES`]
//! (declared numeric fields) and then [`NAME_RULES`] (words in the display
//! name or type name). The first matching rule wins. Name rules are only
//! consulted when no structured rule matches.

use serde::Serialize;

use super::codes::{bucket, item_type};
use super::probe::ItemProbe;

/// Coarse item classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Armor,
    Weapon,
    Subclass,
    Mod,
    Cosmetic,
    Consumable,
    Collectible,
    /// No rule matched.
    Other,
}

impl ItemKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Armor => "armor",
            Self::Weapon => "weapon",
            Self::Subclass => "subclass",
            Self::Mod => "mod",
            Self::Cosmetic => "cosmetic",
            Self::Consumable => "consumable",
            Self::Collectible => "collectible",
            Self::Other => "other",
        }
    }
}

/// A predicate and the kind it assigns.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    /// Short identifier shown in diagnostics.
    pub name: &'static str,
    pub kind: ItemKind,
    pub matches: fn(&ItemProbe) -> bool,
}

/// Rules over declared type codes, buckets and plug data, highest priority first.
pub static STRUCTURED_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "subclass-type",
        kind: ItemKind::Subclass,
        matches: |p| p.item_type == item_type::SUBCLASS,
    },
    ClassificationRule {
        name: "weapon-type",
        kind: ItemKind::Weapon,
        matches: |p| p.item_type == item_type::WEAPON,
    },
    ClassificationRule {
        name: "armor-type",
        kind: ItemKind::Armor,
        matches: |p| matches!(p.item_type, item_type::ARMOR | item_type::CLASS_ITEM),
    },
    ClassificationRule {
        name: "mod-plug",
        kind: ItemKind::Mod,
        matches: |p| {
            p.plug_category.as_deref().is_some_and(|category| {
                let category = category.to_lowercase();
                category.contains("mod") || category.starts_with("enhancements.")
            })
        },
    },
    ClassificationRule {
        name: "consumable-type",
        kind: ItemKind::Consumable,
        matches: |p| {
            matches!(
                p.item_type,
                item_type::CONSUMABLE | item_type::MATERIAL | item_type::EXCHANGE_MATERIAL
            )
        },
    },
    ClassificationRule {
        name: "cosmetic-type",
        kind: ItemKind::Cosmetic,
        matches: |p| {
            matches!(
                p.item_type,
                item_type::EMBLEM
                    | item_type::GHOST
                    | item_type::VEHICLE
                    | item_type::SHIP
                    | item_type::FINISHER
            )
        },
    },
    ClassificationRule {
        name: "weapon-slot",
        kind: ItemKind::Weapon,
        matches: |p| p.bucket_hash.is_some_and(|b| bucket::WEAPON_SLOTS.contains(&b)),
    },
    ClassificationRule {
        name: "armor-slot",
        kind: ItemKind::Armor,
        matches: |p| p.bucket_hash.is_some_and(|b| bucket::ARMOR_SLOTS.contains(&b)),
    },
    ClassificationRule {
        name: "cosmetic-slot",
        kind: ItemKind::Cosmetic,
        matches: |p| {
            p.bucket_hash.is_some_and(|b| {
                matches!(
                    b,
                    bucket::SHADER | bucket::EMBLEM | bucket::SHIP | bucket::VEHICLE | bucket::GHOST
                )
            })
        },
    },
    ClassificationRule {
        name: "collectible",
        kind: ItemKind::Collectible,
        matches: |p| p.collectible_hash.is_some_and(|h| h != 0),
    },
];

/// Fallback rules over whole words of the name and type display name.
pub static NAME_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "subclass-name",
        kind: ItemKind::Subclass,
        matches: |p| mentions_any(p, &["subclass"]),
    },
    ClassificationRule {
        name: "mod-name",
        kind: ItemKind::Mod,
        matches: |p| mentions_any(p, &["mod", "armor mod", "weapon mod"]),
    },
    ClassificationRule {
        name: "weapon-name",
        kind: ItemKind::Weapon,
        matches: |p| {
            mentions_any(
                p,
                &[
                    "auto rifle",
                    "hand cannon",
                    "pulse rifle",
                    "scout rifle",
                    "sniper rifle",
                    "fusion rifle",
                    "trace rifle",
                    "submachine gun",
                    "machine gun",
                    "rocket launcher",
                    "grenade launcher",
                    "shotgun",
                    "sidearm",
                    "sword",
                    "glaive",
                    "bow",
                ],
            )
        },
    },
    ClassificationRule {
        name: "armor-name",
        kind: ItemKind::Armor,
        matches: |p| {
            mentions_any(
                p,
                &[
                    "helmet",
                    "gauntlets",
                    "chest armor",
                    "leg armor",
                    "class item",
                    "titan mark",
                    "hunter cloak",
                    "warlock bond",
                ],
            )
        },
    },
    ClassificationRule {
        name: "cosmetic-name",
        kind: ItemKind::Cosmetic,
        matches: |p| {
            mentions_any(
                p,
                &[
                    "shader",
                    "ornament",
                    "emblem",
                    "emote",
                    "finisher",
                    "ghost shell",
                    "sparrow",
                    "ship",
                    "transmat effect",
                ],
            )
        },
    },
    ClassificationRule {
        name: "consumable-name",
        kind: ItemKind::Consumable,
        matches: |p| mentions_any(p, &["consumable", "material", "currency"]),
    },
];

/// Classifies one probe against the built-in rule tables.
#[must_use]
pub fn classify_kind(probe: &ItemProbe) -> ItemKind {
    matching_rule(probe).map_or(ItemKind::Other, |rule| rule.kind)
}

/// The rule that decides `probe`'s kind, if any.
#[must_use]
pub fn matching_rule(probe: &ItemProbe) -> Option<&'static ClassificationRule> {
    first_match(STRUCTURED_RULES, probe).or_else(|| first_match(NAME_RULES, probe))
}

/// First rule in `rules` that matches; later rules are not evaluated.
#[must_use]
pub fn first_match<'r>(
    rules: &'r [ClassificationRule],
    probe: &ItemProbe,
) -> Option<&'r ClassificationRule> {
    rules.iter().find(|rule| (rule.matches)(probe))
}

/// Whether any phrase appears as whole words in the name or type display name.
fn mentions_any(probe: &ItemProbe, phrases: &[&str]) -> bool {
    let haystack = word_haystack(&format!("{} {}", probe.name, probe.type_display_name));
    phrases
        .iter()
        .any(|phrase| haystack.contains(&format!(" {phrase} ")))
}

/// Lowercases and collapses `text` to ` word word ` form for whole-word lookups.
fn word_haystack(text: &str) -> String {
    let mut haystack = String::with_capacity(text.len() + 2);
    haystack.push(' ');
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        haystack.push_str(&word.to_lowercase());
        haystack.push(' ');
    }
    haystack
}
