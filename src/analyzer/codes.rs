//! Numeric code tables of the provider's item schema.
//!
//! The provider documents these codes only loosely; names match what the
//! provider's own item browser shows.

use std::borrow::Cow;

use serde::Serialize;

use super::probe::ItemProbe;

/// `itemType` codes.
pub mod item_type {
    pub const NONE: i64 = 0;
    pub const CURRENCY: i64 = 1;
    pub const ARMOR: i64 = 2;
    pub const WEAPON: i64 = 3;
    pub const MESSAGE: i64 = 7;
    pub const ENGRAM: i64 = 8;
    pub const CONSUMABLE: i64 = 9;
    pub const EXCHANGE_MATERIAL: i64 = 10;
    pub const MISSION_REWARD: i64 = 11;
    pub const QUEST_STEP: i64 = 12;
    pub const QUEST_STEP_COMPLETE: i64 = 13;
    pub const EMBLEM: i64 = 14;
    pub const QUEST: i64 = 15;
    pub const SUBCLASS: i64 = 19;
    pub const CLASS_ITEM: i64 = 20;
    pub const MATERIAL: i64 = 21;
    pub const GHOST: i64 = 24;
    pub const VEHICLE: i64 = 39;
    pub const SHIP: i64 = 41;
    pub const BOUNTY: i64 = 42;
    pub const WRAPPER: i64 = 43;
    pub const SEASONAL_ARTIFACT: i64 = 44;
    pub const FINISHER: i64 = 45;
}

/// `classType` codes.
pub mod class_type {
    pub const TITAN: i64 = 0;
    pub const HUNTER: i64 = 1;
    pub const WARLOCK: i64 = 2;
    /// Usable by every class.
    pub const ALL: i64 = 3;
}

/// `defaultDamageType` codes.
pub mod damage_type {
    pub const NONE: i64 = 0;
    pub const KINETIC: i64 = 1;
    pub const ARC: i64 = 2;
    pub const SOLAR: i64 = 3;
    pub const VOID: i64 = 4;
    pub const RAID: i64 = 5;
    pub const STASIS: i64 = 6;
    pub const STRAND: i64 = 7;
    pub const PRISMATIC: i64 = 8;
}

/// `inventory.tierType` codes.
pub mod tier_type {
    pub const UNKNOWN: i64 = 0;
    pub const CURRENCY: i64 = 1;
    pub const COMMON: i64 = 2;
    pub const RARE: i64 = 3;
    pub const LEGENDARY: i64 = 4;
    pub const EXOTIC: i64 = 5;
}

/// `inventory.bucketTypeHash` values of the equipment slots.
pub mod bucket {
    pub const KINETIC_WEAPONS: u32 = 1_498_876_634;
    pub const ENERGY_WEAPONS: u32 = 2_465_295_065;
    pub const POWER_WEAPONS: u32 = 953_998_645;
    pub const HELMET: u32 = 3_448_274_439;
    pub const GAUNTLETS: u32 = 3_551_918_588;
    pub const CHEST_ARMOR: u32 = 14_239_492;
    pub const LEG_ARMOR: u32 = 20_886_954;
    pub const CLASS_ARMOR: u32 = 1_585_787_867;
    pub const GHOST: u32 = 4_023_194_814;
    pub const VEHICLE: u32 = 2_025_709_351;
    pub const SHIP: u32 = 284_967_655;
    pub const SHADER: u32 = 2_973_005_342;
    pub const EMBLEM: u32 = 4_274_335_291;

    pub const WEAPON_SLOTS: [u32; 3] = [KINETIC_WEAPONS, ENERGY_WEAPONS, POWER_WEAPONS];
    pub const ARMOR_SLOTS: [u32; 5] = [HELMET, GAUNTLETS, CHEST_ARMOR, LEG_ARMOR, CLASS_ARMOR];
}

/// Display name of an item type code; unknown codes render as `Type N`.
#[must_use]
pub fn item_type_name(code: i64) -> Cow<'static, str> {
    let name = match code {
        item_type::ARMOR => "Armor",
        item_type::WEAPON => "Weapon",
        item_type::GHOST => "Ghost",
        item_type::VEHICLE => "Vehicle",
        item_type::SHIP => "Ship",
        item_type::EMBLEM => "Emblem",
        item_type::SUBCLASS => "Subclass",
        item_type::CONSUMABLE => "Consumable",
        item_type::MATERIAL => "Material",
        item_type::BOUNTY => "Bounty",
        item_type::QUEST => "Quest",
        item_type::SEASONAL_ARTIFACT => "Seasonal Artifact",
        item_type::FINISHER => "Finisher",
        other => return Cow::Owned(format!("Type {other}")),
    };
    Cow::Borrowed(name)
}

#[must_use]
pub fn tier_name(code: i64) -> &'static str {
    match code {
        tier_type::COMMON => "Common",
        tier_type::RARE => "Rare",
        tier_type::LEGENDARY => "Legendary",
        tier_type::EXOTIC => "Exotic",
        tier_type::CURRENCY => "Currency",
        _ => "Unknown",
    }
}

#[must_use]
pub fn class_name(code: i64) -> &'static str {
    match code {
        class_type::TITAN => "Titan",
        class_type::HUNTER => "Hunter",
        class_type::WARLOCK => "Warlock",
        class_type::ALL => "All Classes",
        _ => "Unknown",
    }
}

#[must_use]
pub fn damage_name(code: i64) -> &'static str {
    match code {
        damage_type::KINETIC => "Kinetic",
        damage_type::ARC => "Arc",
        damage_type::SOLAR => "Solar",
        damage_type::VOID => "Void",
        damage_type::STASIS => "Stasis",
        damage_type::STRAND => "Strand",
        damage_type::RAID => "Raid",
        damage_type::PRISMATIC => "Prismatic",
        _ => "None",
    }
}

/// Display name of an equipment slot; unknown buckets render as `Slot N`.
#[must_use]
pub fn equipment_slot_name(bucket_hash: u32) -> Cow<'static, str> {
    let name = match bucket_hash {
        bucket::KINETIC_WEAPONS => "Kinetic Weapon",
        bucket::ENERGY_WEAPONS => "Energy Weapon",
        bucket::POWER_WEAPONS => "Power Weapon",
        bucket::HELMET => "Helmet",
        bucket::GAUNTLETS => "Gauntlets",
        bucket::CHEST_ARMOR => "Chest Armor",
        bucket::LEG_ARMOR => "Leg Armor",
        bucket::CLASS_ARMOR => "Class Item",
        bucket::GHOST => "Ghost",
        bucket::VEHICLE => "Vehicle",
        bucket::SHIP => "Ship",
        bucket::EMBLEM => "Emblem",
        bucket::SHADER => "Shader",
        other => return Cow::Owned(format!("Slot {other}")),
    };
    Cow::Borrowed(name)
}

/// Element family of a subclass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubclassFamily {
    Light,
    Darkness,
    Prismatic,
    Unknown,
}

impl SubclassFamily {
    /// Prismatic wins over the damage-type families, even when only the name says so.
    #[must_use]
    pub fn of(probe: &ItemProbe) -> Self {
        if probe.damage_type == damage_type::PRISMATIC
            || probe.name.to_lowercase().contains("prismatic")
        {
            return Self::Prismatic;
        }
        match probe.damage_type {
            damage_type::STASIS | damage_type::STRAND => Self::Darkness,
            damage_type::ARC | damage_type::SOLAR | damage_type::VOID => Self::Light,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Darkness => "Darkness",
            Self::Prismatic => "Prismatic",
            Self::Unknown => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_type_name_known_and_fallback() {
        assert_eq!(item_type_name(item_type::WEAPON), "Weapon");
        assert_eq!(item_type_name(item_type::SEASONAL_ARTIFACT), "Seasonal Artifact");
        assert_eq!(item_type_name(99), "Type 99");
    }

    #[test]
    fn test_tier_class_damage_names() {
        assert_eq!(tier_name(tier_type::EXOTIC), "Exotic");
        assert_eq!(tier_name(tier_type::UNKNOWN), "Unknown");
        assert_eq!(class_name(class_type::ALL), "All Classes");
        assert_eq!(class_name(7), "Unknown");
        assert_eq!(damage_name(damage_type::STRAND), "Strand");
        assert_eq!(damage_name(-1), "None");
    }

    #[test]
    fn test_equipment_slot_name_known_and_fallback() {
        assert_eq!(equipment_slot_name(bucket::HELMET), "Helmet");
        assert_eq!(equipment_slot_name(bucket::CLASS_ARMOR), "Class Item");
        assert_eq!(equipment_slot_name(12), "Slot 12");
    }

    fn subclass(name: &str, damage: i64) -> ItemProbe {
        ItemProbe {
            name: name.to_string(),
            item_type: item_type::SUBCLASS,
            damage_type: damage,
            ..ItemProbe::default()
        }
    }

    #[test]
    fn test_subclass_family() {
        let cases = [
            ("Sunbreaker", damage_type::SOLAR, SubclassFamily::Light),
            ("Shadebinder", damage_type::STASIS, SubclassFamily::Darkness),
            ("Threadrunner", damage_type::STRAND, SubclassFamily::Darkness),
            ("Anything", damage_type::PRISMATIC, SubclassFamily::Prismatic),
            ("Prismatic Hunter", damage_type::KINETIC, SubclassFamily::Prismatic),
            ("Mystery", damage_type::NONE, SubclassFamily::Unknown),
        ];
        for (name, damage, expected) in cases {
            assert_eq!(SubclassFamily::of(&subclass(name, damage)), expected, "{name}");
        }
    }
}
