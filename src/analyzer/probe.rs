//! Best-effort field probing of item definition records.

use serde::Serialize;
use serde_json::Value;

use super::codes::class_type;
use crate::store::Record;

/// The item fields the analyzer looks at, pulled out of a record's JSON.
///
/// Every field has a fallback: records come from a schema this crate does
/// not own, and a missing field on one record must not fail a scan.
/// Numeric codes fall back to `0`, which is the provider's "none/unknown"
/// code for every table except `classType`, hence the `Option` there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProbe {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub type_display_name: String,
    pub item_type: i64,
    pub item_sub_type: i64,
    pub class_type: Option<i64>,
    pub damage_type: i64,
    pub tier_type: i64,
    pub bucket_hash: Option<u32>,
    pub category_hashes: Vec<u32>,
    pub plug_category: Option<String>,
    pub collectible_hash: Option<u32>,
    pub redacted: bool,
    pub blacklisted: bool,
}

impl ItemProbe {
    /// Probes `record`; never fails.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        Self::from_json(record.id, &record.json)
    }

    /// Probes a raw JSON object; non-objects yield an all-default probe.
    #[must_use]
    pub fn from_json(id: i64, json: &Value) -> Self {
        Self {
            id,
            name: text_at(json, "/displayProperties/name"),
            description: text_at(json, "/displayProperties/description"),
            type_display_name: text_at(json, "/itemTypeDisplayName"),
            item_type: int_at(json, "/itemType").unwrap_or_default(),
            item_sub_type: int_at(json, "/itemSubType").unwrap_or_default(),
            class_type: int_at(json, "/classType"),
            damage_type: int_at(json, "/defaultDamageType").unwrap_or_default(),
            tier_type: int_at(json, "/inventory/tierType").unwrap_or_default(),
            bucket_hash: int_at(json, "/inventory/bucketTypeHash").and_then(normalize_hash),
            category_hashes: category_hashes(json),
            plug_category: json
                .pointer("/plug/plugCategoryIdentifier")
                .and_then(Value::as_str)
                .map(str::to_string),
            collectible_hash: int_at(json, "/collectibleHash").and_then(normalize_hash),
            redacted: flag_at(json, "/redacted"),
            blacklisted: flag_at(json, "/blacklisted"),
        }
    }

    /// Not redacted, not blacklisted, and carrying a non-blank name.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.redacted && !self.blacklisted && !self.name.trim().is_empty()
    }

    /// Whether a character of class `class_code` can use the item.
    #[must_use]
    pub fn usable_by_class(&self, class_code: i64) -> bool {
        matches!(self.class_type, Some(c) if c == class_code || c == class_type::ALL)
    }

    /// Case-insensitive search over name, description and type display name.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        [&self.name, &self.description, &self.type_display_name]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Maps a stored hash to its unsigned 32-bit value.
///
/// The store keeps 32-bit hashes in signed columns, so values above
/// `i32::MAX` come back negative. Anything outside both ranges is rejected.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn normalize_hash(raw: i64) -> Option<u32> {
    if let Ok(unsigned) = u32::try_from(raw) {
        return Some(unsigned);
    }
    i32::try_from(raw).ok().map(|signed| signed as u32)
}

fn category_hashes(json: &Value) -> Vec<u32> {
    json.get("itemCategoryHashes")
        .and_then(Value::as_array)
        .map(|hashes| {
            hashes
                .iter()
                .filter_map(Value::as_i64)
                .filter_map(normalize_hash)
                .collect()
        })
        .unwrap_or_default()
}

fn text_at(json: &Value, pointer: &str) -> String {
    json.pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn int_at(json: &Value, pointer: &str) -> Option<i64> {
    json.pointer(pointer).and_then(Value::as_i64)
}

fn flag_at(json: &Value, pointer: &str) -> bool {
    json.pointer(pointer).and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_probe_reads_all_fields() {
        let value = json!({
            "displayProperties": { "name": "Gjallarhorn", "description": "Wolfpack rounds" },
            "itemTypeDisplayName": "Rocket Launcher",
            "itemType": 3,
            "itemSubType": 8,
            "classType": 3,
            "defaultDamageType": 3,
            "inventory": { "tierType": 6, "bucketTypeHash": 953_998_645_u32 },
            "itemCategoryHashes": [1, 2, 4_294_967_295_u32],
            "collectibleHash": 123,
            "redacted": false,
            "blacklisted": false
        });

        let probe = ItemProbe::from_json(42, &value);

        assert_eq!(probe.id, 42);
        assert_eq!(probe.name, "Gjallarhorn");
        assert_eq!(probe.type_display_name, "Rocket Launcher");
        assert_eq!(probe.item_type, 3);
        assert_eq!(probe.item_sub_type, 8);
        assert_eq!(probe.class_type, Some(3));
        assert_eq!(probe.tier_type, 6);
        assert_eq!(probe.bucket_hash, Some(953_998_645));
        assert_eq!(probe.category_hashes, vec![1, 2, u32::MAX]);
        assert_eq!(probe.collectible_hash, Some(123));
        assert!(probe.is_active());
    }

    #[test]
    fn test_probe_defaults_when_fields_absent() {
        let probe = ItemProbe::from_json(7, &json!({}));
        assert_eq!(probe, ItemProbe { id: 7, ..ItemProbe::default() });
        assert!(!probe.is_active());

        let probe = ItemProbe::from_json(8, &Value::Null);
        assert!(probe.category_hashes.is_empty());
    }

    #[test]
    fn test_probe_ignores_wrongly_typed_fields() {
        let value = json!({
            "displayProperties": { "name": 12 },
            "itemType": "three",
            "itemCategoryHashes": "59",
            "redacted": "yes"
        });

        let probe = ItemProbe::from_json(1, &value);

        assert_eq!(probe.name, "");
        assert_eq!(probe.item_type, 0);
        assert!(probe.category_hashes.is_empty());
        assert!(!probe.redacted);
    }

    #[test]
    fn test_is_active_rules() {
        let named = ItemProbe {
            name: "Ace of Spades".to_string(),
            ..ItemProbe::default()
        };
        assert!(named.is_active());
        assert!(!ItemProbe { redacted: true, ..named.clone() }.is_active());
        assert!(!ItemProbe { blacklisted: true, ..named.clone() }.is_active());
        assert!(!ItemProbe { name: "   ".to_string(), ..named }.is_active());
    }

    #[test]
    fn test_usable_by_class() {
        let titan_only = ItemProbe {
            class_type: Some(class_type::TITAN),
            ..ItemProbe::default()
        };
        let everyone = ItemProbe {
            class_type: Some(class_type::ALL),
            ..ItemProbe::default()
        };
        assert!(titan_only.usable_by_class(class_type::TITAN));
        assert!(!titan_only.usable_by_class(class_type::HUNTER));
        assert!(everyone.usable_by_class(class_type::WARLOCK));
        assert!(!ItemProbe::default().usable_by_class(class_type::TITAN));
    }

    #[test]
    fn test_matches_search_is_case_insensitive() {
        let probe = ItemProbe {
            name: "Sunshot".to_string(),
            type_display_name: "Hand Cannon".to_string(),
            ..ItemProbe::default()
        };
        assert!(probe.matches_search("SUNSHOT"));
        assert!(probe.matches_search("cannon"));
        assert!(!probe.matches_search("bow"));
    }

    #[test]
    fn test_normalize_hash() {
        assert_eq!(normalize_hash(59), Some(59));
        assert_eq!(normalize_hash(-1), Some(u32::MAX));
        assert_eq!(normalize_hash(i64::from(i32::MIN)), Some(0x8000_0000));
        assert_eq!(normalize_hash(i64::from(u32::MAX) + 1), None);
        assert_eq!(normalize_hash(i64::from(i32::MIN) - 1), None);
    }
}
