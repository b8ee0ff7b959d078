//! Item type and kind distributions.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::codes::item_type_name;
use super::probe::ItemProbe;
use super::rules::{ItemKind, classify_kind};

/// Number of active items sharing one `(itemType, itemSubType)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeBucket {
    pub item_type: i64,
    pub item_sub_type: i64,
    pub type_name: String,
    pub count: u64,
}

/// Counts active items per `(itemType, itemSubType)`.
///
/// Sorted by count descending, then by the pair ascending, and cut to `top_n`.
#[must_use]
pub fn type_distribution(probes: &[ItemProbe], top_n: usize) -> Vec<TypeBucket> {
    let mut counts: HashMap<(i64, i64), u64> = HashMap::new();
    for probe in probes.iter().filter(|probe| probe.is_active()) {
        *counts.entry((probe.item_type, probe.item_sub_type)).or_default() += 1;
    }

    let mut buckets: Vec<TypeBucket> = counts
        .into_iter()
        .map(|((item_type, item_sub_type), count)| TypeBucket {
            item_type,
            item_sub_type,
            type_name: item_type_name(item_type).into_owned(),
            count,
        })
        .collect();
    buckets.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then((a.item_type, a.item_sub_type).cmp(&(b.item_type, b.item_sub_type)))
    });
    buckets.truncate(top_n);
    buckets
}

/// Counts active items per [`ItemKind`].
#[must_use]
pub fn kind_counts(probes: &[ItemProbe]) -> BTreeMap<ItemKind, u64> {
    let mut counts = BTreeMap::new();
    for probe in probes.iter().filter(|probe| probe.is_active()) {
        *counts.entry(classify_kind(probe)).or_default() += 1;
    }
    counts
}

/// First `limit` active items of `kind`, in input order.
#[must_use]
pub fn samples_of_kind(probes: &[ItemProbe], kind: ItemKind, limit: usize) -> Vec<&ItemProbe> {
    probes
        .iter()
        .filter(|probe| probe.is_active() && classify_kind(probe) == kind)
        .take(limit)
        .collect()
}
