//! Category frequency index and the category catalog join.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::probe::{ItemProbe, normalize_hash};
use crate::config::DEFAULT_TOP_CATEGORIES;
use crate::store::Record;

/// Human-readable entry of the category catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub name: String,
    pub description: String,
    pub visible: bool,
    pub deprecated: bool,
}

/// One entry of the frequency ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRank {
    pub hash: u32,
    pub count: u64,
    /// Catalog entry for `hash`, when the catalog has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<CategoryDefinition>,
}

/// Result of a classification run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryIndex {
    /// The full category catalog, keyed by unsigned hash.
    pub definitions: BTreeMap<u32, CategoryDefinition>,
    /// Most referenced categories: count descending, then hash ascending.
    pub ranking: Vec<CategoryRank>,
    /// Records examined.
    pub scanned_records: usize,
    /// Records that referenced at least one category.
    pub categorized_records: usize,
}

impl CategoryIndex {
    /// Highest ranked `(hash, count)`.
    #[must_use]
    pub fn top(&self) -> Option<(u32, u64)> {
        self.ranking.first().map(|rank| (rank.hash, rank.count))
    }

    /// The ranking as plain `(hash, count)` pairs.
    #[must_use]
    pub fn ranked_pairs(&self) -> Vec<(u32, u64)> {
        self.ranking.iter().map(|rank| (rank.hash, rank.count)).collect()
    }

    /// Catalog entries that are visible and not deprecated, by hash.
    pub fn visible_definitions(&self) -> impl Iterator<Item = (&u32, &CategoryDefinition)> {
        self.definitions
            .iter()
            .filter(|(_, definition)| definition.visible && !definition.deprecated)
    }
}

/// Builds [`CategoryIndex`] values with a fixed ranking length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryAnalyzer {
    top_n: usize,
}

impl Default for CategoryAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_CATEGORIES)
    }
}

impl CategoryAnalyzer {
    #[must_use]
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    #[must_use]
    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Counts category references over `records`, without a catalog.
    #[must_use]
    pub fn classify(&self, records: &[Record]) -> CategoryIndex {
        self.classify_with_catalog(records, BTreeMap::new())
    }

    /// Counts category references over `records` and joins the ranking
    /// against `catalog`.
    ///
    /// Records without a category array contribute nothing. Output depends
    /// only on the inputs.
    #[instrument(skip_all, fields(records = records.len(), catalog = catalog.len()))]
    #[must_use]
    pub fn classify_with_catalog(
        &self,
        records: &[Record],
        catalog: BTreeMap<u32, CategoryDefinition>,
    ) -> CategoryIndex {
        let mut counts: HashMap<u32, u64> = HashMap::new();
        let mut categorized_records = 0;

        for record in records {
            let probe = ItemProbe::from_record(record);
            if probe.category_hashes.is_empty() {
                continue;
            }
            categorized_records += 1;
            for hash in probe.category_hashes {
                *counts.entry(hash).or_default() += 1;
            }
        }

        let mut ranking: Vec<CategoryRank> = counts
            .into_iter()
            .map(|(hash, count)| CategoryRank {
                hash,
                count,
                definition: catalog.get(&hash).cloned(),
            })
            .collect();
        ranking.sort_by(|a, b| b.count.cmp(&a.count).then(a.hash.cmp(&b.hash)));
        let distinct = ranking.len();
        ranking.truncate(self.top_n);

        debug!(distinct, ranked = ranking.len(), "category ranking built");
        CategoryIndex {
            definitions: catalog,
            ranking,
            scanned_records: records.len(),
            categorized_records,
        }
    }
}

/// Classifies `records` with the default ranking length.
#[must_use]
pub fn classify(records: &[Record]) -> CategoryIndex {
    CategoryAnalyzer::default().classify(records)
}

/// Builds the hash-keyed catalog from category definition records.
///
/// The key is the record's JSON `hash` when present, otherwise its row id,
/// both normalised to unsigned. Rows whose key cannot be normalised are skipped.
#[must_use]
pub fn parse_category_catalog(records: &[Record]) -> BTreeMap<u32, CategoryDefinition> {
    records
        .iter()
        .filter_map(|record| {
            let hash = record
                .json
                .get("hash")
                .and_then(Value::as_i64)
                .and_then(normalize_hash)
                .or_else(|| normalize_hash(record.id))?;
            Some((hash, definition_from_json(&record.json)))
        })
        .collect()
}

fn definition_from_json(json: &Value) -> CategoryDefinition {
    let name = json
        .pointer("/displayProperties/name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or("Unknown");
    let description = json
        .pointer("/displayProperties/description")
        .and_then(Value::as_str)
        .unwrap_or_default();
    CategoryDefinition {
        name: name.to_string(),
        description: description.to_string(),
        visible: json.get("visible").and_then(Value::as_bool).unwrap_or(false),
        deprecated: json.get("deprecated").and_then(Value::as_bool).unwrap_or(false),
    }
}
