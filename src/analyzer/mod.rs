//! Category and type analysis over item definition records.
//!
//! Record JSON is probed field by field ([`ItemProbe`]); missing or
//! mistyped fields fall back to defaults, so one odd record never stops a
//! scan. On top of the probes this module builds:
//!
//! - the category frequency index ([`classify`], [`CategoryAnalyzer`])
//! - coarse item kinds from priority-ordered rule tables ([`classify_kind`])
//! - type and kind distributions for reporting
//!
//! # Example
//!
//! ```
//! use manifest_core::analyzer::classify;
//! use manifest_core::store::Record;
//! use serde_json::json;
//!
//! let records = vec![
//!     Record { id: 1, json: json!({ "itemCategoryHashes": [59] }) },
//!     Record { id: 2, json: json!({ "itemCategoryHashes": [59, 1] }) },
//! ];
//! assert_eq!(classify(&records).top(), Some((59, 2)));
//! ```

mod categories;
pub mod codes;
mod distribution;
mod probe;
mod rules;

pub use categories::{
    CategoryAnalyzer, CategoryDefinition, CategoryIndex, CategoryRank, classify,
    parse_category_catalog,
};
pub use codes::SubclassFamily;
pub use distribution::{TypeBucket, kind_counts, samples_of_kind, type_distribution};
pub use probe::{ItemProbe, normalize_hash};
pub use rules::{
    ClassificationRule, ItemKind, NAME_RULES, STRUCTURED_RULES, classify_kind, first_match,
    matching_rule,
};
