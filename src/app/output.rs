//! Report formatting for the download and explore steps.
//!
//! Line builders are kept separate from printing so they can be tested.

use anyhow::Result;
use manifest_core::analyzer::ItemProbe;
use manifest_core::analyzer::codes::{class_name, damage_name, equipment_slot_name, tier_name};
use manifest_core::pipeline::{DownloadSummary, ExploreReport, PipelineError};

const NAME_PLACEHOLDER: &str = "(unnamed)";

/// Returns terminal width from COLUMNS, or 80 if unset/invalid.
pub(crate) fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(80)
}

/// Truncates text to at most `width` chars, appending ellipsis if truncated.
pub(crate) fn truncate_to_width(text: &str, width: usize) -> String {
    let text_len = text.chars().count();
    if text_len <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    if width == 1 {
        return "…".to_string();
    }

    let mut output: String = text.chars().take(width - 1).collect();
    output.push('…');
    output
}

pub(crate) fn download_summary_lines(summary: &DownloadSummary) -> Vec<String> {
    let record = &summary.record;
    let mut lines = vec![
        format!(
            "Manifest {} ({}) downloaded from {}",
            record.version, record.language, summary.archive_url
        ),
        format!(
            "Archive: {} bytes, store: {} ({} bytes, entry '{}')",
            summary.archive.written_bytes,
            summary.store.path.display(),
            summary.store.size_bytes,
            summary.store.entry_name
        ),
        format!("Tables ({}):", summary.tables.len()),
    ];
    for table in &summary.tables {
        lines.push(format!(
            "  {:<45} {:>8} rows  {:>2} columns",
            table.name, table.row_count, table.column_count
        ));
    }
    lines
}

pub(crate) fn explore_report_lines(report: &ExploreReport, width: usize) -> Vec<String> {
    let record = &report.record;
    let mut lines = vec![format!(
        "Manifest {} ({}), downloaded {}",
        record.version,
        if record.language.is_empty() {
            "unknown language"
        } else {
            record.language.as_str()
        },
        record.download_date.to_rfc3339()
    )];

    lines.push(format!(
        "Item table {}: {} records, {} columns",
        report.item_table,
        report.item_count,
        report.item_columns.len()
    ));
    for column in &report.item_columns {
        lines.push(format!("  {} {}", column.name, column.declared_type));
    }

    if !report.samples.is_empty() {
        lines.push("Samples:".to_string());
        lines.extend(report.samples.iter().map(|probe| probe_line(probe, width)));
    }

    lines.push(format!(
        "Category catalog: {} definitions, {} visible",
        report.catalog_size, report.visible_categories
    ));

    if !report.type_distribution.is_empty() {
        lines.push("Item types (active items):".to_string());
        for bucket in &report.type_distribution {
            lines.push(format!(
                "  {:>8}  {} ({}/{})",
                bucket.count, bucket.type_name, bucket.item_type, bucket.item_sub_type
            ));
        }
    }

    if !report.kind_counts.is_empty() {
        lines.push("Item kinds (active items):".to_string());
        for (kind, count) in &report.kind_counts {
            lines.push(format!("  {:>8}  {}", count, kind.label()));
        }
    }

    for (kind, samples) in &report.kind_samples {
        if samples.is_empty() {
            continue;
        }
        lines.push(format!("Sample {} items:", kind.label()));
        lines.extend(samples.iter().map(|probe| probe_line(probe, width)));
    }

    if !report.subclass_families.is_empty() {
        let families = report
            .subclass_families
            .iter()
            .map(|(family, count)| format!("{} {count}", family.label()))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Subclass families: {families}"));
    }

    let categories = &report.categories;
    lines.push(format!(
        "Top categories ({} of {} records categorized):",
        categories.categorized_records, categories.scanned_records
    ));
    if categories.ranking.is_empty() {
        lines.push("  (no category references found)".to_string());
    }
    for (position, rank) in categories.ranking.iter().enumerate() {
        let name = rank
            .definition
            .as_ref()
            .map_or("Unknown", |definition| definition.name.as_str());
        lines.push(truncate_to_width(
            &format!(
                "  {:>3}. {:>10}  {:>8}  {}",
                position + 1,
                rank.hash,
                rank.count,
                name
            ),
            width,
        ));
    }

    lines.push(format!(
        "Category index written to {}",
        report.category_index_path.display()
    ));
    lines
}

fn probe_line(probe: &ItemProbe, width: usize) -> String {
    let name = if probe.name.trim().is_empty() {
        NAME_PLACEHOLDER
    } else {
        probe.name.as_str()
    };
    let mut details = vec![tier_name(probe.tier_type).to_string()];
    if let Some(class_type) = probe.class_type {
        details.push(class_name(class_type).to_string());
    }
    if probe.damage_type != 0 {
        details.push(damage_name(probe.damage_type).to_string());
    }
    if let Some(bucket_hash) = probe.bucket_hash {
        details.push(equipment_slot_name(bucket_hash).into_owned());
    }
    let type_label = if probe.type_display_name.is_empty() {
        String::new()
    } else {
        format!(" - {}", probe.type_display_name)
    };
    truncate_to_width(
        &format!(
            "  [{}] {name}{type_label} ({})",
            probe.id,
            details.join(", ")
        ),
        width,
    )
}

/// The stage name and message shown when a step fails.
pub(crate) fn failure_line(error: &PipelineError) -> String {
    if error.is_cancelled() {
        format!("Interrupted: {error}")
    } else {
        format!("{} stage failed: {error}", error.stage())
    }
}

pub(crate) fn print_download_summary(summary: &DownloadSummary) {
    for line in download_summary_lines(summary) {
        println!("{line}");
    }
}

pub(crate) fn print_explore_report(report: &ExploreReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for line in explore_report_lines(report, terminal_width()) {
        println!("{line}");
    }
    Ok(())
}
