//! Report generation
//!
//! Renders the statistics of a decode outcome as text (full or selective) or JSON,
//! and renders per-parameter record listings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tmi_decoder::{ClassificationStatistics, DecodeOutcome, TelemetryRecord, ValuePresenter};

/// One selectable statistics item, in display order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum StatItem {
    Total,
    Service,
    Useful,
    UnknownType,
    Long,
    Double,
    Code,
    Point,
    UniqueParameters,
    PointNarrow,
    PointWide,
    CodeNarrow,
    CodeWide,
}

impl StatItem {
    pub const ALL: [StatItem; 13] = [
        StatItem::Total,
        StatItem::Service,
        StatItem::Useful,
        StatItem::UnknownType,
        StatItem::Long,
        StatItem::Double,
        StatItem::Code,
        StatItem::Point,
        StatItem::UniqueParameters,
        StatItem::PointNarrow,
        StatItem::PointWide,
        StatItem::CodeNarrow,
        StatItem::CodeWide,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatItem::Total => "Total records",
            StatItem::Service => "Service records",
            StatItem::Useful => "Useful records",
            StatItem::UnknownType => "Records of unknown type",
            StatItem::Long => "Long (0)",
            StatItem::Double => "Double (1)",
            StatItem::Code => "Code (2)",
            StatItem::Point => "Point (3)",
            StatItem::UniqueParameters => "Unique parameters",
            StatItem::PointNarrow => "Point < 4 bytes",
            StatItem::PointWide => "Point >= 4 bytes",
            StatItem::CodeNarrow => "Code <= 8 bits",
            StatItem::CodeWide => "Code > 8 bits",
        }
    }

    pub fn value(self, outcome: &DecodeOutcome) -> u64 {
        let stats = &outcome.stats;
        let kinds = stats.count_by_kind();
        match self {
            StatItem::Total => stats.total_frames(),
            StatItem::Service => stats.service_frames(),
            StatItem::Useful => stats.useful_frames(),
            StatItem::UnknownType => stats.unknown_type_frames(),
            StatItem::Long => kinds[0],
            StatItem::Double => kinds[1],
            StatItem::Code => kinds[2],
            StatItem::Point => kinds[3],
            StatItem::UniqueParameters => outcome.index.unique_parameter_count() as u64,
            StatItem::PointNarrow => stats.point_narrow(),
            StatItem::PointWide => stats.point_wide(),
            StatItem::CodeNarrow => stats.code_narrow(),
            StatItem::CodeWide => stats.code_wide(),
        }
    }
}

/// Full statistics report
pub fn full_report(outcome: &DecodeOutcome) -> String {
    let stats = &outcome.stats;
    let kinds = stats.count_by_kind();

    let mut out = String::new();
    out.push_str("Capture statistics:\n");
    out.push_str(&format!("  Total records: {}\n", stats.total_frames()));
    out.push_str(&format!("  Service records: {}\n", stats.service_frames()));
    out.push_str(&format!("  Useful records: {}\n", stats.useful_frames()));
    out.push_str(&format!("  Records of unknown type: {}\n", stats.unknown_type_frames()));
    out.push_str("  Useful records by type:\n");
    out.push_str(&format!("    Long  (0): {}\n", kinds[0]));
    out.push_str(&format!("    Double(1): {}\n", kinds[1]));
    out.push_str(&format!("    Code  (2): {}\n", kinds[2]));
    out.push_str(&format!("    Point (3): {}\n", kinds[3]));
    out.push_str(&format!(
        "  Unique parameters: {}\n",
        outcome.index.unique_parameter_count()
    ));
    out.push_str(&format!("  Point < 4 bytes: {}\n", stats.point_narrow()));
    out.push_str(&format!("  Point >= 4 bytes: {}\n", stats.point_wide()));
    out.push_str(&format!("  Code <= 8 bits: {}\n", stats.code_narrow()));
    out.push_str(&format!("  Code > 8 bits: {}\n", stats.code_wide()));
    out
}

/// Selective statistics report; items appear in display order whatever the
/// order they were selected in
pub fn selected_report(outcome: &DecodeOutcome, selected: &[StatItem]) -> String {
    let mut out = String::from("Selected statistics\n===================\n\n");

    let mut any = false;
    for item in StatItem::ALL.iter().filter(|item| selected.contains(item)) {
        out.push_str(&format!("{}: {}\n", item.label(), item.value(outcome)));
        any = true;
    }

    if !any {
        out.push_str("Nothing selected.\n");
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    statistics: &'a ClassificationStatistics,
    unique_parameters: usize,
}

/// Statistics as pretty-printed JSON
pub fn json_report(outcome: &DecodeOutcome) -> Result<String> {
    let report = JsonReport {
        statistics: &outcome.stats,
        unique_parameters: outcome.index.unique_parameter_count(),
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize statistics")
}

/// Listing of one parameter's records, already sorted by the caller
pub fn parameter_listing(
    name: &str,
    records: &[&TelemetryRecord],
    presenter: &ValuePresenter<'_>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Parameter: {}\n", name));
    out.push_str(&format!("Total records: {}\n", records.len()));
    out.push_str(&"-".repeat(50));
    out.push('\n');
    for record in records {
        out.push_str(&presenter.present_line(record));
        out.push('\n');
    }
    out
}

/// Write a rendered report to a file, refusing empty content
pub fn save_report(path: &Path, content: &str) -> Result<()> {
    if content.trim().is_empty() {
        anyhow::bail!("No statistics to save");
    }
    fs::write(path, content).with_context(|| format!("Failed to write statistics to {:?}", path))?;
    log::info!("Statistics saved to {:?}", path);
    Ok(())
}
