//! CSV persistence for the derived tables. Every write replaces the file.

use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;
use tracing::info;

use crate::compare::DifferencePoint;
use crate::error::Result;
use crate::key_points::KeyPoints;
use crate::loader::RunRecord;
use crate::outcome::{CrossingRecord, FinalSummary};
use crate::stepwise::StepSummary;

pub const COMBINED_RUNS_CSV: &str = "combined_runs_30y.csv";
pub const STEP_SUMMARY_CSV: &str = "step_summary_30y.csv";
pub const CROSSING_STEPS_CSV: &str = "crossing_steps_30y.csv";
pub const FINAL_SUMMARY_CSV: &str = "final_summary_30y.csv";
pub const KEY_POINTS_CSV: &str = "key_points_30y.csv";
pub const MEDIAN_DIFF_CSV: &str = "baseline_vs_no_migration_median_diff_30y.csv";

/// A record type with a fixed column layout. The header is written even when
/// there are no rows.
pub trait Table: Serialize {
    const HEADER: &'static [&'static str];
}

impl Table for RunRecord {
    const HEADER: &'static [&'static str] = &[
        "scenario",
        "scenario_label",
        "run",
        "step",
        "total_population",
        "muslim_population",
        "non_muslim_population",
        "muslim_share",
        "year",
    ];
}

impl Table for StepSummary {
    const HEADER: &'static [&'static str] = &[
        "scenario",
        "scenario_label",
        "step",
        "year",
        "runs",
        "mean_share",
        "p10_share",
        "p50_share",
        "p90_share",
        "mean_total_population",
        "p10_total_population",
        "p50_total_population",
        "p90_total_population",
    ];
}

impl Table for CrossingRecord {
    const HEADER: &'static [&'static str] = &[
        "scenario",
        "run",
        "first_step_ge_0_5",
        "first_step_ge_0_75",
        "first_step_ge_0_95",
    ];
}

impl Table for FinalSummary {
    const HEADER: &'static [&'static str] = &[
        "scenario",
        "scenario_label",
        "runs",
        "mean_final_share",
        "p10_final_share",
        "median_final_share",
        "p90_final_share",
        "mean_final_total_pop",
        "mean_final_muslim_pop",
        "mean_final_non_muslim_pop",
        "share_runs_ge_50",
        "share_runs_ge_75",
        "share_runs_ge_95",
        "median_first_step_ge_0_5",
        "median_first_step_ge_0_75",
        "median_first_step_ge_0_95",
    ];
}

impl Table for DifferencePoint {
    const HEADER: &'static [&'static str] = &["year", "baseline", "no_migration", "difference"];
}

pub fn write_table<T: Table>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(T::HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

const HIGHLIGHT_COLUMNS: [&str; 7] = [
    "mean_final_share",
    "p10_final_share",
    "p90_final_share",
    "mean_final_total_pop",
    "share_runs_ge_50",
    "share_runs_ge_75",
    "share_runs_ge_95",
];

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:?}"),
        _ => String::new(),
    }
}

/// Key points have one column group per milestone year seen in any scenario;
/// cells for milestones a scenario did not observe stay empty.
pub fn write_key_points(path: &Path, points: &[KeyPoints], years: &[i64]) -> Result<()> {
    let present: Vec<i64> = years
        .iter()
        .copied()
        .filter(|year| points.iter().any(|p| p.milestone(*year).is_some()))
        .collect();

    let mut header: Vec<String> = vec!["scenario".to_string(), "scenario_label".to_string()];
    for year in &present {
        header.push(format!("median_share_{year}"));
        header.push(format!("p10_share_{year}"));
        header.push(format!("p90_share_{year}"));
        header.push(format!("median_pop_{year}"));
    }
    header.extend(HIGHLIGHT_COLUMNS.iter().map(|c| c.to_string()));

    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(&header)?;
    for point in points {
        let mut record = vec![point.scenario.clone(), point.scenario_label.clone()];
        for year in &present {
            let m = point.milestone(*year);
            record.push(format_value(m.map(|m| m.median_share)));
            record.push(format_value(m.map(|m| m.p10_share)));
            record.push(format_value(m.map(|m| m.p90_share)));
            record.push(format_value(m.map(|m| m.median_pop)));
        }
        let h = point.highlights.as_ref();
        record.push(format_value(h.map(|h| h.mean_final_share)));
        record.push(format_value(h.map(|h| h.p10_final_share)));
        record.push(format_value(h.map(|h| h.p90_final_share)));
        record.push(format_value(h.map(|h| h.mean_final_total_pop)));
        for k in 0..3 {
            record.push(format_value(h.map(|h| h.share_runs_ge[k])));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!("wrote {} rows to {}", points.len(), path.display());
    Ok(())
}
