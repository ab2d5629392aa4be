//! Batch driver: load, aggregate, persist, render, in that order.

use std::fs::create_dir_all;

use tracing::info;

use crate::charts;
use crate::compare::{DifferencePoint, median_share_difference};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::key_points::{KeyPoints, build_key_points, milestone_years};
use crate::loader::{RunRecord, load_raw_runs};
use crate::outcome::{FinalOutcome, summarize_final};
use crate::stepwise::{StepSummary, summarize_stepwise};
use crate::tables::{self, write_key_points, write_table};

/// Everything one batch derived, kept in memory after the files are written.
#[derive(Clone, Debug)]
pub struct Report {
    pub runs: Vec<RunRecord>,
    pub step_summary: Vec<StepSummary>,
    pub outcome: FinalOutcome,
    pub key_points: Vec<KeyPoints>,
    pub median_diff: Vec<DifferencePoint>,
}

pub fn run(config: &ReportConfig) -> Result<Report> {
    let paths = &config.paths;
    // Nothing is written unless loading succeeds.
    let runs = load_raw_runs(&paths.raw_dir, &config.input)?;
    info!("combined {} rows from {}", runs.len(), paths.raw_dir.display());

    create_dir_all(&paths.out_dir)?;
    write_table(&paths.out_dir.join(tables::COMBINED_RUNS_CSV), &runs)?;

    let step_summary = summarize_stepwise(&runs);
    write_table(&paths.out_dir.join(tables::STEP_SUMMARY_CSV), &step_summary)?;

    let outcome = summarize_final(&runs);
    info!("final step {}", outcome.final_step);
    write_table(
        &paths.out_dir.join(tables::CROSSING_STEPS_CSV),
        &outcome.crossings,
    )?;
    write_table(
        &paths.out_dir.join(tables::FINAL_SUMMARY_CSV),
        &outcome.summary,
    )?;

    let years = milestone_years(&config.key_points.milestone_years, &step_summary);
    let key_points = build_key_points(
        &step_summary,
        &outcome.summary,
        &config.key_points.milestone_years,
    );
    write_key_points(
        &paths.out_dir.join(tables::KEY_POINTS_CSV),
        &key_points,
        &years,
    )?;

    let median_diff = median_share_difference(&step_summary);
    write_table(&paths.out_dir.join(tables::MEDIAN_DIFF_CSV), &median_diff)?;

    if config.figures.enabled {
        create_dir_all(&paths.fig_dir)?;
        charts::render_all(
            &paths.fig_dir,
            &step_summary,
            &outcome.final_rows,
            &median_diff,
        )?;
    } else {
        info!("figure rendering disabled");
    }

    Ok(Report {
        runs,
        step_summary,
        outcome,
        key_points,
        median_diff,
    })
}

fn format_cell(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.6}")
    } else {
        "NaN".to_string()
    }
}

/// Row count plus the condensed final-share table printed after a run.
pub fn console_summary(report: &Report) -> String {
    let header = ["scenario", "mean_final_share", "p10_final_share", "p90_final_share"];
    let rows: Vec<[String; 4]> = report
        .outcome
        .summary
        .iter()
        .map(|s| {
            [
                s.scenario.clone(),
                format_cell(s.mean_final_share),
                format_cell(s.p10_final_share),
                format_cell(s.p90_final_share),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = format!("Combined rows: {}\n", report.runs.len());
    out.push_str(&format_line(header, widths));
    for row in &rows {
        out.push_str(&format_line(
            [
                row[0].as_str(),
                row[1].as_str(),
                row[2].as_str(),
                row[3].as_str(),
            ],
            widths,
        ));
    }
    out
}

fn format_line(cells: [&str; 4], widths: [usize; 4]) -> String {
    let mut s = format!("{:<w$}", cells[0], w = widths[0]);
    for (cell, w) in cells.iter().zip(widths).skip(1) {
        s.push_str(&format!("  {cell:>w$}"));
    }
    s.push('\n');
    s
}
