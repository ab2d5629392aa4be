//! Reads NetLogo BehaviorSpace "table" exports into [`RunRecord`]s.
//!
//! Each export starts with a metadata preamble, then a header whose column
//! names are the reporter expressions of the experiment. Those expressions are
//! long and sometimes wrapped in extra annotation, so logical columns are
//! resolved by exact or substring match rather than by position.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::InputConfig;
use crate::error::{ReportError, Result};
use crate::scenario::{Scenario, label_for_key};

/// One row per (scenario, run, step).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunRecord {
    pub scenario: String,
    pub scenario_label: String,
    pub run: i64,
    pub step: i64,
    pub total_population: f64,
    pub muslim_population: f64,
    pub non_muslim_population: f64,
    pub muslim_share: f64,
    pub year: i64,
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnRule {
    pub name: &'static str,
    pub needle: &'static str,
    pub exact: bool,
}

pub const RUN_COLUMN: ColumnRule = ColumnRule {
    name: "run",
    needle: "[run number]",
    exact: false,
};
pub const STEP_COLUMN: ColumnRule = ColumnRule {
    name: "step",
    needle: "[step]",
    exact: false,
};
pub const TOTAL_COLUMN: ColumnRule = ColumnRule {
    name: "total_population",
    needle: "count turtles",
    exact: true,
};
pub const MUSLIM_COLUMN: ColumnRule = ColumnRule {
    name: "muslim_population",
    needle: "count turtles with [religion = \"muslim\"]",
    exact: true,
};
pub const NON_MUSLIM_COLUMN: ColumnRule = ColumnRule {
    name: "non_muslim_population",
    needle: "count turtles with [religion = \"non-muslim\"]",
    exact: true,
};
pub const SHARE_COLUMN: ColumnRule = ColumnRule {
    name: "muslim_share",
    needle: " / count turtles]",
    exact: false,
};

/// Index of the first header matching `rule`, compared case-insensitively.
pub fn pick_column(header: &StringRecord, rule: ColumnRule, path: &Path) -> Result<usize> {
    let needle = rule.needle.to_lowercase();
    header
        .iter()
        .position(|col| {
            let col = col.trim().to_lowercase();
            if rule.exact {
                col == needle
            } else {
                col.contains(&needle)
            }
        })
        .ok_or_else(|| ReportError::ColumnNotFound {
            column: rule.name,
            needle: rule.needle,
            path: path.to_path_buf(),
        })
}

#[derive(Clone, Copy, Debug)]
struct ColumnIndex {
    run: usize,
    step: usize,
    total: usize,
    muslim: usize,
    non_muslim: usize,
    share: usize,
}

impl ColumnIndex {
    fn resolve(header: &StringRecord, path: &Path) -> Result<Self> {
        Ok(Self {
            run: pick_column(header, RUN_COLUMN, path)?,
            step: pick_column(header, STEP_COLUMN, path)?,
            total: pick_column(header, TOTAL_COLUMN, path)?,
            muslim: pick_column(header, MUSLIM_COLUMN, path)?,
            non_muslim: pick_column(header, NON_MUSLIM_COLUMN, path)?,
            share: pick_column(header, SHARE_COLUMN, path)?,
        })
    }

    /// All six cells as numbers, or `None` if any is missing or non-numeric.
    fn parse_row(&self, record: &StringRecord) -> Option<[f64; 6]> {
        Some([
            parse_cell(record, self.run)?,
            parse_cell(record, self.step)?,
            parse_cell(record, self.total)?,
            parse_cell(record, self.muslim)?,
            parse_cell(record, self.non_muslim)?,
            parse_cell(record, self.share)?,
        ])
    }
}

fn parse_cell(record: &StringRecord, idx: usize) -> Option<f64> {
    let s = record.get(idx)?.trim();
    if s.is_empty() {
        return None;
    }
    let x = s.parse::<f64>().ok()?;
    if x.is_finite() { Some(x) } else { None }
}

/// Raw files in `dir` ending with `suffix`, sorted by path. Not recursive.
pub fn discover_run_files(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|name| name.ends_with(suffix))
        })
        .collect();
    files.sort();
    files
}

/// Discards `count` physical lines, blank ones included. Returns `false` if
/// the input ends first.
fn skip_lines(input: &mut impl BufRead, count: usize) -> Result<bool> {
    let mut line = Vec::new();
    for _ in 0..count {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn load_run_file(path: &Path, input: &InputConfig) -> Result<Vec<RunRecord>> {
    let scenario = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    if Scenario::from_key(&scenario).is_none() {
        warn!("unrecognized scenario `{scenario}` in {}", path.display());
    }
    let scenario_label = label_for_key(&scenario);

    let missing_header = || ReportError::MissingHeader {
        path: path.to_path_buf(),
        skipped: input.preamble_lines,
    };
    let mut lines = BufReader::new(File::open(path)?);
    if !skip_lines(&mut lines, input.preamble_lines)? {
        return Err(missing_header());
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(lines);
    let mut records = reader.records();
    let header = records.next().transpose()?.ok_or_else(missing_header)?;
    let cols = ColumnIndex::resolve(&header, path)?;

    let mut out = Vec::new();
    let mut dropped = 0usize;
    for (row_no, record) in records.enumerate() {
        let record = record?;
        let Some([run, step, total, muslim, non_muslim, share]) = cols.parse_row(&record) else {
            debug!(
                "dropping non-numeric row {} of {}",
                row_no + input.preamble_lines + 2,
                path.display()
            );
            dropped += 1;
            continue;
        };
        let run = run as i64;
        let step = step as i64;
        out.push(RunRecord {
            scenario: scenario.clone(),
            scenario_label: scenario_label.clone(),
            run,
            step,
            total_population: total,
            muslim_population: muslim,
            non_muslim_population: non_muslim,
            muslim_share: share,
            year: input.epoch_year + step,
        });
    }
    info!(
        "loaded {} rows from {} ({} dropped)",
        out.len(),
        path.display(),
        dropped
    );
    Ok(out)
}

/// Loads and concatenates every raw file in `dir`, in sorted path order.
pub fn load_raw_runs(dir: &Path, input: &InputConfig) -> Result<Vec<RunRecord>> {
    let files = discover_run_files(dir, &input.file_suffix);
    if files.is_empty() {
        return Err(ReportError::NoInputFiles {
            dir: dir.to_path_buf(),
        });
    }
    let mut all = Vec::new();
    for path in &files {
        all.extend(load_run_file(path, input)?);
    }
    Ok(all)
}
