#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use paper_runs::config::ReportConfig;

pub const PREAMBLE: &str = "\"BehaviorSpace results (NetLogo 6.4.0)\"\n\
\"population.nlogo\"\n\
\"paper_runs\"\n\
\"01/15/2026 10:00:00:000 +0100\"\n\
\"min-pxcor\",\"max-pxcor\",\"min-pycor\",\"max-pycor\"\n\
\"-16\",\"16\",\"-16\",\"16\"\n";

pub const HEADER: &str = "\"[run number]\",\"migration-rate\",\"inflow-muslim-share\",\"[step]\",\
\"count turtles\",\
\"count turtles with [religion = \"\"muslim\"\"]\",\
\"count turtles with [religion = \"\"non-muslim\"\"]\",\
\"[count turtles with [religion = \"\"muslim\"\"] / count turtles] (reporter 4)\"\n";

pub const TOTAL: u32 = 1000;

pub fn unique_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!(
        "paper_runs_it_{}_{}",
        name,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    fs::create_dir_all(&p).unwrap();
    p
}

/// Writes `<dir>/<scenario>.csv` with one trajectory of shares per run.
/// Counts are derived from a fixed total so share == muslim / total.
pub fn write_run_file(dir: &Path, scenario: &str, runs: &[(u32, Vec<f64>)]) {
    fs::create_dir_all(dir).unwrap();
    let mut text = String::from(PREAMBLE);
    text.push_str(HEADER);
    for (run, shares) in runs {
        for (step, share) in shares.iter().enumerate() {
            let muslim = (share * TOTAL as f64).round() as u32;
            let non_muslim = TOTAL - muslim;
            let ratio = muslim as f64 / TOTAL as f64;
            text.push_str(&format!(
                "\"{run}\",\"0.01\",\"0.5\",\"{step}\",\"{TOTAL}\",\"{muslim}\",\"{non_muslim}\",\"{ratio}\"\n"
            ));
        }
    }
    fs::write(dir.join(format!("{scenario}.csv")), text).unwrap();
}

/// The three-scenario fixture: 2 runs x 3 steps (2026-2028) each.
pub fn write_standard_fixture(raw_dir: &Path) {
    write_run_file(
        raw_dir,
        "baseline_30y",
        &[(1, vec![0.3, 0.4, 0.5]), (2, vec![0.3, 0.4, 0.5])],
    );
    write_run_file(
        raw_dir,
        "no_migration_30y",
        &[(1, vec![0.3, 0.3, 0.3]), (2, vec![0.3, 0.3, 0.3])],
    );
    write_run_file(
        raw_dir,
        "high_inflow_share_30y",
        &[(1, vec![0.3, 0.6, 0.9]), (2, vec![0.4, 0.8, 0.96])],
    );
}

pub fn config_for(root: &Path) -> ReportConfig {
    let mut config = ReportConfig::default();
    config.paths.raw_dir = root.join("raw");
    config.paths.out_dir = root.join("out");
    config.paths.fig_dir = root.join("figures");
    config.figures.enabled = false;
    config
}

pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path)
        .unwrap_or_else(|e| panic!("failed to open {}: {e}", path.display()));
    let header = reader
        .headers()
        .unwrap()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(|s| s.to_string()).collect())
        .collect();
    (header, rows)
}

pub fn column(header: &[String], name: &str) -> usize {
    header
        .iter()
        .position(|h| h == name)
        .unwrap_or_else(|| panic!("missing column {name} in {header:?}"))
}
