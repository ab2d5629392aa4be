use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::loader::RunRecord;
use crate::stats::{Band, mean};

/// Cross-run distribution of one (scenario, step) cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepSummary {
    pub scenario: String,
    pub scenario_label: String,
    pub step: i64,
    pub year: i64,
    pub runs: usize,
    pub mean_share: f64,
    pub p10_share: f64,
    pub p50_share: f64,
    pub p90_share: f64,
    pub mean_total_population: f64,
    pub p10_total_population: f64,
    pub p50_total_population: f64,
    pub p90_total_population: f64,
}

/// One row per (scenario, step), ordered by scenario key then step.
pub fn summarize_stepwise(rows: &[RunRecord]) -> Vec<StepSummary> {
    let mut cells: BTreeMap<(&str, i64), Vec<&RunRecord>> = BTreeMap::new();
    for row in rows {
        cells
            .entry((row.scenario.as_str(), row.step))
            .or_default()
            .push(row);
    }

    cells
        .into_iter()
        .map(|((scenario, step), cell)| {
            let first = cell[0];
            let runs: BTreeSet<i64> = cell.iter().map(|r| r.run).collect();
            let shares: Vec<f64> = cell.iter().map(|r| r.muslim_share).collect();
            let totals: Vec<f64> = cell.iter().map(|r| r.total_population).collect();
            let share_band = Band::of(&shares);
            let total_band = Band::of(&totals);
            StepSummary {
                scenario: scenario.to_string(),
                scenario_label: first.scenario_label.clone(),
                step,
                year: first.year,
                runs: runs.len(),
                mean_share: mean(&shares),
                p10_share: share_band.p10,
                p50_share: share_band.p50,
                p90_share: share_band.p90,
                mean_total_population: mean(&totals),
                p10_total_population: total_band.p10,
                p50_total_population: total_band.p50,
                p90_total_population: total_band.p90,
            }
        })
        .collect()
}

/// Summaries of one scenario, in step order.
pub fn scenario_rows<'a>(summary: &'a [StepSummary], scenario: &str) -> Vec<&'a StepSummary> {
    let mut rows: Vec<&StepSummary> = summary.iter().filter(|r| r.scenario == scenario).collect();
    rows.sort_by_key(|r| r.year);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(scenario: &str, run: i64, step: i64, share: f64, total: f64) -> RunRecord {
        RunRecord {
            scenario: scenario.to_string(),
            scenario_label: scenario.to_uppercase(),
            run,
            step,
            total_population: total,
            muslim_population: share * total,
            non_muslim_population: (1.0 - share) * total,
            muslim_share: share,
            year: 2026 + step,
        }
    }

    #[test]
    fn groups_by_scenario_and_step_in_key_order() {
        let rows = vec![
            record("b", 1, 1, 0.2, 100.0),
            record("a", 1, 0, 0.1, 100.0),
            record("b", 1, 0, 0.1, 100.0),
            record("a", 2, 0, 0.3, 300.0),
        ];
        let summary = summarize_stepwise(&rows);
        let keys: Vec<(&str, i64)> = summary
            .iter()
            .map(|s| (s.scenario.as_str(), s.step))
            .collect();
        assert_eq!(keys, vec![("a", 0), ("b", 0), ("b", 1)]);

        let a0 = &summary[0];
        assert_eq!(a0.runs, 2);
        assert_eq!(a0.year, 2026);
        assert_eq!(a0.scenario_label, "A");
        assert!((a0.mean_share - 0.2).abs() < 1e-12);
        assert!((a0.p50_share - 0.2).abs() < 1e-12);
        assert!((a0.p10_share - 0.12).abs() < 1e-12);
        assert!((a0.p90_total_population - 280.0).abs() < 1e-9);
    }

    #[test]
    fn run_count_is_distinct_runs() {
        let rows = vec![
            record("a", 1, 0, 0.1, 100.0),
            record("a", 1, 0, 0.2, 100.0),
            record("a", 3, 0, 0.3, 100.0),
        ];
        let summary = summarize_stepwise(&rows);
        assert_eq!(summary[0].runs, 2);
    }

    #[test]
    fn scenario_rows_filters_and_orders_by_year() {
        let rows = vec![
            record("a", 1, 2, 0.3, 100.0),
            record("b", 1, 0, 0.1, 100.0),
            record("a", 1, 0, 0.1, 100.0),
        ];
        let summary = summarize_stepwise(&rows);
        let a: Vec<i64> = scenario_rows(&summary, "a").iter().map(|r| r.year).collect();
        assert_eq!(a, vec![2026, 2028]);
        assert!(scenario_rows(&summary, "missing").is_empty());
    }
}
