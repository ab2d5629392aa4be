//! End-of-horizon outcomes: threshold crossings per run and the per-scenario
//! distribution of the final share.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::loader::RunRecord;
use crate::stats::{Band, fraction_at_least, mean, median};

/// Share thresholds tracked for crossings and exceedance fractions.
pub const THRESHOLDS: [f64; 3] = [0.5, 0.75, 0.95];

/// First step at which a run's share reached each of [`THRESHOLDS`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CrossingRecord {
    pub scenario: String,
    pub run: i64,
    pub first_step_ge_0_5: Option<i64>,
    pub first_step_ge_0_75: Option<i64>,
    pub first_step_ge_0_95: Option<i64>,
}

impl CrossingRecord {
    fn new(scenario: &str, run: i64, steps: [Option<i64>; 3]) -> Self {
        Self {
            scenario: scenario.to_string(),
            run,
            first_step_ge_0_5: steps[0],
            first_step_ge_0_75: steps[1],
            first_step_ge_0_95: steps[2],
        }
    }

    pub fn first_steps(&self) -> [Option<i64>; 3] {
        [
            self.first_step_ge_0_5,
            self.first_step_ge_0_75,
            self.first_step_ge_0_95,
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinalSummary {
    pub scenario: String,
    pub scenario_label: String,
    pub runs: usize,
    pub mean_final_share: f64,
    pub p10_final_share: f64,
    pub median_final_share: f64,
    pub p90_final_share: f64,
    pub mean_final_total_pop: f64,
    pub mean_final_muslim_pop: f64,
    pub mean_final_non_muslim_pop: f64,
    pub share_runs_ge_50: f64,
    pub share_runs_ge_75: f64,
    pub share_runs_ge_95: f64,
    pub median_first_step_ge_0_5: Option<f64>,
    pub median_first_step_ge_0_75: Option<f64>,
    pub median_first_step_ge_0_95: Option<f64>,
}

impl FinalSummary {
    pub fn exceedance(&self) -> [f64; 3] {
        [
            self.share_runs_ge_50,
            self.share_runs_ge_75,
            self.share_runs_ge_95,
        ]
    }
}

#[derive(Clone, Debug)]
pub struct FinalOutcome {
    pub final_step: i64,
    /// Rows observed at `final_step`, in input order.
    pub final_rows: Vec<RunRecord>,
    pub crossings: Vec<CrossingRecord>,
    pub summary: Vec<FinalSummary>,
}

/// First step (ascending) whose share meets each threshold. No extrapolation
/// past the observed horizon.
pub fn first_crossings(run_rows: &[&RunRecord]) -> [Option<i64>; 3] {
    let mut ordered: Vec<&RunRecord> = run_rows.to_vec();
    ordered.sort_by_key(|r| r.step);
    THRESHOLDS.map(|threshold| {
        ordered
            .iter()
            .find(|r| r.muslim_share >= threshold)
            .map(|r| r.step)
    })
}

pub fn crossings(rows: &[RunRecord]) -> Vec<CrossingRecord> {
    let mut by_run: BTreeMap<(&str, i64), Vec<&RunRecord>> = BTreeMap::new();
    for row in rows {
        by_run
            .entry((row.scenario.as_str(), row.run))
            .or_default()
            .push(row);
    }
    by_run
        .into_iter()
        .map(|((scenario, run), run_rows)| {
            CrossingRecord::new(scenario, run, first_crossings(&run_rows))
        })
        .collect()
}

/// Median first-crossing step per scenario and threshold, over the runs that
/// crossed. Runs that never crossed are left out, not imputed.
fn median_crossings(crossings: &[CrossingRecord]) -> BTreeMap<&str, [Option<f64>; 3]> {
    let mut steps: BTreeMap<&str, [Vec<f64>; 3]> = BTreeMap::new();
    for crossing in crossings {
        let entry = steps.entry(crossing.scenario.as_str()).or_default();
        for (k, step) in crossing.first_steps().into_iter().enumerate() {
            if let Some(step) = step {
                entry[k].push(step as f64);
            }
        }
    }
    steps
        .into_iter()
        .map(|(scenario, per_threshold)| {
            let medians = per_threshold.map(|values| {
                if values.is_empty() {
                    None
                } else {
                    Some(median(&values))
                }
            });
            (scenario, medians)
        })
        .collect()
}

pub fn summarize_final(rows: &[RunRecord]) -> FinalOutcome {
    let final_step = rows.iter().map(|r| r.step).max().unwrap_or(0);
    let final_rows: Vec<RunRecord> = rows
        .iter()
        .filter(|r| r.step == final_step)
        .cloned()
        .collect();
    let crossings = crossings(rows);
    let medians = median_crossings(&crossings);

    let mut by_scenario: BTreeMap<&str, Vec<&RunRecord>> = BTreeMap::new();
    for row in &final_rows {
        by_scenario.entry(row.scenario.as_str()).or_default().push(row);
    }

    let summary = by_scenario
        .into_iter()
        .map(|(scenario, group)| {
            let runs: BTreeSet<i64> = group.iter().map(|r| r.run).collect();
            let shares: Vec<f64> = group.iter().map(|r| r.muslim_share).collect();
            let totals: Vec<f64> = group.iter().map(|r| r.total_population).collect();
            let muslim: Vec<f64> = group.iter().map(|r| r.muslim_population).collect();
            let non_muslim: Vec<f64> = group.iter().map(|r| r.non_muslim_population).collect();
            let band = Band::of(&shares);
            let exceed = THRESHOLDS.map(|t| fraction_at_least(&shares, t));
            let crossing = medians.get(scenario).copied().unwrap_or([None; 3]);
            FinalSummary {
                scenario: scenario.to_string(),
                scenario_label: group[0].scenario_label.clone(),
                runs: runs.len(),
                mean_final_share: mean(&shares),
                p10_final_share: band.p10,
                median_final_share: band.p50,
                p90_final_share: band.p90,
                mean_final_total_pop: mean(&totals),
                mean_final_muslim_pop: mean(&muslim),
                mean_final_non_muslim_pop: mean(&non_muslim),
                share_runs_ge_50: exceed[0],
                share_runs_ge_75: exceed[1],
                share_runs_ge_95: exceed[2],
                median_first_step_ge_0_5: crossing[0],
                median_first_step_ge_0_75: crossing[1],
                median_first_step_ge_0_95: crossing[2],
            }
        })
        .collect();

    FinalOutcome {
        final_step,
        final_rows,
        crossings,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(scenario: &str, run: i64, step: i64, share: f64) -> RunRecord {
        RunRecord {
            scenario: scenario.to_string(),
            scenario_label: format!("{scenario} label"),
            run,
            step,
            total_population: 1000.0,
            muslim_population: share * 1000.0,
            non_muslim_population: (1.0 - share) * 1000.0,
            muslim_share: share,
            year: 2026 + step,
        }
    }

    fn trajectory(scenario: &str, run: i64, shares: &[f64]) -> Vec<RunRecord> {
        shares
            .iter()
            .enumerate()
            .map(|(step, &share)| record(scenario, run, step as i64, share))
            .collect()
    }

    #[test]
    fn first_crossing_uses_step_order_not_row_order() {
        let mut rows = trajectory("s", 1, &[0.4, 0.6, 0.8, 0.97]);
        rows.reverse();
        let refs: Vec<&RunRecord> = rows.iter().collect();
        assert_eq!(first_crossings(&refs), [Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn threshold_is_inclusive_and_absent_when_never_reached() {
        let rows = trajectory("s", 1, &[0.2, 0.5, 0.74]);
        let refs: Vec<&RunRecord> = rows.iter().collect();
        assert_eq!(first_crossings(&refs), [Some(1), None, None]);
    }

    #[test]
    fn crossings_are_monotone_in_threshold() {
        let mut rows = trajectory("s", 1, &[0.1, 0.55, 0.5, 0.8, 0.96]);
        rows.extend(trajectory("s", 2, &[0.96, 0.2, 0.3, 0.4, 0.5]));
        for crossing in crossings(&rows) {
            let steps = crossing.first_steps();
            if let [Some(a), Some(b), Some(c)] = steps {
                assert!(a <= b && b <= c, "{steps:?}");
            }
        }
    }

    #[test]
    fn final_summary_uses_global_final_step() {
        let mut rows = trajectory("a", 1, &[0.3, 0.5, 0.8]);
        rows.extend(trajectory("a", 2, &[0.3, 0.4, 0.6]));
        rows.extend(trajectory("b", 1, &[0.1, 0.1]));
        let outcome = summarize_final(&rows);

        assert_eq!(outcome.final_step, 2);
        assert_eq!(outcome.final_rows.len(), 2);
        // Scenario b stops before the final step and gets no summary row.
        assert_eq!(outcome.summary.len(), 1);
        let a = &outcome.summary[0];
        assert_eq!(a.scenario, "a");
        assert_eq!(a.scenario_label, "a label");
        assert_eq!(a.runs, 2);
        assert!((a.mean_final_share - 0.7).abs() < 1e-12);
        assert!((a.median_final_share - 0.7).abs() < 1e-12);
        assert!((a.share_runs_ge_50 - 1.0).abs() < 1e-12);
        assert!((a.share_runs_ge_75 - 0.5).abs() < 1e-12);
        assert_eq!(a.share_runs_ge_95, 0.0);
        assert!((a.mean_final_muslim_pop - 700.0).abs() < 1e-9);
    }

    #[test]
    fn median_crossing_excludes_runs_that_never_crossed() {
        let mut rows = trajectory("a", 1, &[0.3, 0.5, 0.6, 0.6]);
        rows.extend(trajectory("a", 2, &[0.3, 0.4, 0.4, 0.5]));
        rows.extend(trajectory("a", 3, &[0.1, 0.1, 0.1, 0.1]));
        let outcome = summarize_final(&rows);
        let a = &outcome.summary[0];
        assert_eq!(a.median_first_step_ge_0_5, Some(2.0));
        assert_eq!(a.median_first_step_ge_0_75, None);
        assert_eq!(a.median_first_step_ge_0_95, None);
        assert_eq!(outcome.crossings.len(), 3);
        assert_eq!(outcome.crossings[2].first_steps(), [None, None, None]);
    }
}
