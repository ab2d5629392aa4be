use std::collections::BTreeMap;

use serde::Serialize;

use crate::scenario::Scenario;
use crate::stepwise::{StepSummary, scenario_rows};

/// Median share of the calibrated baseline against the no-migration
/// counterfactual in one year.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DifferencePoint {
    pub year: i64,
    pub baseline: f64,
    pub no_migration: f64,
    pub difference: f64,
}

/// Baseline minus no-migration median share, for the years both scenarios
/// observed. Empty when either scenario is absent.
pub fn median_share_difference(step_summary: &[StepSummary]) -> Vec<DifferencePoint> {
    let counterfactual: BTreeMap<i64, f64> =
        scenario_rows(step_summary, Scenario::NoMigration.key())
            .into_iter()
            .map(|r| (r.year, r.p50_share))
            .collect();

    scenario_rows(step_summary, Scenario::Baseline.key())
        .into_iter()
        .filter_map(|r| {
            let no_migration = *counterfactual.get(&r.year)?;
            Some(DifferencePoint {
                year: r.year,
                baseline: r.p50_share,
                no_migration,
                difference: r.p50_share - no_migration,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(scenario: Scenario, year: i64, p50: f64) -> StepSummary {
        StepSummary {
            scenario: scenario.key().to_string(),
            scenario_label: scenario.label().to_string(),
            step: year - 2026,
            year,
            runs: 2,
            mean_share: p50,
            p10_share: p50,
            p50_share: p50,
            p90_share: p50,
            mean_total_population: 100.0,
            p10_total_population: 100.0,
            p50_total_population: 100.0,
            p90_total_population: 100.0,
        }
    }

    #[test]
    fn joins_on_shared_years_only() {
        let summary = vec![
            step(Scenario::Baseline, 2027, 0.4),
            step(Scenario::Baseline, 2026, 0.3),
            step(Scenario::NoMigration, 2027, 0.3),
            step(Scenario::NoMigration, 2028, 0.3),
            step(Scenario::HighInflowShare, 2027, 0.9),
        ];
        let diff = median_share_difference(&summary);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].year, 2027);
        assert!((diff[0].difference - 0.1).abs() < 1e-12);
    }

    #[test]
    fn missing_counterfactual_gives_empty_table() {
        let summary = vec![step(Scenario::Baseline, 2026, 0.3)];
        assert!(median_share_difference(&summary).is_empty());
    }
}
