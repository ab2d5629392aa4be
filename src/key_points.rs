use std::collections::BTreeMap;

use crate::outcome::FinalSummary;
use crate::stepwise::StepSummary;

/// Share band and median population at one milestone year.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Milestone {
    pub year: i64,
    pub median_share: f64,
    pub p10_share: f64,
    pub p90_share: f64,
    pub median_pop: f64,
}

/// Final-step highlights joined in from [`FinalSummary`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FinalHighlights {
    pub mean_final_share: f64,
    pub p10_final_share: f64,
    pub p90_final_share: f64,
    pub mean_final_total_pop: f64,
    pub share_runs_ge: [f64; 3],
}

impl From<&FinalSummary> for FinalHighlights {
    fn from(summary: &FinalSummary) -> Self {
        Self {
            mean_final_share: summary.mean_final_share,
            p10_final_share: summary.p10_final_share,
            p90_final_share: summary.p90_final_share,
            mean_final_total_pop: summary.mean_final_total_pop,
            share_runs_ge: summary.exceedance(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyPoints {
    pub scenario: String,
    pub scenario_label: String,
    /// Only milestones observed for this scenario, in milestone order.
    pub milestones: Vec<Milestone>,
    pub highlights: Option<FinalHighlights>,
}

impl KeyPoints {
    pub fn milestone(&self, year: i64) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.year == year)
    }
}

/// Configured milestones followed by the final observed year, de-duplicated.
pub fn milestone_years(configured: &[i64], step_summary: &[StepSummary]) -> Vec<i64> {
    let mut years: Vec<i64> = Vec::with_capacity(configured.len() + 1);
    let final_year = step_summary.iter().map(|r| r.year).max();
    for &year in configured.iter().chain(final_year.iter()) {
        if !years.contains(&year) {
            years.push(year);
        }
    }
    years
}

/// One row per scenario of the step summary, ordered by scenario key.
pub fn build_key_points(
    step_summary: &[StepSummary],
    final_summary: &[FinalSummary],
    configured_years: &[i64],
) -> Vec<KeyPoints> {
    let years = milestone_years(configured_years, step_summary);

    let mut by_scenario: BTreeMap<&str, Vec<&StepSummary>> = BTreeMap::new();
    for row in step_summary {
        by_scenario.entry(row.scenario.as_str()).or_default().push(row);
    }

    by_scenario
        .into_iter()
        .map(|(scenario, group)| {
            let milestones = years
                .iter()
                .filter_map(|&year| {
                    let row = group.iter().find(|r| r.year == year)?;
                    Some(Milestone {
                        year,
                        median_share: row.p50_share,
                        p10_share: row.p10_share,
                        p90_share: row.p90_share,
                        median_pop: row.p50_total_population,
                    })
                })
                .collect();
            let highlights = final_summary
                .iter()
                .find(|f| f.scenario == scenario)
                .map(FinalHighlights::from);
            KeyPoints {
                scenario: scenario.to_string(),
                scenario_label: group[0].scenario_label.clone(),
                milestones,
                highlights,
            }
        })
        .collect()
}
