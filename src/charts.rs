//! Static PNG figures for the paper.
//!
//! Series are prepared from the in-memory aggregates by pure functions and only
//! then handed to `plotters`, so the selection logic (scenario order, skipped
//! scenarios) is testable without a font stack.

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;
use tracing::{debug, info};

use crate::compare::DifferencePoint;
use crate::error::{ReportError, Result};
use crate::loader::RunRecord;
use crate::scenario::Scenario;
use crate::stepwise::{StepSummary, scenario_rows};

pub const SHARE_TRAJECTORIES_PNG: &str = "fig1_muslim_share_trajectories.png";
pub const FINAL_SHARE_BOXPLOT_PNG: &str = "fig2_final_share_boxplot.png";
pub const POPULATION_TRAJECTORIES_PNG: &str = "fig3_total_population_trajectories.png";
pub const MEDIAN_DIFF_PNG: &str = "fig4_baseline_minus_no_migration.png";

const TRAJECTORY_SIZE: (u32, u32) = (2200, 1200);
const BOXPLOT_SIZE: (u32, u32) = (2400, 1200);
const DIFF_SIZE: (u32, u32) = (2000, 900);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Measure {
    Share,
    TotalPopulation,
}

impl Measure {
    fn band(self, row: &StepSummary) -> (f64, f64, f64) {
        match self {
            Measure::Share => (row.p10_share, row.p50_share, row.p90_share),
            Measure::TotalPopulation => (
                row.p10_total_population,
                row.p50_total_population,
                row.p90_total_population,
            ),
        }
    }
}

/// A point of a trajectory: (year, p10, p50, p90).
pub type BandPoint = (f64, f64, f64, f64);

#[derive(Clone, Debug, PartialEq)]
pub struct TrajectorySeries {
    pub scenario: Scenario,
    pub points: Vec<BandPoint>,
}

/// One series per known scenario with data, in display order.
pub fn trajectory_series(step_summary: &[StepSummary], measure: Measure) -> Vec<TrajectorySeries> {
    Scenario::ALL
        .into_iter()
        .filter_map(|scenario| {
            let rows = scenario_rows(step_summary, scenario.key());
            if rows.is_empty() {
                debug!("no step summary for {}, series skipped", scenario.key());
                return None;
            }
            let points = rows
                .into_iter()
                .map(|row| {
                    let (lo, mid, hi) = measure.band(row);
                    (row.year as f64, lo, mid, hi)
                })
                .collect();
            Some(TrajectorySeries { scenario, points })
        })
        .collect()
}

/// Final-step shares grouped by known scenario, in display order.
pub fn final_share_groups(final_rows: &[RunRecord]) -> Vec<(Scenario, Vec<f64>)> {
    Scenario::ALL
        .into_iter()
        .filter_map(|scenario| {
            let values: Vec<f64> = final_rows
                .iter()
                .filter(|r| r.scenario == scenario.key())
                .map(|r| r.muslim_share)
                .collect();
            if values.is_empty() {
                None
            } else {
                Some((scenario, values))
            }
        })
        .collect()
}

fn year_range(years: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (lo, hi) = years.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
        (lo.min(y), hi.max(y))
    });
    if !lo.is_finite() {
        return 0.0..1.0;
    }
    if hi - lo < 1.0 {
        return (lo - 0.5)..(hi + 0.5);
    }
    lo..hi
}

fn padded_range(lo: f64, hi: f64) -> std::ops::Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let pad = ((hi - lo) * 0.05).max(1e-6);
    (lo - pad)..(hi + pad)
}

struct TrajectoryStyle {
    title: &'static str,
    y_desc: &'static str,
    band_alpha: f64,
    unit_y: bool,
}

fn render_trajectories(
    out_path: &Path,
    series: &[TrajectorySeries],
    style: &TrajectoryStyle,
) -> std::result::Result<(), Box<dyn Error>> {
    let x_range = year_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)));
    let y_range = if style.unit_y {
        0.0..1.0
    } else {
        let lo = series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.1))
            .fold(f64::INFINITY, f64::min);
        let hi = series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.3))
            .fold(f64::NEG_INFINITY, f64::max);
        padded_range(lo, hi)
    };

    let root = BitMapBackend::new(out_path, TRAJECTORY_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(style.title, ("sans-serif", 40))
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(110)
        .build_cartesian_2d(x_range, y_range)?;
    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(style.y_desc)
        .x_label_formatter(&|x| format!("{x:.0}"))
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.25))
        .label_style(("sans-serif", 24))
        .draw()?;

    for s in series {
        let color = s.scenario.color();
        let mut poly: Vec<(f64, f64)> = s.points.iter().map(|(x, _, _, hi)| (*x, *hi)).collect();
        poly.extend(s.points.iter().rev().map(|(x, lo, _, _)| (*x, *lo)));
        chart.draw_series(std::iter::once(Polygon::new(
            poly,
            color.mix(style.band_alpha).filled(),
        )))?;
        chart
            .draw_series(LineSeries::new(
                s.points.iter().map(|(x, _, mid, _)| (*x, *mid)),
                color.stroke_width(4),
            ))?
            .label(s.scenario.label())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(4))
            });
    }
    if !series.is_empty() {
        chart
            .configure_series_labels()
            .label_font(("sans-serif", 22))
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK.mix(0.4))
            .draw()?;
    }
    root.present()?;
    Ok(())
}

fn render_final_share_boxplot(
    out_path: &Path,
    groups: &[(Scenario, Vec<f64>)],
    final_year: Option<i64>,
) -> std::result::Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(out_path, BOXPLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let title = "Distribution of final Muslim share across stochastic runs";
    let y_desc = match final_year {
        Some(year) => format!("Muslim share at year {year}"),
        None => "Muslim share at final step".to_string(),
    };

    if groups.is_empty() {
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 40))
            .margin(30)
            .x_label_area_size(70)
            .y_label_area_size(110)
            .build_cartesian_2d(0f32..1f32, 0f32..1f32)?;
        chart.configure_mesh().x_desc("Scenario").y_desc(y_desc).draw()?;
        root.present()?;
        return Ok(());
    }

    let labels: Vec<&str> = groups.iter().map(|(s, _)| s.label()).collect();
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 40))
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(110)
        .build_cartesian_2d(labels[..].into_segmented(), 0f32..1f32)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Scenario")
        .y_desc(y_desc)
        .light_line_style(BLACK.mix(0.05))
        .label_style(("sans-serif", 24))
        .draw()?;
    chart.draw_series(groups.iter().zip(labels.iter()).map(|((scenario, values), label)| {
        let quartiles = Quartiles::new(values.as_slice());
        Boxplot::new_vertical(SegmentValue::CenterOf(label), &quartiles)
            .width(120)
            .whisker_width(0.5)
            .style(scenario.color().stroke_width(3))
    }))?;
    root.present()?;
    Ok(())
}

fn render_median_difference(
    out_path: &Path,
    diff: &[DifferencePoint],
) -> std::result::Result<(), Box<dyn Error>> {
    let x_range = year_range(diff.iter().map(|d| d.year as f64));
    let lo = diff.iter().map(|d| d.difference).fold(0.0f64, f64::min);
    let hi = diff.iter().map(|d| d.difference).fold(0.0f64, f64::max);
    let y_range = padded_range(lo, hi);
    let (x0, x1) = (x_range.start, x_range.end);

    let root = BitMapBackend::new(out_path, DIFF_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Baseline minus no-migration: median Muslim share difference",
            ("sans-serif", 36),
        )
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(110)
        .build_cartesian_2d(x_range, y_range)?;
    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Median share difference")
        .x_label_formatter(&|x| format!("{x:.0}"))
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.25))
        .label_style(("sans-serif", 22))
        .draw()?;
    chart.draw_series(LineSeries::new(
        vec![(x0, 0.0), (x1, 0.0)],
        BLACK.stroke_width(2),
    ))?;
    chart.draw_series(LineSeries::new(
        diff.iter().map(|d| (d.year as f64, d.difference)),
        Scenario::Baseline.color().stroke_width(4),
    ))?;
    root.present()?;
    Ok(())
}

fn plot_err(name: &'static str) -> impl FnOnce(Box<dyn Error>) -> ReportError {
    move |err| ReportError::Plot {
        name: name.to_string(),
        message: err.to_string(),
    }
}

/// Renders the four figures into `fig_dir` from the in-memory aggregates.
pub fn render_all(
    fig_dir: &Path,
    step_summary: &[StepSummary],
    final_rows: &[RunRecord],
    diff: &[DifferencePoint],
) -> Result<()> {
    let shares = trajectory_series(step_summary, Measure::Share);
    render_trajectories(
        &fig_dir.join(SHARE_TRAJECTORIES_PNG),
        &shares,
        &TrajectoryStyle {
            title: "Simulated Muslim population share over time (median with 10-90% interval)",
            y_desc: "Muslim share of population",
            band_alpha: 0.15,
            unit_y: true,
        },
    )
    .map_err(plot_err(SHARE_TRAJECTORIES_PNG))?;

    let groups = final_share_groups(final_rows);
    let final_year = final_rows.first().map(|r| r.year);
    render_final_share_boxplot(&fig_dir.join(FINAL_SHARE_BOXPLOT_PNG), &groups, final_year)
        .map_err(plot_err(FINAL_SHARE_BOXPLOT_PNG))?;

    let populations = trajectory_series(step_summary, Measure::TotalPopulation);
    render_trajectories(
        &fig_dir.join(POPULATION_TRAJECTORIES_PNG),
        &populations,
        &TrajectoryStyle {
            title: "Simulated total population trajectories (median with 10-90% interval)",
            y_desc: "Population (agents)",
            band_alpha: 0.12,
            unit_y: false,
        },
    )
    .map_err(plot_err(POPULATION_TRAJECTORIES_PNG))?;

    render_median_difference(&fig_dir.join(MEDIAN_DIFF_PNG), diff)
        .map_err(plot_err(MEDIAN_DIFF_PNG))?;

    info!("saved figures to {}", fig_dir.display());
    Ok(())
}
