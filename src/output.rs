//! Report persistence and console formatting
//!
//! The persisted table keeps the column names downstream consumers expect:
//! `year, baseline_revenue, reform_revenue, cost`. Rounding happens only
//! in the console table and the comparison table. Rows from a cancelled run
//! never go to the report path; they are written next to it as
//! `<name>.partial.csv`.

use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::estimate::{CostReport, EstimateOutcome, PartialReport, ReformComparison, YearCost};

/// Default file name for the per-year report
pub const DEFAULT_OUTPUT_PATH: &str = "reform_cost_analysis.csv";

/// Write the per-year table at full precision
pub fn write_report_csv<W: Write>(writer: W, years: &[YearCost]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if years.is_empty() {
        csv_writer.write_record(["year", "baseline_revenue", "reform_revenue", "cost"])?;
    }
    for year in years {
        csv_writer.serialize(year)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the per-year table to a file
pub fn save_report_csv<P: AsRef<Path>>(path: P, years: &[YearCost]) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path)?;
    write_report_csv(file, years)
}

/// File an outcome's rows belong in: `path` when complete, the partial path otherwise
pub fn outcome_csv_path(path: &Path, outcome: &EstimateOutcome) -> PathBuf {
    match outcome {
        EstimateOutcome::Complete(_) => path.to_path_buf(),
        EstimateOutcome::Cancelled(_) => path.with_extension("partial.csv"),
    }
}

/// Write an outcome's rows and return the path actually written
pub fn save_outcome_csv(path: &Path, outcome: &EstimateOutcome) -> Result<PathBuf, csv::Error> {
    let target = outcome_csv_path(path, outcome);
    let rows = match outcome {
        EstimateOutcome::Complete(report) => report.years(),
        EstimateOutcome::Cancelled(partial) => partial.completed.as_slice(),
    };
    save_report_csv(&target, rows)?;
    Ok(target)
}

/// Round to two decimals for display
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Console table with totals and summary statistics
pub fn render_report(report: &CostReport) -> String {
    let mut out = render_rows(report.years());

    let _ = writeln!(out, "{}", "-".repeat(80));
    let _ = writeln!(out, "{:<8} {:<18} {:<18} ${:>15.2}", "TOTAL", "", "", report.total_cost());
    let _ = writeln!(out, "{}", "=".repeat(80));

    let first = report.first_year();
    let last = report.last_year();
    let _ = writeln!(out, "\nSummary Statistics:");
    let _ = writeln!(out, "  {}-Year Total Cost: ${:.2} billion", report.len(), report.total_cost());
    let _ = writeln!(out, "  Average Annual Cost: ${:.2} billion", report.average_annual_cost());
    let _ = writeln!(out, "  First Year Cost ({}): ${:.2} billion", first.year, report.first_year_cost());
    let _ = writeln!(out, "  Final Year Cost ({}): ${:.2} billion", last.year, report.last_year_cost());
    out
}

/// Console table for a cancelled run; no totals are shown
pub fn render_partial(partial: &PartialReport) -> String {
    let mut out = render_rows(&partial.completed);
    let _ = writeln!(out, "{}", "-".repeat(80));
    let _ = writeln!(
        out,
        "INCOMPLETE: run cancelled, {} of {} years estimated (missing: {:?})",
        partial.completed.len(),
        partial.requested_years.len(),
        partial.missing_years()
    );
    out
}

fn render_rows(years: &[YearCost]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "-".repeat(80));
    let _ = writeln!(out, "{:<8} {:<18} {:<18} {:<18}", "Year", "Baseline ($B)", "Reform ($B)", "Cost ($B)");
    let _ = writeln!(out, "{}", "-".repeat(80));
    for year in years {
        let _ = writeln!(
            out,
            "{:<8} ${:>15.2}    ${:>15.2}    ${:>15.2}",
            year.year, year.baseline_revenue, year.reform_revenue, year.cost
        );
    }
    out
}

/// Year × reform cost table, rounded to two decimals, with a total row
pub fn write_comparison_csv<W: Write>(writer: W, comparison: &ReformComparison) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["year".to_string()];
    header.extend(comparison.reports.iter().map(|(name, _)| name.clone()));
    csv_writer.write_record(&header)?;

    for (index, year) in comparison.years.iter().enumerate() {
        let mut row = vec![year.to_string()];
        row.extend(
            comparison
                .reports
                .iter()
                .map(|(_, report)| format!("{:.2}", round2(report.years()[index].cost))),
        );
        csv_writer.write_record(&row)?;
    }

    let mut total = vec!["total".to_string()];
    total.extend(
        comparison
            .reports
            .iter()
            .map(|(_, report)| format!("{:.2}", round2(report.total_cost()))),
    );
    csv_writer.write_record(&total)?;

    csv_writer.flush()?;
    Ok(())
}

/// JSON envelope for machine consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput<T> {
    pub generated_at: DateTime<Utc>,
    pub horizon: Vec<i32>,
    pub result: T,
}

impl<T> AnalysisOutput<T> {
    pub fn new(horizon: &[i32], result: T) -> Self {
        Self {
            generated_at: Utc::now(),
            horizon: horizon.to_vec(),
            result,
        }
    }
}
