//! Tax Reform Cost CLI
//!
//! Estimates the multi-year cost of a credit reform against current law (or
//! a baseline adjustment) and writes the per-year table to CSV.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use tax_reform_cost::estimate::{CancelToken, EstimateOutcome};
use tax_reform_cost::output::{render_partial, render_report, save_outcome_csv, AnalysisOutput};
use tax_reform_cost::policy::load_policy_spec;
use tax_reform_cost::records::load_records;
use tax_reform_cost::{AnalysisConfig, CostAggregator, CreditEngine, PolicySpec};

#[derive(Debug, Parser)]
#[command(name = "tax_reform_cost", version, about = "Multi-year fiscal cost of a tax credit reform")]
struct Cli {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reform JSON file
    #[arg(long)]
    reform: Option<PathBuf>,

    /// Baseline adjustment JSON file (default: pure current law)
    #[arg(long)]
    baseline: Option<PathBuf>,

    /// Microdata CSV file
    #[arg(long)]
    records: Option<PathBuf>,

    #[arg(long)]
    start_year: Option<i32>,

    #[arg(long)]
    end_year: Option<i32>,

    /// Explicit comma-separated years; reported in the given order
    #[arg(long, value_delimiter = ',')]
    years: Option<Vec<i32>>,

    /// Output CSV path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Worker thread limit
    #[arg(long)]
    threads: Option<usize>,

    /// Estimate one year at a time
    #[arg(long)]
    sequential: bool,

    /// Abort after this many seconds, keeping the years already finished
    #[arg(long)]
    time_limit: Option<u64>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> Result<(AnalysisConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_path(path)
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => AnalysisConfig::default(),
        };

        if let Some(reform) = self.reform {
            config.reform_path = reform;
        }
        if self.baseline.is_some() {
            config.baseline_path = self.baseline;
        }
        if let Some(records) = self.records {
            config.records_path = records;
        }
        if let Some(start) = self.start_year {
            config.start_year = start;
        }
        if let Some(end) = self.end_year {
            config.end_year = end;
        }
        if self.years.is_some() {
            config.years = self.years;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if self.threads.is_some() {
            config.max_threads = self.threads;
        }
        if self.sequential {
            config.parallel = false;
        }
        if self.time_limit.is_some() {
            config.time_limit_secs = self.time_limit;
        }

        config.validate().map_err(anyhow::Error::msg)?;
        Ok((config, self.json))
    }
}

fn load_spec(path: &Path) -> Result<PolicySpec> {
    load_policy_spec(path)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("failed to load policy spec {}", path.display()))
}

fn main() -> Result<ExitCode> {
    env_logger::init();

    let (config, json_output) = Cli::parse().into_config()?;
    let start = Instant::now();

    let reform = load_spec(&config.reform_path)?;
    let baseline = match &config.baseline_path {
        Some(path) => load_spec(path)?,
        None => PolicySpec::empty(),
    };

    let records = Arc::new(
        load_records(&config.records_path)
            .with_context(|| format!("failed to load microdata {}", config.records_path.display()))?,
    );
    log::info!("loaded {} records in {:?}", records.len(), start.elapsed());

    let years = config.horizon();
    let aggregator = CostAggregator::with_config(CreditEngine::new(config.engine.clone()), config.aggregator_config());

    let cancel = CancelToken::new();
    if let Some(secs) = config.time_limit_secs {
        let watchdog = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(secs));
            watchdog.cancel();
        });
    }

    if !json_output {
        println!("{}", "=".repeat(80));
        println!("Reform {}-Year Fiscal Cost Analysis", years.len());
        println!("{}", "=".repeat(80));
        println!("Reform: {}", config.reform_path.display());
        match &config.baseline_path {
            Some(path) => println!("Baseline: current law + {}", path.display()),
            None => println!("Baseline: current law"),
        }
        println!("Years: {:?}", years);
    }

    let outcome = aggregator.estimate_cancellable(&reform, &baseline, &years, || Arc::clone(&records), &cancel)?;

    let written = save_outcome_csv(&config.output_path, &outcome)
        .with_context(|| format!("failed to write results next to {}", config.output_path.display()))?;

    if json_output {
        let envelope = AnalysisOutput::new(&years, &outcome);
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        match &outcome {
            EstimateOutcome::Complete(report) => print!("{}", render_report(report)),
            EstimateOutcome::Cancelled(partial) => print!("{}", render_partial(partial)),
        }
        println!("\nResults saved to: {}", written.display());
        println!("Total time: {:?}", start.elapsed());
    }

    if outcome.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        log::warn!("time limit reached; partial rows written to {}", written.display());
        Ok(ExitCode::FAILURE)
    }
}
