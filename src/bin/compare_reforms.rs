//! Cost several reforms side by side over the same horizon
//!
//! The reforms file is a JSON array of `{"name", "reform", "baseline"?}`
//! objects. Writes a year × reform cost table (billions, two decimals).
//!
//! Usage: cargo run --bin compare_reforms -- --reforms reforms.json

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use tax_reform_cost::engine::CreditEngineConfig;
use tax_reform_cost::estimate::{compare_reforms, AggregatorConfig, NamedReform};
use tax_reform_cost::output::write_comparison_csv;
use tax_reform_cost::records::{load_records, DEFAULT_RECORDS_PATH};
use tax_reform_cost::{CostAggregator, CreditEngine};

#[derive(Debug, Parser)]
#[command(name = "compare_reforms", about = "Side-by-side cost of several reforms")]
struct Args {
    /// JSON array of named reforms
    #[arg(long)]
    reforms: PathBuf,

    #[arg(long, default_value = DEFAULT_RECORDS_PATH)]
    records: PathBuf,

    #[arg(long, default_value_t = 2025)]
    start_year: i32,

    #[arg(long, default_value_t = 2034)]
    end_year: i32,

    #[arg(long, default_value = "reform_comparison.csv")]
    output: PathBuf,

    /// Annual growth applied to microdata amounts after the data year
    #[arg(long, default_value_t = 0.0)]
    growth_rate: f64,

    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let text = std::fs::read_to_string(&args.reforms)
        .with_context(|| format!("failed to read {}", args.reforms.display()))?;
    let reforms: Vec<NamedReform> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse reforms in {}", args.reforms.display()))?;
    anyhow::ensure!(!reforms.is_empty(), "no reforms in {}", args.reforms.display());

    let records = Arc::new(
        load_records(&args.records).with_context(|| format!("failed to load {}", args.records.display()))?,
    );
    println!("Loaded {} records, {} reforms", records.len(), reforms.len());

    let engine = CreditEngine::new(CreditEngineConfig {
        growth_rate: args.growth_rate,
        ..Default::default()
    });
    let aggregator = CostAggregator::with_config(
        engine,
        AggregatorConfig {
            parallel: true,
            max_threads: args.threads,
        },
    );

    let years: Vec<i32> = (args.start_year..=args.end_year).collect();
    let comparison = compare_reforms(&aggregator, &reforms, &years, || Arc::clone(&records))?;

    println!("\n{:<24} {:>14} {:>14}", "Reform", "Total ($B)", "Avg/yr ($B)");
    println!("{}", "-".repeat(54));
    for (name, report) in &comparison.reports {
        println!(
            "{:<24} {:>14.2} {:>14.2}",
            name,
            report.total_cost(),
            report.average_annual_cost()
        );
    }

    let file = File::create(&args.output).with_context(|| format!("failed to create {}", args.output.display()))?;
    write_comparison_csv(file, &comparison)?;

    println!("\nComparison written to: {}", args.output.display());
    println!("Elapsed: {:?}", start.elapsed());
    Ok(())
}
