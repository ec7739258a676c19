//! AWS Lambda handler for reform cost estimates
//!
//! Accepts a reform (and optional baseline adjustment) as JSON and returns
//! the per-year cost report. Microdata can be sent inline as CSV text;
//! otherwise the bundled default file is used.

use std::sync::Arc;
use std::time::{Duration, Instant};

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};

use tax_reform_cost::engine::CreditEngineConfig;
use tax_reform_cost::estimate::{AggregatorConfig, CancelToken, EstimateOutcome};
use tax_reform_cost::output::AnalysisOutput;
use tax_reform_cost::records::{construct_population, load_records_from_reader};
use tax_reform_cost::{CostAggregator, CreditEngine, PolicySpec};

/// Input for one estimate
#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub reform: PolicySpec,

    /// Baseline adjustment applied under both scenarios (default: none)
    #[serde(default)]
    pub baseline: PolicySpec,

    #[serde(default = "default_start_year")]
    pub start_year: i32,

    #[serde(default = "default_end_year")]
    pub end_year: i32,

    /// Explicit year list; overrides start/end
    #[serde(default)]
    pub years: Option<Vec<i32>>,

    /// Microdata CSV text with the standard columns
    #[serde(default)]
    pub records_csv: Option<String>,

    #[serde(default)]
    pub engine: CreditEngineConfig,

    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Return a partial report if the estimate runs longer than this
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
}

fn default_start_year() -> i32 { 2025 }
fn default_end_year() -> i32 { 2034 }

impl EstimateRequest {
    fn horizon(&self) -> Vec<i32> {
        match &self.years {
            Some(years) => years.clone(),
            None => (self.start_year..=self.end_year).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub record_count: usize,
    #[serde(flatten)]
    pub output: AnalysisOutput<EstimateOutcome>,
    pub execution_time_ms: u64,
}

async fn handler(event: LambdaEvent<EstimateRequest>) -> Result<EstimateResponse, Error> {
    let start = Instant::now();
    let request = event.payload;

    let records = match &request.records_csv {
        Some(text) => load_records_from_reader(text.as_bytes())?,
        None => construct_population()?,
    };
    let records = Arc::new(records);
    let record_count = records.len();

    let years = request.horizon();
    let aggregator = CostAggregator::with_config(
        CreditEngine::new(request.engine),
        AggregatorConfig {
            parallel: true,
            max_threads: request.max_threads,
        },
    );

    let cancel = CancelToken::new();
    let watchdog = request.time_limit_secs.map(|secs| {
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            token.cancel();
        })
    });

    let (reform, baseline, horizon) = (request.reform, request.baseline, years.clone());
    let estimate = tokio::task::spawn_blocking(move || {
        aggregator.estimate_cancellable(&reform, &baseline, &horizon, || Arc::clone(&records), &cancel)
    })
    .await;
    if let Some(timer) = watchdog {
        timer.abort();
    }
    let outcome = estimate??;

    if !outcome.is_complete() {
        log::warn!("returning partial report after {:?}", start.elapsed());
    }

    Ok(EstimateResponse {
        record_count,
        output: AnalysisOutput::new(&years, outcome),
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
