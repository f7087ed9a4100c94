//! `triage-train` - fit the triage regression model and bake an artifact set.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::Parser;

use triage_core::EstimatorKind;
use triage_training::trainer::{DEFAULT_SEED, DEFAULT_TEST_SIZE};
use triage_training::{train, DatasetSource, TrainConfig};

#[derive(Debug, Parser)]
#[command(name = "triage-train")]
#[command(about = "Train the diabetes progression model and write its artifacts", long_about = None)]
struct Cli {
    /// Seed for the train/validation split
    #[arg(long, env = "TRIAGE_SEED", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Estimator: plain (OLS) or regularized (ridge)
    #[arg(long, env = "TRIAGE_MODEL", default_value = "plain", value_parser = EstimatorKind::from_str)]
    model: EstimatorKind,

    /// Directory the artifact set is written to
    #[arg(long, env = "TRIAGE_OUTPUT_DIR", default_value = "artifacts")]
    output_dir: PathBuf,

    /// Fraction of rows held out for validation
    #[arg(long, env = "TRIAGE_TEST_SIZE", default_value_t = DEFAULT_TEST_SIZE)]
    test_size: f64,

    /// Version tag recorded as MODEL_VERSION (e.g. v0.1)
    #[arg(long, env = "TRIAGE_VERSION")]
    version: Option<String>,

    /// CSV dataset (feature columns then `target`); defaults to the built-in reference data
    #[arg(long, env = "TRIAGE_DATA")]
    data: Option<PathBuf>,
}

fn main() -> Result<()> {
    triage_observability::init();

    let cli = Cli::parse();

    let mut cfg = TrainConfig::new(cli.output_dir)
        .with_seed(cli.seed)
        .with_model(cli.model)
        .with_test_size(cli.test_size)
        .with_dataset(cli.data.map_or(DatasetSource::Reference, DatasetSource::Csv));
    if let Some(version) = cli.version {
        cfg = cfg.with_version(version);
    }

    let outcome = train(&cfg).inspect_err(|e| tracing::error!("training failed: {e}"))?;

    println!("{}", serde_json::to_string_pretty(&outcome.metrics)?);
    Ok(())
}
