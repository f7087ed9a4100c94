//! Training run: load, split, fit, evaluate, persist.

use std::path::{Path, PathBuf};

use triage_core::{ArtifactSet, EstimatorKind, MetricsReport, ModelVersion, Pipeline};

use crate::dataset::DatasetSource;
use crate::error::{TrainError, TrainResult};
use crate::estimator::Fit;
use crate::metrics;
use crate::preprocessing::{fit_scaler, transform};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Parameters of one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub seed: u64,
    pub model: EstimatorKind,
    pub output_dir: PathBuf,
    pub test_size: f64,
    pub version: Option<String>,
    pub dataset: DatasetSource,
}

impl TrainConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            seed: DEFAULT_SEED,
            model: EstimatorKind::Plain,
            output_dir: output_dir.into(),
            test_size: DEFAULT_TEST_SIZE,
            version: None,
            dataset: DatasetSource::Reference,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_model(mut self, model: EstimatorKind) -> Self {
        self.model = model;
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_dataset(mut self, dataset: DatasetSource) -> Self {
        self.dataset = dataset;
        self
    }
}

/// What a successful run produced and where it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOutcome {
    pub artifacts: ArtifactSet,
    pub metrics: MetricsReport,
    pub output_dir: PathBuf,
}

/// Run the pipeline end to end and write the artifact set to `cfg.output_dir`.
pub fn train(cfg: &TrainConfig) -> TrainResult<TrainOutcome> {
    if cfg.output_dir.as_os_str().is_empty() {
        return Err(TrainError::config("output directory must not be empty"));
    }

    let dataset = cfg.dataset.load()?;
    tracing::info!(
        rows = dataset.len(),
        features = dataset.schema().len(),
        seed = cfg.seed,
        model = %cfg.model,
        "dataset loaded"
    );

    let (train_set, test_set) = dataset.split(cfg.test_size, cfg.seed)?;

    // Scaler sees the training partition only.
    let scaler = fit_scaler(train_set.rows());
    let z_train = transform(&scaler, train_set.rows());
    let estimator = cfg.model.fit(&z_train, train_set.targets())?;
    let pipeline = Pipeline::new(scaler, estimator);

    let preds: Vec<f64> = test_set.rows().iter().map(|r| pipeline.predict_row(r)).collect();
    let report = MetricsReport {
        model: cfg.model,
        seed: cfg.seed,
        test_size: cfg.test_size,
        rmse: metrics::rmse(test_set.targets(), &preds),
        mae: metrics::mae(test_set.targets(), &preds),
        r2: metrics::r2(test_set.targets(), &preds),
        n_train: train_set.len(),
        n_test: test_set.len(),
    };
    tracing::info!(rmse = report.rmse, r2 = report.r2, n_test = report.n_test, "validation complete");

    let version = cfg.version.as_deref().map(ModelVersion::new).unwrap_or_default();
    let artifacts = ArtifactSet::new(pipeline, dataset.schema().clone(), version)?;
    persist(&cfg.output_dir, &artifacts, &report)?;

    Ok(TrainOutcome {
        artifacts,
        metrics: report,
        output_dir: cfg.output_dir.clone(),
    })
}

fn persist(dir: &Path, artifacts: &ArtifactSet, report: &MetricsReport) -> TrainResult<()> {
    artifacts.write(dir)?;
    report.write(dir)?;
    tracing::info!(dir = %dir.display(), version = %artifacts.version, "artifacts written");
    Ok(())
}
