//! Tabular regression datasets and the seeded train/validation split.

use std::fs;
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use triage_core::FeatureSchema;

use crate::error::{TrainError, TrainResult};

/// Name of the label column in CSV input.
pub const TARGET_COLUMN: &str = "target";

/// Rows in the built-in reference dataset.
pub const REFERENCE_ROWS: usize = 442;

/// Where a training run gets its rows from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DatasetSource {
    /// Built-in diabetes dataset.
    #[default]
    Reference,
    /// CSV with a header of feature names followed by a `target` column.
    Csv(PathBuf),
}

impl DatasetSource {
    pub fn load(&self) -> TrainResult<Dataset> {
        match self {
            DatasetSource::Reference => Dataset::reference(),
            DatasetSource::Csv(path) => Dataset::from_csv(path),
        }
    }
}

/// Feature matrix (row-major), targets, and the schema naming the columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    schema: FeatureSchema,
    rows: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl Dataset {
    pub fn new(schema: FeatureSchema, rows: Vec<Vec<f64>>, targets: Vec<f64>) -> TrainResult<Self> {
        if rows.len() != targets.len() {
            return Err(TrainError::dataset(
                None,
                format!("{} rows but {} targets", rows.len(), targets.len()),
            ));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != schema.len()) {
            return Err(TrainError::dataset(
                None,
                format!("row {i} has {} values, schema has {}", row.len(), schema.len()),
            ));
        }
        Ok(Self {
            schema,
            rows,
            targets,
        })
    }

    /// The diabetes dataset (Efron et al., 2004): 442 patients, ten baseline
    /// features mean-centered and scaled to unit column L2 norm, and a
    /// one-year disease progression target.
    pub fn reference() -> TrainResult<Self> {
        let bundled = linfa_datasets::diabetes();
        let rows: Vec<Vec<f64>> = bundled.records.rows().into_iter().map(|r| r.to_vec()).collect();
        let targets: Vec<f64> = bundled.targets.iter().copied().collect();
        Self::new(FeatureSchema::reference(), rows, targets)
    }

    /// Read a numeric CSV file: header names every feature column and ends
    /// with [`TARGET_COLUMN`].
    pub fn from_csv(path: &Path) -> TrainResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| TrainError::dataset(Some(path.to_path_buf()), e.to_string()))?;
        Self::parse_csv(&text).map_err(|reason| TrainError::dataset(Some(path.to_path_buf()), reason))
    }

    fn parse_csv(text: &str) -> Result<Self, String> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut names: Vec<String> = reader
            .headers()
            .map_err(|e| e.to_string())?
            .iter()
            .map(str::to_string)
            .collect();
        match names.pop() {
            Some(last) if last == TARGET_COLUMN => {}
            _ => return Err(format!("last header column must be '{TARGET_COLUMN}'")),
        }
        let schema = FeatureSchema::new(names).map_err(|e| e.to_string())?;

        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| e.to_string())?;
            let line = record.position().map_or(0, |p| p.line());
            if record.len() != schema.len() + 1 {
                return Err(format!(
                    "line {line}: expected {} columns, found {}",
                    schema.len() + 1,
                    record.len()
                ));
            }
            let values = record
                .iter()
                .map(|cell| {
                    cell.parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .ok_or_else(|| format!("line {line}: '{cell}' is not a finite number"))
                })
                .collect::<Result<Vec<f64>, String>>()?;
            let (features, target) = values.split_at(schema.len());
            rows.push(features.to_vec());
            targets.push(target[0]);
        }

        if rows.is_empty() {
            return Err("no data rows".to_string());
        }

        Ok(Self {
            schema,
            rows,
            targets,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Seeded shuffle split into `(train, validation)`.
    ///
    /// The validation partition holds `ceil(len * test_size)` rows. The same
    /// seed always selects the same rows.
    pub fn split(&self, test_size: f64, seed: u64) -> TrainResult<(Dataset, Dataset)> {
        if !(test_size.is_finite() && test_size > 0.0 && test_size < 1.0) {
            return Err(TrainError::config(format!(
                "test_size must be in (0, 1), got {test_size}"
            )));
        }

        let n = self.len();
        let n_test = (n as f64 * test_size).ceil() as usize;
        let n_train = n.saturating_sub(n_test);
        if n_test == 0 || n_train < 2 {
            return Err(TrainError::config(format!(
                "cannot split {n} rows with test_size {test_size}"
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let (test_idx, train_idx) = indices.split_at(n_test);
        Ok((self.subset(train_idx), self.subset(test_idx)))
    }

    fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            schema: self.schema.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }
}
