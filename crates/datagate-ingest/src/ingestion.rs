//! Ingestion stage: raw table to train/test partitions.
//!
//! The raw table is exported to the feature store, shuffled with a seeded RNG
//! and split by `test_ratio`. The test partition gets `ceil(rows * ratio)`
//! rows, the train partition the rest.

use std::path::Path;
use std::time::Instant;

use polars::prelude::{DataFrame, IdxCa, IdxSize};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{info, info_span};

use datagate_model::{GateError, IngestionArtifact, IngestionConfig, Operation, Result};

use crate::table::{TableReadOptions, load_table_with_options, write_table};

/// Row indices of the train and test partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<IdxSize>,
    pub test: Vec<IdxSize>,
}

/// Shuffle `0..rows` with `seed` and cut off the test partition.
///
/// Returns `None` when the ratio is outside (0, 1) or either partition would be empty.
pub fn split_indices(rows: usize, test_ratio: f64, seed: u64) -> Option<SplitIndices> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return None;
    }
    let test_rows = (rows as f64 * test_ratio).ceil() as usize;
    if test_rows == 0 || test_rows >= rows {
        return None;
    }
    let mut indices: Vec<IdxSize> = (0..rows).map(|index| index as IdxSize).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(test_rows);
    Some(SplitIndices {
        train,
        test: indices,
    })
}

/// Runs the ingestion stage for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct DataIngestion {
    config: IngestionConfig,
}

impl DataIngestion {
    pub fn new(config: IngestionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Split `df` into (train, test) according to the configured ratio and seed.
    pub fn split_train_test(&self, df: &DataFrame) -> Result<(DataFrame, DataFrame)> {
        let source = &self.config.feature_store_file_path;
        let split = split_indices(df.height(), self.config.test_ratio, self.config.seed)
            .ok_or_else(|| GateError::Ingestion {
                operation: Operation::SplitTable,
                path: source.clone(),
                message: format!(
                    "cannot split {} rows with test ratio {}",
                    df.height(),
                    self.config.test_ratio
                ),
            })?;
        let take = |indices: Vec<IdxSize>| {
            df.take(&IdxCa::from_vec("idx".into(), indices))
                .map_err(|error| GateError::Ingestion {
                    operation: Operation::SplitTable,
                    path: source.clone(),
                    message: error.to_string(),
                })
        };
        Ok((take(split.train)?, take(split.test)?))
    }

    /// Read `raw_path`, export it to the feature store and write the train/test files.
    pub fn initiate_data_ingestion(&self, raw_path: &Path) -> Result<IngestionArtifact> {
        let span = info_span!("ingestion", source = %raw_path.display());
        let _guard = span.enter();
        let start = Instant::now();

        let options = TableReadOptions::default().with_null_values(self.config.null_values.clone());
        let raw = load_table_with_options(raw_path, &options)?;
        info!(
            rows = raw.height(),
            columns = raw.width(),
            "raw table loaded"
        );

        write_table(&raw, &self.config.feature_store_file_path)?;
        let (train, test) = self.split_train_test(&raw)?;
        write_table(&train, &self.config.training_file_path)?;
        write_table(&test, &self.config.testing_file_path)?;

        info!(
            train_rows = train.height(),
            test_rows = test.height(),
            duration_ms = start.elapsed().as_millis(),
            "ingestion complete"
        );
        Ok(IngestionArtifact::new(
            self.config.training_file_path.clone(),
            self.config.testing_file_path.clone(),
        ))
    }
}
