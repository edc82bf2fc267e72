/// End-to-end run: gates, then partition a single file or a directory of files
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::classifier::LineClassifier;
use crate::config::Config;
use crate::error::ClassifierError;
use crate::partitioner::{FilePartitioner, RunSummary};
use crate::readiness::{ModelAvailabilityGate, ServiceReadinessGate};
use crate::traits::InferenceBackend;
use crate::walker::DirectoryWalker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Directory(PathBuf),
}

impl Source {
    pub fn resolve(path: &Path) -> Result<Self, ClassifierError> {
        if path.is_file() {
            Ok(Source::File(path.to_path_buf()))
        } else if path.is_dir() {
            Ok(Source::Directory(path.to_path_buf()))
        } else {
            Err(ClassifierError::InvalidPath(path.to_path_buf()))
        }
    }
}

pub async fn run(
    config: &Config,
    backend: Arc<dyn InferenceBackend>,
    source: Source,
) -> Result<RunSummary> {
    ServiceReadinessGate::from_config(config)
        .await_ready(backend.as_ref())
        .await?;
    let model = ModelAvailabilityGate::from_config(config)
        .await_model(backend.as_ref())
        .await?;

    let classifier = Arc::new(LineClassifier::new(backend, model));
    let partitioner = Arc::new(FilePartitioner::new(classifier, config.output_dir.clone()));

    let summary = match source {
        Source::File(path) => {
            let batch = partitioner.partition(&path).await?;
            let mut summary = RunSummary::default();
            summary.record(&batch);
            summary
        }
        Source::Directory(dir) => {
            DirectoryWalker::new(partitioner)
                .with_concurrency(config.file_concurrency)
                .walk_and_partition(&dir)
                .await?
        }
    };

    summary.log();
    info!("✅ Log classification complete.");
    Ok(summary)
}
