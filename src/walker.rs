/// Discovers log files directly under a directory and partitions each one
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::category::Category;
use crate::partitioner::{FilePartitioner, RunSummary};

/// File name suffixes treated as log sources
pub const LOG_SUFFIXES: [&str; 2] = [".log", ".txt"];

fn has_log_suffix(file_name: &str) -> bool {
    LOG_SUFFIXES.iter().any(|suffix| file_name.ends_with(suffix))
}

fn is_category_output(file_name: &str) -> bool {
    Category::ALL
        .iter()
        .any(|category| category.output_file_name() == file_name)
}

fn same_directory(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Immediate regular files of `dir` with a log suffix, in directory listing order.
///
/// When `dir` is also the output directory (`output_dir`), the category
/// output files in it are left out so results are not fed back into a later run.
pub fn discover_sources(dir: &Path, output_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let skip_outputs = output_dir.map_or(false, |out| same_directory(dir, out));
    let mut sources = Vec::new();

    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|name| has_log_suffix(name) && !(skip_outputs && is_category_output(name)))
            .unwrap_or(false);

        if matches && path.is_file() {
            sources.push(path);
        }
    }

    Ok(sources)
}

pub struct DirectoryWalker {
    partitioner: Arc<FilePartitioner>,
    concurrency: usize,
}

impl DirectoryWalker {
    pub fn new(partitioner: Arc<FilePartitioner>) -> Self {
        Self {
            partitioner,
            concurrency: 1,
        }
    }

    /// Classify up to `concurrency` files at once; flushes stay in discovery order
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn walk_and_partition(&self, dir: &Path) -> Result<RunSummary> {
        let sources = discover_sources(dir, Some(self.partitioner.output_dir()))?;
        info!(
            "📂 Found {} log file(s) in {}",
            sources.len(),
            dir.display()
        );

        let partitioner = &self.partitioner;
        let mut batches = stream::iter(sources.iter())
            .map(|source| async move { (source, partitioner.classify_source(source).await) })
            .buffered(self.concurrency);

        let mut summary = RunSummary::default();
        while let Some((source, batch)) = batches.next().await {
            let batch = batch?;
            partitioner
                .flush(&batch)
                .await
                .with_context(|| format!("Failed to flush results for {}", source.display()))?;
            summary.record(&batch);
        }

        Ok(summary)
    }
}
