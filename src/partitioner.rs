/// Streams a log source through a classifier and appends each category's
/// lines to `<category>_logs.txt`
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::category::Category;
use crate::traits::Classifier;

/// Lines of one source grouped by category, in encounter order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizedBatch {
    buckets: [Vec<String>; Category::COUNT],
}

impl CategorizedBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: Category, line: String) {
        self.buckets[category.index()].push(line);
    }

    pub fn lines(&self, category: Category) -> &[String] {
        &self.buckets[category.index()]
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every category with its bucket, in `Category::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        Category::ALL
            .into_iter()
            .map(move |category| (category, self.lines(category)))
    }

    /// Bytes appended to a category file for one flush: lines joined by
    /// newlines plus one trailing newline (so an empty bucket appends "\n")
    pub fn render(&self, category: Category) -> String {
        let mut out = self.lines(category).join("\n");
        out.push('\n');
        out
    }
}

/// Totals across every source flushed in a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files: usize,
    pub lines: [usize; Category::COUNT],
}

impl RunSummary {
    pub fn record(&mut self, batch: &CategorizedBatch) {
        self.files += 1;
        for (category, lines) in batch.iter() {
            self.lines[category.index()] += lines.len();
        }
    }

    pub fn lines_for(&self, category: Category) -> usize {
        self.lines[category.index()]
    }

    pub fn total_lines(&self) -> usize {
        self.lines.iter().sum()
    }

    pub fn log(&self) {
        info!(
            "📊 Classified {} lines from {} file(s)",
            self.total_lines(),
            self.files
        );
        for category in Category::ALL {
            info!("   {:<15} {:>8}", category.as_str(), self.lines_for(category));
        }
    }
}

pub struct FilePartitioner {
    classifier: Arc<dyn Classifier>,
    output_dir: PathBuf,
}

impl FilePartitioner {
    pub fn new(classifier: Arc<dyn Classifier>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            classifier,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn output_path(&self, category: Category) -> PathBuf {
        self.output_dir.join(category.output_file_name())
    }

    /// Classify every non-blank line of `source` and append the result to the category files
    pub async fn partition(&self, source: &Path) -> Result<CategorizedBatch> {
        let batch = self.classify_source(source).await?;
        self.flush(&batch).await?;
        Ok(batch)
    }

    /// Single forward pass over `source`; does not touch the output files
    pub async fn classify_source(&self, source: &Path) -> Result<CategorizedBatch> {
        let file = File::open(source)
            .await
            .with_context(|| format!("Failed to open log file: {}", source.display()))?;

        info!(
            "Classifying {} with {}",
            source.display(),
            self.classifier.name()
        );

        let mut reader = BufReader::new(file);
        let mut raw = Vec::new();
        let mut line_no = 0usize;
        let mut batch = CategorizedBatch::new();

        loop {
            raw.clear();
            let read = reader
                .read_until(b'\n', &mut raw)
                .await
                .with_context(|| format!("Failed to read log file: {}", source.display()))?;
            if read == 0 {
                break;
            }
            line_no += 1;

            let decoded = String::from_utf8_lossy(&raw);
            if let Cow::Owned(_) = decoded {
                warn!(
                    "{}:{} is not valid UTF-8, invalid bytes replaced",
                    source.display(),
                    line_no
                );
            }

            let line = decoded.trim();
            if line.is_empty() {
                continue;
            }

            let category = self.classifier.classify(line).await;
            batch.push(category, line.to_string());
        }

        debug!("{} non-blank lines in {}", batch.len(), source.display());
        Ok(batch)
    }

    /// Append every bucket, empty ones included, to its category file.
    ///
    /// All four files are opened before anything is written: if one cannot be
    /// opened nothing is appended for this batch. A failed write part-way
    /// through can still leave earlier categories appended.
    pub async fn flush(&self, batch: &CategorizedBatch) -> Result<()> {
        let mut outputs = Vec::with_capacity(Category::COUNT);
        for category in Category::ALL {
            let path = self.output_path(category);
            let out = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await
                .with_context(|| format!("Failed to open output file: {}", path.display()))?;
            outputs.push((category, path, out));
        }

        for (category, path, mut out) in outputs {
            out.write_all(batch.render(category).as_bytes())
                .await
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            out.flush().await?;

            info!("Wrote {} lines to {}", batch.lines(category).len(), path.display());
        }
        Ok(())
    }
}
