//! Batch processing
//!
//! Runs extraction over every report in a directory whose file name matches
//! a wildcard pattern. Files are processed concurrently on the tokio blocking
//! pool; one failing file never aborts the batch.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use regex::Regex;
use serde::Serialize;

use rad_core::{BatchConfig, RadError, Result};

use crate::{write_result, EntityExtractor, ReportInput};

// ============================================================================
// File name patterns
// ============================================================================

/// File name pattern supporting `*` (any run of characters) and `?` (one
/// character). Everything else matches literally.
#[derive(Debug, Clone)]
pub struct FilePattern {
    raw: String,
    regex: Regex,
}

impl FilePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(RadError::InvalidInput("empty file pattern".to_string()));
        }

        let mut source = String::with_capacity(pattern.len() * 2 + 2);
        source.push('^');
        for ch in pattern.chars() {
            match ch {
                '*' => source.push_str(".*"),
                '?' => source.push('.'),
                other => source.push_str(&regex::escape(&other.to_string())),
            }
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| {
            RadError::InvalidInput(format!("invalid file pattern {pattern:?}: {e}"))
        })?;

        Ok(Self {
            raw: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

// ============================================================================
// Batch options and report
// ============================================================================

/// Parameters of a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub pattern: String,
    pub concurrency: usize,
    pub output_extension: String,
    pub pretty: bool,
}

impl BatchOptions {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(input_dir, &BatchConfig::default())
    }

    pub fn from_config(input_dir: impl Into<PathBuf>, config: &BatchConfig) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: None,
            pattern: config.pattern.clone(),
            concurrency: config.concurrency,
            output_extension: config.output_extension.clone(),
            pretty: true,
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    fn output_path_for(&self, input: &Path) -> Option<PathBuf> {
        let dir = self.output_dir.as_ref()?;
        let stem = input.file_stem()?.to_string_lossy();
        Some(dir.join(format!("{stem}.{}", self.output_extension)))
    }
}

/// A successfully processed report
#[derive(Debug, Clone, Serialize)]
pub struct BatchSuccess {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub entities: usize,
}

/// A report that could not be processed
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub error: String,
}

/// Outcome of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub pattern: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub processed: Vec<BatchSuccess>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    /// Number of files that matched the pattern
    pub fn total(&self) -> usize {
        self.processed.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

// ============================================================================
// Processing
// ============================================================================

/// Process every matching file in `options.input_dir` (non-recursive)
pub async fn process_directory(
    extractor: Arc<dyn EntityExtractor>,
    options: &BatchOptions,
) -> Result<BatchReport> {
    if options.concurrency == 0 {
        return Err(RadError::InvalidInput(
            "concurrency must be at least 1".to_string(),
        ));
    }
    let pattern = FilePattern::new(&options.pattern)?;
    let started_at = Utc::now();

    tracing::info!(
        input_dir = %options.input_dir.display(),
        pattern = pattern.as_str(),
        "Processing files matching '{}' in {}",
        pattern.as_str(),
        options.input_dir.display()
    );

    let files = matching_files(&options.input_dir, &pattern).await?;
    tracing::debug!(count = files.len(), "matched files");

    if let Some(output_dir) = &options.output_dir {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| RadError::io(output_dir, e))?;
        tracing::info!(output_dir = %output_dir.display(), "Results will be saved to {}", output_dir.display());
    }

    let (jobs, rejected) = plan_outputs(options, files).await?;
    for failure in &rejected {
        tracing::warn!(input = %failure.input.display(), error = %failure.error, "skipping report");
    }

    let outcomes: Vec<(PathBuf, Result<BatchSuccess>)> = stream::iter(jobs)
        .map(|(input, output)| {
            let extractor = Arc::clone(&extractor);
            let pretty = options.pretty;
            async move {
                let outcome = process_file(extractor, input.clone(), output, pretty).await;
                (input, outcome)
            }
        })
        .buffer_unordered(options.concurrency)
        .collect()
        .await;

    let mut processed = Vec::new();
    let mut failed = rejected;
    for (input, outcome) in outcomes {
        match outcome {
            Ok(success) => processed.push(success),
            Err(e) => {
                tracing::warn!(input = %input.display(), error = %e, "failed to process report");
                failed.push(BatchFailure {
                    input,
                    error: e.to_string(),
                });
            }
        }
    }
    processed.sort_by(|a, b| a.input.cmp(&b.input));
    failed.sort_by(|a, b| a.input.cmp(&b.input));

    let report = BatchReport {
        pattern: pattern.as_str().to_string(),
        started_at,
        finished_at: Utc::now(),
        processed,
        failed,
    };

    tracing::info!(
        processed = report.processed.len(),
        failed = report.failed.len(),
        "batch finished"
    );
    Ok(report)
}

async fn matching_files(dir: &Path, pattern: &FilePattern) -> Result<Vec<PathBuf>> {
    let metadata = tokio::fs::metadata(dir)
        .await
        .map_err(|e| RadError::io(dir, e))?;
    if !metadata.is_dir() {
        return Err(RadError::InvalidInput(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| RadError::io(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| RadError::io(dir, e))? {
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| pattern.matches(name))
        {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

/// Pair every input with its output path. An input whose output would
/// replace one of the matched reports, or would be written by more than one
/// input (`r.txt` and `r.json` both map to `r.json`), is failed up front.
async fn plan_outputs(
    options: &BatchOptions,
    files: Vec<PathBuf>,
) -> Result<(Vec<(PathBuf, Option<PathBuf>)>, Vec<BatchFailure>)> {
    let Some(output_dir) = &options.output_dir else {
        return Ok((files.into_iter().map(|input| (input, None)).collect(), Vec::new()));
    };
    let input_root = canonical(&options.input_dir).await?;
    let output_root = canonical(output_dir).await?;

    let planned: Vec<(PathBuf, Option<PathBuf>)> = files
        .into_iter()
        .map(|input| {
            let output = options.output_path_for(&input);
            (input, output)
        })
        .collect();

    let resolved = |path: &Path, root: &Path| path.file_name().map(|name| root.join(name));
    let inputs: HashSet<PathBuf> = planned
        .iter()
        .filter_map(|(input, _)| resolved(input, &input_root))
        .collect();
    let mut writers: HashMap<PathBuf, usize> = HashMap::new();
    for (_, output) in &planned {
        if let Some(target) = output.as_deref().and_then(|o| resolved(o, &output_root)) {
            *writers.entry(target).or_default() += 1;
        }
    }

    let mut jobs = Vec::with_capacity(planned.len());
    let mut rejected = Vec::new();
    for (input, output) in planned {
        let conflict = output
            .as_deref()
            .and_then(|o| resolved(o, &output_root))
            .and_then(|target| {
                let reason = if inputs.contains(&target) {
                    "would overwrite an input report"
                } else if writers.get(&target).copied().unwrap_or(0) > 1 {
                    "would be written by more than one input"
                } else {
                    return None;
                };
                Some(format!("output {} {reason}", target.display()))
            });

        match conflict {
            Some(error) => rejected.push(BatchFailure { input, error }),
            None => jobs.push((input, output)),
        }
    }
    Ok((jobs, rejected))
}

async fn canonical(path: &Path) -> Result<PathBuf> {
    tokio::fs::canonicalize(path)
        .await
        .map_err(|e| RadError::io(path, e))
}

async fn process_file(
    extractor: Arc<dyn EntityExtractor>,
    input: PathBuf,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<BatchSuccess> {
    tokio::task::spawn_blocking(move || {
        let report = ReportInput::load(&input)?;
        let result = extractor.extract_result(&report.text)?;
        if let Some(output) = &output {
            write_result(&result, output, pretty)?;
        }

        tracing::debug!(input = %input.display(), entities = result.entities.len(), "processed");
        Ok(BatchSuccess {
            input,
            output,
            entities: result.entities.len(),
        })
    })
    .await
    .map_err(|e| RadError::Other(anyhow::Error::new(e)))?
}
