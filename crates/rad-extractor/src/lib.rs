//! rad-extractor - Clinical entity extraction
//!
//! Extracts anatomy and observation spans from radiology report text.
//! No recognition model ships with this crate: [`StubExtractor`] always
//! returns an empty entity list, and every caller goes through the
//! [`EntityExtractor`] trait so a real model can be plugged in later.

use std::path::Path;

use rad_core::{Entity, ExtractionResult, RadError, Result};

pub mod batch;
pub mod input;

pub use batch::{
    process_directory, BatchFailure, BatchOptions, BatchReport, BatchSuccess, FilePattern,
};
pub use input::ReportInput;

/// Trait for entity extractors
pub trait EntityExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Result<Vec<Entity>>;

    /// Run extraction and wrap the entities with the original text
    fn extract_result(&self, text: &str) -> Result<ExtractionResult> {
        let entities = self.extract(text)?;
        Ok(ExtractionResult::with_entities(text, entities))
    }
}

/// Placeholder extractor used until a trained model is available
#[derive(Debug, Clone, Copy, Default)]
pub struct StubExtractor;

impl EntityExtractor for StubExtractor {
    fn extract(&self, _text: &str) -> Result<Vec<Entity>> {
        Ok(Vec::new())
    }
}

/// Extract clinical entities from report text.
///
/// The returned result always carries `text` unchanged.
///
/// ```
/// let result = rad_extractor::extract_entities("The patient has a fracture.");
/// assert_eq!(result.text, "The patient has a fracture.");
/// assert!(result.entities.is_empty());
/// ```
pub fn extract_entities(text: &str) -> ExtractionResult {
    ExtractionResult::empty(text)
}

/// Load a report, run the extractor over it, and optionally write the JSON
/// result to `output`. Returns the result for callers that print it.
pub fn extract_file(
    extractor: &dyn EntityExtractor,
    input: &Path,
    output: Option<&Path>,
    pretty: bool,
) -> Result<ExtractionResult> {
    tracing::info!(input = %input.display(), "Processing report");

    let report = ReportInput::load(input)?;
    let result = extractor.extract_result(&report.text)?;
    tracing::debug!(entities = result.entities.len(), "extraction finished");

    if let Some(output) = output {
        write_result(&result, output, pretty)?;
        tracing::info!(output = %output.display(), "Results saved");
    }

    Ok(result)
}

/// Write a result as JSON, creating parent directories as needed
pub fn write_result(result: &ExtractionResult, output: &Path, pretty: bool) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| RadError::io(parent, e))?;
    }

    let json = result.to_json(pretty)?;
    std::fs::write(output, json).map_err(|e| RadError::io(output, e))
}
