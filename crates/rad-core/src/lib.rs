//! rad-core - Domain models, records, and shared types
//!
//! This crate defines the core abstractions used throughout rad-extract:
//! - Extracted entity spans and the extraction result shape
//! - Clinical entity labels (`Category::assertion`)
//! - Annotated JSONL records (tokens, NER spans, relations)
//! - Common error types
//! - Configuration management

pub mod config;
pub mod record;

pub use config::{
    AppConfig, BatchConfig, ConfigError, ExtractConfig, LoggingConfig, ViewerConfig,
};
pub use record::{AnnotatedRecord, JsonlFile, NerSpan, Relation, RelationSpan};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for rad-extract operations
#[derive(Error, Debug)]
pub enum RadError {
    #[error("Path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed record on line {line}: {message}")]
    Record { line: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RadError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound(path);
        }
        Self::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, RadError>;

// ============================================================================
// Entity Labels
// ============================================================================

/// Entity category, the part of a label before `::`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Anatomy,
    Observation,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anatomy => "Anatomy",
            Self::Observation => "Observation",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Assertion status, the part of a label after `::`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assertion {
    DefinitelyPresent,
    DefinitelyAbsent,
    Uncertain,
    Other,
}

impl Assertion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefinitelyPresent => "definitely present",
            Self::DefinitelyAbsent => "definitely absent",
            Self::Uncertain => "uncertain",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed entity label such as `Anatomy::definitely present`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLabel {
    pub category: Category,
    pub assertion: Assertion,
    raw: String,
}

impl EntityLabel {
    /// Parse a label. Unknown categories or assertions map to `Other`;
    /// the raw text is always kept.
    pub fn parse(label: &str) -> Self {
        let (category, assertion) = match label.split_once("::") {
            Some((category, assertion)) => (category.trim(), assertion.trim()),
            None => (label.trim(), ""),
        };

        let category = match category {
            "Anatomy" => Category::Anatomy,
            "Observation" => Category::Observation,
            _ => Category::Other,
        };

        let assertion = match assertion {
            "definitely present" => Assertion::DefinitelyPresent,
            "definitely absent" => Assertion::DefinitelyAbsent,
            "uncertain" => Assertion::Uncertain,
            _ => Assertion::Other,
        };

        Self {
            category,
            assertion,
            raw: label.to_string(),
        }
    }

    /// The label exactly as it appeared in the data
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Substring test on the raw label, used by the category filters
    pub fn mentions(&self, category: Category) -> bool {
        self.raw.contains(category.as_str())
    }
}

impl std::fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

// ============================================================================
// Extraction Results
// ============================================================================

type EntityTuple = (usize, usize, String, String);

/// An extracted entity span, serialized as `[start, end, text, label]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EntityTuple", into = "EntityTuple")]
pub struct Entity {
    /// Character offset of the first character
    pub start: usize,
    /// Character offset one past the last character
    pub end: usize,
    /// Surface text of the span
    pub text: String,
    /// Label in `Category::assertion` form
    pub label: String,
}

impl Entity {
    pub fn new(
        start: usize,
        end: usize,
        text: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<Self> {
        if end < start {
            return Err(RadError::InvalidInput(format!(
                "entity end {end} precedes start {start}"
            )));
        }

        Ok(Self {
            start,
            end,
            text: text.into(),
            label: label.into(),
        })
    }

    pub fn label(&self) -> EntityLabel {
        EntityLabel::parse(&self.label)
    }
}

impl TryFrom<EntityTuple> for Entity {
    type Error = String;

    fn try_from((start, end, text, label): EntityTuple) -> std::result::Result<Self, String> {
        Self::new(start, end, text, label).map_err(|e| e.to_string())
    }
}

impl From<Entity> for EntityTuple {
    fn from(entity: Entity) -> Self {
        (entity.start, entity.end, entity.text, entity.label)
    }
}

/// Result of running entity extraction over a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The original input text, unchanged
    pub text: String,
    /// Extracted entities
    pub entities: Vec<Entity>,
}

impl ExtractionResult {
    /// A result with no entities
    pub fn empty(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            entities: Vec::new(),
        }
    }

    pub fn with_entities(text: impl Into<String>, entities: Vec<Entity>) -> Self {
        Self {
            text: text.into(),
            entities,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let rendered = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };

        rendered.map_err(|source| RadError::Json {
            context: "extraction result".to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse() {
        let label = EntityLabel::parse("Observation::definitely present");
        assert_eq!(label.category, Category::Observation);
        assert_eq!(label.assertion, Assertion::DefinitelyPresent);
        assert_eq!(label.raw(), "Observation::definitely present");

        let label = EntityLabel::parse("Device");
        assert_eq!(label.category, Category::Other);
        assert_eq!(label.assertion, Assertion::Other);
    }

    #[test]
    fn test_label_mentions_is_substring() {
        let label = EntityLabel::parse("Anatomy-modifier::uncertain");
        assert_eq!(label.category, Category::Other);
        assert!(label.mentions(Category::Anatomy));
        assert!(!label.mentions(Category::Observation));
    }

    #[test]
    fn test_entity_serializes_as_tuple() {
        let entity = Entity::new(37, 47, "left femur", "Anatomy::definitely present").unwrap();
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(
            json,
            serde_json::json!([37, 47, "left femur", "Anatomy::definitely present"])
        );

        let back: Entity = serde_json::from_value(json).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn test_entity_rejects_inverted_span() {
        assert!(Entity::new(5, 2, "x", "Anatomy::uncertain").is_err());
        let parsed: std::result::Result<Entity, _> =
            serde_json::from_str(r#"[5, 2, "x", "Anatomy::uncertain"]"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_empty_result_shape() {
        let result = ExtractionResult::empty("");
        let json: serde_json::Value =
            serde_json::from_str(&result.to_json(false).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "", "entities": [] }));
    }

    #[test]
    fn test_io_error_not_found() {
        let err = RadError::io(
            "missing.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, RadError::NotFound(_)));
    }
}
