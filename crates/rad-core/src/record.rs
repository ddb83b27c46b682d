//! Annotated JSONL records
//!
//! Each line of an annotation file is a JSON object carrying the report
//! tokens, NER spans and relations. Two layouts are accepted for every
//! field: a flat document-level list, or a list of per-sentence groups.
//! Token indices are document-level and span ends are inclusive.

use std::ops::{Range, RangeInclusive};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::{EntityLabel, RadError, Result};

// ============================================================================
// Record Types
// ============================================================================

/// A labelled token span, `[start, end, label]` in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NerSpan {
    pub start: usize,
    pub end: usize,
    pub label: EntityLabel,
}

impl NerSpan {
    /// Token indices covered by the span
    pub fn tokens(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Covered token indices below `len`
    pub fn tokens_within(&self, len: usize) -> Range<usize> {
        clamped(self.start, self.end, len)
    }
}

/// A relation between two token spans, `[s1, e1, s2, e2, type]` in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSpan {
    pub head: (usize, usize),
    pub tail: (usize, usize),
    pub relation_type: String,
}

impl RelationSpan {
    /// Token indices below `len` covered by either argument. Each argument
    /// is clamped to the token list on its own before iterating.
    pub fn tokens_within(&self, len: usize) -> impl Iterator<Item = usize> {
        clamped(self.head.0, self.head.1, len).chain(clamped(self.tail.0, self.tail.1, len))
    }
}

fn clamped(start: usize, end: usize, len: usize) -> Range<usize> {
    start.min(len)..end.saturating_add(1).min(len)
}

/// A relation entry. Entries that do not have the five-field shape are kept
/// as raw JSON so they can still be listed.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    Span(RelationSpan),
    Raw(Value),
}

impl Relation {
    pub fn as_span(&self) -> Option<&RelationSpan> {
        match self {
            Self::Span(span) => Some(span),
            Self::Raw(_) => None,
        }
    }
}

/// One annotated report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotatedRecord {
    pub tokens: Vec<String>,
    pub ner: Vec<NerSpan>,
    pub relations: Vec<Relation>,
}

impl AnnotatedRecord {
    /// Parse a single JSONL line. `line` is 1-based and only used in errors.
    pub fn from_json_line(text: &str, line: usize) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| RadError::Record {
            line,
            message: e.to_string(),
        })?;

        match value {
            Value::Object(map) => Ok(Self::from_object(&map)),
            other => Err(RadError::Record {
                line,
                message: format!("expected a JSON object, found {}", type_name(&other)),
            }),
        }
    }

    /// Build a record from an already-parsed object. Missing fields are empty.
    pub fn from_object(map: &Map<String, Value>) -> Self {
        let tokens = if let Some(tokens) = map.get("tokens") {
            parse_tokens(tokens)
        } else if let Some(Value::Array(sentences)) = map.get("sentences") {
            sentences.iter().flat_map(parse_tokens).collect()
        } else {
            Vec::new()
        };

        let ner = map
            .get("ner")
            .map(flatten_groups)
            .unwrap_or_default()
            .into_iter()
            .filter_map(parse_ner_item)
            .collect();

        let relations = map
            .get("relations")
            .map(flatten_groups)
            .unwrap_or_default()
            .into_iter()
            .map(parse_relation_item)
            .collect();

        Self {
            tokens,
            ner,
            relations,
        }
    }

    /// Tokens in `start..=end`, clamped to the token list
    pub fn token_slice(&self, start: usize, end: usize) -> &[String] {
        let lo = start.min(self.tokens.len());
        let hi = end.saturating_add(1).min(self.tokens.len());
        if lo >= hi {
            return &[];
        }
        &self.tokens[lo..hi]
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_tokens(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Accepts `[item, ...]` or `[[item, ...], ...]` where items are arrays.
///
/// Per-sentence groups are concatenated, not just the first group taken.
/// Indices in every group refer to the document-level token list, so the
/// spans of all sentences end up on one record.
fn flatten_groups(value: &Value) -> Vec<&Value> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    let nested = items.iter().all(Value::is_array)
        && items
            .iter()
            .any(|group| matches!(group.get(0), Some(Value::Array(_))));

    if nested {
        items
            .iter()
            .filter_map(Value::as_array)
            .flatten()
            .collect()
    } else {
        items.iter().collect()
    }
}

fn as_index(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|n| usize::try_from(n).ok())
}

fn parse_ner_item(item: &Value) -> Option<NerSpan> {
    let fields = item.as_array()?;
    if fields.len() < 3 {
        return None;
    }

    let span = NerSpan {
        start: as_index(&fields[0])?,
        end: as_index(&fields[1])?,
        label: EntityLabel::parse(fields[2].as_str()?),
    };

    if span.end < span.start {
        tracing::debug!(start = span.start, end = span.end, "ignoring inverted NER span");
        return None;
    }
    Some(span)
}

fn parse_relation_item(item: &Value) -> Relation {
    let span = item.as_array().filter(|f| f.len() >= 5).and_then(|fields| {
        let relation_type = match &fields[4] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Some(RelationSpan {
            head: (as_index(&fields[0])?, as_index(&fields[1])?),
            tail: (as_index(&fields[2])?, as_index(&fields[3])?),
            relation_type,
        })
    });

    match span {
        Some(span) => Relation::Span(span),
        None => Relation::Raw(item.clone()),
    }
}

// ============================================================================
// JSONL Files
// ============================================================================

/// An annotation file held in memory, parsed one record at a time
#[derive(Debug, Clone)]
pub struct JsonlFile {
    path: PathBuf,
    /// (1-based line number, line text) for every non-blank line
    lines: Vec<(usize, String)>,
}

impl JsonlFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RadError::io(path, e))?;
        let file = Self::from_contents(path, &content);

        tracing::debug!(path = %path.display(), records = file.len(), "opened annotation file");
        Ok(file)
    }

    pub fn from_contents(path: impl Into<PathBuf>, content: &str) -> Self {
        let lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| (i + 1, line.to_string()))
            .collect();

        Self {
            path: path.into(),
            lines,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Parse the record at `index` (0-based, blank lines not counted)
    pub fn record(&self, index: usize) -> Result<AnnotatedRecord> {
        let (line, text) = self.lines.get(index).ok_or_else(|| {
            RadError::InvalidInput(format!(
                "record {index} out of range ({} records in {})",
                self.len(),
                self.path.display()
            ))
        })?;

        AnnotatedRecord::from_json_line(text, *line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;

    #[test]
    fn test_flat_record() {
        let record = AnnotatedRecord::from_json_line(
            r#"{"tokens": ["No", "acute", "fracture"], "ner": [[2, 2, "Observation::definitely absent"]], "relations": []}"#,
            1,
        )
        .unwrap();

        assert_eq!(record.tokens, vec!["No", "acute", "fracture"]);
        assert_eq!(record.ner.len(), 1);
        assert_eq!(record.ner[0].tokens(), 2..=2);
        assert_eq!(record.ner[0].label.category, Category::Observation);
        assert!(record.relations.is_empty());
    }

    #[test]
    fn test_nested_sentences() {
        let record = AnnotatedRecord::from_json_line(
            r#"{"sentences": [["Left", "lung"], ["is", "clear"]],
                "ner": [[[0, 1, "Anatomy::definitely present"]], [[3, 3, "Observation::definitely present"]]],
                "relations": [[[3, 3, 0, 1, "located_at"]]]}"#,
            1,
        )
        .unwrap();

        assert_eq!(record.tokens, vec!["Left", "lung", "is", "clear"]);
        assert_eq!(record.ner.len(), 2);
        assert_eq!(record.relations.len(), 1);
        let rel = record.relations[0].as_span().unwrap();
        assert_eq!(rel.head, (3, 3));
        assert_eq!(rel.tail, (0, 1));
        assert_eq!(rel.relation_type, "located_at");
    }

    #[test]
    fn test_tokens_within_clamps_each_argument() {
        let relation = RelationSpan {
            head: (0, usize::MAX),
            tail: (1, 1),
            relation_type: "x".to_string(),
        };
        assert_eq!(relation.tokens_within(2).collect::<Vec<_>>(), vec![0, 1, 1]);
        assert_eq!(relation.tokens_within(0).count(), 0);

        let span = NerSpan {
            start: 5,
            end: 9,
            label: EntityLabel::parse("Anatomy::uncertain"),
        };
        assert!(span.tokens_within(3).is_empty());
        assert_eq!(span.tokens_within(7), 5..7);
    }

    #[test]
    fn test_short_items() {
        let record = AnnotatedRecord::from_json_line(
            r#"{"tokens": ["a"], "ner": [[0, 0]], "relations": [[0, 0, "x"]]}"#,
            1,
        )
        .unwrap();

        assert!(record.ner.is_empty());
        assert!(matches!(record.relations[0], Relation::Raw(_)));
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let record = AnnotatedRecord::from_json_line("{}", 1).unwrap();
        assert_eq!(record, AnnotatedRecord::default());
    }

    #[test]
    fn test_non_object_line() {
        let err = AnnotatedRecord::from_json_line("[1, 2]", 7).unwrap_err();
        assert!(matches!(err, RadError::Record { line: 7, .. }));
    }

    #[test]
    fn test_token_slice_clamps() {
        let record = AnnotatedRecord {
            tokens: vec!["a".into(), "b".into(), "c".into()],
            ..Default::default()
        };
        assert_eq!(record.token_slice(1, 10), &["b".to_string(), "c".to_string()]);
        assert!(record.token_slice(5, 6).is_empty());
    }

    #[test]
    fn test_jsonl_skips_blank_lines() {
        let file = JsonlFile::from_contents(
            "mem.jsonl",
            "{\"tokens\": [\"a\"]}\n\n{\"tokens\": [\"b\"]}\nnot json\n",
        );
        assert_eq!(file.len(), 3);
        assert_eq!(file.record(1).unwrap().tokens, vec!["b"]);

        match file.record(2).unwrap_err() {
            RadError::Record { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(file.record(3), Err(RadError::InvalidInput(_))));
    }
}
