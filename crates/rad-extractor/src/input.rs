//! Report input loading
//!
//! Reports arrive either as plain text or as JSON. A JSON report is a bare
//! string or an object with a string `text` field.

use std::path::{Path, PathBuf};

use serde_json::Value;

use rad_core::{RadError, Result};

/// Source format of a report file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Text,
    Json,
}

impl InputFormat {
    /// Detect from the file extension. Anything but `.json` is text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// A loaded report
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub path: PathBuf,
    pub format: InputFormat,
    pub text: String,
}

impl ReportInput {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RadError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| RadError::io(path, e))?;
        let format = InputFormat::from_path(path);
        let text = match format {
            InputFormat::Text => content,
            InputFormat::Json => text_from_json(&content, path)?,
        };

        Ok(Self {
            path: path.to_path_buf(),
            format,
            text,
        })
    }
}

fn text_from_json(content: &str, path: &Path) -> Result<String> {
    let value: Value = serde_json::from_str(content).map_err(|source| RadError::Json {
        context: path.display().to_string(),
        source,
    })?;

    match value {
        Value::String(text) => Ok(text),
        Value::Object(mut map) => match map.remove("text") {
            Some(Value::String(text)) => Ok(text),
            Some(_) => Err(RadError::InvalidInput(format!(
                "{}: \"text\" must be a string",
                path.display()
            ))),
            None => Err(RadError::InvalidInput(format!(
                "{}: missing \"text\" field",
                path.display()
            ))),
        },
        _ => Err(RadError::InvalidInput(format!(
            "{}: expected a string or an object with a \"text\" field",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "r.txt", "No acute findings.\n");
        let report = ReportInput::load(&path).unwrap();
        assert_eq!(report.format, InputFormat::Text);
        assert_eq!(report.text, "No acute findings.\n");
    }

    #[test]
    fn test_json_object_and_string() {
        let dir = tempfile::tempdir().unwrap();
        let obj = write(dir.path(), "a.json", r#"{"text": "Mild effusion.", "id": 3}"#);
        let bare = write(dir.path(), "b.JSON", r#""Clear lungs.""#);

        assert_eq!(ReportInput::load(&obj).unwrap().text, "Mild effusion.");
        assert_eq!(ReportInput::load(&bare).unwrap().text, "Clear lungs.");
    }

    #[test]
    fn test_json_without_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "c.json", r#"{"body": "x"}"#);
        assert!(matches!(
            ReportInput::load(&path),
            Err(RadError::InvalidInput(_))
        ));

        let path = write(dir.path(), "d.json", "{not json");
        assert!(matches!(ReportInput::load(&path), Err(RadError::Json { .. })));
    }
}
