//! Parsing definition documents from YAML and JSON
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::Value;
use std::path::Path;

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoaderError::unsupported_format(path.to_path_buf())),
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Yaml => &["yaml", "yml"],
            Format::Json => &["json"],
        }
    }
}

/// Reads documents into untyped JSON values
///
/// Documents stay untyped until they pass the structural schema, so YAML is converted
/// to `serde_json::Value` first and both formats are validated the same way.
#[derive(Debug, Default)]
pub struct DocumentParser;

impl DocumentParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a file, detecting format from extension
    pub fn parse_file(&self, path: &Path) -> LoaderResult<Value> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))?;

        self.parse_content(&content, format, path)
    }

    /// Parse content with explicit format; `path` is only used for error reporting
    pub fn parse_content(&self, content: &str, format: Format, path: &Path) -> LoaderResult<Value> {
        match format {
            Format::Yaml => self.parse_yaml(content, path),
            Format::Json => self.parse_json(content, path),
        }
    }

    pub fn parse_yaml(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| LoaderError::yaml_parse_error(path.to_path_buf(), e))?;

        serde_json::to_value(yaml_value)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }

    pub fn parse_json(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        serde_json::from_str(content)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path(Path::new("pets.yaml")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("pets.YML")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("pets.json")).unwrap(), Format::Json);
        assert!(matches!(
            Format::from_path(Path::new("pets.toml")),
            Err(LoaderError::UnsupportedFormat { .. })
        ));
        assert!(Format::from_path(Path::new("pets")).is_err());
    }

    #[test]
    fn test_yaml_and_json_agree() {
        let parser = DocumentParser::new();
        let path = PathBuf::from("inline");
        let yaml = parser
            .parse_yaml("definitions:\n  Pet:\n    fields:\n      - name: id\n", &path)
            .unwrap();
        let json = parser
            .parse_json(r#"{"definitions": {"Pet": {"fields": [{"name": "id"}]}}}"#, &path)
            .unwrap();
        assert_eq!(yaml, json);
        assert_eq!(json, json!({"definitions": {"Pet": {"fields": [{"name": "id"}]}}}));
    }

    #[test]
    fn test_parse_errors_carry_path() {
        let parser = DocumentParser::new();
        let err = parser.parse_yaml("definitions: [", Path::new("broken.yaml")).unwrap_err();
        assert!(matches!(err, LoaderError::YamlParseError { .. }));
        assert_eq!(err.path(), Some(&PathBuf::from("broken.yaml")));
    }
}
