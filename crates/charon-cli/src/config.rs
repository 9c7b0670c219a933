//! Configuration management for the CLI
//!
//! Configuration is read from the first file found among:
//! - the `--config` argument or `CHARON_CONFIG`
//! - `.charon.yaml`, `.charon.json`, `charon.toml` in the working directory
//! - `charon/config.{yaml,json,toml}` in the user configuration directory
//!
//! Command-line arguments take precedence over every file value.

use crate::error::{Error, Result};
use charon_core::{Action, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transform: TransformConfig,
    pub logging: LogSettings,
    pub output: OutputConfig,
    pub schemas: SchemaConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub max_depth: usize,
    /// Action used by `render` when `--action` is not given
    pub read_action: Action,
    /// Action used by `parse` when `--action` is not given
    pub write_action: Action,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter used when no `-v` flag is given, e.g. `info` or `charon_core=debug`
    pub level: Option<String>,
    /// compact, full or json
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON in human output
    pub pretty: bool,
    pub color: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Directories searched for definition documents when no `--schema` is given
    pub dirs: Vec<PathBuf>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            read_action: Action::View,
            write_action: Action::Create,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            color: true,
        }
    }
}

impl Config {
    /// Load configuration from a file, choosing the format by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config: Config = match extension(path).as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(Error::InvalidFormat {
                    path: path.to_path_buf(),
                    expected: "YAML, JSON or TOML".to_string(),
                })
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        match Self::default_config_paths().into_iter().find(|path| path.exists()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".charon.yaml"),
            PathBuf::from(".charon.json"),
            PathBuf::from("charon.toml"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let charon_dir = config_dir.join("charon");
            paths.push(charon_dir.join("config.yaml"));
            paths.push(charon_dir.join("config.json"));
            paths.push(charon_dir.join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.transform.max_depth == 0 {
            return Err(Error::config("transform.max_depth must be at least 1"));
        }
        if !self.transform.read_action.is_read() {
            return Err(Error::config(format!(
                "transform.read_action must be a read action, not '{}'",
                self.transform.read_action
            )));
        }
        if !self.transform.write_action.is_write() {
            return Err(Error::config(format!(
                "transform.write_action must be a write action, not '{}'",
                self.transform.write_action
            )));
        }
        Ok(())
    }

    /// Definition documents found in the configured schema directories, sorted
    pub fn schema_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for dir in &self.schemas.dirs {
            for entry in std::fs::read_dir(dir)? {
                let path = entry?.path();
                if path.is_file() && matches!(extension(&path).as_deref(), Some("yaml" | "yml" | "json")) {
                    files.push(path);
                }
            }
        }
        files.sort();
        Ok(files)
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.transform.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.transform.read_action, Action::View);
        assert_eq!(config.transform.write_action, Action::Create);
        assert!(config.output.pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_each_format() {
        let dir = tempdir().unwrap();
        let yaml = dir.path().join("charon.yaml");
        let json = dir.path().join("charon.json");
        let toml = dir.path().join("charon.toml");
        fs::write(&yaml, "transform:\n  max_depth: 4\nlogging:\n  format: json\n").unwrap();
        fs::write(&json, r#"{"transform": {"read_action": "index"}, "output": {"pretty": false}}"#).unwrap();
        fs::write(&toml, "[schemas]\ndirs = [\"defs\"]\n[transform]\nwrite_action = \"edit\"\n").unwrap();

        let from_yaml = Config::from_file(&yaml).unwrap();
        assert_eq!(from_yaml.transform.max_depth, 4);
        assert_eq!(from_yaml.logging.format.as_deref(), Some("json"));

        let from_json = Config::from_file(&json).unwrap();
        assert_eq!(from_json.transform.read_action, Action::Index);
        assert!(!from_json.output.pretty);
        assert_eq!(from_json.transform.max_depth, DEFAULT_MAX_DEPTH);

        let from_toml = Config::from_file(&toml).unwrap();
        assert_eq!(from_toml.transform.write_action, Action::Edit);
        assert_eq!(from_toml.schemas.dirs, vec![PathBuf::from("defs")]);
    }

    #[test]
    fn test_invalid_actions_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("charon.yaml");
        fs::write(&path, "transform:\n  read_action: create\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(Error::Config(_))));

        fs::write(&path, "transform:\n  max_depth: 0\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_and_unknown_files() {
        assert!(matches!(
            Config::from_file(Path::new("/nonexistent/charon.yaml")),
            Err(Error::FileNotFound { .. })
        ));

        let dir = tempdir().unwrap();
        let path = dir.path().join("charon.ini");
        fs::write(&path, "").unwrap();
        assert!(matches!(Config::from_file(&path), Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_schema_files_from_dirs() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.yaml"), "").unwrap();
        fs::write(dir.path().join("a.json"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let config = Config {
            schemas: SchemaConfig {
                dirs: vec![dir.path().to_path_buf()],
            },
            ..Config::default()
        };
        let files = config.schema_files().unwrap();
        assert_eq!(files, vec![dir.path().join("a.json"), dir.path().join("b.yaml")]);
    }
}
