//! Shared utilities for command handlers

use crate::cli::SchemaArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use charon_core::{Action, Context, Registry, ResourceDefinition, TransformerConfig};
use charon_schemas::DefinitionLoader;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read a JSON or YAML document, choosing the parser by extension
pub fn read_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;

    let is_yaml = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("yaml") || s.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    if is_yaml {
        serde_yaml::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "YAML".to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
        })
    }
}

/// Definition documents named on the command line, else those of the configured directories
pub fn schema_paths(args: &SchemaArgs, config: &Config) -> Result<Vec<PathBuf>> {
    if !args.schemas.is_empty() {
        return Ok(args.schemas.clone());
    }
    let files = config.schema_files()?;
    if files.is_empty() {
        return Err(Error::invalid_args(
            "no definition documents: pass --schema or set schemas.dirs in the configuration",
        ));
    }
    Ok(files)
}

/// Load every definition document into a fresh registry
pub fn load_registry(paths: &[PathBuf]) -> Result<Arc<Registry>> {
    let registry = Registry::new();
    let mut loader = DefinitionLoader::new()?;
    let names = loader.load_into(paths, &registry)?;
    tracing::debug!(definitions = ?names, "registry ready");
    Ok(Arc::new(registry))
}

/// Look up a definition, listing the known names when it is missing
pub fn definition(registry: &Registry, name: &str) -> Result<Arc<ResourceDefinition>> {
    if !registry.contains(name) {
        return Err(Error::DefinitionNotFound {
            name: name.to_string(),
            known: registry.definition_names()?.join(", "),
        });
    }
    Ok(registry.definition(name)?)
}

/// Parse `KEY=JSON` parameters; values that are not JSON are taken as strings
pub fn parse_params(params: &[String]) -> Result<Vec<(String, Value)>> {
    params
        .iter()
        .map(|param| {
            let (key, raw) = param
                .split_once('=')
                .ok_or_else(|| Error::invalid_args(format!("parameter '{}' is not KEY=VALUE", param)))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(Error::invalid_args(format!("parameter '{}' has an empty name", param)));
            }
            let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
            Ok((key.to_string(), value))
        })
        .collect()
}

/// Context for `action` carrying the command-line parameters
pub fn build_context(action: Action, args: &SchemaArgs) -> Result<Context> {
    let mut context = Context::new(action);
    for (name, value) in parse_params(&args.params)? {
        context = context.with_parameter(&name, value);
    }
    Ok(context)
}

/// Transformer settings: `--max-depth` wins over the configuration
pub fn transformer_config(args: &SchemaArgs, config: &Config) -> Result<TransformerConfig> {
    let max_depth = args.max_depth.unwrap_or(config.transform.max_depth);
    if max_depth == 0 {
        return Err(Error::invalid_args("--max-depth must be at least 1"));
    }
    Ok(TransformerConfig { max_depth })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn schema_args(params: &[&str]) -> SchemaArgs {
        SchemaArgs {
            schemas: Vec::new(),
            definition: "Pet".to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            max_depth: None,
        }
    }

    #[test]
    fn test_parse_params() {
        let params = parse_params(&[
            "limit=3".to_string(),
            "case=upper".to_string(),
            "tags=[\"a\"]".to_string(),
            "empty=".to_string(),
        ])
        .unwrap();
        assert_eq!(params[0], ("limit".to_string(), json!(3)));
        assert_eq!(params[1], ("case".to_string(), json!("upper")));
        assert_eq!(params[2], ("tags".to_string(), json!(["a"])));
        assert_eq!(params[3], ("empty".to_string(), json!("")));

        assert!(matches!(parse_params(&["novalue".to_string()]), Err(Error::InvalidArgs(_))));
        assert!(matches!(parse_params(&["=1".to_string()]), Err(Error::InvalidArgs(_))));
    }

    #[test]
    fn test_read_document_formats() {
        let dir = tempdir().unwrap();
        let yaml = dir.path().join("rex.yaml");
        let json_path = dir.path().join("rex.json");
        fs::write(&yaml, "id: 1\nname: Rex\n").unwrap();
        fs::write(&json_path, "{not json").unwrap();

        assert_eq!(read_document(&yaml).unwrap(), json!({"id": 1, "name": "Rex"}));
        assert!(matches!(read_document(&json_path), Err(Error::InvalidFormat { .. })));
        assert!(matches!(
            read_document(&dir.path().join("missing.json")),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_schema_paths_require_a_source() {
        let config = Config::default();
        assert!(matches!(schema_paths(&schema_args(&[]), &config), Err(Error::InvalidArgs(_))));

        let mut args = schema_args(&[]);
        args.schemas.push(PathBuf::from("pets.yaml"));
        assert_eq!(schema_paths(&args, &config).unwrap(), vec![PathBuf::from("pets.yaml")]);
    }

    #[test]
    fn test_transformer_config_prefers_arguments() {
        let config = Config::default();
        let mut args = schema_args(&[]);
        assert_eq!(transformer_config(&args, &config).unwrap().max_depth, config.transform.max_depth);
        args.max_depth = Some(2);
        assert_eq!(transformer_config(&args, &config).unwrap().max_depth, 2);
        args.max_depth = Some(0);
        assert!(transformer_config(&args, &config).is_err());
    }

    #[test]
    fn test_missing_definition_lists_known() {
        let registry = Registry::new();
        registry
            .register(
                ResourceDefinition::builder("Tag")
                    .field(charon_core::Field::new("id").identifier().visible())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        match definition(&registry, "Pet") {
            Err(Error::DefinitionNotFound { known, .. }) => assert_eq!(known, "Tag"),
            other => panic!("unexpected {:?}", other.map(|d| d.name().to_string())),
        }
        assert_eq!(definition(&registry, "Tag").unwrap().name(), "Tag");
    }
}
