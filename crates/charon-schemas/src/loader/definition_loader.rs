//! Definition loader with caching and validation
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::compile;
use crate::document::DefinitionDocument;
use crate::loader::{
    cache::{CacheConfig, DocumentCache},
    error::{LoaderError, LoaderResult},
    parser::{DocumentParser, Format},
};
use crate::validation::{check_rules, StructuralValidator, Violation};
use charon_core::Registry;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub cache: CacheConfig,
    /// Apply the domain rules after the structural schema
    pub check_rules: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            check_rules: true,
        }
    }
}

/// A document together with the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub document: DefinitionDocument,
}

#[derive(Debug)]
pub struct DefinitionLoader {
    config: LoaderConfig,
    cache: DocumentCache,
    parser: DocumentParser,
    structure: StructuralValidator,
}

impl DefinitionLoader {
    pub fn new() -> LoaderResult<Self> {
        Self::with_config(LoaderConfig::default())
    }

    pub fn with_config(config: LoaderConfig) -> LoaderResult<Self> {
        Ok(Self {
            cache: DocumentCache::with_config(config.cache.clone()),
            parser: DocumentParser::new(),
            structure: StructuralValidator::new()?,
            config,
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load a single self-contained document
    pub fn load(&mut self, path: &Path) -> LoaderResult<DefinitionDocument> {
        let mut loaded = self.load_all(&[path.to_path_buf()], None)?;
        match loaded.pop() {
            Some(loaded) => Ok(loaded.document),
            None => Err(LoaderError::invalid_document(
                path.to_path_buf(),
                vec![Violation::new("", "document", "nothing was loaded")],
            )),
        }
    }

    /// Load documents that may refer to each other's definitions
    ///
    /// Definition names must be unique across the set. Relationship targets and
    /// transformer specs are also looked up in `registry` when one is given.
    pub fn load_all(&mut self, paths: &[PathBuf], registry: Option<&Registry>) -> LoaderResult<Vec<LoadedDocument>> {
        let mut loaded = Vec::with_capacity(paths.len());
        for path in paths {
            loaded.push(LoadedDocument {
                path: path.clone(),
                document: self.read_document(path)?,
            });
        }

        let mut origins: BTreeMap<&str, &Path> = BTreeMap::new();
        for entry in &loaded {
            let mut duplicates = Vec::new();
            for name in entry.document.names() {
                if let Some(first) = origins.insert(name, entry.path.as_path()) {
                    duplicates.push(Violation::new(
                        format!("definitions.{}", name),
                        "unique-definition",
                        format!("'{}' is already defined in '{}'", name, first.display()),
                    ));
                }
            }
            if !duplicates.is_empty() {
                return Err(LoaderError::invalid_document(entry.path.clone(), duplicates));
            }
        }

        if self.config.check_rules {
            for entry in &loaded {
                let external: BTreeSet<String> = origins
                    .iter()
                    .filter(|(_, origin)| **origin != entry.path.as_path())
                    .map(|(name, _)| name.to_string())
                    .collect();
                let violations = check_rules(&entry.document, &external, registry);
                if !violations.is_empty() {
                    return Err(LoaderError::invalid_document(entry.path.clone(), violations));
                }
            }
        }

        Ok(loaded)
    }

    /// Load the documents and register their definitions in `registry`
    pub fn load_into(&mut self, paths: &[PathBuf], registry: &Registry) -> LoaderResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in self.load_all(paths, Some(registry))? {
            let registered = compile::register(&entry.document, registry)
                .map_err(|e| LoaderError::registry(entry.path.clone(), e))?;
            tracing::info!(
                path = %entry.path.display(),
                definitions = registered.len(),
                "loaded resource definitions"
            );
            names.extend(registered);
        }
        Ok(names)
    }

    /// Parse and check a document held in memory; `origin` is used for error reporting
    pub fn parse_str(&self, content: &str, format: Format, origin: &Path) -> LoaderResult<DefinitionDocument> {
        let value = self.parser.parse_content(content, format, origin)?;
        let document = self.typed(value, origin)?;
        if self.config.check_rules {
            let violations = check_rules(&document, &BTreeSet::new(), None);
            if !violations.is_empty() {
                return Err(LoaderError::invalid_document(origin.to_path_buf(), violations));
            }
        }
        Ok(document)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cached_documents(&self) -> usize {
        self.cache.len()
    }

    fn read_document(&mut self, path: &Path) -> LoaderResult<DefinitionDocument> {
        if let Some(document) = self.cache.get(path)? {
            tracing::trace!(path = %path.display(), "definition document served from cache");
            return Ok(document);
        }

        let value = self.parser.parse_file(path)?;
        let document = self.typed(value, path)?;
        self.cache.put(path, document.clone())?;
        Ok(document)
    }

    fn typed(&self, value: Value, path: &Path) -> LoaderResult<DefinitionDocument> {
        let violations = self.structure.validate(&value);
        if !violations.is_empty() {
            return Err(LoaderError::invalid_document(path.to_path_buf(), violations));
        }
        serde_json::from_value(value).map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const PETS: &str = r#"
definitions:
  Pet:
    fields:
      - { name: id, identifier: true, visible: true }
      - name: owner
        relationship: { definition: Person }
"#;

    const PEOPLE: &str = r#"{"definitions": {"Person": {"fields": [{"name": "id", "identifier": true}]}}}"#;

    #[test]
    fn test_load_uses_cache() -> LoaderResult<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("people.json");
        fs::write(&path, PEOPLE)?;

        let mut loader = DefinitionLoader::new()?;
        let first = loader.load(&path)?;
        assert_eq!(loader.cached_documents(), 1);
        let second = loader.load(&path)?;
        assert_eq!(first, second);

        loader.clear_cache();
        assert_eq!(loader.cached_documents(), 0);
        Ok(())
    }

    #[test]
    fn test_cross_document_references() -> LoaderResult<()> {
        let dir = tempdir().unwrap();
        let pets = dir.path().join("pets.yaml");
        let people = dir.path().join("people.json");
        fs::write(&pets, PETS)?;
        fs::write(&people, PEOPLE)?;

        let mut loader = DefinitionLoader::new()?;
        let err = loader.load(&pets).unwrap_err();
        assert_eq!(err.violations()[0].rule, "relationship-target");
        assert_eq!(err.path(), Some(&pets));

        let loaded = loader.load_all(&[pets.clone(), people.clone()], None)?;
        assert_eq!(loaded.len(), 2);
        Ok(())
    }

    #[test]
    fn test_duplicate_definitions_across_documents() -> LoaderResult<()> {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        fs::write(&a, PEOPLE)?;
        fs::write(&b, PEOPLE)?;

        let mut loader = DefinitionLoader::new()?;
        let err = loader.load_all(&[a, b.clone()], None).unwrap_err();
        assert_eq!(err.path(), Some(&b));
        assert_eq!(err.violations()[0].rule, "unique-definition");
        Ok(())
    }

    #[test]
    fn test_rules_can_be_disabled() -> LoaderResult<()> {
        let mut loader = DefinitionLoader::with_config(LoaderConfig {
            check_rules: false,
            ..LoaderConfig::default()
        })?;
        let document = loader.parse_str(PETS, Format::Yaml, Path::new("<inline>"))?;
        assert!(document.definitions.contains_key("Pet"));

        let dir = tempdir().unwrap();
        let pets = dir.path().join("pets.yaml");
        fs::write(&pets, PETS)?;
        assert!(loader.load(&pets).is_ok());
        Ok(())
    }

    #[test]
    fn test_structural_errors_before_typing() {
        let loader = DefinitionLoader::new().unwrap();
        let err = loader
            .parse_str("definitions:\n  Pet:\n    colour: red\n", Format::Yaml, Path::new("<inline>"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::InvalidDocument { .. }));
        assert_eq!(err.violations()[0].path, "definitions.Pet");
    }
}
