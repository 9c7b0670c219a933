//! Document cache keyed by path and modification time
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::document::DefinitionDocument;
use crate::loader::error::{LoaderError, LoaderResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The parsed and structurally valid document
    pub document: DefinitionDocument,
    pub cached_at: SystemTime,
    /// File modification time when cached
    pub file_mtime: SystemTime,
    pub file_path: PathBuf,
}

impl CacheEntry {
    pub fn new(document: DefinitionDocument, file_path: PathBuf, file_mtime: SystemTime) -> Self {
        Self {
            document,
            cached_at: SystemTime::now(),
            file_mtime,
            file_path,
        }
    }

    /// Valid while the file is unchanged and the entry is younger than `max_age`
    pub fn is_valid(&self, current_mtime: SystemTime, max_age: Option<Duration>) -> bool {
        if current_mtime > self.file_mtime {
            return false;
        }

        match (max_age, self.cached_at.elapsed()) {
            (Some(max_age), Ok(elapsed)) => elapsed <= max_age,
            _ => true,
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.document.version.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before the least recently used one is evicted
    pub max_entries: usize,
    pub max_age: Option<Duration>,
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            max_age: Some(Duration::from_secs(3600)),
            enabled: true,
        }
    }
}

/// In-memory cache of loaded documents
#[derive(Debug)]
pub struct DocumentCache {
    entries: HashMap<PathBuf, CacheEntry>,
    config: CacheConfig,
    access_order: Vec<PathBuf>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            access_order: Vec::new(),
        }
    }

    /// Cached document for `path`, dropping the entry if the file changed
    pub fn get(&mut self, path: &Path) -> LoaderResult<Option<DefinitionDocument>> {
        if !self.config.enabled {
            return Ok(None);
        }

        let canonical_path = canonicalize(path)?;
        let valid = match self.entries.get(&canonical_path) {
            Some(entry) => entry.is_valid(modified(path)?, self.config.max_age),
            None => false,
        };

        if valid {
            self.touch(&canonical_path);
            Ok(self
                .entries
                .get(&canonical_path)
                .map(|entry| entry.document.clone()))
        } else {
            self.remove_path(&canonical_path);
            Ok(None)
        }
    }

    pub fn put(&mut self, path: &Path, document: DefinitionDocument) -> LoaderResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let canonical_path = canonicalize(path)?;
        let entry = CacheEntry::new(document, canonical_path.clone(), modified(path)?);

        if !self.entries.contains_key(&canonical_path) && self.entries.len() >= self.config.max_entries {
            self.evict_lru();
        }

        self.entries.insert(canonical_path.clone(), entry);
        self.touch(&canonical_path);
        Ok(())
    }

    pub fn remove(&mut self, path: &Path) -> LoaderResult<bool> {
        let canonical_path = canonicalize(path)?;
        let removed = self.entries.contains_key(&canonical_path);
        self.remove_path(&canonical_path);
        Ok(removed)
    }

    pub fn contains(&self, path: &Path) -> LoaderResult<bool> {
        Ok(self.entries.contains_key(&canonicalize(path)?))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.access_order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_lru(&mut self) {
        if let Some(oldest) = self.access_order.first().cloned() {
            tracing::debug!(path = %oldest.display(), "evicting cached definition document");
            self.remove_path(&oldest);
        }
    }

    fn touch(&mut self, path: &PathBuf) {
        self.access_order.retain(|p| p != path);
        self.access_order.push(path.clone());
    }

    fn remove_path(&mut self, path: &PathBuf) {
        self.entries.remove(path);
        self.access_order.retain(|p| p != path);
    }
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new()
    }
}

fn canonicalize(path: &Path) -> LoaderResult<PathBuf> {
    path.canonicalize()
        .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))
}

fn modified(path: &Path) -> LoaderResult<SystemTime> {
    std::fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))
}
