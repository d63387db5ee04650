//! On-disk cache of the last fetched model list (`models.json`)

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::dedupe;

/// Outcome of reading the cache at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLoad {
    Hit(Vec<String>),
    /// No cache file yet
    Missing,
    /// File exists but could not be read or parsed
    Unreadable,
}

#[derive(Debug, Clone)]
pub struct ModelCache {
    path: PathBuf,
}

impl ModelCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> CacheLoad {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return CacheLoad::Missing,
            Err(e) => {
                tracing::warn!("Failed to read model cache {}: {}", self.path.display(), e);
                return CacheLoad::Unreadable;
            }
        };

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(ids) => CacheLoad::Hit(dedupe(ids)),
            Err(e) => {
                tracing::warn!("Failed to parse model cache {}: {}", self.path.display(), e);
                CacheLoad::Unreadable
            }
        }
    }

    /// Overwrite the cache, logging instead of failing
    pub fn store(&self, ids: &[String]) {
        match self.try_store(ids) {
            Ok(()) => tracing::debug!("Cached {} model(s) at {}", ids.len(), self.path.display()),
            Err(e) => tracing::warn!("Model cache not written: {}", e),
        }
    }

    /// Write to a sibling temp file, then rename over the cache
    pub fn try_store(&self, ids: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AppError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(ids).map_err(|e| AppError::Serialize {
            what: "model cache",
            message: e.to_string(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|source| AppError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| AppError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
