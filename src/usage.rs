//! Snippet usage counts.
//!
//! Stored as YAML next to the application's other state:
//!
//! ```yaml
//! snippet_usage:
//!   flask-run: 12
//!   git-uncommit: 3
//! ```

use crate::domain::write_atomic;
use log::{debug, info, warn};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("usage stats I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("usage stats serialization error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Serialize)]
struct UsageFile<'a> {
    snippet_usage: BTreeMap<&'a str, u64>,
}

#[derive(Debug, Clone)]
pub struct UsageTracker {
    path: PathBuf,
    counts: HashMap<String, u64>,
}

impl UsageTracker {
    /// Opens the stats file at `path`.
    ///
    /// Starts empty if the file is missing, unreadable or malformed.
    /// Individual entries whose count is not a non-negative integer are
    /// skipped.
    pub fn open(path: impl Into<PathBuf>) -> UsageTracker {
        let path = path.into();
        let counts = Self::read(&path);
        UsageTracker { path, counts }
    }

    fn read(path: &Path) -> HashMap<String, u64> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("usage: {} not found, starting with empty stats", path.display());
                return HashMap::new();
            }
            Err(e) => {
                warn!("usage: cannot read {}: {e}, starting with empty stats", path.display());
                return HashMap::new();
            }
        };

        let doc: Value = match serde_yaml::from_str(&text) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("usage: failed to parse {}: {e}, starting with empty stats", path.display());
                return HashMap::new();
            }
        };

        let Some(entries) = doc.get("snippet_usage").and_then(Value::as_mapping) else {
            warn!("usage: {} has no snippet_usage mapping, starting with empty stats", path.display());
            return HashMap::new();
        };

        let mut counts = HashMap::with_capacity(entries.len());
        for (id, count) in entries {
            match (id.as_str(), count.as_u64()) {
                (Some(id), Some(count)) => {
                    counts.insert(id.to_string(), count);
                }
                _ => warn!("usage: invalid entry {id:?}: {count:?}, skipping"),
            }
        }
        info!("usage: loaded {} usage stats from {}", counts.len(), path.display());
        counts
    }

    /// Records one use of `id` and returns the new count.
    pub fn increment(&mut self, id: &str) -> u64 {
        let count = self.counts.entry(id.to_string()).or_insert(0);
        *count += 1;
        debug!("usage: {id} used {count} time(s)");
        *count
    }

    pub fn count(&self, id: &str) -> u64 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// A copy of every count.
    pub fn counts(&self) -> HashMap<String, u64> {
        self.counts.clone()
    }

    /// Writes the counts, sorted by id, creating the parent directory.
    pub fn save(&self) -> Result<(), UsageError> {
        let file = UsageFile {
            snippet_usage: self.counts.iter().map(|(id, n)| (id.as_str(), *n)).collect(),
        };
        let text = serde_yaml::to_string(&file)?;
        write_atomic(&self.path, text.as_bytes()).map_err(|source| UsageError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!("usage: saved {} usage stats to {}", self.counts.len(), self.path.display());
        Ok(())
    }

    /// Drops counts of snippets that no longer exist; returns how many.
    pub fn cleanup_orphaned<I, S>(&mut self, valid_ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let valid: HashSet<String> = valid_ids.into_iter().map(|id| id.as_ref().to_string()).collect();
        let before = self.counts.len();
        self.counts.retain(|id, _| valid.contains(id));
        let removed = before - self.counts.len();
        if removed > 0 {
            info!("usage: cleaned up {removed} orphaned usage stats");
        }
        removed
    }
}
