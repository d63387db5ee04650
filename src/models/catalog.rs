//! Ordered, duplicate-free list of known model identifiers

use std::collections::HashSet;

/// Drop repeated identifiers, keeping the first occurrence of each
pub fn dedupe<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for id in ids {
        let id = id.into();
        if seen.insert(id.clone()) {
            unique.push(id);
        }
    }
    unique
}

/// Catalog of model ids plus the generation counter for in-flight refreshes
///
/// Every refresh is tagged with the generation returned by
/// [`ModelCatalog::begin_refresh`]. Only the most recently issued generation
/// may replace the list, so a slow response can never overwrite a newer one.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    ids: Vec<String>,
    latest_generation: u64,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: dedupe(ids),
            latest_generation: 0,
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|m| m == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|m| m == id)
    }

    /// Replace the whole list
    pub fn replace<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = dedupe(ids);
    }

    /// Append an id that is not yet known (used to surface a saved model
    /// before any list has been fetched)
    pub fn seed(&mut self, id: &str) -> bool {
        if id.is_empty() || self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    /// Issue a new refresh generation; earlier generations become stale
    pub fn begin_refresh(&mut self) -> u64 {
        self.latest_generation += 1;
        self.latest_generation
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest_generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.latest_generation
    }

    /// Apply a refresh result. Returns `false` and leaves the list untouched
    /// when `generation` has been superseded.
    pub fn apply_refresh(&mut self, generation: u64, ids: Vec<String>) -> bool {
        if !self.is_current(generation) {
            tracing::debug!(
                generation,
                latest = self.latest_generation,
                "Dropping stale model list"
            );
            return false;
        }
        self.replace(ids);
        true
    }
}
