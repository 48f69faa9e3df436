//! Memoized variable values keyed by full reference text

use std::collections::HashMap;

use tracing::{debug, trace};

use super::VariableValue;

/// Cache of resolved values, including "not found" answers.
///
/// Keys are full references (`env_PATH`), never bare prefixes.
#[derive(Debug, Default, Clone)]
pub struct ValueCache {
    entries: HashMap<String, VariableValue>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, reference: &str) -> Option<&VariableValue> {
        self.entries.get(reference)
    }

    pub fn put(&mut self, reference: impl Into<String>, value: VariableValue) {
        let reference = reference.into();
        trace!(reference = %reference, not_found = value.not_found, "caching value");
        self.entries.insert(reference, value);
    }

    /// Drop the entry for exactly `reference`
    pub fn invalidate(&mut self, reference: &str) {
        if self.entries.remove(reference).is_some() {
            debug!(reference = %reference, "invalidated cached value");
        }
    }

    /// Drop entries under `prefix` for which `owned` returns true
    pub fn invalidate_prefix_where<F>(&mut self, prefix: &str, mut owned: F)
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.entries.len();
        self.entries
            .retain(|reference, _| !(reference.starts_with(prefix) && owned(reference)));
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(prefix = %prefix, dropped, "invalidated cached values");
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
