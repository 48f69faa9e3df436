//! Variable registry holding exact and prefix variables

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::cache::ValueCache;
use super::Variable;

/// Errors that can occur during registry mutation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Name is taken by a variable that is not changeable
    #[error("variable \"{name}\" already exists")]
    AlreadyExists { name: String },

    /// Removal of a variable that is not changeable
    #[error("variable \"{name}\" is not changeable")]
    Fixed { name: String },

    /// Removal of a name that is not registered
    #[error("variable \"{name}\" is not registered")]
    NotRegistered { name: String },
}

/// Result of looking up a reference
#[derive(Debug)]
pub struct Lookup<'a, C: ?Sized> {
    pub variable: &'a Variable<C>,
    /// Part of the reference handed to the provider
    pub suffix: &'a str,
}

/// Registry for exact-name and prefix variables.
///
/// A name lives in at most one of the two maps. Prefix matching picks the
/// longest registered prefix of a reference.
pub struct Registry<C: ?Sized = ()> {
    known: HashMap<String, Variable<C>>,
    prefixes: HashMap<String, Variable<C>>,
}

impl<C: ?Sized> Default for Registry<C> {
    fn default() -> Self {
        Self {
            known: HashMap::new(),
            prefixes: HashMap::new(),
        }
    }
}

impl<C: ?Sized> Registry<C> {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the variable responsible for `reference`.
    ///
    /// Exact names win over prefixes; among prefixes the longest match wins.
    pub fn lookup<'a>(&'a self, reference: &'a str) -> Option<Lookup<'a, C>> {
        if let Some(variable) = self.known.get(reference) {
            return Some(Lookup {
                variable,
                suffix: reference,
            });
        }

        if self.prefixes.is_empty() {
            return None;
        }

        reference
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(reference.len()))
            .rev()
            .find_map(|end| {
                self.prefixes.get(&reference[..end]).map(|variable| Lookup {
                    variable,
                    suffix: &reference[end..],
                })
            })
    }

    /// Whether `reference` resolves to some variable
    pub fn contains(&self, reference: &str) -> bool {
        self.lookup(reference).is_some()
    }

    /// Get a registered variable by its own name (exact name or prefix)
    pub fn get(&self, name: &str) -> Option<&Variable<C>> {
        self.known.get(name).or_else(|| self.prefixes.get(name))
    }

    /// Register a variable, replacing a changeable one of the same name.
    ///
    /// Cache entries owned by the replaced variable are dropped from `cache`.
    pub fn register(
        &mut self,
        variable: Variable<C>,
        cache: &mut ValueCache,
    ) -> Result<(), RegistryError> {
        let name = variable.name().to_string();

        if let Some(old) = self.known.get(&name) {
            if !old.flags().changeable {
                return Err(RegistryError::AlreadyExists { name });
            }
            debug!(name = %name, "replacing variable");
            self.known.remove(&name);
            cache.invalidate(&name);
        } else if let Some(old) = self.prefixes.get(&name) {
            if !old.flags().changeable {
                return Err(RegistryError::AlreadyExists { name });
            }
            debug!(prefix = %name, "replacing prefix variable");
            self.invalidate_owned_by_prefix(&name, cache);
            self.prefixes.remove(&name);
        } else {
            debug!(name = %name, prefix = variable.is_prefix(), "registering variable");
        }

        // References the new variable takes over from another owner (a
        // shorter prefix) must not keep that owner's values.
        if variable.is_prefix() {
            self.prefixes.insert(name.clone(), variable);
            self.invalidate_owned_by_prefix(&name, cache);
        } else {
            cache.invalidate(&name);
            self.known.insert(name, variable);
        }
        Ok(())
    }

    /// Register variables in order, stopping at the first conflict.
    ///
    /// Variables before the conflicting one stay registered.
    pub fn register_many(
        &mut self,
        variables: impl IntoIterator<Item = Variable<C>>,
        cache: &mut ValueCache,
    ) -> Result<(), RegistryError> {
        for variable in variables {
            self.register(variable, cache)?;
        }
        Ok(())
    }

    /// Remove a changeable variable by name (exact name or prefix)
    pub fn unregister(
        &mut self,
        name: &str,
        cache: &mut ValueCache,
    ) -> Result<Variable<C>, RegistryError> {
        let existing = self
            .get(name)
            .ok_or_else(|| RegistryError::NotRegistered {
                name: name.to_string(),
            })?;
        if !existing.flags().changeable {
            return Err(RegistryError::Fixed {
                name: name.to_string(),
            });
        }
        let is_prefix = existing.is_prefix();

        let removed = if is_prefix {
            self.invalidate_owned_by_prefix(name, cache);
            self.prefixes.remove(name)
        } else {
            cache.invalidate(name);
            self.known.remove(name)
        }
        .ok_or_else(|| RegistryError::NotRegistered {
            name: name.to_string(),
        })?;
        debug!(name = %name, prefix = is_prefix, "removed variable");
        Ok(removed)
    }

    /// Drop cached values under `prefix` that currently resolve through the
    /// prefix variable `prefix`; references owned by exact names or longer
    /// prefixes keep their values.
    fn invalidate_owned_by_prefix(&self, prefix: &str, cache: &mut ValueCache) {
        cache.invalidate_prefix_where(prefix, |reference| {
            self.lookup(reference).is_some_and(|found| {
                found.variable.is_prefix() && found.variable.name() == prefix
            })
        });
    }

    /// Names of exact variables, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.known.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Registered prefixes, sorted
    pub fn prefixes(&self) -> Vec<&str> {
        let mut prefixes: Vec<_> = self.prefixes.keys().map(|s| s.as_str()).collect();
        prefixes.sort_unstable();
        prefixes
    }

    pub fn len(&self) -> usize {
        self.known.len() + self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
