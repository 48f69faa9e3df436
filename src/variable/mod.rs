//! Variables and the providers behind them
//!
//! A [`Variable`] binds a reference name (or, for prefix variables, a
//! reference prefix) to a [`Provider`]. Providers are called with the
//! caller's context value and the part of the reference they are responsible
//! for, and answer with a [`VariableValue`].
//!
//! ```text
//! $hostname      exact variable "hostname", provider sees "hostname"
//! $env_PATH      prefix variable "env_",    provider sees "PATH"
//! ```

mod cache;
mod registry;
mod resolver;

pub use cache::ValueCache;
pub use registry::{Lookup, Registry, RegistryError};
pub use resolver::{resolve, ResolveError};

use std::fmt;

/// Error returned by a provider; surfaced to the caller unchanged
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// Output of a single provider call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableValue {
    pub value: String,
    /// Whether this particular result may be memoized
    pub cacheable: bool,
    /// The reference is valid but currently has no value
    pub not_found: bool,
}

impl VariableValue {
    /// A cacheable value
    pub fn found(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            cacheable: true,
            not_found: false,
        }
    }

    /// A cacheable "no value" answer
    pub fn not_found() -> Self {
        Self {
            value: String::new(),
            cacheable: true,
            not_found: true,
        }
    }

    /// Mark this result as not cacheable
    pub fn volatile(mut self) -> Self {
        self.cacheable = false;
        self
    }
}

/// Source of values for one variable.
///
/// `C` is the caller-supplied context threaded through every render.
pub trait Provider<C: ?Sized> {
    fn provide(&self, ctx: &C, suffix: &str) -> Result<VariableValue, ProviderError>;
}

impl<C: ?Sized, F> Provider<C> for F
where
    F: Fn(&C, &str) -> Result<VariableValue, ProviderError>,
{
    fn provide(&self, ctx: &C, suffix: &str) -> Result<VariableValue, ProviderError> {
        self(ctx, suffix)
    }
}

/// Provider returning a fixed string
#[derive(Debug, Clone)]
pub struct StaticValue {
    value: VariableValue,
}

impl StaticValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: VariableValue::found(value),
        }
    }

    pub fn volatile(mut self) -> Self {
        self.value.cacheable = false;
        self
    }
}

impl<C: ?Sized> Provider<C> for StaticValue {
    fn provide(&self, _ctx: &C, _suffix: &str) -> Result<VariableValue, ProviderError> {
        Ok(self.value.clone())
    }
}

/// Behaviour switches of a variable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariableFlags {
    /// Never read or write the value cache
    pub no_cacheable: bool,
    /// May be replaced or removed after registration
    pub changeable: bool,
    /// The name is a reference prefix
    pub unknown_prefix: bool,
}

impl VariableFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_cacheable(mut self) -> Self {
        self.no_cacheable = true;
        self
    }

    pub fn changeable(mut self) -> Self {
        self.changeable = true;
        self
    }

    pub fn unknown_prefix(mut self) -> Self {
        self.unknown_prefix = true;
        self
    }
}

/// A named value provider.
///
/// Providers must be `Send`; an engine behind a `Mutex` can cross threads.
pub struct Variable<C: ?Sized = ()> {
    name: String,
    provider: Box<dyn Provider<C> + Send>,
    flags: VariableFlags,
}

impl<C: ?Sized> Variable<C> {
    /// Create a fixed, cacheable exact variable
    pub fn new(name: impl Into<String>, provider: impl Provider<C> + Send + 'static) -> Self {
        Self {
            name: name.into(),
            provider: Box::new(provider),
            flags: VariableFlags::default(),
        }
    }

    /// Create a variable from a closure
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&C, &str) -> Result<VariableValue, ProviderError> + Send + 'static,
    {
        Self::new(name, f)
    }

    /// Create a prefix variable matching every reference starting with `prefix`
    pub fn prefix(prefix: impl Into<String>, provider: impl Provider<C> + Send + 'static) -> Self {
        Self::new(prefix, provider).with_flags(VariableFlags::new().unknown_prefix())
    }

    /// Create a prefix variable from a closure
    pub fn prefix_fn<F>(prefix: impl Into<String>, f: F) -> Self
    where
        F: Fn(&C, &str) -> Result<VariableValue, ProviderError> + Send + 'static,
    {
        Self::prefix(prefix, f)
    }

    pub fn with_flags(mut self, flags: VariableFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn changeable(mut self) -> Self {
        self.flags.changeable = true;
        self
    }

    pub fn no_cacheable(mut self) -> Self {
        self.flags.no_cacheable = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> VariableFlags {
        self.flags
    }

    pub fn is_prefix(&self) -> bool {
        self.flags.unknown_prefix
    }

    pub(crate) fn provide(&self, ctx: &C, suffix: &str) -> Result<VariableValue, ProviderError> {
        self.provider.provide(ctx, suffix)
    }
}

impl<C: ?Sized> fmt::Debug for Variable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
