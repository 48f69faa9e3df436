//! The engine: one registry plus one value cache
//!
//! An [`Engine`] is the single owner of all mutable state. It is not
//! internally synchronized; wrap it in a `Mutex` to share it across threads.

use tracing::debug;

use crate::builtins;
use crate::config::EngineConfig;
use crate::error::ParseError;
use crate::parser::{parse_with, Template};
use crate::renderer;
use crate::variable::{resolve, Registry, RegistryError, ResolveError, ValueCache, Variable};
use crate::vars_file::VarsFile;
use crate::Error;

/// Variable registry, value cache and the operations over them.
///
/// `C` is the context type handed to providers on every render.
///
/// # Example
///
/// ```rust
/// use varplate::{Engine, Variable, VariableValue};
///
/// let mut engine: Engine = Engine::new().unwrap();
/// engine
///     .register(Variable::from_fn("name", |_, _| Ok(VariableValue::found("alex"))))
///     .unwrap();
///
/// let template = engine.parse("hello $name, that is $$5").unwrap();
/// assert_eq!(engine.render(&template, &()).unwrap(), "hello alex, that is $5");
/// ```
pub struct Engine<C: ?Sized = ()> {
    registry: Registry<C>,
    cache: ValueCache,
}

impl<C: ?Sized> Default for Engine<C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<C: ?Sized> Engine<C> {
    /// Create an engine without any variables
    pub fn empty() -> Self {
        Self {
            registry: Registry::new(),
            cache: ValueCache::new(),
        }
    }

    /// Create an engine with the built-in variables
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(&EngineConfig::default())
    }

    /// Create an engine according to `config`
    pub fn with_config(config: &EngineConfig) -> Result<Self, RegistryError> {
        let mut engine = Self::empty();
        if config.builtins {
            engine.register_many(builtins::variables(config))?;
            debug!(count = engine.registry.len(), "registered built-in variables");
        }
        Ok(engine)
    }

    /// Register a variable; see [`Registry::register`]
    pub fn register(&mut self, variable: Variable<C>) -> Result<(), RegistryError> {
        self.registry.register(variable, &mut self.cache)
    }

    /// Register variables in order, stopping at the first conflict
    pub fn register_many(
        &mut self,
        variables: impl IntoIterator<Item = Variable<C>>,
    ) -> Result<(), RegistryError> {
        self.registry.register_many(variables, &mut self.cache)
    }

    /// Remove a changeable variable
    pub fn unregister(&mut self, name: &str) -> Result<Variable<C>, RegistryError> {
        self.registry.unregister(name, &mut self.cache)
    }

    /// Register every entry of a variables file
    pub fn load_vars(&mut self, vars: &VarsFile) -> Result<(), RegistryError> {
        self.register_many(vars.variables())
    }

    /// Whether `reference` matches a registered name or prefix
    pub fn is_defined(&self, reference: &str) -> bool {
        self.registry.contains(reference)
    }

    /// Compile `text`, checking every reference against the current registry
    pub fn parse(&self, text: &str) -> Result<Template, ParseError> {
        parse_with(text, |name| self.registry.contains(name))
    }

    /// Render a compiled template; all-or-nothing
    pub fn render(&mut self, template: &Template, ctx: &C) -> Result<String, ResolveError> {
        renderer::render(template, &self.registry, &mut self.cache, ctx)
    }

    /// Resolve a single reference
    pub fn resolve(&mut self, reference: &str, ctx: &C) -> Result<String, ResolveError> {
        resolve(&self.registry, &mut self.cache, reference, ctx)
    }

    /// Parse and render in one step
    pub fn expand(&mut self, text: &str, ctx: &C) -> Result<String, Error> {
        let template = self.parse(text)?;
        Ok(self.render(&template, ctx)?)
    }

    /// Forget every memoized value
    pub fn clear_cache(&mut self) {
        debug!(entries = self.cache.len(), "clearing value cache");
        self.cache.clear();
    }

    pub fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    pub fn cache(&self) -> &ValueCache {
        &self.cache
    }
}
