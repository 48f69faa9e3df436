//! Varplate - `$variable` interpolation over a registry of value providers
//!
//! Template text references variables as `$name` or `${name}`; `$$` is a
//! literal dollar sign. Templates are compiled once against an [`Engine`]
//! and can be rendered many times. Each reference is resolved through the
//! engine's registry, either by exact name or by a registered prefix such as
//! `env_`, and resolved values are memoized unless the provider opts out.
//!
//! # Example
//!
//! ```rust
//! use varplate::expand;
//!
//! let pid = expand("pid=$pid").unwrap();
//! assert_eq!(pid, format!("pid={}", std::process::id()));
//! ```

pub mod builtins;
pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod renderer;
pub mod variable;
pub mod vars_file;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::ParseError;
pub use parser::{tokenize, Segment, Template};
pub use variable::{
    Provider, ProviderError, Registry, RegistryError, ResolveError, StaticValue, ValueCache,
    Variable, VariableFlags, VariableValue,
};
pub use vars_file::{VarsFile, VarsFileError};

use thiserror::Error;

/// Errors that can occur anywhere in the parse and render pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed template or unknown reference
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Failure while resolving a reference
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Registration conflict
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Unreadable or invalid variables file
    #[error(transparent)]
    VarsFile(#[from] VarsFileError),
}

/// Expand `text` with a fresh engine holding only the built-in variables
///
/// # Example
///
/// ```rust
/// use varplate::expand;
///
/// assert_eq!(expand("price: $$5").unwrap(), "price: $5");
/// assert!(expand("hello $").is_err());
/// ```
pub fn expand(text: &str) -> Result<String, Error> {
    expand_with_config(text, &EngineConfig::default())
}

/// Expand `text` with a fresh engine built from `config`
pub fn expand_with_config(text: &str, config: &EngineConfig) -> Result<String, Error> {
    let mut engine: Engine = Engine::with_config(config)?;
    engine.expand(text, &())
}
