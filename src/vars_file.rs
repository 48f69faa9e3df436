//! Variable definitions loaded from TOML
//!
//! ```toml
//! [metadata]
//! name = "deploy"
//!
//! [variables]
//! service = "billing"
//! region = { value = "eu-west-1", changeable = true }
//! build = { value = "1234", cacheable = false }
//! ```
//!
//! Every entry becomes an exact variable returning its fixed value.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::variable::{StaticValue, Variable, VariableFlags};

/// Errors that can occur when loading or parsing a variables file
#[derive(Error, Debug)]
pub enum VarsFileError {
    #[error("Failed to read variables file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse variables TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid variable name \"{0}\": only [0-9A-Za-z_] is allowed")]
    InvalidName(String),
}

/// One variable from the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDefinition {
    pub name: String,
    pub value: String,
    pub changeable: bool,
    pub cacheable: bool,
}

/// A parsed variables file
#[derive(Debug, Clone, Default)]
pub struct VarsFile {
    /// Optional name for the file
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Definitions, sorted by name
    pub definitions: Vec<VarDefinition>,
}

/// TOML structure for deserializing variables files
#[derive(Deserialize)]
struct TomlVarsFile {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    variables: BTreeMap<String, TomlVariable>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TomlVariable {
    Plain(String),
    Detailed {
        value: String,
        #[serde(default)]
        changeable: bool,
        #[serde(default = "default_cacheable")]
        cacheable: bool,
    },
}

fn default_cacheable() -> bool {
    true
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl VarsFile {
    /// Load a variables file from disk
    pub fn from_file(path: &Path) -> Result<Self, VarsFileError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a variables file from a TOML string
    pub fn parse(content: &str) -> Result<Self, VarsFileError> {
        let parsed: TomlVarsFile = toml::from_str(content)?;

        let definitions = parsed
            .variables
            .into_iter()
            .map(|(name, var)| {
                if !is_valid_name(&name) {
                    return Err(VarsFileError::InvalidName(name));
                }
                Ok(match var {
                    TomlVariable::Plain(value) => VarDefinition {
                        name,
                        value,
                        changeable: false,
                        cacheable: true,
                    },
                    TomlVariable::Detailed {
                        value,
                        changeable,
                        cacheable,
                    } => VarDefinition {
                        name,
                        value,
                        changeable,
                        cacheable,
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (name, description) = match parsed.metadata {
            Some(meta) => (meta.name, meta.description),
            None => (None, None),
        };

        Ok(Self {
            name,
            description,
            definitions,
        })
    }

    /// Build the variables described by this file
    pub fn variables<C: ?Sized>(&self) -> Vec<Variable<C>> {
        self.definitions
            .iter()
            .map(|def| {
                let mut provider = StaticValue::new(def.value.clone());
                if !def.cacheable {
                    provider = provider.volatile();
                }
                let flags = VariableFlags {
                    changeable: def.changeable,
                    ..VariableFlags::default()
                };
                Variable::new(def.name.clone(), provider).with_flags(flags)
            })
            .collect()
    }
}
