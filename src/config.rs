//! Configuration for engine construction

/// Default format of `time_local`, e.g. `07/Mar/2024:09:05:03 +0200`
pub const DEFAULT_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Default prefix of the environment variable namespace
pub const DEFAULT_ENV_PREFIX: &str = "env_";

/// Configuration options for a new engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Register the built-in variables
    pub builtins: bool,

    /// Prefix for environment lookups; `None` disables them
    pub env_prefix: Option<String>,

    /// strftime-style format of `time_local`
    pub time_format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            builtins: true,
            env_prefix: Some(DEFAULT_ENV_PREFIX.to_string()),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the built-in variables
    pub fn with_builtins(mut self, builtins: bool) -> Self {
        self.builtins = builtins;
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Disable environment lookups
    pub fn without_env_prefix(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// Set the `time_local` format
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }
}
