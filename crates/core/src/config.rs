//! TOML-based configuration for forgescope.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::git::runner::{GitRunner, DEFAULT_GIT_TIMEOUT};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForgescopeConfig {
    /// How the `git` executable is invoked.
    #[serde(default)]
    pub git: GitSettings,

    /// Logging settings for the command-line front end.
    #[serde(default)]
    pub logging: LoggingSettings,
}

// ---------------------------------------------------------------------------
// Git
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitSettings {
    /// Executable to run (default `git`, resolved through `$PATH`).
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Seconds each git invocation may run before it is killed (default 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Force `LC_ALL=C` so git's messages are not translated (default true).
    #[serde(default = "default_true")]
    pub pin_locale: bool,
}

fn default_binary() -> String {
    "git".into()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_GIT_TIMEOUT.as_secs()
}
fn default_true() -> bool {
    true
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            timeout_secs: default_timeout_secs(),
            pin_locale: default_true(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

impl ForgescopeConfig {
    /// Load configuration from a TOML file on disk.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: ForgescopeConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Load and validate in one step.
    pub fn load_and_validate<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.git.binary.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "git.binary".into(),
                detail: "git binary must not be empty".into(),
            });
        }
        if self.git.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "git.timeout_secs".into(),
                detail: "timeout must be > 0".into(),
            });
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".into(),
                detail: format!(
                    "unknown level '{}', expected one of {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        Ok(())
    }

    /// Serialize back to TOML, e.g. to write a starter file.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// A [`GitRunner`] with these settings.
    pub fn runner(&self) -> GitRunner {
        GitRunner::new()
            .with_binary(self.git.binary.clone())
            .with_timeout(Duration::from_secs(self.git.timeout_secs))
            .with_pinned_locale(self.git.pin_locale)
    }
}
