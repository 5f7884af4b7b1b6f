//! Layered configuration for the fixer and its command-line front end.
//!
//! `defaults/wp-button-fix.default.toml` is embedded in the crate so the
//! documented defaults and runtime behavior stay in sync. Callers layer their
//! own files and overrides on top with [`Loader`] before deserializing into
//! [`FixConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/wp-button-fix.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FixConfig {
    pub fixer: FixerSettings,
    pub logging: LoggingSettings,
    pub pipeline: PipelineSettings,
}

/// Knobs of the button whitespace fixer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FixerSettings {
    /// Content containing none of these substrings is returned without scanning.
    pub prefilter: Vec<String>,
    /// Replacement for whitespace-only anchor text.
    pub entity: String,
}

impl Default for FixerSettings {
    fn default() -> Self {
        Self {
            prefilter: vec!["wp-block-button".to_string(), "wp:button".to_string()],
            entity: "&nbsp;".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    pub verbose: bool,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelineSettings {
    pub priority: i32,
}

impl FixConfig {
    /// Reject settings that would make the fixer rewrite its own output.
    pub fn validate(self) -> Result<Self, ConfigError> {
        let prefilter = &self.fixer.prefilter;
        if prefilter.is_empty() || prefilter.iter().any(String::is_empty) {
            return Err(ConfigError::Message(
                "fixer.prefilter must list at least one non-empty marker".to_string(),
            ));
        }
        if self.fixer.entity.trim().is_empty() {
            return Err(ConfigError::Message(
                "fixer.entity must contain a non-whitespace character".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Builds a [`FixConfig`] from the embedded defaults plus any files and
/// command-line overrides layered on top.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Loader holding only `wp-button-fix.default.toml`.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file given with `--config`; a missing file fails [`Loader::build`].
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a TOML file that may not exist, such as a per-site override.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Override one dotted key, e.g. `logging.verbose` for `--verbose`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merge the layers into a [`FixConfig`] and reject unusable fixer settings.
    pub fn build(self) -> Result<FixConfig, ConfigError> {
        self.builder.build()?.try_deserialize::<FixConfig>()?.validate()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The built-in settings with nothing layered on top.
pub fn load_defaults() -> Result<FixConfig, ConfigError> {
    Loader::new().build()
}
