//! Configuration management for xdom.
//!
//! Parses `xdom.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! The syntax identifiers support `${VAR}` and `${VAR:-default}`:
//! - `rendering.source_syntax`
//! - `rendering.target_syntax`

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use xdom_core::Syntax;

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub source_syntax: Option<Syntax>,
    pub target_syntax: Option<Syntax>,
    pub restricted: Option<bool>,
    pub max_recursion_depth: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "xdom.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Syntax identifiers as written in the file.
    rendering: RenderingConfigRaw,
    pub transformations: TransformationsConfig,
    pub macros: MacrosConfig,

    /// Resolved rendering configuration (set after loading).
    #[serde(skip)]
    pub rendering_resolved: RenderingConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RenderingConfigRaw {
    source_syntax: Option<String>,
    target_syntax: Option<String>,
}

/// Source and target syntax of conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderingConfig {
    pub source_syntax: Syntax,
    pub target_syntax: Syntax,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            source_syntax: Syntax::XWIKI_2_1,
            target_syntax: Syntax::XHTML_1_0,
        }
    }
}

/// Transformations run after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransformationsConfig {
    /// Registry names, run in priority order.
    pub enabled: Vec<String>,
}

impl Default for TransformationsConfig {
    fn default() -> Self {
        Self {
            enabled: vec!["macro".to_owned()],
        }
    }
}

/// What happens to a document when one of its macros fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Show an error block in place of the macro.
    #[default]
    Render,
    /// Fail the conversion.
    Fail,
}

/// Macro transformation limits and policies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MacrosConfig {
    pub max_recursion_depth: usize,
    pub max_executions: usize,
    pub on_error: OnError,
    pub wrap_in_marker: bool,
    pub restricted: bool,
}

impl Default for MacrosConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: 16,
            max_executions: 1000,
            on_error: OnError::default(),
            wrap_in_marker: true,
            restricted: false,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// `transformations.enabled` names a transformation nobody registered.
    #[error("Unknown transformation: {0}")]
    UnknownTransformation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar { field: String, message: String },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `xdom.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and validation, so CLI
    /// arguments take precedence over config file values.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(syntax) = &settings.source_syntax {
            self.rendering_resolved.source_syntax.clone_from(syntax);
        }
        if let Some(syntax) = &settings.target_syntax {
            self.rendering_resolved.target_syntax.clone_from(syntax);
        }
        if let Some(restricted) = settings.restricted {
            self.macros.restricted = restricted;
        }
        if let Some(depth) = settings.max_recursion_depth {
            self.macros.max_recursion_depth = depth;
        }
    }

    /// Search for the config file in `start` and its parents.
    #[must_use]
    pub fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.resolve()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Expand and parse the syntax identifiers written in the file.
    fn resolve(&mut self) -> Result<(), ConfigError> {
        let resolve = |raw: Option<&str>, field: &str, default: Syntax| -> Result<Syntax, ConfigError> {
            let Some(raw) = raw else { return Ok(default) };
            let expanded = expand::expand_env(raw, field)?;
            expanded
                .parse()
                .map_err(|e| ConfigError::Validation(format!("{field}: {e}")))
        };
        let defaults = RenderingConfig::default();
        self.rendering_resolved = RenderingConfig {
            source_syntax: resolve(
                self.rendering.source_syntax.as_deref(),
                "rendering.source_syntax",
                defaults.source_syntax,
            )?,
            target_syntax: resolve(
                self.rendering.target_syntax.as_deref(),
                "rendering.target_syntax",
                defaults.target_syntax,
            )?,
        };
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.macros.max_recursion_depth == 0 {
            return Err(ConfigError::Validation(
                "macros.max_recursion_depth must be at least 1".to_owned(),
            ));
        }
        if self.macros.max_executions == 0 {
            return Err(ConfigError::Validation(
                "macros.max_executions must be at least 1".to_owned(),
            ));
        }
        if self.transformations.enabled.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "transformations.enabled cannot contain empty names".to_owned(),
            ));
        }
        Ok(())
    }

    /// Check every enabled transformation against the registered names.
    pub fn check_transformations<'a>(
        &self,
        known: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ConfigError> {
        let known: Vec<&str> = known.into_iter().collect();
        match self
            .transformations
            .enabled
            .iter()
            .find(|name| !known.contains(&name.as_str()))
        {
            Some(unknown) => Err(ConfigError::UnknownTransformation(unknown.clone())),
            None => Ok(()),
        }
    }
}
