//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rigmerge/rigmerge.toml`
//! 3. Project config: `<project_dir>/.rigmerge.toml`
//! 4. Environment variables: `RIGMERGE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Unified configuration for rigmerge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Pretty-print response documents
    pub pretty_json: bool,
    /// Fail on duplicate bone names instead of warning
    pub strict_names: bool,
    /// Print the merged hierarchy after `merge`
    pub show_tree: bool,
    /// Suffix used when neither the CLI nor the request provides one
    pub default_suffix: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pretty_json: true,
            strict_names: false,
            show_tree: true,
            default_suffix: None,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub pretty_json: Option<bool>,
    pub strict_names: Option<bool>,
    pub show_tree: Option<bool>,
    pub default_suffix: Option<String>,
}

/// Get the XDG config directory for rigmerge.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rigmerge").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rigmerge.toml"))
}

/// Get the path to the project config file.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".rigmerge.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            pretty_json: overlay.pretty_json.unwrap_or(self.pretty_json),
            strict_names: overlay.strict_names.unwrap_or(self.strict_names),
            show_tree: overlay.show_tree.unwrap_or(self.show_tree),
            default_suffix: overlay
                .default_suffix
                .clone()
                .or_else(|| self.default_suffix.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a `.rigmerge.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = project_config_path(dir);
            if local_path.exists() {
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Load defaults plus a single file, ignoring the other layers.
    pub fn load_file(path: &Path) -> Result<Self, ApplicationError> {
        Ok(Self::default().merge_with(&load_raw_settings(path)?))
    }

    /// Apply RIGMERGE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("RIGMERGE").try_parsing(true))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("pretty_json") {
            settings.pretty_json = val;
        }
        if let Ok(val) = config.get_bool("strict_names") {
            settings.strict_names = val;
        }
        if let Ok(val) = config.get_bool("show_tree") {
            settings.show_tree = val;
        }
        if let Ok(val) = config.get_string("default_suffix") {
            settings.default_suffix = Some(val);
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rigmerge configuration
#
# Locations (by precedence, lowest to highest):
#   Global:  ~/.config/rigmerge/rigmerge.toml
#   Project: <dir>/.rigmerge.toml
#   Env:     RIGMERGE_* environment variables

# Pretty-print analysis responses
# pretty_json = true

# Treat duplicate bone names as an error instead of a warning
# strict_names = false

# Print the merged hierarchy after `rigmerge merge`
# show_tree = true

# Suffix used when neither --suffix nor the request provides one
# default_suffix = "outfit"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
