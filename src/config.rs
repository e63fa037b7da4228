//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/luabundle/luabundle.toml`
//! 3. Project config: `<project_dir>/.luabundle.toml`
//! 4. Environment variables: `LUABUNDLE_*` prefix (`__` separates nested keys)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::TreeStyleKind;

pub const GLOBAL_CONFIG_FILE: &str = "luabundle.toml";
pub const PROJECT_CONFIG_FILE: &str = ".luabundle.toml";

/// File preview settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeSettings {
    /// Connector glyphs
    pub style: TreeStyleKind,
    /// Show paths relative to the project root instead of absolute
    pub relative: bool,
}

/// Raw tree settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeSettings {
    pub style: Option<TreeStyleKind>,
    pub relative: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub extension: Option<String>,
    pub main_label: Option<String>,
    pub build_dir: Option<PathBuf>,
    pub spec_suffix: Option<String>,
    #[serde(default)]
    pub tree: RawTreeSettings,
}

/// Unified configuration for luabundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Source file extension without the dot (default: lua)
    pub extension: String,
    /// Label appended to the entry file in the preview (default: MAIN)
    pub main_label: String,
    /// Output directory for batch bundling (default: .luabundle)
    pub build_dir: PathBuf,
    /// File name suffix of spec entry files (default: _spec.lua)
    pub spec_suffix: String,
    /// Preview settings
    pub tree: TreeSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extension: "lua".into(),
            main_label: "MAIN".into(),
            build_dir: PathBuf::from(".luabundle"),
            spec_suffix: "_spec.lua".into(),
            tree: TreeSettings::default(),
        }
    }
}

/// Get the XDG config directory for luabundle.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "luabundle").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(GLOBAL_CONFIG_FILE))
}

/// Get the path to the project config file.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PROJECT_CONFIG_FILE)
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

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            extension: overlay
                .extension
                .clone()
                .unwrap_or_else(|| self.extension.clone()),
            main_label: overlay
                .main_label
                .clone()
                .unwrap_or_else(|| self.main_label.clone()),
            build_dir: overlay
                .build_dir
                .clone()
                .unwrap_or_else(|| self.build_dir.clone()),
            spec_suffix: overlay
                .spec_suffix
                .clone()
                .unwrap_or_else(|| self.spec_suffix.clone()),
            tree: TreeSettings {
                style: overlay.tree.style.unwrap_or(self.tree.style),
                relative: overlay.tree.relative.unwrap_or(self.tree.relative),
            },
        }
    }

    /// Expand `~` and `$VAR` in path-like fields.
    fn expand_paths(&mut self) {
        let raw = self.build_dir.to_string_lossy().into_owned();
        if let Ok(expanded) = shellexpand::full(&raw) {
            self.build_dir = PathBuf::from(expanded.as_ref());
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for `.luabundle.toml`
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

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply LUABUNDLE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("LUABUNDLE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("extension") {
            settings.extension = val;
        }
        if let Ok(val) = config.get_string("main_label") {
            settings.main_label = val;
        }
        if let Ok(val) = config.get_string("build_dir") {
            settings.build_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("spec_suffix") {
            settings.spec_suffix = val;
        }
        if let Ok(val) = config.get::<TreeStyleKind>("tree.style") {
            settings.tree.style = val;
        }
        if let Ok(val) = config.get_bool("tree.relative") {
            settings.tree.relative = val;
        }

        Ok(settings)
    }

    /// Serialize merged settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

/// Commented template written by `config init`.
pub fn config_template() -> &'static str {
    r#"# luabundle configuration

# Source file extension (without dot)
# extension = "lua"

# Label shown next to the entry file in the preview
# main_label = "MAIN"

# Output directory for `luabundle specs`
# build_dir = ".luabundle"

# File name suffix of spec entry files
# spec_suffix = "_spec.lua"

[tree]
# Connector glyphs: "unicode" or "ascii"
# style = "unicode"

# Show paths relative to the project root
# relative = false
"#
}
