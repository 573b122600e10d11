//! Application configuration for pepindex.
//!
//! Lookup order: an explicit path, then `./pepindex.toml`, then
//! `~/.pepindex/pepindex.toml`. CLI flags override config file values,
//! which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PepIndexError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "pepindex.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".pepindex";

// ---------------------------------------------------------------------------
// Config structs (matching pepindex.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where content is read from and artifacts are written to.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Query resolver limits.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Category index settings.
    #[serde(default)]
    pub categories: CategoriesConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the content store.
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,

    /// Directory the index artifacts are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content_root: default_content_root(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_content_root() -> PathBuf {
    PathBuf::from("content")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("content/_index")
}

/// `[resolver]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Maximum number of prefix-matched terms expanded into candidates.
    #[serde(default = "default_prefix_limit")]
    pub prefix_limit: usize,

    /// Maximum number of candidates returned for prefix suggestions.
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,

    /// Maximum number of spelling suggestions.
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,

    /// Minimum similarity ratio (0..=1) for a spelling suggestion.
    #[serde(default = "default_suggestion_cutoff")]
    pub suggestion_cutoff: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            prefix_limit: default_prefix_limit(),
            candidate_limit: default_candidate_limit(),
            suggestion_limit: default_suggestion_limit(),
            suggestion_cutoff: default_suggestion_cutoff(),
        }
    }
}

fn default_prefix_limit() -> usize {
    15
}
fn default_candidate_limit() -> usize {
    25
}
fn default_suggestion_limit() -> usize {
    5
}
fn default_suggestion_cutoff() -> f64 {
    0.78
}

/// `[categories]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoriesConfig {
    /// Peptide category key → blend taxonomy keys. Replaces the built-in table when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blend_mapping: Option<BTreeMap<String, Vec<String>>>,
}

impl AppConfig {
    /// Reject values the builders and resolver cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.paths.output_dir.as_os_str().is_empty() {
            return Err(PepIndexError::config("paths.output_dir must not be empty"));
        }
        let r = &self.resolver;
        if r.prefix_limit == 0 || r.candidate_limit == 0 {
            return Err(PepIndexError::config(
                "resolver.prefix_limit and resolver.candidate_limit must be positive",
            ));
        }
        if !(r.suggestion_cutoff > 0.0 && r.suggestion_cutoff <= 1.0) {
            return Err(PepIndexError::config(format!(
                "resolver.suggestion_cutoff must be in (0, 1], got {}",
                r.suggestion_cutoff
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the user config directory (`~/.pepindex/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PepIndexError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the user config file (`~/.pepindex/pepindex.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config.
///
/// An explicit path must exist. Without one, `./pepindex.toml` is tried, then the
/// user config file; defaults are returned when neither exists.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return load_config_from(&local);
    }

    match config_file_path() {
        Ok(path) if path.exists() => load_config_from(&path),
        _ => {
            tracing::debug!("config file not found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PepIndexError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        PepIndexError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Write a default config file at `path`, creating parent directories.
pub fn init_config(path: &Path) -> Result<PathBuf> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| PepIndexError::io(dir, e))?;
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PepIndexError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| PepIndexError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}
