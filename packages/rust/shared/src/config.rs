//! Application configuration for SmartLinks.
//!
//! User config lives at `~/.smartlinks/smartlinks.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SmartLinksError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "smartlinks.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".smartlinks";

// ---------------------------------------------------------------------------
// Config structs (matching smartlinks.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Link resolution settings.
    #[serde(default)]
    pub links: LinksConfig,
}

/// `[links]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Also rewrite the Markdown source each document was rendered from.
    #[serde(default)]
    pub rewrite_source: bool,
}

// ---------------------------------------------------------------------------
// Link options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime options for one link-resolution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkOptions {
    /// Patch `[text](href)` in the backing source as well as the rendered HTML.
    pub rewrite_source: bool,
}

impl From<&AppConfig> for LinkOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            rewrite_source: config.links.rewrite_source,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.smartlinks/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SmartLinksError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.smartlinks/smartlinks.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SmartLinksError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SmartLinksError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SmartLinksError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| SmartLinksError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SmartLinksError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
