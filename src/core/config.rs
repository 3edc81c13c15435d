//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.tome/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TomeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub mangadex: MangaDexConfig,
    #[serde(default)]
    pub keys: KeysConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub library_dir: Option<String>,
    pub language: Option<String>,
    pub sources: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MangaDexConfig {
    pub base_url: Option<String>,
}

/// Key bindings as written in the config file. Parsing into actual key
/// codes happens in the TUI layer; unparseable entries fall back to the
/// defaults with a warning.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct KeysConfig {
    pub quit: Option<String>,
    pub back: Option<String>,
    pub confirm: Option<String>,
    pub select: Option<String>,
    pub select_all: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_MANGADEX_BASE_URL: &str = "https://api.mangadex.org";

pub const DEFAULT_KEY_QUIT: &str = "ctrl+c";
pub const DEFAULT_KEY_BACK: &str = "esc";
pub const DEFAULT_KEY_CONFIRM: &str = "enter";
pub const DEFAULT_KEY_SELECT: &str = "space";
pub const DEFAULT_KEY_SELECT_ALL: &str = "a";

fn default_library_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tome")
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub library_dir: PathBuf,
    pub language: String,
    pub sources: Vec<String>,
    pub mangadex_base_url: String,
    pub key_quit: String,
    pub key_back: String,
    pub key_confirm: String,
    pub key_select: String,
    pub key_select_all: String,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.tome/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".tome").join("config.toml"))
}

/// Load config from `~/.tome/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `TomeConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<TomeConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(TomeConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(TomeConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: TomeConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Tome Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# library_dir = "~/Downloads/tome"   # Where chapters are written
# language = "en"                    # Preferred chapter language
# sources = ["mangadex"]             # Catalog sources to search

# [mangadex]
# base_url = "https://api.mangadex.org"

# [keys]
# quit = "ctrl+c"
# back = "esc"
# confirm = "enter"
# select = "space"
# select_all = "a"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_library` and `cli_sources` come from CLI flags (None/empty = not given).
pub fn resolve(config: &TomeConfig, cli_library: Option<&Path>, cli_sources: &[String]) -> ResolvedConfig {
    // Library dir: CLI → env → config → default
    let library_dir = cli_library
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("TOME_LIBRARY_DIR").ok().map(expand_home))
        .or_else(|| config.general.library_dir.as_deref().map(expand_home))
        .unwrap_or_else(default_library_dir);

    // Sources: CLI → config → default
    let sources = if !cli_sources.is_empty() {
        cli_sources.to_vec()
    } else {
        config
            .general
            .sources
            .clone()
            .unwrap_or_else(|| vec!["mangadex".to_string()])
    };

    // MangaDex base URL: env → config → default
    let mangadex_base_url = std::env::var("MANGADEX_BASE_URL")
        .ok()
        .or_else(|| config.mangadex.base_url.clone())
        .unwrap_or_else(|| DEFAULT_MANGADEX_BASE_URL.to_string());

    ResolvedConfig {
        library_dir,
        language: config
            .general
            .language
            .clone()
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        sources,
        mangadex_base_url,
        key_quit: config.keys.quit.clone().unwrap_or_else(|| DEFAULT_KEY_QUIT.into()),
        key_back: config.keys.back.clone().unwrap_or_else(|| DEFAULT_KEY_BACK.into()),
        key_confirm: config
            .keys
            .confirm
            .clone()
            .unwrap_or_else(|| DEFAULT_KEY_CONFIRM.into()),
        key_select: config
            .keys
            .select
            .clone()
            .unwrap_or_else(|| DEFAULT_KEY_SELECT.into()),
        key_select_all: config
            .keys
            .select_all
            .clone()
            .unwrap_or_else(|| DEFAULT_KEY_SELECT_ALL.into()),
    }
}

/// Expands a leading `~/` against the home directory.
fn expand_home<S: AsRef<str>>(raw: S) -> PathBuf {
    let raw = raw.as_ref();
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}
