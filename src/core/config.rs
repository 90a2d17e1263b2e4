//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.tripmate/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use clap::ValueEnum;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::request::LlmProvider;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TripmateConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub user_id: Option<String>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub surface: Option<Surface>,
    pub entry_point: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Which conversation surface to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// General agent chat (consent, approval, redirects, telemetry)
    #[default]
    Agent,
    /// Planning assistant (clarification, progress, decision logs)
    Planning,
    /// Journey assistant (approval, clarification)
    Journey,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOCALE: &str = "zh-CN";
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_ENTRY_POINT: &str = "cli";
pub const DEFAULT_USER_ID: &str = "anonymous";

// ============================================================================
// Resolved Config (concrete values)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_id: String,
    pub trip_id: Option<String>,
    pub locale: String,
    pub timezone: String,
    pub llm_provider: Option<LlmProvider>,
    pub surface: Surface,
    pub entry_point: String,
    pub read_only: bool,
}

/// Values given on the command line. `None` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub user_id: Option<String>,
    pub trip_id: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub surface: Option<Surface>,
    pub read_only: bool,
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

/// Returns `~/.tripmate`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".tripmate"))
}

/// Returns the path to `~/.tripmate/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.tripmate/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `TripmateConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<TripmateConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(TripmateConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<TripmateConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(TripmateConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: TripmateConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Tripmate Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# user_id = "u-123"                  # Or set TRIPMATE_USER_ID
# locale = "zh-CN"                   # Or set TRIPMATE_LOCALE
# timezone = "Asia/Shanghai"         # Or set TZ
# llm_provider = "deepseek"          # "openai", "anthropic", "google", "deepseek"
# surface = "agent"                  # "agent", "planning", "journey"
# entry_point = "cli"

# [backend]
# base_url = "http://localhost:3000/api"   # Or set TRIPMATE_BASE_URL
# timeout_secs = 30
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &TripmateConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| std::env::var("TRIPMATE_BASE_URL").ok())
        .or_else(|| config.backend.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // User: CLI → env → config → default
    let user_id = cli
        .user_id
        .clone()
        .or_else(|| std::env::var("TRIPMATE_USER_ID").ok())
        .or_else(|| config.general.user_id.clone())
        .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

    let locale = std::env::var("TRIPMATE_LOCALE")
        .ok()
        .or_else(|| config.general.locale.clone())
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

    let timezone = std::env::var("TZ")
        .ok()
        .filter(|tz| !tz.is_empty())
        .or_else(|| config.general.timezone.clone())
        .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

    ResolvedConfig {
        base_url: base_url.trim_end_matches('/').to_string(),
        timeout_secs: config
            .backend
            .timeout_secs
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
        user_id,
        trip_id: cli.trip_id.clone(),
        locale,
        timezone,
        llm_provider: cli.llm_provider.or(config.general.llm_provider),
        surface: cli.surface.or(config.general.surface).unwrap_or_default(),
        entry_point: config
            .general
            .entry_point
            .clone()
            .unwrap_or_else(|| DEFAULT_ENTRY_POINT.to_string()),
        read_only: cli.read_only,
    }
}
