use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::lock::DEFAULT_LOCK_TIMEOUT;

/// Environment variable that overrides the store location.
pub const STORE_ENV: &str = "TICKLIST_FILE";

/// Per-user settings from `<config dir>/ticklist/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// Preferred output mode: `pretty`, `text`, or `json`.
    #[serde(default)]
    pub output: Option<String>,
    /// Store file location.
    #[serde(default)]
    pub store: Option<PathBuf>,
    /// How long to wait for a contended store lock.
    #[serde(default)]
    pub lock_timeout_ms: Option<u64>,
}

impl UserConfig {
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout_ms
            .map_or(DEFAULT_LOCK_TIMEOUT, Duration::from_millis)
    }
}

/// Settings after applying flags, environment, and config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub user: UserConfig,
    pub store_path: PathBuf,
    pub resolved_output: String,
    pub lock_timeout: Duration,
}

/// Default user config file path, if the platform has a config directory.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ticklist").join("config.toml"))
}

/// Load the user config, using defaults when no file exists.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    match user_config_path() {
        Some(path) => load_user_config_from(&path),
        None => Ok(UserConfig::default()),
    }
}

/// Load a user config from an explicit path, using defaults when it is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Default store location under the platform data directory.
#[must_use]
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ticklist")
        .join("todos.json")
}

/// Resolve flags, environment, and user config into one effective config.
///
/// # Errors
///
/// Returns an error if the user config file is unreadable or malformed.
pub fn resolve_config(
    cli_file: Option<&Path>,
    cli_output: Option<&str>,
    cli_json: bool,
) -> Result<EffectiveConfig> {
    let user = load_user_config()?;

    let env_file = env::var_os(STORE_ENV).map(PathBuf::from);
    let store_path = resolve_store_path(cli_file, env_file, user.store.clone());

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(
        cli_output,
        cli_json,
        user.output.clone(),
        env_format,
        std::io::stdout().is_terminal(),
    );

    let lock_timeout = user.lock_timeout();
    Ok(EffectiveConfig {
        user,
        store_path,
        resolved_output,
        lock_timeout,
    })
}

fn resolve_store_path(
    cli_file: Option<&Path>,
    env_file: Option<PathBuf>,
    user_store: Option<PathBuf>,
) -> PathBuf {
    cli_file
        .map(Path::to_path_buf)
        .or_else(|| env_file.filter(|p| !p.as_os_str().is_empty()))
        .or(user_store)
        .unwrap_or_else(default_store_path)
}

/// Normalize an output mode name; unknown names yield `None`.
#[must_use]
pub fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "plain" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

fn resolve_output(
    cli_output: Option<&str>,
    cli_json: bool,
    user_output: Option<String>,
    env_format: Option<String>,
    is_tty: bool,
) -> String {
    if let Some(mode) = cli_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if is_tty {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}
