/// Configuration system for emoscope.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::EmoscopeConfig::default()`]
/// 2. **User global config** — `~/.emoscope/config.toml`
/// 3. **Project local config** — `.emoscope.toml` in the current working directory
/// 4. **Environment variables** — `EMOSCOPE_*` overrides (highest precedence)
///
/// Later layers override earlier ones. Missing or malformed TOML files are
/// silently ignored and fall back to the previous layer.
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::EmoscopeConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML →
/// env vars. This is the primary entry point for all modules that need
/// configuration.
pub fn load() -> EmoscopeConfig {
    let mut config = EmoscopeConfig::default();

    // Layer 2: user global config (~/.emoscope/config.toml)
    if let Some(global) = load_toml_file(global_config_path()) {
        merge_config(&mut config, &global);
    }

    // Layer 3: project local config (.emoscope.toml)
    if let Some(project) = load_toml_file(project_config_path()) {
        merge_config(&mut config, &project);
    }

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. A broken config file never prevents the CLI from
/// running.
fn load_toml_file(path: Option<PathBuf>) -> Option<EmoscopeConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge a loaded config layer into the base config.
///
/// Each TOML file deserializes with `serde(default)`, so unset keys carry
/// the built-in defaults; replacing the base wholesale applies exactly the
/// keys the user set.
fn merge_config(base: &mut EmoscopeConfig, overlay: &EmoscopeConfig) {
    *base = overlay.clone();
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.emoscope/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".emoscope").join("config.toml"))
}

/// Path to the project local config: `.emoscope.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".emoscope.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `EMOSCOPE_API_URL` — classification service base URL
/// - `EMOSCOPE_API_TIMEOUT_MS` — request timeout
/// - `EMOSCOPE_HISTORY_PATH` — history file location
fn apply_env_overrides(config: &mut EmoscopeConfig) {
    if let Ok(val) = std::env::var("EMOSCOPE_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("EMOSCOPE_API_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("EMOSCOPE_HISTORY_PATH")
        && !val.is_empty()
    {
        config.history.path = Some(val);
    }
}

// ---------------------------------------------------------------------------
// Config init / show
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.emoscope/config.toml`.
///
/// Creates the `~/.emoscope/` directory if it doesn't exist. Returns an
/// error if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.emoscope/ directory")?;
    }

    fs::write(&path, EmoscopeConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
