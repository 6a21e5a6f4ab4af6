//! Configuration schema and defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Fully resolved emoscope configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmoscopeConfig {
    pub api: ApiConfig,
    pub history: HistoryConfig,
}

/// Settings for the classification service connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the emotion-classification service.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// Settings for the local history store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Override for the history file location. Defaults to
    /// `~/.emoscope/history.json` when unset.
    pub path: Option<String>,
}

impl EmoscopeConfig {
    /// Resolved history file path: the configured override, else the
    /// default under the home directory, else `None` (ephemeral).
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history
            .path
            .as_ref()
            .map(PathBuf::from)
            .or_else(crate::history::default_history_path)
    }

    /// Annotated default config document written by `emoscope config init`.
    pub fn default_toml() -> String {
        r#"# emoscope configuration
#
# Layering: built-in defaults < ~/.emoscope/config.toml < .emoscope.toml
# in the current directory < EMOSCOPE_* environment variables.

[api]
# Base URL of the emotion-classification service.
# Env override: EMOSCOPE_API_URL
base_url = "http://localhost:5000"

# Request timeout in milliseconds.
# Env override: EMOSCOPE_API_TIMEOUT_MS
timeout_ms = 30000

[history]
# Uncomment to store prediction history somewhere other than
# ~/.emoscope/history.json.
# Env override: EMOSCOPE_HISTORY_PATH
# path = "/path/to/history.json"
"#
        .to_string()
    }
}
