use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::GenerationConfig;
use crate::error::Result;
use crate::kie::live::DEFAULT_BASE_URL;

pub const SETTINGS_FILE: &str = "settings.json";

/// Environment variable consulted when no API key is stored.
pub const API_KEY_ENV: &str = "KIE_API_KEY";

// ---------------------------------------------------------------------------
// Settings — {dataDir}/settings.json
// ---------------------------------------------------------------------------

/// Locally persisted shell state: the API credential, the last-used free-text
/// fields, and the theme preference. Nothing here affects core semantics;
/// the shell reads it to prefill the next session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    #[serde(alias = "baseURL")]
    pub base_url: String,
    #[serde(default)]
    pub mock_mode: bool,
    #[serde(default)]
    pub dialogue: String,
    #[serde(default)]
    pub special_requests: String,
    #[serde(default)]
    pub product_hint: String,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_theme() -> String {
    "light".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            mock_mode: false,
            dialogue: String::new(),
            special_requests: String::new(),
            product_hint: String::new(),
            theme: default_theme(),
        }
    }
}

impl Settings {
    /// Read settings from `path`; a missing or unparseable file yields the
    /// defaults.
    pub fn load(path: &Path) -> Settings {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => Settings::default(),
        }
    }

    /// Write settings to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// The stored API key, falling back to the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
    }

    /// Remember the free-text fields of the last-used configuration.
    pub fn remember(&mut self, config: &GenerationConfig) {
        self.dialogue = config.dialogue.clone();
        self.special_requests = config.special_requests.clone();
        self.product_hint = config.product_hint.clone();
    }
}

/// Application data directory, e.g. `~/.local/share/ugcstudio` on Linux.
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("ugcstudio"))
}

/// Default settings file location inside the data directory.
pub fn default_settings_path() -> Option<PathBuf> {
    data_dir().map(|d| d.join(SETTINGS_FILE))
}
