//! User settings - `~/.api-explorer/settings.yaml`, with env overrides

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GEMINI_MODEL, GEMINI_API_KEY_ENV, SETTINGS_FILE};
use crate::naming::{GeminiSuggester, IdentitySuggester, NameSuggester};
use crate::storage::default_config_dir;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gemini_model: String,
    pub gemini_api_key: Option<String>,
    /// Where exports are written
    pub export_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_key: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Loads the default settings file, then applies environment overrides
    pub fn load() -> Result<Self> {
        let mut settings = Self::from_file(&default_config_dir().join(SETTINGS_FILE))?;
        if let Ok(key) = std::env::var(GEMINI_API_KEY_ENV) {
            settings.gemini_api_key = Some(key);
        }
        Ok(settings)
    }

    /// Missing file yields defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Gemini when a key is configured, raw keys otherwise
    pub fn name_suggester(&self, client: reqwest::Client) -> Arc<dyn NameSuggester> {
        match self.gemini_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            Some(key) => Arc::new(GeminiSuggester::new(client, key, &self.gemini_model)),
            None => {
                tracing::info!("No Gemini API key configured, column names will use raw keys");
                Arc::new(IdentitySuggester)
            }
        }
    }
}
