use anyhow::{Context, Result};
use planlens_analyzer::{AiSettings, InsightThresholds};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::settings_file;

/// Overrides the analysis service API key
pub const API_KEY_ENV: &str = "PLANLENS_API_KEY";
/// Overrides the analysis service base URL
pub const BASE_URL_ENV: &str = "PLANLENS_BASE_URL";
/// Overrides the analysis service model
pub const MODEL_ENV: &str = "PLANLENS_MODEL";

const DEFAULT_LOCALE: &str = "en";

/// Top-level settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanlensSettings {
    pub ai: AiSettings,
    pub insights: InsightThresholds,
    /// Language requested from the analysis service ("en" or "zh")
    pub locale: String,
}

impl Default for PlanlensSettings {
    fn default() -> Self {
        Self {
            ai: AiSettings::default(),
            insights: InsightThresholds::default(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl PlanlensSettings {
    /// Loads settings from the default location
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings JSON in {:?}", path))
    }

    /// Loads settings, falling back to the defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to load settings, using defaults");
            Self::default()
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(())
    }

    pub fn settings_path() -> Result<PathBuf> {
        settings_file::settings_file()
    }

    /// Applies `PLANLENS_*` environment variables on top of the loaded values
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any variable source; blank values are ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fields = [
            (API_KEY_ENV, &mut self.ai.api_key),
            (BASE_URL_ENV, &mut self.ai.base_url),
            (MODEL_ENV, &mut self.ai.model),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                tracing::debug!(variable = key, "settings override from environment");
                *field = value;
            }
        }
    }
}
