//! Configuration module for loading TOML config files.
//!
//! Every section is optional; anything left out falls back to the built-in
//! defaults. Personalities and templates given here are layered on top of
//! the built-in ones.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::DebateError;
use crate::generator::{DEFAULT_MODEL, GeneratorConfig};
use crate::orchestrator::DebateSettings;
use crate::personality::{PersonalityRecord, PersonalityStore};
use crate::template::TemplateStore;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorSection,
    pub debate: DebateSection,
    /// Directory of extra `<id>.toml` personality files.
    pub personality_dir: Option<PathBuf>,
    pub personalities: BTreeMap<String, PersonalityRecord>,
    /// Template overrides keyed by round: opening, rebuttal, closing.
    pub templates: BTreeMap<String, String>,
}

/// Text generation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorSection {
    pub model: String,
    /// Overrides the API base taken from the environment.
    pub api_base: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub strip_reasoning: bool,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: None,
            temperature: 0.7,
            timeout_secs: 120,
            strip_reasoning: true,
        }
    }
}

/// Debate flow settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DebateSection {
    pub turn_max_tokens: u32,
    pub summary_max_tokens: u32,
    pub round_delay_secs: u64,
    /// Where transcripts are saved.
    pub output_dir: PathBuf,
}

impl Default for DebateSection {
    fn default() -> Self {
        Self {
            turn_max_tokens: 1000,
            summary_max_tokens: 1500,
            round_delay_secs: 2,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DebateError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| DebateError::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_str(&content)
    }

    /// Load configuration from string content.
    pub fn from_str(content: &str) -> Result<Self, DebateError> {
        toml::from_str(content)
            .map_err(|e| DebateError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Built-in personalities, then `personality_dir`, then inline entries.
    pub fn personality_store(&self) -> Result<PersonalityStore, DebateError> {
        let mut store = PersonalityStore::builtin();
        if let Some(dir) = &self.personality_dir {
            store.load_dir(dir)?;
        }
        store.extend_records(self.personalities.clone())?;
        Ok(store)
    }

    pub fn template_store(&self) -> Result<TemplateStore, DebateError> {
        TemplateStore::builtin().with_overrides(self.templates.clone())
    }

    pub fn debate_settings(&self) -> DebateSettings {
        DebateSettings {
            turn_max_tokens: self.debate.turn_max_tokens,
            summary_max_tokens: self.debate.summary_max_tokens,
            round_delay: Duration::from_secs(self.debate.round_delay_secs),
        }
    }

    /// Generator settings; `api_base` from the config file wins over the one passed in.
    pub fn generator_config(&self, api_base: &str, api_key: &str) -> GeneratorConfig {
        let api_base = self.generator.api_base.as_deref().unwrap_or(api_base);
        GeneratorConfig {
            api_base: api_base.to_string(),
            api_key: api_key.to_string(),
            model: self.generator.model.clone(),
            temperature: self.generator.temperature,
            timeout: Duration::from_secs(self.generator.timeout_secs),
            strip_reasoning: self.generator.strip_reasoning,
        }
    }
}
