use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_child_name")]
    pub child_name: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_quiz_length")]
    pub quiz_length: usize,
    #[serde(default = "default_review_length")]
    pub review_length: usize,
    #[serde(default = "default_correct_delay_ms")]
    pub correct_delay_ms: u64,
    #[serde(default = "default_wrong_delay_ms")]
    pub wrong_delay_ms: u64,
    #[serde(default)]
    pub max_mistakes: Option<u32>,
    #[serde(default = "default_explanation_sample_factor")]
    pub explanation_sample_factor: u32,
    #[serde(default = "default_ai_enabled")]
    pub ai_enabled: bool,
    #[serde(default = "default_ai_base_url")]
    pub ai_base_url: String,
    #[serde(default = "default_ai_model")]
    pub ai_model: String,
    #[serde(default = "default_ai_api_key_env")]
    pub ai_api_key_env: String,
    #[serde(default = "default_ai_timeout_secs")]
    pub ai_timeout_secs: u64,
    #[serde(default)]
    pub voice_command: Vec<String>,
    #[serde(default = "default_voice_locale")]
    pub voice_locale: String,
}

fn default_child_name() -> String {
    "Valentina".to_string()
}
fn default_theme() -> String {
    "hada".to_string()
}
fn default_quiz_length() -> usize {
    10
}
fn default_review_length() -> usize {
    10
}
fn default_correct_delay_ms() -> u64 {
    600
}
fn default_wrong_delay_ms() -> u64 {
    1000
}
fn default_explanation_sample_factor() -> u32 {
    5
}
fn default_ai_enabled() -> bool {
    true
}
fn default_ai_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_ai_model() -> String {
    "gemini-3-flash-preview".to_string()
}
fn default_ai_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_ai_timeout_secs() -> u64 {
    10
}
fn default_voice_locale() -> String {
    "es-ES".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            child_name: default_child_name(),
            theme: default_theme(),
            quiz_length: default_quiz_length(),
            review_length: default_review_length(),
            correct_delay_ms: default_correct_delay_ms(),
            wrong_delay_ms: default_wrong_delay_ms(),
            max_mistakes: None,
            explanation_sample_factor: default_explanation_sample_factor(),
            ai_enabled: default_ai_enabled(),
            ai_base_url: default_ai_base_url(),
            ai_model: default_ai_model(),
            ai_api_key_env: default_ai_api_key_env(),
            ai_timeout_secs: default_ai_timeout_secs(),
            voice_command: Vec::new(),
            voice_locale: default_voice_locale(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tablas")
    }

    /// Clamp numeric settings into their usable ranges.
    pub fn validate(&mut self) {
        self.quiz_length = self.quiz_length.clamp(1, 10);
        self.review_length = self.review_length.clamp(1, 50);
        self.explanation_sample_factor = self.explanation_sample_factor.clamp(1, 10);
        self.ai_timeout_secs = self.ai_timeout_secs.max(1);
        if self.child_name.trim().is_empty() {
            self.child_name = default_child_name();
        }
    }
}
