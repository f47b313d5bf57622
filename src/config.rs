use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_session_length")]
    pub session_length: usize,
    #[serde(default = "default_landfill_min")]
    pub landfill_min: usize,
    #[serde(default = "default_speech_enabled")]
    pub speech_enabled: bool,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_parser_model")]
    pub parser_model: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    #[serde(default)]
    pub materials_url: Option<String>,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_session_length() -> usize {
    10
}
fn default_landfill_min() -> usize {
    5
}
fn default_speech_enabled() -> bool {
    true
}
fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_text_model() -> String {
    "gemini-3-flash-preview".to_string()
}
fn default_parser_model() -> String {
    "gemini-3-pro-preview".to_string()
}
fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            session_length: default_session_length(),
            landfill_min: default_landfill_min(),
            speech_enabled: default_speech_enabled(),
            api_base_url: default_api_base_url(),
            text_model: default_text_model(),
            parser_model: default_parser_model(),
            tts_model: default_tts_model(),
            materials_url: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
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
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sweepr")
            .join("config.toml")
    }

    /// Clamp loaded values into usable ranges. Call after deserialization to
    /// handle stale or hand-edited configs.
    pub fn validate(&mut self) {
        self.session_length = self.session_length.clamp(1, 50);
        self.landfill_min = self.landfill_min.clamp(1, self.session_length);
        if self.api_base_url.is_empty() {
            self.api_base_url = default_api_base_url();
        }
    }

    /// API key comes from the environment, never the config file.
    pub fn api_key() -> String {
        std::env::var("GEMINI_API_KEY").unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.theme, "terminal-default");
        assert_eq!(config.session_length, 10);
        assert_eq!(config.landfill_min, 5);
        assert!(config.speech_enabled);
        assert!(config.materials_url.is_none());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let toml_str = r#"
theme = "catppuccin-mocha"
session_length = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "catppuccin-mocha");
        assert_eq!(config.session_length, 5);
        assert_eq!(config.tts_model, "gemini-2.5-flash-preview-tts");
    }

    #[test]
    fn serde_round_trip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.theme, deserialized.theme);
        assert_eq!(config.session_length, deserialized.session_length);
        assert_eq!(config.api_base_url, deserialized.api_base_url);
    }

    #[test]
    fn validate_clamps_values() {
        let mut config = Config::default();
        config.session_length = 999;
        config.landfill_min = 500;
        config.api_base_url = String::new();
        config.validate();
        assert_eq!(config.session_length, 50);
        assert_eq!(config.landfill_min, 50);
        assert!(!config.api_base_url.is_empty());
    }

    #[test]
    fn validate_keeps_landfill_min_within_session() {
        let mut config = Config::default();
        config.session_length = 3;
        config.landfill_min = 5;
        config.validate();
        assert_eq!(config.landfill_min, 3);
    }
}
