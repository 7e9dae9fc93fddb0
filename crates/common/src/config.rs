//! Application configuration.
//!
//! Every pipeline component takes its configuration explicitly; this module
//! only defines the serializable structures and the on-disk location of the
//! user's defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::LingocastResult;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Speech synthesis defaults.
    pub speech: SpeechDefaults,

    /// Subtitle text styling per screen type.
    pub text: TextDefaults,

    /// Output defaults.
    pub output: OutputDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default speech synthesis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechDefaults {
    /// Native-language voice identifier (e.g. "ko-KR-Standard-A").
    pub native_voice: String,

    /// Native-language BCP-47 tag.
    pub native_language: String,

    /// Learner voice identifiers, spoken in order for each learning-language
    /// repetition.
    pub learner_voices: Vec<String>,

    /// Learner-language BCP-47 tag.
    pub learner_language: String,

    /// Silence inserted between voices and scenes, in seconds.
    pub silence_secs: f64,
}

/// Text styling for one screen type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font file name, resolved against the assets directory.
    pub font: String,

    /// Point size.
    pub size: u32,

    /// Hex color string (for example `#ffffff`).
    pub color: String,
}

/// Text styling per screen type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDefaults {
    pub screen1: TextStyle,
    pub screen2: TextStyle,
    pub narration: TextStyle,
}

/// Output defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDefaults {
    /// Target resolution as "WxH".
    pub resolution: String,

    /// Frames-per-second used for frame numbering.
    pub fps: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "lingocast=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            speech: SpeechDefaults::default(),
            text: TextDefaults::default(),
            output: OutputDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SpeechDefaults {
    fn default() -> Self {
        Self {
            native_voice: "ko-KR-Standard-A".to_string(),
            native_language: "ko-KR".to_string(),
            learner_voices: vec![
                "cmn-CN-Standard-A".to_string(),
                "cmn-CN-Standard-B".to_string(),
                "cmn-CN-Standard-C".to_string(),
                "cmn-CN-Standard-D".to_string(),
            ],
            learner_language: "cmn-CN".to_string(),
            silence_secs: 1.0,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: "NotoSansKR-Bold.otf".to_string(),
            size: 48,
            color: "#ffffff".to_string(),
        }
    }
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            screen1: TextStyle {
                size: 64,
                ..TextStyle::default()
            },
            screen2: TextStyle::default(),
            narration: TextStyle::default(),
        }
    }
}

impl Default for OutputDefaults {
    fn default() -> Self {
        Self {
            resolution: "1920x1080".to_string(),
            fps: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> LingocastResult<()> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, json)?;
        Ok(())
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("lingocast").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.speech.learner_voices.len(), 4);
        assert_eq!(parsed.output.fps, 30);
    }

    #[test]
    fn test_default_silence_is_one_second() {
        let config = AppConfig::default();
        assert!((config.speech.silence_secs - 1.0).abs() < 1e-9);
    }
}
