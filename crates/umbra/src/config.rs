use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "umbra";

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_TIMEOUT_SECS: u64 = 8;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<NarrativeConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_paused: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarrativeConfig {
    /// API key. If not set, falls back to the GEMINI_API_KEY environment
    /// variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<NarrativeMode>,
}

/// How the app acquires its storyline at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NarrativeMode {
    /// Fire-and-forget: render immediately with the built-in storyline and
    /// swap in the fetched one if it ever arrives.
    #[default]
    Background,
    /// Hold rendering behind a loading state until the fetch resolves, with
    /// a retry affordance on failure.
    Blocking,
    /// Never fetch; always use the built-in storyline.
    Off,
}

impl NarrativeMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Blocking => "blocking",
            Self::Off => "off",
        }
    }
}

impl std::fmt::Display for NarrativeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl NarrativeConfig {
    /// Resolve the API key from config or the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn mode(&self) -> NarrativeMode {
        self.mode.unwrap_or_default()
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `umbra config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# Umbra configuration\n{yaml}");
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// The narrative section, or its defaults when the section is absent.
    pub fn narrative(&self) -> NarrativeConfig {
        self.narrative.clone().unwrap_or_default()
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                match value {
                    "night" | "dawn" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'night' or 'dawn'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.start_paused" => {
                let parsed: bool = value.parse().map_err(|_| {
                    anyhow::anyhow!("Invalid start_paused: {value}. Must be 'true' or 'false'.")
                })?;
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .start_paused = Some(parsed);
            }
            "narrative.api_key" => {
                self.narrative
                    .get_or_insert_with(NarrativeConfig::default)
                    .api_key = Some(value.to_string());
            }
            "narrative.model" => {
                if value.is_empty() {
                    anyhow::bail!("Invalid model: must not be empty.");
                }
                self.narrative
                    .get_or_insert_with(NarrativeConfig::default)
                    .model = Some(value.to_string());
            }
            "narrative.timeout_secs" => {
                let parsed: u64 = value.parse().map_err(|_| {
                    anyhow::anyhow!("Invalid timeout_secs: {value}. Must be a whole number.")
                })?;
                if parsed == 0 {
                    anyhow::bail!("Invalid timeout_secs: must be at least 1.");
                }
                self.narrative
                    .get_or_insert_with(NarrativeConfig::default)
                    .timeout_secs = Some(parsed);
            }
            "narrative.mode" => {
                let mode = match value {
                    "background" => NarrativeMode::Background,
                    "blocking" => NarrativeMode::Blocking,
                    "off" => NarrativeMode::Off,
                    _ => anyhow::bail!(
                        "Invalid mode: {value}. Must be 'background', 'blocking', or 'off'."
                    ),
                };
                self.narrative
                    .get_or_insert_with(NarrativeConfig::default)
                    .mode = Some(mode);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.theme, defaults.start_paused, \
                 narrative.api_key, narrative.model, narrative.timeout_secs, narrative.mode"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_valid_theme() {
        let mut config = Config::default();
        config.set("defaults.theme", "dawn").unwrap();
        assert_eq!(config.defaults.unwrap().theme.as_deref(), Some("dawn"));
    }

    #[test]
    fn test_set_rejects_unknown_theme() {
        let mut config = Config::default();
        assert!(config.set("defaults.theme", "noon").is_err());
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let mut config = Config::default();
        assert!(config.set("defaults.speed", "2").is_err());
    }

    #[test]
    fn test_set_narrative_mode() {
        let mut config = Config::default();
        config.set("narrative.mode", "blocking").unwrap();
        assert_eq!(config.narrative().mode(), NarrativeMode::Blocking);
        assert!(config.set("narrative.mode", "async").is_err());
    }

    #[test]
    fn test_set_timeout_rejects_zero() {
        let mut config = Config::default();
        assert!(config.set("narrative.timeout_secs", "0").is_err());
        config.set("narrative.timeout_secs", "12").unwrap();
        assert_eq!(config.narrative().timeout(), Duration::from_secs(12));
    }

    #[test]
    fn test_narrative_defaults() {
        let narrative = Config::default().narrative();
        assert_eq!(narrative.model(), DEFAULT_MODEL);
        assert_eq!(narrative.timeout(), Duration::from_secs(8));
        assert_eq!(narrative.mode(), NarrativeMode::Background);
    }

    #[test]
    fn test_configured_key_wins_over_env() {
        let narrative = NarrativeConfig {
            api_key: Some("from-config".to_string()),
            ..NarrativeConfig::default()
        };
        assert_eq!(narrative.resolve_api_key().as_deref(), Some("from-config"));
    }
}
