//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Session defaults (length, title, starting volume, ambient track)
//! - Voice prompt delivery
//! - Chat endpoint
//! - Email dispatch credentials for sign-in codes
//!
//! Configuration is stored at `~/.config/serene/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::session::{
    SessionOptions, VoiceSettings, AMBIENT_MUSIC_URL, DEFAULT_MINUTES, DEFAULT_TITLE,
    DEFAULT_VOLUME,
};

/// Defaults applied to new meditation sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_minutes")]
    pub default_minutes: u64,
    #[serde(default = "default_title")]
    pub default_title: String,
    #[serde(default = "default_volume")]
    pub default_volume: f32,
    #[serde(default = "default_ambient_url")]
    pub ambient_url: String,
}

/// Streaming chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_endpoint")]
    pub endpoint: String,
    /// Sent as a bearer token.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

/// Transactional email service used to deliver sign-in codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_email_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_id")]
    pub service_id: String,
    #[serde(default = "default_template_id")]
    pub template_id: String,
    #[serde(default = "default_public_key")]
    pub public_key: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/serene/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub voice: VoiceSettings,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

// Default functions
fn default_minutes() -> u64 {
    DEFAULT_MINUTES
}
fn default_title() -> String {
    DEFAULT_TITLE.into()
}
fn default_volume() -> f32 {
    DEFAULT_VOLUME
}
fn default_ambient_url() -> String {
    AMBIENT_MUSIC_URL.into()
}
fn default_chat_endpoint() -> String {
    "http://localhost:54321/functions/v1/wellness-chat".into()
}
fn default_greeting() -> String {
    "Hello! I'm Serene, your wellness companion. How are you feeling today? I'm here to support \
     your mindfulness journey, help with relaxation techniques, or simply listen."
        .into()
}
fn default_email_endpoint() -> String {
    "https://api.emailjs.com/api/v1.0/email/send".into()
}
fn default_service_id() -> String {
    "YOUR_SERVICE_ID".into()
}
fn default_template_id() -> String {
    "YOUR_TEMPLATE_ID".into()
}
fn default_public_key() -> String {
    "YOUR_PUBLIC_KEY".into()
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            default_title: default_title(),
            default_volume: default_volume(),
            ambient_url: default_ambient_url(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: default_chat_endpoint(),
            api_key: None,
            greeting: default_greeting(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            endpoint: default_email_endpoint(),
            service_id: default_service_id(),
            template_id: default_template_id(),
            public_key: default_public_key(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        if key.is_empty() {
            return Err(unknown());
        }

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value in memory by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be
    /// parsed or is out of range. The config is left unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check value ranges serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.default_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "session.default_minutes".into(),
                message: "must be greater than zero".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.session.default_volume) {
            return Err(ConfigError::InvalidValue {
                key: "session.default_volume".into(),
                message: "must be between 0 and 1".into(),
            });
        }
        url::Url::parse(&self.chat.endpoint).map_err(|e| ConfigError::InvalidValue {
            key: "chat.endpoint".into(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Engine options derived from the session and voice sections.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            volume: self.session.default_volume,
            ambient_url: self.session.ambient_url.clone(),
            voice: self.voice.clone(),
            ..SessionOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.session.default_minutes, 10);
        assert_eq!(parsed.session.default_volume, 0.3);
        assert_eq!(parsed.voice.rate, 0.7);
        assert!(parsed.chat.api_key.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[session]\ndefault_minutes = 20\n").unwrap();
        assert_eq!(parsed.session.default_minutes, 20);
        assert_eq!(parsed.session.default_title, "Meditation Session");
        assert_eq!(parsed.email.service_id, "YOUR_SERVICE_ID");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("session.default_minutes").as_deref(), Some("10"));
        assert_eq!(cfg.get("session.default_title").as_deref(), Some("Meditation Session"));
        assert!(cfg.get("session.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_number_and_string() {
        let mut cfg = Config::default();
        cfg.set("session.default_volume", "0.5").unwrap();
        cfg.set("session.default_minutes", "25").unwrap();
        cfg.set("chat.api_key", "secret").unwrap();
        assert_eq!(cfg.session.default_volume, 0.5);
        assert_eq!(cfg.session.default_minutes, 25);
        assert_eq!(cfg.chat.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn set_updates_array() {
        let mut cfg = Config::default();
        cfg.set("voice.preferred_voices", r#"["Moira"]"#).unwrap();
        assert_eq!(cfg.voice.preferred_voices, vec!["Moira".to_string()]);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("session.nonexistent_key", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("nope.x", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type_and_range() {
        let mut cfg = Config::default();
        assert!(cfg.set("session.default_minutes", "soon").is_err());
        assert!(cfg.set("session.default_minutes", "0").is_err());
        assert!(cfg.set("session.default_volume", "1.5").is_err());
        assert!(cfg.set("chat.endpoint", "not a url").is_err());
        assert_eq!(cfg.session.default_minutes, 10);
        assert_eq!(cfg.session.default_volume, 0.3);
    }

    #[test]
    fn load_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.session.default_minutes, 10);

        let mut cfg = cfg;
        cfg.set("session.default_title", "Evening").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().session.default_title, "Evening");
    }

    #[test]
    fn corrupt_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "session = 3").unwrap();
        let err = Config::load_from(&path).unwrap_err().to_string();
        assert!(err.contains("config.toml"), "{err}");
    }

    #[test]
    fn session_options_follow_config() {
        let mut cfg = Config::default();
        cfg.set("session.default_volume", "0.6").unwrap();
        let opts = cfg.session_options();
        assert_eq!(opts.volume, 0.6);
        assert_eq!(opts.ambient_url, AMBIENT_MUSIC_URL);
    }
}
