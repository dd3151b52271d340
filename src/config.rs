use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Well-known id of the element holding all notifications
pub const DEFAULT_CONTAINER_ID: &str = "notification-container";

/// Class assigned to a freshly created container
pub const DEFAULT_CONTAINER_CLASS: &str = "notification-container";

/// Display time used when a caller gives no duration
pub const DEFAULT_DURATION_MS: u64 = 3000;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How message text is inserted into a notification's content element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupPolicy {
    /// Insert the message as raw markup. Callers must only pass trusted content.
    #[default]
    Trusted,
    /// Strip scripts, event handlers and other unsafe markup, keep formatting
    Sanitized,
    /// Render the message as plain text
    Escaped,
}

/// Presenter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    /// Id looked up (or assigned) for the notification container
    pub container_id: String,

    /// Class assigned when the container has to be created
    pub container_class: String,

    /// Display time for notifications shown without an explicit duration
    pub default_duration_ms: u64,

    /// Treatment of message markup
    pub markup_policy: MarkupPolicy,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            container_class: DEFAULT_CONTAINER_CLASS.to_string(),
            default_duration_ms: DEFAULT_DURATION_MS,
            markup_policy: MarkupPolicy::default(),
        }
    }
}

impl PresenterConfig {
    pub fn default_duration(&self) -> Duration {
        Duration::from_millis(self.default_duration_ms)
    }

    /// Check invariants the presenter relies on
    pub fn validate(&self) -> ConfigResult<()> {
        if self.container_id.trim().is_empty() {
            return Err(ConfigError::Invalid("container_id must not be empty".into()));
        }
        if self.container_id.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "container_id '{}' must not contain whitespace",
                self.container_id
            )));
        }
        if self.default_duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "default_duration_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: PresenterConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from file, falling back to defaults when it does not exist
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        if fs::try_exists(path).await? {
            let content = fs::read_to_string(path).await?;
            let config = Self::from_toml_str(&content)?;
            debug!("Loaded presenter config from {}", path.display());
            Ok(config)
        } else {
            debug!("No presenter config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub async fn save(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = self.to_toml_string()?;
        fs::write(path, content).await?;

        Ok(())
    }

    /// Default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("toastlet").join("presenter.toml")
        } else {
            PathBuf::from(".").join("presenter.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PresenterConfig::default();
        assert_eq!(config.container_id, "notification-container");
        assert_eq!(config.container_class, "notification-container");
        assert_eq!(config.default_duration(), Duration::from_millis(3000));
        assert_eq!(config.markup_policy, MarkupPolicy::Trusted);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PresenterConfig::from_toml_str(
            r#"
            default_duration_ms = 1500
            markup_policy = "sanitized"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_duration_ms, 1500);
        assert_eq!(config.markup_policy, MarkupPolicy::Sanitized);
        assert_eq!(config.container_id, DEFAULT_CONTAINER_ID);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            PresenterConfig::from_toml_str("default_duration_ms = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PresenterConfig::from_toml_str("container_id = \"  \""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PresenterConfig::from_toml_str("container_id = \"two words\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PresenterConfig::from_toml_str("markup_policy = \"yolo\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("presenter.toml");

        let config = PresenterConfig {
            container_id: "toasts".to_string(),
            default_duration_ms: 4200,
            markup_policy: MarkupPolicy::Escaped,
            ..Default::default()
        };
        config.save(&path).await.unwrap();

        let loaded = PresenterConfig::load(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = PresenterConfig::load(&dir.path().join("absent.toml"))
            .await
            .unwrap();
        assert_eq!(loaded, PresenterConfig::default());
    }
}
