//! Client settings persistence.
//!
//! Settings live in the platform-specific config directory:
//! - Linux: ~/.config/lumen/settings.json
//! - macOS: ~/Library/Application Support/lumen/settings.json
//! - Windows: %APPDATA%/lumen/settings.json
//!
//! Environment variables override whatever the file holds.

use std::path::{Path, PathBuf};

use lumen_domain::{ApiKey, ClientSettings, OrganizationId};
use tokio::fs;
use tracing::debug;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Overrides `ClientSettings::api_key`.
pub const ENV_API_KEY: &str = "LUMEN_API_KEY";
/// Overrides `ClientSettings::organization`.
pub const ENV_ORGANIZATION: &str = "LUMEN_ORGANIZATION";
/// Overrides `ClientSettings::base_url`.
pub const ENV_BASE_URL: &str = "LUMEN_BASE_URL";
/// Overrides `ClientSettings::timeout_ms`.
pub const ENV_TIMEOUT_MS: &str = "LUMEN_TIMEOUT_MS";

const TIMEOUT_NOT_POSITIVE: &str = "must be greater than zero";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid JSON for `ClientSettings`.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// A setting from the file or an environment override is out of range.
    #[error("invalid value for {name}: {message}")]
    InvalidValue {
        /// Setting or variable name.
        name: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

/// Repository for client settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    path: Option<PathBuf>,
}

impl Default for SettingsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsRepository {
    /// Uses the default location under the user's config directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: dirs::config_dir().map(|p| p.join("lumen").join("settings.json")),
        }
    }

    /// Uses an explicit settings file.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Returns the settings file path, if one could be determined.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads settings from disk.
    ///
    /// Returns defaults if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if its `timeout_ms` is zero.
    pub async fn load(&self) -> Result<ClientSettings, SettingsError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(ClientSettings::default());
        };

        match fs::read(path).await {
            Ok(content) => {
                debug!(path = %path.display(), "loaded settings");
                let settings: ClientSettings = from_json_bytes(&content)?;
                if settings.timeout_ms == 0 {
                    return Err(SettingsError::InvalidValue {
                        name: "timeout_ms",
                        message: TIMEOUT_NOT_POSITIVE.to_string(),
                    });
                }
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientSettings::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads settings from disk, then applies the `LUMEN_*` environment
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or an override is invalid.
    pub async fn load_with_env(&self) -> Result<ClientSettings, SettingsError> {
        let settings = self.load().await?;
        apply_env_overrides(settings, |name| std::env::var(name).ok())
    }

    /// Saves settings to disk, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is known or the file cannot be written.
    pub async fn save(&self, settings: &ClientSettings) -> Result<(), SettingsError> {
        let Some(path) = self.path.as_deref() else {
            return Err(SettingsError::NoConfigDir);
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let content = to_json_stable_bytes(settings)?;
        fs::write(path, content).await?;
        Ok(())
    }
}

/// Applies overrides read through `lookup`. Unset or blank variables leave
/// the setting untouched.
///
/// # Errors
///
/// Returns [`SettingsError::InvalidValue`] if `LUMEN_TIMEOUT_MS` is not a
/// positive integer.
pub fn apply_env_overrides(
    mut settings: ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, SettingsError> {
    let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(value) = var(ENV_API_KEY) {
        settings.api_key = ApiKey::try_parse(&value);
    }
    if let Some(value) = var(ENV_ORGANIZATION) {
        settings.organization = OrganizationId::try_parse(&value);
    }
    if let Some(value) = var(ENV_BASE_URL) {
        settings.base_url = value.trim().to_string();
    }
    if let Some(value) = var(ENV_TIMEOUT_MS) {
        settings.timeout_ms = match value.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => ms,
            Ok(_) => {
                return Err(SettingsError::InvalidValue {
                    name: ENV_TIMEOUT_MS,
                    message: TIMEOUT_NOT_POSITIVE.to_string(),
                });
            }
            Err(e) => {
                return Err(SettingsError::InvalidValue {
                    name: ENV_TIMEOUT_MS,
                    message: e.to_string(),
                });
            }
        };
    }

    Ok(settings)
}
