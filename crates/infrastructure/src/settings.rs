//! Client settings loading.
//!
//! Settings come from an optional JSON file, then environment overrides:
//! - `REMODEL_BASE_URL`
//! - `REMODEL_TIMEOUT_MS`
//! - `REMODEL_DEFAULT_LIMIT`

use std::path::{Path, PathBuf};

use remodel_domain::ClientSettings;
use tokio::fs;

/// Overrides `ClientSettings::base_url`.
pub const BASE_URL_VAR: &str = "REMODEL_BASE_URL";
/// Overrides `ClientSettings::timeout_ms`.
pub const TIMEOUT_MS_VAR: &str = "REMODEL_TIMEOUT_MS";
/// Overrides `ClientSettings::default_limit`.
pub const DEFAULT_LIMIT_VAR: &str = "REMODEL_DEFAULT_LIMIT";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid JSON for `ClientSettings`.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An environment override does not parse.
    #[error("invalid value for {name}: {value}")]
    InvalidOverride {
        /// Variable name
        name: &'static str,
        /// Rejected value
        value: String,
    },
}

/// Loads `ClientSettings` from disk and the environment.
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader {
    path: Option<PathBuf>,
}

impl SettingsLoader {
    /// Creates a loader that only reads the environment.
    #[must_use]
    pub const fn new() -> Self {
        Self { path: None }
    }

    /// Creates a loader reading the given JSON file first.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Returns the settings file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads settings.
    ///
    /// Returns default settings if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an
    /// environment override is malformed.
    pub async fn load(&self) -> Result<ClientSettings, SettingsError> {
        let settings = self.load_file().await?;
        apply_overrides(settings, |name| std::env::var(name).ok())
    }

    async fn load_file(&self) -> Result<ClientSettings, SettingsError> {
        let Some(path) = &self.path else {
            return Ok(ClientSettings::default());
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(ClientSettings::default());
        }

        let content = fs::read(path).await?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// Writes settings to the loader's file as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no path or the write fails.
    pub async fn save(&self, settings: &ClientSettings) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Err(SettingsError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "settings loader has no file path",
            )));
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let mut content = serde_json::to_vec_pretty(settings)?;
        content.push(b'\n');
        fs::write(path, content).await?;
        Ok(())
    }
}

/// Applies environment overrides read through `lookup`.
///
/// # Errors
///
/// Returns `SettingsError::InvalidOverride` if a numeric variable does not
/// parse.
pub fn apply_overrides(
    mut settings: ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, SettingsError> {
    if let Some(base_url) = lookup(BASE_URL_VAR) {
        settings.base_url = base_url;
    }
    if let Some(value) = lookup(TIMEOUT_MS_VAR) {
        settings.timeout_ms = value
            .trim()
            .parse()
            .map_err(|_| SettingsError::InvalidOverride {
                name: TIMEOUT_MS_VAR,
                value,
            })?;
    }
    if let Some(value) = lookup(DEFAULT_LIMIT_VAR) {
        settings.default_limit = value
            .trim()
            .parse()
            .map_err(|_| SettingsError::InvalidOverride {
                name: DEFAULT_LIMIT_VAR,
                value,
            })?;
    }
    Ok(settings)
}
