use std::path::{Path, PathBuf};

use finger_match::{ConfigError, MatchConfig};
use finger_orb::{OrbError, OrbParams};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML settings: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported settings format: {} (expected .toml or .json)", .0.display())]
    UnknownFormat(PathBuf),

    #[error("matching settings: {0}")]
    Matching(#[from] ConfigError),

    #[error("detector settings: {0}")]
    Detector(#[from] OrbError),
}

/// Settings file layout: a `[matching]` and a `[detector]` table, both optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub matching: MatchConfig,
    pub detector: OrbParams,
}

impl Settings {
    /// Load from a `.toml` or `.json` file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let content = match ext.as_deref() {
            Some("toml") | Some("json") => std::fs::read_to_string(path)?,
            _ => return Err(SettingsError::UnknownFormat(path.to_path_buf())),
        };
        if ext.as_deref() == Some("json") {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    pub fn from_toml(s: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json(s: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.matching.validate()?;
        self.detector.validate()?;
        Ok(())
    }
}
