//! Application configuration
//!
//! ## Configuration Resolution
//!
//! 1. An explicit path (`--config`), which must exist
//! 2. The user override (`~/.config/subtrack/config.toml` on Linux)
//! 3. Embedded defaults (compiled into binary)
//!
//! Keys missing from a file keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::billing::BillingConfig;
use crate::detect::DetectionConfig;
use crate::error::{Error, Result};
use crate::feed::DEFAULT_LOOKBACK_DAYS;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub lookback_days: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub detection: DetectionConfig,
    pub billing: BillingConfig,
    pub feed: FeedConfig,
}

/// Location of the user override file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("subtrack").join("config.toml"))
}

impl AppConfig {
    /// Load configuration (explicit path, then user override, then defaults)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Self::parse(DEFAULT_CONFIG),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::InvalidData(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        debug!("Loaded config from {}", path.display());
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let d = &self.detection;
        if d.min_occurrences < 2 {
            return Err(Error::InvalidData(
                "detection.min_occurrences must be at least 2".into(),
            ));
        }
        if !(d.amount_variance > 0.0) {
            return Err(Error::InvalidData(
                "detection.amount_variance must be positive".into(),
            ));
        }
        if d.monthly_min_days > d.monthly_max_days || d.yearly_min_days > d.yearly_max_days {
            return Err(Error::InvalidData(
                "detection interval ranges must have min <= max".into(),
            ));
        }
        if self.billing.monthly_grace_days < 0 || self.billing.yearly_grace_days < 0 {
            return Err(Error::InvalidData(
                "billing grace days cannot be negative".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_match_code_defaults() {
        let config = AppConfig::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = AppConfig::parse(
            r#"
            [billing]
            monthly_grace_days = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.billing.monthly_grace_days, 3);
        assert_eq!(config.billing.yearly_grace_days, 30);
        assert_eq!(config.detection, DetectionConfig::default());
        assert_eq!(config.feed.lookback_days, 90);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(AppConfig::parse("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(AppConfig::parse("[detection]\nmin_occurrences = 1").is_err());
        assert!(AppConfig::parse("[detection]\nmonthly_min_days = 40.0").is_err());
        assert!(AppConfig::parse("[billing]\nyearly_grace_days = -1").is_err());
        assert!(matches!(
            AppConfig::parse("[billing]\nmonthly_grace_days = \"seven\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[feed]\nlookback_days = 180\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.feed.lookback_days, 180);

        assert!(AppConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
