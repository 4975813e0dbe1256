//! Vito configuration.
//!
//! Loaded from `~/.vito/config.toml`, or from a path given on the command
//! line. Every field is optional; missing ones take their defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{
    CREW_COMMISSION_RATE, DEFAULT_AREA_VALUE_PER_UNIT, DEFAULT_COMMISSION_RATE,
    DEFAULT_INSTALLMENT_COUNT,
};

/// Who hears about finished tasks unless told otherwise.
pub const DEFAULT_NOTIFICATION_RECIPIENT: &str = "0303456";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config at {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Vito configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Share of the target's sales taken by a collection.
    pub collection_commission_rate: f64,

    /// Share of every collection a crew keeps.
    pub crew_commission_rate: f64,

    /// Price per square metre of a deposit.
    pub area_value_per_unit: f64,

    /// How many repayments a loan is split into.
    pub installment_count: u32,

    /// Register debt-collection tasks for each repayment when a loan is made.
    /// Off unless asked for.
    pub generate_installments: bool,

    /// Who completion notices are sent to.
    pub notification_recipient: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection_commission_rate: DEFAULT_COMMISSION_RATE,
            crew_commission_rate: CREW_COMMISSION_RATE,
            area_value_per_unit: DEFAULT_AREA_VALUE_PER_UNIT,
            installment_count: DEFAULT_INSTALLMENT_COUNT,
            generate_installments: false,
            notification_recipient: DEFAULT_NOTIFICATION_RECIPIENT.to_string(),
        }
    }
}

impl Config {
    /// Load config from the given file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate().map_err(|reason| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;

        Ok(config)
    }

    /// Load config from `~/.vito/config.toml`, falling back to defaults
    /// when there is no such file.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// The config file path: `~/.vito/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".vito").join("config.toml"))
    }

    fn validate(&self) -> Result<(), String> {
        for (name, rate) in [
            ("collection-commission-rate", self.collection_commission_rate),
            ("crew-commission-rate", self.crew_commission_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(format!("{name} must be between 0 and 1, got {rate}"));
            }
        }
        if self.area_value_per_unit < 0.0 {
            return Err(format!(
                "area-value-per-unit cannot be negative, got {}",
                self.area_value_per_unit
            ));
        }
        if self.installment_count == 0 {
            return Err("installment-count must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn write_config(contents: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn defaults_match_the_house_rules() {
        let config = Config::default();

        assert_eq!(config.collection_commission_rate, 0.1);
        assert_eq!(config.crew_commission_rate, 0.2);
        assert_eq!(config.area_value_per_unit, 100.0);
        assert_eq!(config.installment_count, 4);
        assert!(!config.generate_installments);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let (_dir, path) = write_config("");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn fields_override_defaults() {
        let (_dir, path) = write_config(
            "crew-commission-rate = 0.25\n\
             generate-installments = true\n\
             notification-recipient = \"555-0100\"\n",
        );
        let config = Config::load(&path).unwrap();

        assert_eq!(config.crew_commission_rate, 0.25);
        assert!(config.generate_installments);
        assert_eq!(config.notification_recipient, "555-0100");
        assert_eq!(config.installment_count, 4);
    }

    #[test]
    fn rejects_out_of_range_rate() {
        let (_dir, path) = write_config("collection-commission-rate = 1.5\n");
        let err = Config::load(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_zero_installments() {
        let (_dir, path) = write_config("installment-count = 0\n");
        let err = Config::load(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        let (_dir, path) = write_config("crew-commission-rate = = 0.2\n");
        let err = Config::load(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("nope.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
