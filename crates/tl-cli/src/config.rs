//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tl_core::{Thresholds, ValidationError};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Tasks running longer than this many minutes are flagged WARNING.
    pub warning_after_minutes: u32,

    /// Tasks running longer than this many minutes are flagged ERROR.
    pub error_after_minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            warning_after_minutes: 5,
            error_after_minutes: 10,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Environment variables (TL_*) override files
        figment = figment.merge(Env::prefixed("TL_"));

        figment.extract()
    }

    /// Validated classification thresholds.
    pub fn thresholds(&self) -> Result<Thresholds, ValidationError> {
        Thresholds::from_minutes(self.warning_after_minutes, self.error_after_minutes)
    }
}

/// Returns the platform-specific config directory for tl.
///
/// On Linux: `~/.config/tl`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tl"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::Duration;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_default_thresholds() {
        let thresholds = Config::default().thresholds().unwrap();
        assert_eq!(thresholds, Thresholds::default());
    }

    #[test]
    fn test_dirs_config_path_ends_with_tl() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "tl");
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "warning_after_minutes = 2").unwrap();
        writeln!(file, "error_after_minutes = 30").unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.warning_after_minutes, 2);
        assert_eq!(config.error_after_minutes, 30);

        let thresholds = config.thresholds().unwrap();
        assert_eq!(thresholds.warning_after, Duration::minutes(2));
        assert_eq!(thresholds.error_after, Duration::minutes(30));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = Config {
            warning_after_minutes: 20,
            error_after_minutes: 10,
        };
        assert!(config.thresholds().is_err());
    }
}
