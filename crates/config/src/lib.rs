//! readlog configuration
//!
//! A TOML file with an `[app]` and a `[library]` section. Missing files fall
//! back to defaults, invalid values are reported as warnings on load and
//! refused on save, and writes go through a temporary file so the config is
//! never left half written.
//!
//! # Example
//!
//! ```rust,no_run
//! use readlog_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = match manager.load_with_env_overrides() {
//!     Ok(loaded) => {
//!         for warning in &loaded.warnings {
//!             eprintln!("warning: {}", warning);
//!         }
//!         loaded.config
//!     }
//!     Err(e) => {
//!         eprintln!("Config error: {}, using defaults", e);
//!         Config::default()
//!     }
//! };
//!
//! println!("Database: {}", config.app.database_path.display());
//! ```

mod error;
mod file;
mod manager;
mod validation;

pub mod app_config;
mod library_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{apply_env_overrides, ConfigManager, LoadedConfig};
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use library_config::LibraryConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    pub app: AppConfig,

    /// Listing defaults and import settings
    pub library: LibraryConfig,
}

impl Config {
    /// Validates the entire configuration, collecting errors from every section
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.library.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            library: LibraryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.version, CONFIG_VERSION);
    }

    #[test]
    fn test_errors_from_all_sections() {
        let mut config = Config::default();
        config.app.database_path = std::path::PathBuf::new();
        config.library.default_sort = "isbn".to_string();

        assert_eq!(config.validate().unwrap_err().len(), 2);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[library]\ndefault_order = \"desc\"\n").unwrap();
        assert_eq!(config.library.default_order, "desc");
        assert_eq!(config.library.default_sort, "title");
        assert_eq!(config.app, AppConfig::default());
    }
}
