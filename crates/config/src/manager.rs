//! Locating, loading and saving the config file

use crate::error::{join_messages, ConfigError, ConfigResult};
use crate::file::ConfigFile;
use crate::{Config, LogLevel, CONFIG_VERSION};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.toml";

/// A loaded config plus everything worth warning about
///
/// Loading usually happens before logging is set up, so warnings are
/// handed back for the caller to emit once it can.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: Config,
    pub warnings: Vec<String>,
}

pub struct ConfigManager {
    file: ConfigFile,
}

impl ConfigManager {
    /// Uses `config.toml` in the platform config directory
    ///
    /// - Linux: `~/.config/readlog/`
    /// - macOS: `~/Library/Application Support/readlog/`
    /// - Windows: `%APPDATA%\readlog\`
    pub fn new() -> ConfigResult<Self> {
        let dirs = ProjectDirs::from("", "", "readlog")
            .ok_or(ConfigError::NoPath("no home directory for the current user"))?;
        Self::with_directory(dirs.config_dir().to_path_buf())
    }

    /// Uses `config.toml` inside `config_dir`
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        Self::with_file(config_dir.join(CONFIG_FILE_NAME))
    }

    /// Uses an explicit file, e.g. from `--config`
    pub fn with_file(config_path: PathBuf) -> ConfigResult<Self> {
        if config_path.as_os_str().is_empty() {
            return Err(ConfigError::NoPath("the given path is empty"));
        }
        Ok(Self {
            file: ConfigFile::new(config_path),
        })
    }

    pub fn config_path(&self) -> &Path {
        self.file.path()
    }

    /// Reads the file, falling back to defaults when it does not exist
    ///
    /// Settings that fail validation are kept and logged so the file can be
    /// fixed by hand.
    pub fn load(&self) -> ConfigResult<Config> {
        let loaded = self.read_with_warnings()?;
        for warning in &loaded.warnings {
            log::warn!("{}", warning);
        }
        Ok(loaded.config)
    }

    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.file.write(config)
    }

    /// Writes a default file unless one exists; true if it wrote one
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.file.path().exists() {
            log::info!("Config already exists at {}", self.file.path().display());
            return Ok(false);
        }
        self.save(&Config::default())?;
        Ok(true)
    }

    /// Reads the file and applies environment overrides without logging
    pub fn load_with_env_overrides(&self) -> ConfigResult<LoadedConfig> {
        let mut loaded = self.read_with_warnings()?;
        let mut env_warnings = apply_env_overrides(&mut loaded.config, |name| std::env::var(name).ok());

        loaded.warnings.append(&mut env_warnings);
        if let Err(errors) = loaded.config.validate() {
            loaded.warnings.push(format!(
                "Invalid settings after environment overrides: {}",
                join_messages(&errors)
            ));
        }
        Ok(loaded)
    }

    fn read_with_warnings(&self) -> ConfigResult<LoadedConfig> {
        let mut warnings = Vec::new();
        let config = match self.file.read()? {
            Some(config) => config,
            None => return Ok(LoadedConfig {
                config: Config::default(),
                warnings,
            }),
        };

        if config.version > CONFIG_VERSION {
            warnings.push(format!(
                "Config version {} is newer than {}; unknown settings are ignored",
                config.version, CONFIG_VERSION
            ));
        }
        if let Err(errors) = config.validate() {
            warnings.push(format!(
                "Invalid settings in {}: {}",
                self.file.path().display(),
                join_messages(&errors)
            ));
        }
        Ok(LoadedConfig { config, warnings })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Applies overrides read through `lookup` and returns what was ignored
///
/// `DB_PATH` and `DEBUG` are honoured first, then the `READLOG_SECTION_FIELD`
/// variables, so the latter win when both are set.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut ignored = Vec::new();

    if let Some(path) = lookup("DB_PATH").filter(|p| !p.trim().is_empty()) {
        config.app.database_path = PathBuf::from(path);
    }

    if let Some(debug) = lookup("DEBUG") {
        config.app.debug_mode = debug.trim() == "true";
    }

    if let Some(path) = lookup("READLOG_APP_DATABASE_PATH").filter(|p| !p.trim().is_empty()) {
        config.app.database_path = PathBuf::from(path);
    }

    if let Some(level) = lookup("READLOG_APP_LOG_LEVEL") {
        match level.parse::<LogLevel>() {
            Ok(level) => config.app.log_level = level,
            Err(e) => ignored.push(format!("Ignoring READLOG_APP_LOG_LEVEL: {}", e)),
        }
    }

    if let Some(debug) = lookup("READLOG_APP_DEBUG_MODE") {
        match parse_flag(&debug) {
            Some(enabled) => config.app.debug_mode = enabled,
            None => ignored.push(format!("Ignoring READLOG_APP_DEBUG_MODE value '{}'", debug)),
        }
    }

    if let Some(delimiter) = lookup("READLOG_LIBRARY_IMPORT_DELIMITER") {
        config.library.import_delimiter = delimiter;
    }

    ignored
}
