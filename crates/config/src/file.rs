//! The config file on disk

use crate::error::{ConfigError, ConfigResult};
use crate::Config;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const BACKUP_EXTENSION: &str = "toml.backup";

/// `config.toml` at a fixed path
#[derive(Debug, Clone)]
pub(crate) struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the previous contents, refreshed on every save
    pub(crate) fn backup_path(&self) -> PathBuf {
        self.path.with_extension(BACKUP_EXTENSION)
    }

    /// Parses the file; `None` when there is no file yet
    pub(crate) fn read(&self) -> ConfigResult<Option<Config>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if text.trim().is_empty() {
            return Err(ConfigError::Empty {
                path: self.path.clone(),
            });
        }

        toml::from_str(&text)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Replaces the file with `config`, keeping the old one as a backup
    ///
    /// The new contents go to a temporary file in the same directory and are
    /// renamed into place, so readers see either the old or the new file.
    pub(crate) fn write(&self, config: &Config) -> ConfigResult<()> {
        config.validate().map_err(ConfigError::Invalid)?;
        let text = toml::to_string_pretty(config)?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| self.write_error(dir, e))?;

        if self.path.exists() {
            let backup = self.backup_path();
            fs::copy(&self.path, &backup).map_err(|e| self.write_error(&backup, e))?;
        }

        let mut staged = NamedTempFile::new_in(dir).map_err(|e| self.write_error(dir, e))?;
        let staged_path = staged.path().to_path_buf();
        staged
            .write_all(text.as_bytes())
            .and_then(|_| staged.flush())
            .map_err(|e| self.write_error(&staged_path, e))?;
        staged
            .persist(&self.path)
            .map_err(|e| self.write_error(&self.path, e.error))?;

        log::info!("Config saved to {}", self.path.display());
        Ok(())
    }

    fn write_error(&self, path: &Path, source: io::Error) -> ConfigError {
        ConfigError::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}
