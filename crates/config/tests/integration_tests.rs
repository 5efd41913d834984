//! Integration tests for the configuration system

use readlog_config::{
    apply_env_overrides, AppConfig, Config, ConfigManager, ConfigSection, LibraryConfig, LogLevel,
    CONFIG_VERSION,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn setup_test_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    Ok((temp_dir, manager))
}

#[test]
fn test_full_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    assert!(manager.initialize()?);

    let config = manager.load()?;
    assert_eq!(config.version, CONFIG_VERSION);

    let mut modified = config.clone();
    modified.app.database_path = PathBuf::from("books/log.db");
    modified.library.default_sort = "finished_at".to_string();
    modified.library.default_order = "desc".to_string();
    manager.save(&modified)?;

    let reloaded = manager.load()?;
    assert_eq!(reloaded, modified);

    assert!(!manager.initialize()?);
    assert_eq!(manager.load()?, modified);

    Ok(())
}

#[test]
fn test_invalid_config_is_not_saved() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    manager.save(&Config::default())?;

    let mut invalid = Config::default();
    invalid.library.series_sort = "isbn".to_string();
    assert!(manager.save(&invalid).is_err());
    assert_eq!(manager.load()?, Config::default());

    Ok(())
}

#[test]
fn test_written_file_layout() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    manager.save(&Config::default())?;

    let contents = std::fs::read_to_string(manager.config_path())?;
    assert!(contents.contains("[app]"));
    assert!(contents.contains("database_path = \"readlog.db\""));
    assert!(contents.contains("log_level = \"info\""));
    assert!(contents.contains("[library]"));
    assert!(contents.contains("import_delimiter = \",\""));

    Ok(())
}

#[test]
fn test_backup_created_on_overwrite() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    let mut first = Config::default();
    first.app.log_level = LogLevel::Warn;
    manager.save(&first)?;
    manager.save(&Config::default())?;

    let backup_path = manager.config_path().with_extension("toml.backup");
    let backup: Config = toml::from_str(&std::fs::read_to_string(backup_path)?)?;
    assert_eq!(backup.app.log_level, LogLevel::Warn);

    Ok(())
}

#[test]
fn test_all_sections_default_are_valid() {
    assert!(AppConfig::default().validate().is_ok());
    assert!(LibraryConfig::default().validate().is_ok());
}

#[test]
fn test_env_overrides_on_top_of_file() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    let mut saved = Config::default();
    saved.app.database_path = PathBuf::from("from-file.db");
    saved.library.import_delimiter = ";".to_string();
    manager.save(&saved)?;

    let mut config = manager.load()?;
    let ignored = apply_env_overrides(&mut config, |name| match name {
        "DB_PATH" => Some("from-env.db".to_string()),
        "READLOG_APP_LOG_LEVEL" => Some("loud".to_string()),
        _ => None,
    });

    assert_eq!(ignored.len(), 1);
    assert_eq!(config.app.log_level, LogLevel::Info);
    assert_eq!(config.app.database_path, PathBuf::from("from-env.db"));
    assert_eq!(config.library.import_delimiter, ";");

    Ok(())
}

#[test]
fn test_multiple_validation_errors_collected() {
    let mut config = Config::default();
    config.app.database_path = PathBuf::new();
    config.library.default_order = "random".to_string();
    config.library.import_delimiter = String::new();

    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 3);
}
