/*!
 * Tests for application configuration
 */

use std::path::PathBuf;
use anyhow::Result;
use tplmin::app_config::{Config, LogLevel};
use crate::common;

/// Test that a saved configuration loads back unchanged
#[test]
fn test_config_save_withCustomValues_shouldLoadBack() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("tplmin.json");

    let mut config = Config::default();
    config.output_dir = PathBuf::from("dist");
    config.exclude = vec!["node_modules".to_string()];
    config.concurrency = 2;
    config.css.max_line_len = 120;
    config.log_level = LogLevel::Debug;
    config.save(&path)?;

    let loaded = Config::from_file(&path)?;
    assert_eq!(loaded, config);

    Ok(())
}

/// Test that a config file with only some fields falls back to defaults
#[test]
fn test_config_from_file_withPartialJson_shouldUseDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "tplmin.json",
        r#"{"exclude": ["vendor"], "css": {"expand_vars": true}}"#,
    )?;

    let config = Config::from_file(&path)?;
    assert_eq!(config.exclude, vec!["vendor"]);
    assert_eq!(config.output_dir, PathBuf::from("./output/"));
    assert!(config.css.expand_vars);
    assert!(config.css.cute_comments);
    assert!(config.is_excluded("vendor"));
    assert!(!config.is_excluded(".git"));

    Ok(())
}

/// Test that malformed JSON is reported as an error
#[test]
fn test_config_from_file_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "tplmin.json", "{ not json")?;

    assert!(Config::from_file(&path).is_err());

    Ok(())
}

/// Test that validation rejects empty output directories and exclusions
#[test]
fn test_config_validate_withEmptyValues_shouldFail() {
    let mut config = Config::default();
    config.output_dir = PathBuf::new();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.exclude = vec![String::new()];
    assert!(config.validate().is_err());
}
