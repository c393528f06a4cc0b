/*!
 * Tests for application configuration functionality
 */

use exbtsv::app_config::{Config, LanguageCodeStyle, LogLevel, TimeUnit, UnresolvedTierPolicy};
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.input.extension, "exb");
    assert!(!config.input.include_hidden);
    assert_eq!(config.input.default_time_unit, TimeUnit::Seconds);
    assert_eq!(config.output.extension, "tsv");
    assert_eq!(config.output.list_separator, ",");
    assert_eq!(config.output.missing_value, "");
    assert_eq!(config.output.language_codes, LanguageCodeStyle::AsDeclared);
    assert_eq!(config.unresolved_tiers, UnresolvedTierPolicy::Blank);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();

    config.output.list_separator = "\t".to_string();
    assert!(config.validate().is_err());
    config.output.list_separator = String::new();
    assert!(config.validate().is_err());
    config.output.list_separator = "; ".to_string();
    assert!(config.validate().is_ok());

    config.output.missing_value = "N\nA".to_string();
    assert!(config.validate().is_err());
    config.output.missing_value = "NA".to_string();
    assert!(config.validate().is_ok());

    config.input.extension = ".".to_string();
    assert!(config.validate().is_err());
    config.input.extension = "exb".to_string();

    config.output.extension = String::new();
    assert!(config.validate().is_err());
}

/// Test that a partial JSON file is completed with defaults
#[test]
fn test_config_deserialization_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "unresolved_tiers": "skip",
        "output": { "missing_value": "NA", "language_codes": "part2t" },
        "input": { "default_time_unit": "milliseconds" },
        "log_level": "debug"
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.unresolved_tiers, UnresolvedTierPolicy::Skip);
    assert_eq!(config.output.missing_value, "NA");
    assert_eq!(config.output.language_codes, LanguageCodeStyle::Part2t);
    assert_eq!(config.output.list_separator, ",");
    assert_eq!(config.output.extension, "tsv");
    assert_eq!(config.input.default_time_unit, TimeUnit::Milliseconds);
    assert_eq!(config.input.extension, "exb");
    assert_eq!(config.log_level, LogLevel::Debug);
}

/// Test loading from disk, and defaults when the file is missing
#[test]
fn test_load_or_default_withFileAndWithout_shouldLoadOrDefault() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let missing = Config::load_or_default(temp_dir.path().join("absent.json"))?;
    assert_eq!(missing.unresolved_tiers, UnresolvedTierPolicy::Blank);
    assert!(!temp_dir.path().join("absent.json").exists());

    let path = common::create_test_file(temp_dir.path(), "conf.json", r#"{"unresolved_tiers": "skip"}"#)?;
    let loaded = Config::load_or_default(&path)?;
    assert_eq!(loaded.unresolved_tiers, UnresolvedTierPolicy::Skip);

    let broken = common::create_test_file(temp_dir.path(), "broken.json", "{ not json")?;
    assert!(Config::load_or_default(&broken).is_err());
    Ok(())
}

/// Test time unit declarations
#[test]
fn test_time_unit_from_declaration_withVariants_shouldParse() {
    assert_eq!(TimeUnit::from_declaration("s"), Some(TimeUnit::Seconds));
    assert_eq!(TimeUnit::from_declaration(" Seconds "), Some(TimeUnit::Seconds));
    assert_eq!(TimeUnit::from_declaration("ms"), Some(TimeUnit::Milliseconds));
    assert_eq!(TimeUnit::from_declaration("frames"), None);
    assert_eq!(TimeUnit::Seconds.millis_factor(), 1000.0);
    assert_eq!(TimeUnit::Milliseconds.millis_factor(), 1.0);
}
