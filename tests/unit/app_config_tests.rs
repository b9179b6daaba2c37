/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use autocut::app_config::{Config, LogLevel, StepStatus};
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.fps, 25.0);
    assert_eq!(config.final_output_name, "final.mp4");
    assert_eq!(config.cut_output_name, "cut.mp4");

    assert_eq!(config.ai.model, "google/gemini-2.0-flash-001");
    assert_eq!(config.ai.chunk_size, 50);
    assert_eq!(config.ai.timeout_secs, 120);

    assert_eq!(config.silence.threshold_db, -40);
    assert!(config.silence.auto_threshold);
    assert_eq!(config.silence.min_duration_ms, 500);

    assert_eq!(config.multicam.min_interval_sec, 5);
    assert_eq!(config.multicam.max_interval_sec, 15);

    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.step_statuses.is_empty());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    config.working_dir = "/tmp/autocut".to_string();
    assert!(config.validate().is_ok());

    // Missing working directory
    config.working_dir = String::new();
    assert!(config.validate().is_err());
    config.working_dir = "/tmp/autocut".to_string();

    // Invalid fps
    config.fps = 0.0;
    assert!(config.validate().is_err());
    config.fps = 25.0;

    // Invalid chunk size
    config.ai.chunk_size = 0;
    assert!(config.validate().is_err());
    config.ai.chunk_size = 50;

    // Inverted multicam intervals
    config.multicam.min_interval_sec = 20;
    config.multicam.max_interval_sec = 10;
    assert!(config.validate().is_err());
}

/// Test save/load round trip
#[test]
fn test_config_save_and_load_withTempFile_shouldRoundTrip() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("autocut.json");

    let mut config = Config::default();
    config.main_video_path = "talk.mp4".to_string();
    config.working_dir = "/tmp/autocut".to_string();
    config.ai.api_key = "sk-test".to_string();
    config.set_step_status("1_silence", StepStatus::Done);

    config.save(&path)?;
    let loaded = Config::load(&path)?;

    assert_eq!(loaded.main_video_path, "talk.mp4");
    assert_eq!(loaded.working_dir, "/tmp/autocut");
    assert_eq!(loaded.ai.api_key, "sk-test");
    assert_eq!(loaded.step_status("1_silence"), StepStatus::Done);

    Ok(())
}

/// Test loading a missing file falls back to defaults
#[test]
fn test_config_load_withMissingFile_shouldUseDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = Config::load(dir.path().join("nope.json"))?;

    assert_eq!(config.fps, 25.0);
    Ok(())
}

/// Test partial config files fill missing keys with defaults
#[test]
fn test_config_load_withPartialJson_shouldFillDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "partial.json",
        r#"{ "main_video_path": "talk.mp4", "silence": { "threshold_db": -35 } }"#,
    )?;

    let config = Config::load(&path)?;
    assert_eq!(config.main_video_path, "talk.mp4");
    assert_eq!(config.silence.threshold_db, -35);
    // Untouched keys keep their defaults
    assert_eq!(config.silence.min_duration_ms, 500);
    assert_eq!(config.ai.chunk_size, 50);

    Ok(())
}

/// Test step status mutation and the pending default
#[test]
fn test_step_status_withUpdatesAndReset_shouldTrackAndClear() {
    let mut config = Config::default();

    assert_eq!(config.step_status("1_silence"), StepStatus::Pending);

    config.set_step_status("1_silence", StepStatus::Running);
    assert_eq!(config.step_status("1_silence"), StepStatus::Running);

    config.set_step_status("1_silence", StepStatus::Error);
    config.set_step_status("2_silence_cut", StepStatus::Done);
    assert_eq!(config.step_status("1_silence"), StepStatus::Error);
    assert_eq!(config.step_status("2_silence_cut"), StepStatus::Done);

    config.reset_steps();
    assert_eq!(config.step_status("1_silence"), StepStatus::Pending);
    assert_eq!(config.step_status("2_silence_cut"), StepStatus::Pending);
}

/// Test step statuses serialize as lowercase strings
#[test]
fn test_step_status_serialization_withDoneStatus_shouldBeLowercase() {
    let mut config = Config::default();
    config.set_step_status("1_silence", StepStatus::Done);

    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["step_statuses"]["1_silence"], "done");
}
