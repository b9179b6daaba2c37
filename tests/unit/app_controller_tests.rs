/*!
 * Tests for the pipeline step sequencer
 */

use anyhow::Result;
use autocut::app_config::{Config, StepStatus};
use autocut::app_controller::{Controller, PipelineStep};
use crate::common;

fn test_config(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.working_dir = dir.to_string_lossy().to_string();
    config.main_video_path = dir.join("talk.mp4").to_string_lossy().to_string();
    config
}

/// Test the fixed step order and keys
#[test]
fn test_pipeline_steps_withAllConstant_shouldKeepOrderAndKeys() {
    let keys: Vec<&str> = PipelineStep::ALL.iter().map(|s| s.key()).collect();
    assert_eq!(
        keys,
        vec![
            "1_silence",
            "2_silence_cut",
            "3_subtitles",
            "4_ai_clean",
            "5_final_cut",
            "6_multicam"
        ]
    );
}

/// Test step lookup by key and by bare name
#[test]
fn test_step_lookup_withKeyAndBareName_shouldResolve() {
    assert_eq!(PipelineStep::from_key("1_silence"), Some(PipelineStep::Silence));
    assert_eq!(PipelineStep::from_key("silence"), Some(PipelineStep::Silence));
    assert_eq!(PipelineStep::from_key("5_final_cut"), Some(PipelineStep::FinalCut));
    assert_eq!(PipelineStep::from_key("FINAL_CUT"), None);
    assert_eq!(PipelineStep::from_key("nope"), None);
}

/// Test fresh controllers report every step pending
#[test]
fn test_statuses_withFreshConfig_shouldAllBePending() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = test_config(dir.path());
    let controller = Controller::with_config(config, dir.path().join("autocut.json"))?;

    let statuses = controller.statuses();
    assert_eq!(statuses.len(), PipelineStep::ALL.len());
    for (_, status) in statuses {
        assert_eq!(status, StepStatus::Pending);
    }

    Ok(())
}

/// Test a failing step is marked error and persisted
#[tokio::test]
async fn test_run_step_withMissingInput_shouldMarkErrorAndPersist() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config_path = dir.path().join("autocut.json");
    let config = test_config(dir.path());
    let mut controller = Controller::with_config(config, config_path.clone())?;

    // The silence cut needs the silence report, which does not exist yet
    let result = controller.run_step(PipelineStep::SilenceCut).await;
    assert!(result.is_err());

    let persisted = Config::load(&config_path)?;
    assert_eq!(persisted.step_status("2_silence_cut"), StepStatus::Error);

    Ok(())
}

/// Test run-all halts at the first failing step
#[tokio::test]
async fn test_run_all_withFailingFirstStep_shouldHaltPipeline() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config_path = dir.path().join("autocut.json");
    // Main video path points nowhere, so step 1 fails immediately
    let config = test_config(dir.path());
    let mut controller = Controller::with_config(config, config_path.clone())?;

    assert!(controller.run_all().await.is_err());

    let persisted = Config::load(&config_path)?;
    assert_eq!(persisted.step_status("1_silence"), StepStatus::Error);
    // Later steps were never reached
    assert_eq!(persisted.step_status("2_silence_cut"), StepStatus::Pending);

    Ok(())
}

/// Test the multicam step completes as a no-op without a screencast
#[tokio::test]
async fn test_run_step_withoutScreencast_shouldCompleteMulticamAsNoOp() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config_path = dir.path().join("autocut.json");
    let config = test_config(dir.path());
    let mut controller = Controller::with_config(config, config_path.clone())?;

    controller.run_step(PipelineStep::Multicam).await?;

    let persisted = Config::load(&config_path)?;
    assert_eq!(persisted.step_status("6_multicam"), StepStatus::Done);

    Ok(())
}

/// Test reset clears persisted statuses
#[tokio::test]
async fn test_reset_withRecordedStatuses_shouldRestorePending() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config_path = dir.path().join("autocut.json");
    let config = test_config(dir.path());
    let mut controller = Controller::with_config(config, config_path.clone())?;

    let _ = controller.run_step(PipelineStep::SilenceCut).await;
    controller.reset()?;

    let persisted = Config::load(&config_path)?;
    assert_eq!(persisted.step_status("2_silence_cut"), StepStatus::Pending);

    Ok(())
}

/// Test running with an invalid configuration fails before executing
#[tokio::test]
async fn test_run_step_withInvalidConfig_shouldFailValidation() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = Config::default(); // no working_dir
    let mut controller = Controller::with_config(config, dir.path().join("autocut.json"))?;

    assert!(controller.run_step(PipelineStep::Silence).await.is_err());
    Ok(())
}
