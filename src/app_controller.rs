use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use std::path::PathBuf;

use crate::ai_cleaner::{self, ORIGINAL_SRT_FILE};
use crate::app_config::{Config, StepStatus};
use crate::file_utils::FileManager;
use crate::media_utils;
use crate::multicam_planner;
use crate::region_reconciler::{self, KeepSegmentsReport, KEEP_SEGMENTS_FILE};
use crate::silence_detector;
use crate::timecode_utils::{frames_to_edit_timecode, ms_to_frames};

// @module: Pipeline step sequencer

/// The fixed, ordered set of pipeline steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    /// Detect silence in the main camera audio
    Silence,
    /// Cut the detected silence and render the intermediate video
    SilenceCut,
    /// Produce a transcript of the silence-cut video
    Subtitles,
    /// AI review of the transcript
    AiClean,
    /// Fold AI deletions into the cut and render the final video
    FinalCut,
    /// Optional multicam render over the final segments
    Multicam,
}

impl PipelineStep {
    /// Steps in execution order.
    pub const ALL: [PipelineStep; 6] = [
        PipelineStep::Silence,
        PipelineStep::SilenceCut,
        PipelineStep::Subtitles,
        PipelineStep::AiClean,
        PipelineStep::FinalCut,
        PipelineStep::Multicam,
    ];

    /// Stable key used in the persisted status map.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Silence => "1_silence",
            Self::SilenceCut => "2_silence_cut",
            Self::Subtitles => "3_subtitles",
            Self::AiClean => "4_ai_clean",
            Self::FinalCut => "5_final_cut",
            Self::Multicam => "6_multicam",
        }
    }

    /// Human-readable step title for logs and the status table.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Silence => "Silence detection",
            Self::SilenceCut => "Silence cut",
            Self::Subtitles => "Transcript",
            Self::AiClean => "AI cleanup",
            Self::FinalCut => "Final cut",
            Self::Multicam => "Multicam",
        }
    }

    /// Look a step up by its key, or by the bare name without the number.
    pub fn from_key(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|step| {
                step.key() == s || step.key().split_once('_').map(|(_, n)| n) == Some(s.as_str())
            })
    }
}

/// Main application controller driving the pipeline steps.
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Where status changes are persisted
    config_path: PathBuf,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config, config_path: PathBuf) -> Result<Self> {
        Ok(Self { config, config_path })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current status of every step, in execution order.
    pub fn statuses(&self) -> Vec<(PipelineStep, StepStatus)> {
        PipelineStep::ALL
            .into_iter()
            .map(|step| (step, self.config.step_status(step.key())))
            .collect()
    }

    /// Reset all step statuses to pending and persist.
    pub fn reset(&mut self) -> Result<()> {
        self.config.reset_steps();
        self.config.save(&self.config_path)?;
        info!("All step statuses reset to pending");
        Ok(())
    }

    /// Run every step in order, halting on the first error.
    pub async fn run_all(&mut self) -> Result<()> {
        for step in PipelineStep::ALL {
            self.run_step(step).await?;
        }
        info!("Pipeline finished");
        Ok(())
    }

    /// Run one step, tracking its persisted status.
    pub async fn run_step(&mut self, step: PipelineStep) -> Result<()> {
        self.config
            .validate()
            .context("Configuration validation failed")?;

        info!("=== {} ({}) ===", step.title(), step.key());
        self.persist_status(step, StepStatus::Running)?;

        match self.execute(step).await {
            Ok(()) => {
                self.persist_status(step, StepStatus::Done)?;
                info!("{} done", step.title());
                Ok(())
            }
            Err(e) => {
                self.persist_status(step, StepStatus::Error)?;
                error!("{} failed: {:#}", step.title(), e);
                Err(e)
            }
        }
    }

    fn persist_status(&mut self, step: PipelineStep, status: StepStatus) -> Result<()> {
        self.config.set_step_status(step.key(), status);
        self.config.save(&self.config_path)
    }

    fn working_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.working_dir)
    }

    fn main_video(&self) -> Result<PathBuf> {
        let path = PathBuf::from(&self.config.main_video_path);
        if !FileManager::file_exists(&path) {
            return Err(anyhow!("Main video not found: {}", path.display()));
        }
        Ok(path)
    }

    async fn execute(&mut self, step: PipelineStep) -> Result<()> {
        match step {
            PipelineStep::Silence => self.step_silence().await,
            PipelineStep::SilenceCut => self.step_silence_cut().await,
            PipelineStep::Subtitles => self.step_subtitles().await,
            PipelineStep::AiClean => self.step_ai_clean().await,
            PipelineStep::FinalCut => self.step_final_cut().await,
            PipelineStep::Multicam => self.step_multicam().await,
        }
    }

    async fn step_silence(&mut self) -> Result<()> {
        let video = self.main_video()?;
        FileManager::ensure_dir(self.working_dir())?;

        let threshold_db = if self.config.silence.auto_threshold {
            silence_detector::auto_detect_threshold(&video).await?
        } else {
            self.config.silence.threshold_db
        };

        silence_detector::detect_silence(
            &video,
            threshold_db,
            self.config.silence.min_duration_ms,
            &self.working_dir(),
        )
        .await?;
        Ok(())
    }

    async fn step_silence_cut(&mut self) -> Result<()> {
        let video = self.main_video()?;

        let detected_fps = media_utils::probe_fps(&video).await?;
        if (detected_fps - self.config.fps).abs() > 0.01 {
            warn!(
                "Configured fps {} differs from source fps {:.3}",
                self.config.fps, detected_fps
            );
        }

        let segments = region_reconciler::compute_silence_keep_segments(&self.working_dir())?;
        let output = self.config.working_path(&self.config.cut_output_name);
        media_utils::render_segments(&video, &segments, &output).await?;
        info!("Silence-cut video rendered to: {}", output.display());
        Ok(())
    }

    async fn step_subtitles(&mut self) -> Result<()> {
        let srt_path = self.config.working_path(ORIGINAL_SRT_FILE);
        if FileManager::file_exists(&srt_path) {
            info!("Using existing transcript: {}", srt_path.display());
            return Ok(());
        }

        let cut_video = self.config.working_path(&self.config.cut_output_name);
        if !FileManager::file_exists(&cut_video) {
            return Err(anyhow!(
                "Neither {} nor {} exists - run the silence cut first or provide a transcript",
                srt_path.display(),
                cut_video.display()
            ));
        }

        info!("Extracting embedded subtitle track from {}", cut_video.display());
        if media_utils::extract_subtitle_track(&cut_video, &srt_path).await? {
            info!("Transcript extracted to: {}", srt_path.display());
            Ok(())
        } else {
            Err(anyhow!(
                "No embedded subtitle track found - transcribe {} externally and place the \
                 result at {}",
                cut_video.display(),
                srt_path.display()
            ))
        }
    }

    async fn step_ai_clean(&mut self) -> Result<()> {
        if self.config.ai.api_key.is_empty() {
            return Err(anyhow!("AI API key is not configured (ai.api_key)"));
        }
        ai_cleaner::run_cleanup(&self.working_dir(), &self.config.ai).await?;
        Ok(())
    }

    async fn step_final_cut(&mut self) -> Result<()> {
        let video = self.main_video()?;

        let segments = region_reconciler::compute_final_keep_segments(&self.working_dir())?;

        let kept_ms: u64 = segments.iter().map(|r| r.duration_ms()).sum();
        let frames = ms_to_frames(kept_ms, self.config.fps);
        info!(
            "Final cut length: {} ({} frames at {} fps)",
            frames_to_edit_timecode(frames, self.config.fps),
            frames,
            self.config.fps
        );

        let output = self.config.working_path(&self.config.final_output_name);
        media_utils::render_segments(&video, &segments, &output).await?;
        info!("Final video rendered to: {}", output.display());
        Ok(())
    }

    async fn step_multicam(&mut self) -> Result<()> {
        if self.config.screencast_path.is_empty() {
            info!("No screencast configured - skipping multicam");
            return Ok(());
        }

        let main_video = self.main_video()?;
        let screencast = PathBuf::from(&self.config.screencast_path);
        if !FileManager::file_exists(&screencast) {
            return Err(anyhow!("Screencast not found: {}", screencast.display()));
        }

        let report = KeepSegmentsReport::load(&self.working_dir(), KEEP_SEGMENTS_FILE)
            .context("Final cut has not produced keep segments yet")?;

        let (min_iv, max_iv) = if self.config.multicam.auto_intervals {
            multicam_planner::auto_switch_intervals(&report.segments)
        } else {
            (
                self.config.multicam.min_interval_sec,
                self.config.multicam.max_interval_sec,
            )
        };

        let mut rng = rand::rng();
        let cuts = multicam_planner::plan_angle_cuts(&report.segments, min_iv, max_iv, &mut rng);

        let output = self.config.working_path(&self.config.multicam_output_name);
        media_utils::render_multicam(
            &main_video,
            &screencast,
            &cuts,
            self.config.multicam.audio_offset_ms,
            &output,
        )
        .await?;
        info!("Multicam video rendered to: {}", output.display());
        Ok(())
    }
}

/// Print the status table for the CLI `status` command.
pub fn print_status(controller: &Controller) {
    println!("{:<16} {:<20} status", "key", "step");
    for (step, status) in controller.statuses() {
        println!("{:<16} {:<20} {}", step.key(), step.title(), status);
    }
}

/// Resolve a user-supplied step name, listing valid keys on failure.
pub fn resolve_step(name: &str) -> Result<PipelineStep> {
    PipelineStep::from_key(name).ok_or_else(|| {
        let keys: Vec<&str> = PipelineStep::ALL.iter().map(|s| s.key()).collect();
        anyhow!("Unknown step '{}'. Valid steps: {}", name, keys.join(", "))
    })
}

