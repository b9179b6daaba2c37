use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings, and carries the persisted
/// per-step pipeline statuses.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Path to the main camera video
    pub main_video_path: String,

    /// Optional path to a screen recording synced to the main camera
    pub screencast_path: String,

    /// Directory all pipeline artifacts are written to
    pub working_dir: String,

    /// Timeline frame rate
    pub fps: f64,

    /// Filename of the silence-cut intermediate render
    pub cut_output_name: String,

    /// Filename of the final render
    pub final_output_name: String,

    /// Filename of the multicam render
    pub multicam_output_name: String,

    /// AI review config
    pub ai: AiConfig,

    /// Silence detection config
    pub silence: SilenceConfig,

    /// Multicam switching config
    pub multicam: MulticamConfig,

    /// Log level
    pub log_level: LogLevel,

    /// Persisted status per pipeline step, keyed by the step's stable key
    pub step_statuses: BTreeMap<String, StepStatus>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            main_video_path: String::new(),
            screencast_path: String::new(),
            working_dir: String::new(),
            fps: default_fps(),
            cut_output_name: default_cut_output_name(),
            final_output_name: default_final_output_name(),
            multicam_output_name: default_multicam_output_name(),
            ai: AiConfig::default(),
            silence: SilenceConfig::default(),
            multicam: MulticamConfig::default(),
            log_level: LogLevel::default(),
            step_statuses: BTreeMap::new(),
        }
    }
}

/// AI review service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AiConfig {
    // @field: API key
    pub api_key: String,

    // @field: Model identifier
    pub model: String,

    // @field: Service URL, empty for the public endpoint
    pub endpoint: String,

    // @field: Subtitle blocks per request
    pub chunk_size: usize,

    // @field: Timeout seconds
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_ai_model(),
            endpoint: String::new(),
            chunk_size: default_ai_chunk_size(),
            timeout_secs: default_ai_timeout_secs(),
        }
    }
}

/// Silence detection configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SilenceConfig {
    /// Loudness below this counts as silence (dB)
    pub threshold_db: i32,

    /// Measure the file and derive the threshold instead of using the fixed one
    pub auto_threshold: bool,

    /// Minimum silence length to register (ms)
    pub min_duration_ms: u64,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            threshold_db: default_silence_threshold_db(),
            auto_threshold: true,
            min_duration_ms: default_silence_min_duration_ms(),
        }
    }
}

/// Multicam switching configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct MulticamConfig {
    /// Minimum angle-switch interval (seconds)
    pub min_interval_sec: u64,

    /// Maximum angle-switch interval (seconds)
    pub max_interval_sec: u64,

    /// Derive intervals from segment durations instead of the fixed ones
    pub auto_intervals: bool,

    /// Screencast offset relative to the main camera (ms)
    pub audio_offset_ms: i64,
}

impl Default for MulticamConfig {
    fn default() -> Self {
        Self {
            min_interval_sec: default_multicam_min_interval(),
            max_interval_sec: default_multicam_max_interval(),
            auto_intervals: true,
            audio_offset_ms: 0,
        }
    }
}

/// Status of one pipeline step
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Done,
    Error,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Config {
    /// Load the configuration from a JSON file, or defaults when it is absent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !FileManager::file_exists(path) {
            return Ok(Self::default());
        }

        let content = FileManager::read_to_string(path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        FileManager::write_to_file(path, &json)
    }

    /// Validate settings that every pipeline run depends on.
    pub fn validate(&self) -> Result<()> {
        if self.working_dir.is_empty() {
            return Err(anyhow!("working_dir is not set"));
        }
        if self.fps <= 0.0 {
            return Err(anyhow!("fps must be positive, got {}", self.fps));
        }
        if self.ai.chunk_size == 0 {
            return Err(anyhow!("ai.chunk_size must be at least 1"));
        }
        if self.multicam.min_interval_sec > self.multicam.max_interval_sec {
            return Err(anyhow!(
                "multicam.min_interval_sec ({}) exceeds max_interval_sec ({})",
                self.multicam.min_interval_sec,
                self.multicam.max_interval_sec
            ));
        }
        Ok(())
    }

    /// Full path of a file inside the working directory.
    pub fn working_path(&self, filename: &str) -> PathBuf {
        Path::new(&self.working_dir).join(filename)
    }

    /// Status of a step; unknown steps read as pending.
    pub fn step_status(&self, step_key: &str) -> StepStatus {
        self.step_statuses
            .get(step_key)
            .copied()
            .unwrap_or(StepStatus::Pending)
    }

    /// Update the status of one step.
    pub fn set_step_status(&mut self, step_key: &str, status: StepStatus) {
        self.step_statuses.insert(step_key.to_string(), status);
    }

    /// Reset all step statuses to pending.
    pub fn reset_steps(&mut self) {
        self.step_statuses.clear();
    }
}

// Default value functions for serde

fn default_fps() -> f64 {
    25.0
}

fn default_cut_output_name() -> String {
    "cut.mp4".to_string()
}

fn default_final_output_name() -> String {
    "final.mp4".to_string()
}

fn default_multicam_output_name() -> String {
    "multicam.mp4".to_string()
}

fn default_ai_model() -> String {
    "google/gemini-2.0-flash-001".to_string()
}

fn default_ai_chunk_size() -> usize {
    50
}

fn default_ai_timeout_secs() -> u64 {
    120
}

fn default_silence_threshold_db() -> i32 {
    -40
}

fn default_silence_min_duration_ms() -> u64 {
    500
}

fn default_multicam_min_interval() -> u64 {
    5
}

fn default_multicam_max_interval() -> u64 {
    15
}
