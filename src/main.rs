// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;

use crate::app_config::Config;
use crate::app_controller::{print_status, resolve_step, Controller};

mod ai_cleaner;
mod app_config;
mod app_controller;
mod errors;
mod file_utils;
mod media_utils;
mod multicam_planner;
mod providers;
mod region_reconciler;
mod silence_detector;
mod subtitle_processor;
mod timecode_utils;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run all pipeline steps in order
    Run,

    /// Run a single pipeline step by key or name (e.g. "1_silence" or "silence")
    Step {
        /// Step to run
        name: String,
    },

    /// Show the status of every pipeline step
    Status,

    /// Reset all step statuses to pending
    Reset,

    /// Generate shell completions for autocut
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// autocut - automatic rough cutting for talking-head videos
///
/// Detects and removes silence, runs the transcript through an AI reviewer to
/// drop filler, and reassembles the kept segments with ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "autocut")]
#[command(version = "1.0.0")]
#[command(about = "ffmpeg-driven automatic video cutting pipeline")]
#[command(long_about = "autocut removes silence and AI-flagged filler from talking-head videos.

EXAMPLES:
    autocut run                               # Run the whole pipeline
    autocut step silence                      # Only detect silence
    autocut step 5_final_cut                  # Re-run the final cut
    autocut status                            # Show per-step statuses
    autocut reset                             # Mark every step pending again
    autocut --video talk.mp4 run              # Override the configured input
    autocut completions bash > autocut.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in autocut.json by default. You can specify a
    different config file with --config. If the config file doesn't exist, a
    default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "autocut.json")]
    config_path: String,

    /// Main camera video file (overrides the config)
    #[arg(long)]
    video: Option<String>,

    /// Screencast video file (overrides the config)
    #[arg(long)]
    screencast: Option<String>,

    /// Working directory for artifacts (overrides the config)
    #[arg(short, long)]
    working_dir: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default.
    // The level is updated after the config is loaded if needed.
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "autocut", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &cli.log_level {
        let config_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_level));
    }

    let mut config = load_or_create_config(&cli.config_path)?;

    // Override config with CLI options if provided
    if let Some(video) = &cli.video {
        config.main_video_path = video.clone();
    }
    if let Some(screencast) = &cli.screencast {
        config.screencast_path = screencast.clone();
    }
    if let Some(working_dir) = &cli.working_dir {
        config.working_dir = working_dir.clone();
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    // If log level was not set via command line, take it from the config
    if cli.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let mut controller = Controller::with_config(config, cli.config_path.clone().into())?;

    match cli.command {
        Commands::Run => controller.run_all().await,
        Commands::Step { name } => {
            let step = resolve_step(&name)?;
            controller.run_step(step).await
        }
        Commands::Status => {
            print_status(&controller);
            Ok(())
        }
        Commands::Reset => controller.reset(),
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}

fn load_or_create_config(config_path: &str) -> Result<Config> {
    if std::path::Path::new(config_path).exists() {
        Config::load(config_path)
            .with_context(|| format!("Failed to load config file: {}", config_path))
    } else {
        log::warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );
        let config = Config::default();
        config
            .save(config_path)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        Ok(config)
    }
}
