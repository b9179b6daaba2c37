/*!
 * # autocut - automatic rough cutting for talking-head videos
 *
 * A Rust library and CLI that turns a raw recording into a rough cut by
 * removing silence and AI-flagged filler, driving ffmpeg for all media work.
 *
 * ## Features
 *
 * - Silence detection with auto-derived loudness threshold
 * - Segment-based cutting and reassembly via ffmpeg
 * - SRT transcript parsing with an AI deletion-marker round trip
 * - Two-pass region reconciliation that remaps AI timecodes from the cut
 *   timeline back to source time
 * - Optional multicam switching between the main camera and a screencast
 * - Persisted per-step pipeline statuses, resumable step by step
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management and step statuses
 * - `timecode_utils`: Millisecond / timecode / frame conversions
 * - `subtitle_processor`: SRT codec and subtitle block handling
 * - `region_reconciler`: Deletion-region merging, inversion and remapping
 * - `silence_detector`: ffmpeg-based silence analysis
 * - `media_utils`: ffprobe/ffmpeg probing, cutting and concatenation
 * - `multicam_planner`: Angle-switch planning over keep segments
 * - `ai_cleaner`: Chunked AI transcript review
 * - `providers`: Chat-completion API clients
 * - `app_controller`: Pipeline step sequencer
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod ai_cleaner;
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod media_utils;
pub mod multicam_planner;
pub mod providers;
pub mod region_reconciler;
pub mod silence_detector;
pub mod subtitle_processor;
pub mod timecode_utils;

// Re-export main types for easier usage
pub use app_config::{Config, StepStatus};
pub use app_controller::{Controller, PipelineStep};
pub use region_reconciler::{KeepSegmentsReport, Region, SilenceReport};
pub use subtitle_processor::SubtitleBlock;
pub use errors::{AppError, FormatError, ProviderError};
