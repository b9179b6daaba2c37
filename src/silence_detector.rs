/*!
 * Silence detection over a video's audio track.
 *
 * Detection only - nothing is cut here. The resulting report is merged with
 * the AI review later in the pipeline. The heavy lifting is ffmpeg's
 * volumedetect and silencedetect filters; this module extracts the audio,
 * drives the filters and scrapes their stderr output.
 */

use std::path::Path;
use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::file_utils::FileManager;
use crate::media_utils::{probe_duration_ms, run_media_tool};
use crate::region_reconciler::{Region, SilenceReport};

/// Threshold used when the mean volume cannot be measured, in dB.
pub const FALLBACK_THRESHOLD_DB: i32 = -40;

/// Analysis passes decode the full audio track; allow them time.
const ANALYSIS_TIMEOUT_SECS: u64 = 600;

// @const: volumedetect mean volume line
static MEAN_VOLUME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"mean_volume:\s*([-\d.]+)\s*dB").unwrap());

// @const: silencedetect interval boundary lines
static SILENCE_START_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"silence_start:\s*([\d.]+)").unwrap());
static SILENCE_END_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"silence_end:\s*([\d.]+)").unwrap());

/// Pull the mean volume in dB out of volumedetect stderr output.
pub fn parse_mean_volume(output: &str) -> Option<f64> {
    MEAN_VOLUME_REGEX
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Derive a silence threshold from a measured mean volume.
pub fn threshold_from_mean_volume(mean_volume_db: f64) -> i32 {
    mean_volume_db.round() as i32 + 3
}

/// Pair silencedetect start/end lines into regions.
///
/// A silence still open at end of stream gets closed at the total duration.
pub fn parse_silence_intervals(output: &str, total_duration_ms: u64) -> Vec<Region> {
    let mut regions = Vec::new();
    let mut open_start: Option<u64> = None;

    for line in output.lines() {
        if let Some(caps) = SILENCE_START_REGEX.captures(line) {
            if let Ok(secs) = caps[1].parse::<f64>() {
                open_start = Some((secs * 1000.0).round() as u64);
            }
        } else if let Some(caps) = SILENCE_END_REGEX.captures(line) {
            if let (Some(start), Ok(secs)) = (open_start.take(), caps[1].parse::<f64>()) {
                let end = (secs * 1000.0).round() as u64;
                if end > start {
                    regions.push(Region(start, end));
                }
            }
        }
    }

    if let Some(start) = open_start {
        if total_duration_ms > start {
            regions.push(Region(start, total_duration_ms));
        }
    }

    regions
}

/// Measure the file's mean volume and derive a silence threshold from it.
///
/// Falls back to [`FALLBACK_THRESHOLD_DB`] when the file is missing or the
/// measurement fails - auto-detection is best effort, never fatal.
pub async fn auto_detect_threshold(video: &Path) -> Result<i32> {
    info!("Auto-detecting silence threshold...");

    if !FileManager::file_exists(video) {
        warn!(
            "File not found: {} - using {} dB",
            video.display(),
            FALLBACK_THRESHOLD_DB
        );
        return Ok(FALLBACK_THRESHOLD_DB);
    }

    let args = vec![
        "-i".to_string(),
        video.to_string_lossy().to_string(),
        "-af".to_string(),
        "volumedetect".to_string(),
        "-f".to_string(),
        "null".to_string(),
        "-".to_string(),
    ];

    let output = run_media_tool("ffmpeg", &args, ANALYSIS_TIMEOUT_SECS).await?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    match parse_mean_volume(&stderr) {
        Some(mean) => {
            let threshold = threshold_from_mean_volume(mean);
            info!("Mean volume: {:.1} dB -> threshold: {} dB", mean, threshold);
            Ok(threshold)
        }
        None => {
            warn!(
                "Could not measure volume - using {} dB",
                FALLBACK_THRESHOLD_DB
            );
            Ok(FALLBACK_THRESHOLD_DB)
        }
    }
}

/// Detect silence intervals in a video's audio track.
///
/// The audio is extracted to a mono 16 kHz scratch WAV, then run through
/// silencedetect. The resulting report is persisted to the working directory
/// as `silence_regions.json` and returned.
pub async fn detect_silence(
    video: &Path,
    threshold_db: i32,
    min_duration_ms: u64,
    working_dir: &Path,
) -> Result<SilenceReport> {
    info!("Detecting silence in: {}", video.display());
    info!(
        "  Threshold: {} dB, min duration: {} ms",
        threshold_db, min_duration_ms
    );

    let total_duration_ms = probe_duration_ms(video).await?;

    let wav = tempfile::Builder::new()
        .prefix("autocut_audio_")
        .suffix(".wav")
        .tempfile()
        .context("Failed to create scratch WAV file")?;

    info!("Extracting audio track...");
    let extract_args = vec![
        "-y".to_string(),
        "-i".to_string(),
        video.to_string_lossy().to_string(),
        "-vn".to_string(),
        "-acodec".to_string(),
        "pcm_s16le".to_string(),
        "-ar".to_string(),
        "16000".to_string(),
        "-ac".to_string(),
        "1".to_string(),
        wav.path().to_string_lossy().to_string(),
    ];
    run_media_tool("ffmpeg", &extract_args, ANALYSIS_TIMEOUT_SECS).await?;

    info!("Analyzing audio for silence...");
    let detect_args = vec![
        "-i".to_string(),
        wav.path().to_string_lossy().to_string(),
        "-af".to_string(),
        format!(
            "silencedetect=noise={}dB:d={:.3}",
            threshold_db,
            min_duration_ms as f64 / 1000.0
        ),
        "-f".to_string(),
        "null".to_string(),
        "-".to_string(),
    ];
    let output = run_media_tool("ffmpeg", &detect_args, ANALYSIS_TIMEOUT_SECS).await?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    let regions = parse_silence_intervals(&stderr, total_duration_ms);
    info!(
        "Found {} silence regions (audio duration: {:.1}s)",
        regions.len(),
        total_duration_ms as f64 / 1000.0
    );

    let total_silence_ms: u64 = regions.iter().map(Region::duration_ms).sum();
    if total_duration_ms > 0 {
        info!(
            "Total silence: {:.1}s ({:.1}%)",
            total_silence_ms as f64 / 1000.0,
            total_silence_ms as f64 / total_duration_ms as f64 * 100.0
        );
    }

    let report = SilenceReport {
        video: video.to_path_buf(),
        threshold_db,
        min_duration_ms,
        total_duration_ms,
        regions,
    };
    report.save(working_dir)?;

    Ok(report)
}
