use std::path::{Path, PathBuf};
use std::process::Output;
use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use tokio::process::Command;

use crate::file_utils::FileManager;
use crate::multicam_planner::{Angle, AngleCut};
use crate::region_reconciler::Region;

// @module: ffmpeg/ffprobe invocations for probing, cutting and reassembly

/// Timeout for probe-style commands.
const PROBE_TIMEOUT_SECS: u64 = 60;

/// Timeout for a single cut or concat invocation.
const RENDER_TIMEOUT_SECS: u64 = 1800;

/// How far before the in-point the fast input seek lands. The accurate output
/// seek covers the remainder, keeping cuts frame-accurate without decoding the
/// whole file up to the segment.
const FAST_SEEK_LEAD_SECS: f64 = 5.0;

/// Run an external media tool with a timeout, failing on non-zero exit.
pub async fn run_media_tool(program: &str, args: &[String], timeout_secs: u64) -> Result<Output> {
    debug!("{} {}", program, args.join(" "));

    let future = Command::new(program).args(args).output();
    let timeout = std::time::Duration::from_secs(timeout_secs);

    let output = tokio::select! {
        result = future => {
            result.map_err(|e| anyhow!("Failed to execute {}: {}", program, e))?
        },
        _ = tokio::time::sleep(timeout) => {
            return Err(anyhow!("{} timed out after {} seconds", program, timeout_secs));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let filtered = filter_ffmpeg_stderr(&stderr);
        error!("{} failed: {}", program, filtered);
        return Err(anyhow!("{} failed: {}", program, filtered));
    }

    Ok(output)
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let dominated_prefixes = [
        "ffmpeg version",
        "ffprobe version",
        "  built with",
        "  configuration:",
        "  lib",
        "Input #",
        "  Metadata:",
        "  Duration:",
        "  Chapter",
        "    Chapter",
        "  Stream #",
        "      Metadata:",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    // Prefixes carry their indentation, so match against the raw line.
    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            if line.trim().is_empty() {
                return false;
            }
            !dominated_prefixes.iter().any(|p| line.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}

/// Probe the duration of a media file in milliseconds.
pub async fn probe_duration_ms(video: &Path) -> Result<u64> {
    let args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        video.to_string_lossy().to_string(),
    ];

    let output = run_media_tool("ffprobe", &args, PROBE_TIMEOUT_SECS).await?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let seconds: f64 = stdout
        .trim()
        .parse()
        .with_context(|| format!("Unexpected ffprobe duration output: {}", stdout.trim()))?;

    Ok((seconds * 1000.0).round() as u64)
}

/// Probe the frame rate of the first video stream.
pub async fn probe_fps(video: &Path) -> Result<f64> {
    let args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-select_streams".to_string(),
        "v:0".to_string(),
        "-show_entries".to_string(),
        "stream=r_frame_rate".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        video.to_string_lossy().to_string(),
    ];

    let output = run_media_tool("ffprobe", &args, PROBE_TIMEOUT_SECS).await?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_frame_rate(stdout.trim())
        .ok_or_else(|| anyhow!("Unexpected ffprobe frame rate output: {}", stdout.trim()))
}

/// Parse an ffprobe rational frame rate such as `25/1` or `30000/1001`.
pub fn parse_frame_rate(raw: &str) -> Option<f64> {
    let (num, den) = raw.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

/// Extract the first embedded subtitle track of a video to an SRT file.
///
/// Returns false when the video carries no text subtitle track; the caller
/// decides whether that is a problem.
pub async fn extract_subtitle_track(video: &Path, output: &Path) -> Result<bool> {
    let args = vec![
        "-y".to_string(),
        "-i".to_string(),
        video.to_string_lossy().to_string(),
        "-map".to_string(),
        "0:s:0".to_string(),
        "-c:s".to_string(),
        "srt".to_string(),
        output.to_string_lossy().to_string(),
    ];

    let future = Command::new("ffmpeg").args(&args).output();
    let timeout = std::time::Duration::from_secs(PROBE_TIMEOUT_SECS);
    let result = tokio::select! {
        result = future => {
            result.map_err(|e| anyhow!("Failed to execute ffmpeg for subtitle extraction: {}", e))?
        },
        _ = tokio::time::sleep(timeout) => {
            return Err(anyhow!("ffmpeg subtitle extraction timed out"));
        }
    };

    if !result.status.success() {
        // No subtitle stream is the common case, not an error.
        return Ok(false);
    }

    let nonempty = std::fs::metadata(output).map(|m| m.len() > 0).unwrap_or(false);
    Ok(nonempty)
}

fn secs_arg(ms: u64) -> String {
    format!("{:.3}", ms as f64 / 1000.0)
}

/// Cut one region out of a source file, re-encoding for frame accuracy.
pub async fn cut_segment(input: &Path, region: Region, output: &Path) -> Result<()> {
    let start_secs = region.start_ms() as f64 / 1000.0;
    let fast_seek = (start_secs - FAST_SEEK_LEAD_SECS).max(0.0);
    let accurate_seek = start_secs - fast_seek;
    let duration_secs = region.duration_ms() as f64 / 1000.0;

    let args = vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
        "-ss".to_string(),
        format!("{:.3}", fast_seek),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-ss".to_string(),
        format!("{:.3}", accurate_seek),
        "-t".to_string(),
        format!("{:.3}", duration_secs),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        "-crf".to_string(),
        "20".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        output.to_string_lossy().to_string(),
    ];

    run_media_tool("ffmpeg", &args, RENDER_TIMEOUT_SECS).await?;
    Ok(())
}

/// Cut one multicam piece: video from the cut's angle, audio always from the
/// main camera. The screencast's video is offset by `audio_offset_ms`.
async fn cut_angle_segment(
    main_video: &Path,
    screencast: &Path,
    cut: &AngleCut,
    audio_offset_ms: i64,
    output: &Path,
) -> Result<()> {
    let region = Region(cut.source_start_ms, cut.source_end_ms);
    if cut.angle == Angle::Main {
        return cut_segment(main_video, region, output).await;
    }

    let video_start_ms = (cut.source_start_ms as i64 + audio_offset_ms).max(0) as u64;
    let duration = region.duration_ms();

    let args = vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
        "-ss".to_string(),
        secs_arg(video_start_ms),
        "-t".to_string(),
        secs_arg(duration),
        "-i".to_string(),
        screencast.to_string_lossy().to_string(),
        "-ss".to_string(),
        secs_arg(cut.source_start_ms),
        "-t".to_string(),
        secs_arg(duration),
        "-i".to_string(),
        main_video.to_string_lossy().to_string(),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        "-crf".to_string(),
        "20".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        output.to_string_lossy().to_string(),
    ];

    run_media_tool("ffmpeg", &args, RENDER_TIMEOUT_SECS).await?;
    Ok(())
}

/// Concatenate already-encoded parts with the concat demuxer (stream copy).
pub async fn concat_parts(parts: &[PathBuf], output: &Path) -> Result<()> {
    if parts.is_empty() {
        return Err(anyhow!("Nothing to concatenate: no parts rendered"));
    }

    let list_path = parts[0]
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("concat.txt");
    let mut list = String::new();
    for part in parts {
        list.push_str(&format!("file '{}'\n", part.to_string_lossy()));
    }
    FileManager::write_to_file(&list_path, &list)?;

    let args = vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        list_path.to_string_lossy().to_string(),
        "-c".to_string(),
        "copy".to_string(),
        output.to_string_lossy().to_string(),
    ];

    run_media_tool("ffmpeg", &args, RENDER_TIMEOUT_SECS).await?;
    Ok(())
}

/// Render the keep segments of one source into a single output file.
pub async fn render_segments(input: &Path, segments: &[Region], output: &Path) -> Result<()> {
    if segments.is_empty() {
        return Err(anyhow!("Nothing to render: keep-segment list is empty"));
    }

    info!(
        "Rendering {} segments from {} to {}",
        segments.len(),
        input.display(),
        output.display()
    );

    let temp_dir = tempfile::tempdir().context("Failed to create scratch directory")?;
    let progress = segment_progress_bar(segments.len() as u64);

    let mut parts = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        let part = temp_dir.path().join(format!("seg_{:04}.mp4", i));
        cut_segment(input, *segment, &part).await?;
        parts.push(part);
        progress.inc(1);
    }
    progress.finish_and_clear();

    concat_parts(&parts, output).await
}

/// Render a multicam angle plan: each cut pulls video from its angle and
/// audio from the main camera, then everything is concatenated in order.
pub async fn render_multicam(
    main_video: &Path,
    screencast: &Path,
    cuts: &[AngleCut],
    audio_offset_ms: i64,
    output: &Path,
) -> Result<()> {
    if cuts.is_empty() {
        return Err(anyhow!("Nothing to render: multicam plan is empty"));
    }

    info!(
        "Rendering multicam plan with {} cuts to {}",
        cuts.len(),
        output.display()
    );

    let temp_dir = tempfile::tempdir().context("Failed to create scratch directory")?;
    let progress = segment_progress_bar(cuts.len() as u64);

    let mut parts = Vec::with_capacity(cuts.len());
    for (i, cut) in cuts.iter().enumerate() {
        let part = temp_dir.path().join(format!("cut_{:04}.mp4", i));
        cut_angle_segment(main_video, screencast, cut, audio_offset_ms, &part).await?;
        parts.push(part);
        progress.inc(1);
    }
    progress.finish_and_clear();

    concat_parts(&parts, output).await
}

fn segment_progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} segments")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar
}
