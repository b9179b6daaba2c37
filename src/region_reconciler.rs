/*!
 * Region reconciliation: turning detected silence and AI-flagged subtitle
 * deletions into the final list of source segments to keep.
 *
 * Two coordinate spaces are in play. Silence regions live in original source
 * time. AI-flagged deletions come from a transcript of the *already cut*
 * timeline, so their timecodes must be remapped back to source time through
 * the first pass's keep segments before the two streams can be merged.
 */

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::file_utils::FileManager;
use crate::subtitle_processor::{self, SubtitleBlock};

/// Artifact produced by silence detection.
pub const SILENCE_REGIONS_FILE: &str = "silence_regions.json";

/// Pass 1 artifact: keep segments computed from silence alone.
pub const KEEP_SEGMENTS_SILENCE_FILE: &str = "keep_segments_silence.json";

/// Pass 2 artifact: final keep segments (silence + AI deletions).
pub const KEEP_SEGMENTS_FILE: &str = "keep_segments.json";

/// AI-reviewed transcript consumed by pass 2.
pub const CLEANED_SRT_FILE: &str = "cleaned.srt";

/// A time interval in milliseconds, serialized as `[start_ms, end_ms]`.
///
/// Regions are always relative to one coordinate space, either original
/// source time or cut-timeline time, and callers track which.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region(pub u64, pub u64);

impl Region {
    pub fn start_ms(&self) -> u64 {
        self.0
    }

    pub fn end_ms(&self) -> u64 {
        self.1
    }

    pub fn duration_ms(&self) -> u64 {
        self.1.saturating_sub(self.0)
    }
}

/// Silence detection results for one source video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SilenceReport {
    /// Source video the detection ran on
    pub video: PathBuf,

    /// Loudness threshold used, in dB
    pub threshold_db: i32,

    /// Minimum silence length registered, in ms
    pub min_duration_ms: u64,

    /// Full duration of the source audio, in ms
    pub total_duration_ms: u64,

    /// Detected silence intervals in source time
    pub regions: Vec<Region>,
}

impl SilenceReport {
    pub fn save(&self, working_dir: &Path) -> Result<()> {
        let path = working_dir.join(SILENCE_REGIONS_FILE);
        let json = serde_json::to_string_pretty(self)?;
        FileManager::write_to_file(&path, &json)?;
        info!("Silence regions saved to: {}", path.display());
        Ok(())
    }

    pub fn load(working_dir: &Path) -> Result<Self> {
        let path = working_dir.join(SILENCE_REGIONS_FILE);
        let content = FileManager::read_to_string(&path)
            .with_context(|| format!("Missing silence report: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse silence report: {}", path.display()))
    }
}

/// Keep-segment summary persisted after each cut pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepSegmentsReport {
    pub total_duration_ms: u64,
    pub kept_ms: u64,
    pub removed_ms: u64,
    pub segments: Vec<Region>,
}

impl KeepSegmentsReport {
    /// Build a report from segments, deriving the kept/removed totals.
    pub fn from_segments(segments: Vec<Region>, total_duration_ms: u64) -> Self {
        let kept_ms: u64 = segments.iter().map(Region::duration_ms).sum();
        KeepSegmentsReport {
            total_duration_ms,
            kept_ms,
            removed_ms: total_duration_ms.saturating_sub(kept_ms),
            segments,
        }
    }

    pub fn save(&self, working_dir: &Path, filename: &str) -> Result<()> {
        let path = working_dir.join(filename);
        let json = serde_json::to_string_pretty(self)?;
        FileManager::write_to_file(&path, &json)
    }

    pub fn load(working_dir: &Path, filename: &str) -> Result<Self> {
        let path = working_dir.join(filename);
        let content = FileManager::read_to_string(&path)
            .with_context(|| format!("Missing keep-segment report: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse keep-segment report: {}", path.display()))
    }
}

/// Merge two deletion-region lists into one sorted, coalesced list.
///
/// Touching regions (`next.start == current.end`) count as one region.
/// Empty combined input yields an empty list.
pub fn merge_regions(regions_a: &[Region], regions_b: &[Region]) -> Vec<Region> {
    let mut all: Vec<Region> = regions_a.iter().chain(regions_b).copied().collect();
    all.sort_by_key(Region::start_ms);

    let mut merged: Vec<Region> = Vec::with_capacity(all.len());
    for region in all {
        match merged.last_mut() {
            Some(last) if region.0 <= last.1 => last.1 = last.1.max(region.1),
            _ => merged.push(region),
        }
    }
    merged
}

/// Invert deletion regions into keep regions over `[0, total_duration_ms]`.
///
/// No deletions yields the whole range as one region; a deletion covering the
/// whole range yields nothing. Deletions flush with either boundary produce no
/// zero-length edge regions.
pub fn invert_regions(delete_regions: &[Region], total_duration_ms: u64) -> Vec<Region> {
    if delete_regions.is_empty() {
        return vec![Region(0, total_duration_ms)];
    }

    let mut sorted = delete_regions.to_vec();
    sorted.sort_by_key(Region::start_ms);

    let mut keep = Vec::new();
    let mut prev_end = 0u64;
    for region in sorted {
        if region.0 > prev_end {
            keep.push(Region(prev_end, region.0));
        }
        prev_end = prev_end.max(region.1);
    }

    if prev_end < total_duration_ms {
        keep.push(Region(prev_end, total_duration_ms));
    }

    keep
}

/// Map a position on the cut timeline back to original source time.
///
/// Walks the keep segments that built the cut timeline, consuming their
/// durations until the clean-timeline position falls inside one. Positions
/// past the covered duration clamp to the end of the last segment; with no
/// segments at all the input is returned unchanged.
pub fn clean_to_original(t_clean_ms: u64, keep_segments: &[Region]) -> u64 {
    let mut elapsed = 0u64;
    for seg in keep_segments {
        let seg_dur = seg.duration_ms();
        if elapsed + seg_dur >= t_clean_ms {
            return seg.0 + (t_clean_ms - elapsed);
        }
        elapsed += seg_dur;
    }
    match keep_segments.last() {
        Some(last) => last.1,
        None => t_clean_ms,
    }
}

/// Pass 1: compute keep segments from silence regions alone and persist them.
pub fn compute_silence_keep_segments(working_dir: &Path) -> Result<Vec<Region>> {
    let report = SilenceReport::load(working_dir)
        .context("Silence detection has not produced results yet")?;
    info!("Loaded {} silence regions", report.regions.len());

    let segments = invert_regions(&report.regions, report.total_duration_ms);
    info!("Keep segments: {}", segments.len());

    let summary = KeepSegmentsReport::from_segments(segments, report.total_duration_ms);
    log_cut_totals(&summary);
    summary.save(working_dir, KEEP_SEGMENTS_SILENCE_FILE)?;

    Ok(summary.segments)
}

/// Pass 2: fold AI-flagged deletions into the silence cut and persist the
/// final keep segments.
///
/// AI timecodes are remapped from cut-timeline to source time through pass 1's
/// keep segments, merged with the raw silence regions, and inverted against
/// the original duration. A missing `cleaned.srt` degrades to the pass 1
/// segments with a warning; it is not an error.
pub fn compute_final_keep_segments(working_dir: &Path) -> Result<Vec<Region>> {
    let silence_pass = KeepSegmentsReport::load(working_dir, KEEP_SEGMENTS_SILENCE_FILE)
        .context("Silence cut has not produced keep segments yet")?;
    info!(
        "Loaded {} keep segments from the silence cut",
        silence_pass.segments.len()
    );

    let cleaned_path = working_dir.join(CLEANED_SRT_FILE);
    if !FileManager::file_exists(&cleaned_path) {
        warn!("{} not found - keeping the silence-only segments", CLEANED_SRT_FILE);
        FileManager::copy_file(
            working_dir.join(KEEP_SEGMENTS_SILENCE_FILE),
            working_dir.join(KEEP_SEGMENTS_FILE),
        )?;
        return Ok(silence_pass.segments);
    }

    let ai_blocks = subtitle_processor::read_srt(&cleaned_path)?;
    let deleted_count = ai_blocks.iter().filter(|b| b.deleted).count();
    info!(
        "AI flagged {}/{} blocks for deletion",
        deleted_count,
        ai_blocks.len()
    );

    let ai_delete_regions = remap_deletions(&ai_blocks, &silence_pass.segments);
    info!("AI deletions in source time: {}", ai_delete_regions.len());

    // Raw silence regions are optional here - the remap alone still works.
    let (silence_regions, total_duration_ms) = match SilenceReport::load(working_dir) {
        Ok(report) => (report.regions, report.total_duration_ms),
        Err(_) => {
            warn!("Silence report missing - merging AI deletions only");
            (Vec::new(), silence_pass.total_duration_ms)
        }
    };

    let all_deletions = merge_regions(&silence_regions, &ai_delete_regions);
    let segments = invert_regions(&all_deletions, total_duration_ms);
    info!("Final keep segments: {}", segments.len());

    let summary = KeepSegmentsReport::from_segments(segments, total_duration_ms);
    log_cut_totals(&summary);
    summary.save(working_dir, KEEP_SEGMENTS_FILE)?;

    Ok(summary.segments)
}

/// Remap each deleted block's interval from cut-timeline to source time.
pub fn remap_deletions(blocks: &[SubtitleBlock], keep_segments: &[Region]) -> Vec<Region> {
    blocks
        .iter()
        .filter(|b| b.deleted)
        .map(|b| {
            Region(
                clean_to_original(b.start_ms, keep_segments),
                clean_to_original(b.end_ms, keep_segments),
            )
        })
        .collect()
}

fn log_cut_totals(summary: &KeepSegmentsReport) {
    let pct = if summary.total_duration_ms > 0 {
        summary.removed_ms as f64 / summary.total_duration_ms as f64 * 100.0
    } else {
        0.0
    };
    info!(
        "Keeping {:.1}s, removing {:.1}s ({:.1}% cut)",
        summary.kept_ms as f64 / 1000.0,
        summary.removed_ms as f64 / 1000.0,
        pct
    );
}
