use std::fmt;
use std::path::Path;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::FormatError;
use crate::file_utils::FileManager;
use crate::region_reconciler::Region;
use crate::timecode_utils::{ms_to_timecode, timecode_to_ms};

// @module: Subtitle block model and SRT codec

// @const: Marker an AI reviewer puts in front of blocks to cut
pub const DELETE_MARKER: &str = "[DELETE]";

// Kept blocks closer together than this are coalesced into one region.
pub const KEEP_MERGE_GAP_MS: u64 = 200;

// @const: SRT timecode range line regex
static TIMECODE_RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2}[,.]\d{3})").unwrap()
});

// @const: Blank-line block separator regex
static BLOCK_SPLIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

// @struct: Single subtitle block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleBlock {
    // @field: Sequence number as produced by the transcription source
    pub index: usize,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Subtitle text, marker stripped
    pub text: String,

    // @field: Flagged for removal by the AI reviewer
    pub deleted: bool,
}

impl SubtitleBlock {
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        SubtitleBlock {
            index,
            start_ms,
            end_ms,
            text: text.into(),
            deleted: false,
        }
    }

    pub fn new_deleted(index: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        SubtitleBlock {
            deleted: true,
            ..Self::new(index, start_ms, end_ms, text)
        }
    }

    /// Convert start time to a formatted SRT timecode
    pub fn format_start_time(&self) -> String {
        ms_to_timecode(self.start_ms as i64)
    }

    /// Convert end time to a formatted SRT timecode
    pub fn format_end_time(&self) -> String {
        ms_to_timecode(self.end_ms as i64)
    }
}

impl fmt::Display for SubtitleBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        if self.deleted {
            writeln!(f, "{} {}", DELETE_MARKER, self.text)
        } else {
            writeln!(f, "{}", self.text)
        }
    }
}

/// Parse SRT text into subtitle blocks.
///
/// Input is split on blank lines; a raw block needs an index line, a timecode
/// range line and at least one text line. Anything shorter or malformed is
/// skipped without an error, so garbage input parses to an empty list. A
/// `[DELETE]` marker anywhere in the text flags the block and is stripped.
pub fn parse_srt(content: &str) -> Vec<SubtitleBlock> {
    let mut blocks = Vec::new();

    for raw in BLOCK_SPLIT_REGEX.split(content.trim()) {
        let lines: Vec<&str> = raw.trim().lines().collect();
        if lines.len() < 3 {
            continue;
        }

        let Ok(index) = lines[0].trim().parse::<usize>() else {
            continue;
        };

        let Some(caps) = TIMECODE_RANGE_REGEX.captures(lines[1].trim()) else {
            continue;
        };
        let (Ok(start_ms), Ok(end_ms)) = (parse_range_side(&caps, 1), parse_range_side(&caps, 2))
        else {
            continue;
        };

        let mut text = lines[2..].join("\n").trim().to_string();
        let deleted = text.contains(DELETE_MARKER);
        if deleted {
            text = text.replace(DELETE_MARKER, "").trim().to_string();
        }

        blocks.push(SubtitleBlock {
            index,
            start_ms,
            end_ms,
            text,
            deleted,
        });
    }

    blocks
}

fn parse_range_side(caps: &regex::Captures, group: usize) -> Result<u64, FormatError> {
    // The range regex already matched, so the group is present.
    timecode_to_ms(caps.get(group).map_or("", |m| m.as_str()))
}

/// Serialize blocks to SRT text.
///
/// Output numbering is positional, starting at 1; the original `index` field
/// is not preserved. Deleted blocks get the `[DELETE] ` prefix back.
pub fn serialize_srt(blocks: &[SubtitleBlock]) -> String {
    let mut out = String::new();
    for (i, block) in blocks.iter().enumerate() {
        let prefix = if block.deleted {
            format!("{} ", DELETE_MARKER)
        } else {
            String::new()
        };
        out.push_str(&format!(
            "{}\n{} --> {}\n{}{}\n\n",
            i + 1,
            block.format_start_time(),
            block.format_end_time(),
            prefix,
            block.text
        ));
    }
    out
}

/// Read and parse an SRT file (UTF-8).
pub fn read_srt<P: AsRef<Path>>(path: P) -> Result<Vec<SubtitleBlock>> {
    let content = FileManager::read_to_string(path)?;
    Ok(parse_srt(&content))
}

/// Serialize blocks and write them to an SRT file (UTF-8).
pub fn write_srt<P: AsRef<Path>>(blocks: &[SubtitleBlock], path: P) -> Result<()> {
    FileManager::write_to_file(path, &serialize_srt(blocks))
}

/// Split blocks into fixed-size chunks for AI processing, preserving order.
/// The last chunk may be shorter. A chunk size below 1 is bumped to 1.
pub fn chunk_blocks(blocks: &[SubtitleBlock], chunk_size: usize) -> Vec<Vec<SubtitleBlock>> {
    let chunk_size = chunk_size.max(1);
    blocks.chunks(chunk_size).map(|c| c.to_vec()).collect()
}

/// Derive the regions to keep from a reviewed block list.
///
/// Non-deleted blocks are kept in order; two neighbours whose gap is under
/// [`KEEP_MERGE_GAP_MS`] fold into one region. All-deleted (or empty) input
/// yields no regions.
pub fn keep_segments(blocks: &[SubtitleBlock]) -> Vec<Region> {
    let kept: Vec<&SubtitleBlock> = blocks.iter().filter(|b| !b.deleted).collect();
    let Some(first) = kept.first() else {
        return Vec::new();
    };

    let mut segments = Vec::new();
    let mut current_start = first.start_ms;
    let mut current_end = first.end_ms;

    for block in &kept[1..] {
        if block.start_ms.saturating_sub(current_end) < KEEP_MERGE_GAP_MS {
            current_end = block.end_ms;
        } else {
            segments.push(Region(current_start, current_end));
            current_start = block.start_ms;
            current_end = block.end_ms;
        }
    }

    segments.push(Region(current_start, current_end));
    segments
}
