/*!
 * AI transcript review: sends subtitle blocks to a chat-completions model
 * which marks filler with `[DELETE]`, then parses the annotated SRT back.
 *
 * A failed chunk keeps its blocks unmodified - one bad API call must not
 * abort a long review run.
 */

use std::path::Path;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};

use crate::app_config::AiConfig;
use crate::providers::openrouter::{OpenRouter, OpenRouterRequest};
use crate::providers::Provider;
use crate::region_reconciler::CLEANED_SRT_FILE;
use crate::subtitle_processor::{self, SubtitleBlock};
use crate::timecode_utils::ms_to_timecode;

/// Transcript produced from the silence-cut timeline.
pub const ORIGINAL_SRT_FILE: &str = "original.srt";

/// Sampling temperature for review requests. Low on purpose: the model must
/// copy blocks through verbatim, only adding markers.
const REVIEW_TEMPERATURE: f32 = 0.1;

/// Response token cap per chunk.
const REVIEW_MAX_TOKENS: u32 = 16000;

const SYSTEM_PROMPT: &str = "\
You are a video editor. You are given subtitle blocks from a spoken-word video.

Your task: mark for deletion the blocks that contain:
- Filler words, mumbling, \"uh\", \"um\", \"well\", repetitions
- Unfinished phrases, slips of the tongue, self-corrections
- Pauses and meaningless fragments
- Technical noise (coughing, sighing)

IMPORTANT:
- Put the [DELETE] marker in front of the text of each block to remove
- Do NOT change the timecodes - they must stay exactly the same
- Do NOT change the text (other than adding [DELETE])
- Do NOT remove blocks with meaningful content
- Keep the block numbering unchanged
- Return ALL blocks (marked and unmarked)

Output format: standard SRT with the [DELETE] marker in front of the text of
blocks to remove.";

/// Render a chunk of blocks back to SRT text for the model prompt.
///
/// Unlike file serialization this keeps the original block numbering, so the
/// model's answer lines up with what it was shown.
pub fn build_chunk_text(blocks: &[SubtitleBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            block.index,
            ms_to_timecode(block.start_ms as i64),
            ms_to_timecode(block.end_ms as i64),
            block.text
        ));
    }
    out
}

/// Send one chunk to the model and return the annotated SRT text.
async fn review_chunk(
    client: &OpenRouter,
    model: &str,
    blocks: &[SubtitleBlock],
) -> Result<String> {
    let srt_text = build_chunk_text(blocks);
    info!("Sending {} blocks to AI ({})...", blocks.len(), model);

    let request = OpenRouterRequest::new(model, REVIEW_MAX_TOKENS)
        .temperature(REVIEW_TEMPERATURE)
        .add_message("system", SYSTEM_PROMPT)
        .add_message("user", srt_text);

    let response = client.complete(request).await?;
    let content = OpenRouter::extract_text_from_response(&response);

    let delete_count = content.matches(subtitle_processor::DELETE_MARKER).count();
    info!("AI flagged {}/{} blocks for deletion", delete_count, blocks.len());

    Ok(content)
}

/// Run the full cleanup: read the transcript, review it chunk by chunk,
/// reassemble, and write `cleaned.srt` into the working directory.
///
/// Returns the parsed blocks with their deletion flags set.
pub async fn run_cleanup(working_dir: &Path, config: &AiConfig) -> Result<Vec<SubtitleBlock>> {
    let srt_path = working_dir.join(ORIGINAL_SRT_FILE);
    let blocks = subtitle_processor::read_srt(&srt_path)
        .with_context(|| format!("Failed to read transcript: {}", srt_path.display()))?;
    info!("Loaded {} subtitle blocks from {}", blocks.len(), srt_path.display());

    let chunks = subtitle_processor::chunk_blocks(&blocks, config.chunk_size);
    info!(
        "Split into {} chunks of up to {} blocks",
        chunks.len(),
        config.chunk_size
    );

    let client = OpenRouter::new(&config.api_key, &config.endpoint, config.timeout_secs);

    let progress = ProgressBar::new(chunks.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} chunks")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut all_cleaned_text = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        info!("Processing chunk {}/{}...", i + 1, chunks.len());
        match review_chunk(&client, &config.model, chunk).await {
            Ok(text) => all_cleaned_text.push(text),
            Err(e) => {
                // Keep the chunk unmodified rather than losing it.
                error!("Chunk {} failed: {} - keeping it unmodified", i + 1, e);
                all_cleaned_text.push(build_chunk_text(chunk));
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let merged_text = all_cleaned_text.join("\n\n");
    let cleaned_blocks = subtitle_processor::parse_srt(&merged_text);

    let deleted = cleaned_blocks.iter().filter(|b| b.deleted).count();
    info!(
        "AI cleanup finished: {}/{} blocks flagged for deletion",
        deleted,
        cleaned_blocks.len()
    );

    let output_path = working_dir.join(CLEANED_SRT_FILE);
    subtitle_processor::write_srt(&cleaned_blocks, &output_path)?;
    info!("Cleaned subtitles saved to: {}", output_path.display());

    Ok(cleaned_blocks)
}
