/*!
 * Tests for the SRT codec and subtitle block handling
 */

use anyhow::Result;
use autocut::region_reconciler::Region;
use autocut::subtitle_processor::{
    chunk_blocks, keep_segments, parse_srt, read_srt, serialize_srt, write_srt,
};
use crate::common::{self, SAMPLE_SRT};

/// Test parsing the sample document
#[test]
fn test_parse_srt_withSampleDocument_shouldParseAllBlocks() {
    let blocks = parse_srt(SAMPLE_SRT);
    assert_eq!(blocks.len(), 4);

    let first = &blocks[0];
    assert_eq!(first.index, 1);
    assert_eq!(first.start_ms, 1000);
    assert_eq!(first.end_ms, 3000);
    assert_eq!(first.text, "Hello, world!");
    assert!(!first.deleted);
}

/// Test the deletion marker is recognized and stripped
#[test]
fn test_parse_srt_withDeleteMarker_shouldFlagAndStripBlock() {
    let blocks = parse_srt(SAMPLE_SRT);

    assert!(blocks[2].deleted);
    assert_eq!(blocks[2].text, "Uhh, well.");

    assert!(!blocks[0].deleted);
    assert!(!blocks[1].deleted);
    assert!(!blocks[3].deleted);
}

/// Test a minimal two-block fragment with a marked second block
#[test]
fn test_parse_srt_withMarkedSecondBlock_shouldYieldTwoBlocks() {
    let input = "1\n00:00:01,000 --> 00:00:03,000\nHello\n\n2\n00:00:04,000 --> 00:00:06,000\n[DELETE] um\n";
    let blocks = parse_srt(input);

    assert_eq!(blocks.len(), 2);
    assert!(!blocks[0].deleted);
    assert!(blocks[1].deleted);
    assert_eq!(blocks[1].text, "um");
}

/// Test empty and garbage input parse to nothing
#[test]
fn test_parse_srt_withMalformedInput_shouldYieldEmptyList() {
    assert!(parse_srt("").is_empty());
    assert!(parse_srt("not valid srt\nblah blah").is_empty());
    // Index line present but timecode line missing
    assert!(parse_srt("1\nno timecodes here\nsome text\n").is_empty());
    // Timecode range present but no text line
    assert!(parse_srt("1\n00:00:01,000 --> 00:00:02,000\n").is_empty());
}

/// Test malformed blocks are skipped while valid neighbours survive
#[test]
fn test_parse_srt_withPartiallyMalformedInput_shouldKeepValidBlocks() {
    let input = "garbage\n\n1\n00:00:01,000 --> 00:00:03,000\nKeep me\n\nnot-a-number\n00:00:04,000 --> 00:00:05,000\nDropped\n";
    let blocks = parse_srt(input);

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].text, "Keep me");
}

/// Test dot-separated timecodes parse like comma-separated ones
#[test]
fn test_parse_srt_withDotSeparator_shouldParse() {
    let input = "1\n00:00:01.500 --> 00:00:03.250\nDotted\n";
    let blocks = parse_srt(input);

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].start_ms, 1500);
    assert_eq!(blocks[0].end_ms, 3250);
}

/// Test serialization renumbers positionally and restores the marker
#[test]
fn test_serialize_srt_withShuffledIndexes_shouldRenumberFromOne() {
    let blocks = vec![
        common::block(7, 1000, 3000, "First line"),
        common::deleted_block(42, 4000, 6000, "Removed"),
        common::block(3, 7000, 9000, "Third line"),
    ];

    let text = serialize_srt(&blocks);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "1");
    assert_eq!(lines[1], "00:00:01,000 --> 00:00:03,000");
    assert_eq!(lines[2], "First line");
    assert_eq!(lines[4], "2");
    assert_eq!(lines[6], "[DELETE] Removed");
    assert_eq!(lines[8], "3");
}

/// Test serialize/parse round trip preserves everything but the index
#[test]
fn test_serialize_then_parse_withMixedBlocks_shouldPreserveFields() {
    let blocks = vec![
        common::block(9, 1000, 3000, "First line"),
        common::deleted_block(5, 4000, 6000, "Removed"),
        common::block(11, 7000, 9000, "Third line"),
    ];

    let reparsed = parse_srt(&serialize_srt(&blocks));
    assert_eq!(reparsed.len(), 3);

    for (i, (original, round_tripped)) in blocks.iter().zip(&reparsed).enumerate() {
        assert_eq!(round_tripped.index, i + 1);
        assert_eq!(round_tripped.start_ms, original.start_ms);
        assert_eq!(round_tripped.end_ms, original.end_ms);
        assert_eq!(round_tripped.text, original.text);
        assert_eq!(round_tripped.deleted, original.deleted);
    }
}

/// Test file round trip
#[test]
fn test_write_and_read_srt_withTempFile_shouldRoundTrip() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("roundtrip.srt");

    let blocks = vec![
        common::block(1, 1000, 3000, "First line"),
        common::deleted_block(2, 4000, 6000, "Removed"),
        common::block(3, 7000, 9000, "Third line"),
    ];

    write_srt(&blocks, &path)?;
    let loaded = read_srt(&path)?;

    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[0].text, "First line");
    assert!(!loaded[0].deleted);
    assert!(loaded[1].deleted);
    assert_eq!(loaded[1].text, "Removed");
    assert_eq!(loaded[2].start_ms, 7000);

    Ok(())
}

/// Test chunking with an exact multiple
#[test]
fn test_chunk_blocks_withExactMultiple_shouldSplitEvenly() {
    let blocks: Vec<_> = (0..10).map(|i| common::block(i, 0, 1000, "x")).collect();
    let chunks = chunk_blocks(&blocks, 5);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].len(), 5);
    assert_eq!(chunks[1].len(), 5);
}

/// Test chunking with a remainder
#[test]
fn test_chunk_blocks_withRemainder_shouldShortenLastChunk() {
    let blocks: Vec<_> = (0..7).map(|i| common::block(i, 0, 1000, "x")).collect();
    let chunks = chunk_blocks(&blocks, 3);

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[2].len(), 1);
}

/// Test chunking when everything fits in one chunk
#[test]
fn test_chunk_blocks_withOversizedChunkSize_shouldYieldSingleChunk() {
    let blocks: Vec<_> = (0..3).map(|i| common::block(i, 0, 1000, "x")).collect();
    let chunks = chunk_blocks(&blocks, 50);

    assert_eq!(chunks.len(), 1);
}

/// Test chunk size below one is bumped to one
#[test]
fn test_chunk_blocks_withZeroChunkSize_shouldUseSizeOne() {
    let blocks: Vec<_> = (0..3).map(|i| common::block(i, 0, 1000, "x")).collect();
    let chunks = chunk_blocks(&blocks, 0);

    assert_eq!(chunks.len(), 3);
}

/// Test keep segments coalesce small gaps
#[test]
fn test_keep_segments_withSmallGap_shouldMergeIntoOne() {
    let blocks = vec![
        common::block(1, 0, 1000, "a"),
        // Gap of 100 ms, under the 200 ms merge threshold
        common::block(2, 1100, 2000, "b"),
    ];

    let segments = keep_segments(&blocks);
    assert_eq!(segments, vec![Region(0, 2000)]);
}

/// Test keep segments split at gaps of 200 ms or more
#[test]
fn test_keep_segments_withLargeGap_shouldYieldTwoSegments() {
    let blocks = vec![
        common::block(1, 0, 1000, "a"),
        common::block(2, 1200, 2000, "b"),
    ];

    let segments = keep_segments(&blocks);
    assert_eq!(segments, vec![Region(0, 1000), Region(1200, 2000)]);
}

/// Test deleted blocks break up keep regions
#[test]
fn test_keep_segments_withDeletedMiddleBlock_shouldSkipIt() {
    let blocks = vec![
        common::block(1, 0, 1000, "a"),
        common::deleted_block(2, 1050, 2000, "junk"),
        common::block(3, 5000, 6000, "b"),
    ];

    let segments = keep_segments(&blocks);
    assert_eq!(segments, vec![Region(0, 1000), Region(5000, 6000)]);
}

/// Test all-deleted input yields no segments
#[test]
fn test_keep_segments_withAllDeleted_shouldBeEmpty() {
    let blocks = vec![common::deleted_block(1, 0, 1000, "x")];
    assert!(keep_segments(&blocks).is_empty());
}
