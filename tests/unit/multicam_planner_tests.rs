/*!
 * Tests for multicam angle-switch planning
 */

use autocut::multicam_planner::{auto_switch_intervals, plan_angle_cuts, Angle};
use autocut::region_reconciler::Region;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Test the default intervals with no segments
#[test]
fn test_auto_switch_intervals_withNoSegments_shouldUseDefaults() {
    assert_eq!(auto_switch_intervals(&[]), (5, 15));
}

/// Test interval derivation from the average segment duration
#[test]
fn test_auto_switch_intervals_withFortySecondSegments_shouldSplitAverage() {
    // Average segment: 40s -> min 10s, max 20s
    let segments = vec![Region(0, 40_000), Region(50_000, 90_000)];
    assert_eq!(auto_switch_intervals(&segments), (10, 20));
}

/// Test the floor on very short segments
#[test]
fn test_auto_switch_intervals_withShortSegments_shouldClampToFloor() {
    // Average segment: 4s -> quarter rounds to 1, floored to 3
    let segments = vec![Region(0, 4_000)];
    let (min_iv, max_iv) = auto_switch_intervals(&segments);
    assert_eq!(min_iv, 3);
    assert!(max_iv > min_iv);
}

/// Test the ceiling on very long segments
#[test]
fn test_auto_switch_intervals_withLongSegments_shouldClampToCeiling() {
    // Average segment: 200s -> half is 100, clamped to 30
    let segments = vec![Region(0, 200_000)];
    let (min_iv, max_iv) = auto_switch_intervals(&segments);
    assert_eq!(max_iv, 30);
    assert!(min_iv <= max_iv);
}

/// Test the plan tiles every segment without gaps or overlap
#[test]
fn test_plan_angle_cuts_withTwoSegments_shouldTileSegmentsExactly() {
    let segments = vec![Region(500, 30_500), Region(40_000, 75_000)];
    let mut rng = StdRng::seed_from_u64(7);

    let cuts = plan_angle_cuts(&segments, 5, 15, &mut rng);
    assert!(!cuts.is_empty());

    // Walk the cuts against the segments they must cover
    let mut cut_iter = cuts.iter().peekable();
    for segment in &segments {
        let mut pos = segment.start_ms();
        while pos < segment.end_ms() {
            let cut = cut_iter.next().expect("segment not fully covered");
            assert_eq!(cut.source_start_ms, pos);
            assert!(cut.source_end_ms <= segment.end_ms());
            assert!(cut.duration_ms() > 0);
            pos = cut.source_end_ms;
        }
        assert_eq!(pos, segment.end_ms());
    }
    assert!(cut_iter.next().is_none());
}

/// Test the plan starts on the main camera and alternates
#[test]
fn test_plan_angle_cuts_withSeededRng_shouldAlternateStartingWithMain() {
    let segments = vec![Region(0, 120_000)];
    let mut rng = StdRng::seed_from_u64(42);

    let cuts = plan_angle_cuts(&segments, 5, 15, &mut rng);
    assert!(cuts.len() >= 2);

    for (i, cut) in cuts.iter().enumerate() {
        let expected = if i % 2 == 0 { Angle::Main } else { Angle::Screencast };
        assert_eq!(cut.angle, expected);
    }
}

/// Test cut lengths respect the interval bounds except for remainders
#[test]
fn test_plan_angle_cuts_withBoundedIntervals_shouldRespectBounds() {
    let segments = vec![Region(0, 300_000)];
    let mut rng = StdRng::seed_from_u64(3);

    let cuts = plan_angle_cuts(&segments, 5, 15, &mut rng);
    for cut in &cuts[..cuts.len() - 1] {
        assert!(cut.duration_ms() >= 5_000);
        assert!(cut.duration_ms() <= 15_000);
    }
    // The trailing remainder only has an upper bound
    assert!(cuts.last().unwrap().duration_ms() <= 15_000);
}

/// Test empty segments plan to nothing
#[test]
fn test_plan_angle_cuts_withNoSegments_shouldBeEmpty() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(plan_angle_cuts(&[], 5, 15, &mut rng).is_empty());
}
