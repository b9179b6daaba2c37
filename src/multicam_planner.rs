use log::info;
use rand::Rng;

use crate::region_reconciler::Region;

// @module: Multicam angle-switch planning over the final keep segments

/// Fallback switch intervals when no segments are available, in seconds.
const DEFAULT_INTERVALS_SEC: (u64, u64) = (5, 15);

/// Hard bounds on auto-derived switch intervals, in seconds.
const MIN_INTERVAL_FLOOR_SEC: u64 = 3;
const MAX_INTERVAL_CEIL_SEC: u64 = 30;

/// Which camera a cut pulls its picture from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Angle {
    /// The main talking-head camera
    Main,
    /// The screen recording
    Screencast,
}

/// One planned cut: a source-time interval and the angle to show.
///
/// Times are in main-camera source coordinates; the renderer applies the
/// screencast offset where needed. Audio always comes from the main camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleCut {
    pub source_start_ms: u64,
    pub source_end_ms: u64,
    pub angle: Angle,
}

impl AngleCut {
    pub fn duration_ms(&self) -> u64 {
        self.source_end_ms.saturating_sub(self.source_start_ms)
    }
}

/// Derive switch intervals from the average keep-segment duration.
///
/// The average is split into quarters and halves, clamped to 3..=30 seconds.
/// No segments yields the (5, 15) defaults.
pub fn auto_switch_intervals(keep_segments: &[Region]) -> (u64, u64) {
    if keep_segments.is_empty() {
        info!(
            "No segments - using default switch intervals ({}-{}s)",
            DEFAULT_INTERVALS_SEC.0, DEFAULT_INTERVALS_SEC.1
        );
        return DEFAULT_INTERVALS_SEC;
    }

    let avg_sec = keep_segments
        .iter()
        .map(|r| r.duration_ms() as f64 / 1000.0)
        .sum::<f64>()
        / keep_segments.len() as f64;

    let min_iv = ((avg_sec / 4.0).round() as u64).max(MIN_INTERVAL_FLOOR_SEC);
    let max_iv = ((avg_sec / 2.0).round() as u64)
        .max(min_iv + 1)
        .min(MAX_INTERVAL_CEIL_SEC);
    let min_iv = min_iv.min(max_iv);

    info!(
        "Auto switch intervals: {}-{}s (average segment: {:.1}s)",
        min_iv, max_iv, avg_sec
    );
    (min_iv, max_iv)
}

/// Tile the keep segments with alternating-angle cuts.
///
/// Each segment is walked in randomly sized chunks of min..=max seconds; the
/// angle flips after every chunk and carries across segment boundaries,
/// starting on the main camera. The cuts cover every keep segment exactly,
/// so the plan renders to the same runtime as the plain final cut.
pub fn plan_angle_cuts<R: Rng>(
    keep_segments: &[Region],
    min_interval_sec: u64,
    max_interval_sec: u64,
    rng: &mut R,
) -> Vec<AngleCut> {
    let min_interval_sec = min_interval_sec.max(1);
    let max_interval_sec = max_interval_sec.max(min_interval_sec);

    let mut cuts = Vec::new();
    let mut show_screencast = false;

    for segment in keep_segments {
        let seg_duration = segment.duration_ms();
        let mut seg_offset = 0u64;

        while seg_offset < seg_duration {
            let interval_ms = rng.random_range(min_interval_sec..=max_interval_sec) * 1000;
            let chunk_end = (seg_offset + interval_ms).min(seg_duration);

            cuts.push(AngleCut {
                source_start_ms: segment.start_ms() + seg_offset,
                source_end_ms: segment.start_ms() + chunk_end,
                angle: if show_screencast {
                    Angle::Screencast
                } else {
                    Angle::Main
                },
            });

            show_screencast = !show_screencast;
            seg_offset = chunk_end;
        }
    }

    info!(
        "Multicam plan: {} cuts ({} on screencast)",
        cuts.len(),
        cuts.iter().filter(|c| c.angle == Angle::Screencast).count()
    );
    cuts
}
