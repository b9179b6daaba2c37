use crate::errors::FormatError;

// @module: Timecode, frame and millisecond conversions

/// Format milliseconds as a subtitle timecode (HH:MM:SS,mmm).
///
/// Negative input is clamped to zero; sub-millisecond precision is truncated.
pub fn ms_to_timecode(ms: i64) -> String {
    let ms = ms.max(0) as u64;
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Parse a subtitle timecode (HH:MM:SS,mmm) to milliseconds.
///
/// Both comma and dot are accepted as the fractional separator. A missing
/// fractional part is read as zero milliseconds.
pub fn timecode_to_ms(tc: &str) -> Result<u64, FormatError> {
    let normalized = tc.trim().replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();
    if parts.len() != 3 {
        return Err(FormatError::InvalidTimecode(tc.to_string()));
    }

    let invalid = || FormatError::InvalidTimecode(tc.to_string());
    let hours: u64 = parts[0].parse().map_err(|_| invalid())?;
    let minutes: u64 = parts[1].parse().map_err(|_| invalid())?;

    let sec_parts: Vec<&str> = parts[2].split('.').collect();
    if sec_parts.is_empty() || sec_parts.len() > 2 {
        return Err(invalid());
    }
    let seconds: u64 = sec_parts[0].parse().map_err(|_| invalid())?;
    let millis: u64 = if sec_parts.len() == 2 {
        sec_parts[1].parse().map_err(|_| invalid())?
    } else {
        0
    };

    Ok((hours * 3600 + minutes * 60 + seconds) * 1000 + millis)
}

/// Convert milliseconds to a frame count at the given frame rate,
/// rounding to the nearest frame.
pub fn ms_to_frames(ms: u64, fps: f64) -> u64 {
    (ms as f64 / 1000.0 * fps).round() as u64
}

/// Convert a frame count to milliseconds at the given frame rate,
/// rounding to the nearest millisecond.
pub fn frames_to_ms(frames: u64, fps: f64) -> u64 {
    (frames as f64 / fps * 1000.0).round() as u64
}

/// Format a frame count as an editing timecode (HH:MM:SS:FF).
///
/// The frame rate is rounded to the nearest integer for the FF field.
pub fn frames_to_edit_timecode(frames: u64, fps: f64) -> String {
    let fps_int = (fps.round() as u64).max(1);
    let ff = frames % fps_int;
    let total_seconds = frames / fps_int;
    let s = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let m = total_minutes % 60;
    let h = total_minutes / 60;

    format!("{:02}:{:02}:{:02}:{:02}", h, m, s, ff)
}

/// Parse an editing timecode (HH:MM:SS:FF) back to a frame count.
/// Exact inverse of [`frames_to_edit_timecode`] at the same frame rate.
pub fn edit_timecode_to_frames(tc: &str, fps: f64) -> Result<u64, FormatError> {
    let parts: Vec<&str> = tc.trim().split(':').collect();
    if parts.len() != 4 {
        return Err(FormatError::InvalidEditTimecode(tc.to_string()));
    }

    let mut fields = [0u64; 4];
    for (i, part) in parts.iter().enumerate() {
        fields[i] = part
            .parse()
            .map_err(|_| FormatError::InvalidEditTimecode(tc.to_string()))?;
    }

    let fps_int = (fps.round() as u64).max(1);
    let [h, m, s, f] = fields;
    Ok((h * 3600 + m * 60 + s) * fps_int + f)
}
