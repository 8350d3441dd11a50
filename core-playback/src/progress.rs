//! Progress bar math.

/// Fraction of the bar under a click at `offset_x` pixels of a `width` pixel
/// bar. `None` when the geometry is unusable.
pub fn click_fraction(offset_x: f64, width: f64) -> Option<f64> {
    if !offset_x.is_finite() || !width.is_finite() || width <= 0.0 {
        return None;
    }
    Some((offset_x / width).clamp(0.0, 1.0))
}

/// `m:ss`. Negative and non-finite values read as zero.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// `position / duration` label shown next to the bar.
pub fn progress_label(position: f64, duration: Option<f64>) -> String {
    format!(
        "{} / {}",
        format_time(position),
        format_time(duration.unwrap_or(0.0))
    )
}

/// Fill fraction of the bar, `0.0` while the duration is unknown.
pub fn progress_fraction(position: f64, duration: Option<f64>) -> f64 {
    match duration {
        Some(d) if d.is_finite() && d > 0.0 && position.is_finite() => (position / d).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

pub(crate) fn to_millis(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    }
}
