//! Time clamping helpers shared by the corrector and the re-anchor paths.
//!
//! Durations are only ever used as bounds here, never inside the mapping.

/// Clamp a position into `[0, duration]`.
///
/// An unknown duration is treated as unbounded.
#[inline]
pub fn clamp_to_duration(seconds: f64, duration: Option<f64>) -> f64 {
    let upper = duration.unwrap_or(f64::INFINITY);
    seconds.max(0.0).min(upper)
}

/// Whether a position lies inside `[0, duration]` (unknown = unbounded).
#[inline]
pub fn within_duration(seconds: f64, duration: Option<f64>) -> bool {
    seconds >= 0.0 && seconds <= duration.unwrap_or(f64::INFINITY)
}

/// Whether a position lies past a known end of media.
#[inline]
pub fn past_end(seconds: f64, duration: Option<f64>) -> bool {
    matches!(duration, Some(end) if seconds > end)
}
