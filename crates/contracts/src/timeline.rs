//! Timeline trait - media timeline abstraction
//!
//! Defines the only capability the sync core consumes from its host: a seekable
//! playback position, an optional duration and a pause state. Real media
//! elements and the simulated timeline in `playback` implement the same trait.

/// Media timeline capability
///
/// # Design Principles
///
/// 1. **Decoupling**: the engine never touches widgets, only this trait
/// 2. **Unified Interface**: fakes in tests and real players share one API
/// 3. **Immediate effects**: `seek` applies synchronously; a read of
///    `position` right after a `seek` returns what the media actually accepted
///
/// # Example
///
/// ```ignore
/// let mut video: Box<dyn Timeline> = open_player();
/// if let Some(duration) = video.known_duration() {
///     video.seek(duration / 2.0);
/// }
/// ```
pub trait Timeline {
    /// Current playback position (seconds)
    fn position(&self) -> f64;

    /// Move the playback position (seconds)
    ///
    /// Implementations may clamp to their own media bounds.
    fn seek(&mut self, seconds: f64);

    /// Media duration (seconds)
    ///
    /// `None` until metadata is loaded. `f64::INFINITY` means unbounded.
    fn duration(&self) -> Option<f64>;

    /// Whether playback is paused
    fn is_paused(&self) -> bool;

    /// Start playback
    fn play(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Current playback rate multiplier
    fn playback_rate(&self) -> f64;

    /// Set playback rate multiplier
    fn set_playback_rate(&mut self, rate: f64);

    /// Human readable label (diagnostics only)
    fn label(&self) -> &str {
        "timeline"
    }

    /// Duration if it is known and usable: not NaN and not negative.
    fn known_duration(&self) -> Option<f64> {
        self.duration().filter(|d| !d.is_nan() && *d >= 0.0)
    }
}
