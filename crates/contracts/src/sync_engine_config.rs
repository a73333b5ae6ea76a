//! Sync engine configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default drift threshold before a correction fires (seconds)
pub const DEFAULT_SYNC_THRESHOLD_S: f64 = 0.5;

/// Default minimum interval between corrections (milliseconds)
pub const DEFAULT_SYNC_INTERVAL_MS: u64 = 100;

/// Default frame step (seconds), approximate 30 fps
pub const DEFAULT_FRAME_STEP_S: f64 = 1.0 / 30.0;

/// Rate presets used when none are configured
pub const FALLBACK_RATE_PRESETS: [f64; 5] = [1.0, 1.25, 1.5, 1.75, 2.0];

/// Sync engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SyncEngineConfig {
    /// Drift (seconds) that must be exceeded before a continuous correction fires
    #[serde(default = "default_threshold")]
    #[validate(range(exclusive_min = 0.0, max = 60.0))]
    pub threshold_s: f64,

    /// Minimum time between corrections (milliseconds)
    #[serde(default = "default_interval")]
    #[validate(range(max = 60_000))]
    pub interval_ms: u64,

    /// Frame step size (seconds)
    #[serde(default = "default_frame_step")]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub frame_step_s: f64,

    /// What the continuous corrector does with a target past the secondary's end
    #[serde(default)]
    pub overrun: OverrunPolicy,

    /// Re-seek the secondary to its anchor and start both timelines on establish
    #[serde(default = "default_true")]
    pub autoplay_on_establish: bool,

    /// Propagate play/pause from one timeline to the other while synced
    #[serde(default = "default_true")]
    pub couple_playback: bool,
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self {
            threshold_s: DEFAULT_SYNC_THRESHOLD_S,
            interval_ms: DEFAULT_SYNC_INTERVAL_MS,
            frame_step_s: DEFAULT_FRAME_STEP_S,
            overrun: OverrunPolicy::default(),
            autoplay_on_establish: true,
            couple_playback: true,
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_SYNC_THRESHOLD_S
}

fn default_interval() -> u64 {
    DEFAULT_SYNC_INTERVAL_MS
}

fn default_frame_step() -> f64 {
    DEFAULT_FRAME_STEP_S
}

fn default_true() -> bool {
    true
}

/// Continuous-path handling of a target beyond the secondary duration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrunPolicy {
    /// Leave the secondary where it is
    #[default]
    Skip,
    /// Write the target as-is and let the media clamp or stall
    PassThrough,
    /// Clamp to the secondary duration, like the discrete seek path
    Clamp,
}

/// Playback rate configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlaybackConfig {
    /// Selectable rate presets (sorted and de-duplicated at load)
    #[serde(default = "default_rate_presets")]
    #[validate(length(min = 1, max = 32))]
    pub rate_presets: Vec<f64>,

    /// Rate applied to both timelines at session start
    #[serde(default = "default_initial_rate")]
    #[validate(range(exclusive_min = 0.0, max = 16.0))]
    pub initial_rate: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            rate_presets: default_rate_presets(),
            initial_rate: default_initial_rate(),
        }
    }
}

fn default_rate_presets() -> Vec<f64> {
    FALLBACK_RATE_PRESETS.to_vec()
}

fn default_initial_rate() -> f64 {
    1.0
}
