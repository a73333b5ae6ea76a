//! # Sync Engine
//!
//! Dual-timeline synchronization engine.
//!
//! Responsibilities:
//! - Affine primary → secondary time mapping (anchor pair + offset)
//! - Continuous drift correction with threshold and throttle
//! - Discrete re-anchoring on seeks and frame steps
//! - Lockstep playback rate and coupled play/pause
//!
//! ## Usage
//!
//! ```ignore
//! use sync_engine::{SyncEngine, SyncEngineConfig};
//!
//! let mut engine = SyncEngine::new(SyncEngineConfig::default());
//! engine.establish(&mut main_video, &mut overlay_video);
//!
//! // On every timeupdate of the primary
//! if let Some(action) = engine.tick(&main_video, &mut overlay_video, now) {
//!     tracing::debug!(drift = action.drift(), "corrected");
//! }
//! ```

mod clamp;
mod corrector;
mod engine;
mod mapping;
mod rate;
mod reanchor;
mod throttle;

#[cfg(test)]
mod test_support;

// Re-exports
pub use clamp::{clamp_to_duration, past_end, within_duration};
pub use corrector::{correct, tick, CorrectorParams, TickSkip};
pub use engine::{EngineCounters, SyncEngine};
pub use mapping::{MappingState, SyncMapping};
pub use rate::RateControl;
pub use reanchor::{seek_on_primary, seek_on_secondary, step};
pub use throttle::CorrectionThrottle;

// Re-export contracts types
pub use contracts::{
    OverrunPolicy, PlaybackConfig, SeekOutcome, SyncAction, SyncActionKind, SyncEngineConfig,
    Timeline, TimelineRole,
};
