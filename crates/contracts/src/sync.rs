//! SyncAction / SeekOutcome - Sync Engine output
//!
//! What the engine did to the timelines, reported for logging, metrics and tests.

use serde::{Deserialize, Serialize};

use crate::TimelineRole;

/// Why a timeline was moved by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncActionKind {
    /// Continuous drift correction from a progress tick
    Correction,
    /// The other timeline followed an explicit seek
    FollowSeek,
}

impl SyncActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correction => "correction",
            Self::FollowSeek => "follow_seek",
        }
    }
}

/// A position write the engine applied to one timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncAction {
    /// Reason for the write
    pub kind: SyncActionKind,

    /// Timeline that was moved
    pub timeline: TimelineRole,

    /// Position before the write (seconds)
    pub from: f64,

    /// Requested position (seconds)
    pub to: f64,
}

impl SyncAction {
    /// Absolute distance the timeline was moved
    #[inline]
    pub fn drift(&self) -> f64 {
        (self.to - self.from).abs()
    }
}

/// Result of an explicit seek, skip or frame step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeekOutcome {
    /// Timeline the user addressed
    pub origin: TimelineRole,

    /// Position of the origin timeline after the seek
    pub position: f64,

    /// Follow-up write on the other timeline, if the mapping allowed one
    pub follow: Option<SyncAction>,

    /// New secondary anchor, when the seek re-anchored the mapping
    pub reanchored: Option<f64>,
}
