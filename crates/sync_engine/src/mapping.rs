//! Affine time mapping between the primary and secondary timelines.
//!
//! While active, the intended secondary position for primary position `p` is
//! `anchor_secondary + (p - anchor_primary) + offset`.

use contracts::Timeline;
use serde::{Deserialize, Serialize};

/// Mapping lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingState {
    /// No anchor pair recorded yet (or cleared by the host)
    Unestablished,
    /// Secondary is locked to primary
    Active,
}

/// Anchor pair plus fixed offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncMapping {
    /// Primary position when sync was established
    pub anchor_primary: f64,
    /// Secondary position at that same moment (moved by re-anchoring)
    pub anchor_secondary: f64,
    /// Manual delay added to every mapped target
    pub offset: f64,
    /// Whether sync is enforced
    pub active: bool,
}

impl SyncMapping {
    /// Snapshot both timelines into a new active mapping.
    ///
    /// Returns `None` when either duration is still unknown.
    pub fn establish<P, S>(primary: &P, secondary: &S) -> Option<Self>
    where
        P: Timeline + ?Sized,
        S: Timeline + ?Sized,
    {
        primary.known_duration()?;
        secondary.known_duration()?;

        Some(Self {
            anchor_primary: primary.position(),
            anchor_secondary: secondary.position(),
            offset: 0.0,
            active: true,
        })
    }

    pub fn state(&self) -> MappingState {
        if self.active {
            MappingState::Active
        } else {
            MappingState::Unestablished
        }
    }

    /// Secondary position implied by a primary position
    #[inline]
    pub fn secondary_target(&self, primary_position: f64) -> f64 {
        (primary_position - self.anchor_primary) + self.anchor_secondary + self.offset
    }

    /// Primary position implied by a secondary position (inverse map)
    #[inline]
    pub fn primary_target(&self, secondary_position: f64) -> f64 {
        secondary_position - self.anchor_secondary - self.offset + self.anchor_primary
    }

    /// Move the secondary anchor so that `secondary_position` maps exactly
    /// from the primary position that was actually reached.
    ///
    /// Returns the new secondary anchor.
    pub fn reanchor(&mut self, secondary_position: f64, primary_position: f64) -> f64 {
        self.anchor_secondary =
            secondary_position - (primary_position - self.anchor_primary) - self.offset;
        self.anchor_secondary
    }

    /// The same alignment seen from the other side: the old secondary becomes
    /// the primary.
    pub fn inverted(&self) -> Self {
        Self {
            anchor_primary: self.anchor_secondary,
            anchor_secondary: self.anchor_primary,
            offset: -self.offset,
            active: self.active,
        }
    }
}
