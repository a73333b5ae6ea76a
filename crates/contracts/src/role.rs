//! TimelineRole - which side of the mapping a timeline plays

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a timeline in the sync mapping.
///
/// The primary is the authoritative clock; the secondary is continuously
/// adjusted to track it. Host input (skip, frame step) also addresses a role,
/// the "active" timeline of the control surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineRole {
    #[default]
    Primary,
    Secondary,
}

impl TimelineRole {
    /// The opposite role
    #[inline]
    pub fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl fmt::Display for TimelineRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
