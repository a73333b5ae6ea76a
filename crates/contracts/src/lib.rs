//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Media positions and durations are seconds (`f64`)
//! - Host wall-clock is a `std::time::Duration` since an arbitrary epoch,
//!   passed explicitly into every operation that needs it
//! - An unknown duration (metadata not loaded yet) is `None`

mod blueprint;
mod error;
mod role;
mod sync;
mod sync_engine_config;
mod timeline;

pub use blueprint::*;
pub use error::*;
pub use role::TimelineRole;
pub use sync::*;
pub use sync_engine_config::*;
pub use timeline::Timeline;
