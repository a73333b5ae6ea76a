//! Continuous drift corrector.
//!
//! Runs on every primary progress notification and nudges the secondary to
//! the mapped target once drift exceeds the threshold, at most once per
//! throttle interval.

use std::time::Duration;

use contracts::{OverrunPolicy, SyncAction, SyncActionKind, Timeline, TimelineRole};

use crate::clamp::past_end;
use crate::mapping::SyncMapping;
use crate::throttle::CorrectionThrottle;

/// Why a tick did not correct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickSkip {
    /// Mapping not established
    Inactive,
    /// Primary is not playing
    PrimaryPaused,
    /// Mapped target is before the start of the secondary
    NegativeTarget,
    /// Drift is within the threshold
    WithinThreshold,
    /// A write happened less than one interval ago
    Throttled,
    /// Target is past the secondary's end and the policy skips it
    Overrun,
}

impl TickSkip {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::PrimaryPaused => "primary_paused",
            Self::NegativeTarget => "negative_target",
            Self::WithinThreshold => "within_threshold",
            Self::Throttled => "throttled",
            Self::Overrun => "overrun",
        }
    }
}

/// Corrector tuning
#[derive(Debug, Clone, Copy)]
pub struct CorrectorParams {
    pub threshold_s: f64,
    pub overrun: OverrunPolicy,
}

/// Evaluate one progress tick and apply the correction if it is due.
pub fn correct<P, S>(
    mapping: &SyncMapping,
    throttle: &mut CorrectionThrottle,
    params: CorrectorParams,
    primary: &P,
    secondary: &mut S,
    now: Duration,
) -> Result<SyncAction, TickSkip>
where
    P: Timeline + ?Sized,
    S: Timeline + ?Sized,
{
    if !mapping.active {
        return Err(TickSkip::Inactive);
    }
    if primary.is_paused() {
        return Err(TickSkip::PrimaryPaused);
    }

    let mut target = mapping.secondary_target(primary.position());
    if target.is_nan() || target < 0.0 {
        return Err(TickSkip::NegativeTarget);
    }

    let secondary_duration = secondary.known_duration();
    if past_end(target, secondary_duration) {
        match params.overrun {
            OverrunPolicy::Skip => return Err(TickSkip::Overrun),
            OverrunPolicy::PassThrough => {}
            OverrunPolicy::Clamp => {
                if let Some(end) = secondary_duration {
                    target = end;
                }
            }
        }
    }

    let current = secondary.position();
    if (current - target).abs() <= params.threshold_s {
        return Err(TickSkip::WithinThreshold);
    }
    if !throttle.ready(now) {
        return Err(TickSkip::Throttled);
    }

    secondary.seek(target);
    throttle.mark(now);

    Ok(SyncAction {
        kind: SyncActionKind::Correction,
        timeline: TimelineRole::Secondary,
        from: current,
        to: target,
    })
}

/// `correct` with the skip reason discarded.
pub fn tick<P, S>(
    mapping: &SyncMapping,
    throttle: &mut CorrectionThrottle,
    params: CorrectorParams,
    primary: &P,
    secondary: &mut S,
    now: Duration,
) -> Option<SyncAction>
where
    P: Timeline + ?Sized,
    S: Timeline + ?Sized,
{
    correct(mapping, throttle, params, primary, secondary, now).ok()
}
