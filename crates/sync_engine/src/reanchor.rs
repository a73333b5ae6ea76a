//! Discrete re-anchor: explicit seeks and frame steps.
//!
//! These apply immediately instead of waiting for the next tick, and mark the
//! shared throttle so a stale tick cannot overwrite them.
//!
//! Primary-side seeks leave the anchors alone; secondary-side seeks move the
//! secondary anchor to whatever the primary actually reached.

use std::time::Duration;

use contracts::{SeekOutcome, SyncAction, SyncActionKind, Timeline, TimelineRole};

use crate::clamp::clamp_to_duration;
use crate::mapping::SyncMapping;
use crate::throttle::CorrectionThrottle;

/// Seek the primary and bring the secondary along.
///
/// `seconds` is expected to be pre-clamped to the primary's bounds.
pub fn seek_on_primary<P, S>(
    mapping: &SyncMapping,
    throttle: &mut CorrectionThrottle,
    primary: &mut P,
    secondary: &mut S,
    seconds: f64,
    now: Duration,
) -> SeekOutcome
where
    P: Timeline + ?Sized,
    S: Timeline + ?Sized,
{
    primary.seek(seconds);

    let mut follow = None;
    if mapping.active {
        let target = mapping.secondary_target(seconds);
        if target.is_finite() && target >= 0.0 {
            let to = clamp_to_duration(target, secondary.known_duration());
            let from = secondary.position();
            secondary.seek(to);
            throttle.mark(now);
            follow = Some(SyncAction {
                kind: SyncActionKind::FollowSeek,
                timeline: TimelineRole::Secondary,
                from,
                to,
            });
        }
    }

    SeekOutcome {
        origin: TimelineRole::Primary,
        position: primary.position(),
        follow,
        reanchored: None,
    }
}

/// Seek the secondary, pull the primary to the inverse-mapped time and
/// re-anchor.
///
/// The primary only moves when its duration is known and positive.
pub fn seek_on_secondary<P, S>(
    mapping: &mut SyncMapping,
    throttle: &mut CorrectionThrottle,
    primary: &mut P,
    secondary: &mut S,
    seconds: f64,
    now: Duration,
) -> SeekOutcome
where
    P: Timeline + ?Sized,
    S: Timeline + ?Sized,
{
    secondary.seek(seconds);

    if !mapping.active {
        return SeekOutcome {
            origin: TimelineRole::Secondary,
            position: secondary.position(),
            follow: None,
            reanchored: None,
        };
    }

    let mut follow = None;
    let primary_target = mapping.primary_target(seconds);
    if primary_target.is_finite() {
        if let Some(end) = primary.known_duration().filter(|d| *d > 0.0) {
            let to = clamp_to_duration(primary_target, Some(end));
            let from = primary.position();
            primary.seek(to);
            follow = Some(SyncAction {
                kind: SyncActionKind::FollowSeek,
                timeline: TimelineRole::Primary,
                from,
                to,
            });
        }
    }

    let anchor = mapping.reanchor(seconds, primary.position());
    throttle.mark(now);

    SeekOutcome {
        origin: TimelineRole::Secondary,
        position: secondary.position(),
        follow,
        reanchored: Some(anchor),
    }
}

/// Pause both timelines and move the primary by `delta` seconds.
pub fn step<P, S>(
    mapping: &SyncMapping,
    throttle: &mut CorrectionThrottle,
    primary: &mut P,
    secondary: &mut S,
    delta: f64,
    now: Duration,
) -> SeekOutcome
where
    P: Timeline + ?Sized,
    S: Timeline + ?Sized,
{
    primary.pause();
    secondary.pause();

    let target = clamp_to_duration(primary.position() + delta, primary.known_duration());
    seek_on_primary(mapping, throttle, primary, secondary, target, now)
}
