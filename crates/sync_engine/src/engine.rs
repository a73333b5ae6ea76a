//! Main sync engine implementation.

use std::time::Duration;

use contracts::{
    PlaybackConfig, SeekOutcome, SyncAction, SyncEngineConfig, Timeline, TimelineRole,
};
use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::clamp::clamp_to_duration;
use crate::corrector::{self, CorrectorParams, TickSkip};
use crate::mapping::{MappingState, SyncMapping};
use crate::rate::RateControl;
use crate::reanchor;
use crate::throttle::CorrectionThrottle;

/// Counters kept by the engine for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineCounters {
    /// Ticks evaluated
    pub ticks: u64,
    /// Continuous corrections applied
    pub corrections: u64,
    /// Ticks suppressed by the throttle
    pub throttled: u64,
    /// Follow-up writes after explicit seeks
    pub follow_seeks: u64,
    /// Secondary-side re-anchors
    pub reanchors: u64,
    /// Establish attempts declined for unknown durations
    pub declined_establish: u64,
}

/// Dual-timeline synchronization engine
///
/// Owns the mapping and the throttle; every operation takes the two
/// timelines explicitly, primary first.
#[derive(Debug)]
pub struct SyncEngine {
    config: SyncEngineConfig,
    mapping: SyncMapping,
    throttle: CorrectionThrottle,
    rates: RateControl,
    counters: EngineCounters,
}

impl SyncEngine {
    /// Create a new sync engine with the given configuration
    pub fn new(config: SyncEngineConfig) -> Self {
        Self::with_playback(config, &PlaybackConfig::default())
    }

    /// Create a sync engine with custom rate presets
    pub fn with_playback(config: SyncEngineConfig, playback: &PlaybackConfig) -> Self {
        let throttle = CorrectionThrottle::from_millis(config.interval_ms);
        let rates = RateControl::new(&playback.rate_presets, playback.initial_rate);
        Self {
            config,
            mapping: SyncMapping::default(),
            throttle,
            rates,
            counters: EngineCounters::default(),
        }
    }

    pub fn config(&self) -> &SyncEngineConfig {
        &self.config
    }

    pub fn mapping(&self) -> &SyncMapping {
        &self.mapping
    }

    pub fn state(&self) -> MappingState {
        self.mapping.state()
    }

    pub fn is_synced(&self) -> bool {
        self.mapping.active
    }

    pub fn counters(&self) -> EngineCounters {
        self.counters
    }

    pub fn rate(&self) -> f64 {
        self.rates.current()
    }

    /// Secondary position the mapping wants for `primary_position`
    pub fn secondary_target(&self, primary_position: f64) -> Option<f64> {
        self.mapping
            .active
            .then(|| self.mapping.secondary_target(primary_position))
    }

    /// Record the anchor pair from the current positions.
    ///
    /// Declines (returns `false`) until both durations are known. With
    /// `autoplay_on_establish` the secondary is re-seeked to its anchor and
    /// both timelines are started.
    pub fn establish<P, S>(&mut self, primary: &mut P, secondary: &mut S) -> bool
    where
        P: Timeline + ?Sized,
        S: Timeline + ?Sized,
    {
        let Some(mapping) = SyncMapping::establish(primary, secondary) else {
            self.counters.declined_establish += 1;
            debug!(
                primary = primary.label(),
                secondary = secondary.label(),
                "establish declined: duration unknown"
            );
            return false;
        };

        self.mapping = mapping;

        if self.config.autoplay_on_establish {
            secondary.seek(mapping.anchor_secondary);
            if primary.is_paused() {
                primary.play();
            }
            secondary.play();
        }

        metrics::counter!("dualsync_establish_total").increment(1);
        debug!(
            anchor_primary = mapping.anchor_primary,
            anchor_secondary = mapping.anchor_secondary,
            "sync established"
        );
        true
    }

    /// Drop the mapping; timelines keep playing independently.
    pub fn clear(&mut self) {
        if self.mapping.active {
            debug!("sync cleared");
        }
        self.mapping.active = false;
    }

    /// Continuous correction, called on every primary progress notification.
    #[instrument(
        level = "trace",
        name = "sync_engine_tick",
        skip(self, primary, secondary),
        fields(now_ms = now.as_millis() as u64)
    )]
    pub fn tick<P, S>(
        &mut self,
        primary: &P,
        secondary: &mut S,
        now: Duration,
    ) -> Option<SyncAction>
    where
        P: Timeline + ?Sized,
        S: Timeline + ?Sized,
    {
        self.counters.ticks += 1;
        let params = CorrectorParams {
            threshold_s: self.config.threshold_s,
            overrun: self.config.overrun,
        };

        match corrector::correct(
            &self.mapping,
            &mut self.throttle,
            params,
            primary,
            secondary,
            now,
        ) {
            Ok(action) => {
                self.counters.corrections += 1;
                metrics::counter!("dualsync_corrections_total").increment(1);
                metrics::histogram!("dualsync_correction_drift_seconds").record(action.drift());
                debug!(
                    from = action.from,
                    to = action.to,
                    drift = action.drift(),
                    "secondary corrected"
                );
                Some(action)
            }
            Err(skip) => {
                if skip == TickSkip::Throttled {
                    self.counters.throttled += 1;
                }
                if !matches!(skip, TickSkip::Inactive | TickSkip::PrimaryPaused) {
                    metrics::counter!("dualsync_ticks_skipped_total", "reason" => skip.as_str())
                        .increment(1);
                }
                trace!(reason = skip.as_str(), "tick skipped");
                None
            }
        }
    }

    /// Explicit seek on either timeline (progress-bar click).
    ///
    /// The requested time is clamped to the addressed timeline's bounds.
    pub fn seek<P, S>(
        &mut self,
        role: TimelineRole,
        primary: &mut P,
        secondary: &mut S,
        seconds: f64,
        now: Duration,
    ) -> SeekOutcome
    where
        P: Timeline + ?Sized,
        S: Timeline + ?Sized,
    {
        let outcome = match role {
            TimelineRole::Primary => {
                let t = clamp_to_duration(seconds, primary.known_duration());
                reanchor::seek_on_primary(
                    &self.mapping,
                    &mut self.throttle,
                    primary,
                    secondary,
                    t,
                    now,
                )
            }
            TimelineRole::Secondary => {
                let t = clamp_to_duration(seconds, secondary.known_duration());
                reanchor::seek_on_secondary(
                    &mut self.mapping,
                    &mut self.throttle,
                    primary,
                    secondary,
                    t,
                    now,
                )
            }
        };
        self.record_seek(&outcome);
        outcome
    }

    /// Relative skip on the active timeline (keyboard arrows).
    pub fn skip<P, S>(
        &mut self,
        role: TimelineRole,
        primary: &mut P,
        secondary: &mut S,
        seconds: f64,
        now: Duration,
    ) -> SeekOutcome
    where
        P: Timeline + ?Sized,
        S: Timeline + ?Sized,
    {
        let from = match role {
            TimelineRole::Primary => primary.position(),
            TimelineRole::Secondary => secondary.position(),
        };
        self.seek(role, primary, secondary, from + seconds, now)
    }

    /// Primary-relative step: pauses both and moves by `delta` seconds.
    pub fn step<P, S>(
        &mut self,
        primary: &mut P,
        secondary: &mut S,
        delta: f64,
        now: Duration,
    ) -> SeekOutcome
    where
        P: Timeline + ?Sized,
        S: Timeline + ?Sized,
    {
        let outcome = reanchor::step(
            &self.mapping,
            &mut self.throttle,
            primary,
            secondary,
            delta,
            now,
        );
        self.record_seek(&outcome);
        outcome
    }

    /// Frame step on the active timeline: pauses both, moves one frame.
    pub fn step_frame<P, S>(
        &mut self,
        role: TimelineRole,
        primary: &mut P,
        secondary: &mut S,
        direction: i32,
        now: Duration,
    ) -> SeekOutcome
    where
        P: Timeline + ?Sized,
        S: Timeline + ?Sized,
    {
        let delta = if direction >= 0 {
            self.config.frame_step_s
        } else {
            -self.config.frame_step_s
        };

        match role {
            TimelineRole::Primary => self.step(primary, secondary, delta, now),
            TimelineRole::Secondary => {
                primary.pause();
                secondary.pause();
                self.skip(role, primary, secondary, delta, now)
            }
        }
    }

    /// Play or pause one timeline; the other follows while synced.
    pub fn set_paused<P, S>(
        &mut self,
        role: TimelineRole,
        primary: &mut P,
        secondary: &mut S,
        paused: bool,
    ) where
        P: Timeline + ?Sized,
        S: Timeline + ?Sized,
    {
        let couple = self.mapping.active && self.config.couple_playback;

        match (role, couple) {
            (TimelineRole::Primary, false) => set_state(primary, paused),
            (TimelineRole::Secondary, false) => set_state(secondary, paused),
            (_, true) => {
                set_state(primary, paused);
                set_state(secondary, paused);
            }
        }
        debug!(timeline = %role, paused, coupled = couple, "playback state changed");
    }

    /// Replace the manual delay
    pub fn set_offset(&mut self, seconds: f64) {
        if seconds.is_finite() {
            self.mapping.offset = seconds;
            metrics::gauge!("dualsync_offset_seconds").set(seconds);
        }
    }

    /// Adjust the manual delay by `delta` seconds
    pub fn nudge_offset(&mut self, delta: f64) {
        self.set_offset(self.mapping.offset + delta);
    }

    /// Swap which timeline is primary.
    ///
    /// The mapping is inverted so the same position pairs stay aligned; the
    /// host must pass the timelines in swapped order from now on.
    pub fn swap_roles(&mut self) {
        self.mapping = self.mapping.inverted();
        debug!(
            anchor_primary = self.mapping.anchor_primary,
            anchor_secondary = self.mapping.anchor_secondary,
            offset = self.mapping.offset,
            "timeline roles swapped"
        );
    }

    /// Set the shared playback rate on both timelines
    pub fn set_rate<P, S>(&mut self, primary: &mut P, secondary: &mut S, rate: f64) -> f64
    where
        P: Timeline + ?Sized,
        S: Timeline + ?Sized,
    {
        let applied = self.rates.set(rate);
        self.rates.apply(primary, secondary);
        metrics::gauge!("dualsync_playback_rate").set(applied);
        applied
    }

    /// Step the shared playback rate to the neighbouring preset
    pub fn bump_rate<P, S>(&mut self, primary: &mut P, secondary: &mut S, direction: i32) -> f64
    where
        P: Timeline + ?Sized,
        S: Timeline + ?Sized,
    {
        let applied = self.rates.bump(direction);
        self.rates.apply(primary, secondary);
        metrics::gauge!("dualsync_playback_rate").set(applied);
        debug!(rate = applied, "playback rate bumped");
        applied
    }

    fn record_seek(&mut self, outcome: &SeekOutcome) {
        metrics::counter!("dualsync_seeks_total", "origin" => outcome.origin.as_str())
            .increment(1);
        if outcome.follow.is_some() {
            self.counters.follow_seeks += 1;
        }
        if outcome.reanchored.is_some() {
            self.counters.reanchors += 1;
        }
        debug!(
            origin = %outcome.origin,
            position = outcome.position,
            follow_to = ?outcome.follow.map(|a| a.to),
            reanchored = ?outcome.reanchored,
            "seek applied"
        );
    }
}

fn set_state<T: Timeline + ?Sized>(timeline: &mut T, paused: bool) {
    if paused {
        timeline.pause();
    } else {
        timeline.play();
    }
}
