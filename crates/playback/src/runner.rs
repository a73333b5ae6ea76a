//! Scenario session runner
//!
//! Drives two simulated timelines on a virtual clock. Each tick applies the
//! scenario steps that are due, advances both timelines by the tick interval
//! and then delivers the primary progress notification to the engine.

use std::time::Duration;

use contracts::{
    ContractError, ScenarioAction, ScenarioStep, SessionBlueprint, Timeline, TimelineRole,
};
use observability::SyncMetricsAggregator;
use sync_engine::{SeekOutcome, SyncEngine};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::report::{SessionReport, StepRecord, TimelineSnapshot};
use crate::timeline::SimulatedTimeline;

/// Smallest wall-clock period the paced runner will wait between ticks
const MIN_PACED_PERIOD: Duration = Duration::from_micros(100);

const MIN_SPEED: f64 = 1e-3;
const MAX_SPEED: f64 = 1e6;

const AT_EPSILON: f64 = 1e-9;

/// Scenario session runner
pub struct SessionRunner {
    engine: SyncEngine,
    /// Slot 0 starts as primary; `swap` flips `primary_slot`
    timelines: [SimulatedTimeline; 2],
    primary_slot: usize,
    /// (script index, step), ordered by `at_s`
    steps: Vec<(usize, ScenarioStep)>,
    next_step: usize,
    records: Vec<StepRecord>,
    clock: Duration,
    tick_interval: Duration,
    run_for: Duration,
    ticks: u64,
    aggregator: SyncMetricsAggregator,
}

impl SessionRunner {
    /// Build a runner from a loaded blueprint
    ///
    /// # Errors
    /// - Zero tick interval
    /// - `run_for_s` not representable as a duration
    /// - Scenario step with a non-finite `at_s`
    pub fn new(blueprint: &SessionBlueprint) -> Result<Self, ContractError> {
        let sim = &blueprint.simulation;
        if sim.tick_interval_ms == 0 {
            return Err(ContractError::config_validation(
                "simulation.tick_interval_ms",
                "tick interval must be > 0",
            ));
        }
        let run_for = Duration::try_from_secs_f64(sim.run_for_s).map_err(|e| {
            ContractError::config_validation("simulation.run_for_s", e.to_string())
        })?;

        if let Some(index) = blueprint.scenario.iter().position(|s| !s.at_s.is_finite()) {
            return Err(ContractError::scenario(index, "at_s must be finite"));
        }
        let mut steps: Vec<(usize, ScenarioStep)> =
            blueprint.scenario.iter().cloned().enumerate().collect();
        // stable: steps sharing an at_s keep file order
        steps.sort_by(|a, b| a.1.at_s.total_cmp(&b.1.at_s));

        let mut engine = SyncEngine::with_playback(blueprint.engine.clone(), &blueprint.playback);
        let mut timelines = [
            SimulatedTimeline::from_config(&blueprint.media.primary),
            SimulatedTimeline::from_config(&blueprint.media.secondary),
        ];
        {
            let [primary, secondary] = &mut timelines;
            engine.set_rate(primary, secondary, blueprint.playback.initial_rate);
        }

        info!(
            primary = %blueprint.media.primary.label,
            secondary = %blueprint.media.secondary.label,
            steps = steps.len(),
            tick_interval_ms = sim.tick_interval_ms,
            run_for_s = sim.run_for_s,
            "session runner created"
        );

        Ok(Self {
            engine,
            timelines,
            primary_slot: 0,
            steps,
            next_step: 0,
            records: Vec::new(),
            clock: Duration::ZERO,
            tick_interval: Duration::from_millis(sim.tick_interval_ms),
            run_for,
            ticks: 0,
            aggregator: SyncMetricsAggregator::new(),
        })
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn primary(&self) -> &SimulatedTimeline {
        &self.timelines[self.primary_slot]
    }

    pub fn secondary(&self) -> &SimulatedTimeline {
        &self.timelines[1 - self.primary_slot]
    }

    /// Virtual time since the session started
    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn aggregator(&self) -> &SyncMetricsAggregator {
        &self.aggregator
    }

    pub fn is_finished(&self) -> bool {
        self.clock >= self.run_for
    }

    /// Advance the session by one tick.
    ///
    /// Returns `false` once the run length is reached; steps scheduled at
    /// exactly the end are still applied.
    #[instrument(
        level = "trace",
        name = "session_tick",
        skip(self),
        fields(clock_ms = self.clock.as_millis() as u64)
    )]
    pub fn step(&mut self) -> bool {
        self.apply_due_steps();
        if self.is_finished() {
            return false;
        }

        let dt = self.tick_interval.as_secs_f64();
        for timeline in &mut self.timelines {
            timeline.advance(dt);
        }
        self.clock += self.tick_interval;
        self.ticks += 1;

        let (primary, secondary) = split(&mut self.timelines, self.primary_slot);

        // timeupdate only fires while the primary is playing
        if !primary.is_paused() {
            if let Some(action) = self.engine.tick(primary, secondary, self.clock) {
                observability::record_sync_action(&action);
                self.aggregator.update_action(&action);
            }
        }

        if let Some(target) = self.engine.secondary_target(primary.position()) {
            let drift = secondary.position() - target;
            observability::record_drift_sample(drift);
            self.aggregator.push_drift(drift);
        }

        true
    }

    /// Run the whole session on the virtual clock without waiting
    pub fn run_to_end(&mut self) -> SessionReport {
        while self.step() {}
        self.finish()
    }

    /// Run the session paced against wall-clock time.
    ///
    /// One virtual tick is taken every `tick_interval / speed` of real time.
    /// Dropping the future stops the run.
    pub async fn run_paced(&mut self, speed: f64) -> SessionReport {
        let speed = if speed.is_finite() && speed > 0.0 {
            speed.clamp(MIN_SPEED, MAX_SPEED)
        } else {
            1.0
        };
        let period = self.tick_interval.div_f64(speed).max(MIN_PACED_PERIOD);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(speed, period_ms = period.as_secs_f64() * 1000.0, "paced run started");
        loop {
            interval.tick().await;
            if !self.step() {
                break;
            }
        }
        self.finish()
    }

    /// Snapshot of the session so far
    pub fn report(&self) -> SessionReport {
        let metrics = self.aggregator.summary();
        SessionReport {
            elapsed_s: self.clock.as_secs_f64(),
            ticks: self.ticks,
            synced: self.engine.is_synced(),
            mapping: *self.engine.mapping(),
            rate: self.engine.rate(),
            primary: snapshot(self.primary()),
            secondary: snapshot(self.secondary()),
            counters: self.engine.counters(),
            steps: self.records.clone(),
            max_drift_ms: if metrics.drift_ms.count > 0 {
                metrics.drift_ms.max
            } else {
                0.0
            },
            mean_drift_ms: metrics.drift_ms.mean,
            metrics,
        }
    }

    fn finish(&self) -> SessionReport {
        let report = self.report();
        info!(
            elapsed_s = report.elapsed_s,
            ticks = report.ticks,
            corrections = report.counters.corrections,
            max_drift_ms = report.max_drift_ms,
            "session finished"
        );
        report
    }

    fn apply_due_steps(&mut self) {
        let now_s = self.clock.as_secs_f64();
        while let Some((index, step)) = self.steps.get(self.next_step) {
            if step.at_s > now_s + AT_EPSILON {
                break;
            }
            let index = *index;
            let action = step.action.clone();
            self.next_step += 1;

            let applied = self.apply(&action);
            let record = StepRecord {
                index,
                at_s: now_s,
                action: action.name(),
                primary_s: self.primary().position(),
                secondary_s: self.secondary().position(),
                applied,
            };
            debug!(
                index,
                action = record.action,
                primary_s = record.primary_s,
                secondary_s = record.secondary_s,
                applied,
                "scenario step"
            );
            self.records.push(record);
        }
    }

    /// Apply one user action; returns `false` when the action had no effect
    fn apply(&mut self, action: &ScenarioAction) -> bool {
        let now = self.clock;
        let (primary, secondary) = split(&mut self.timelines, self.primary_slot);
        let engine = &mut self.engine;

        let outcome: Option<SeekOutcome> = match *action {
            ScenarioAction::Establish => {
                let accepted = engine.establish(primary, secondary);
                observability::record_establish(accepted);
                if !accepted {
                    warn!(
                        primary = primary.label(),
                        secondary = secondary.label(),
                        "establish declined: media metadata not loaded"
                    );
                }
                return accepted;
            }
            ScenarioAction::Play { timeline } => {
                engine.set_paused(timeline, primary, secondary, false);
                None
            }
            ScenarioAction::Pause { timeline } => {
                engine.set_paused(timeline, primary, secondary, true);
                None
            }
            ScenarioAction::Seek { timeline, time_s } => {
                Some(engine.seek(timeline, primary, secondary, time_s, now))
            }
            ScenarioAction::Skip { timeline, seconds } => {
                Some(engine.skip(timeline, primary, secondary, seconds, now))
            }
            ScenarioAction::Step { seconds } => {
                Some(engine.step(primary, secondary, seconds, now))
            }
            ScenarioAction::StepFrame {
                timeline,
                direction,
            } => Some(engine.step_frame(timeline, primary, secondary, direction, now)),
            ScenarioAction::SetRate { rate } => {
                engine.set_rate(primary, secondary, rate);
                None
            }
            ScenarioAction::BumpRate { direction } => {
                engine.bump_rate(primary, secondary, direction);
                None
            }
            ScenarioAction::SetOffset { seconds } => {
                engine.set_offset(seconds);
                None
            }
            ScenarioAction::NudgeOffset { seconds } => {
                engine.nudge_offset(seconds);
                None
            }
            ScenarioAction::Swap => {
                engine.swap_roles();
                self.primary_slot = 1 - self.primary_slot;
                debug!(primary = self.primary().label(), "primary timeline swapped");
                None
            }
            ScenarioAction::Clear => {
                let was_synced = engine.is_synced();
                engine.clear();
                return was_synced;
            }
        };

        if let Some(outcome) = outcome {
            observability::record_seek(&outcome);
            if let Some(ref follow) = outcome.follow {
                observability::record_sync_action(follow);
            }
            self.aggregator.update_seek(&outcome);
        }
        true
    }
}

/// Borrow the timelines as (primary, secondary)
fn split(
    timelines: &mut [SimulatedTimeline; 2],
    primary_slot: usize,
) -> (&mut SimulatedTimeline, &mut SimulatedTimeline) {
    let [first, second] = timelines;
    if primary_slot == 0 {
        (first, second)
    } else {
        (second, first)
    }
}

fn snapshot(timeline: &SimulatedTimeline) -> TimelineSnapshot {
    TimelineSnapshot {
        label: timeline.label().to_string(),
        position_s: timeline.position(),
        duration_s: timeline.duration(),
        paused: timeline.is_paused(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        ConfigVersion, MediaConfig, MediaPair, PlaybackConfig, SimulationConfig, SyncEngineConfig,
    };

    fn media(label: &str, duration_s: f64, start_s: f64) -> MediaConfig {
        MediaConfig {
            label: label.into(),
            duration_s,
            start_s,
            clock_skew: 1.0,
            load_delay_s: 0.0,
        }
    }

    fn blueprint(steps: Vec<(f64, ScenarioAction)>) -> SessionBlueprint {
        SessionBlueprint {
            version: ConfigVersion::V1,
            engine: SyncEngineConfig::default(),
            playback: PlaybackConfig::default(),
            media: MediaPair {
                primary: media("main", 120.0, 10.0),
                secondary: media("overlay", 100.0, 5.0),
            },
            simulation: SimulationConfig {
                tick_interval_ms: 250,
                run_for_s: 10.0,
            },
            scenario: steps
                .into_iter()
                .map(|(at_s, action)| ScenarioStep { at_s, action })
                .collect(),
        }
    }

    #[test]
    fn test_establish_and_play_together() {
        let bp = blueprint(vec![(0.0, ScenarioAction::Establish)]);
        let mut runner = SessionRunner::new(&bp).unwrap();
        let report = runner.run_to_end();

        assert!(report.synced);
        assert_eq!(report.ticks, 40);
        assert!((report.primary.position_s - 20.0).abs() < 1e-9);
        assert!((report.secondary.position_s - 15.0).abs() < 1e-9);
        assert_eq!(report.counters.corrections, 0);
    }

    #[test]
    fn test_skewed_secondary_is_corrected() {
        let mut bp = blueprint(vec![(0.0, ScenarioAction::Establish)]);
        bp.media.secondary.clock_skew = 1.1;
        let report = SessionRunner::new(&bp).unwrap().run_to_end();

        assert!(report.counters.corrections > 0);
        // 每 tick 最多偏移 25ms，超过 0.5s 就被校正
        assert!(report.max_drift_ms <= 500.0 + 1e-6, "{}", report.max_drift_ms);
    }

    #[test]
    fn test_steps_applied_in_time_order() {
        let bp = blueprint(vec![
            (
                2.0,
                ScenarioAction::Seek {
                    timeline: TimelineRole::Secondary,
                    time_s: 50.0,
                },
            ),
            (0.0, ScenarioAction::Establish),
        ]);
        let report = SessionRunner::new(&bp).unwrap().run_to_end();

        assert_eq!(report.steps[0].action, "establish");
        assert_eq!(report.steps[1].action, "seek");
        assert_eq!(report.steps[0].index, 1);
        assert_eq!(report.steps[1].index, 0);
        assert!((report.steps[1].primary_s - 55.0).abs() < 1e-9);
        assert_eq!(report.counters.reanchors, 1);
    }

    #[test]
    fn test_establish_declined_while_loading() {
        let mut bp = blueprint(vec![(0.0, ScenarioAction::Establish)]);
        bp.media.secondary.load_delay_s = 1.0;
        let report = SessionRunner::new(&bp).unwrap().run_to_end();

        assert!(!report.synced);
        assert!(!report.steps[0].applied);
        assert_eq!(report.counters.declined_establish, 1);
    }

    #[test]
    fn test_swap_flips_primary() {
        let bp = blueprint(vec![
            (0.0, ScenarioAction::Establish),
            (1.0, ScenarioAction::Swap),
        ]);
        let mut runner = SessionRunner::new(&bp).unwrap();
        let report = runner.run_to_end();

        assert_eq!(report.primary.label, "overlay");
        assert_eq!(report.secondary.label, "main");
        assert_eq!(runner.primary().label(), "overlay");
        assert_eq!(report.max_drift_ms, 0.0);
    }

    #[test]
    fn test_step_at_run_end_is_applied() {
        let bp = blueprint(vec![
            (0.0, ScenarioAction::Establish),
            (10.0, ScenarioAction::Clear),
        ]);
        let report = SessionRunner::new(&bp).unwrap().run_to_end();
        assert_eq!(report.steps.len(), 2);
        assert!(!report.synced);
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let mut bp = blueprint(vec![]);
        bp.simulation.tick_interval_ms = 0;
        assert!(matches!(
            SessionRunner::new(&bp),
            Err(ContractError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_report_serializes() {
        let bp = blueprint(vec![(0.0, ScenarioAction::Establish)]);
        let report = SessionRunner::new(&bp).unwrap().run_to_end();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["synced"], true);
        assert_eq!(json["steps"][0]["action"], "establish");
        assert!(json.get("metrics").is_none());
    }

    #[tokio::test]
    async fn test_run_paced() {
        let bp = blueprint(vec![(0.0, ScenarioAction::Establish)]);
        let mut runner = SessionRunner::new(&bp).unwrap();
        let report = runner.run_paced(100.0).await;
        assert_eq!(report.ticks, 40);
        assert!(report.synced);
    }
}
