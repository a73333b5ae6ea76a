//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 同步引擎 + 模拟时间轴的场景测试
//! - 配置文件驱动的会话 e2e 测试

#[cfg(test)]
mod contract_tests {
    use contracts::{ScenarioAction, ScenarioStep, SyncEngineConfig, TimelineRole};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_engine_defaults_snapshot() {
        let config = SyncEngineConfig::default();
        assert_eq!(config.threshold_s, 0.5);
        assert_eq!(config.interval_ms, 100);
        assert!((config.frame_step_s - 1.0 / 30.0).abs() < 1e-12);
        assert!(config.autoplay_on_establish);
        assert!(config.couple_playback);
    }

    #[test]
    fn test_scenario_step_json_shape() {
        let step = ScenarioStep {
            at_s: 2.0,
            action: ScenarioAction::Seek {
                timeline: TimelineRole::Secondary,
                time_s: 95.0,
            },
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "at_s": 2.0,
                "action": "seek",
                "timeline": "secondary",
                "time_s": 95.0
            })
        );
    }
}

#[cfg(test)]
mod engine_scenarios {
    use std::time::Duration;

    use contracts::Timeline;
    use playback::SimulatedTimeline;
    use sync_engine::{SyncEngine, SyncEngineConfig, TimelineRole};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// 主 120s / 副 100s，在 10s / 5s 处建立同步
    fn established() -> (SyncEngine, SimulatedTimeline, SimulatedTimeline) {
        let mut engine = SyncEngine::new(SyncEngineConfig::default());
        let mut primary = SimulatedTimeline::new("main", 120.0, 10.0);
        let mut secondary = SimulatedTimeline::new("overlay", 100.0, 5.0);
        assert!(engine.establish(&mut primary, &mut secondary));
        (engine, primary, secondary)
    }

    #[test]
    fn test_tick_corrects_to_mapped_target() {
        let (mut engine, mut primary, mut secondary) = established();
        primary.seek(50.0);

        let action = engine.tick(&primary, &mut secondary, ms(1_000)).unwrap();
        assert_eq!(action.to, 45.0);
        assert_eq!(secondary.position(), 45.0);
    }

    #[test]
    fn test_secondary_seek_pulls_primary() {
        let (mut engine, mut primary, mut secondary) = established();
        let outcome = engine.seek(
            TimelineRole::Secondary,
            &mut primary,
            &mut secondary,
            95.0,
            ms(0),
        );

        assert_eq!(primary.position(), 100.0);
        assert_eq!(outcome.reanchored, Some(5.0));
        assert_eq!(engine.mapping().anchor_secondary, 5.0);
    }

    #[test]
    fn test_secondary_seek_near_end() {
        let (mut engine, mut primary, mut secondary) = established();
        engine.seek(
            TimelineRole::Secondary,
            &mut primary,
            &mut secondary,
            99.0,
            ms(0),
        );
        assert_eq!(primary.position(), 104.0);
        assert_eq!(secondary.position(), 99.0);
    }

    #[test]
    fn test_reanchor_absorbs_primary_clamp() {
        // 副轴跳转到的位置对应的主轴目标超出主轴时长
        let mut engine = SyncEngine::new(SyncEngineConfig::default());
        let mut primary = SimulatedTimeline::new("main", 60.0, 40.0);
        let mut secondary = SimulatedTimeline::new("overlay", 100.0, 5.0);
        assert!(engine.establish(&mut primary, &mut secondary));

        engine.seek(
            TimelineRole::Secondary,
            &mut primary,
            &mut secondary,
            80.0,
            ms(0),
        );
        assert_eq!(primary.position(), 60.0);
        // 80 - (60 - 40) = 60
        assert_eq!(engine.mapping().anchor_secondary, 60.0);
        assert_eq!(engine.secondary_target(primary.position()), Some(80.0));
    }

    #[test]
    fn test_primary_seek_is_affine() {
        let (mut engine, mut primary, mut secondary) = established();
        for t in [0.0, 5.0, 17.5, 60.0, 104.0, 120.0] {
            engine.seek(TimelineRole::Primary, &mut primary, &mut secondary, t, ms(0));
            let expected = t - 10.0 + 5.0;
            if expected >= 0.0 {
                assert_eq!(secondary.position(), expected.min(100.0), "t = {t}");
            }
        }
        assert_eq!(engine.mapping().anchor_primary, 10.0);
        assert_eq!(engine.mapping().anchor_secondary, 5.0);
    }

    #[test]
    fn test_negative_target_leaves_secondary() {
        let (mut engine, mut primary, mut secondary) = established();
        secondary.seek(30.0);
        let outcome = engine.seek(TimelineRole::Primary, &mut primary, &mut secondary, 2.0, ms(0));
        assert!(outcome.follow.is_none());
        assert_eq!(secondary.position(), 30.0);
    }

    #[test]
    fn test_tick_idempotent_for_same_now() {
        let (mut engine, mut primary, mut secondary) = established();
        primary.seek(70.0);
        assert!(engine.tick(&primary, &mut secondary, ms(500)).is_some());
        let after = secondary.position();
        assert!(engine.tick(&primary, &mut secondary, ms(500)).is_none());
        assert_eq!(secondary.position(), after);
    }

    #[test]
    fn test_threshold_boundary() {
        let (mut engine, mut primary, mut secondary) = established();
        primary.seek(50.0);

        secondary.seek(45.5);
        assert!(engine.tick(&primary, &mut secondary, ms(1_000)).is_none());

        secondary.seek(45.5 + 1e-6);
        assert!(engine.tick(&primary, &mut secondary, ms(1_000)).is_some());
    }

    #[test]
    fn test_reanchor_round_trip() {
        let (mut engine, mut primary, mut secondary) = established();
        engine.set_offset(0.75);
        engine.seek(
            TimelineRole::Secondary,
            &mut primary,
            &mut secondary,
            42.0,
            ms(0),
        );
        let target = engine.secondary_target(primary.position()).unwrap();
        assert!((target - secondary.position()).abs() < 1e-9);
    }

    #[test]
    fn test_continuous_path_never_overruns() {
        let (mut engine, mut primary, mut secondary) = established();
        primary.seek(115.0);
        secondary.seek(90.0);
        // 目标 110 > 副轴时长 100：默认策略不写入
        assert!(engine.tick(&primary, &mut secondary, ms(1_000)).is_none());
        assert_eq!(secondary.position(), 90.0);
    }

    #[test]
    fn test_discrete_seek_within_throttle_blocks_tick() {
        let (mut engine, mut primary, mut secondary) = established();
        engine.seek(TimelineRole::Primary, &mut primary, &mut secondary, 60.0, ms(5_000));
        secondary.seek(40.0);

        assert!(engine.tick(&primary, &mut secondary, ms(5_100)).is_none());
        assert!(engine.tick(&primary, &mut secondary, ms(5_101)).is_some());
        assert_eq!(secondary.position(), 55.0);
    }

    #[test]
    fn test_step_frame_pauses_and_moves_both() {
        let (mut engine, mut primary, mut secondary) = established();
        engine.step_frame(TimelineRole::Primary, &mut primary, &mut secondary, 1, ms(0));

        assert!(primary.is_paused());
        assert!(secondary.is_paused());
        assert!((primary.position() - (10.0 + 1.0 / 30.0)).abs() < 1e-9);
        assert!((secondary.position() - (5.0 + 1.0 / 30.0)).abs() < 1e-9);
    }
}

#[cfg(test)]
mod session_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::Timeline;
    use playback::SessionRunner;

    const SESSION: &str = r#"
[engine]
threshold_s = 0.5
interval_ms = 100

[playback]
rate_presets = [1.0, 1.25, 1.5, 1.75, 2.0]

[media.primary]
label = "main"
duration_s = 120.0
start_s = 10.0

[media.secondary]
label = "overlay"
duration_s = 100.0
start_s = 5.0
clock_skew = 1.05
load_delay_s = 0.5

[simulation]
tick_interval_ms = 250
run_for_s = 40.0

[[scenario]]
at_s = 1.0
action = "establish"

[[scenario]]
at_s = 5.0
action = "bump_rate"
direction = 1

[[scenario]]
at_s = 10.0
action = "seek"
timeline = "secondary"
time_s = 40.0

[[scenario]]
at_s = 20.0
action = "nudge_offset"
seconds = 0.25

[[scenario]]
at_s = 30.0
action = "swap"
"#;

    #[test]
    fn test_drift_bounded_after_establish() {
        let blueprint = ConfigLoader::load_from_str(SESSION, ConfigFormat::Toml).unwrap();
        let report = SessionRunner::new(&blueprint).unwrap().run_to_end();

        assert!(report.synced);
        assert_eq!(report.steps.len(), 5);
        assert!(report.steps.iter().all(|s| s.applied));
        assert!(report.counters.corrections > 0);
        assert!(
            report.max_drift_ms <= 500.0 + 1e-6,
            "max drift {}ms",
            report.max_drift_ms
        );
        assert_eq!(report.rate, 1.25);
        assert_eq!(report.primary.label, "overlay");
    }

    #[test]
    fn test_seek_step_reanchors() {
        let blueprint = ConfigLoader::load_from_str(SESSION, ConfigFormat::Toml).unwrap();
        let report = SessionRunner::new(&blueprint).unwrap().run_to_end();

        let seek = report.steps.iter().find(|s| s.action == "seek").unwrap();
        assert_eq!(seek.secondary_s, 40.0);
        assert_eq!(seek.primary_s, 45.0);
        assert_eq!(report.counters.reanchors, 1);
        assert_eq!(report.counters.follow_seeks, 1);
    }

    #[test]
    fn test_early_establish_declined() {
        let content = SESSION.replace(
            "at_s = 1.0\naction = \"establish\"",
            "at_s = 0.0\naction = \"establish\"",
        );
        let blueprint = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap();
        let report = SessionRunner::new(&blueprint).unwrap().run_to_end();

        assert!(!report.steps[0].applied);
        assert_eq!(report.counters.declined_establish, 1);
        assert!(!report.synced);
    }

    #[test]
    fn test_pause_couples_while_synced() {
        let content = format!(
            "{SESSION}\n[[scenario]]\nat_s = 35.0\naction = \"pause\"\ntimeline = \"secondary\"\n"
        );
        let blueprint = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap();
        let mut runner = SessionRunner::new(&blueprint).unwrap();
        let report = runner.run_to_end();

        assert!(report.primary.paused);
        assert!(report.secondary.paused);
        assert!(runner.engine().is_synced());
        assert!(runner.primary().is_paused());
    }

    #[test]
    fn test_demo_session_file() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../demos/lecture.toml");
        let blueprint = ConfigLoader::load_from_path(&path).unwrap();
        let report = SessionRunner::new(&blueprint).unwrap().run_to_end();

        assert_eq!(report.steps.len(), 10);
        assert!(report.steps.iter().all(|s| s.applied));
        assert!(!report.synced);
        assert_eq!(report.primary.label, "slides");
        assert_eq!(report.counters.reanchors, 1);
    }

    #[tokio::test]
    async fn test_paced_session_matches_virtual() {
        let mut blueprint = ConfigLoader::load_from_str(SESSION, ConfigFormat::Toml).unwrap();
        blueprint.simulation.run_for_s = 5.0;

        let flat = SessionRunner::new(&blueprint).unwrap().run_to_end();
        let paced = SessionRunner::new(&blueprint)
            .unwrap()
            .run_paced(200.0)
            .await;

        assert_eq!(flat.ticks, paced.ticks);
        assert_eq!(flat.primary.position_s, paced.primary.position_s);
        assert_eq!(flat.secondary.position_s, paced.secondary.position_s);
    }
}
