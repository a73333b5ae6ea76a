//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{MediaConfig, ScenarioStep, SessionBlueprint};
use serde::Serialize;
use sync_engine::RateControl;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::ensure_exists;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    engine: EngineInfo,
    playback: PlaybackInfo,
    primary: MediaInfo,
    secondary: MediaInfo,
    tick_interval_ms: u64,
    run_for_s: f64,
    step_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    scenario: Vec<ScenarioStep>,
}

#[derive(Serialize)]
struct EngineInfo {
    threshold_s: f64,
    interval_ms: u64,
    frame_step_s: f64,
    overrun: String,
    autoplay_on_establish: bool,
    couple_playback: bool,
}

#[derive(Serialize)]
struct PlaybackInfo {
    /// Presets after sorting and de-duplication
    rate_presets: Vec<f64>,
    initial_rate: f64,
}

#[derive(Serialize)]
struct MediaInfo {
    label: String,
    duration_s: f64,
    start_s: f64,
    clock_skew: f64,
    load_delay_s: f64,
}

impl From<&MediaConfig> for MediaInfo {
    fn from(media: &MediaConfig) -> Self {
        Self {
            label: media.label.clone(),
            duration_s: media.duration_s,
            start_s: media.start_s,
            clock_skew: media.clock_skew,
            load_delay_s: media.load_delay_s,
        }
    }
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    ensure_exists(&args.config)?;

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &SessionBlueprint, args: &InfoArgs) -> ConfigInfo {
    let engine = &blueprint.engine;
    let rates = RateControl::new(
        &blueprint.playback.rate_presets,
        blueprint.playback.initial_rate,
    );

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        engine: EngineInfo {
            threshold_s: engine.threshold_s,
            interval_ms: engine.interval_ms,
            frame_step_s: engine.frame_step_s,
            overrun: format!("{:?}", engine.overrun),
            autoplay_on_establish: engine.autoplay_on_establish,
            couple_playback: engine.couple_playback,
        },
        playback: PlaybackInfo {
            rate_presets: rates.presets().to_vec(),
            initial_rate: rates.current(),
        },
        primary: MediaInfo::from(&blueprint.media.primary),
        secondary: MediaInfo::from(&blueprint.media.secondary),
        tick_interval_ms: blueprint.simulation.tick_interval_ms,
        run_for_s: blueprint.simulation.run_for_s,
        step_count: blueprint.scenario.len(),
        scenario: if args.scenario {
            blueprint.scenario.clone()
        } else {
            Vec::new()
        },
    }
}

fn print_config_info(blueprint: &SessionBlueprint, args: &InfoArgs) {
    let info = build_config_info(blueprint, args);

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  dualsync Session                            ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🎬 Media");
    for (prefix, role, media) in [
        ("├─", "Primary", &info.primary),
        ("└─", "Secondary", &info.secondary),
    ] {
        println!(
            "   {} {}: {} ({:.1}s, start {:.1}s, skew {}, load {:.2}s)",
            prefix,
            role,
            media.label,
            media.duration_s,
            media.start_s,
            media.clock_skew,
            media.load_delay_s
        );
    }

    let engine = &info.engine;
    println!("\n⚙️  Sync Engine");
    println!("   ├─ Threshold: {}s", engine.threshold_s);
    println!("   ├─ Correction interval: {}ms", engine.interval_ms);
    println!("   ├─ Frame step: {:.4}s", engine.frame_step_s);
    println!("   ├─ Overrun policy: {}", engine.overrun);
    println!("   ├─ Autoplay on establish: {}", engine.autoplay_on_establish);
    println!("   └─ Coupled play/pause: {}", engine.couple_playback);

    println!("\n⏩ Playback");
    println!("   ├─ Rate presets: {:?}", info.playback.rate_presets);
    println!("   └─ Initial rate: {}x", info.playback.initial_rate);

    println!("\n⏱  Simulation");
    println!("   ├─ Tick interval: {}ms", info.tick_interval_ms);
    println!("   ├─ Run length: {}s", info.run_for_s);
    println!("   └─ Scenario steps: {}", info.step_count);

    if !info.scenario.is_empty() {
        println!("\n📜 Scenario");
        for (i, step) in info.scenario.iter().enumerate() {
            let is_last = i == info.scenario.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!(
                "   {} {:>8.3}s  {:<12} {:?}",
                prefix,
                step.at_s,
                step.action.name(),
                step.action
            );
        }
    }

    println!();
}
