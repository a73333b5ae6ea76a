//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::SessionBlueprint;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::{ensure_exists, CliError};
use crate::session::{RunMode, Session, SessionConfig};

/// Execute the `run` command
pub async fn run_session(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    ensure_exists(&args.config)?;

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut blueprint, args)?;

    info!(
        primary = %blueprint.media.primary.label,
        secondary = %blueprint.media.secondary.label,
        steps = blueprint.scenario.len(),
        run_for_s = blueprint.simulation.run_for_s,
        realtime = args.realtime,
        "Configuration loaded"
    );

    let mode = if args.realtime {
        RunMode::Paced { speed: args.speed }
    } else {
        RunMode::Virtual
    };

    let stats = Session::new(SessionConfig { blueprint, mode })
        .run(setup_shutdown_signal())
        .await
        .context("Session execution failed")?;

    info!(
        elapsed_s = stats.report.elapsed_s,
        ticks = stats.report.ticks,
        corrections = stats.report.counters.corrections,
        max_drift_ms = stats.report.max_drift_ms,
        interrupted = stats.interrupted,
        "Session completed"
    );

    if args.json {
        let json = serde_json::to_string_pretty(&stats.report)
            .context("Failed to serialize session report")?;
        println!("{}", json);
    } else {
        stats.print_summary();
    }

    Ok(())
}

/// Apply command-line overrides on top of the session file
fn apply_overrides(blueprint: &mut SessionBlueprint, args: &RunArgs) -> Result<(), CliError> {
    if !(args.speed.is_finite() && args.speed > 0.0) {
        return Err(CliError::invalid_argument(
            "speed",
            format!("must be > 0, got {}", args.speed),
        ));
    }

    if let Some(run_for) = args.run_for {
        if !(run_for.is_finite() && run_for > 0.0) {
            return Err(CliError::invalid_argument(
                "run-for",
                format!("must be > 0, got {run_for}"),
            ));
        }
        info!(run_for_s = run_for, "Overriding run length from CLI");
        blueprint.simulation.run_for_s = run_for;

        let dropped = blueprint
            .scenario
            .iter()
            .filter(|s| s.at_s > run_for)
            .count();
        if dropped > 0 {
            warn!(dropped, "Scenario steps scheduled after the shortened run will not execute");
        }
    }

    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
