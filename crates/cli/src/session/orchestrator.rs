//! Session orchestrator - builds the runner and drives it in the chosen mode.

use std::future::Future;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::SessionBlueprint;
use playback::SessionRunner;
use tracing::{info, warn};

use super::SessionStats;

/// How virtual time is advanced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunMode {
    /// As fast as possible, no waiting
    Virtual,
    /// One tick per `tick_interval / speed` of wall-clock time
    Paced { speed: f64 },
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub blueprint: SessionBlueprint,
    pub mode: RunMode,
}

/// Main session orchestrator
pub struct Session {
    config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run the session to completion or until `shutdown` resolves.
    ///
    /// A virtual run never waits, so `shutdown` only applies to paced runs.
    pub async fn run<F>(self, shutdown: F) -> Result<SessionStats>
    where
        F: Future<Output = ()>,
    {
        let start = Instant::now();
        let mut runner =
            SessionRunner::new(&self.config.blueprint).context("Failed to build session runner")?;

        info!(mode = ?self.config.mode, "Starting session");

        let interrupted = match self.config.mode {
            RunMode::Virtual => {
                runner.run_to_end();
                false
            }
            RunMode::Paced { speed } => {
                tokio::select! {
                    _ = runner.run_paced(speed) => false,
                    _ = shutdown => {
                        warn!("Received shutdown signal, stopping session...");
                        true
                    }
                }
            }
        };

        Ok(SessionStats {
            report: runner.report(),
            wall_time: start.elapsed(),
            interrupted,
        })
    }
}
