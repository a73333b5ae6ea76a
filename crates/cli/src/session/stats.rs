//! Session statistics.

use std::time::Duration;

use playback::SessionReport;

/// Statistics from a session run
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Report produced by the runner
    pub report: SessionReport,

    /// Wall-clock duration of the run
    pub wall_time: Duration,

    /// Stopped by a shutdown signal before the end
    pub interrupted: bool,
}

impl SessionStats {
    /// Virtual seconds simulated per wall-clock second
    pub fn speedup(&self) -> f64 {
        let wall = self.wall_time.as_secs_f64();
        if wall > 0.0 {
            self.report.elapsed_s / wall
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Session Statistics                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        let report = &self.report;
        let counters = &report.counters;

        println!("📊 Overview");
        println!("   ├─ Virtual time: {:.2}s", report.elapsed_s);
        println!(
            "   ├─ Wall time: {:.3}s ({:.1}x)",
            self.wall_time.as_secs_f64(),
            self.speedup()
        );
        println!("   ├─ Ticks: {}", report.ticks);
        println!("   ├─ Steps applied: {}", report.steps.len());
        println!("   └─ Interrupted: {}", self.interrupted);

        println!("\n🎬 Timelines");
        println!(
            "   ├─ Primary: {} @ {:.3}s",
            report.primary.label, report.primary.position_s
        );
        println!(
            "   └─ Secondary: {} @ {:.3}s",
            report.secondary.label, report.secondary.position_s
        );

        println!("\n📈 Sync Engine");
        println!("   ├─ Synced: {}", report.synced);
        println!(
            "   ├─ Anchors: {:.3} -> {:.3} (offset {:+.3}s)",
            report.mapping.anchor_primary, report.mapping.anchor_secondary, report.mapping.offset
        );
        println!("   ├─ Rate: {}x", report.rate);
        println!("   ├─ Corrections: {}", counters.corrections);
        println!("   ├─ Throttled ticks: {}", counters.throttled);
        println!("   ├─ Follow seeks: {}", counters.follow_seeks);
        println!("   ├─ Re-anchors: {}", counters.reanchors);
        println!("   └─ Drift (ms): {}", report.metrics.drift_ms);

        println!();
    }
}
