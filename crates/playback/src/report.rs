//! 会话报告

use observability::MetricsSummary;
use serde::Serialize;
use sync_engine::{EngineCounters, SyncMapping};

/// 时间轴状态快照
#[derive(Debug, Clone, Serialize)]
pub struct TimelineSnapshot {
    pub label: String,
    pub position_s: f64,
    pub duration_s: Option<f64>,
    pub paused: bool,
}

/// 已执行的脚本步骤
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// 脚本中的序号
    pub index: usize,
    /// 实际执行时的虚拟时间 (秒)
    pub at_s: f64,
    pub action: &'static str,
    /// 操作后主时间轴位置
    pub primary_s: f64,
    /// 操作后副时间轴位置
    pub secondary_s: f64,
    /// establish 被拒绝等无效操作
    pub applied: bool,
}

/// 会话结束后的统计结果
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// 虚拟运行时长 (秒)
    pub elapsed_s: f64,
    pub ticks: u64,
    pub synced: bool,
    pub mapping: SyncMapping,
    pub rate: f64,
    pub primary: TimelineSnapshot,
    pub secondary: TimelineSnapshot,
    pub counters: EngineCounters,
    pub steps: Vec<StepRecord>,
    /// 最大漂移 (毫秒)，同步后采样
    pub max_drift_ms: f64,
    /// 平均漂移 (毫秒)
    pub mean_drift_ms: f64,
    #[serde(skip)]
    pub metrics: MetricsSummary,
}

impl std::fmt::Display for SessionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Session Report ===")?;
        writeln!(f, "Elapsed: {:.3}s ({} ticks)", self.elapsed_s, self.ticks)?;
        writeln!(
            f,
            "Synced: {} (anchor {:.3} -> {:.3}, offset {:+.3}s)",
            self.synced,
            self.mapping.anchor_primary,
            self.mapping.anchor_secondary,
            self.mapping.offset
        )?;
        writeln!(f, "Rate: {}x", self.rate)?;
        for (role, snap) in [("primary", &self.primary), ("secondary", &self.secondary)] {
            writeln!(
                f,
                "{role}: {} @ {:.3}s{}",
                snap.label,
                snap.position_s,
                if snap.paused { " (paused)" } else { "" }
            )?;
        }
        writeln!(f, "Steps applied: {}", self.steps.len())?;
        write!(f, "{}", self.metrics)
    }
}
