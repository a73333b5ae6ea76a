//! Sync Engine 指标收集模块
//!
//! 基于 SyncAction / SeekOutcome 收集和统计同步引擎的运行指标。

use std::collections::HashMap;

use contracts::{SeekOutcome, SyncAction, SyncActionKind};
use metrics::{counter, gauge, histogram};

/// 从 SyncAction 记录指标
///
/// 每次引擎写入某一路时间轴时调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_sync_action;
///
/// if let Some(action) = engine.tick(&primary, &mut secondary, now) {
///     record_sync_action(&action);
/// }
/// ```
pub fn record_sync_action(action: &SyncAction) {
    counter!(
        "dualsync_actions_total",
        "kind" => action.kind.as_str(),
        "timeline" => action.timeline.as_str()
    )
    .increment(1);

    histogram!("dualsync_action_distance_seconds", "kind" => action.kind.as_str())
        .record(action.drift());
}

/// 记录一次显式跳转
pub fn record_seek(outcome: &SeekOutcome) {
    counter!("dualsync_user_seeks_total", "origin" => outcome.origin.as_str()).increment(1);
    if outcome.reanchored.is_some() {
        counter!("dualsync_reanchors_total").increment(1);
    }
}

/// 记录建立同步的结果
pub fn record_establish(accepted: bool) {
    let status = if accepted { "accepted" } else { "declined" };
    counter!("dualsync_establish_attempts_total", "status" => status).increment(1);
}

/// 记录当前漂移 (秒)
pub fn record_drift_sample(drift: f64) {
    gauge!("dualsync_drift_seconds").set(drift);
    histogram!("dualsync_drift_seconds_hist").record(drift.abs());
}

/// 同步指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct SyncMetricsAggregator {
    /// 连续校正次数
    pub corrections: u64,

    /// 跟随跳转次数
    pub follow_seeks: u64,

    /// 用户跳转次数 (按发起方)
    pub seeks_by_origin: HashMap<String, u64>,

    /// 重新锚定次数
    pub reanchors: u64,

    /// 漂移采样统计 (毫秒)
    pub drift_stats: RunningStats,

    /// 校正幅度统计 (毫秒)
    pub correction_stats: RunningStats,
}

impl SyncMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 累计一次引擎写入
    pub fn update_action(&mut self, action: &SyncAction) {
        match action.kind {
            SyncActionKind::Correction => {
                self.corrections += 1;
                self.correction_stats.push(action.drift() * 1000.0);
            }
            SyncActionKind::FollowSeek => self.follow_seeks += 1,
        }
    }

    /// 累计一次显式跳转
    pub fn update_seek(&mut self, outcome: &SeekOutcome) {
        *self
            .seeks_by_origin
            .entry(outcome.origin.as_str().to_string())
            .or_insert(0) += 1;
        if outcome.reanchored.is_some() {
            self.reanchors += 1;
        }
        if let Some(ref follow) = outcome.follow {
            self.update_action(follow);
        }
    }

    /// 累计一次漂移采样 (秒)
    pub fn push_drift(&mut self, drift: f64) {
        self.drift_stats.push(drift.abs() * 1000.0);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let drift_samples = self.drift_stats.count();
        MetricsSummary {
            corrections: self.corrections,
            follow_seeks: self.follow_seeks,
            reanchors: self.reanchors,
            seeks_by_origin: self.seeks_by_origin.clone(),
            correction_rate: if drift_samples > 0 {
                self.corrections as f64 / drift_samples as f64 * 100.0
            } else {
                0.0
            },
            drift_ms: StatsSummary::from(&self.drift_stats),
            correction_ms: StatsSummary::from(&self.correction_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub corrections: u64,
    pub follow_seeks: u64,
    pub reanchors: u64,
    pub seeks_by_origin: HashMap<String, u64>,
    /// 每个漂移采样对应的校正比例 (%)
    pub correction_rate: f64,
    pub drift_ms: StatsSummary,
    pub correction_ms: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Sync Metrics Summary ===")?;
        writeln!(
            f,
            "Corrections: {} ({:.2}% of samples)",
            self.corrections, self.correction_rate
        )?;
        writeln!(f, "Follow seeks: {}", self.follow_seeks)?;
        writeln!(f, "Re-anchors: {}", self.reanchors)?;
        writeln!(f, "Drift (ms): {}", self.drift_ms)?;
        writeln!(f, "Correction size (ms): {}", self.correction_ms)?;

        if !self.seeks_by_origin.is_empty() {
            writeln!(f, "User seeks:")?;
            let mut origins: Vec<_> = self.seeks_by_origin.iter().collect();
            origins.sort();
            for (origin, count) in origins {
                writeln!(f, "  {}: {}", origin, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
