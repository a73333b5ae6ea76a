//! SessionBlueprint - Config Loader 输出
//!
//! 描述一次完整的同步会话：引擎参数、倍速预设、两路媒体、模拟时钟与操作脚本。

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{PlaybackConfig, SyncEngineConfig, TimelineRole};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的会话配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 同步引擎参数
    #[serde(default)]
    #[validate(nested)]
    pub engine: SyncEngineConfig,

    /// 倍速配置
    #[serde(default)]
    #[validate(nested)]
    pub playback: PlaybackConfig,

    /// 两路媒体定义
    #[validate(nested)]
    pub media: MediaPair,

    /// 模拟时钟参数
    #[serde(default)]
    #[validate(nested)]
    pub simulation: SimulationConfig,

    /// 用户操作脚本 (按 at_s 排序执行)
    #[serde(default)]
    pub scenario: Vec<ScenarioStep>,
}

/// 主/副两路媒体
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MediaPair {
    /// 主时间轴 (权威时钟)
    #[validate(nested)]
    pub primary: MediaConfig,

    /// 副时间轴 (跟随主时间轴)
    #[validate(nested)]
    pub secondary: MediaConfig,
}

impl MediaPair {
    /// 按角色取媒体配置
    pub fn get(&self, role: TimelineRole) -> &MediaConfig {
        match role {
            TimelineRole::Primary => &self.primary,
            TimelineRole::Secondary => &self.secondary,
        }
    }
}

/// 单路媒体配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MediaConfig {
    /// 显示名称
    #[validate(length(min = 1, max = 128))]
    pub label: String,

    /// 媒体时长 (秒)，必须 > 0
    #[validate(range(exclusive_min = 0.0))]
    pub duration_s: f64,

    /// 初始播放位置 (秒)
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub start_s: f64,

    /// 时钟偏差倍率 (1.0 = 准确；1.002 = 每秒快 2ms)
    #[serde(default = "default_clock_skew")]
    #[validate(range(exclusive_min = 0.0, max = 4.0))]
    pub clock_skew: f64,

    /// 元数据加载延迟 (秒)，加载前时长未知
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub load_delay_s: f64,
}

fn default_clock_skew() -> f64 {
    1.0
}

/// 模拟时钟参数
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SimulationConfig {
    /// 进度通知间隔 (毫秒)，浏览器 timeupdate 约 250ms 一次
    #[serde(default = "default_tick_interval")]
    #[validate(range(min = 1, max = 10_000))]
    pub tick_interval_ms: u64,

    /// 会话总时长 (秒)
    #[serde(default = "default_run_for")]
    #[validate(range(exclusive_min = 0.0))]
    pub run_for_s: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            run_for_s: default_run_for(),
        }
    }
}

fn default_tick_interval() -> u64 {
    250
}

fn default_run_for() -> f64 {
    60.0
}

/// 脚本中的一步操作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// 执行时刻 (会话开始后的秒数)
    pub at_s: f64,

    /// 操作内容
    #[serde(flatten)]
    pub action: ScenarioAction,
}

/// 用户操作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioAction {
    /// 建立同步映射
    Establish,
    /// 播放
    Play {
        #[serde(default)]
        timeline: TimelineRole,
    },
    /// 暂停
    Pause {
        #[serde(default)]
        timeline: TimelineRole,
    },
    /// 进度条跳转
    Seek { timeline: TimelineRole, time_s: f64 },
    /// 相对跳转 (键盘快进/快退)
    Skip {
        #[serde(default)]
        timeline: TimelineRole,
        seconds: f64,
    },
    /// 相对主时间轴的步进
    Step { seconds: f64 },
    /// 逐帧步进
    StepFrame {
        #[serde(default)]
        timeline: TimelineRole,
        direction: i32,
    },
    /// 设置倍速
    SetRate { rate: f64 },
    /// 切换到相邻倍速预设
    BumpRate { direction: i32 },
    /// 设置固定延迟
    SetOffset { seconds: f64 },
    /// 微调固定延迟
    NudgeOffset { seconds: f64 },
    /// 交换主副时间轴
    Swap,
    /// 取消同步
    Clear,
}

impl ScenarioAction {
    /// 操作名称 (用于日志)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Establish => "establish",
            Self::Play { .. } => "play",
            Self::Pause { .. } => "pause",
            Self::Seek { .. } => "seek",
            Self::Skip { .. } => "skip",
            Self::Step { .. } => "step",
            Self::StepFrame { .. } => "step_frame",
            Self::SetRate { .. } => "set_rate",
            Self::BumpRate { .. } => "bump_rate",
            Self::SetOffset { .. } => "set_offset",
            Self::NudgeOffset { .. } => "nudge_offset",
            Self::Swap => "swap",
            Self::Clear => "clear",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[media.primary]
label = "main"
duration_s = 120.0
start_s = 10.0

[media.secondary]
label = "overlay"
duration_s = 100.0
start_s = 5.0
clock_skew = 1.01

[[scenario]]
at_s = 0.0
action = "establish"

[[scenario]]
at_s = 4.0
action = "seek"
timeline = "secondary"
time_s = 95.0

[[scenario]]
at_s = 6.0
action = "step_frame"
direction = -1
"#;

    #[test]
    fn test_parse_scenario_toml() {
        let bp: SessionBlueprint = toml::from_str(SAMPLE).unwrap();
        assert_eq!(bp.version, ConfigVersion::V1);
        assert_eq!(bp.media.secondary.clock_skew, 1.01);
        assert_eq!(bp.media.primary.clock_skew, 1.0);
        assert_eq!(bp.scenario.len(), 3);
        assert_eq!(bp.scenario[0].action, ScenarioAction::Establish);
        assert_eq!(
            bp.scenario[1].action,
            ScenarioAction::Seek {
                timeline: TimelineRole::Secondary,
                time_s: 95.0
            }
        );
        assert_eq!(
            bp.scenario[2].action,
            ScenarioAction::StepFrame {
                timeline: TimelineRole::Primary,
                direction: -1
            }
        );
    }

    #[test]
    fn test_defaults_applied() {
        let bp: SessionBlueprint = toml::from_str(SAMPLE).unwrap();
        assert_eq!(bp.simulation.tick_interval_ms, 250);
        assert_eq!(bp.engine.threshold_s, 0.5);
        assert_eq!(bp.playback.rate_presets.len(), 5);
        assert!(bp.validate().is_ok());
    }

    #[test]
    fn test_nested_validation() {
        let mut bp: SessionBlueprint = toml::from_str(SAMPLE).unwrap();
        bp.media.primary.duration_s = 0.0;
        assert!(bp.validate().is_err());
    }

    #[test]
    fn test_media_get_by_role() {
        let bp: SessionBlueprint = toml::from_str(SAMPLE).unwrap();
        assert_eq!(bp.media.get(TimelineRole::Secondary).label, "overlay");
    }

    #[test]
    fn test_action_json_tag() {
        let step = ScenarioStep {
            at_s: 1.5,
            action: ScenarioAction::SetRate { rate: 1.5 },
        };
        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"action\":\"set_rate\""));
        let back: ScenarioStep = serde_json::from_str(&json).unwrap();
        assert_eq!(back, step);
    }
}
