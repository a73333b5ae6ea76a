//! 模拟媒体时间轴
//!
//! 行为接近浏览器的媒体元素：
//! - 元数据加载完成前时长未知
//! - seek 被限制在 [0, duration]
//! - 播放到结尾时自动暂停

use contracts::{MediaConfig, Timeline};
use tracing::trace;

/// 由虚拟时钟驱动的媒体时间轴
#[derive(Debug, Clone)]
pub struct SimulatedTimeline {
    label: String,
    position: f64,
    duration: f64,
    load_delay: f64,
    /// 创建后经过的虚拟时间 (秒)
    elapsed: f64,
    paused: bool,
    ended: bool,
    rate: f64,
    clock_skew: f64,
}

impl SimulatedTimeline {
    /// 创建一个已加载、暂停中的时间轴
    pub fn new(label: impl Into<String>, duration: f64, start: f64) -> Self {
        let duration = if duration.is_nan() { 0.0 } else { duration.max(0.0) };
        Self {
            label: label.into(),
            position: start.max(0.0).min(duration),
            duration,
            load_delay: 0.0,
            elapsed: 0.0,
            paused: true,
            ended: false,
            rate: 1.0,
            clock_skew: 1.0,
        }
    }

    /// 从媒体配置创建
    pub fn from_config(config: &MediaConfig) -> Self {
        Self {
            load_delay: config.load_delay_s,
            clock_skew: config.clock_skew,
            ..Self::new(config.label.clone(), config.duration_s, config.start_s)
        }
    }

    /// 设置元数据加载延迟
    pub fn with_load_delay(mut self, seconds: f64) -> Self {
        self.load_delay = seconds.max(0.0);
        self
    }

    /// 设置时钟偏差倍率
    pub fn with_clock_skew(mut self, skew: f64) -> Self {
        if skew.is_finite() && skew > 0.0 {
            self.clock_skew = skew;
        }
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.elapsed >= self.load_delay
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// 推进虚拟时间 `dt` 秒
    ///
    /// 加载完成前位置不变。
    pub fn advance(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.elapsed += dt;

        if self.paused || !self.is_loaded() {
            return;
        }

        self.position += dt * self.rate * self.clock_skew;
        if self.position >= self.duration {
            self.position = self.duration;
            self.paused = true;
            self.ended = true;
            trace!(label = %self.label, "timeline reached end");
        }
    }
}

impl Timeline for SimulatedTimeline {
    fn position(&self) -> f64 {
        self.position
    }

    fn seek(&mut self, seconds: f64) {
        if seconds.is_nan() {
            return;
        }
        self.position = seconds.clamp(0.0, self.duration);
        self.ended = false;
    }

    fn duration(&self) -> Option<f64> {
        self.is_loaded().then_some(self.duration)
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn play(&mut self) {
        // 浏览器在结尾处 play() 会从头开始
        if self.ended {
            self.position = 0.0;
            self.ended = false;
        }
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        if rate.is_finite() && rate > 0.0 {
            self.rate = rate;
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_while_playing() {
        let mut t = SimulatedTimeline::new("a", 10.0, 1.0);
        t.advance(1.0);
        assert_eq!(t.position(), 1.0);

        t.play();
        t.advance(0.5);
        assert_eq!(t.position(), 1.5);
    }

    #[test]
    fn test_rate_and_skew() {
        let mut t = SimulatedTimeline::new("a", 100.0, 0.0).with_clock_skew(1.5);
        t.set_playback_rate(2.0);
        t.play();
        t.advance(1.0);
        assert_eq!(t.position(), 3.0);
    }

    #[test]
    fn test_duration_unknown_until_loaded() {
        let mut t = SimulatedTimeline::new("a", 10.0, 0.0).with_load_delay(1.0);
        t.play();
        assert_eq!(t.duration(), None);
        assert_eq!(t.known_duration(), None);

        t.advance(0.5);
        assert_eq!(t.position(), 0.0);
        t.advance(0.5);
        assert_eq!(t.duration(), Some(10.0));
    }

    #[test]
    fn test_seek_clamps() {
        let mut t = SimulatedTimeline::new("a", 10.0, 0.0);
        t.seek(25.0);
        assert_eq!(t.position(), 10.0);
        t.seek(-3.0);
        assert_eq!(t.position(), 0.0);
        t.seek(f64::NAN);
        assert_eq!(t.position(), 0.0);
    }

    #[test]
    fn test_pauses_at_end() {
        let mut t = SimulatedTimeline::new("a", 2.0, 1.5);
        t.play();
        t.advance(1.0);
        assert_eq!(t.position(), 2.0);
        assert!(t.is_paused());
        assert!(t.has_ended());

        t.play();
        assert_eq!(t.position(), 0.0);
        assert!(!t.has_ended());
    }

    #[test]
    fn test_from_config() {
        let config = MediaConfig {
            label: "overlay".into(),
            duration_s: 100.0,
            start_s: 5.0,
            clock_skew: 1.01,
            load_delay_s: 0.25,
        };
        let t = SimulatedTimeline::from_config(&config);
        assert_eq!(t.label(), "overlay");
        assert_eq!(t.position(), 5.0);
        assert!(!t.is_loaded());
    }
}
