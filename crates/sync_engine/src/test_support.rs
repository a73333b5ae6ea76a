//! In-memory timeline for unit tests.

use contracts::Timeline;

/// Timeline that stores whatever it is told and clamps like a media element
#[derive(Debug, Clone)]
pub struct FakeTimeline {
    pub position: f64,
    pub duration: Option<f64>,
    pub paused: bool,
    pub rate: f64,
    pub seeks: Vec<f64>,
}

impl FakeTimeline {
    pub fn playing(position: f64, duration: Option<f64>) -> Self {
        Self {
            position,
            duration,
            paused: false,
            rate: 1.0,
            seeks: Vec::new(),
        }
    }

    pub fn paused(position: f64, duration: Option<f64>) -> Self {
        Self {
            paused: true,
            ..Self::playing(position, duration)
        }
    }
}

impl Timeline for FakeTimeline {
    fn position(&self) -> f64 {
        self.position
    }

    fn seek(&mut self, seconds: f64) {
        self.seeks.push(seconds);
        self.position = match self.known_duration() {
            Some(end) => seconds.clamp(0.0, end),
            None => seconds.max(0.0),
        };
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn play(&mut self) {
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }
}
