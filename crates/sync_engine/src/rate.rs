//! Lockstep playback rate control.
//!
//! Both timelines always run at the same rate; the selectable presets are
//! sorted and de-duplicated once at construction.

use contracts::{Timeline, FALLBACK_RATE_PRESETS};

const RATE_EPSILON: f64 = 1e-6;

/// Shared playback rate with preset stepping
#[derive(Debug, Clone)]
pub struct RateControl {
    presets: Vec<f64>,
    current: f64,
}

impl RateControl {
    pub fn new(presets: &[f64], initial: f64) -> Self {
        let mut presets: Vec<f64> = presets
            .iter()
            .copied()
            .filter(|r| r.is_finite() && *r > 0.0)
            .collect();
        presets.sort_by(f64::total_cmp);
        presets.dedup_by(|a, b| (*a - *b).abs() < RATE_EPSILON);
        if presets.is_empty() {
            presets = FALLBACK_RATE_PRESETS.to_vec();
        }

        let current = if initial.is_finite() && initial > 0.0 {
            initial
        } else {
            1.0
        };

        Self { presets, current }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn presets(&self) -> &[f64] {
        &self.presets
    }

    /// Set an explicit rate. Non-positive or non-finite rates are ignored.
    ///
    /// Returns the rate now in effect.
    pub fn set(&mut self, rate: f64) -> f64 {
        if rate.is_finite() && rate > 0.0 {
            self.current = rate;
        }
        self.current
    }

    /// Move to the neighbouring preset (`direction > 0` = faster).
    ///
    /// A rate that is not a preset snaps via its insertion point: the first
    /// preset above it, or the last preset when none is.
    pub fn bump(&mut self, direction: i32) -> f64 {
        let last = self.presets.len() - 1;
        let idx = self
            .presets
            .iter()
            .position(|r| (r - self.current).abs() < RATE_EPSILON)
            .or_else(|| self.presets.iter().position(|r| *r > self.current))
            .unwrap_or(last);

        let next = if direction > 0 {
            (idx + 1).min(last)
        } else {
            idx.saturating_sub(1)
        };
        self.current = self.presets[next];
        self.current
    }

    /// Push the current rate to both timelines
    pub fn apply<P, S>(&self, primary: &mut P, secondary: &mut S)
    where
        P: Timeline + ?Sized,
        S: Timeline + ?Sized,
    {
        primary.set_playback_rate(self.current);
        secondary.set_playback_rate(self.current);
    }
}

impl Default for RateControl {
    fn default() -> Self {
        Self::new(&FALLBACK_RATE_PRESETS, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeTimeline;

    #[test]
    fn test_presets_sorted_and_deduped() {
        let rates = RateControl::new(&[2.0, 0.5, 1.0, 1.0, -1.0, f64::NAN], 1.0);
        assert_eq!(rates.presets(), &[0.5, 1.0, 2.0]);
    }

    #[test]
    fn test_empty_presets_fall_back() {
        let rates = RateControl::new(&[], 1.0);
        assert_eq!(rates.presets(), &FALLBACK_RATE_PRESETS);
    }

    #[test]
    fn test_bump_exact_match() {
        let mut rates = RateControl::default();
        assert_eq!(rates.bump(1), 1.25);
        assert_eq!(rates.bump(1), 1.5);
        assert_eq!(rates.bump(-1), 1.25);
    }

    #[test]
    fn test_bump_clamps_at_edges() {
        let mut rates = RateControl::new(&FALLBACK_RATE_PRESETS, 2.0);
        assert_eq!(rates.bump(1), 2.0);

        let mut rates = RateControl::new(&FALLBACK_RATE_PRESETS, 1.0);
        assert_eq!(rates.bump(-1), 1.0);
    }

    #[test]
    fn test_bump_off_preset_uses_insertion_point() {
        // 1.1 inserts before 1.25 (index 1): up -> 1.5, down -> 1.0
        let mut rates = RateControl::new(&FALLBACK_RATE_PRESETS, 1.1);
        assert_eq!(rates.bump(1), 1.5);

        let mut rates = RateControl::new(&FALLBACK_RATE_PRESETS, 1.1);
        assert_eq!(rates.bump(-1), 1.0);

        // Above every preset: insertion point is the last preset.
        let mut rates = RateControl::new(&FALLBACK_RATE_PRESETS, 3.0);
        assert_eq!(rates.bump(-1), 1.75);
    }

    #[test]
    fn test_set_ignores_invalid() {
        let mut rates = RateControl::default();
        assert_eq!(rates.set(0.0), 1.0);
        assert_eq!(rates.set(f64::INFINITY), 1.0);
        assert_eq!(rates.set(1.75), 1.75);
    }

    #[test]
    fn test_apply_lockstep() {
        let mut rates = RateControl::default();
        let mut a = FakeTimeline::playing(0.0, Some(10.0));
        let mut b = FakeTimeline::playing(0.0, Some(10.0));
        rates.set(1.5);
        rates.apply(&mut a, &mut b);
        assert_eq!(a.rate, 1.5);
        assert_eq!(b.rate, 1.5);
    }
}
