//! Acceptance policy for interpreted gauge readings.
//!
//! Three thresholds: readings below `min_active_mm` mean the gauge is not in
//! use (or no packet arrived) and reset the tracked value to zero; steps
//! smaller than `min_change_mm` are sampling jitter; steps larger than
//! `max_step_mm` are decode glitches.
//!
//! The tracked value follows every in-use reading, accepted or not. A
//! glitch therefore becomes the reference for the next reading, and a value
//! that holds still after a glitch is suppressed as jitter.

use tracing::trace;

use crate::config::FilterCfg;

/// Why a reading was or was not forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    /// Below the minimum-activity threshold; tracking reset to 0.
    Inactive,
    /// Changed less than the minimum step.
    Jitter,
    /// Jumped further than the maximum step.
    Glitch,
}

impl Verdict {
    #[inline]
    pub fn is_accepted(self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

#[derive(Debug, Clone)]
pub struct NoiseFilter {
    cfg: FilterCfg,
}

impl NoiseFilter {
    pub fn new(cfg: FilterCfg) -> Self {
        Self { cfg }
    }

    pub fn cfg(&self) -> &FilterCfg {
        &self.cfg
    }

    /// Judge `new_mm` against the task's tracked value, updating it in place.
    pub fn accept(&self, new_mm: f32, last_mm: &mut f32) -> Verdict {
        if new_mm.is_nan() || new_mm < self.cfg.min_active_mm {
            *last_mm = 0.0;
            return Verdict::Inactive;
        }
        let delta = (new_mm - *last_mm).abs();
        *last_mm = new_mm;
        let verdict = if delta < self.cfg.min_change_mm {
            Verdict::Jitter
        } else if delta > self.cfg.max_step_mm {
            Verdict::Glitch
        } else {
            Verdict::Accepted
        };
        trace!(new_mm, delta, ?verdict, "filter");
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn filter() -> NoiseFilter {
        NoiseFilter::new(FilterCfg::default())
    }

    #[rstest]
    #[case(0.59, 1.0, Verdict::Inactive, 0.0)]
    #[case(-1000.0, 1.0, Verdict::Inactive, 0.0)]
    #[case(1.005, 1.0, Verdict::Jitter, 1.005)]
    #[case(2.5, 1.0, Verdict::Glitch, 2.5)]
    #[case(1.5, 1.0, Verdict::Accepted, 1.5)]
    #[case(0.6, 0.0, Verdict::Accepted, 0.6)]
    fn verdict_table(
        #[case] new_mm: f32,
        #[case] last: f32,
        #[case] expected: Verdict,
        #[case] tracked: f32,
    ) {
        let mut last_mm = last;
        assert_eq!(filter().accept(new_mm, &mut last_mm), expected);
        assert_eq!(last_mm, tracked);
    }

    #[test]
    fn first_reading_far_from_zero_is_a_glitch_then_settles() {
        let f = filter();
        let mut last = 0.0;
        assert_eq!(f.accept(2.55, &mut last), Verdict::Glitch);
        assert_eq!(f.accept(2.55, &mut last), Verdict::Jitter);
        assert_eq!(f.accept(2.60, &mut last), Verdict::Accepted);
    }

    #[test]
    fn nan_counts_as_inactive() {
        let mut last = 1.0;
        assert_eq!(filter().accept(f32::NAN, &mut last), Verdict::Inactive);
        assert_eq!(last, 0.0);
    }
}
