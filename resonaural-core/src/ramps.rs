//! Parameter motion: fixed-duration exponential ramps and per-tick smoothing.
//!
//! Two mechanisms live here and are kept apart on purpose:
//! - [`ExpRamp`]      : a frequency offset that glides to `delta` over a fixed
//!   duration on the audio clock, following an exponential approach curve.
//! - [`smooth_toward`]: a first-order lag applied once per control tick, used
//!   for output intensity.
//!
//! Both are `no_std` friendly and allocation free.

use crate::dsp::{clamp, m_exp};
use core::fmt::Debug;

/// Steepness of the exponential approach curve. With `k = 5` the ramp has
/// covered ~99.3% of its travel when the curve is renormalized to end at 1.
pub const RAMP_SHARPNESS: f32 = 5.0;

/// Normalized exponential approach: `0` at `p = 0`, exactly `1` at `p >= 1`,
/// with a continuously decreasing slope in between.
#[inline]
pub fn exp_approach(progress: f32) -> f32 {
    let p = clamp(progress, 0.0, 1.0);
    if p >= 1.0 {
        return 1.0;
    }
    let norm = 1.0 - m_exp(-RAMP_SHARPNESS);
    (1.0 - m_exp(-RAMP_SHARPNESS * p)) / norm
}

/// One-pole smoothing step: `current + (target - current) * factor`.
///
/// `factor` is the share of the remaining gap closed per call, in [0, 1].
#[inline]
pub fn smooth_toward(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * clamp(factor, 0.0, 1.0)
}

/// An additive offset that travels from `0` to `delta` between `start` and
/// `start + duration` (seconds on the audio clock).
///
/// Several ramps on the same parameter simply sum, which is what lets pattern
/// modulations layer without discontinuities.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ExpRamp {
    delta: f32,
    start: f64,
    duration: f64,
}

impl ExpRamp {
    #[inline]
    pub fn new(delta: f32, start: f64, duration: f64) -> Self {
        Self { delta, start, duration: duration.max(0.0) }
    }

    #[inline] pub fn delta(&self) -> f32 { self.delta }
    #[inline] pub fn end(&self) -> f64 { self.start + self.duration }

    /// Progress in [0, 1] at audio time `t`.
    #[inline]
    pub fn progress(&self, t: f64) -> f32 {
        if self.duration <= 0.0 || t >= self.end() {
            1.0
        } else if t <= self.start {
            0.0
        } else {
            ((t - self.start) / self.duration) as f32
        }
    }

    /// Offset contributed at audio time `t`.
    #[inline]
    pub fn offset_at(&self, t: f64) -> f32 {
        let p = self.progress(t);
        if p >= 1.0 { self.delta } else { self.delta * exp_approach(p) }
    }

    #[inline]
    pub fn is_finished(&self, t: f64) -> bool {
        self.progress(t) >= 1.0
    }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn approach_curve_is_monotonic_and_decelerating() {
        let mut prev = exp_approach(0.0);
        let mut prev_step = f32::INFINITY;
        assert_eq!(prev, 0.0);
        for i in 1..=100 {
            let v = exp_approach(i as f32 / 100.0);
            let step = v - prev;
            assert!(step > 0.0, "i={} step={}", i, step);
            assert!(step <= prev_step + 1e-6, "curve sped up at i={}", i);
            prev = v;
            prev_step = step;
        }
        assert_eq!(prev, 1.0);
    }

    #[test]
    fn ramp_reaches_delta_exactly_at_end() {
        let r = ExpRamp::new(10.0, 2.0, 0.5);
        assert_eq!(r.offset_at(1.0), 0.0);
        assert_eq!(r.offset_at(2.0), 0.0);
        let mid = r.offset_at(2.25);
        assert!(mid > 5.0 && mid < 10.0, "mid={}", mid);
        assert_eq!(r.offset_at(2.5), 10.0);
        assert_eq!(r.offset_at(9.0), 10.0);
        assert!(r.is_finished(2.5));
        assert!(!r.is_finished(2.49));
    }

    #[test]
    fn negative_ramp_glides_down() {
        let r = ExpRamp::new(-8.0, 0.0, 0.4);
        let a = r.offset_at(0.1);
        let b = r.offset_at(0.2);
        assert!(a < 0.0 && b < a);
        assert_eq!(r.offset_at(0.4), -8.0);
    }

    #[test]
    fn zero_duration_ramp_is_a_step() {
        let r = ExpRamp::new(3.0, 1.0, 0.0);
        assert_eq!(r.offset_at(1.0), 3.0);
        assert!(r.is_finished(1.0));
    }

    #[test]
    fn smoothing_closes_eight_percent_per_tick() {
        let mut y = 0.0;
        for n in 1..=50 {
            y = smooth_toward(y, 1.0, 0.08);
            assert_abs_diff_eq!(1.0 - y, 0.92_f32.powi(n), epsilon = 1e-5);
        }
    }

    #[test]
    fn smoothing_factor_is_clamped() {
        assert_eq!(smooth_toward(0.0, 1.0, 2.0), 1.0);
        assert_eq!(smooth_toward(0.3, 1.0, -1.0), 0.3);
    }
}
