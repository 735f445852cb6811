//! Building blocks (nodes) for the binaural graph.
//!
//! These are small per-sample components designed for realtime use. The
//! only heap storage is the short ramp list inside [`FreqParam`], which is
//! reserved up front and only grows from the control thread.
//!
//! Contents:
//! - `Osc`         : sine oscillator with stable phase wrap and a run flag
//! - `FreqParam`   : frequency automation (instant set + layered exp ramps)
//! - `StereoPanner`: equal-power mono→stereo panner
//! - `Gain`        : output gain scalar
//!
//! Notes:
//! - Frequency is **Hz**; methods expect the current **sample rate** when stepping.

use resonaural_core::dsp::{clamp, equal_power_gains, sine01, wrap_phase01};
use resonaural_core::ramps::ExpRamp;
use core::fmt::Debug;

/// Lowest oscillator frequency the graph will produce.
pub const MIN_FREQUENCY_HZ: f32 = 1.0;

/// Ramps kept inline before the list has to grow.
const RAMP_CAPACITY: usize = 8;

/// Free-running sine oscillator.
#[derive(Copy, Clone, Debug)]
pub struct Osc {
    phase: f32,   // [0,1)
    running: bool,
}

impl Osc {
    #[inline] pub fn new() -> Self { Self { phase: 0.0, running: false } }
    #[inline] pub fn start(&mut self) { self.running = true; }
    #[inline] pub fn stop(&mut self) { self.running = false; }
    #[inline] pub fn is_running(&self) -> bool { self.running }

    /// Advance one sample at `freq` Hz and return the oscillator sample.
    /// A stopped oscillator outputs silence and keeps its phase.
    #[inline]
    pub fn next(&mut self, freq: f32, sr: f32) -> f32 {
        if !self.running {
            return 0.0;
        }
        self.phase = wrap_phase01(self.phase + freq / sr);
        sine01(self.phase)
    }
}

impl Default for Osc {
    fn default() -> Self { Self::new() }
}

/// Frequency parameter with instantaneous sets and layered exponential ramps.
///
/// The value at audio time `t` is `base + Σ ramp.offset_at(t)`. A `set`
/// discards in-flight ramps so the new value holds exactly.
#[derive(Clone, Debug)]
pub struct FreqParam {
    base: f32,
    ramps: Vec<ExpRamp>,
}

impl FreqParam {
    pub fn new(hz: f32) -> Self {
        Self { base: hz.max(MIN_FREQUENCY_HZ), ramps: Vec::with_capacity(RAMP_CAPACITY) }
    }

    /// Instantaneous value set.
    #[inline]
    pub fn set(&mut self, hz: f32) {
        self.base = hz.max(MIN_FREQUENCY_HZ);
        self.ramps.clear();
    }

    /// Glide by `delta_hz` over `duration_s`, starting at audio time `now`.
    #[inline]
    pub fn ramp_by(&mut self, delta_hz: f32, now: f64, duration_s: f64) {
        self.ramps.push(ExpRamp::new(delta_hz, now, duration_s));
    }

    /// Number of ramps still in flight (finished ones are folded by `settle`).
    #[inline] pub fn active_ramps(&self) -> usize { self.ramps.len() }

    /// Value at audio time `t`.
    #[inline]
    pub fn value_at(&self, t: f64) -> f32 {
        let offset: f32 = self.ramps.iter().map(|r| r.offset_at(t)).sum();
        (self.base + offset).max(MIN_FREQUENCY_HZ)
    }

    /// Fold finished ramps into the base value.
    #[inline]
    pub fn settle(&mut self, t: f64) {
        if self.ramps.is_empty() {
            return;
        }
        let mut folded = 0.0;
        self.ramps.retain(|r| {
            if r.is_finished(t) {
                folded += r.delta();
                false
            } else {
                true
            }
        });
        self.base += folded;
    }
}

/// Equal-power stereo panner for a mono input.
#[derive(Copy, Clone, Debug)]
pub struct StereoPanner {
    pan: f32,
    gl: f32,
    gr: f32,
}

impl StereoPanner {
    /// `pan` in [-1..1], where -1 = hard left, +1 = hard right.
    #[inline]
    pub fn new(pan: f32) -> Self {
        let mut s = Self { pan: 0.0, gl: 0.0, gr: 0.0 };
        s.set_pan(pan);
        s
    }

    #[inline]
    pub fn set_pan(&mut self, pan: f32) {
        self.pan = clamp(pan, -1.0, 1.0);
        (self.gl, self.gr) = equal_power_gains(self.pan);
    }

    #[inline] pub fn pan(&self) -> f32 { self.pan }

    /// Spread a mono sample into `(left, right)`.
    #[inline]
    pub fn process(&self, x: f32) -> (f32, f32) {
        (x * self.gl, x * self.gr)
    }
}

/// Output gain scalar in [0, 1].
#[derive(Copy, Clone, Debug, Default)]
pub struct Gain {
    value: f32,
}

impl Gain {
    #[inline] pub fn new(value: f32) -> Self { Self { value: clamp(value, 0.0, 1.0) } }
    #[inline] pub fn set(&mut self, value: f32) { self.value = clamp(value, 0.0, 1.0); }
    #[inline] pub fn value(&self) -> f32 { self.value }
    #[inline] pub fn apply(&self, x: f32) -> f32 { x * self.value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn stopped_oscillator_is_silent() {
        let mut osc = Osc::new();
        assert_eq!(osc.next(440.0, 48000.0), 0.0);
        osc.start();
        let mut peak: f32 = 0.0;
        for _ in 0..200 {
            peak = peak.max(osc.next(440.0, 48000.0).abs());
        }
        assert!(peak > 0.9);
        osc.stop();
        assert_eq!(osc.next(440.0, 48000.0), 0.0);
    }

    #[test]
    fn set_cancels_ramps() {
        let mut f = FreqParam::new(432.0);
        f.ramp_by(10.0, 0.0, 0.5);
        assert_eq!(f.active_ramps(), 1);
        f.set(528.0);
        assert_eq!(f.active_ramps(), 0);
        assert_eq!(f.value_at(1.0), 528.0);
    }

    #[test]
    fn ramps_layer_and_settle() {
        let mut f = FreqParam::new(432.0);
        f.ramp_by(10.0, 0.0, 0.5);
        f.ramp_by(5.0, 0.0, 0.3);
        let mid = f.value_at(0.2);
        assert!(mid > 432.0 && mid < 447.0, "mid={}", mid);
        assert_eq!(f.value_at(0.5), 447.0);

        f.settle(0.3);
        assert_eq!(f.active_ramps(), 1);
        f.settle(0.5);
        assert_eq!(f.active_ramps(), 0);
        assert_eq!(f.value_at(0.5), 447.0);
    }

    #[test]
    fn frequency_stays_positive() {
        let mut f = FreqParam::new(5.0);
        f.ramp_by(-50.0, 0.0, 0.1);
        assert_eq!(f.value_at(1.0), MIN_FREQUENCY_HZ);
    }

    #[test]
    fn panner_clamps_and_routes() {
        let mut p = StereoPanner::new(-1.0);
        let (l, r) = p.process(1.0);
        assert_abs_diff_eq!(l, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(r, 0.0, epsilon = 1e-3);

        p.set_pan(7.0);
        assert_eq!(p.pan(), 1.0);
    }

    #[test]
    fn gain_is_clamped() {
        let mut g = Gain::new(2.0);
        assert_eq!(g.value(), 1.0);
        g.set(-0.5);
        assert_eq!(g.value(), 0.0);
    }
}
