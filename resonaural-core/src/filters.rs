//! Filters: the TPT state-variable lowpass used on each binaural channel.
//!
//! Goals
//! - `no_std`-friendly, allocation free
//! - Stable under parameter modulation
//! - Clear APIs and predictable parameterization
//!
//! Notes
//! - `SvfTpt` uses the “g = tan(π fc / sr)” formulation with `R = 1/(2Q)`.
//! - The cutoff is kept strictly positive; a zero cutoff would silence the
//!   channel and break the `cutoff > 0` invariant of the graph.

use crate::dsp::{kill_denormals, tpt_g};
use core::fmt::Debug;

/// Lowest cutoff we accept, in Hz.
pub const MIN_CUTOFF_HZ: f32 = 1.0;

/// Butterworth-ish default resonance.
pub const DEFAULT_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

/// Topology-Preserving Transform SVF (State-Variable Filter), lowpass tap.
///
/// Parameters:
/// - `cut_hz`  : cutoff frequency in Hz
/// - `q`       : quality factor (>= ~0.5 typical; lower increases damping)
///
/// Internals:
/// - `g = tan(π fc / sr)`
/// - `R = 1 / (2Q)`
#[derive(Copy, Clone, Debug)]
pub struct SvfTpt {
    sr: f32,
    cut: f32,
    q: f32,
    // derived
    g: f32,
    r: f32,
    // states
    ic1eq: f32,
    ic2eq: f32,
}

impl SvfTpt {
    #[inline]
    pub fn new(cut_hz: f32, q: f32, sr: f32) -> Self {
        let mut s = Self {
            sr: sr.max(1.0),
            cut: cut_hz.max(MIN_CUTOFF_HZ),
            q: q.max(1e-4),
            g: 0.0,
            r: 0.0,
            ic1eq: 0.0,
            ic2eq: 0.0,
        };
        s.recalc();
        s
    }

    #[inline] pub fn set_sample_rate(&mut self, sr: f32) { self.sr = sr.max(1.0); self.recalc(); }
    #[inline] pub fn set_cutoff_hz(&mut self, cut_hz: f32) { self.cut = cut_hz.max(MIN_CUTOFF_HZ); self.recalc(); }
    #[inline] pub fn set_q(&mut self, q: f32) { self.q = q.max(1e-4); self.recalc(); }

    #[inline] pub fn cutoff_hz(&self) -> f32 { self.cut }
    #[inline] pub fn q(&self) -> f32 { self.q }

    #[inline]
    fn recalc(&mut self) {
        self.g = tpt_g(self.cut, self.sr);       // tan(π fc / sr)
        self.r = 1.0 / (2.0 * self.q);           // damping
    }

    /// Clear the integrator states (e.g. when a session restarts).
    #[inline]
    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    /// Process one sample through the lowpass tap.
    #[inline]
    pub fn process_lp(&mut self, x: f32) -> f32 {
        // TPT SVF (Zavalishin/Simper form), k = 2R = 1/Q:
        // v1 = a1*ic1eq + a2*(x - ic2eq), v2 = ic2eq + g*v1
        let g = self.g;
        let k = 2.0 * self.r;
        let a1 = 1.0 / (1.0 + g * (g + k));
        let a2 = g * a1;
        let a3 = g * a2;

        let v3 = x - self.ic2eq;
        let v1 = a1 * self.ic1eq + a2 * v3;
        let v2 = self.ic2eq + a2 * self.ic1eq + a3 * v3;

        self.ic1eq = kill_denormals(2.0 * v1 - self.ic1eq);
        self.ic2eq = kill_denormals(2.0 * v2 - self.ic2eq);

        v2
    }
}

// ------------------------------------ Tests --------------------------------------
