#![cfg_attr(not(feature = "std"), no_std)]
//! Resonaural Core — no_std-ready DSP primitives for the binaural engine.
//!
//! Features
//! - `std`      : (default) use the Rust standard library
//! - `no-std`   : build with `#![no_std]` and use `libm`/`micromath` math backends
//! - `fast-math`: enable polynomial approximations for trig
//!
//! Modules
//! - [`dsp`]     : math backend, utils (clamp, phase wrap, fast trig, pan law)
//! - [`filters`] : TPT state-variable lowpass
//! - [`ramps`]   : exponential frequency ramps and per-tick intensity smoothing
//!
//! Design
//! - No heap allocations; pure sample-by-sample primitives
//! - Clear separation between math helpers and the stateful building blocks
//! - Friendly to embedded / real-time targets

pub mod dsp;
pub mod filters;
pub mod ramps;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::dsp::{clamp, equal_power_gains, kill_denormals, lerp, sine01, tpt_g, wrap_phase01, TAU};
    pub use crate::filters::{SvfTpt, DEFAULT_Q, MIN_CUTOFF_HZ};
    pub use crate::ramps::{exp_approach, smooth_toward, ExpRamp, RAMP_SHARPNESS};
}
