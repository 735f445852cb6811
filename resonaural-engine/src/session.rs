//! The live engine session: graph + brainwave state + intensity targets.
//!
//! A session exists only while the engine is active. It is shared between
//! the control thread, the animation loop and the backend's render thread
//! through a [`SharedSession`]; one mutex guards all of it so frequency and
//! gain writes are observed together by the renderer.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use resonaural_core::dsp::clamp;
use resonaural_core::ramps::smooth_toward;

use crate::config::EngineConfig;
use crate::graph::{AudioGraph, Side};
use crate::modulation::{derive_target, pattern_modulations, ModulationTarget};
use crate::payload::{ResonancePayload, TriggerKind};
use crate::scheduler::DelayedReset;
use crate::snapshot::EngineSnapshot;
use crate::states::BrainwaveState;

#[derive(Debug)]
pub struct EngineSession {
    graph: AudioGraph,
    state: BrainwaveState,
    beat_intensity: f32,
    current_intensity: f32,
    target_intensity: f32,
    reset: DelayedReset,
    smoothing: f32,
    reset_delay: Duration,
    idle_intensity: f32,
    draw_intensity: f32,
    full_intensity: f32,
}

impl EngineSession {
    /// Build a session at the default state with silent output, oscillators running.
    pub fn open(sample_rate: f32, cfg: &EngineConfig) -> Self {
        let state = BrainwaveState::default();
        let beat_intensity = 1.0;
        let (left, right) = state.frequencies().channel_frequencies(beat_intensity);
        let mut graph = AudioGraph::new(sample_rate, left, right, cfg.graph_settings());
        graph.start();
        Self {
            graph,
            state,
            beat_intensity,
            current_intensity: 0.0,
            target_intensity: cfg.idle_intensity,
            reset: DelayedReset::default(),
            smoothing: cfg.smoothing,
            reset_delay: cfg.reset_delay(),
            idle_intensity: cfg.idle_intensity,
            draw_intensity: cfg.draw_intensity,
            full_intensity: cfg.full_intensity,
        }
    }

    /// Tear down: cancel the pending reset and halt the oscillators.
    pub fn close(mut self) -> u64 {
        self.reset.cancel();
        self.graph.dispose()
    }

    #[inline] pub fn state(&self) -> BrainwaveState { self.state }
    #[inline] pub fn beat_intensity(&self) -> f32 { self.beat_intensity }
    #[inline] pub fn current_intensity(&self) -> f32 { self.current_intensity }
    #[inline] pub fn target_intensity(&self) -> f32 { self.target_intensity }
    #[inline] pub fn reset_pending(&self) -> bool { self.reset.is_pending() }
    #[inline] pub fn graph(&self) -> &AudioGraph { &self.graph }
    #[inline] pub fn graph_mut(&mut self) -> &mut AudioGraph { &mut self.graph }

    /// Switch state: left := base, right := base + beat × intensity, set
    /// instantly so the next rendered frame carries the new pair.
    pub fn set_brainwave_state(&mut self, state: BrainwaveState, intensity: f32) {
        let intensity = clamp(intensity, 0.0, 1.0);
        let (left, right) = state.frequencies().channel_frequencies(intensity);
        self.state = state;
        self.beat_intensity = intensity;
        self.graph.set_frequency(Side::Left, left);
        self.graph.set_frequency(Side::Right, right);
        tracing::debug!(%state, intensity, left, right, "brainwave state set");
    }

    /// Set the target output intensity, clamped into [0, 1].
    #[inline]
    pub fn set_intensity(&mut self, target: f32) {
        self.target_intensity = clamp(target, 0.0, 1.0);
    }

    /// Pulse the intensity and arm the decay back to idle at `now + reset_delay`.
    pub fn trigger(&mut self, kind: TriggerKind, now: Duration) {
        let level = match kind {
            TriggerKind::Draw => self.draw_intensity,
            TriggerKind::Full => self.full_intensity,
        };
        self.set_intensity(level);
        self.reset.arm(now, self.reset_delay, self.idle_intensity);
    }

    /// Layer a frequency glide on both channels.
    #[inline]
    pub fn modulate_frequency(&mut self, delta_hz: f32, duration_s: f64) {
        self.graph.ramp_frequencies(delta_hz, duration_s);
    }

    /// Apply a resonance payload: derived state first, then every recognized
    /// pattern ramp, in order, on top of the frequencies just set.
    pub fn apply_resonance(&mut self, payload: &ResonancePayload) -> ModulationTarget {
        let target = derive_target(payload);
        self.set_brainwave_state(target.state, target.intensity);
        for (delta, secs) in pattern_modulations(&payload.emerging_patterns) {
            self.modulate_frequency(delta, secs);
        }
        target
    }

    /// Shift the stereo image: left pan := -x, right pan := x, with x in [-1, 1].
    pub fn set_spatial_position(&mut self, x: f32) {
        let x = clamp(x, -1.0, 1.0);
        self.graph.set_pan(Side::Left, -x);
        self.graph.set_pan(Side::Right, x);
    }

    /// Restore the hard-left / hard-right binaural layout.
    pub fn reset_spatial_position(&mut self) {
        for side in Side::BOTH {
            self.graph.set_pan(side, side.home_pan());
        }
    }

    /// Apply the decay back to idle if its deadline has passed by `now`.
    pub fn settle_reset(&mut self, now: Duration) {
        if let Some(level) = self.reset.poll(now) {
            self.target_intensity = level;
        }
    }

    /// One animation step: fire a due reset, then close `smoothing` of the
    /// gap to the target and publish the result as output gain.
    pub fn tick(&mut self, now: Duration) -> f32 {
        self.settle_reset(now);
        self.current_intensity = smooth_toward(self.current_intensity, self.target_intensity, self.smoothing);
        self.graph.set_gain(self.current_intensity);
        self.current_intensity
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            state: self.state,
            left_frequency: self.graph.frequency(Side::Left),
            right_frequency: self.graph.frequency(Side::Right),
            is_active: true,
            intensity: self.current_intensity,
        }
    }
}

/// Session slot shared with the animation loop and the renderer.
/// `None` means the engine is inactive.
#[derive(Clone, Debug, Default)]
pub struct SharedSession {
    inner: Arc<Mutex<Option<EngineSession>>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the slot. A poisoned lock is recovered: the session holds plain
    /// numbers and stays consistent across a panicking holder.
    pub fn lock(&self) -> MutexGuard<'_, Option<EngineSession>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Run `f` on the live session, or return `None` when inactive.
    pub fn with<R>(&self, f: impl FnOnce(&mut EngineSession) -> R) -> Option<R> {
        self.lock().as_mut().map(f)
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    /// Fill an interleaved device buffer; silence when inactive.
    pub fn render<T: Copy>(&self, out: &mut [T], channels: usize, conv: impl Fn(f32) -> T) {
        let mut slot = self.lock();
        match slot.as_mut() {
            Some(session) => session.graph.render_interleaved(out, channels, conv),
            None => out.fill(conv(0.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn session() -> EngineSession {
        EngineSession::open(48000.0, &EngineConfig::manual())
    }

    #[test]
    fn opens_on_alpha_silent_and_running() {
        let s = session();
        assert_eq!(s.state(), BrainwaveState::Alpha);
        assert_eq!(s.graph().frequency(Side::Left), 432.0);
        assert_eq!(s.graph().frequency(Side::Right), 442.0);
        assert_eq!(s.graph().gain(), 0.0);
        assert!(s.graph().channel(Side::Left).is_running());
        assert!(s.graph().channel(Side::Right).is_running());
    }

    #[test]
    fn intensity_is_clamped() {
        let mut s = session();
        s.set_brainwave_state(BrainwaveState::Gamma, 3.0);
        assert_eq!(s.beat_intensity(), 1.0);
        assert_eq!(s.graph().frequency(Side::Right), 568.0);
        s.set_brainwave_state(BrainwaveState::Gamma, -1.0);
        assert_eq!(s.graph().frequency(Side::Right), 528.0);
    }

    #[test]
    fn tick_fires_reset_then_smooths() {
        let mut s = session();
        s.trigger(TriggerKind::Full, Duration::ZERO);
        assert_eq!(s.target_intensity(), 1.0);
        let g = s.tick(Duration::from_millis(16));
        assert_abs_diff_eq!(g, 0.08, epsilon = 1e-6);
        assert_eq!(s.graph().gain(), g);
        s.tick(Duration::from_millis(2200));
        assert_eq!(s.target_intensity(), 0.2);
    }

    #[test]
    fn spatial_position_inverts_pans() {
        let mut s = session();
        s.set_spatial_position(0.25);
        assert_eq!(s.graph().pan(Side::Left), -0.25);
        assert_eq!(s.graph().pan(Side::Right), 0.25);
        s.set_spatial_position(-4.0);
        assert_eq!(s.graph().pan(Side::Left), 1.0);
        assert_eq!(s.graph().pan(Side::Right), -1.0);
        s.reset_spatial_position();
        assert_eq!(s.graph().pan(Side::Left), -1.0);
        assert_eq!(s.graph().pan(Side::Right), 1.0);
    }

    #[test]
    fn shared_slot_renders_silence_when_empty() {
        let shared = SharedSession::new();
        let mut buf = [1.0f32; 32];
        shared.render(&mut buf, 2, |s| s);
        assert!(buf.iter().all(|s| *s == 0.0));
        assert!(!shared.is_active());
    }
}
