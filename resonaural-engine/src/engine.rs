//! Engine lifecycle and the public control surface.
//!
//! [`BinauralEngine`] owns at most one [`EngineSession`] at a time:
//! - `init` acquires the output device, opens the session and (optionally)
//!   starts the animation loop; calling it again while active does nothing.
//! - `stop` halts the loop, closes the session and releases the device;
//!   calling it while inactive does nothing.
//!
//! Every modulation call on an inactive engine is a logged no-op. Only
//! device failures surface as errors.
//!
//! Threading: the control methods are meant to be called from one thread.
//! The animation loop and the backend render thread share the session with
//! it through a single lock.

use tracing::{debug, info, trace};

use crate::backend::{AudioBackend, OutputDevice};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::graph::Side;
use crate::modulation::ModulationTarget;
use crate::payload::{ResonancePayload, TriggerKind};
use crate::scheduler::AnimationLoop;
use crate::session::{EngineSession, SharedSession};
use crate::snapshot::EngineSnapshot;
use crate::states::BrainwaveState;

pub struct BinauralEngine<B: AudioBackend, C: Clock = SystemClock> {
    backend: B,
    clock: C,
    config: EngineConfig,
    shared: SharedSession,
    device: Option<B::Device>,
    ticker: Option<AnimationLoop>,
    last_state: BrainwaveState,
}

impl<B: AudioBackend> BinauralEngine<B, SystemClock> {
    pub fn new(backend: B, config: EngineConfig) -> Self {
        Self::with_clock(backend, config, SystemClock::new())
    }
}

impl<B: AudioBackend, C: Clock> BinauralEngine<B, C> {
    pub fn with_clock(backend: B, config: EngineConfig, clock: C) -> Self {
        Self {
            backend,
            clock,
            config,
            shared: SharedSession::new(),
            device: None,
            ticker: None,
            last_state: BrainwaveState::default(),
        }
    }

    #[inline] pub fn config(&self) -> &EngineConfig { &self.config }
    #[inline] pub fn clock(&self) -> &C { &self.clock }
    #[inline] pub fn backend(&self) -> &B { &self.backend }

    /// The acquired output device, while active.
    #[inline]
    pub fn device(&self) -> Option<&B::Device> {
        self.device.as_ref()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.device.is_some()
    }

    // ---------------------------------------------------------------- lifecycle

    /// Acquire the device and start a session. No-op when already active.
    ///
    /// On failure the engine stays inactive and `init` may be retried.
    pub fn init(&mut self) -> Result<()> {
        if self.is_active() {
            debug!("init while active; ignoring");
            return Ok(());
        }
        self.config.validate()?;

        let device = self.backend.acquire(self.shared.clone())?;
        let sample_rate = device.sample_rate();
        *self.shared.lock() = Some(EngineSession::open(sample_rate as f32, &self.config));

        if self.config.auto_tick {
            let shared = self.shared.clone();
            let clock = self.clock.clone();
            let spawned = AnimationLoop::spawn(self.config.tick_interval(), move || {
                shared.with(|s| s.tick(clock.now())).is_some()
            });
            match spawned {
                Ok(ticker) => self.ticker = Some(ticker),
                Err(e) => {
                    if let Some(session) = self.shared.lock().take() {
                        session.close();
                    }
                    device.release();
                    return Err(e);
                }
            }
        }

        self.device = Some(device);
        self.last_state = BrainwaveState::default();
        info!(sample_rate, auto_tick = self.config.auto_tick, "binaural engine initialized");
        Ok(())
    }

    /// Halt ticking, close the session and release the device. No-op when inactive.
    pub fn stop(&mut self) {
        let Some(device) = self.device.take() else {
            return;
        };
        // Stop the loop first so no tick can land on a closing session.
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
        if let Some(session) = self.shared.lock().take() {
            self.last_state = session.state();
            let frames = session.close();
            debug!(frames, "session closed");
        }
        device.release();
        info!("binaural engine stopped");
    }

    /// Alias of [`stop`](Self::stop).
    #[inline]
    pub fn dispose(&mut self) {
        self.stop();
    }

    // --------------------------------------------------------------- modulation

    fn with_session<R>(&self, op: &str, f: impl FnOnce(&mut EngineSession) -> R) -> Option<R> {
        let out = self.shared.with(f);
        if out.is_none() {
            debug!(op, "engine inactive; ignoring");
        }
        out
    }

    /// Switch brainwave state; intensity is clamped into [0, 1].
    pub fn set_brainwave_state(&self, state: BrainwaveState, intensity: f32) {
        self.with_session("set_brainwave_state", |s| s.set_brainwave_state(state, intensity));
    }

    /// Like [`set_brainwave_state`](Self::set_brainwave_state) with the state
    /// given by name. Unknown names are an `InvalidState` error.
    pub fn set_brainwave_state_named(&self, name: &str, intensity: f32) -> Result<()> {
        let state: BrainwaveState = name.parse()?;
        self.set_brainwave_state(state, intensity);
        Ok(())
    }

    /// Set the target output intensity (clamped into [0, 1]).
    pub fn set_intensity(&self, target: f32) {
        self.with_session("set_intensity", |s| s.set_intensity(target));
    }

    /// Pulse on `"draw"` or `"full"`; other kinds are ignored.
    pub fn trigger_event(&self, kind: &str) {
        match TriggerKind::parse(kind) {
            Some(k) => self.trigger(k),
            None => trace!(kind, "ignoring unrecognized trigger"),
        }
    }

    pub fn trigger(&self, kind: TriggerKind) {
        let now = self.clock.now();
        self.with_session("trigger", |s| s.trigger(kind, now));
    }

    /// Apply a resonance payload. Returns the derived target, or `None`
    /// when the engine is inactive.
    pub fn update_from_resonance(&self, payload: &ResonancePayload) -> Option<ModulationTarget> {
        self.with_session("update_from_resonance", |s| s.apply_resonance(payload))
    }

    /// Glide both oscillators by `delta_hz` over `duration_s` seconds.
    pub fn modulate_frequency(&self, delta_hz: f32, duration_s: f64) {
        self.with_session("modulate_frequency", |s| s.modulate_frequency(delta_hz, duration_s));
    }

    /// Shift the stereo image (left := -x, right := x).
    ///
    /// This overrides the hard-left/hard-right layout the binaural effect
    /// relies on; call [`reset_spatial_position`](Self::reset_spatial_position)
    /// to get it back.
    pub fn set_spatial_position(&self, x: f32) {
        self.with_session("set_spatial_position", |s| s.set_spatial_position(x));
    }

    pub fn reset_spatial_position(&self) {
        self.with_session("reset_spatial_position", |s| s.reset_spatial_position());
    }

    // ---------------------------------------------------------------- animation

    /// Run one animation step by hand (for hosts with `auto_tick = false`).
    /// Returns the new output intensity, or `None` when inactive.
    pub fn tick(&self) -> Option<f32> {
        let now = self.clock.now();
        self.shared.with(|s| s.tick(now))
    }

    /// Whether the background animation loop is running.
    pub fn is_animating(&self) -> bool {
        self.ticker.as_ref().is_some_and(AnimationLoop::is_running)
    }

    // --------------------------------------------------------------- read path

    pub fn snapshot(&self) -> EngineSnapshot {
        self.shared
            .with(|s| s.snapshot())
            .unwrap_or_else(|| EngineSnapshot::inactive(self.last_state))
    }

    /// Target output intensity, while active. A decay whose deadline has
    /// passed is applied first, so reads agree with the control clock even
    /// between ticks.
    pub fn target_intensity(&self) -> Option<f32> {
        let now = self.clock.now();
        self.shared.with(|s| {
            s.settle_reset(now);
            s.target_intensity()
        })
    }

    /// Whether a decay back to idle is still scheduled.
    pub fn reset_pending(&self) -> bool {
        let now = self.clock.now();
        self.shared
            .with(|s| {
                s.settle_reset(now);
                s.reset_pending()
            })
            .unwrap_or(false)
    }

    /// Current `(left, right)` pan positions, while active.
    pub fn pans(&self) -> Option<(f32, f32)> {
        self.shared.with(|s| (s.graph().pan(Side::Left), s.graph().pan(Side::Right)))
    }

    /// Handle on the session slot, for hosts that render on their own thread.
    ///
    /// Rendering through it only takes the session lock and never touches the
    /// engine itself; it renders silence while the engine is inactive.
    #[inline]
    pub fn session(&self) -> SharedSession {
        self.shared.clone()
    }
}

impl<B: AudioBackend, C: Clock> Drop for BinauralEngine<B, C> {
    fn drop(&mut self) {
        self.stop();
    }
}
