//! Resonaural Engine — binaural beat synthesis driven by resonance events.
//!
//! Crate layout:
//! - [`states`]     : brainwave states and their base/beat frequency table
//! - [`nodes`]      : oscillator, frequency automation, panner, gain
//! - [`graph`]      : the fixed two-channel graph (`Side`, `Channel`, `AudioGraph`)
//! - [`payload`]    : resonance payloads, pattern tags, trigger kinds
//! - [`modulation`] : payload → (state, intensity) derivation, tag → ramp table
//! - [`scheduler`]  : delayed intensity reset, background animation loop
//! - [`clock`]      : wall and simulated control clocks
//! - [`session`]    : the live session and its shared slot
//! - [`engine`]     : `BinauralEngine` lifecycle and control surface
//! - [`backend`]    : output device seam + offline pull backend
//! - [`realtime`]   : CPAL backend (feature `realtime`)
//! - [`config`], [`error`], [`snapshot`]
//!
//! The render path does no allocation; control calls take one lock.

pub mod backend;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod modulation;
pub mod nodes;
pub mod payload;
#[cfg(feature = "realtime")]
pub mod realtime;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod states;

// Re-export some commonly used items to make downstream imports ergonomic.
pub use backend::{AudioBackend, OfflineBackend, OfflineDevice, OutputDevice};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use engine::BinauralEngine;
pub use error::{EngineError, Result};
pub use graph::{AudioGraph, Side};
pub use modulation::ModulationTarget;
pub use payload::{PatternTag, ResonancePayload, TriggerKind};
#[cfg(feature = "realtime")]
pub use realtime::{CpalBackend, CpalDevice};
pub use snapshot::{EngineSnapshot, VisualPulse};
pub use states::BrainwaveState;
