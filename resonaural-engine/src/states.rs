//! Brainwave states and their frequency table.
//!
//! The table is process-wide immutable data: each state has a carrier
//! (base) frequency fed to the left ear and a beat frequency that the right
//! ear is offset by, scaled by intensity.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Named frequency presets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainwaveState {
    /// Deep sleep, 0.5–4 Hz beats.
    Delta,
    /// Meditation and creativity, 4–8 Hz.
    Theta,
    /// Relaxed alertness, 8–12 Hz.
    #[default]
    Alpha,
    /// High cognition, 30–100 Hz.
    Gamma,
}

/// Carrier and beat frequency for one state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StateFrequencies {
    pub base_hz: f32,
    pub beat_hz: f32,
}

impl StateFrequencies {
    /// `(left, right)` oscillator frequencies at the given beat intensity.
    #[inline]
    pub fn channel_frequencies(&self, intensity: f32) -> (f32, f32) {
        (self.base_hz, self.base_hz + self.beat_hz * intensity)
    }
}

impl BrainwaveState {
    pub const ALL: [BrainwaveState; 4] = [Self::Delta, Self::Theta, Self::Alpha, Self::Gamma];

    #[inline]
    pub fn frequencies(self) -> StateFrequencies {
        STATE_TABLE[self as usize]
    }

    /// Carrier frequency in Hz.
    #[inline]
    pub fn base_frequency(self) -> f32 {
        self.frequencies().base_hz
    }

    /// Binaural difference between the two ears in Hz (at intensity 1).
    #[inline]
    pub fn beat_frequency(self) -> f32 {
        self.frequencies().beat_hz
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delta => "delta",
            Self::Theta => "theta",
            Self::Alpha => "alpha",
            Self::Gamma => "gamma",
        }
    }
}

// Indexed by discriminant: Delta, Theta, Alpha, Gamma.
static STATE_TABLE: [StateFrequencies; 4] = [
    StateFrequencies { base_hz: 285.0, beat_hz: 0.5 },
    StateFrequencies { base_hz: 396.0, beat_hz: 5.0 },
    StateFrequencies { base_hz: 432.0, beat_hz: 10.0 },
    StateFrequencies { base_hz: 528.0, beat_hz: 40.0 },
];

impl FromStr for BrainwaveState {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delta" => Ok(Self::Delta),
            "theta" => Ok(Self::Theta),
            "alpha" => Ok(Self::Alpha),
            "gamma" => Ok(Self::Gamma),
            _ => Err(EngineError::InvalidState { name: s.to_string() }),
        }
    }
}

impl fmt::Display for BrainwaveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base frequency for a state given by name.
pub fn base_frequency(name: &str) -> Result<f32> {
    Ok(name.parse::<BrainwaveState>()?.base_frequency())
}

/// Beat frequency for a state given by name.
pub fn beat_frequency(name: &str) -> Result<f32> {
    Ok(name.parse::<BrainwaveState>()?.beat_frequency())
}
