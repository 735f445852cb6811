//! Read-only view of the engine for display.

use resonaural_core::dsp::{clamp, lerp};
use serde::Serialize;

use crate::states::BrainwaveState;

/// What a UI may observe about the engine.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub state: BrainwaveState,
    /// Hz; 0 when inactive.
    pub left_frequency: f32,
    /// Hz; 0 when inactive.
    pub right_frequency: f32,
    pub is_active: bool,
    /// Smoothed output intensity in [0, 1].
    pub intensity: f32,
}

impl EngineSnapshot {
    pub fn inactive(state: BrainwaveState) -> Self {
        Self { state, left_frequency: 0.0, right_frequency: 0.0, is_active: false, intensity: 0.0 }
    }

    /// Perceived beat: the difference between the two ears.
    #[inline]
    pub fn beat_frequency(&self) -> f32 {
        (self.right_frequency - self.left_frequency).abs()
    }

    #[inline]
    pub fn pulse(&self) -> VisualPulse {
        VisualPulse::from_intensity(self.intensity)
    }
}

/// Visual feedback proportional to intensity, for focus elements.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct VisualPulse {
    /// 0.3 at rest, 1.0 at full intensity.
    pub opacity: f32,
    /// 1.0 at rest, 1.6 at full intensity.
    pub scale: f32,
}

impl VisualPulse {
    pub fn from_intensity(intensity: f32) -> Self {
        let g = clamp(intensity, 0.0, 1.0);
        Self { opacity: lerp(0.3, 1.0, g), scale: lerp(1.0, 1.6, g) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pulse_spans_rest_to_full() {
        let rest = VisualPulse::from_intensity(0.0);
        assert_eq!(rest, VisualPulse { opacity: 0.3, scale: 1.0 });
        let full = VisualPulse::from_intensity(1.0);
        assert_abs_diff_eq!(full.opacity, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(full.scale, 1.6, epsilon = 1e-6);
    }

    #[test]
    fn inactive_snapshot_reports_zero_frequencies() {
        let s = EngineSnapshot::inactive(BrainwaveState::Theta);
        assert!(!s.is_active);
        assert_eq!(s.beat_frequency(), 0.0);
        assert_eq!(s.pulse().opacity, 0.3);
    }

    #[test]
    fn serializes_with_lowercase_state() {
        let s = EngineSnapshot {
            state: BrainwaveState::Gamma,
            left_frequency: 528.0,
            right_frequency: 568.0,
            is_active: true,
            intensity: 0.5,
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"state\":\"gamma\""), "{json}");
        assert_eq!(s.beat_frequency(), 40.0);
    }
}
