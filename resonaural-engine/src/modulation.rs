//! Mapping external signals to engine targets.
//!
//! Everything here is pure; [`EngineSession`](crate::session::EngineSession)
//! applies the results to the graph.

use resonaural_core::dsp::clamp;

use crate::payload::{PatternTag, ResonancePayload};
use crate::states::BrainwaveState;

/// Resonance above this selects gamma.
pub const HIGH_RESONANCE: f32 = 0.7;
/// Resonance below this selects theta.
pub const LOW_RESONANCE: f32 = 0.3;
/// Joy above this overrides to gamma at the joy level.
pub const JOY_OVERRIDE: f32 = 0.7;
/// Fear above this overrides to delta at half the fear level.
pub const FEAR_OVERRIDE: f32 = 0.6;

/// State and beat intensity derived from one payload.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModulationTarget {
    pub state: BrainwaveState,
    pub intensity: f32,
}

/// Derive the target state from a payload.
///
/// The raw resonance decides first, then the collective emotions are checked
/// and, when one crosses its threshold, overwrite that decision. The
/// intensity is clamped into [0, 1], as the session applies it.
pub fn derive_target(payload: &ResonancePayload) -> ModulationTarget {
    let resonance = payload.resonance();

    let mut target = ModulationTarget { state: BrainwaveState::Alpha, intensity: 0.5 };
    if resonance > HIGH_RESONANCE {
        target = ModulationTarget { state: BrainwaveState::Gamma, intensity: 0.8 };
    } else if resonance < LOW_RESONANCE {
        target = ModulationTarget { state: BrainwaveState::Theta, intensity: 0.6 };
    }

    let joy = payload.emotion_level("joy");
    let fear = payload.emotion_level("fear");
    if joy > JOY_OVERRIDE {
        target = ModulationTarget { state: BrainwaveState::Gamma, intensity: joy };
    } else if fear > FEAR_OVERRIDE {
        target = ModulationTarget { state: BrainwaveState::Delta, intensity: fear * 0.5 };
    }

    target.intensity = clamp(target.intensity, 0.0, 1.0);
    target
}

/// Recognized pattern modulations in payload order, as `(delta Hz, seconds)`.
pub fn pattern_modulations(tags: &[String]) -> impl Iterator<Item = (f32, f64)> + '_ {
    tags.iter().filter_map(|tag| match PatternTag::parse(tag) {
        Some(t) => Some(t.modulation()),
        None => {
            tracing::trace!(tag = %tag, "ignoring unrecognized pattern tag");
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(state: BrainwaveState, intensity: f32) -> ModulationTarget {
        ModulationTarget { state, intensity }
    }

    #[test]
    fn neutral_resonance_is_alpha() {
        assert_eq!(derive_target(&ResonancePayload::default()), target(BrainwaveState::Alpha, 0.5));
        assert_eq!(derive_target(&ResonancePayload::with_resonance(0.7)), target(BrainwaveState::Alpha, 0.5));
        assert_eq!(derive_target(&ResonancePayload::with_resonance(0.3)), target(BrainwaveState::Alpha, 0.5));
    }

    #[test]
    fn high_and_low_resonance() {
        assert_eq!(derive_target(&ResonancePayload::with_resonance(0.9)), target(BrainwaveState::Gamma, 0.8));
        assert_eq!(derive_target(&ResonancePayload::with_resonance(0.1)), target(BrainwaveState::Theta, 0.6));
        assert_eq!(derive_target(&ResonancePayload::with_resonance(0.05)), target(BrainwaveState::Theta, 0.6));
    }

    #[test]
    fn zero_or_null_resonance_is_treated_as_missing() {
        let zero = ResonancePayload::from_json(r#"{"resonance_frequency":0}"#).unwrap();
        assert_eq!(derive_target(&zero), target(BrainwaveState::Alpha, 0.5));
        let null = ResonancePayload::from_json(r#"{"resonance_frequency":null}"#).unwrap();
        assert_eq!(derive_target(&null), target(BrainwaveState::Alpha, 0.5));
    }

    #[test]
    fn emotion_intensity_is_clamped() {
        let p = ResonancePayload::default().emotion("joy", 1.5);
        assert_eq!(derive_target(&p), target(BrainwaveState::Gamma, 1.0));
        let p = ResonancePayload::default().emotion("fear", 3.0);
        assert_eq!(derive_target(&p), target(BrainwaveState::Delta, 1.0));
    }

    #[test]
    fn joy_overrides_resonance() {
        let p = ResonancePayload::with_resonance(0.9).emotion("joy", 0.9);
        assert_eq!(derive_target(&p), target(BrainwaveState::Gamma, 0.9));

        let p = ResonancePayload::with_resonance(0.1).emotion("joy", 0.75);
        assert_eq!(derive_target(&p), target(BrainwaveState::Gamma, 0.75));
    }

    #[test]
    fn fear_overrides_resonance() {
        let p = ResonancePayload::with_resonance(0.9).emotion("fear", 0.8);
        assert_eq!(derive_target(&p), target(BrainwaveState::Delta, 0.4));
    }

    #[test]
    fn joy_wins_over_fear() {
        let p = ResonancePayload::default().emotion("joy", 0.8).emotion("fear", 0.9);
        assert_eq!(derive_target(&p).state, BrainwaveState::Gamma);
    }

    #[test]
    fn emotions_below_threshold_do_not_override() {
        let p = ResonancePayload::with_resonance(0.9).emotion("joy", 0.7).emotion("fear", 0.6);
        assert_eq!(derive_target(&p), target(BrainwaveState::Gamma, 0.8));
    }

    #[test]
    fn nan_resonance_falls_back_to_alpha() {
        assert_eq!(derive_target(&ResonancePayload::with_resonance(f32::NAN)), target(BrainwaveState::Alpha, 0.5));
    }

    #[test]
    fn unknown_tags_are_skipped_in_order() {
        let tags: Vec<String> = ["collective_tension", "unknown_tag", "expansive_collective"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mods: Vec<_> = pattern_modulations(&tags).collect();
        assert_eq!(mods, vec![(-8.0, 0.4), (5.0, 0.3)]);
    }
}
