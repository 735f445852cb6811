//! External inputs: resonance payloads, pattern tags and trigger kinds.
//!
//! All three are open vocabularies on the wire. Parsing a tag or a trigger
//! kind yields `None` for anything unrecognized, and the engine skips it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Resonance used when a payload carries none (absent, `null` or `0`).
pub const DEFAULT_RESONANCE: f32 = 0.5;

/// Aggregate signal state pushed (or pulled) from the resonance feed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResonancePayload {
    /// Raw value from the feed; read it through [`resonance`](Self::resonance).
    #[serde(default)]
    pub resonance_frequency: Option<f32>,
    #[serde(default)]
    pub collective_emotions: HashMap<String, f32>,
    #[serde(default)]
    pub emerging_patterns: Vec<String>,
}

impl ResonancePayload {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_resonance(resonance: f32) -> Self {
        Self { resonance_frequency: Some(resonance), ..Self::default() }
    }

    /// Effective resonance. Feeds send `0` or `null` for "no reading", so
    /// those fall back to [`DEFAULT_RESONANCE`] like a missing field.
    #[inline]
    pub fn resonance(&self) -> f32 {
        self.resonance_frequency
            .filter(|r| *r != 0.0 && !r.is_nan())
            .unwrap_or(DEFAULT_RESONANCE)
    }

    pub fn emotion(mut self, name: &str, value: f32) -> Self {
        self.collective_emotions.insert(name.to_string(), value);
        self
    }

    pub fn pattern(mut self, tag: &str) -> Self {
        self.emerging_patterns.push(tag.to_string());
        self
    }

    /// Intensity of a named emotion; missing emotions read as 0.
    #[inline]
    pub fn emotion_level(&self, name: &str) -> f32 {
        self.collective_emotions.get(name).copied().unwrap_or(0.0)
    }
}

/// Pattern tags that modulate oscillator frequency.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PatternTag {
    ExpansiveCollective,
    HighResonance,
    CollectiveTension,
}

impl PatternTag {
    /// Recognize a tag, including the feed's Spanish aliases.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "expansive_collective" | "colectivo_expansivo" => Some(Self::ExpansiveCollective),
            "high_resonance" | "resonancia_alta" => Some(Self::HighResonance),
            "collective_tension" | "tension_colectiva" => Some(Self::CollectiveTension),
            _ => None,
        }
    }

    /// `(delta Hz, glide seconds)` applied to both oscillators.
    #[inline]
    pub fn modulation(self) -> (f32, f64) {
        match self {
            Self::ExpansiveCollective => (5.0, 0.3),
            Self::HighResonance => (10.0, 0.5),
            Self::CollectiveTension => (-8.0, 0.4),
        }
    }
}

/// Discrete UI cues that pulse the output intensity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Draw,
    Full,
}

impl TriggerKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "draw" => Some(Self::Draw),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let p = ResonancePayload::from_json("{}").unwrap();
        assert_eq!(p.resonance_frequency, None);
        assert_eq!(p.resonance(), 0.5);
        assert!(p.collective_emotions.is_empty());
        assert!(p.emerging_patterns.is_empty());
    }

    #[test]
    fn full_payload_decodes() {
        let p = ResonancePayload::from_json(
            r#"{"resonance_frequency":0.82,"collective_emotions":{"joy":0.9,"fear":0.1},"emerging_patterns":["high_resonance","mystery"]}"#,
        )
        .unwrap();
        assert_eq!(p.resonance(), 0.82);
        assert_eq!(p.emotion_level("joy"), 0.9);
        assert_eq!(p.emotion_level("anger"), 0.0);
        assert_eq!(p.emerging_patterns, vec!["high_resonance", "mystery"]);
    }

    #[test]
    fn null_or_zero_resonance_reads_as_default() {
        let p = ResonancePayload::from_json(r#"{"resonance_frequency":null,"emerging_patterns":["high_resonance"]}"#)
            .unwrap();
        assert_eq!(p.resonance(), 0.5);
        assert_eq!(p.emerging_patterns, vec!["high_resonance"]);

        let p = ResonancePayload::from_json(r#"{"resonance_frequency":0}"#).unwrap();
        assert_eq!(p.resonance_frequency, Some(0.0));
        assert_eq!(p.resonance(), 0.5);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ResonancePayload::from_json("{\"resonance_frequency\": \"high\"}").is_err());
    }

    #[test]
    fn tag_table() {
        assert_eq!(PatternTag::parse("expansive_collective").map(PatternTag::modulation), Some((5.0, 0.3)));
        assert_eq!(PatternTag::parse("high_resonance").map(PatternTag::modulation), Some((10.0, 0.5)));
        assert_eq!(PatternTag::parse("collective_tension").map(PatternTag::modulation), Some((-8.0, 0.4)));
        assert_eq!(PatternTag::parse("resonancia_alta"), Some(PatternTag::HighResonance));
        assert_eq!(PatternTag::parse("unknown_tag"), None);
    }

    #[test]
    fn trigger_kinds() {
        assert_eq!(TriggerKind::parse("draw"), Some(TriggerKind::Draw));
        assert_eq!(TriggerKind::parse("full"), Some(TriggerKind::Full));
        assert_eq!(TriggerKind::parse("shuffle"), None);
        assert_eq!(TriggerKind::parse("Draw"), None);
    }
}
