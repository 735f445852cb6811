//! Engine configuration.
//!
//! Every field has a default matching the stock behaviour, so an empty TOML
//! document (or `EngineConfig::default()`) gives the reference engine.
//!
//! ```toml
//! filter_cutoff_hz = 1000.0
//! smoothing = 0.08
//! tick_interval_ms = 16
//! reset_delay_ms = 2200
//! idle_intensity = 0.2
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{EngineError, Result};
use crate::graph::GraphSettings;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Lowpass cutoff on both channels, Hz.
    pub filter_cutoff_hz: f32,
    /// Lowpass resonance.
    pub filter_q: f32,
    /// Share of the intensity gap closed per animation tick.
    pub smoothing: f32,
    /// Animation tick period.
    pub tick_interval_ms: u64,
    /// Spawn the background animation loop on `init`. Hosts that drive
    /// `tick()` themselves (FFI, tests) turn this off.
    pub auto_tick: bool,
    /// Delay before a trigger pulse decays back to idle.
    pub reset_delay_ms: u64,
    /// Target intensity the engine rests at after a pulse.
    pub idle_intensity: f32,
    /// Pulse level for a `"draw"` trigger.
    pub draw_intensity: f32,
    /// Pulse level for a `"full"` trigger.
    pub full_intensity: f32,
    /// Output device to open by name; `None` picks the host default.
    pub device: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            filter_cutoff_hz: 1000.0,
            filter_q: resonaural_core::filters::DEFAULT_Q,
            smoothing: 0.08,
            tick_interval_ms: 16,
            auto_tick: true,
            reset_delay_ms: 2200,
            idle_intensity: 0.2,
            draw_intensity: 0.6,
            full_intensity: 1.0,
            device: None,
        }
    }
}

impl EngineConfig {
    /// Defaults, with the background tick disabled.
    pub fn manual() -> Self {
        Self { auto_tick: false, ..Self::default() }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::FileRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        fn unit(name: &str, v: f32) -> Result<()> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(EngineError::Config { message: format!("{name} must be in [0, 1], got {v}") })
            }
        }

        if !(self.filter_cutoff_hz > 0.0) {
            return Err(EngineError::Config {
                message: format!("filter_cutoff_hz must be > 0, got {}", self.filter_cutoff_hz),
            });
        }
        if !(self.filter_q > 0.0) {
            return Err(EngineError::Config { message: format!("filter_q must be > 0, got {}", self.filter_q) });
        }
        if self.tick_interval_ms == 0 {
            return Err(EngineError::Config { message: "tick_interval_ms must be at least 1".into() });
        }
        unit("smoothing", self.smoothing)?;
        unit("idle_intensity", self.idle_intensity)?;
        unit("draw_intensity", self.draw_intensity)?;
        unit("full_intensity", self.full_intensity)?;
        Ok(())
    }

    #[inline]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[inline]
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }

    #[inline]
    pub fn graph_settings(&self) -> GraphSettings {
        GraphSettings { filter_cutoff_hz: self.filter_cutoff_hz, filter_q: self.filter_q }
    }
}
