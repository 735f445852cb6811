//! Audio backends: where rendered frames go.
//!
//! A backend hands out one [`OutputDevice`] per session. The device pulls
//! frames from the [`SharedSession`] it was given (a realtime stream does so
//! from its own callback thread) and is released exactly once, by
//! [`OutputDevice::release`].
//!
//! [`OfflineBackend`] has no hardware behind it: the host pulls frames with
//! [`OfflineDevice::render`]. The CPAL backend lives in [`crate::realtime`].

use crate::error::{EngineError, Result};
use crate::session::SharedSession;

pub trait AudioBackend {
    type Device: OutputDevice;

    /// Open an output device that renders from `session`.
    fn acquire(&mut self, session: SharedSession) -> Result<Self::Device>;
}

pub trait OutputDevice {
    fn sample_rate(&self) -> u32;

    fn channels(&self) -> u16 {
        2
    }

    /// Stop the device and give it back to the host.
    fn release(self)
    where
        Self: Sized;
}

/// Pull-model backend with a fixed sample rate.
#[derive(Copy, Clone, Debug)]
pub struct OfflineBackend {
    sample_rate: u32,
}

impl OfflineBackend {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

impl Default for OfflineBackend {
    fn default() -> Self {
        Self::new(48_000)
    }
}

impl AudioBackend for OfflineBackend {
    type Device = OfflineDevice;

    fn acquire(&mut self, session: SharedSession) -> Result<OfflineDevice> {
        if self.sample_rate == 0 {
            return Err(EngineError::device("sample rate must be positive"));
        }
        Ok(OfflineDevice { sample_rate: self.sample_rate, session })
    }
}

/// Device handle for [`OfflineBackend`].
#[derive(Debug)]
pub struct OfflineDevice {
    sample_rate: u32,
    session: SharedSession,
}

impl OfflineDevice {
    /// Render interleaved f32 frames; silence once the session has stopped.
    pub fn render(&self, out: &mut [f32], channels: usize) {
        self.session.render(out, channels, |s| s);
    }

    /// Advance the audio clock by `frames` without producing samples.
    pub fn skip(&self, frames: u64) {
        self.session.with(|s| s.graph_mut().advance(frames));
    }
}

impl OutputDevice for OfflineDevice {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn release(self) {}
}
