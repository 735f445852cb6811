//! Realtime output via CPAL.
//!
//! The stream callback locks the [`SharedSession`] once per buffer and
//! renders every frame under that lock, so a control-thread write lands
//! between buffers, never inside one.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};

use crate::backend::{AudioBackend, OutputDevice};
use crate::error::{EngineError, Result};
use crate::session::SharedSession;

/// Opens the host default output device, or one picked by name.
#[derive(Clone, Debug, Default)]
pub struct CpalBackend {
    device_name: Option<String>,
}

impl CpalBackend {
    pub fn new(device_name: Option<String>) -> Self {
        Self { device_name }
    }

    fn pick_device(&self) -> Result<cpal::Device> {
        let host = cpal::default_host();
        info!("Audio host: {:?}", host.id());
        if let Some(name) = &self.device_name {
            let devices = host.output_devices().map_err(|e| EngineError::device(e.to_string()))?;
            for d in devices {
                if d.name().map(|n| n == *name).unwrap_or(false) {
                    return Ok(d);
                }
            }
            return Err(EngineError::device(format!("requested device not found: {name}")));
        }
        host.default_output_device()
            .ok_or_else(|| EngineError::device("no default output device"))
    }
}

/// Names of the host's output devices.
pub fn list_output_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host.output_devices().map_err(|e| EngineError::device(e.to_string()))?;
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

fn build_stream<T>(
    device: &cpal::Device,
    cfg: &cpal::StreamConfig,
    session: SharedSession,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32> + Send + 'static,
{
    let channels = cfg.channels as usize;
    device
        .build_output_stream(
            cfg,
            move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
                session.render(output, channels, |s| T::from_sample(s));
            },
            |e| error!("Audio stream error: {}", e),
            None,
        )
        .map_err(|e| EngineError::device(e.to_string()))
}

impl AudioBackend for CpalBackend {
    type Device = CpalDevice;

    fn acquire(&mut self, session: SharedSession) -> Result<CpalDevice> {
        let device = self.pick_device()?;
        let name = device.name().unwrap_or_else(|_| "<unnamed>".into());
        let sup_cfg = device
            .default_output_config()
            .map_err(|e| EngineError::device(e.to_string()))?;
        let sample_format = sup_cfg.sample_format();
        let cfg: cpal::StreamConfig = sup_cfg.into();

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &cfg, session)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &cfg, session)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &cfg, session)?,
            other => return Err(EngineError::device(format!("unsupported device sample format: {other:?}"))),
        };
        stream.play().map_err(|e| EngineError::device(e.to_string()))?;
        info!(device = %name, sample_rate = cfg.sample_rate.0, channels = cfg.channels, "audio stream started");

        Ok(CpalDevice { stream, sample_rate: cfg.sample_rate.0, channels: cfg.channels })
    }
}

/// A playing CPAL stream. Dropping the stream closes the device.
pub struct CpalDevice {
    stream: cpal::Stream,
    sample_rate: u32,
    channels: u16,
}

impl OutputDevice for CpalDevice {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn release(self) {
        if let Err(e) = self.stream.pause() {
            error!("failed to pause stream on release: {}", e);
        }
        drop(self.stream);
        info!("audio stream closed");
    }
}
