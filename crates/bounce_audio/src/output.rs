//! Audio device output using cpal.
//!
//! Opens the default output device at the requested sample rate and pulls
//! frames from the shared `Mixer` on cpal's audio thread.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};

use crate::mixer::Mixer;

pub struct AudioOutput {
    // Playback stops when the stream is dropped.
    _stream: Stream,
    pub device_name: String,
    pub config: StreamConfig,
}

impl AudioOutput {
    pub fn open(sample_rate: u32, mixer: Arc<Mutex<Mixer>>) -> Result<Self, String> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| "No default output device found".to_string())?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let (config, sample_format) = find_config(&device, sample_rate)?;
        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, mixer)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, mixer)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, mixer)?,
            other => return Err(format!("Unsupported sample format: {other:?}")),
        };
        stream
            .play()
            .map_err(|e| format!("Failed to start stream: {e}"))?;

        log::info!(
            "Audio output on '{}': {} Hz, {} channels, {:?}",
            device_name,
            config.sample_rate.0,
            config.channels,
            sample_format
        );
        Ok(Self {
            _stream: stream,
            device_name,
            config,
        })
    }
}

/// Sounds are not resampled, so only configs that run at exactly
/// `sample_rate` qualify. Stereo f32 is preferred.
fn find_config(device: &Device, sample_rate: u32) -> Result<(StreamConfig, SampleFormat), String> {
    let supported: Vec<_> = device
        .supported_output_configs()
        .map_err(|e| format!("Failed to query output configs: {e}"))?
        .filter(|range| {
            range.min_sample_rate().0 <= sample_rate
                && range.max_sample_rate().0 >= sample_rate
                && matches!(
                    range.sample_format(),
                    SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16
                )
        })
        .collect();

    let best = supported
        .iter()
        .find(|r| r.channels() == 2 && r.sample_format() == SampleFormat::F32)
        .or_else(|| supported.iter().find(|r| r.channels() == 2))
        .or_else(|| supported.first())
        .ok_or_else(|| format!("No output config supports {sample_rate} Hz"))?;

    let chosen = best.clone().with_sample_rate(cpal::SampleRate(sample_rate));
    Ok((chosen.config(), chosen.sample_format()))
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mixer: Arc<Mutex<Mixer>>,
) -> Result<Stream, String>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = usize::from(config.channels);
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| match mixer.lock() {
                Ok(mut mixer) => mixer.fill(data, channels, |s| T::from_sample(s)),
                Err(_) => data.fill(T::EQUILIBRIUM),
            },
            |err| log::error!("Audio stream error: {err}"),
            None,
        )
        .map_err(|e| format!("Failed to build stream: {e}"))
}
