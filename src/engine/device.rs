use super::backend::AudioBackend;
use super::context::{AudioContext, ContextState, Destination, Renderer};
use super::error::EngineError;
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, Device, OutputCallbackInfo, StreamConfig, SupportedBufferSize,
};

#[derive(Debug, Clone, Copy)]
pub struct DeviceConfig {
    /// default: 0.02
    pub target_latency_s: f32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            target_latency_s: 0.02,
        }
    }
}

/// Audio backend on the host's default output device
pub struct CpalBackend {
    host: cpal::Host,
    config: DeviceConfig,
}

impl CpalBackend {
    pub fn new(config: DeviceConfig) -> Self {
        let host = cpal::default_host();
        log::info!("cpal host: {}", host.id().name());
        Self { host, config }
    }

    fn choose_config(&self, device: &Device) -> Result<StreamConfig, EngineError> {
        let default_config = device.default_output_config()?;
        let sample_rate = default_config.sample_rate();
        let channels = default_config.channels();
        let ideal_buffer_size = (sample_rate.0 as f32 * self.config.target_latency_s) as u32;
        // alsa rejects buffer sizes that are not a multiple of 4
        let ideal_buffer_size = ideal_buffer_size & !3;
        let buffer_size = match default_config.buffer_size() {
            SupportedBufferSize::Range { min, max } => {
                BufferSize::Fixed(ideal_buffer_size.clamp(*min, *max))
            }
            SupportedBufferSize::Unknown => BufferSize::Default,
        };
        Ok(StreamConfig {
            channels,
            sample_rate,
            buffer_size,
        })
    }
}

impl AudioBackend for CpalBackend {
    fn is_supported(&self) -> bool {
        self.host.default_output_device().is_some()
    }

    fn create_context(&mut self) -> Result<AudioContext, EngineError> {
        let device = self
            .host
            .default_output_device()
            .ok_or(EngineError::NoOutputDevice)?;
        if let Ok(name) = device.name() {
            log::info!("cpal device: {}", name);
        } else {
            log::info!("cpal device: (no name)");
        }

        let config = self.choose_config(&device)?;
        log::debug!("stream config: {:?}", config);
        let channels = config.channels as usize;
        let renderer = Renderer::new(config.sample_rate.0, ContextState::Suspended);

        let stream = device.build_output_stream(
            &config,
            {
                let renderer = renderer.clone();
                let mut mono = Vec::new();
                move |data: &mut [f32], _: &OutputCallbackInfo| {
                    mono.resize(data.len() / channels, 0.0);
                    renderer.render(&mut mono);
                    for (frame, &sample) in data.chunks_mut(channels).zip(mono.iter()) {
                        frame.fill(sample);
                    }
                }
            },
            |err| log::error!("stream error: {}", err),
            None,
        )?;
        // Some hosts start streams as soon as they are built
        if let Err(err) = stream.pause() {
            log::debug!("could not pause new stream: {}", err);
        }

        let destination = DeviceDestination {
            stream: Some(stream),
        };
        Ok(AudioContext::from_parts(renderer, Box::new(destination)))
    }
}

struct DeviceDestination {
    stream: Option<cpal::Stream>,
}

impl Destination for DeviceDestination {
    fn resume(&mut self) -> Result<(), EngineError> {
        let stream = self.stream.as_ref().ok_or(EngineError::Closed)?;
        stream.play()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        match self.stream.take() {
            // Dropping the stream releases the device even when pausing fails
            Some(stream) => stream.pause().map_err(EngineError::from),
            None => Ok(()),
        }
    }
}
