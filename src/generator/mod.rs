pub mod biquad;
pub mod compressor;
pub mod noise;
pub mod oscillator;
pub mod param;

pub use biquad::BandPassFilter;
pub use compressor::{Compressor, CompressorConfig};
pub use noise::NoiseBurst;
pub use oscillator::SawOscillator;
pub use param::{AudioParam, ParamCurve, SILENCE_FLOOR};

/// Represents the current state of a signal generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    /// Generator is still producing samples
    Running,
    /// Generator has completed and will produce no more samples
    Complete,
}

/// Position on an audio clock, measured in sample frames
///
/// Generators are scheduled against absolute clock times, so every frame is
/// rendered together with the clock position of its first sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    pub sample_rate: u32,
    pub position: u64,
}

impl FrameClock {
    pub fn new(sample_rate: u32, position: u64) -> Self {
        Self {
            sample_rate,
            position,
        }
    }

    /// Clock time in seconds of the `offset`-th sample of the frame
    pub fn time_at(&self, offset: usize) -> f64 {
        (self.position + offset as u64) as f64 / self.sample_rate as f64
    }

    /// Clock position after `samples` more samples
    pub fn advanced(&self, samples: usize) -> Self {
        Self {
            sample_rate: self.sample_rate,
            position: self.position + samples as u64,
        }
    }

    /// Duration of one sample in seconds
    pub fn sample_period(&self) -> f64 {
        1.0 / self.sample_rate as f64
    }
}

/// Core trait for all signal generators
///
/// Signal generators produce audio samples frame by frame against an audio
/// clock. Each generator is independent; the engine mixes them.
pub trait SignalGenerator: Send {
    /// Process the next frame of samples
    ///
    /// # Arguments
    /// * `buffer` - Mutable slice to write samples into. The length determines frame size.
    /// * `clock` - Clock position of `buffer[0]`
    ///
    /// # Returns
    /// * `GeneratorState::Running` if the generator is still active
    /// * `GeneratorState::Complete` if the generator has finished
    ///
    /// # Note
    /// Even when Complete is returned, the buffer should still be filled with valid samples
    /// (typically zeros) for the current frame.
    fn process(&mut self, buffer: &mut [f32], clock: FrameClock) -> GeneratorState;

    /// Check if this generator has completed
    fn is_complete(&self) -> bool;
}
