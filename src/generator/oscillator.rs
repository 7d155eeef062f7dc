use super::param::AudioParam;
use super::{FrameClock, GeneratorState, SignalGenerator};

/// Naive sawtooth oscillator with an automatable frequency
///
/// Silent before `start_time`, runs until `stop_time` and then completes.
/// Phase is kept in [0, 1) and the output is `2 * phase - 1`.
pub struct SawOscillator {
    frequency: AudioParam,
    start_time: f64,
    stop_time: f64,
    phase: f64,
    completed: bool,
}

impl SawOscillator {
    /// # Arguments
    /// * `frequency` - Frequency in Hz, possibly automated
    /// * `start_time` - Clock time of the first non-silent sample
    /// * `stop_time` - Clock time at which the oscillator stops for good
    pub fn new(frequency: AudioParam, start_time: f64, stop_time: f64) -> Self {
        Self {
            frequency,
            start_time,
            stop_time: stop_time.max(start_time),
            phase: 0.0,
            completed: false,
        }
    }

    pub fn frequency(&self) -> &AudioParam {
        &self.frequency
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    /// Produce one sample at clock time `time`
    pub fn next_sample(&mut self, time: f64, sample_period: f64) -> f32 {
        if time < self.start_time {
            return 0.0;
        }
        if time >= self.stop_time {
            self.completed = true;
            return 0.0;
        }

        let sample = (self.phase * 2.0 - 1.0) as f32;
        let frequency = self.frequency.value_at(time) as f64;
        self.phase = (self.phase + frequency * sample_period).rem_euclid(1.0);
        sample
    }
}

impl SignalGenerator for SawOscillator {
    fn process(&mut self, buffer: &mut [f32], clock: FrameClock) -> GeneratorState {
        let period = clock.sample_period();
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample = self.next_sample(clock.time_at(i), period);
        }

        if self.completed {
            GeneratorState::Complete
        } else {
            GeneratorState::Running
        }
    }

    fn is_complete(&self) -> bool {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_before_start() {
        let mut osc = SawOscillator::new(AudioParam::new(100.0), 0.5, 1.0);
        let mut buffer = [1.0f32; 64];

        let state = osc.process(&mut buffer, FrameClock::new(1000, 0));
        assert_eq!(state, GeneratorState::Running);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_output_bounded() {
        let mut osc = SawOscillator::new(AudioParam::new(440.0), 0.0, 1.0);
        let mut buffer = [0.0f32; 512];
        osc.process(&mut buffer, FrameClock::new(44100, 0));

        for &sample in buffer.iter() {
            assert!(
                (-1.0..=1.0).contains(&sample),
                "Sample {} out of bounds",
                sample
            );
        }
        assert!(buffer.iter().any(|&s| s > 0.5));
        assert!(buffer.iter().any(|&s| s < -0.5));
    }

    #[test]
    fn test_period_matches_frequency() {
        // 125 Hz at 1000 Hz sample rate: the saw wraps every 8 samples
        let mut osc = SawOscillator::new(AudioParam::new(125.0), 0.0, 1.0);
        let mut buffer = [0.0f32; 24];
        osc.process(&mut buffer, FrameClock::new(1000, 0));

        assert_eq!(buffer[0], -1.0);
        assert_eq!(buffer[4], 0.0);
        assert_eq!(buffer[8], -1.0);
        assert_eq!(buffer[16], -1.0);
    }

    #[test]
    fn test_completes_at_stop_time() {
        let mut osc = SawOscillator::new(AudioParam::new(100.0), 0.0, 0.05);
        let mut buffer = [0.0f32; 100];

        let state = osc.process(&mut buffer, FrameClock::new(1000, 0));
        assert_eq!(state, GeneratorState::Complete);
        assert!(osc.is_complete());
        assert!(buffer[50..].iter().all(|&s| s == 0.0));
    }
}
