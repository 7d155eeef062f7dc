use super::{FrameClock, GeneratorState, SignalGenerator};
use rand::Rng;

/// A short pre-rendered buffer of white noise played once from `start_time`
pub struct NoiseBurst {
    samples: Vec<f32>,
    start_time: f64,
    completed: bool,
}

impl NoiseBurst {
    /// # Arguments
    /// * `duration` - Length of the burst in seconds
    /// * `amplitude` - Peak amplitude of the uniform noise
    /// * `start_time` - Clock time of the first sample
    /// * `sample_rate` - Sample rate the buffer is rendered for
    /// * `rng` - Source of randomness
    pub fn new<R: Rng + ?Sized>(
        duration: f64,
        amplitude: f32,
        start_time: f64,
        sample_rate: u32,
        rng: &mut R,
    ) -> Self {
        let len = (sample_rate as f64 * duration).floor() as usize;
        let samples = (0..len)
            .map(|_| (rng.random::<f32>() * 2.0 - 1.0) * amplitude)
            .collect();
        Self {
            samples,
            start_time,
            completed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Sample at clock time `time`, zero outside the burst
    pub fn sample_at(&mut self, time: f64, sample_rate: u32) -> f32 {
        if time < self.start_time {
            return 0.0;
        }
        let index = ((time - self.start_time) * sample_rate as f64).round() as usize;
        match self.samples.get(index) {
            Some(&sample) => sample,
            None => {
                self.completed = true;
                0.0
            }
        }
    }
}

impl SignalGenerator for NoiseBurst {
    fn process(&mut self, buffer: &mut [f32], clock: FrameClock) -> GeneratorState {
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample = self.sample_at(clock.time_at(i), clock.sample_rate);
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
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_burst_length_and_amplitude() {
        let mut rng = StdRng::seed_from_u64(7);
        let burst = NoiseBurst::new(0.03, 0.15, 0.0, 44100, &mut rng);

        assert_eq!(burst.len(), 1323);
        assert!(burst.samples.iter().all(|s| s.abs() <= 0.15));
        assert!(burst.samples.iter().any(|s| s.abs() > 0.05));
    }

    #[test]
    fn test_burst_plays_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut burst = NoiseBurst::new(0.01, 0.5, 0.01, 1000, &mut rng);
        let mut buffer = [0.0f32; 40];

        let state = burst.process(&mut buffer, FrameClock::new(1000, 0));
        assert_eq!(state, GeneratorState::Complete);
        assert!(buffer[..10].iter().all(|&s| s == 0.0));
        assert!(buffer[10..20].iter().any(|&s| s != 0.0));
        assert!(buffer[20..].iter().all(|&s| s == 0.0));
    }
}
