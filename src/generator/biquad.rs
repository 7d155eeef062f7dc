// Band-pass biquad using the constant 0 dB peak gain design from the
// "Audio EQ Cookbook" (R. Bristow-Johnson), the same response web audio
// engines use for their band-pass filter type.

use super::param::AudioParam;
use std::f64::consts::PI;

#[derive(Debug, Default, Clone, Copy)]
struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Coefficients {
    fn band_pass(centre_hz: f64, q: f64, sample_rate_hz: f64) -> Self {
        let nyquist = sample_rate_hz / 2.0;
        let centre_hz = centre_hz.clamp(1.0, nyquist - 1.0);
        let q = q.max(1e-4);

        let w0 = 2.0 * PI * centre_hz / sample_rate_hz;
        let alpha = w0.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;

        Self {
            b0: alpha / a0,
            b1: 0.0,
            b2: -alpha / a0,
            a1: (-2.0 * w0.cos()) / a0,
            a2: (1.0 - alpha) / a0,
        }
    }
}

/// Resonant band-pass filter with automatable centre frequency and Q
pub struct BandPassFilter {
    frequency: AudioParam,
    q: AudioParam,
    coefficients: Coefficients,
    prev_frequency: f32,
    prev_q: f32,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BandPassFilter {
    pub fn new(frequency: AudioParam, q: AudioParam) -> Self {
        Self {
            frequency,
            q,
            coefficients: Coefficients::default(),
            prev_frequency: f32::NAN,
            prev_q: f32::NAN,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    pub fn frequency(&self) -> &AudioParam {
        &self.frequency
    }

    pub fn q(&self) -> &AudioParam {
        &self.q
    }

    /// Filter one sample taken at clock time `time`
    pub fn run(&mut self, sample: f32, time: f64, sample_rate_hz: u32) -> f32 {
        let frequency = self.frequency.value_at(time);
        let q = self.q.value_at(time);
        if frequency != self.prev_frequency || q != self.prev_q {
            self.prev_frequency = frequency;
            self.prev_q = q;
            self.coefficients =
                Coefficients::band_pass(frequency as f64, q as f64, sample_rate_hz as f64);
        }

        let c = &self.coefficients;
        let x0 = sample as f64;
        let y0 = c.b0 * x0 + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x0;
        self.y2 = self.y1;
        self.y1 = y0;
        y0 as f32
    }
}
