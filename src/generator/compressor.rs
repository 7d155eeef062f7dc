//! Feed-forward dynamics compressor used as the output limiter
//!
//! The static curve has a soft knee centred on the threshold; gain reduction is
//! smoothed with separate attack and release time constants.

/// Compressor settings, in the units web audio compressors expose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorConfig {
    /// Level (dBFS) above which the signal is compressed
    pub threshold_db: f32,
    /// Width (dB) of the soft transition around the threshold
    pub knee_db: f32,
    /// Input dB change per 1 dB of output change above the threshold
    pub ratio: f32,
    /// Seconds to reduce gain by ~63% of a new reduction
    pub attack: f32,
    /// Seconds to recover ~63% of released reduction
    pub release: f32,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            threshold_db: -24.0,
            knee_db: 24.0,
            ratio: 10.0,
            attack: 0.003,
            release: 0.25,
        }
    }
}

pub struct Compressor {
    config: CompressorConfig,
    attack_coeff: f32,
    release_coeff: f32,
    /// Current smoothed gain reduction in dB (always <= 0)
    reduction_db: f32,
}

impl Compressor {
    pub fn new(config: CompressorConfig, sample_rate: u32) -> Self {
        let coeff = |time: f32| (-1.0 / (time.max(1e-6) * sample_rate as f32)).exp();
        Self {
            attack_coeff: coeff(config.attack),
            release_coeff: coeff(config.release),
            config,
            reduction_db: 0.0,
        }
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    pub fn reduction_db(&self) -> f32 {
        self.reduction_db
    }

    /// Output level (dB) for a steady input level (dB)
    pub fn static_curve(&self, level_db: f32) -> f32 {
        let CompressorConfig {
            threshold_db,
            knee_db,
            ratio,
            ..
        } = self.config;
        let overshoot = level_db - threshold_db;

        if 2.0 * overshoot < -knee_db {
            level_db
        } else if knee_db > 0.0 && 2.0 * overshoot.abs() <= knee_db {
            let x = overshoot + knee_db / 2.0;
            level_db + (1.0 / ratio - 1.0) * x * x / (2.0 * knee_db)
        } else {
            threshold_db + overshoot / ratio
        }
    }

    pub fn run(&mut self, sample: f32) -> f32 {
        let level_db = 20.0 * sample.abs().max(1e-9).log10();
        let target = self.static_curve(level_db) - level_db;

        // More reduction uses the attack time, less uses the release time
        let coeff = if target < self.reduction_db {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.reduction_db = coeff * self.reduction_db + (1.0 - coeff) * target;

        sample * 10f32.powf(self.reduction_db / 20.0)
    }

    pub fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.run(*sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_curve_regions() {
        let compressor = Compressor::new(CompressorConfig::default(), 44100);

        // Well below the knee: unchanged
        assert_eq!(compressor.static_curve(-60.0), -60.0);
        // Well above the knee: threshold + overshoot / ratio
        assert!((compressor.static_curve(0.0) - (-24.0 + 24.0 / 10.0)).abs() < 1e-4);
        // Inside the knee: somewhere between the two lines
        let knee = compressor.static_curve(-24.0);
        assert!(knee < -24.0 && knee > -30.0);
    }

    #[test]
    fn test_quiet_signal_passes() {
        let mut compressor = Compressor::new(CompressorConfig::default(), 44100);
        let mut buffer = vec![0.001f32; 4410];
        compressor.process(&mut buffer);
        assert!((buffer[4409] - 0.001).abs() < 1e-5);
    }

    #[test]
    fn test_loud_signal_reduced() {
        let mut compressor = Compressor::new(CompressorConfig::default(), 44100);
        let mut buffer = vec![0.9f32; 4410];
        compressor.process(&mut buffer);

        // After settling, 0.9 (≈ -0.9 dBFS) comes out near -24 + 23.1 / 10 dBFS
        let expected = 10f32.powf((-24.0 + (20.0 * 0.9f32.log10() + 24.0) / 10.0) / 20.0);
        assert!((buffer[4409] - expected).abs() < 0.01, "{}", buffer[4409]);
        assert!(compressor.reduction_db() < -15.0);
    }

    #[test]
    fn test_release_recovers_gain() {
        let mut compressor = Compressor::new(CompressorConfig::default(), 1000);
        let mut loud = vec![0.9f32; 100];
        compressor.process(&mut loud);
        let squeezed = compressor.reduction_db();

        let mut quiet = vec![0.001f32; 2000];
        compressor.process(&mut quiet);
        assert!(compressor.reduction_db() > squeezed);
        assert!(compressor.reduction_db() > -0.1);
    }
}
