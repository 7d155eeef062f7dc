//! "Meow" voice
//!
//! A sawtooth with a short downward pitch glide, pushed through a resonant
//! band-pass for a vocal formant and shaped by a fast exponential envelope. A
//! tiny burst of noise on top gives the attack a consonant-like edge.

use crate::engine::{AudioContext, OutputChain};
use crate::generator::{
    AudioParam, BandPassFilter, FrameClock, GeneratorState, NoiseBurst, SawOscillator,
    SignalGenerator, SILENCE_FLOOR,
};
use rand::Rng;

const PITCH_START_RATIO: f32 = 1.25;
const PITCH_END_RATIO: f32 = 0.92;
const PITCH_START_MIN_HZ: f32 = 60.0;
const PITCH_END_MIN_HZ: f32 = 50.0;
const FORMANT_BASE_HZ: f32 = 600.0;
const FORMANT_MAX_HZ: f32 = 1200.0;
const FORMANT_Q: f32 = 6.0;
const ATTACK: f64 = 0.015;
const MIN_DECAY_END: f64 = 0.08;
const RELEASE_TAIL: f64 = 0.05;

const NOISE_DURATION: f64 = 0.03;
const NOISE_AMPLITUDE: f32 = 0.15;
const NOISE_ATTACK: f64 = 0.003;
const NOISE_DECAY_END: f64 = 0.02;

/// One scheduled meow, self-contained from start to release
pub struct MeowVoice {
    oscillator: SawOscillator,
    filter: BandPassFilter,
    envelope: AudioParam,
    noise: NoiseBurst,
    noise_envelope: AudioParam,
}

impl MeowVoice {
    /// # Arguments
    /// * `frequency_hz` - Nominal pitch of the note
    /// * `start_time` - Clock time the note begins
    /// * `duration` - Nominal note length in seconds
    /// * `sample_rate` - Sample rate the noise burst is rendered for
    /// * `rng` - Source for the noise burst
    pub fn new<R: Rng + ?Sized>(
        frequency_hz: f32,
        start_time: f64,
        duration: f64,
        sample_rate: u32,
        rng: &mut R,
    ) -> Self {
        let mut pitch = AudioParam::new(PITCH_START_MIN_HZ);
        pitch
            .set_value_at_time((frequency_hz * PITCH_START_RATIO).max(PITCH_START_MIN_HZ), start_time)
            .exponential_ramp_to_value_at_time(
                (frequency_hz * PITCH_END_RATIO).max(PITCH_END_MIN_HZ),
                start_time + (duration * 0.7).max(0.05),
            );
        let oscillator = SawOscillator::new(pitch, start_time, start_time + duration + RELEASE_TAIL);

        let filter = BandPassFilter::new(
            AudioParam::new((FORMANT_BASE_HZ + frequency_hz).min(FORMANT_MAX_HZ)),
            AudioParam::new(FORMANT_Q),
        );

        let mut envelope = AudioParam::new(SILENCE_FLOOR);
        envelope
            .set_value_at_time(SILENCE_FLOOR, start_time)
            .exponential_ramp_to_value_at_time(1.0, start_time + ATTACK)
            .exponential_ramp_to_value_at_time(
                SILENCE_FLOOR,
                start_time + duration.max(MIN_DECAY_END),
            );

        let noise = NoiseBurst::new(NOISE_DURATION, NOISE_AMPLITUDE, start_time, sample_rate, rng);
        let mut noise_envelope = AudioParam::new(SILENCE_FLOOR);
        noise_envelope
            .set_value_at_time(SILENCE_FLOOR, start_time)
            .exponential_ramp_to_value_at_time(1.0, start_time + NOISE_ATTACK)
            .exponential_ramp_to_value_at_time(SILENCE_FLOOR, start_time + NOISE_DECAY_END);

        Self {
            oscillator,
            filter,
            envelope,
            noise,
            noise_envelope,
        }
    }

    pub fn oscillator(&self) -> &SawOscillator {
        &self.oscillator
    }

    pub fn filter(&self) -> &BandPassFilter {
        &self.filter
    }

    pub fn envelope(&self) -> &AudioParam {
        &self.envelope
    }

    pub fn noise_envelope(&self) -> &AudioParam {
        &self.noise_envelope
    }

    pub fn start_time(&self) -> f64 {
        self.oscillator.start_time()
    }

    /// Clock time after which the voice is silent for good
    pub fn stop_time(&self) -> f64 {
        self.oscillator.stop_time()
    }
}

impl SignalGenerator for MeowVoice {
    fn process(&mut self, buffer: &mut [f32], clock: FrameClock) -> GeneratorState {
        let period = clock.sample_period();
        for (i, sample) in buffer.iter_mut().enumerate() {
            let time = clock.time_at(i);
            let tone = self.filter.run(
                self.oscillator.next_sample(time, period),
                time,
                clock.sample_rate,
            );
            let breath = self.noise.sample_at(time, clock.sample_rate);
            *sample = tone * self.envelope.value_at(time)
                + breath * self.noise_envelope.value_at(time);
        }

        if self.is_complete() {
            GeneratorState::Complete
        } else {
            GeneratorState::Running
        }
    }

    fn is_complete(&self) -> bool {
        self.oscillator.is_complete() && self.noise.is_complete()
    }
}

/// Schedule one meow at `start_time` on `out`
///
/// Fire and forget: nothing is returned and the voice removes itself once it
/// has finished. On a closed context this does nothing.
pub fn play_meow_note(
    ctx: &AudioContext,
    out: &OutputChain,
    frequency_hz: f32,
    start_time: f64,
    duration: f64,
) {
    let voice = MeowVoice::new(
        frequency_hz,
        start_time,
        duration,
        ctx.sample_rate(),
        &mut rand::rng(),
    );
    out.schedule(Box::new(voice));
}
