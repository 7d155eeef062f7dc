//! Lookahead sequencer
//!
//! A session owns one audio context for as long as one melody is playing. The
//! host ticks it on a coarse timer; every tick schedules all notes whose start
//! falls within the lookahead window on the context's own clock, so timing
//! precision comes from the audio clock rather than the timer.

use super::voice::play_meow_note;
use crate::engine::{AudioBackend, AudioContext, ContextState, EngineError, OutputChain};
use crate::generator::{CompressorConfig, SILENCE_FLOOR};
use crate::score::Melody;
use std::time::Duration;

/// Time constants a closing fade gets before the context is released
const FADE_SETTLE: f64 = 5.0;

/// Timing and mixing settings of the sequencer
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    /// How often the host should call `tick`
    pub tick_interval: Duration,
    /// How far ahead of the audio clock notes are scheduled (seconds)
    pub lookahead: f64,
    /// Delay between session start and the first step (seconds)
    pub start_offset: f64,
    /// Ring-out after the last step of a one-shot melody (seconds)
    pub stop_grace: f64,
    /// Time constant of the fade applied when a one-shot melody ends (seconds)
    pub fade_time_constant: f64,
    /// Fraction of a step a note sounds for
    pub note_fill: f64,
    /// Shortest note ever played (seconds)
    pub min_note: f64,
    pub master_gain: f32,
    pub compressor: CompressorConfig,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(80),
            lookahead: 0.25,
            start_offset: 0.05,
            stop_grace: 0.08,
            fade_time_constant: 0.02,
            note_fill: 0.85,
            min_note: 0.09,
            master_gain: 0.9,
            compressor: CompressorConfig::default(),
        }
    }
}

impl SequencerConfig {
    /// Sounding length of a note occupying `step_seconds`
    pub fn note_seconds(&self, step_seconds: f64) -> f64 {
        (step_seconds * self.note_fill).max(self.min_note)
    }
}

/// What a session plays, fixed for its whole life
#[derive(Debug, Clone, Copy)]
pub struct SessionParams {
    pub melody: &'static Melody,
    pub looping: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The melody has played out; the session should be torn down
    Finished,
}

pub struct PlaybackSession {
    params: SessionParams,
    context: AudioContext,
    output: OutputChain,
    start_time: f64,
    next_time: f64,
    step_index: usize,
    steps_scheduled: usize,
    notes_scheduled: usize,
    stop_at: Option<f64>,
    fade_end: Option<f64>,
}

impl PlaybackSession {
    /// Open a context on `backend` and get ready to play
    ///
    /// A context that refuses to resume is kept: playback then simply makes
    /// no sound.
    pub fn start<B: AudioBackend + ?Sized>(
        backend: &mut B,
        params: SessionParams,
        config: &SequencerConfig,
    ) -> Result<Self, EngineError> {
        if !backend.is_supported() {
            return Err(EngineError::Unsupported);
        }

        let mut context = backend.create_context()?;
        let output = context.create_output_chain(config.master_gain, config.compressor);
        if context.state() == ContextState::Suspended {
            if let Err(err) = context.resume() {
                log::warn!("could not resume audio context: {}", err);
            }
        }

        let start_time = context.current_time() + config.start_offset;
        let melody = params.melody;
        // Nothing to schedule, or a loop that would never advance the clock
        let stop_at = if melody.steps.is_empty() || (params.looping && melody.total_beats() <= 0.0)
        {
            Some(start_time + config.stop_grace)
        } else {
            None
        };

        log::info!(
            "playing '{}' at {} bpm{}",
            melody.label,
            melody.tempo_bpm,
            if params.looping { " on loop" } else { "" }
        );

        Ok(Self {
            params,
            context,
            output,
            start_time,
            next_time: start_time,
            step_index: 0,
            steps_scheduled: 0,
            notes_scheduled: 0,
            stop_at,
            fade_end: None,
        })
    }

    pub fn params(&self) -> SessionParams {
        self.params
    }

    pub fn context(&self) -> &AudioContext {
        &self.context
    }

    pub fn output(&self) -> &OutputChain {
        &self.output
    }

    /// Clock time of the first step
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Clock time of the next step to schedule
    pub fn next_time(&self) -> f64 {
        self.next_time
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Steps scheduled so far, rests included, across loop passes
    pub fn steps_scheduled(&self) -> usize {
        self.steps_scheduled
    }

    pub fn notes_scheduled(&self) -> usize {
        self.notes_scheduled
    }

    /// Clock time of the queued stop, if the melody has run out
    pub fn stop_at(&self) -> Option<f64> {
        self.stop_at
    }

    pub fn is_stopping(&self) -> bool {
        self.stop_at.is_some()
    }

    /// Clock time the closing fade has settled by, once it has begun
    pub fn fade_end(&self) -> Option<f64> {
        self.fade_end
    }

    pub fn tick(&mut self, config: &SequencerConfig) -> TickOutcome {
        let now = self.context.current_time();

        if let Some(stop_at) = self.stop_at {
            // A clock that is not running would never reach the stop or fade end
            if self.context.state() != ContextState::Running {
                return TickOutcome::Finished;
            }
            match self.fade_end {
                Some(fade_end) if now >= fade_end => return TickOutcome::Finished,
                Some(_) => {}
                None if now >= stop_at => {
                    self.fade_out(now, config);
                    self.fade_end = Some(now + FADE_SETTLE * config.fade_time_constant);
                }
                None => {}
            }
            return TickOutcome::Continue;
        }

        let melody = self.params.melody;
        while self.stop_at.is_none() && self.next_time < now + config.lookahead {
            let step = melody.steps[self.step_index];
            let step_seconds = step.seconds(melody.tempo_bpm);

            if let Some(note) = step.pitch {
                let duration = config.note_seconds(step_seconds);
                log::debug!("{} at {:.3}s for {:.3}s", note, self.next_time, duration);
                play_meow_note(
                    &self.context,
                    &self.output,
                    note.frequency_hz(),
                    self.next_time,
                    duration,
                );
                self.notes_scheduled += 1;
            }

            self.next_time += step_seconds;
            self.steps_scheduled += 1;
            self.step_index += 1;
            if self.params.looping {
                self.step_index %= melody.steps.len();
            } else if self.step_index >= melody.steps.len() {
                let stop_at = self.next_time + config.stop_grace;
                log::debug!("'{}' done, stopping at {:.3}s", melody.id, stop_at);
                self.stop_at = Some(stop_at);
            }
        }

        TickOutcome::Continue
    }

    fn fade_out(&self, now: f64, config: &SequencerConfig) {
        self.output.automate_gain(|gain| {
            gain.cancel_scheduled_values(now)
                .set_target_at_time(SILENCE_FLOOR, now, config.fade_time_constant);
        });
    }

    /// Stop playback and release the context
    pub fn teardown(mut self) {
        if let Err(err) = self.context.close() {
            log::warn!("failed to close audio context: {}", err);
        }
        log::info!("stopped '{}'", self.params.melody.label);
    }
}
