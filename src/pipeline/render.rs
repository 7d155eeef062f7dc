//! Offline rendering of a whole melody through the controller

use super::controller::{MusicController, PlaybackState};
use super::session::SequencerConfig;
use crate::engine::{OfflineBackend, OfflineConfig};
use crate::score::lookup_or_default;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub melody_id: String,
    /// `None` plays the melody once; `Some(n)` loops it `n` times
    pub cycles: Option<u32>,
    pub sample_rate: u32,
    /// Extra audio kept after the last loop cycle (seconds)
    pub tail: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            melody_id: String::new(),
            cycles: None,
            sample_rate: 44100,
            tail: 0.5,
        }
    }
}

/// Render a melody exactly as a host ticking the controller in real time would hear it
pub fn render_melody(options: &RenderOptions, config: SequencerConfig) -> Vec<f32> {
    let melody = lookup_or_default(&options.melody_id);
    let backend = OfflineBackend::new(OfflineConfig {
        sample_rate: options.sample_rate,
        ..Default::default()
    });
    let mut controller = MusicController::with_config(backend.clone(), config);
    controller.set_melody_id(melody.id);
    controller.set_loop(options.cycles.is_some());
    controller.set_enabled(true);

    let step = controller.tick_interval().as_secs_f64();
    let cfg = controller.config();
    let limit = match options.cycles {
        Some(cycles) => cfg.start_offset + melody.duration_seconds() * cycles as f64 + options.tail,
        // Generous bound; a one-shot stops itself long before this
        None => cfg.start_offset + melody.duration_seconds() + cfg.stop_grace + 5.0,
    };

    let mut audio = Vec::new();
    let mut elapsed = 0.0;
    while elapsed < limit {
        if controller.tick() == PlaybackState::Idle {
            break;
        }
        audio.extend(backend.render(step));
        elapsed += step;
    }
    controller.set_enabled(false);

    log::info!(
        "rendered '{}': {:.2}s at {} Hz",
        melody.id,
        audio.len() as f64 / options.sample_rate as f64,
        options.sample_rate
    );
    audio
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::lookup;

    #[test]
    fn test_one_shot_render_ends_after_melody() {
        let options = RenderOptions {
            melody_id: "jingle-bells".to_string(),
            sample_rate: 8000,
            ..Default::default()
        };
        let audio = render_melody(&options, SequencerConfig::default());

        let seconds = audio.len() as f64 / 8000.0;
        let melody = lookup("jingle-bells").unwrap();
        // Ends once the closing fade has settled, rounded up to the tick period
        let settled = melody.duration_seconds() + 0.13 + 0.1;
        assert!(seconds >= settled);
        assert!(seconds < settled + 0.16);
        assert!(audio.iter().any(|s| s.abs() > 0.05));
    }

    #[test]
    fn test_loop_render_covers_cycles() {
        let options = RenderOptions {
            melody_id: "deja-vu-meme".to_string(),
            cycles: Some(2),
            sample_rate: 8000,
            tail: 0.0,
        };
        let audio = render_melody(&options, SequencerConfig::default());

        let seconds = audio.len() as f64 / 8000.0;
        let expected = 0.05 + 2.0 * lookup("deja-vu-meme").unwrap().duration_seconds();
        assert!(seconds >= expected && seconds < expected + 0.1);
    }
}
