use super::note::Note;

/// One timeline entry: a pitched note or a rest, lasting `beats` beats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// `None` is a rest: silent, but it still advances the timeline
    pub pitch: Option<Note>,
    pub beats: f64,
}

impl Step {
    pub const fn note(note: Note, beats: f64) -> Self {
        Self {
            pitch: Some(note),
            beats,
        }
    }

    pub const fn rest(beats: f64) -> Self {
        Self { pitch: None, beats }
    }

    pub fn is_rest(&self) -> bool {
        self.pitch.is_none()
    }

    /// Length of this step in seconds at the given tempo
    pub fn seconds(&self, tempo_bpm: f64) -> f64 {
        self.beats * 60.0 / tempo_bpm
    }
}

/// A named, ordered sequence of steps played at a fixed tempo
#[derive(Debug, PartialEq)]
pub struct Melody {
    pub id: &'static str,
    pub label: &'static str,
    pub steps: &'static [Step],
    pub tempo_bpm: f64,
}

impl Melody {
    /// Seconds per beat
    pub fn beat_seconds(&self) -> f64 {
        60.0 / self.tempo_bpm
    }

    /// Total length of one pass through the melody
    pub fn duration_seconds(&self) -> f64 {
        self.steps.iter().map(|step| step.seconds(self.tempo_bpm)).sum()
    }

    pub fn total_beats(&self) -> f64 {
        self.steps.iter().map(|step| step.beats).sum()
    }
}

/// The `{id, label}` pair shown when choosing a melody
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MelodyChoice {
    pub id: &'static str,
    pub label: &'static str,
}

impl From<&Melody> for MelodyChoice {
    fn from(melody: &Melody) -> Self {
        Self {
            id: melody.id,
            label: melody.label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SHORT: Melody = Melody {
        id: "short",
        label: "Short",
        steps: &[
            Step::note(Note::C4, 1.0),
            Step::note(Note::E4, 0.5),
            Step::rest(1.5),
        ],
        tempo_bpm: 120.0,
    };

    #[test]
    fn test_step_seconds() {
        assert!((Step::rest(1.0).seconds(120.0) - 0.5).abs() < 1e-12);
        assert!((Step::note(Note::A4, 1.5).seconds(60.0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_melody_duration() {
        assert!((SHORT.beat_seconds() - 0.5).abs() < 1e-12);
        assert!((SHORT.total_beats() - 3.0).abs() < 1e-12);
        assert!((SHORT.duration_seconds() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_rest_detection() {
        assert!(SHORT.steps[2].is_rest());
        assert!(!SHORT.steps[0].is_rest());
    }
}
