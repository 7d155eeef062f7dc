use std::fmt;
use std::str::FromStr;

/// Symbolic pitch names used by the melody catalog
///
/// The set is closed: every step refers to one of these variants, so a melody
/// cannot reference a pitch that has no frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Note {
    C4,
    D4,
    E4,
    F4,
    Fs4,
    G4,
    A4,
    Bb4,
    B4,
    C5,
    D5,
    Eb5,
    E5,
    F5,
    Fs5,
    G5,
    A5,
}

impl Note {
    pub const ALL: [Note; 17] = [
        Note::C4,
        Note::D4,
        Note::E4,
        Note::F4,
        Note::Fs4,
        Note::G4,
        Note::A4,
        Note::Bb4,
        Note::B4,
        Note::C5,
        Note::D5,
        Note::Eb5,
        Note::E5,
        Note::F5,
        Note::Fs5,
        Note::G5,
        Note::A5,
    ];

    /// Frequency in Hz (equal temperament, A4 = 440 Hz, rounded to 0.01 Hz)
    pub fn frequency_hz(self) -> f32 {
        match self {
            Note::C4 => 261.63,
            Note::D4 => 293.66,
            Note::E4 => 329.63,
            Note::F4 => 349.23,
            Note::Fs4 => 369.99,
            Note::G4 => 392.0,
            Note::A4 => 440.0,
            Note::Bb4 => 466.16,
            Note::B4 => 493.88,
            Note::C5 => 523.25,
            Note::D5 => 587.33,
            Note::Eb5 => 622.25,
            Note::E5 => 659.25,
            Note::F5 => 698.46,
            Note::Fs5 => 739.99,
            Note::G5 => 783.99,
            Note::A5 => 880.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Note::C4 => "C4",
            Note::D4 => "D4",
            Note::E4 => "E4",
            Note::F4 => "F4",
            Note::Fs4 => "Fs4",
            Note::G4 => "G4",
            Note::A4 => "A4",
            Note::Bb4 => "Bb4",
            Note::B4 => "B4",
            Note::C5 => "C5",
            Note::D5 => "D5",
            Note::Eb5 => "Eb5",
            Note::E5 => "E5",
            Note::F5 => "F5",
            Note::Fs5 => "Fs5",
            Note::G5 => "G5",
            Note::A5 => "A5",
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNote(pub String);

impl fmt::Display for UnknownNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown note: {}", self.0)
    }
}

impl std::error::Error for UnknownNote {}

impl FromStr for Note {
    type Err = UnknownNote;

    /// Parse a symbolic name such as `E4`, `Fs5` or `Bb4` (`F#5` is accepted too)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('#', "s");
        Note::ALL
            .iter()
            .copied()
            .find(|note| note.name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| UnknownNote(s.to_string()))
    }
}
