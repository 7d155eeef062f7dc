//! The built-in melodies, in presentation order
//!
//! The first entry is the default selection and the fallback for unknown ids.

use super::melody::{Melody, MelodyChoice, Step};
use super::note::Note::*;

// Jingle Bells, opening phrase in C major
const JINGLE_BELLS: &[Step] = &[
    Step::note(E4, 1.0),
    Step::note(E4, 1.0),
    Step::note(E4, 2.0),
    Step::note(E4, 1.0),
    Step::note(E4, 1.0),
    Step::note(E4, 2.0),
    Step::note(E4, 1.0),
    Step::note(G4, 1.0),
    Step::note(C4, 1.5),
    Step::note(D4, 0.5),
    Step::note(E4, 3.0),
    Step::rest(1.0),
    Step::note(F4, 1.0),
    Step::note(F4, 1.0),
    Step::note(F4, 1.5),
    Step::note(F4, 0.5),
    Step::note(F4, 1.0),
    Step::note(E4, 1.0),
    Step::note(E4, 1.0),
    Step::note(E4, 0.5),
    Step::note(E4, 0.5),
    Step::note(E4, 1.0),
    Step::note(D4, 1.0),
    Step::note(D4, 1.0),
    Step::note(E4, 1.0),
    Step::note(D4, 2.0),
    Step::note(G4, 2.0),
    Step::rest(1.0),
];

// "E-lec-tri-fy my heart", then the cascading synth run
const BUTTERCUP: &[Step] = &[
    Step::note(D5, 0.5),
    Step::note(D5, 0.5),
    Step::note(D5, 0.5),
    Step::note(D5, 0.5),
    Step::note(E5, 0.5),
    Step::note(Fs5, 1.0),
    Step::note(E5, 1.0),
    Step::note(D5, 1.0),
    Step::note(B4, 1.0),
    Step::note(A4, 1.0),
    Step::note(D5, 1.0),
    Step::note(B4, 1.0),
    Step::note(G4, 1.0),
    Step::note(Fs4, 2.0),
];

// "De-ja Vu!" and the fast run after it
const DEJA_VU: &[Step] = &[
    Step::note(C5, 0.5),
    Step::note(D5, 1.0),
    Step::note(Eb5, 2.0),
    Step::note(Eb5, 0.5),
    Step::note(Eb5, 0.5),
    Step::note(D5, 0.5),
    Step::note(C5, 0.5),
    Step::note(Bb4, 0.5),
    Step::note(Bb4, 1.0),
    Step::note(C5, 0.5),
    Step::note(C5, 2.0),
    Step::rest(1.0),
];

// Four phrases alternating a slow call with a fast eighth-note run
const MOCHI_BAER: &[Step] = &[
    Step::note(A5, 1.0),
    Step::note(Fs5, 0.5),
    Step::note(A5, 2.0),
    Step::note(A5, 1.0),
    Step::note(Fs5, 0.5),
    Step::note(E5, 0.5),
    Step::note(Fs5, 0.5),
    Step::note(D5, 2.0),
    Step::note(A5, 1.0),
    Step::note(Fs5, 0.5),
    Step::note(A5, 2.0),
    Step::note(A5, 1.0),
    Step::note(Fs5, 0.5),
    Step::note(E5, 0.5),
    Step::note(Fs5, 0.5),
    Step::note(D5, 2.5),
    Step::rest(1.0),
];

pub static MELODIES: &[Melody] = &[
    Melody {
        id: "jingle-bells",
        label: "Jingle Bells",
        steps: JINGLE_BELLS,
        tempo_bpm: 120.0,
    },
    Melody {
        id: "buttercup-meme",
        label: "Electrify My Heart",
        steps: BUTTERCUP,
        tempo_bpm: 120.0,
    },
    Melody {
        id: "deja-vu-meme",
        label: "Deja Vu",
        steps: DEJA_VU,
        tempo_bpm: 155.0,
    },
    Melody {
        id: "mochi-baer-theme",
        label: "Mochi-Bär Theme",
        steps: MOCHI_BAER,
        tempo_bpm: 110.0,
    },
];

/// `{id, label}` for every melody, in catalog order
pub fn melodies() -> impl Iterator<Item = MelodyChoice> {
    MELODIES.iter().map(MelodyChoice::from)
}

pub fn lookup(id: &str) -> Option<&'static Melody> {
    MELODIES.iter().find(|melody| melody.id == id)
}

/// Like [`lookup`], but an unknown id resolves to the first catalog entry
pub fn lookup_or_default(id: &str) -> &'static Melody {
    lookup(id).unwrap_or_else(|| {
        log::debug!("unknown melody id {:?}, using {}", id, default_melody().id);
        default_melody()
    })
}

pub fn default_melody() -> &'static Melody {
    &MELODIES[0]
}
