//! Score library: pitches, steps and the built-in melody catalog

pub mod catalog;
pub mod melody;
pub mod note;

pub use catalog::{default_melody, lookup, lookup_or_default, melodies, MELODIES};
pub use melody::{Melody, MelodyChoice, Step};
pub use note::{Note, UnknownNote};
