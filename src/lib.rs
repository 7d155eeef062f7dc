//! Procedural "meow" melody sequencer.
//!
//! Synthesizes a cat-like voice without audio assets and schedules it against a
//! small catalog of melodies using a lookahead loop on a live audio clock.

pub mod engine;
pub mod generator;
pub mod pipeline;
pub mod score;
pub mod wav;
