//! Melody playback pipeline
//!
//! - Voice: the "meow" note synthesizer
//! - Session: lookahead scheduling of one melody on one audio context
//! - Controller: enable / loop / melody switches owning the current session
//! - Render: offline rendering of a melody through the controller

pub mod controller;
pub mod render;
pub mod session;
pub mod voice;

pub use controller::{MusicController, PlaybackState};
pub use render::{render_melody, RenderOptions};
pub use session::{PlaybackSession, SequencerConfig, SessionParams, TickOutcome};
pub use voice::{play_meow_note, MeowVoice};
