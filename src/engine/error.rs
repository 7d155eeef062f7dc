use thiserror::Error;

/// Faults raised by the audio engine
///
/// None of these reach the listener: the sequencer degrades every one of them
/// to "no sound".
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("audio output is not supported in this environment")]
    Unsupported,
    #[error("audio context is closed")]
    Closed,
    #[error("no default output device")]
    NoOutputDevice,
    #[error("failed to query output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("failed to pause output stream: {0}")]
    PauseStream(#[from] cpal::PauseStreamError),
    #[error("offline engine fault: {0}")]
    Offline(&'static str),
}
