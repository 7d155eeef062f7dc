use super::context::AudioContext;
use super::error::EngineError;

/// Something that can hand out audio-processing contexts
pub trait AudioBackend {
    /// Whether this environment exposes audio output at all
    fn is_supported(&self) -> bool;

    /// Create a new context, usually in the suspended state
    fn create_context(&mut self) -> Result<AudioContext, EngineError>;
}

impl<B: AudioBackend + ?Sized> AudioBackend for Box<B> {
    fn is_supported(&self) -> bool {
        (**self).is_supported()
    }

    fn create_context(&mut self) -> Result<AudioContext, EngineError> {
        (**self).create_context()
    }
}
