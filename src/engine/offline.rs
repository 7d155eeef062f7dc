//! Backend without a device
//!
//! Contexts are rendered on demand with [`OfflineBackend::render`], which makes
//! the audio clock fully deterministic. The backend can also simulate the
//! failure modes of a real environment.

use super::backend::AudioBackend;
use super::context::{AudioContext, ContextState, Destination, Renderer};
use super::error::EngineError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Frames rendered per pass, matching the render quantum of web audio engines
pub const RENDER_QUANTUM: usize = 128;

#[derive(Debug, Clone, Copy)]
pub struct OfflineConfig {
    pub sample_rate: u32,
    /// When false, the backend reports no audio output
    pub supported: bool,
    /// Hand out contexts suspended rather than running
    pub start_suspended: bool,
    pub fail_resume: bool,
    pub fail_close: bool,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            supported: true,
            start_suspended: true,
            fail_resume: false,
            fail_close: false,
        }
    }
}

#[derive(Default)]
struct Shared {
    created: usize,
    closed: usize,
    renderers: Vec<Renderer>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cloneable handle onto one offline audio environment
#[derive(Clone)]
pub struct OfflineBackend {
    config: OfflineConfig,
    shared: Arc<Mutex<Shared>>,
}

impl Default for OfflineBackend {
    fn default() -> Self {
        Self::new(OfflineConfig::default())
    }
}

impl OfflineBackend {
    pub fn new(config: OfflineConfig) -> Self {
        Self {
            config,
            shared: Arc::default(),
        }
    }

    pub fn config(&self) -> &OfflineConfig {
        &self.config
    }

    pub fn contexts_created(&self) -> usize {
        lock(&self.shared).created
    }

    pub fn contexts_closed(&self) -> usize {
        lock(&self.shared).closed
    }

    /// Contexts created and not successfully closed
    pub fn open_contexts(&self) -> usize {
        let shared = lock(&self.shared);
        shared.created - shared.closed
    }

    /// Render `seconds` of audio from every live context, mixed together
    pub fn render(&self, seconds: f64) -> Vec<f32> {
        let frames = (seconds.max(0.0) * self.config.sample_rate as f64).round() as usize;
        let mut out = vec![0.0f32; frames];

        let renderers = {
            let mut shared = lock(&self.shared);
            shared
                .renderers
                .retain(|renderer| renderer.state() != ContextState::Closed);
            shared.renderers.clone()
        };

        let mut quantum = [0.0f32; RENDER_QUANTUM];
        for renderer in renderers.iter() {
            for chunk in out.chunks_mut(RENDER_QUANTUM) {
                let scratch = &mut quantum[..chunk.len()];
                renderer.render(scratch);
                for (o, s) in chunk.iter_mut().zip(scratch.iter()) {
                    *o += s;
                }
            }
        }
        out
    }
}

impl AudioBackend for OfflineBackend {
    fn is_supported(&self) -> bool {
        self.config.supported
    }

    fn create_context(&mut self) -> Result<AudioContext, EngineError> {
        if !self.config.supported {
            return Err(EngineError::Unsupported);
        }

        let state = if self.config.start_suspended {
            ContextState::Suspended
        } else {
            ContextState::Running
        };
        let renderer = Renderer::new(self.config.sample_rate, state);
        {
            let mut shared = lock(&self.shared);
            shared.created += 1;
            shared.renderers.push(renderer.clone());
        }
        log::debug!("offline context created ({:?})", state);

        let destination = OfflineDestination {
            shared: Arc::clone(&self.shared),
            fail_resume: self.config.fail_resume,
            fail_close: self.config.fail_close,
        };
        Ok(AudioContext::from_parts(renderer, Box::new(destination)))
    }
}

struct OfflineDestination {
    shared: Arc<Mutex<Shared>>,
    fail_resume: bool,
    fail_close: bool,
}

impl Destination for OfflineDestination {
    fn resume(&mut self) -> Result<(), EngineError> {
        if self.fail_resume {
            return Err(EngineError::Offline("resume refused"));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        if self.fail_close {
            return Err(EngineError::Offline("close failed"));
        }
        lock(&self.shared).closed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{AudioParam, CompressorConfig, ParamCurve};

    #[test]
    fn test_counts_contexts() {
        let mut backend = OfflineBackend::default();
        let mut first = backend.create_context().unwrap();
        let _second = backend.create_context().unwrap();
        assert_eq!(backend.contexts_created(), 2);
        assert_eq!(backend.open_contexts(), 2);

        first.close().unwrap();
        assert_eq!(backend.contexts_closed(), 1);
        assert_eq!(backend.open_contexts(), 1);
    }

    #[test]
    fn test_unsupported() {
        let mut backend = OfflineBackend::new(OfflineConfig {
            supported: false,
            ..Default::default()
        });
        assert!(!backend.is_supported());
        assert!(matches!(
            backend.create_context(),
            Err(EngineError::Unsupported)
        ));
        assert_eq!(backend.contexts_created(), 0);
    }

    #[test]
    fn test_render_advances_running_contexts() {
        let mut backend = OfflineBackend::new(OfflineConfig {
            sample_rate: 1000,
            ..Default::default()
        });
        let mut ctx = backend.create_context().unwrap();
        let chain = ctx.create_output_chain(1.0, CompressorConfig::default());
        chain.schedule(Box::new(ParamCurve::new(AudioParam::new(0.001), 1.0)));

        // Suspended: silent, clock still
        let out = backend.render(0.5);
        assert_eq!(out.len(), 500);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(ctx.current_time(), 0.0);

        ctx.resume().unwrap();
        let out = backend.render(0.5);
        assert!((ctx.current_time() - 0.5).abs() < 1e-9);
        assert!(out.iter().all(|&s| s > 0.0));
    }

    #[test]
    fn test_simulated_faults() {
        let mut backend = OfflineBackend::new(OfflineConfig {
            fail_resume: true,
            fail_close: true,
            ..Default::default()
        });
        let mut ctx = backend.create_context().unwrap();
        assert!(ctx.resume().is_err());
        assert_eq!(ctx.state(), ContextState::Suspended);
        assert!(ctx.close().is_err());
        assert_eq!(backend.open_contexts(), 1);
    }
}
