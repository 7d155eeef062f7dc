//! Audio-processing context
//!
//! A context owns a monotonic sample clock and a set of output chains. Each
//! chain mixes its scheduled sources, applies an automatable master gain and a
//! compressor, and adds the result to the destination. The controller side
//! holds an [`AudioContext`]; the rendering side (device callback or offline
//! renderer) holds a [`Renderer`] onto the same graph.

use super::error::EngineError;
use crate::generator::{
    AudioParam, Compressor, CompressorConfig, FrameClock, GeneratorState, SignalGenerator,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Clock is frozen and nothing is rendered
    Suspended,
    Running,
    /// Resources released; the context can never run again
    Closed,
}

/// Where a context's rendered audio ends up
pub trait Destination {
    /// Start delivering audio
    fn resume(&mut self) -> Result<(), EngineError>;

    /// Stop delivering audio and release the underlying resource
    fn close(&mut self) -> Result<(), EngineError>;
}

struct Chain {
    gain: AudioParam,
    compressor: Compressor,
    sources: Vec<Box<dyn SignalGenerator>>,
    mix: Vec<f32>,
    scratch: Vec<f32>,
}

impl Chain {
    fn render_into(&mut self, out: &mut [f32], clock: FrameClock) {
        let Chain {
            gain,
            compressor,
            sources,
            mix,
            scratch,
        } = self;

        mix.clear();
        mix.resize(out.len(), 0.0);
        scratch.resize(out.len(), 0.0);

        sources.retain_mut(|source| {
            scratch.fill(0.0);
            let state = source.process(scratch, clock);
            for (m, s) in mix.iter_mut().zip(scratch.iter()) {
                *m += s;
            }
            state == GeneratorState::Running
        });

        gain.fill(scratch, clock);
        for (m, g) in mix.iter_mut().zip(scratch.iter()) {
            *m *= g;
        }
        compressor.process(mix);

        for (o, m) in out.iter_mut().zip(mix.iter()) {
            *o += m;
        }
    }
}

struct Graph {
    state: ContextState,
    sample_rate: u32,
    frame: u64,
    chains: Vec<Chain>,
}

impl Graph {
    fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        if self.state != ContextState::Running {
            return;
        }

        let clock = FrameClock::new(self.sample_rate, self.frame);
        for chain in self.chains.iter_mut() {
            chain.render_into(out, clock);
        }
        self.frame += out.len() as u64;
    }

    fn current_time(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }
}

fn lock(graph: &Mutex<Graph>) -> MutexGuard<'_, Graph> {
    // A panic on the render side must not take the controller down with it
    graph.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Rendering side of a context
#[derive(Clone)]
pub struct Renderer {
    graph: Arc<Mutex<Graph>>,
}

impl Renderer {
    pub fn new(sample_rate: u32, state: ContextState) -> Self {
        Self {
            graph: Arc::new(Mutex::new(Graph {
                state,
                sample_rate,
                frame: 0,
                chains: Vec::new(),
            })),
        }
    }

    /// Render the next `out.len()` samples and advance the clock
    ///
    /// A suspended or closed context writes silence and keeps its clock still.
    pub fn render(&self, out: &mut [f32]) {
        lock(&self.graph).render(out);
    }

    pub fn state(&self) -> ContextState {
        lock(&self.graph).state
    }

    pub fn current_time(&self) -> f64 {
        lock(&self.graph).current_time()
    }
}

/// Controller side of an audio-processing context
pub struct AudioContext {
    renderer: Renderer,
    destination: Box<dyn Destination>,
    sample_rate: u32,
}

impl AudioContext {
    pub fn from_parts(renderer: Renderer, destination: Box<dyn Destination>) -> Self {
        let sample_rate = lock(&renderer.graph).sample_rate;
        Self {
            renderer,
            destination,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Seconds rendered so far on this context's clock
    pub fn current_time(&self) -> f64 {
        self.renderer.current_time()
    }

    pub fn state(&self) -> ContextState {
        self.renderer.state()
    }

    pub fn renderer(&self) -> Renderer {
        self.renderer.clone()
    }

    pub fn resume(&mut self) -> Result<(), EngineError> {
        match self.state() {
            ContextState::Closed => Err(EngineError::Closed),
            ContextState::Running => Ok(()),
            ContextState::Suspended => {
                self.destination.resume()?;
                lock(&self.renderer.graph).state = ContextState::Running;
                Ok(())
            }
        }
    }

    /// Release the context
    ///
    /// On failure the context is left as it was; the caller decides whether to
    /// abandon it.
    pub fn close(&mut self) -> Result<(), EngineError> {
        if self.state() == ContextState::Closed {
            return Ok(());
        }
        self.destination.close()?;

        let mut graph = lock(&self.renderer.graph);
        graph.state = ContextState::Closed;
        graph.chains.clear();
        Ok(())
    }

    /// Add a chain of master gain → compressor → destination
    pub fn create_output_chain(&self, gain: f32, compressor: CompressorConfig) -> OutputChain {
        let mut graph = lock(&self.renderer.graph);
        let index = graph.chains.len();
        graph.chains.push(Chain {
            gain: AudioParam::new(gain),
            compressor: Compressor::new(compressor, self.sample_rate),
            sources: Vec::new(),
            mix: Vec::new(),
            scratch: Vec::new(),
        });
        OutputChain {
            graph: Arc::clone(&self.renderer.graph),
            index,
        }
    }
}

/// Handle to one output chain of a context
pub struct OutputChain {
    graph: Arc<Mutex<Graph>>,
    index: usize,
}

impl OutputChain {
    /// Connect a source to this chain
    ///
    /// Scheduling onto a closed context is silently ignored.
    pub fn schedule(&self, source: Box<dyn SignalGenerator>) {
        let mut graph = lock(&self.graph);
        if graph.state == ContextState::Closed {
            log::debug!("ignoring source scheduled on a closed context");
            return;
        }
        if let Some(chain) = graph.chains.get_mut(self.index) {
            chain.sources.push(source);
        }
    }

    /// Edit the chain's master gain automation
    pub fn automate_gain<R>(&self, f: impl FnOnce(&mut AudioParam) -> R) -> Option<R> {
        let mut graph = lock(&self.graph);
        graph.chains.get_mut(self.index).map(|chain| f(&mut chain.gain))
    }

    /// Number of sources still sounding (or waiting to sound)
    pub fn active_sources(&self) -> usize {
        lock(&self.graph)
            .chains
            .get(self.index)
            .map_or(0, |chain| chain.sources.len())
    }
}
