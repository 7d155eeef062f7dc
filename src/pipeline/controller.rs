//! Playback control surface
//!
//! [`MusicController`] holds the user-facing switches (enabled, loop, melody)
//! and owns at most one [`PlaybackSession`]. Any change to a switch while
//! enabled throws the current session away and starts a fresh one with the new
//! settings; a session never outlives the settings it was started with.

use super::session::{PlaybackSession, SequencerConfig, SessionParams, TickOutcome};
use crate::engine::AudioBackend;
use crate::score::{default_melody, lookup_or_default, melodies, MelodyChoice};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Running,
    /// Melody has run out and the session is waiting for its stop time
    Stopping,
}

pub struct MusicController<B: AudioBackend> {
    backend: B,
    config: SequencerConfig,
    enabled: bool,
    looping: bool,
    melody_id: String,
    session: Option<PlaybackSession>,
    sessions_started: usize,
}

impl<B: AudioBackend> MusicController<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, SequencerConfig::default())
    }

    pub fn with_config(backend: B, config: SequencerConfig) -> Self {
        Self {
            backend,
            config,
            enabled: false,
            looping: false,
            melody_id: default_melody().id.to_string(),
            session: None,
            sessions_started: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    /// The selected id, exactly as set (it may not name a known melody)
    pub fn melody_id(&self) -> &str {
        &self.melody_id
    }

    pub fn melodies(&self) -> Vec<MelodyChoice> {
        melodies().collect()
    }

    pub fn supported(&self) -> bool {
        self.backend.is_supported()
    }

    pub fn state(&self) -> PlaybackState {
        match &self.session {
            None => PlaybackState::Idle,
            Some(session) if session.is_stopping() => PlaybackState::Stopping,
            Some(_) => PlaybackState::Running,
        }
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// Sessions successfully started since construction
    pub fn sessions_started(&self) -> usize {
        self.sessions_started
    }

    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval
    }

    pub fn toggle(&mut self) {
        self.set_enabled(!self.enabled);
    }

    /// Turn playback on or off
    ///
    /// Enabling does nothing when audio is unsupported; disabling always
    /// releases the current session.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        if enabled && !self.supported() {
            log::debug!("audio output unsupported, not enabling playback");
            return;
        }

        self.enabled = enabled;
        if enabled {
            self.start_session();
        } else {
            self.stop_session();
        }
    }

    pub fn set_loop(&mut self, looping: bool) {
        if looping == self.looping {
            return;
        }
        self.looping = looping;
        self.restart();
    }

    /// Select a melody by id; unknown ids fall back to the default when played
    pub fn set_melody_id(&mut self, id: &str) {
        if id == self.melody_id {
            return;
        }
        self.melody_id = id.to_string();
        self.restart();
    }

    /// Advance the current session, tearing it down once it has finished
    pub fn tick(&mut self) -> PlaybackState {
        if let Some(session) = self.session.as_mut() {
            if session.tick(&self.config) == TickOutcome::Finished {
                self.stop_session();
            }
        }
        self.state()
    }

    fn restart(&mut self) {
        if !self.enabled {
            return;
        }
        self.stop_session();
        self.start_session();
    }

    fn start_session(&mut self) {
        let params = SessionParams {
            melody: lookup_or_default(&self.melody_id),
            looping: self.looping,
        };
        match PlaybackSession::start(&mut self.backend, params, &self.config) {
            Ok(session) => {
                self.sessions_started += 1;
                self.session = Some(session);
            }
            Err(err) => log::warn!("could not start playback: {}", err),
        }
    }

    fn stop_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.teardown();
        }
    }
}

impl<B: AudioBackend> Drop for MusicController<B> {
    fn drop(&mut self) {
        self.stop_session();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AudioContext, EngineError, OfflineBackend, OfflineConfig};
    use crate::score::lookup;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Offline backend whose device can disappear, and which records how many
    /// contexts were still open each time a new one was requested
    struct WatchedBackend {
        inner: OfflineBackend,
        present: Rc<Cell<bool>>,
        open_at_create: Rc<RefCell<Vec<usize>>>,
    }

    impl AudioBackend for WatchedBackend {
        fn is_supported(&self) -> bool {
            self.present.get()
        }

        fn create_context(&mut self) -> Result<AudioContext, EngineError> {
            self.open_at_create
                .borrow_mut()
                .push(self.inner.open_contexts());
            self.inner.create_context()
        }
    }

    fn watched() -> (
        MusicController<WatchedBackend>,
        OfflineBackend,
        Rc<Cell<bool>>,
        Rc<RefCell<Vec<usize>>>,
    ) {
        let inner = OfflineBackend::new(OfflineConfig {
            sample_rate: 8000,
            ..Default::default()
        });
        let present = Rc::new(Cell::new(true));
        let open_at_create = Rc::new(RefCell::new(Vec::new()));
        let backend = WatchedBackend {
            inner: inner.clone(),
            present: Rc::clone(&present),
            open_at_create: Rc::clone(&open_at_create),
        };
        (MusicController::new(backend), inner, present, open_at_create)
    }

    fn offline(config: OfflineConfig) -> (MusicController<OfflineBackend>, OfflineBackend) {
        let backend = OfflineBackend::new(OfflineConfig {
            sample_rate: 8000,
            ..config
        });
        (MusicController::new(backend.clone()), backend)
    }

    /// Drive the controller like a host timer would, for up to `seconds`
    fn advance(
        controller: &mut MusicController<OfflineBackend>,
        backend: &OfflineBackend,
        seconds: f64,
    ) -> Vec<f32> {
        let step = controller.tick_interval().as_secs_f64();
        let mut audio = Vec::new();
        let mut elapsed = 0.0;
        while elapsed < seconds {
            controller.tick();
            audio.extend(backend.render(step));
            elapsed += step;
        }
        audio
    }

    #[test]
    fn test_initial_state() {
        let (controller, backend) = offline(OfflineConfig::default());
        assert!(!controller.enabled());
        assert!(!controller.looping());
        assert_eq!(controller.melody_id(), "jingle-bells");
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(controller.supported());
        assert_eq!(backend.contexts_created(), 0);
        assert_eq!(controller.melodies().len(), 4);
        assert_eq!(controller.melodies()[0].id, "jingle-bells");
    }

    #[test]
    fn test_toggle_starts_and_stops() {
        let (mut controller, backend) = offline(OfflineConfig::default());

        controller.toggle();
        assert!(controller.enabled());
        assert_eq!(controller.state(), PlaybackState::Running);
        assert_eq!(backend.open_contexts(), 1);

        controller.toggle();
        assert!(!controller.enabled());
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert_eq!(backend.open_contexts(), 0);
        assert_eq!(backend.contexts_created(), 1);
    }

    #[test]
    fn test_set_enabled_is_idempotent() {
        let (mut controller, backend) = offline(OfflineConfig::default());

        controller.set_enabled(true);
        controller.set_enabled(true);
        assert_eq!(controller.sessions_started(), 1);
        assert_eq!(backend.contexts_created(), 1);

        controller.set_enabled(false);
        controller.set_enabled(false);
        assert_eq!(backend.contexts_closed(), 1);
    }

    #[test]
    fn test_changes_restart_running_session() {
        let (mut controller, backend) = offline(OfflineConfig::default());
        controller.set_enabled(true);

        controller.set_loop(true);
        assert_eq!(controller.sessions_started(), 2);
        assert!(controller.session().unwrap().params().looping);

        // Same value again: no restart
        controller.set_loop(true);
        assert_eq!(controller.sessions_started(), 2);

        controller.set_melody_id("deja-vu-meme");
        assert_eq!(controller.sessions_started(), 3);
        assert_eq!(controller.session().unwrap().params().melody.id, "deja-vu-meme");
        controller.set_melody_id("deja-vu-meme");
        assert_eq!(controller.sessions_started(), 3);

        // Each change tore down exactly one session and left one live context
        assert_eq!(backend.contexts_closed(), 2);
        assert_eq!(backend.open_contexts(), 1);
    }

    #[test]
    fn test_restart_releases_old_context_first() {
        let (mut controller, inner, _present, open_at_create) = watched();
        controller.set_enabled(true);
        controller.set_loop(true);
        controller.set_melody_id("deja-vu-meme");
        controller.set_loop(false);

        assert_eq!(*open_at_create.borrow(), vec![0, 0, 0, 0]);
        assert_eq!(inner.open_contexts(), 1);
    }

    #[test]
    fn test_disable_after_device_loss() {
        let (mut controller, inner, present, _open_at_create) = watched();
        controller.toggle();
        assert_eq!(inner.open_contexts(), 1);

        present.set(false);
        assert!(!controller.supported());
        controller.toggle();
        assert!(!controller.enabled());
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert_eq!(inner.open_contexts(), 0);

        // With the device gone, enabling stays inert
        controller.toggle();
        assert!(!controller.enabled());
        assert_eq!(inner.contexts_created(), 1);
    }

    #[test]
    fn test_changes_while_disabled_start_nothing() {
        let (mut controller, backend) = offline(OfflineConfig::default());

        controller.set_loop(true);
        controller.set_melody_id("buttercup-meme");
        assert!(controller.looping());
        assert_eq!(controller.melody_id(), "buttercup-meme");
        assert_eq!(backend.contexts_created(), 0);

        controller.toggle();
        let params = controller.session().unwrap().params();
        assert_eq!(params.melody.id, "buttercup-meme");
        assert!(params.looping);
    }

    #[test]
    fn test_unknown_melody_falls_back() {
        let (mut controller, _backend) = offline(OfflineConfig::default());
        controller.set_melody_id("no-such-tune");
        controller.toggle();

        assert_eq!(controller.melody_id(), "no-such-tune");
        let melody = controller.session().unwrap().params().melody;
        assert_eq!(melody.id, "jingle-bells");
    }

    #[test]
    fn test_unsupported_is_inert() {
        let (mut controller, backend) = offline(OfflineConfig {
            supported: false,
            ..Default::default()
        });
        assert!(!controller.supported());

        controller.toggle();
        assert!(!controller.enabled());
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert_eq!(backend.contexts_created(), 0);
    }

    #[test]
    fn test_one_shot_plays_out_and_stays_enabled() {
        let (mut controller, backend) = offline(OfflineConfig::default());
        controller.toggle();

        let duration = lookup("jingle-bells").unwrap().duration_seconds();
        let audio = advance(&mut controller, &backend, duration + 1.0);

        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(controller.enabled());
        assert_eq!(backend.open_contexts(), 0);
        assert_eq!(controller.sessions_started(), 1);
        assert!(audio.iter().any(|s| s.abs() > 0.05));
        assert!(audio.iter().all(|s| s.abs() <= 1.0));

        // Nothing restarts on its own
        advance(&mut controller, &backend, 1.0);
        assert_eq!(backend.contexts_created(), 1);
    }

    #[test]
    fn test_stopping_state_before_teardown() {
        let (mut controller, backend) = offline(OfflineConfig::default());
        controller.toggle();

        let duration = lookup("jingle-bells").unwrap().duration_seconds();
        // The last step is within the lookahead, the stop time not yet reached
        advance(&mut controller, &backend, duration);
        assert_eq!(controller.state(), PlaybackState::Stopping);
    }

    #[test]
    fn test_loop_keeps_playing() {
        let (mut controller, backend) = offline(OfflineConfig::default());
        controller.set_melody_id("mochi-baer-theme");
        controller.set_loop(true);
        controller.toggle();

        let duration = lookup("mochi-baer-theme").unwrap().duration_seconds();
        let audio = advance(&mut controller, &backend, 2.0 * duration + 1.0);

        assert_eq!(controller.state(), PlaybackState::Running);
        assert_eq!(backend.open_contexts(), 1);
        // The last stretch still sounds
        let tail = &audio[audio.len() - 8000..];
        assert!(tail.iter().any(|s| s.abs() > 0.01));
    }

    #[test]
    fn test_engine_faults_are_swallowed() {
        let (mut controller, backend) = offline(OfflineConfig {
            fail_resume: true,
            fail_close: true,
            ..Default::default()
        });

        controller.toggle();
        assert_eq!(controller.state(), PlaybackState::Running);
        advance(&mut controller, &backend, 1.0);

        controller.toggle();
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(!controller.enabled());
    }

    #[test]
    fn test_drop_closes_context() {
        let (mut controller, backend) = offline(OfflineConfig::default());
        controller.toggle();
        drop(controller);
        assert_eq!(backend.open_contexts(), 0);
    }
}
