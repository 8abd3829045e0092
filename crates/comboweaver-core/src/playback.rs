use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    media::{
        ClipToken, EmbedReadiness, MediaBackend, MediaEvent, MediaHandle, MediaKind, MediaSource,
        PlayerState,
    },
    model::ClipWindow,
    sequence::SequenceStore,
};

pub const REWIND_SECONDS: f64 = 5.0;
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    pub rewind_seconds: f64,
    pub poll_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            rewind_seconds: REWIND_SECONDS,
            poll_interval: POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    Stopped,
    Playing,
    Paused,
}

/// Why the current clip is not making progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stall {
    AwaitingEmbedSdk,
    LoadFailed,
    Unplayable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackStatus {
    pub phase: PlaybackPhase,
    pub current_index: Option<usize>,
    pub paused: bool,
    pub entry_id: Option<String>,
    pub token: Option<ClipToken>,
    pub stalled: Option<Stall>,
}

#[derive(Debug)]
struct LoadedClip {
    index: usize,
    entry_id: String,
    token: ClipToken,
    source: MediaSource,
    window: ClipWindow,
    handle: Option<Box<dyn MediaHandle>>,
    ready: bool,
    polling: bool,
    stall: Option<Stall>,
}

/// Plays the sequence one clip at a time.
///
/// The controller is the only owner of the active media resource. At most one
/// handle is alive; every index change and every stop destroys the previous
/// one, including its poller, before anything else is attached.
///
/// Commands and events take the store so every decision is made against the
/// current order. If the entry that was loaded is no longer at its index the
/// controller stops instead of playing a stale clip.
#[derive(Debug)]
pub struct PlaybackController<B: MediaBackend> {
    backend: B,
    readiness: EmbedReadiness,
    config: PlaybackConfig,
    clip: Option<LoadedClip>,
    paused: bool,
    next_token: u64,
}

impl<B: MediaBackend> PlaybackController<B> {
    #[must_use]
    pub fn new(backend: B, readiness: EmbedReadiness) -> Self {
        Self::with_config(backend, readiness, PlaybackConfig::default())
    }

    #[must_use]
    pub fn with_config(backend: B, readiness: EmbedReadiness, config: PlaybackConfig) -> Self {
        Self {
            backend,
            readiness,
            config,
            clip: None,
            paused: false,
            next_token: 0,
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn readiness(&self) -> &EmbedReadiness {
        &self.readiness
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.clip.as_ref().map(|clip| clip.index)
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn phase(&self) -> PlaybackPhase {
        match (&self.clip, self.paused) {
            (None, _) => PlaybackPhase::Stopped,
            (Some(_), true) => PlaybackPhase::Paused,
            (Some(_), false) => PlaybackPhase::Playing,
        }
    }

    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            phase: self.phase(),
            current_index: self.current_index(),
            paused: self.paused,
            entry_id: self.clip.as_ref().map(|clip| clip.entry_id.clone()),
            token: self.clip.as_ref().map(|clip| clip.token),
            stalled: self.clip.as_ref().and_then(|clip| clip.stall),
        }
    }

    #[instrument(skip(self, store), fields(len = store.len()))]
    pub fn play(&mut self, store: &SequenceStore) {
        if store.is_empty() {
            debug!("play ignored, sequence empty");
            return;
        }
        self.sync(store);

        match self.phase() {
            PlaybackPhase::Stopped => {
                self.paused = false;
                self.attach(store, 0);
            }
            PlaybackPhase::Paused => {
                self.paused = false;
                self.resume_media();
                info!(index = ?self.current_index(), "playback resumed");
            }
            PlaybackPhase::Playing => debug!("play ignored, already playing"),
        }
    }

    #[instrument(skip(self, store))]
    pub fn pause(&mut self, store: &SequenceStore) {
        self.sync(store);
        if self.phase() != PlaybackPhase::Playing {
            debug!("pause ignored, not playing");
            return;
        }
        self.paused = true;
        if let Some(handle) = self.clip.as_mut().and_then(|clip| clip.handle.as_mut()) {
            handle.pause();
        }
        info!(index = ?self.current_index(), "playback paused");
    }

    /// Seeks back by the rewind offset without leaving the current clip's window.
    /// Returns the new position when a media handle was available.
    #[instrument(skip(self, store))]
    pub fn rewind(&mut self, store: &SequenceStore) -> Option<f64> {
        self.sync(store);
        let rewind_seconds = self.config.rewind_seconds;
        let clip = self.clip.as_mut()?;
        let handle = clip.handle.as_mut()?;
        let target = (handle.position() - rewind_seconds).max(clip.window.start);
        handle.seek(target);
        debug!(target, "rewound");
        Some(target)
    }

    #[instrument(skip(self))]
    pub fn hard_stop(&mut self) {
        let was_active = self.clip.is_some();
        self.teardown();
        self.paused = false;
        if was_active {
            info!("playback stopped");
        }
    }

    /// Re-validates the loaded clip against the current sequence and stops on
    /// any mismatch. Returns true when playback (if any) is still consistent.
    pub fn sync(&mut self, store: &SequenceStore) -> bool {
        let Some(clip) = &self.clip else {
            return true;
        };
        let consistent = store
            .get(clip.index)
            .is_some_and(|entry| entry.entry_id == clip.entry_id);
        if !consistent {
            warn!(
                index = clip.index,
                entry_id = %clip.entry_id,
                len = store.len(),
                "sequence changed under active playback, stopping"
            );
            self.hard_stop();
        }
        consistent
    }

    /// Called once the embedded-player SDK signals readiness. A clip that was
    /// waiting on it is created now.
    #[instrument(skip(self, store))]
    pub fn notify_embed_ready(&mut self, store: &SequenceStore) {
        self.readiness.mark_ready();
        if !self.sync(store) {
            return;
        }
        let waiting = self
            .clip
            .as_ref()
            .is_some_and(|clip| clip.stall == Some(Stall::AwaitingEmbedSdk));
        if waiting {
            self.open_media();
        }
    }

    #[instrument(skip(self, store), fields(token = %event.token()))]
    pub fn handle_event(&mut self, store: &SequenceStore, event: MediaEvent) {
        if !self.sync(store) {
            return;
        }
        let Some(clip) = self.clip.as_ref() else {
            debug!("event ignored, playback stopped");
            return;
        };
        if clip.token != event.token() {
            debug!(current = %clip.token, "stale media event ignored");
            return;
        }

        match event {
            MediaEvent::Ready { .. } => self.on_ready(),
            MediaEvent::PositionChanged { position, .. } => self.check_window_end(store, position),
            MediaEvent::PollTick { .. } => {
                let polling = self.clip.as_ref().is_some_and(|clip| clip.polling);
                if !polling {
                    debug!("poll tick after poller stopped ignored");
                    return;
                }
                let position = self
                    .clip
                    .as_ref()
                    .and_then(|clip| clip.handle.as_ref())
                    .map(|handle| handle.position());
                if let Some(position) = position {
                    self.check_window_end(store, position);
                }
            }
            MediaEvent::StateChanged { state, .. } => self.on_state_changed(store, state),
            MediaEvent::Ended { .. } => self.clip_ended(store),
        }
    }

    fn on_ready(&mut self) {
        let paused = self.paused;
        let Some(clip) = self.clip.as_mut() else {
            return;
        };
        let Some(handle) = clip.handle.as_mut() else {
            return;
        };
        clip.ready = true;
        handle.seek(clip.window.start);
        if paused {
            debug!("clip ready while paused, holding");
            return;
        }
        if let Err(error) = handle.play() {
            warn!(%error, "clip refused to start");
            clip.stall = Some(Stall::LoadFailed);
        }
    }

    fn on_state_changed(&mut self, store: &SequenceStore, state: PlayerState) {
        let should_poll = state == PlayerState::Playing && self.trim_end_applies(store);
        let poll_interval = self.config.poll_interval;
        if let Some(clip) = self.clip.as_mut() {
            if clip.polling {
                self.backend.stop_poll(clip.token);
                clip.polling = false;
            }
            if should_poll {
                self.backend.start_poll(clip.token, poll_interval);
                clip.polling = true;
            }
        }
        if state == PlayerState::Ended {
            self.clip_ended(store);
        }
    }

    /// The trimmed end only matters when there is a next clip to cut into.
    fn trim_end_applies(&self, store: &SequenceStore) -> bool {
        self.clip
            .as_ref()
            .is_some_and(|clip| clip.window.end.is_some() && clip.index + 1 < store.len())
    }

    fn check_window_end(&mut self, store: &SequenceStore, position: f64) {
        if self.paused || !self.trim_end_applies(store) {
            return;
        }
        let reached = self
            .clip
            .as_ref()
            .and_then(|clip| clip.window.end)
            .is_some_and(|end| position >= end);
        if reached {
            debug!(position, "clip window end reached");
            self.clip_ended(store);
        }
    }

    fn clip_ended(&mut self, store: &SequenceStore) {
        if self.paused {
            debug!("clip end suppressed while paused");
            return;
        }
        let Some(index) = self.current_index() else {
            return;
        };
        if index + 1 < store.len() {
            self.attach(store, index + 1);
        } else {
            info!(index, "sequence finished");
            self.hard_stop();
        }
    }

    fn attach(&mut self, store: &SequenceStore, index: usize) {
        self.teardown();
        let Some(entry) = store.get(index) else {
            warn!(index, len = store.len(), "attach target out of range");
            self.paused = false;
            return;
        };

        self.next_token += 1;
        let token = ClipToken(self.next_token);
        let source = MediaSource::from_url(&entry.part.video_url);
        self.clip = Some(LoadedClip {
            index,
            entry_id: entry.entry_id.clone(),
            token,
            source,
            window: entry.part.playback_window(),
            handle: None,
            ready: false,
            polling: false,
            stall: None,
        });
        info!(index, entry_id = %entry.entry_id, %token, "clip attached");
        self.open_media();
    }

    /// Creates and loads the media handle for the attached clip, or records
    /// why it cannot start yet.
    fn open_media(&mut self) {
        let embed_ready = self.readiness.is_ready();
        let Some(clip) = self.clip.as_mut() else {
            return;
        };
        let kind = match clip.source.kind() {
            Some(kind) => kind,
            None => {
                warn!(source = clip.source.key(), "clip has no playable source");
                clip.stall = Some(Stall::Unplayable);
                return;
            }
        };
        if kind == MediaKind::Embedded && !embed_ready {
            debug!("embedded clip waiting for sdk readiness");
            clip.stall = Some(Stall::AwaitingEmbedSdk);
            return;
        }

        let mut handle = match self.backend.create(kind, clip.token) {
            Ok(handle) => handle,
            Err(error) => {
                warn!(%error, "media handle creation failed");
                clip.stall = Some(Stall::LoadFailed);
                return;
            }
        };
        if let Err(error) = handle.load(&clip.source, clip.window.start) {
            warn!(%error, "clip failed to load");
            handle.destroy();
            clip.stall = Some(Stall::LoadFailed);
            return;
        }
        clip.stall = None;
        clip.ready = false;
        clip.handle = Some(handle);
    }

    fn resume_media(&mut self) {
        let embed_ready = self.readiness.is_ready();
        let Some(clip) = self.clip.as_mut() else {
            return;
        };
        let reopen = match clip.handle.as_mut() {
            Some(handle) if clip.ready => {
                if let Err(error) = handle.play() {
                    warn!(%error, "resume refused");
                    clip.stall = Some(Stall::LoadFailed);
                }
                false
            }
            Some(_) => {
                debug!("resume before clip ready, will start on ready");
                false
            }
            None => clip.stall == Some(Stall::AwaitingEmbedSdk) && embed_ready,
        };
        if reopen {
            self.open_media();
        }
    }

    fn teardown(&mut self) {
        let Some(mut clip) = self.clip.take() else {
            return;
        };
        if clip.polling {
            self.backend.stop_poll(clip.token);
        }
        if let Some(mut handle) = clip.handle.take() {
            handle.destroy();
        }
        debug!(token = %clip.token, "clip torn down");
    }
}

impl<B: MediaBackend> Drop for PlaybackController<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
