use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace};
use url::Url;

const EMBED_VIDEO_ID_LEN: usize = 11;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("failed to create {kind:?} player: {reason}")]
    Create { kind: MediaKind, reason: String },
    #[error("failed to load {source_key}: {reason}")]
    Load { source_key: String, reason: String },
    #[error("playback refused by {source_key}: {reason}")]
    Play { source_key: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Local,
    Embedded,
}

/// What a part's `video_url` points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MediaSource {
    /// Directly addressable file or stream played by a native video element.
    Local { url: String },
    /// Clip hosted by the third-party embeddable player.
    Embedded { video_id: String },
    /// An embed URL from which no video id could be extracted.
    Unplayable { url: String },
}

impl MediaSource {
    #[must_use]
    pub fn from_url(raw: &str) -> Self {
        let Some(url) = embed_url(raw) else {
            return Self::Local {
                url: raw.to_string(),
            };
        };
        match embed_video_id(&url) {
            Some(video_id) => Self::Embedded { video_id },
            None => Self::Unplayable {
                url: raw.to_string(),
            },
        }
    }

    #[must_use]
    pub fn kind(&self) -> Option<MediaKind> {
        match self {
            Self::Local { .. } => Some(MediaKind::Local),
            Self::Embedded { .. } => Some(MediaKind::Embedded),
            Self::Unplayable { .. } => None,
        }
    }

    /// Stable key for logging and backend bookkeeping.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Local { url } | Self::Unplayable { url } => url,
            Self::Embedded { video_id } => video_id,
        }
    }
}

const EMBED_HOSTS: [&str; 3] = ["youtube.com", "youtu.be", "youtube-nocookie.com"];

/// Parses `raw` and keeps it only when its host belongs to the embeddable player.
/// Scheme-less input such as `youtu.be/abc` is read as https.
fn embed_url(raw: &str) -> Option<Url> {
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&with_scheme).ok()?;
    let host = url.host_str()?;
    let embedded = EMBED_HOSTS.iter().any(|embed| {
        host == *embed
            || host
                .strip_suffix(embed)
                .is_some_and(|subdomain| subdomain.ends_with('.'))
    });
    embedded.then_some(url)
}

fn embed_video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");
    let mut segments = url.path_segments()?.filter(|segment| !segment.is_empty());

    let candidate = if host == "youtu.be" {
        segments.next().map(str::to_string)
    } else {
        match segments.next() {
            Some("watch") | None => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("embed" | "v" | "shorts" | "live") => segments.next().map(str::to_string),
            Some(_) => None,
        }
    };
    let candidate = candidate?;

    let valid = candidate.len() == EMBED_VIDEO_ID_LEN
        && candidate
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    valid.then_some(candidate)
}

/// Generation tag for one attached clip. Events carrying an older token
/// belong to a torn-down clip and are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipToken(pub u64);

impl fmt::Display for ClipToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Unstarted,
    Playing,
    Paused,
    Buffering,
    Cued,
    Ended,
}

/// Native media callbacks, forwarded by the host into the playback controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum MediaEvent {
    /// Metadata loaded (native element) or the embedded player finished its setup.
    Ready { token: ClipToken },
    /// Native element time update.
    PositionChanged { token: ClipToken, position: f64 },
    /// Embedded player state change.
    StateChanged { token: ClipToken, state: PlayerState },
    /// Natural end of media.
    Ended { token: ClipToken },
    /// One tick of the end-of-window poller.
    PollTick { token: ClipToken },
}

impl MediaEvent {
    #[must_use]
    pub fn token(&self) -> ClipToken {
        match self {
            Self::Ready { token }
            | Self::PositionChanged { token, .. }
            | Self::StateChanged { token, .. }
            | Self::Ended { token }
            | Self::PollTick { token } => *token,
        }
    }
}

/// One live media resource. Implementations report completion by delivering
/// [`MediaEvent::Ended`] tagged with the token they were created with.
pub trait MediaHandle: fmt::Debug {
    fn token(&self) -> ClipToken;
    fn load(&mut self, source: &MediaSource, start: f64) -> Result<(), MediaError>;
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    fn seek(&mut self, position: f64);
    fn position(&self) -> f64;
    /// Detaches listeners and releases the underlying element or player.
    fn destroy(&mut self);
}

pub trait MediaBackend {
    fn create(
        &mut self,
        kind: MediaKind,
        token: ClipToken,
    ) -> Result<Box<dyn MediaHandle>, MediaError>;
    fn start_poll(&mut self, token: ClipToken, interval: Duration);
    fn stop_poll(&mut self, token: ClipToken);
}

/// One-way readiness latch for the embedded-player SDK. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct EmbedReadiness(Arc<AtomicBool>);

impl EmbedReadiness {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ready() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Returns true only for the call that performed the transition.
    pub fn mark_ready(&self) -> bool {
        let transitioned = !self.0.swap(true, Ordering::AcqRel);
        if transitioned {
            info!("embedded player sdk ready");
        }
        transitioned
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "call")]
pub enum MediaCall {
    Create { token: ClipToken, kind: MediaKind },
    Load { token: ClipToken, source: String, start: f64 },
    Play { token: ClipToken },
    Pause { token: ClipToken },
    Seek { token: ClipToken, position: f64 },
    Destroy { token: ClipToken },
    StartPoll { token: ClipToken },
    StopPoll { token: ClipToken },
}

#[derive(Debug)]
struct HeadlessClip {
    kind: MediaKind,
    source: Option<String>,
    position: f64,
    duration: f64,
    playing: bool,
}

#[derive(Debug)]
struct HeadlessState {
    clips: BTreeMap<ClipToken, HeadlessClip>,
    pollers: BTreeSet<ClipToken>,
    queued: VecDeque<MediaEvent>,
    calls: Vec<MediaCall>,
    durations: HashMap<String, f64>,
    failing_sources: HashSet<String>,
    default_duration: f64,
}

impl Default for HeadlessState {
    fn default() -> Self {
        Self {
            clips: BTreeMap::new(),
            pollers: BTreeSet::new(),
            queued: VecDeque::new(),
            calls: Vec::new(),
            durations: HashMap::new(),
            failing_sources: HashSet::new(),
            default_duration: 10.0,
        }
    }
}

/// In-process backend with simulated clocks. Used by the CLI simulator and
/// by tests to observe every call the controller makes.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_default_duration(&self, seconds: f64) {
        self.state.lock().default_duration = seconds.max(0.0);
    }

    pub fn set_duration(&self, source_key: impl Into<String>, seconds: f64) {
        self.state
            .lock()
            .durations
            .insert(source_key.into(), seconds.max(0.0));
    }

    pub fn fail_source(&self, source_key: impl Into<String>) {
        self.state.lock().failing_sources.insert(source_key.into());
    }

    #[must_use]
    pub fn live_handles(&self) -> usize {
        self.state.lock().clips.len()
    }

    #[must_use]
    pub fn live_pollers(&self) -> usize {
        self.state.lock().pollers.len()
    }

    #[must_use]
    pub fn is_polling(&self, token: ClipToken) -> bool {
        self.state.lock().pollers.contains(&token)
    }

    #[must_use]
    pub fn calls(&self) -> Vec<MediaCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    #[must_use]
    pub fn position(&self, token: ClipToken) -> Option<f64> {
        self.state.lock().clips.get(&token).map(|clip| clip.position)
    }

    #[must_use]
    pub fn is_playing(&self, token: ClipToken) -> bool {
        self.state
            .lock()
            .clips
            .get(&token)
            .is_some_and(|clip| clip.playing)
    }

    pub fn set_position(&self, token: ClipToken, position: f64) {
        if let Some(clip) = self.state.lock().clips.get_mut(&token) {
            clip.position = position.clamp(0.0, clip.duration);
        }
    }

    /// Drains queued callbacks, then advances every playing clip by `delta`
    /// and returns the events a real host would have delivered.
    pub fn step(&self, delta: Duration) -> Vec<MediaEvent> {
        let mut state = self.state.lock();
        let mut events: Vec<MediaEvent> = state.queued.drain(..).collect();
        let delta = delta.as_secs_f64();
        let pollers = state.pollers.clone();

        for (token, clip) in &mut state.clips {
            if !clip.playing || clip.source.is_none() {
                continue;
            }
            clip.position = (clip.position + delta).min(clip.duration);
            match clip.kind {
                MediaKind::Local => events.push(MediaEvent::PositionChanged {
                    token: *token,
                    position: clip.position,
                }),
                MediaKind::Embedded if pollers.contains(token) => {
                    events.push(MediaEvent::PollTick { token: *token });
                }
                MediaKind::Embedded => {}
            }
            if clip.position >= clip.duration {
                clip.playing = false;
                events.push(match clip.kind {
                    MediaKind::Local => MediaEvent::Ended { token: *token },
                    MediaKind::Embedded => MediaEvent::StateChanged {
                        token: *token,
                        state: PlayerState::Ended,
                    },
                });
            }
        }

        trace!(count = events.len(), "headless step");
        events
    }
}

impl MediaBackend for HeadlessBackend {
    fn create(
        &mut self,
        kind: MediaKind,
        token: ClipToken,
    ) -> Result<Box<dyn MediaHandle>, MediaError> {
        let mut state = self.state.lock();
        state.calls.push(MediaCall::Create { token, kind });
        state.clips.insert(
            token,
            HeadlessClip {
                kind,
                source: None,
                position: 0.0,
                duration: 0.0,
                playing: false,
            },
        );
        debug!(%token, ?kind, "headless handle created");
        Ok(Box::new(HeadlessHandle {
            token,
            kind,
            state: Arc::clone(&self.state),
        }))
    }

    fn start_poll(&mut self, token: ClipToken, _interval: Duration) {
        let mut state = self.state.lock();
        state.calls.push(MediaCall::StartPoll { token });
        state.pollers.insert(token);
    }

    fn stop_poll(&mut self, token: ClipToken) {
        let mut state = self.state.lock();
        state.calls.push(MediaCall::StopPoll { token });
        state.pollers.remove(&token);
    }
}

#[derive(Debug)]
struct HeadlessHandle {
    token: ClipToken,
    kind: MediaKind,
    state: Arc<Mutex<HeadlessState>>,
}

impl MediaHandle for HeadlessHandle {
    fn token(&self) -> ClipToken {
        self.token
    }

    fn load(&mut self, source: &MediaSource, start: f64) -> Result<(), MediaError> {
        let mut state = self.state.lock();
        let key = source.key().to_string();
        state.calls.push(MediaCall::Load {
            token: self.token,
            source: key.clone(),
            start,
        });
        if state.failing_sources.contains(&key) {
            return Err(MediaError::Load {
                source_key: key,
                reason: "source unavailable".to_string(),
            });
        }
        let duration = state
            .durations
            .get(&key)
            .copied()
            .unwrap_or(state.default_duration);
        let token = self.token;
        let clip = state
            .clips
            .get_mut(&token)
            .ok_or_else(|| MediaError::Load {
                source_key: key.clone(),
                reason: "handle already destroyed".to_string(),
            })?;
        clip.source = Some(key);
        clip.duration = duration;
        clip.position = start.clamp(0.0, duration);
        state.queued.push_back(MediaEvent::Ready { token });
        Ok(())
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let mut state = self.state.lock();
        let token = self.token;
        state.calls.push(MediaCall::Play { token });
        let Some(clip) = state.clips.get_mut(&token) else {
            return Ok(());
        };
        clip.playing = clip.source.is_some() && clip.position < clip.duration;
        if self.kind == MediaKind::Embedded && clip.playing {
            state.queued.push_back(MediaEvent::StateChanged {
                token,
                state: PlayerState::Playing,
            });
        }
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.state.lock();
        let token = self.token;
        state.calls.push(MediaCall::Pause { token });
        let Some(clip) = state.clips.get_mut(&token) else {
            return;
        };
        let was_playing = std::mem::replace(&mut clip.playing, false);
        if self.kind == MediaKind::Embedded && was_playing {
            state.queued.push_back(MediaEvent::StateChanged {
                token,
                state: PlayerState::Paused,
            });
        }
    }

    fn seek(&mut self, position: f64) {
        let mut state = self.state.lock();
        let token = self.token;
        state.calls.push(MediaCall::Seek { token, position });
        if let Some(clip) = state.clips.get_mut(&token) {
            clip.position = position.clamp(0.0, clip.duration);
        }
    }

    fn position(&self) -> f64 {
        self.state
            .lock()
            .clips
            .get(&self.token)
            .map_or(0.0, |clip| clip.position)
    }

    fn destroy(&mut self) {
        let mut state = self.state.lock();
        let token = self.token;
        state.calls.push(MediaCall::Destroy { token });
        state.clips.remove(&token);
        state.queued.retain(|event| event.token() != token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_urls_resolve_video_ids() {
        let cases = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=3",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ?start=2",
            "youtube.com/shorts/dQw4w9WgXcQ",
        ];
        for case in cases {
            assert_eq!(
                MediaSource::from_url(case),
                MediaSource::Embedded {
                    video_id: "dQw4w9WgXcQ".to_string()
                },
                "{case}"
            );
        }
    }

    #[test]
    fn embed_url_without_id_is_unplayable() {
        let source = MediaSource::from_url("https://www.youtube.com/watch?v=short");
        assert!(matches!(source, MediaSource::Unplayable { .. }));
        assert_eq!(source.kind(), None);
    }

    #[test]
    fn other_urls_are_local() {
        let source = MediaSource::from_url("clips/ryu/5mp.mp4");
        assert_eq!(source.kind(), Some(MediaKind::Local));
    }

    #[test]
    fn embed_host_names_inside_paths_stay_local() {
        for case in [
            "clips/youtube.com-mirror/x.mp4",
            "https://cdn.example/youtu.be/ryu.mp4",
            "https://notyoutube.com/watch?v=Zr7uRyuDR02",
        ] {
            assert_eq!(
                MediaSource::from_url(case),
                MediaSource::Local {
                    url: case.to_string()
                },
                "{case}"
            );
        }
    }

    #[test]
    fn readiness_latch_is_one_way() {
        let readiness = EmbedReadiness::new();
        let shared = readiness.clone();
        assert!(!shared.is_ready());
        assert!(readiness.mark_ready());
        assert!(!readiness.mark_ready());
        assert!(shared.is_ready());
    }
}
