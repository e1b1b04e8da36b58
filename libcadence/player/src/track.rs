use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use derivative::Derivative;
use tracing::{debug, info};

use crate::audio::{AudioBackend, AudioHandle, AudioNotifier, PlaybackSource, TransportMode};
use crate::dto::command::Command;
use crate::dto::player_response::PlayerResponse;
use crate::dto::track_data::TrackData;
use crate::settings::Settings;
use crate::two_way_channel::TwoWaySender;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// A track loaded into the audio backend.
///
/// Cloning the handle shares the same backend resource. Use [`TrackHandle::duplicate`] for an
/// independent playback instance of the same track.
#[derive(Clone, Debug)]
pub struct TrackHandle {
    inner: Arc<TrackInner>,
}

#[derive(Derivative)]
#[derivative(Debug)]
pub(crate) struct TrackInner {
    instance: u64,
    data: TrackData,
    play_data: Option<TrackData>,
    source: PlaybackSource,
    released: AtomicBool,
    #[derivative(Debug = "ignore")]
    audio: Mutex<Box<dyn AudioHandle>>,
    #[derivative(Debug = "ignore")]
    backend: Arc<dyn AudioBackend>,
    #[derivative(Debug = "ignore")]
    cmd_sender: TwoWaySender<Command, PlayerResponse>,
}

impl TrackHandle {
    pub(crate) fn load(
        data: TrackData,
        play_data: Option<TrackData>,
        backend: Arc<dyn AudioBackend>,
        cmd_sender: TwoWaySender<Command, PlayerResponse>,
        settings: &Settings,
    ) -> Self {
        let source = PlaybackSource {
            url: play_data.as_ref().unwrap_or(&data).url.clone(),
            transport: TransportMode::for_alternate(play_data.as_ref()),
            volume: settings.volume,
            format_hint: settings.format_hint.clone(),
            duration: data.duration,
            autoplay: false,
        };
        Self::load_source(data, play_data, source, backend, cmd_sender)
    }

    fn load_source(
        data: TrackData,
        play_data: Option<TrackData>,
        source: PlaybackSource,
        backend: Arc<dyn AudioBackend>,
        cmd_sender: TwoWaySender<Command, PlayerResponse>,
    ) -> Self {
        info!("Loading {} from {} ({:?})", data.id, source.url, source.transport);
        let inner = Arc::new_cyclic(|weak| {
            let notifier = AudioNotifier::new(weak.clone(), cmd_sender.clone());
            let audio = backend.load(&source, notifier);
            TrackInner {
                instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
                data,
                play_data,
                source,
                released: AtomicBool::new(false),
                audio: Mutex::new(audio),
                backend,
                cmd_sender,
            }
        });
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Arc<TrackInner>) -> Self {
        Self { inner }
    }

    /// Loads the same source again as an independent instance.
    pub fn duplicate(&self) -> Self {
        Self::load_source(
            self.inner.data.clone(),
            self.inner.play_data.clone(),
            self.inner.source.clone(),
            self.inner.backend.clone(),
            self.inner.cmd_sender.clone(),
        )
    }

    pub fn data(&self) -> &TrackData {
        &self.inner.data
    }

    /// The alternate source used for playback, if one was resolved.
    pub fn play_data(&self) -> Option<&TrackData> {
        self.inner.play_data.as_ref()
    }

    pub fn source(&self) -> &PlaybackSource {
        &self.inner.source
    }

    pub fn id(&self) -> &str {
        &self.inner.data.id
    }

    pub fn title(&self) -> &str {
        &self.inner.data.title
    }

    pub fn artist(&self) -> &str {
        &self.inner.data.artist
    }

    pub fn icon(&self) -> &str {
        &self.inner.data.icon
    }

    pub fn url(&self) -> &str {
        &self.inner.data.url
    }

    pub fn progress(&self) -> Duration {
        self.audio().progress()
    }

    pub fn duration(&self) -> Duration {
        self.audio().duration()
    }

    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::Acquire)
    }

    /// Whether both handles refer to the same backend instance.
    pub fn same_instance(&self, other: &TrackHandle) -> bool {
        self.inner.instance == other.inner.instance
    }

    pub fn start(&self) {
        if self.is_released() {
            debug!("Not starting released track {}", self.id());
            return;
        }
        self.audio().start();
    }

    pub fn pause(&self) {
        if !self.is_released() {
            self.audio().pause();
        }
    }

    pub fn seek(&self, position: Duration) {
        if !self.is_released() {
            self.audio().seek(position);
        }
    }

    /// Stops and unloads the backend resource. Only the first call has any effect.
    pub fn release(&self) {
        if self.inner.released.swap(true, Ordering::AcqRel) {
            debug!("Track {} already released", self.id());
            return;
        }
        info!("Releasing track {}", self.id());
        let mut audio = self.audio();
        audio.stop();
        audio.unload();
    }

    fn audio(&self) -> MutexGuard<'_, Box<dyn AudioHandle>> {
        // A panic inside a backend call leaves nothing half-updated on our side
        self.inner
            .audio
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
