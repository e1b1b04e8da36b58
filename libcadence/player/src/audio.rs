use std::fmt::Debug;
use std::sync::Weak;
use std::time::Duration;

use tap::TapFallible;
use tracing::{debug, error};

use crate::dto::command::Command;
use crate::dto::player_response::PlayerResponse;
use crate::dto::track_data::TrackData;
use crate::track::{TrackHandle, TrackInner};
use crate::two_way_channel::TwoWaySender;

/// How the backend should fetch the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportMode {
    /// Stream the source as it arrives.
    Streaming,
    /// Download the whole source before decoding.
    Progressive,
}

impl TransportMode {
    /// Sources without an alternate, and alternates that point at a stream, are streamed.
    pub fn for_alternate(alternate: Option<&TrackData>) -> Self {
        match alternate {
            Some(alternate) if !alternate.url.contains("stream") => Self::Progressive,
            _ => Self::Streaming,
        }
    }
}

/// Everything a backend needs to load one track.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackSource {
    pub url: String,
    pub transport: TransportMode,
    pub volume: f32,
    pub format_hint: Option<String>,
    pub duration: Duration,
    pub autoplay: bool,
}

/// One loaded media source.
pub trait AudioHandle: Send {
    fn start(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, position: Duration);
    fn unload(&mut self);
    fn progress(&self) -> Duration;
    fn duration(&self) -> Duration;
}

pub trait AudioBackend: Send + Sync {
    /// Loads a source without starting it. The backend reports playback milestones through
    /// `notifier`.
    fn load(&self, source: &PlaybackSource, notifier: AudioNotifier) -> Box<dyn AudioHandle>;
}

/// Signals from the backend back to the controller.
///
/// Safe to call from any thread, and after the player has shut down.
#[derive(Clone)]
pub struct AudioNotifier {
    track: Weak<TrackInner>,
    cmd_sender: TwoWaySender<Command, PlayerResponse>,
}

impl Debug for AudioNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioNotifier").finish_non_exhaustive()
    }
}

impl AudioNotifier {
    pub(crate) fn new(
        track: Weak<TrackInner>,
        cmd_sender: TwoWaySender<Command, PlayerResponse>,
    ) -> Self {
        Self { track, cmd_sender }
    }

    /// The source started producing audio.
    pub fn started(&self) {
        if let Some(track) = self.track() {
            self.cmd_sender
                .send(Command::Started(track))
                .tap_err(|e| error!("Error sending started signal: {e:?}"))
                .ok();
        }
    }

    /// The source reached its end.
    pub fn finished(&self) {
        if let Some(track) = self.track() {
            self.cmd_sender
                .send(Command::Finished(track))
                .tap_err(|e| error!("Error sending finished signal: {e:?}"))
                .ok();
        }
    }

    fn track(&self) -> Option<TrackHandle> {
        let track = self.track.upgrade().map(TrackHandle::from_inner);
        if track.is_none() {
            debug!("Ignoring backend signal for a dropped track");
        }
        track
    }
}
