use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::thread_rng;
use tap::TapFallible;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::audio::AudioBackend;
use crate::dto::command::{Command, Resolution};
use crate::dto::options::{PlayOptions, StopOptions};
use crate::dto::player_event::PlayerEvent;
use crate::dto::player_response::PlayerResponse;
use crate::dto::player_state::{LoopMode, PlayerState};
use crate::dto::player_status::PlayerStatus;
use crate::dto::track_data::TrackData;
use crate::resolver::{AlternateResolver, resolve_alternate};
use crate::settings::Settings;
use crate::track::TrackHandle;
use crate::two_way_channel::TwoWaySender;

/// Queue, history and the currently loaded track.
///
/// Only ever touched from the command loop, so none of the state needs locking. Alternate
/// lookups run on their own tasks and report back with [`Command::Resolved`]; a lookup that
/// was overtaken by a newer `play` call is dropped when it arrives.
pub(crate) struct Player {
    event_tx: broadcast::Sender<PlayerEvent>,
    cmd_sender: TwoWaySender<Command, PlayerResponse>,
    backend: Arc<dyn AudioBackend>,
    resolver: Arc<dyn AlternateResolver>,
    settings: Settings,
    state: PlayerState,
    current: Option<TrackHandle>,
    queue: VecDeque<TrackData>,
    history: Vec<TrackData>,
    // Bumped by every request that should win over lookups still in flight
    generation: u64,
}

impl Player {
    pub(crate) fn new(
        event_tx: broadcast::Sender<PlayerEvent>,
        cmd_sender: TwoWaySender<Command, PlayerResponse>,
        backend: Arc<dyn AudioBackend>,
        resolver: Arc<dyn AlternateResolver>,
        settings: Settings,
    ) -> Self {
        Self {
            event_tx,
            cmd_sender,
            backend,
            resolver,
            settings,
            state: PlayerState::default(),
            current: None,
            queue: VecDeque::new(),
            history: vec![],
            generation: 0,
        }
    }

    fn emit(&self, event: PlayerEvent) {
        debug!("Publishing {event}");
        // Nobody listening is fine
        self.event_tx.send(event).unwrap_or_default();
    }

    pub(crate) fn add(&mut self, track: TrackData) {
        info!("Adding {} to the queue", track.id);
        self.queue.push_back(track);
    }

    pub(crate) fn set_repeat_mode(&mut self, mode: LoopMode) {
        info!("Setting repeat mode to {mode}");
        self.state.loop_mode = mode;
    }

    pub(crate) fn shuffle(&mut self) {
        self.queue.make_contiguous().shuffle(&mut thread_rng());
        self.emit(PlayerEvent::Shuffle);
    }

    pub(crate) fn play(&mut self, track: Option<TrackData>, options: PlayOptions) {
        let track = match track.or_else(|| self.queue.pop_front()) {
            Some(track) => track,
            None => {
                info!("Nothing to play, queue is empty");
                return;
            }
        };

        if self.current.is_some() && !options.force {
            info!("Track already playing, queueing {}", track.id);
            self.queue.push_back(track.clone());
            self.emit(PlayerEvent::Queue(track));
            return;
        }

        let replaced = self
            .current
            .as_ref()
            .filter(|_| options.start_playing)
            .map(|current| current.data().clone());
        if let Some(replaced) = replaced {
            if options.add_to_history && replaced.id != track.id {
                self.history.push(replaced);
            }
            self.stop(StopOptions {
                emit: false,
                clear: false,
            });
        }

        self.generation += 1;
        let resolution = Resolution {
            generation: self.generation,
            track,
            alternate: None,
            start_playing: options.start_playing,
        };
        let resolver = self.resolver.clone();
        let cmd_sender = self.cmd_sender.clone();
        tokio::spawn(async move {
            let alternate = resolve_alternate(resolver.as_ref(), &resolution.track).await;
            cmd_sender
                .send_async(Command::Resolved(Resolution {
                    alternate,
                    ..resolution
                }))
                .await
                .tap_err(|e| error!("Error sending resolved track: {e:?}"))
                .ok();
        });
    }

    pub(crate) fn on_resolved(&mut self, resolution: Resolution) {
        if resolution.generation != self.generation {
            info!(
                "Discarding {}, a newer request replaced it while resolving",
                resolution.track.id
            );
            return;
        }

        let track = TrackHandle::load(
            resolution.track,
            resolution.alternate,
            self.backend.clone(),
            self.cmd_sender.clone(),
            &self.settings,
        );
        if let Some(previous) = self.current.replace(track.clone()) {
            self.emit(PlayerEvent::Destroy);
            previous.release();
        }
        if resolution.start_playing {
            track.start();
        }
        info!("Now playing {}", track.id());
        self.emit(PlayerEvent::Play(track));

        self.state.paused = !resolution.start_playing;
        self.state.progress_ticks = 0;
    }

    pub(crate) fn on_started(&mut self, track: TrackHandle) {
        let designated = self
            .current
            .as_ref()
            .is_some_and(|current| current.id() == track.id());
        if designated {
            debug!("Track {} started", track.id());
        } else {
            info!("Track {} started but is no longer current", track.id());
            track.release();
        }
    }

    pub(crate) fn on_finished(&mut self, track: TrackHandle) {
        let active = self
            .current
            .as_ref()
            .is_some_and(|current| current.same_instance(&track));
        if !active {
            debug!("Ignoring end of inactive track {}", track.id());
            return;
        }

        info!("Track {} finished", track.id());
        self.pause();
        self.emit(PlayerEvent::End(track));
        self.next();
    }

    pub(crate) fn next(&mut self) {
        let previous = self.current.as_ref().map(|current| current.data().clone());
        if previous.is_some() {
            self.stop(StopOptions::default());
        }

        if let (LoopMode::Track, Some(previous)) = (self.state.loop_mode, &previous) {
            info!("Repeating {}", previous.id);
            self.play(Some(previous.clone()), PlayOptions::default());
            return;
        }

        match self.queue.pop_front() {
            Some(next) => {
                if let Some(previous) = previous {
                    if self.state.loop_mode == LoopMode::Queue {
                        self.queue.push_back(previous.clone());
                        self.emit(PlayerEvent::Queue(previous.clone()));
                    }
                    if previous.id != next.id {
                        self.history.push(previous);
                    }
                }
                self.play(Some(next), PlayOptions::default());
            }
            None => {
                info!("Reached the end of the queue");
                self.stop(StopOptions {
                    emit: true,
                    clear: true,
                });
            }
        }
    }

    pub(crate) fn back(&mut self) {
        let Some(previous) = self.history.pop() else {
            info!("History is empty, stopping");
            self.stop(StopOptions::default());
            return;
        };

        if let Some(current) = self.current.as_ref().map(|current| current.data().clone()) {
            self.queue.push_front(current.clone());
            self.emit(PlayerEvent::Queue(current));
        }
        self.play(
            Some(previous),
            PlayOptions {
                force: true,
                add_to_history: false,
                start_playing: true,
            },
        );
    }

    pub(crate) fn stop(&mut self, options: StopOptions) {
        info!(
            "Stopping playback. emit: {}, clear: {}",
            options.emit, options.clear
        );
        if options.clear {
            self.queue.clear();
            self.state.paused = true;
            self.state.progress_ticks = 0;
            self.generation += 1;
        }
        if options.emit {
            self.emit(PlayerEvent::Stop);
        }

        self.emit(PlayerEvent::Destroy);
        if let Some(current) = self.current.take() {
            current.release();
        }
    }

    pub(crate) fn pause(&mut self) {
        if self.state.paused {
            if let Some(current) = &self.current {
                current.start();
            }
            self.state.paused = false;
        } else {
            if let Some(current) = &self.current {
                current.pause();
            }
            self.state.paused = true;
        }
        self.state.progress_ticks = 0;

        self.update();
    }

    pub(crate) fn seek(&mut self, position: Duration) {
        match &self.current {
            Some(current) => current.seek(position),
            None => debug!("Nothing to seek"),
        }
        self.emit(PlayerEvent::Seek(position));
    }

    pub(crate) fn reset(&mut self) {
        info!("Resetting player");
        self.state = PlayerState {
            paused: true,
            ..Default::default()
        };
        self.queue.clear();
        self.history.clear();
        self.generation += 1;
        if self.current.is_some() {
            self.stop(StopOptions::default());
        }
    }

    /// Heartbeat. Publishes the current state and skips tracks that stopped making progress.
    pub(crate) fn update(&mut self) {
        let progress = self.progress();
        self.emit(PlayerEvent::Update(PlayerState {
            progress,
            ..self.state.clone()
        }));

        let Some(current) = &self.current else {
            return;
        };
        if self.state.paused {
            return;
        }

        if progress == self.state.progress {
            self.state.progress_ticks += 1;
        } else {
            self.state.progress = progress;
            self.state.progress_ticks = 0;
        }

        if self.state.progress_ticks >= self.settings.stall_ticks {
            warn!(
                "Track {} has been stuck at {progress:?} for {} heartbeats, skipping it",
                current.id(),
                self.state.progress_ticks
            );
            self.next();
            self.state.progress_ticks = 0;
        }
    }

    pub(crate) fn progress(&self) -> Duration {
        self.current
            .as_ref()
            .map(TrackHandle::progress)
            .unwrap_or_default()
    }

    pub(crate) fn duration(&self) -> Duration {
        self.current
            .as_ref()
            .map(TrackHandle::duration)
            .unwrap_or_default()
    }

    pub(crate) fn get_current_status(&self) -> PlayerStatus {
        PlayerStatus {
            state: self.state.clone(),
            current: self.current.clone(),
            queue: self.queue.iter().cloned().collect(),
            history: self.history.clone(),
            progress: self.progress(),
            duration: self.duration(),
        }
    }

    pub(crate) fn shutdown(&mut self) {
        info!("Shutting down player");
        self.generation += 1;
        if let Some(current) = self.current.take() {
            current.release();
        }
    }
}
