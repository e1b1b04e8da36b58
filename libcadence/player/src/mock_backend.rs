//! An audio backend that plays nothing.
//!
//! Every load is recorded so callers can inspect what the controller asked for. Progress follows
//! tokio's clock while a track is started, and can be frozen to simulate a stuck source.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::audio::{AudioBackend, AudioHandle, AudioNotifier, PlaybackSource};
use crate::timer::Timer;

#[derive(Clone, Debug)]
pub struct MockSettings {
    /// Report `started` as soon as a track is started. When false, use
    /// [`MockTrack::signal_started`] to deliver it.
    pub signal_started: bool,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            signal_started: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockBackend {
    loaded: Arc<Mutex<Vec<MockTrack>>>,
    settings: MockSettings,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_settings(settings: MockSettings) -> Self {
        Self {
            loaded: Default::default(),
            settings,
        }
    }

    /// Every track loaded so far, oldest first.
    pub fn loaded(&self) -> Vec<MockTrack> {
        lock(&self.loaded).clone()
    }

    pub fn last_loaded(&self) -> Option<MockTrack> {
        lock(&self.loaded).last().cloned()
    }

    pub fn load_count(&self) -> usize {
        lock(&self.loaded).len()
    }
}

impl AudioBackend for MockBackend {
    fn load(&self, source: &PlaybackSource, notifier: AudioNotifier) -> Box<dyn AudioHandle> {
        let track = MockTrack {
            source: source.clone(),
            notifier,
            state: Default::default(),
        };
        lock(&self.loaded).push(track.clone());
        Box::new(MockAudio {
            track,
            signal_started: self.settings.signal_started,
        })
    }
}

#[derive(Debug, Default)]
struct MockAudioState {
    timer: Timer,
    frozen: Option<Duration>,
    starts: usize,
    pauses: usize,
    stops: usize,
    unloads: usize,
    seeks: Vec<Duration>,
}

/// Test-side view of one loaded track.
#[derive(Clone, Debug)]
pub struct MockTrack {
    source: PlaybackSource,
    notifier: AudioNotifier,
    state: Arc<Mutex<MockAudioState>>,
}

impl MockTrack {
    pub fn source(&self) -> &PlaybackSource {
        &self.source
    }

    pub fn url(&self) -> &str {
        &self.source.url
    }

    pub fn start_count(&self) -> usize {
        lock(&self.state).starts
    }

    pub fn pause_count(&self) -> usize {
        lock(&self.state).pauses
    }

    pub fn stop_count(&self) -> usize {
        lock(&self.state).stops
    }

    pub fn unload_count(&self) -> usize {
        lock(&self.state).unloads
    }

    pub fn seeks(&self) -> Vec<Duration> {
        lock(&self.state).seeks.clone()
    }

    pub fn progress(&self) -> Duration {
        let state = lock(&self.state);
        let progress = state.frozen.unwrap_or_else(|| state.timer.elapsed());
        if self.source.duration.is_zero() {
            progress
        } else {
            progress.min(self.source.duration)
        }
    }

    /// Pins the reported progress at its current value.
    pub fn freeze_progress(&self) {
        let progress = self.progress();
        lock(&self.state).frozen = Some(progress);
    }

    pub fn unfreeze_progress(&self) {
        lock(&self.state).frozen = None;
    }

    pub fn signal_started(&self) {
        self.notifier.started();
    }

    /// Reports that the track played to the end.
    pub fn finish(&self) {
        self.notifier.finished();
    }
}

struct MockAudio {
    track: MockTrack,
    signal_started: bool,
}

impl AudioHandle for MockAudio {
    fn start(&mut self) {
        {
            let mut state = lock(&self.track.state);
            state.starts += 1;
            state.timer.resume();
        }
        if self.signal_started {
            self.track.signal_started();
        }
    }

    fn pause(&mut self) {
        let mut state = lock(&self.track.state);
        state.pauses += 1;
        state.timer.pause();
    }

    fn stop(&mut self) {
        let mut state = lock(&self.track.state);
        state.stops += 1;
        state.timer.stop();
    }

    fn seek(&mut self, position: Duration) {
        let mut state = lock(&self.track.state);
        state.seeks.push(position);
        state.timer.set_time(position);
        if state.starts == 0 {
            // Hold the position until the track is started
            state.timer.pause();
        }
        if state.frozen.is_some() {
            state.frozen = Some(position);
        }
    }

    fn unload(&mut self) {
        lock(&self.track.state).unloads += 1;
    }

    fn progress(&self) -> Duration {
        self.track.progress()
    }

    fn duration(&self) -> Duration {
        self.track.source.duration
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
