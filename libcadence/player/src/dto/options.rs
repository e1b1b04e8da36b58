#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayOptions {
    /// Replace the current track. When false and something is playing, the track is queued instead.
    pub force: bool,
    /// Push the replaced track onto the history.
    pub add_to_history: bool,
    /// Start the audio right away. When false the track is loaded paused.
    pub start_playing: bool,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            force: true,
            add_to_history: true,
            start_playing: true,
        }
    }
}

impl PlayOptions {
    pub fn enqueue() -> Self {
        Self {
            force: false,
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StopOptions {
    /// Publish a `Stop` event.
    pub emit: bool,
    /// Also empty the queue and drop back to idle.
    pub clear: bool,
}

impl Default for StopOptions {
    fn default() -> Self {
        Self {
            emit: true,
            clear: false,
        }
    }
}
