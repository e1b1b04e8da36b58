use std::time::Duration;

use super::options::{PlayOptions, StopOptions};
use super::player_state::LoopMode;
use super::track_data::TrackData;
use crate::track::TrackHandle;

#[derive(Clone, Debug)]
pub(crate) enum Command {
    Add(TrackData),
    SetRepeatMode(LoopMode),
    Shuffle,
    Play(Option<TrackData>, PlayOptions),
    Next,
    Back,
    Stop(StopOptions),
    Pause,
    Seek(Duration),
    Reset,
    Update,
    GetCurrentStatus,
    Resolved(Resolution),
    Started(TrackHandle),
    Finished(TrackHandle),
    Shutdown,
}

/// Outcome of an alternate lookup, fed back into the command loop.
#[derive(Clone, Debug)]
pub(crate) struct Resolution {
    pub(crate) generation: u64,
    pub(crate) track: TrackData,
    pub(crate) alternate: Option<TrackData>,
    pub(crate) start_playing: bool,
}
