use std::time::Duration;

use strum::Display;

use super::player_state::PlayerState;
use super::track_data::TrackData;
use crate::track::TrackHandle;

#[derive(Clone, Debug, Display)]
pub enum PlayerEvent {
    /// Heartbeat snapshot. `progress` holds the live position of the current track.
    Update(PlayerState),
    Play(TrackHandle),
    Stop,
    Seek(Duration),
    Queue(TrackData),
    Shuffle,
    /// The active track is being released.
    Destroy,
    End(TrackHandle),
}
