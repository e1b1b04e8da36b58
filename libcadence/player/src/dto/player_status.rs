use std::time::Duration;

use super::player_state::PlayerState;
use super::track_data::TrackData;
use crate::track::TrackHandle;

#[derive(Clone, Debug)]
pub struct PlayerStatus {
    pub state: PlayerState,
    pub current: Option<TrackHandle>,
    pub queue: Vec<TrackData>,
    pub history: Vec<TrackData>,
    pub progress: Duration,
    pub duration: Duration,
}
