use std::time::Duration;

use strum::Display;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum LoopMode {
    /// Stop once the queue runs out.
    #[default]
    None,
    /// Replay the current track.
    Track,
    /// Send finished tracks to the back of the queue.
    Queue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerState {
    pub paused: bool,
    pub loop_mode: LoopMode,
    // Last progress observed by the heartbeat
    pub progress: Duration,
    // Consecutive heartbeats that saw the same progress
    pub progress_ticks: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            paused: false,
            loop_mode: LoopMode::None,
            progress: Duration::ZERO,
            progress_ticks: 0,
        }
    }
}
