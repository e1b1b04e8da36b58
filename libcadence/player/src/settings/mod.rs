use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Settings {
    /// How often the controller publishes `Update` and checks for stalled playback.
    pub heartbeat_interval: Duration,
    /// Number of heartbeats with unchanged progress before the controller skips the track.
    pub stall_ticks: u32,
    /// Output level every track is loaded with.
    pub volume: f32,
    /// Container hint passed through to the audio backend.
    pub format_hint: Option<String>,
    pub event_buffer: usize,
}

impl Default for Settings {
    fn default() -> Self {
        // 20 ticks at 500ms gives a track roughly 10 seconds to make progress
        Self {
            heartbeat_interval: Duration::from_millis(500),
            stall_ticks: 20,
            volume: 0.3,
            format_hint: Some("mp3".to_owned()),
            event_buffer: 32,
        }
    }
}
