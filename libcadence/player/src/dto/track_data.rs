use std::hash::{Hash, Hasher};
use std::time::Duration;

/// Identity and display information for a playable track.
///
/// Two values describe the same track when their `id`s match, regardless of the other fields.
#[derive(Debug, Clone, Default)]
pub struct TrackData {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub icon: String,
    pub url: String,
    pub duration: Duration,
}

impl TrackData {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

impl PartialEq for TrackData {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TrackData {}

impl Hash for TrackData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
