use async_trait::async_trait;
use eyre::Result;
use tap::TapFallible;
use tracing::{info, warn};

use crate::dto::track_data::TrackData;

/// Supplies a substitute playback source for a track before it starts.
///
/// The returned track's `url` is what the backend loads. The original track stays the identity
/// used for comparisons and display.
#[async_trait]
pub trait AlternateResolver: Send + Sync {
    async fn resolve(&self, track: &TrackData) -> Result<Option<TrackData>>;
}

/// Always plays the track's own url.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAlternate;

#[async_trait]
impl AlternateResolver for NoAlternate {
    async fn resolve(&self, _track: &TrackData) -> Result<Option<TrackData>> {
        Ok(None)
    }
}

/// Failed lookups fall back to the original url.
pub(crate) async fn resolve_alternate(
    resolver: &dyn AlternateResolver,
    track: &TrackData,
) -> Option<TrackData> {
    let alternate = resolver
        .resolve(track)
        .await
        .tap_err(|e| warn!("Error resolving alternate for {}: {e:?}", track.id))
        .ok()
        .flatten();
    if let Some(alternate) = &alternate {
        info!("Using alternate {} for {}", alternate.url, track.id);
    }
    alternate
}
