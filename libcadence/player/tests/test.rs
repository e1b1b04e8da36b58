use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::*;
use async_trait::async_trait;
use futures::Future;
use libcadence_player::cadence_player::{
    AlternateResolver, CadencePlayer, LoopMode, PlayerEvent, Settings, TrackData,
};
use libcadence_player::mock_backend::{MockBackend, MockSettings};
use pretty_assertions::assert_eq;
use rstest::*;
use tokio::sync::{Notify, broadcast};
use tokio::time::{Instant, error::Elapsed, sleep, timeout};

#[async_trait]
trait TimedFut<T> {
    async fn timed_recv(&mut self) -> T;
}

#[async_trait]
impl TimedFut<Option<PlayerEvent>> for broadcast::Receiver<PlayerEvent> {
    /// Next event other than a heartbeat update.
    async fn timed_recv(&mut self) -> Option<PlayerEvent> {
        loop {
            match timed_await(self.recv()).await.ok()? {
                Ok(PlayerEvent::Update(_)) => continue,
                Ok(event) => return Some(event),
                Err(_) => return None,
            }
        }
    }
}

#[ctor::ctor]
fn init() {
    tracing_subscriber::fmt()
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_test_writer()
        .init();
}

async fn timed_await<T>(future: T) -> Result<T::Output, Elapsed>
where
    T: Future,
{
    timeout(Duration::from_secs(60), future).await
}

fn track(id: &str) -> TrackData {
    TrackData::new(id, format!("https://media.test/{id}.mp3"))
        .with_title(format!("Title {id}"))
        .with_duration(Duration::from_secs(300))
}

fn settings() -> Settings {
    Settings {
        event_buffer: 1024,
        ..Default::default()
    }
}

fn init_player() -> (CadencePlayer, broadcast::Receiver<PlayerEvent>, MockBackend) {
    let backend = MockBackend::new();
    let player = CadencePlayer::new(backend.clone(), settings());
    let receiver = player.subscribe();
    (player, receiver, backend)
}

struct GatedResolver {
    gates: HashMap<String, Arc<Notify>>,
}

#[async_trait]
impl AlternateResolver for GatedResolver {
    async fn resolve(&self, track: &TrackData) -> eyre::Result<Option<TrackData>> {
        if let Some(gate) = self.gates.get(&track.id) {
            gate.notified().await;
        }
        Ok(None)
    }
}

#[tokio::test(start_paused = true)]
async fn test_basic() {
    let (player, mut receiver, backend) = init_player();
    player.play(Some(track("a"))).await.unwrap();

    assert_matches!(
        receiver.timed_recv().await,
        Some(PlayerEvent::Play(track)) if track.id() == "a"
    );
    assert_eq!(1, backend.load_count());
    assert!(!player.is_paused().await.unwrap());
    assert_eq!(Duration::from_secs(300), player.get_duration().await.unwrap());
    player.join().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_queries() {
    let (player, _receiver, _backend) = init_player();
    player.add(track("a")).await.unwrap();
    player.add(track("b")).await.unwrap();
    player.set_repeat_mode(LoopMode::Queue).await.unwrap();

    let queue: Vec<_> = player
        .get_queue()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(vec!["a", "b"], queue);
    assert_eq!(LoopMode::Queue, player.get_repeat_mode().await.unwrap());
    assert!(player.get_history().await.unwrap().is_empty());
    assert!(player.get_current_track().await.unwrap().is_none());
    assert_eq!(Duration::ZERO, player.get_progress().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_progress_follows_clock() {
    let (player, mut receiver, _backend) = init_player();
    player.play(Some(track("a"))).await.unwrap();
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Play(_)));

    sleep(Duration::from_secs(5)).await;
    let progress = player.get_progress().await.unwrap();
    assert!(progress >= Duration::from_secs(5), "{progress:?}");
    assert!(progress < Duration::from_millis(5500), "{progress:?}");
}

#[tokio::test(start_paused = true)]
async fn test_stalled_track_is_skipped() {
    let (player, mut receiver, backend) = init_player();
    player.add(track("b")).await.unwrap();
    player.play(Some(track("a"))).await.unwrap();
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Play(_)));

    let start = Instant::now();
    backend.last_loaded().unwrap().freeze_progress();

    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Stop));
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Destroy));
    assert_matches!(
        receiver.timed_recv().await,
        Some(PlayerEvent::Play(track)) if track.id() == "b"
    );
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(9), "{elapsed:?}");
    assert!(elapsed <= Duration::from_secs(11), "{elapsed:?}");

    let status = player.get_current_status().await.unwrap();
    assert_eq!(0, status.state.progress_ticks);
    assert_eq!(vec![track("a")], status.history);
    assert_eq!(2, backend.load_count());
}

#[tokio::test(start_paused = true)]
async fn test_stall_at_end_of_queue_stops() {
    let (player, mut receiver, backend) = init_player();
    player.play(Some(track("a"))).await.unwrap();
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Play(_)));
    let mock = backend.last_loaded().unwrap();
    mock.freeze_progress();

    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Stop));
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Destroy));
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Stop));
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Destroy));

    assert!(player.get_current_track().await.unwrap().is_none());
    assert!(player.is_paused().await.unwrap());
    assert_eq!(1, mock.unload_count());
}

#[tokio::test(start_paused = true)]
async fn test_paused_track_is_not_skipped() {
    let (player, mut receiver, backend) = init_player();
    player.add(track("b")).await.unwrap();
    player.play(Some(track("a"))).await.unwrap();
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Play(_)));
    player.pause().await.unwrap();
    backend.last_loaded().unwrap().freeze_progress();

    sleep(Duration::from_secs(30)).await;

    let current = player.get_current_track().await.unwrap().unwrap();
    assert_eq!("a", current.id());
    assert_eq!(1, backend.load_count());
}

#[rstest]
#[case("x", "y")]
#[case("y", "x")]
#[tokio::test(start_paused = true)]
async fn test_latest_play_wins(#[case] first_resolved: &str, #[case] second_resolved: &str) {
    let gates: HashMap<_, _> = ["x", "y"]
        .into_iter()
        .map(|id| (id.to_owned(), Arc::new(Notify::new())))
        .collect();
    let backend = MockBackend::new();
    let player = CadencePlayer::new_with_resolver(
        backend.clone(),
        GatedResolver {
            gates: gates.clone(),
        },
        settings(),
    );
    let mut receiver = player.subscribe();

    player.play(Some(track("x"))).await.unwrap();
    player.play(Some(track("y"))).await.unwrap();
    gates[first_resolved].notify_one();
    sleep(Duration::from_millis(100)).await;
    gates[second_resolved].notify_one();

    assert_matches!(
        receiver.timed_recv().await,
        Some(PlayerEvent::Play(track)) if track.id() == "y"
    );
    sleep(Duration::from_secs(1)).await;

    let current = player.get_current_track().await.unwrap().unwrap();
    assert_eq!("y", current.id());
    let loaded: Vec<_> = backend
        .loaded()
        .iter()
        .map(|m| m.url().to_owned())
        .collect();
    assert_eq!(vec!["https://media.test/y.mp3"], loaded);
}

#[tokio::test(start_paused = true)]
async fn test_finished_track_advances() {
    let (player, mut receiver, backend) = init_player();
    player.add(track("b")).await.unwrap();
    player.play(Some(track("a"))).await.unwrap();
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Play(_)));

    backend.last_loaded().unwrap().finish();

    assert_matches!(
        receiver.timed_recv().await,
        Some(PlayerEvent::End(track)) if track.id() == "a"
    );
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Stop));
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Destroy));
    assert_matches!(
        receiver.timed_recv().await,
        Some(PlayerEvent::Play(track)) if track.id() == "b"
    );
    assert!(!player.is_paused().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_stale_instance_released_on_start() {
    let backend = MockBackend::new_with_settings(MockSettings {
        signal_started: false,
    });
    let player = CadencePlayer::new(backend.clone(), settings());
    let mut receiver = player.subscribe();

    player.play(Some(track("a"))).await.unwrap();
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Play(_)));
    let duplicate = player
        .get_current_track()
        .await
        .unwrap()
        .unwrap()
        .duplicate();
    player.play(Some(track("b"))).await.unwrap();
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Destroy));
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Play(_)));

    duplicate.start();
    backend.loaded()[1].signal_started();
    sleep(Duration::from_millis(100)).await;

    assert!(duplicate.is_released());
    assert_eq!(1, backend.loaded()[1].unload_count());
}

#[tokio::test(start_paused = true)]
async fn test_join_stops_playback() {
    let (player, mut receiver, backend) = init_player();
    player.add(track("b")).await.unwrap();
    player.play(Some(track("a"))).await.unwrap();
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Play(_)));

    player.join().await.unwrap();

    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Stop));
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Destroy));
    assert_eq!(1, backend.last_loaded().unwrap().unload_count());
}

#[tokio::test(start_paused = true)]
async fn test_drop_releases_current_track() {
    let (player, mut receiver, backend) = init_player();
    player.play(Some(track("a"))).await.unwrap();
    assert_matches!(receiver.timed_recv().await, Some(PlayerEvent::Play(_)));

    drop(player);
    sleep(Duration::from_millis(100)).await;

    assert_eq!(1, backend.last_loaded().unwrap().unload_count());
}
