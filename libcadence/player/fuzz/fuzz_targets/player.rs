#![no_main]
use std::sync::LazyLock;
use std::time::Duration;

use libcadence_player::cadence_player::{
    CadencePlayer, LoopMode, PlayOptions, Settings, StopOptions, TrackData,
};
use libcadence_player::mock_backend::MockBackend;
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};
use tokio::runtime::Runtime;

#[derive(Arbitrary, Debug)]
enum Input {
    Add(u8),
    Play(Option<u8>),
    PlayPaused(u8),
    Enqueue(u8),
    SetRepeatMode(u8),
    Shuffle,
    Pause,
    Stop { emit: bool, clear: bool },
    Next,
    Back,
    Seek(u16),
    Reset,
    Update,
    Finish,
    Status,
}

static RUNTIME: LazyLock<Runtime> = LazyLock::new(|| Runtime::new().unwrap());

static BACKEND: LazyLock<MockBackend> = LazyLock::new(MockBackend::new);

static PLAYER: LazyLock<CadencePlayer> = LazyLock::new(|| {
    let _guard = RUNTIME.enter();
    CadencePlayer::new(
        BACKEND.clone(),
        Settings {
            heartbeat_interval: Duration::from_millis(10),
            ..Default::default()
        },
    )
});

fn track(id: u8) -> TrackData {
    // A small id space so tracks repeat across the queue and history
    let id = id % 8;
    TrackData::new(id.to_string(), format!("https://media.test/{id}.mp3"))
        .with_duration(Duration::from_secs(60))
}

#[ctor::ctor]
fn init() {
    tracing_subscriber::fmt()
        .pretty()
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_test_writer()
        .init();
}

fuzz_target!(|input: Input| {
    RUNTIME.block_on(async {
        match input {
            Input::Add(id) => {
                PLAYER.add(track(id)).await.unwrap();
            }
            Input::Play(id) => {
                PLAYER.play(id.map(track)).await.unwrap();
            }
            Input::PlayPaused(id) => {
                PLAYER
                    .play_with(
                        Some(track(id)),
                        PlayOptions {
                            start_playing: false,
                            ..Default::default()
                        },
                    )
                    .await
                    .unwrap();
            }
            Input::Enqueue(id) => {
                PLAYER
                    .play_with(Some(track(id)), PlayOptions::enqueue())
                    .await
                    .unwrap();
            }
            Input::SetRepeatMode(mode) => {
                let mode = match mode % 3 {
                    0 => LoopMode::None,
                    1 => LoopMode::Track,
                    _ => LoopMode::Queue,
                };
                PLAYER.set_repeat_mode(mode).await.unwrap();
            }
            Input::Shuffle => {
                PLAYER.shuffle().await.unwrap();
            }
            Input::Pause => {
                PLAYER.pause().await.unwrap();
            }
            Input::Stop { emit, clear } => {
                PLAYER.stop_with(StopOptions { emit, clear }).await.unwrap();
            }
            Input::Next => {
                PLAYER.next().await.unwrap();
            }
            Input::Back => {
                PLAYER.back().await.unwrap();
            }
            Input::Seek(seek_time) => {
                PLAYER
                    .seek(Duration::from_millis(seek_time as u64))
                    .await
                    .unwrap();
            }
            Input::Reset => {
                PLAYER.reset().await.unwrap();
            }
            Input::Update => {
                PLAYER.update().await.unwrap();
            }
            Input::Finish => {
                if let Some(track) = BACKEND.last_loaded() {
                    track.finish();
                }
            }
            Input::Status => {
                let status = PLAYER.get_current_status().await.unwrap();
                if let Some(current) = status.current {
                    assert!(!current.is_released());
                }
            }
        }
    });
});
