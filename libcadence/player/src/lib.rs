mod audio;
mod dto;
mod event_loop;
pub mod mock_backend;
mod player;
mod resolver;
mod settings;
mod timer;
mod track;
mod two_way_channel;

pub mod cadence_player {
    use std::sync::Arc;
    use std::time::Duration;

    use thiserror::Error;
    use tokio::sync::broadcast;
    use tokio_util::sync::CancellationToken;
    use tracing::info;

    pub use crate::audio::{
        AudioBackend, AudioHandle, AudioNotifier, PlaybackSource, TransportMode,
    };
    use crate::dto::command::Command;
    pub use crate::dto::options::{PlayOptions, StopOptions};
    pub use crate::dto::player_event::PlayerEvent;
    use crate::dto::player_response::PlayerResponse;
    pub use crate::dto::player_state::{LoopMode, PlayerState};
    pub use crate::dto::player_status::PlayerStatus;
    pub use crate::dto::track_data::TrackData;
    use crate::event_loop::main_loop;
    use crate::player::Player;
    pub use crate::resolver::{AlternateResolver, NoAlternate};
    pub use crate::settings::Settings;
    pub use crate::track::TrackHandle;
    use crate::two_way_channel::{TwoWaySender, two_way_channel};

    #[derive(Debug, Clone, Error)]
    #[error("{0}")]
    pub struct PlayerError(String);

    /// Handle to the playback controller.
    ///
    /// Every call is forwarded to a single controller task, which also runs the heartbeat.
    /// Dropping the handle stops that task and releases the current track.
    #[derive(Debug)]
    pub struct CadencePlayer {
        cmd_sender: TwoWaySender<Command, PlayerResponse>,
        event_tx: broadcast::Sender<PlayerEvent>,
        cancellation_token: CancellationToken,
        joined: bool,
    }

    impl CadencePlayer {
        /// Must be called from within a tokio runtime.
        pub fn new<B>(audio_backend: B, settings: Settings) -> Self
        where
            B: AudioBackend + 'static,
        {
            Self::new_with_resolver(audio_backend, NoAlternate, settings)
        }

        pub fn new_with_resolver<B, R>(audio_backend: B, resolver: R, settings: Settings) -> Self
        where
            B: AudioBackend + 'static,
            R: AlternateResolver + 'static,
        {
            let (event_tx, _) = broadcast::channel(settings.event_buffer.max(1));
            let (cmd_tx, cmd_rx) = two_way_channel();
            let cancellation_token = CancellationToken::new();
            let heartbeat_interval = settings.heartbeat_interval;

            let player = Player::new(
                event_tx.clone(),
                cmd_tx.clone(),
                Arc::new(audio_backend),
                Arc::new(resolver),
                settings,
            );
            tokio::spawn(main_loop(
                cmd_rx,
                player,
                heartbeat_interval,
                cancellation_token.clone(),
            ));

            Self {
                cmd_sender: cmd_tx,
                event_tx,
                cancellation_token,
                joined: false,
            }
        }

        pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
            self.event_tx.subscribe()
        }

        async fn send(&self, command: Command) -> Result<(), PlayerError> {
            self.cmd_sender
                .send_async(command)
                .await
                .map_err(|e| PlayerError(format!("{e:?}")))
        }

        /// Appends a track to the end of the queue without starting playback.
        pub async fn add(&self, track: TrackData) -> Result<(), PlayerError> {
            self.send(Command::Add(track)).await
        }

        pub async fn set_repeat_mode(&self, mode: LoopMode) -> Result<(), PlayerError> {
            self.send(Command::SetRepeatMode(mode)).await
        }

        pub async fn shuffle(&self) -> Result<(), PlayerError> {
            self.send(Command::Shuffle).await
        }

        /// Plays `track` right away, or the head of the queue when `track` is `None`.
        pub async fn play(&self, track: Option<TrackData>) -> Result<(), PlayerError> {
            self.play_with(track, PlayOptions::default()).await
        }

        pub async fn play_with(
            &self,
            track: Option<TrackData>,
            options: PlayOptions,
        ) -> Result<(), PlayerError> {
            self.send(Command::Play(track, options)).await
        }

        pub async fn next(&self) -> Result<(), PlayerError> {
            self.send(Command::Next).await
        }

        pub async fn back(&self) -> Result<(), PlayerError> {
            self.send(Command::Back).await
        }

        pub async fn stop(&self) -> Result<(), PlayerError> {
            self.stop_with(StopOptions::default()).await
        }

        pub async fn stop_with(&self, options: StopOptions) -> Result<(), PlayerError> {
            self.send(Command::Stop(options)).await
        }

        /// Toggles between paused and playing.
        pub async fn pause(&self) -> Result<(), PlayerError> {
            self.send(Command::Pause).await
        }

        pub async fn seek(&self, position: Duration) -> Result<(), PlayerError> {
            self.send(Command::Seek(position)).await
        }

        pub async fn reset(&self) -> Result<(), PlayerError> {
            self.send(Command::Reset).await
        }

        /// Runs a heartbeat now instead of waiting for the next tick.
        pub async fn update(&self) -> Result<(), PlayerError> {
            self.send(Command::Update).await
        }

        pub async fn get_current_status(&self) -> Result<PlayerStatus, PlayerError> {
            match self
                .cmd_sender
                .get_response(Command::GetCurrentStatus)
                .await
            {
                Ok(PlayerResponse::StatusResponse(status)) => Ok(status),
                Err(e) => Err(PlayerError(e)),
            }
        }

        pub async fn get_current_track(&self) -> Result<Option<TrackHandle>, PlayerError> {
            Ok(self.get_current_status().await?.current)
        }

        pub async fn get_queue(&self) -> Result<Vec<TrackData>, PlayerError> {
            Ok(self.get_current_status().await?.queue)
        }

        pub async fn get_history(&self) -> Result<Vec<TrackData>, PlayerError> {
            Ok(self.get_current_status().await?.history)
        }

        pub async fn get_progress(&self) -> Result<Duration, PlayerError> {
            Ok(self.get_current_status().await?.progress)
        }

        pub async fn get_duration(&self) -> Result<Duration, PlayerError> {
            Ok(self.get_current_status().await?.duration)
        }

        pub async fn get_repeat_mode(&self) -> Result<LoopMode, PlayerError> {
            Ok(self.get_current_status().await?.state.loop_mode)
        }

        pub async fn is_paused(&self) -> Result<bool, PlayerError> {
            Ok(self.get_current_status().await?.state.paused)
        }

        /// Stops playback and shuts down the controller task.
        pub async fn join(mut self) -> Result<(), PlayerError> {
            info!("Joining player instance");
            self.send(Command::Stop(StopOptions {
                emit: true,
                clear: true,
            }))
            .await?;
            info!("Sent stop command");
            self.send(Command::Shutdown).await?;
            info!("Sent shutdown command");
            self.joined = true;
            Ok(())
        }
    }

    impl Drop for CadencePlayer {
        fn drop(&mut self) {
            // join() already queued a shutdown behind the stop command
            if !self.joined {
                info!("join() not called, cancelling player task");
                self.cancellation_token.cancel();
            }
        }
    }
}
