use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::dto::command::Command;
use crate::dto::player_response::PlayerResponse;
use crate::player::Player;
use crate::two_way_channel::TwoWayReceiver;

pub(crate) async fn main_loop(
    mut receiver: TwoWayReceiver<Command, PlayerResponse>,
    mut player: Player,
    heartbeat_interval: Duration,
    cancellation_token: CancellationToken,
) {
    // interval() panics on a zero period
    let mut heartbeat = time::interval(heartbeat_interval.max(Duration::from_millis(1)));
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Player handle dropped");
                break;
            }
            _ = heartbeat.tick() => {
                player.update();
            }
            next_command = receiver.recv_async() => {
                let Ok(next_command) = next_command else {
                    info!("Command sender disconnected");
                    break;
                };
                if !handle_command(&mut receiver, &mut player, next_command) {
                    break;
                }
            }
        }
    }

    player.shutdown();
    info!("Request loop completed");
}

// Returns false once the loop should exit
pub(crate) fn handle_command(
    receiver: &mut TwoWayReceiver<Command, PlayerResponse>,
    player: &mut Player,
    next_command: Command,
) -> bool {
    match &next_command {
        Command::Update => debug!("Got command {next_command:?}"),
        _ => info!("Got command {next_command:?}"),
    }

    match next_command {
        Command::Add(track) => {
            player.add(track);
        }
        Command::SetRepeatMode(mode) => {
            player.set_repeat_mode(mode);
        }
        Command::Shuffle => {
            player.shuffle();
        }
        Command::Play(track, options) => {
            player.play(track, options);
        }
        Command::Next => {
            player.next();
        }
        Command::Back => {
            player.back();
        }
        Command::Stop(options) => {
            player.stop(options);
        }
        Command::Pause => {
            player.pause();
        }
        Command::Seek(position) => {
            player.seek(position);
        }
        Command::Reset => {
            player.reset();
        }
        Command::Update => {
            player.update();
        }
        Command::GetCurrentStatus => {
            let current_status = player.get_current_status();
            if let Err(e) = receiver.respond(PlayerResponse::StatusResponse(current_status)) {
                error!("Error sending player status: {e:?}");
            }
        }
        Command::Resolved(resolution) => {
            player.on_resolved(resolution);
        }
        Command::Started(track) => {
            player.on_started(track);
        }
        Command::Finished(track) => {
            player.on_finished(track);
        }
        Command::Shutdown => {
            return false;
        }
    }
    true
}
