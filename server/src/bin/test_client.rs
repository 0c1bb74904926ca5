use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use shared::{ClientMessage, Direction, ServerMessage};
use std::time::Duration;
use tokio::time::{interval, timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Headless player that joins the server and wiggles its paddle.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WebSocket URL of the server
    #[arg(short, long, default_value = "ws://127.0.0.1:8080")]
    server: String,

    /// How long to stay connected, in seconds
    #[arg(short, long, default_value = "10")]
    duration: u64,

    /// Paddle move requests per second
    #[arg(short, long, default_value = "4")]
    moves_per_second: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Connecting to {}", args.server);
    let (ws_stream, _) = connect_async(args.server.as_str()).await?;
    let (mut sender, mut receiver) = ws_stream.split();

    let mut slot = 0;
    let mut total_players = 0;
    let mut step = 0u32;
    let mut snapshots = 0u64;
    let mut move_timer = interval(Duration::from_secs_f64(
        1.0 / args.moves_per_second.max(1) as f64,
    ));

    let session = async {
        loop {
            tokio::select! {
                frame = receiver.next() => {
                    let text = match frame {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Server closed the connection");
                            return Ok::<(), Box<dyn std::error::Error>>(());
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(e.into()),
                    };

                    match ServerMessage::from_json(&text) {
                        Ok(ServerMessage::Assigned { number, total_players: total, team }) => {
                            slot = number;
                            total_players = total;
                            info!("Assigned slot {} of {} on team {:?}", number, total, team);
                        }
                        Ok(ServerMessage::GameState { ball_x, ball_y, team_scores, last_scoring_team, .. }) => {
                            snapshots += 1;
                            if let Some(team) = last_scoring_team {
                                info!("{:?} scored! red {} - blue {}", team, team_scores.red, team_scores.blue);
                            }
                            if snapshots % 60 == 0 {
                                info!("Ball at ({:.2}, {:.2}), red {} - blue {}",
                                      ball_x, ball_y, team_scores.red, team_scores.blue);
                            }
                        }
                        Ok(ServerMessage::Status { connected, number, total_players }) => {
                            info!("Status: connected={} slot={:?} players={}", connected, number, total_players);
                        }
                        Err(e) => warn!("Unreadable server message: {}", e),
                    }
                }

                _ = move_timer.tick() => {
                    let direction = pick_direction(slot, total_players, step);
                    step += 1;

                    let message = match direction {
                        Some(direction) => ClientMessage::PaddleMove { direction },
                        None => ClientMessage::GetStatus,
                    };
                    sender.send(Message::Text(message.to_json()?)).await?;
                }
            }
        }
    };

    match timeout(Duration::from_secs(args.duration), session).await {
        Ok(result) => result?,
        Err(_) => info!("Finished after {}s", args.duration),
    }

    Ok(())
}

/// Sweeps the paddle back and forth along its axis; None when there is no paddle to move.
fn pick_direction(slot: u32, total_players: u32, step: u32) -> Option<Direction> {
    if total_players < 2 || slot == 0 {
        return None;
    }

    let forward = (step / 4) % 2 == 0;
    let vertical = slot == 1 || slot == total_players;
    Some(match (vertical, forward) {
        (true, true) => Direction::Up,
        (true, false) => Direction::Down,
        (false, true) => Direction::Left,
        (false, false) => Direction::Right,
    })
}
