//! Server network layer: WebSocket transport and the simulation actor loop

use crate::client_manager::Outbound;
use crate::config::GameConfig;
use crate::error::ServerError;
use crate::game::GameState;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::ClientMessage;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Messages sent from connection tasks to the simulation loop
#[derive(Debug)]
pub enum NetworkEvent {
    Connected {
        addr: SocketAddr,
        outbound: Outbound,
    },
    MessageReceived {
        addr: SocketAddr,
        message: ClientMessage,
    },
    Disconnected {
        addr: SocketAddr,
    },
}

/// Fixed-rate ticker for the simulation.
///
/// A tick that runs long pushes the following ticks back instead of letting
/// them fire in a burst.
pub fn ticker(period: Duration) -> Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Main server coordinating connections and the game simulation
pub struct Server {
    listener: TcpListener,
    game_state: GameState,
    tick_duration: Duration,

    events_tx: mpsc::UnboundedSender<NetworkEvent>,
    events_rx: mpsc::UnboundedReceiver<NetworkEvent>,
}

impl Server {
    pub async fn new(addr: &str, config: GameConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        info!("Server listening on {}", listener.local_addr()?);

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            tick_duration: config.tick_duration(),
            game_state: GameState::new(config),
            events_tx,
            events_rx,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the accept loop and the simulation until the process stops.
    pub async fn run(self) -> Result<(), ServerError> {
        let Server {
            listener,
            mut game_state,
            tick_duration,
            events_tx,
            mut events_rx,
        } = self;

        tokio::spawn(accept_connections(listener, events_tx));

        let mut tick_timer = ticker(tick_duration);
        info!(
            "Simulation running at {:.1}Hz",
            1.0 / tick_duration.as_secs_f64()
        );

        loop {
            tokio::select! {
                event = events_rx.recv() => {
                    match event {
                        Some(event) => handle_event(&mut game_state, event),
                        None => {
                            info!("Connection channel closed, stopping simulation");
                            break;
                        }
                    }
                },

                _ = tick_timer.tick() => {
                    game_state.tick();
                },
            }
        }

        Ok(())
    }
}

/// Applies one transport event to the simulation.
pub fn handle_event(game_state: &mut GameState, event: NetworkEvent) {
    match event {
        NetworkEvent::Connected { addr, outbound } => {
            game_state.connect(addr, outbound);
        }
        NetworkEvent::MessageReceived { addr, message } => {
            match game_state.client_for_addr(addr) {
                Some(client_id) => game_state.handle_message(client_id, message),
                None => debug!("Message from unregistered address {}", addr),
            }
        }
        NetworkEvent::Disconnected { addr } => {
            game_state.disconnect_addr(addr);
        }
    }
}

async fn accept_connections(listener: TcpListener, events: mpsc::UnboundedSender<NetworkEvent>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let events = events.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, addr, events).await {
                        warn!("Connection from {} failed: {}", addr, e);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    }
}

/// Drives one WebSocket: parses inbound frames and drains the outbound queue.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    events: mpsc::UnboundedSender<NetworkEvent>,
) -> Result<(), ServerError> {
    let ws_stream = accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();

    if events
        .send(NetworkEvent::Connected {
            addr,
            outbound: outbound_tx,
        })
        .is_err()
    {
        error!("Simulation loop is gone, dropping connection from {}", addr);
        return Ok(());
    }

    let writer = tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if let Err(e) = ws_sender.send(Message::Text(text)).await {
                debug!("Send to {} failed: {}", addr, e);
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    while let Some(frame) = ws_receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => match ClientMessage::from_json(&text) {
                Ok(message) => {
                    if events
                        .send(NetworkEvent::MessageReceived { addr, message })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => warn!("Ignoring malformed message from {}: {}", addr, e),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Transport error from {}: {}", addr, e);
                break;
            }
        }
    }

    writer.abort();
    let _ = events.send(NetworkEvent::Disconnected { addr });
    Ok(())
}
