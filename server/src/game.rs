//! The authoritative simulation context.
//!
//! `GameState` owns every piece of mutable world state: the connection
//! registry, paddle offsets, the ball, team scores and the score flash. The
//! network actor is its only owner, so connection events and ticks never
//! interleave.

use crate::client_manager::{ClientManager, Outbound};
use crate::config::GameConfig;
use crate::paddles::PaddleStore;
use crate::physics::{self, Ball};
use log::{debug, error, info, warn};
use shared::{ClientMessage, ServerMessage, Team, TeamScores};
use std::net::SocketAddr;

/// Decaying marker of the last team to score, for client-side flashing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreFlash {
    pub team: Option<Team>,
    pub frames_remaining: u32,
}

impl ScoreFlash {
    pub fn trigger(&mut self, team: Team, frames: u32) {
        self.team = Some(team);
        self.frames_remaining = frames;
    }

    pub fn decay(&mut self) {
        if self.frames_remaining > 0 {
            self.frames_remaining -= 1;
        }
        if self.frames_remaining == 0 {
            self.team = None;
        }
    }
}

pub struct GameState {
    pub tick: u64,
    config: GameConfig,
    clients: ClientManager,
    paddles: PaddleStore,
    ball: Ball,
    scores: TeamScores,
    flash: ScoreFlash,
    total_players: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            tick: 0,
            ball: Ball::new(&config),
            config,
            clients: ClientManager::new(),
            paddles: PaddleStore::new(),
            scores: TeamScores::default(),
            flash: ScoreFlash::default(),
            total_players: 0,
        }
    }

    /// Registers a new connection and reshuffles slots.
    ///
    /// A connection that reappears from an address still on record replaces
    /// the old registration.
    pub fn connect(&mut self, addr: SocketAddr, outbound: Outbound) -> u32 {
        if let Some(existing_id) = self.clients.find_client_by_addr(addr) {
            info!("Replacing existing client {} from {}", existing_id, addr);
            self.drop_client(existing_id);
        }

        let client_id = self.clients.add_client(addr, outbound);
        self.recompute();
        client_id
    }

    pub fn disconnect(&mut self, client_id: u32) {
        if self.drop_client(client_id) {
            self.recompute();
        }
    }

    pub fn disconnect_addr(&mut self, addr: SocketAddr) {
        match self.clients.find_client_by_addr(addr) {
            Some(client_id) => self.disconnect(client_id),
            None => debug!("Disconnect from unknown address {}", addr),
        }
    }

    pub fn client_for_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.clients.find_client_by_addr(addr)
    }

    fn drop_client(&mut self, client_id: u32) -> bool {
        match self.clients.remove_client(&client_id) {
            Some(client) => {
                self.release_slot(client.slot);
                true
            }
            None => false,
        }
    }

    fn release_slot(&mut self, slot: u32) {
        if slot > 0 {
            self.paddles.remove(slot);
        }
    }

    /// Renumbers slots, syncs the paddle store to them and tells every
    /// player where it now sits.
    ///
    /// Closed transports found here lose their paddle exactly as an explicit
    /// disconnect does, so the next occupant of that slot starts centered.
    pub fn recompute(&mut self) {
        for client in self.clients.remove_closed() {
            self.release_slot(client.slot);
        }

        let total_players = self.clients.recompute_slots();
        self.total_players = total_players;
        self.paddles
            .sync_slots(total_players, self.config.paddle_start());

        for client in self.clients.iter() {
            let message = ServerMessage::Assigned {
                number: client.slot,
                total_players,
                team: client.team,
            };
            match message.to_json() {
                Ok(text) => {
                    if !client.send(text) {
                        warn!("Client {} closed before its assignment was sent", client.id);
                    }
                }
                Err(e) => error!("Failed to encode assignment: {}", e),
            }
        }

        info!("Reassigned slots: {} active players", total_players);
    }

    /// Applies one parsed message from `client_id`.
    pub fn handle_message(&mut self, client_id: u32, message: ClientMessage) {
        match message {
            ClientMessage::PaddleMove { direction } => {
                if let Some(slot) = self.clients.slot_of(client_id) {
                    self.paddles
                        .move_paddle(slot, direction, self.total_players, &self.config);
                }
            }
            ClientMessage::GetStatus => {
                let status = ServerMessage::Status {
                    connected: true,
                    number: self.clients.slot_of(client_id),
                    total_players: self.total_players,
                };
                match status.to_json() {
                    Ok(text) => {
                        self.clients.send_to(client_id, text);
                    }
                    Err(e) => error!("Failed to encode status: {}", e),
                }
            }
        }
    }

    /// Advances the world by one tick without broadcasting.
    pub fn step(&mut self) {
        if self.clients.active_count() != self.clients.len() {
            self.recompute();
        }

        if self.total_players < self.config.min_players {
            self.ball.park(self.total_players, &self.config);
        } else if let Some(slot) =
            physics::step(&mut self.ball, &self.paddles, self.total_players, &self.config)
        {
            self.award_point(slot);
        }

        self.flash.decay();
    }

    fn award_point(&mut self, slot: u32) {
        match self.clients.team_for_slot(slot) {
            Some(team) => {
                self.scores.award(team);
                self.flash.trigger(team, self.config.score_flash_ticks);
                info!(
                    "Slot {} scored for {:?} (red {} - blue {})",
                    slot, team, self.scores.red, self.scores.blue
                );
            }
            None => warn!("Paddle hit on unoccupied slot {}", slot),
        }
    }

    /// Full world snapshot, identical for every player.
    pub fn snapshot(&self) -> ServerMessage {
        ServerMessage::GameState {
            ball_x: self.ball.position.x,
            ball_y: self.ball.position.y,
            ball_vel_x: self.ball.velocity.x,
            total_players: self.total_players,
            paddle_positions: self.paddles.positions().clone(),
            team_scores: self.scores,
            last_scoring_team: self.flash.team,
        }
    }

    /// Sends the current snapshot to every open connection.
    pub fn broadcast_state(&self) {
        if self.total_players == 0 {
            return;
        }

        let text = match self.snapshot().to_json() {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to encode game state: {}", e);
                return;
            }
        };

        for client_id in self.clients.broadcast(&text) {
            warn!("Failed to queue game state for client {}", client_id);
        }
    }

    /// One full simulation tick: physics, then broadcast.
    pub fn tick(&mut self) {
        self.step();
        self.broadcast_state();
        self.tick += 1;

        if self.tick % 60 == 0 && self.total_players > 0 {
            debug!(
                "Tick {}: {} players, ball ({:.2}, {:.2}), red {} - blue {}",
                self.tick,
                self.total_players,
                self.ball.position.x,
                self.ball.position.y,
                self.scores.red,
                self.scores.blue
            );
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    pub fn paddles(&self) -> &PaddleStore {
        &self.paddles
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn scores(&self) -> TeamScores {
        self.scores
    }

    pub fn score_flash(&self) -> ScoreFlash {
        self.flash
    }

    pub fn total_players(&self) -> u32 {
        self.total_players
    }
}
