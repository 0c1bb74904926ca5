//! # Tile Pong Server Library
//!
//! Authoritative server for a shared Pong ball bouncing across a playfield
//! made of one tile per connected player. Each player owns the paddle at the
//! boundary of its tile and plays for a team; every paddle hit scores a point
//! for the hitter's team.
//!
//! ## Playfield
//!
//! Players are numbered 1..N by connection order ("slots"). The world is N
//! tiles wide. Slot 1 guards the left wall and slot N the right wall with
//! vertical paddles; every slot in between guards the top and bottom of its
//! own tile with a horizontal paddle. Slots are renumbered from scratch each
//! time a player joins or leaves, while a player's team stays fixed for the
//! life of its connection.
//!
//! ## Architecture
//!
//! ### Single Simulation Owner
//! All world state lives in one [`game::GameState`] owned by the actor loop
//! in [`network::Server::run`]. Connection tasks never touch it directly;
//! they forward [`network::NetworkEvent`]s over a channel, so a paddle move
//! received before a tick boundary is always visible to that tick.
//!
//! ### Fixed-Rate Ticks
//! The loop ticks at 60Hz by default. Each tick integrates the ball,
//! resolves wall and paddle hits (at most one point per tick), decays the
//! score flash and broadcasts one full snapshot to every player. With fewer
//! than two players the ball waits at the world center.
//!
//! ### WebSocket Transport
//! Players connect over WebSocket and exchange one JSON object per text
//! frame. The message types live in the `shared` crate.
//!
//! ## Module Organization
//!
//! - `client_manager`: connections, team alternation, slot registry
//! - `paddles`: per-slot paddle offsets and movement rules
//! - `physics`: ball integration and collision resolution
//! - `game`: the simulation context tying the above together
//! - `network`: listener, per-connection tasks and the actor loop
//! - `config`: playfield geometry and timing
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::GameConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::new("0.0.0.0:8080", GameConfig::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod config;
pub mod error;
pub mod game;
pub mod network;
pub mod paddles;
pub mod physics;
