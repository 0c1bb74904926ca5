//! Simulation tuning shared by the physics step, paddle store and slot registry.

use shared::{
    BALL_VELOCITY_X, BALL_VELOCITY_Y, MIN_PLAYERS, PADDLE_COLLISION_TOLERANCE, PADDLE_HALF_SIZE,
    PADDLE_SPEED, SCORE_FLASH_TICKS, TICK_RATE, TILE_HEIGHT, TILE_WIDTH,
};
use std::time::Duration;

/// Geometry and timing of the shared playfield.
///
/// Every player owns one tile of `tile_width` x `tile_height`; the world is
/// as wide as all tiles laid side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub tile_width: f64,
    pub tile_height: f64,
    pub ball_velocity_x: f64,
    pub ball_velocity_y: f64,
    pub paddle_half_size: f64,
    pub paddle_speed: f64,
    pub collision_tolerance: f64,
    pub min_players: u32,
    pub score_flash_ticks: u32,
    pub tick_rate: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_width: TILE_WIDTH,
            tile_height: TILE_HEIGHT,
            ball_velocity_x: BALL_VELOCITY_X,
            ball_velocity_y: BALL_VELOCITY_Y,
            paddle_half_size: PADDLE_HALF_SIZE,
            paddle_speed: PADDLE_SPEED,
            collision_tolerance: PADDLE_COLLISION_TOLERANCE,
            min_players: MIN_PLAYERS,
            score_flash_ticks: SCORE_FLASH_TICKS,
            tick_rate: TICK_RATE,
        }
    }
}

impl GameConfig {
    pub fn world_width(&self, total_players: u32) -> f64 {
        self.tile_width * total_players as f64
    }

    /// Ball reach within which a paddle registers a hit.
    pub fn hit_reach(&self) -> f64 {
        self.paddle_half_size + self.collision_tolerance
    }

    /// Starting offset for a freshly occupied slot.
    pub fn paddle_start(&self) -> f64 {
        self.tile_height / 2.0
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }
}
