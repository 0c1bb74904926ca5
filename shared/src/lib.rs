use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TILE_WIDTH: f64 = 16.0;
pub const TILE_HEIGHT: f64 = 16.0;
pub const BALL_VELOCITY_X: f64 = 0.15;
pub const BALL_VELOCITY_Y: f64 = 0.15;
pub const PADDLE_HALF_SIZE: f64 = 2.0;
pub const PADDLE_SPEED: f64 = 2.0;
pub const PADDLE_COLLISION_TOLERANCE: f64 = 2.0;
pub const MIN_PLAYERS: u32 = 2;
pub const SCORE_FLASH_TICKS: u32 = 30;
pub const TICK_RATE: u32 = 60;

/// Team a connection plays for. Assigned once per connection and never changed.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub fn other(self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }
}

/// Requested paddle movement. Edge slots use `Up`/`Down`, middle slots `Left`/`Right`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Sign applied to the paddle offset: towards zero for up/left.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Up | Direction::Left => -1.0,
            Direction::Down | Direction::Right => 1.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamScores {
    pub red: u32,
    pub blue: u32,
}

impl TeamScores {
    pub fn get(&self, team: Team) -> u32 {
        match team {
            Team::Red => self.red,
            Team::Blue => self.blue,
        }
    }

    pub fn award(&mut self, team: Team) {
        match team {
            Team::Red => self.red += 1,
            Team::Blue => self.blue += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.red + self.blue
    }
}

/// Messages sent by the server. Encoded as one JSON object per text frame.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Assigned {
        number: u32,
        total_players: u32,
        team: Team,
    },
    #[serde(rename_all = "camelCase")]
    GameState {
        ball_x: f64,
        ball_y: f64,
        ball_vel_x: f64,
        total_players: u32,
        #[serde(deserialize_with = "slot_keys::deserialize")]
        paddle_positions: BTreeMap<u32, f64>,
        team_scores: TeamScores,
        last_scoring_team: Option<Team>,
    },
    #[serde(rename_all = "camelCase")]
    Status {
        connected: bool,
        number: Option<u32>,
        total_players: u32,
    },
}

impl ServerMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Messages sent by clients.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    PaddleMove { direction: Direction },
    GetStatus,
}

impl ClientMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

// Internally tagged enums buffer their content, which loses serde_json's
// integer-key support, so slot keys are read back as strings and parsed.
mod slot_keys {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use std::collections::BTreeMap;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<u32, f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, value)| {
                key.parse::<u32>()
                    .map(|slot| (slot, value))
                    .map_err(|_| D::Error::custom(format!("invalid slot key {:?}", key)))
            })
            .collect()
    }
}
