use crate::config::GameConfig;
use crate::paddles::PaddleStore;

///Represents a vector in 2D world units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
    ///Positive direction is to the right.
    pub x: f64,
    ///Positive direction is down, towards the bottom of a tile.
    pub y: f64,
}

impl Vector2 {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2 { x, y }
    }

    ///Returns the sum of two vectors.
    pub fn add(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

///The single shared ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub position: Vector2,
    ///Distance travelled per tick.
    pub velocity: Vector2,
}

impl Ball {
    pub fn new(config: &GameConfig) -> Self {
        Ball {
            position: Vector2::new(config.tile_width / 2.0, config.tile_height / 2.0),
            velocity: Vector2::new(config.ball_velocity_x, config.ball_velocity_y),
        }
    }

    ///Pins the ball to the middle of the world while there are too few players.
    pub fn park(&mut self, total_players: u32, config: &GameConfig) {
        self.position = Vector2::new(
            config.world_width(total_players.max(1)) / 2.0,
            config.tile_height / 2.0,
        );
    }
}

///Advances the ball one tick and resolves wall and paddle hits.
///Returns the slot whose paddle scored, at most one per tick.
pub fn step(
    ball: &mut Ball,
    paddles: &PaddleStore,
    total_players: u32,
    config: &GameConfig,
) -> Option<u32> {
    let world_width = config.world_width(total_players);
    let height = config.tile_height;
    let reach = config.hit_reach();

    ball.position = ball.position.add(&ball.velocity);

    // Outer walls
    if ball.position.x <= 0.0 {
        ball.velocity.x = -ball.velocity.x;
        ball.position.x = 0.0;
    } else if ball.position.x >= world_width {
        ball.velocity.x = -ball.velocity.x;
        ball.position.x = world_width;
    }

    if ball.position.y <= 0.0 || ball.position.y >= height {
        ball.velocity.y = -ball.velocity.y;
        ball.position.y = ball.position.y.clamp(0.0, height);
    }

    let mut scorer = None;
    let mut record_hit = |slot: u32| {
        if scorer.is_none() {
            scorer = Some(slot);
        }
    };

    // Left edge paddle, slot 1
    if ball.position.x <= 1.0 && ball.velocity.x < 0.0 {
        if let Some(offset) = paddles.get(1) {
            if (ball.position.y - offset).abs() <= reach {
                ball.velocity.x = ball.velocity.x.abs();
                ball.position.x = 1.0;
                record_hit(1);
            }
        }
    }

    // Right edge paddle, last slot. The paddle sits one unit inside the wall.
    let right_paddle_x = world_width - 1.0;
    if ball.position.x >= right_paddle_x - 1.0 && ball.velocity.x > 0.0 {
        if let Some(offset) = paddles.get(total_players) {
            if (ball.position.y - offset).abs() <= reach {
                ball.velocity.x = -ball.velocity.x.abs();
                ball.position.x = right_paddle_x - 1.0;
                record_hit(total_players);
            }
        }
    }

    // Middle tiles guard their top and bottom edges
    let top_line = config.paddle_half_size + 1.0;
    let bottom_line = height - config.paddle_half_size - 1.0;
    for slot in 2..total_players {
        let offset = match paddles.get(slot) {
            Some(offset) => offset,
            None => continue,
        };
        let paddle_x = (slot - 1) as f64 * config.tile_width + offset;

        if ball.position.y <= top_line
            && ball.velocity.y < 0.0
            && (ball.position.x - paddle_x).abs() <= reach
        {
            ball.velocity.y = ball.velocity.y.abs();
            ball.position.y = top_line;
            record_hit(slot);
        }

        if ball.position.y >= bottom_line
            && ball.velocity.y > 0.0
            && (ball.position.x - paddle_x).abs() <= reach
        {
            ball.velocity.y = -ball.velocity.y.abs();
            ball.position.y = bottom_line;
            record_hit(slot);
        }
    }

    ball.position.x = ball.position.x.clamp(0.0, world_width);
    ball.position.y = ball.position.y.clamp(0.0, height);

    scorer
}
