//! Paddle offsets keyed by slot.
//!
//! A slot's paddle survives the connection that moved it: when slots shift
//! after a disconnect, the connection that slides into a slot inherits the
//! offset stored there.

use crate::config::GameConfig;
use shared::Direction;
use std::collections::BTreeMap;

/// How a slot's paddle sits in its tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Left/right world edge, moves up and down along the tile height.
    Vertical,
    /// Top and bottom of a middle tile, moves left and right along the tile width.
    Horizontal,
}

impl Orientation {
    /// Paddle role for `slot` out of `total_players`, or None when there is no paddle to steer.
    pub fn for_slot(slot: u32, total_players: u32) -> Option<Orientation> {
        if total_players < 2 || slot == 0 || slot > total_players {
            None
        } else if slot == 1 || slot == total_players {
            Some(Orientation::Vertical)
        } else {
            Some(Orientation::Horizontal)
        }
    }

    pub fn accepts(self, direction: Direction) -> bool {
        match self {
            Orientation::Vertical => direction.is_vertical(),
            Orientation::Horizontal => !direction.is_vertical(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaddleStore {
    offsets: BTreeMap<u32, f64>,
}

impl PaddleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: u32) -> Option<f64> {
        self.offsets.get(&slot).copied()
    }

    pub fn set(&mut self, slot: u32, offset: f64) {
        self.offsets.insert(slot, offset);
    }

    pub fn remove(&mut self, slot: u32) -> Option<f64> {
        self.offsets.remove(&slot)
    }

    /// Makes the store hold exactly slots 1..=total_players.
    ///
    /// Slots that appear for the first time start at `start`; slots above
    /// `total_players` are dropped.
    pub fn sync_slots(&mut self, total_players: u32, start: f64) {
        self.offsets.retain(|slot, _| *slot >= 1 && *slot <= total_players);
        for slot in 1..=total_players {
            self.offsets.entry(slot).or_insert(start);
        }
    }

    /// Applies one move request. Returns false when the request is ignored.
    ///
    /// Directions that do not match the slot's orientation are dropped, as is
    /// any input while the slot is the only one in play.
    pub fn move_paddle(
        &mut self,
        slot: u32,
        direction: Direction,
        total_players: u32,
        config: &GameConfig,
    ) -> bool {
        let orientation = match Orientation::for_slot(slot, total_players) {
            Some(orientation) if orientation.accepts(direction) => orientation,
            _ => return false,
        };

        let span = match orientation {
            Orientation::Vertical => config.tile_height,
            Orientation::Horizontal => config.tile_width,
        };
        let low = config.paddle_half_size;
        let high = (span - config.paddle_half_size).max(low);

        let current = self.get(slot).unwrap_or_else(|| config.paddle_start());
        let next = (current + direction.sign() * config.paddle_speed).clamp(low, high);
        self.offsets.insert(slot, next);
        true
    }

    pub fn positions(&self) -> &BTreeMap<u32, f64> {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(total: u32) -> PaddleStore {
        let mut store = PaddleStore::new();
        store.sync_slots(total, GameConfig::default().paddle_start());
        store
    }

    #[test]
    fn test_orientation_by_position() {
        assert_eq!(Orientation::for_slot(1, 1), None);
        assert_eq!(Orientation::for_slot(1, 2), Some(Orientation::Vertical));
        assert_eq!(Orientation::for_slot(2, 2), Some(Orientation::Vertical));
        assert_eq!(Orientation::for_slot(2, 4), Some(Orientation::Horizontal));
        assert_eq!(Orientation::for_slot(3, 4), Some(Orientation::Horizontal));
        assert_eq!(Orientation::for_slot(4, 4), Some(Orientation::Vertical));
        assert_eq!(Orientation::for_slot(0, 4), None);
        assert_eq!(Orientation::for_slot(5, 4), None);
    }

    #[test]
    fn test_edge_slots_accept_only_vertical() {
        let config = GameConfig::default();
        let mut store = store_with(3);

        assert!(!store.move_paddle(1, Direction::Left, 3, &config));
        assert!(!store.move_paddle(3, Direction::Right, 3, &config));
        assert_eq!(store.get(1), Some(8.0));
        assert_eq!(store.get(3), Some(8.0));

        assert!(store.move_paddle(1, Direction::Up, 3, &config));
        assert!(store.move_paddle(3, Direction::Down, 3, &config));
        assert_eq!(store.get(1), Some(6.0));
        assert_eq!(store.get(3), Some(10.0));
    }

    #[test]
    fn test_middle_slots_accept_only_horizontal() {
        let config = GameConfig::default();
        let mut store = store_with(4);

        assert!(!store.move_paddle(2, Direction::Up, 4, &config));
        assert!(!store.move_paddle(3, Direction::Down, 4, &config));
        assert_eq!(store.get(2), Some(8.0));

        assert!(store.move_paddle(2, Direction::Left, 4, &config));
        assert!(store.move_paddle(3, Direction::Right, 4, &config));
        assert_eq!(store.get(2), Some(6.0));
        assert_eq!(store.get(3), Some(10.0));
    }

    #[test]
    fn test_lone_slot_ignores_input() {
        let config = GameConfig::default();
        let mut store = store_with(1);

        for direction in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert!(!store.move_paddle(1, direction, 1, &config));
        }
        assert_eq!(store.get(1), Some(8.0));
    }

    #[test]
    fn test_offsets_stay_clamped() {
        let config = GameConfig::default();
        let mut store = store_with(3);

        for _ in 0..20 {
            store.move_paddle(1, Direction::Up, 3, &config);
            store.move_paddle(2, Direction::Right, 3, &config);
        }
        assert_eq!(store.get(1), Some(config.paddle_half_size));
        assert_eq!(
            store.get(2),
            Some(config.tile_width - config.paddle_half_size)
        );

        for _ in 0..20 {
            store.move_paddle(1, Direction::Down, 3, &config);
            store.move_paddle(2, Direction::Left, 3, &config);
        }
        assert_eq!(
            store.get(1),
            Some(config.tile_height - config.paddle_half_size)
        );
        assert_eq!(store.get(2), Some(config.paddle_half_size));
    }

    #[test]
    fn test_horizontal_clamp_uses_tile_width() {
        let config = GameConfig {
            tile_width: 8.0,
            ..GameConfig::default()
        };
        let mut store = store_with(3);

        store.move_paddle(2, Direction::Right, 3, &config);
        assert_eq!(store.get(2), Some(6.0));
    }

    #[test]
    fn test_sync_slots_initializes_and_prunes() {
        let mut store = PaddleStore::new();
        store.sync_slots(3, 8.0);
        assert_eq!(store.len(), 3);

        store.set(2, 4.0);
        store.sync_slots(2, 8.0);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(2), Some(4.0));
        assert_eq!(store.get(3), None);

        store.sync_slots(0, 8.0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_offset_starts_from_center() {
        let config = GameConfig::default();
        let mut store = PaddleStore::new();

        assert!(store.move_paddle(2, Direction::Down, 2, &config));
        assert_eq!(store.get(2), Some(10.0));
    }
}
