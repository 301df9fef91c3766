use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::board::{Board, Pos, PowerUpKind, Tile, COLS, ROWS};

/// Chance, in percent, of a power-up appearing when food is eaten.
const POWERUP_CHANCE_PCT: u32 = 25;

/// Ticks a power-up stays on the board, before the speed compensation.
/// Faster snakes tick more often, so the countdown grows with speed.
const POWERUP_BASE_LIFETIME: u32 = 40;

struct ActivePowerUp {
    pos: Pos,
    kind: PowerUpKind,
    ticks_left: u32,
}

/// Places food and power-ups on free cells and runs the power-up countdown.
/// At most one power-up exists at a time; the slot must be empty before a
/// new one may be placed.
pub struct Spawner {
    rng: StdRng,
    active: Option<ActivePowerUp>,
}

impl Spawner {
    pub fn new() -> Self {
        Spawner { rng: StdRng::from_entropy(), active: None }
    }

    /// A spawner with a fixed seed, so tests get reproducible placement.
    #[cfg(test)]
    pub fn with_seed(seed: u64) -> Self {
        Spawner { rng: StdRng::seed_from_u64(seed), active: None }
    }

    /// Marks a random free interior cell as Food. `None` means the board is
    /// full — the snake has won.
    pub fn spawn_food(&mut self, board: &mut Board) -> Option<Pos> {
        if !board.has_free_cell() {
            return None;
        }
        let pos = self.free_cell(board);
        board.set(pos, Tile::Food);
        Some(pos)
    }

    /// Rolls for a power-up. Called only at the moment food is consumed;
    /// does nothing while one is already on the board.
    pub fn maybe_schedule(&mut self, board: &mut Board, speed: u16) {
        if self.active.is_some() || !board.has_free_cell() {
            return;
        }
        if self.rng.gen_range(0..100) >= POWERUP_CHANCE_PCT {
            return;
        }

        let kind = *[PowerUpKind::Speedster, PowerUpKind::Shrinker, PowerUpKind::Slower]
            .choose(&mut self.rng)
            .expect("the kind list is not empty");
        self.place(board, kind, POWERUP_BASE_LIFETIME + 2 * u32::from(speed));
    }

    fn place(&mut self, board: &mut Board, kind: PowerUpKind, lifetime: u32) {
        assert!(self.active.is_none(), "power-up placed while another is active");

        let pos = self.free_cell(board);
        board.set(pos, Tile::PowerUp(kind));
        self.active = Some(ActivePowerUp { pos, kind, ticks_left: lifetime });
    }

    /// One countdown step. At exactly zero the tile reverts to its ground
    /// symbol and the slot frees up.
    pub fn tick(&mut self, board: &mut Board) {
        if let Some(active) = &mut self.active {
            active.ticks_left -= 1;
            if active.ticks_left == 0 {
                board.restore_ground(active.pos);
                self.active = None;
            }
        }
    }

    /// The snake ate the power-up at `pos`; the head now occupies its cell.
    pub fn collect(&mut self, pos: Pos, kind: PowerUpKind) {
        let active = self.active.take().expect("collected a power-up with none active");
        assert_eq!(active.pos, pos, "collected a power-up from the wrong cell");
        assert_eq!(active.kind, kind, "collected a power-up of the wrong kind");
    }

    // Rejection sampling over the interior. The caller guarantees at least
    // one free cell, so this terminates.
    fn free_cell(&mut self, board: &Board) -> Pos {
        loop {
            let pos = Pos::new(
                self.rng.gen_range(1..COLS - 1),
                self.rng.gen_range(1..ROWS - 1),
            );
            if board.is_free(pos) {
                return pos;
            }
        }
    }
}
