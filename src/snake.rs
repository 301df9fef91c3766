use std::collections::VecDeque;

use crate::board::{Pos, PowerUpKind, Tile};
use Direction::*;
use MoveOutcome::*;

pub const MAX_SPEED: u16 = 15;

/// Body length at which a Shrinker switches from "cut down to 5" to "halve".
const SHRINK_THRESHOLD: usize = 12;
const SHRINK_FLOOR: usize = 5;

const SPEEDSTER_BONUS: u32 = 10;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn vector(self) -> Pos {
        match self {
            Up => Pos::new(0, -1),
            Down => Pos::new(0, 1),
            Left => Pos::new(-1, 0),
            Right => Pos::new(1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Up | Down)
    }
}

/// What a resolved move did to the body, for the renderer: `removed` cells
/// revert to ground, the old head becomes body, the new head gets the head
/// glyph. A Shrinker removes several tail cells at once.
pub enum MoveOutcome {
    Moved {
        new_head: Pos,
        old_head: Pos,
        removed: Vec<Pos>,
    },
    Died,
}

/// Per-type consumption counts, for the stats row.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct Counters {
    pub food: u32,
    pub speedsters: u32,
    pub shrinkers: u32,
    pub slowers: u32,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Stats {
    pub score: u32,
    pub size: usize,
    pub speed: u16,
    pub eaten: Counters,
    pub speed_delta: i16,
    pub size_delta: i16,
}

pub struct Snake {
    // Front is the tail, back is the head.
    body: VecDeque<Pos>,
    dir: Direction,
    speed: u16,
    score: u32,
    eaten: Counters,
    speed_delta: i16,
    size_delta: i16,
    dead: bool,
}

impl Snake {
    /// Unrolls `length` segments backwards from `head` against the direction
    /// of travel, so the snake starts moving away from its own body.
    pub fn new(head: Pos, length: i16, dir: Direction) -> Self {
        let step = dir.vector();
        let body = (0..length)
            .rev()
            .map(|i| Pos::new(head.x - step.x * i, head.y - step.y * i))
            .collect();

        Snake {
            body,
            dir,
            speed: 0,
            score: 0,
            eaten: Counters::default(),
            speed_delta: 0,
            size_delta: 0,
            dead: false,
        }
    }

    pub fn head(&self) -> Pos {
        *self.body.back().expect("the body is never empty")
    }

    pub fn segments(&self) -> impl Iterator<Item = Pos> + '_ {
        self.body.iter().copied()
    }

    pub fn size(&self) -> usize {
        self.body.len()
    }

    pub fn direction(&self) -> Direction {
        self.dir
    }

    pub fn speed(&self) -> u16 {
        self.speed
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Marks the snake dead without touching the body. Used by the quit path.
    pub fn kill(&mut self) {
        self.dead = true;
    }

    /// The cell the head would enter this tick. Pure; `resolve` decides.
    pub fn propose_move(&self) -> Pos {
        self.head() + self.dir.vector()
    }

    /// Reversing into the neck is always ignored; perpendicular turns apply.
    pub fn set_direction(&mut self, new_dir: Direction) {
        if new_dir != self.dir.opposite() {
            self.dir = new_dir;
        }
    }

    /// Applies one move given the logical occupant of the candidate cell.
    /// On death the body is left exactly as it was.
    pub fn resolve(&mut self, candidate: Pos, tile: Tile) -> MoveOutcome {
        assert!(!self.dead, "resolve called on a dead snake");

        if tile.blocks() || self.body.contains(&candidate) {
            self.dead = true;
            return Died;
        }

        let speed_before = self.speed as i16;
        let size_before = self.body.len() as i16;

        let old_head = self.head();
        let length = self.body.len();
        self.body.push_back(candidate);

        let mut removed = Vec::new();
        match tile {
            Tile::Food => {
                self.speed = (self.speed + 1).min(MAX_SPEED);
                self.score += 1;
                self.eaten.food += 1;
            }
            Tile::PowerUp(PowerUpKind::Speedster) => {
                self.speed = MAX_SPEED;
                self.score += SPEEDSTER_BONUS;
                self.eaten.speedsters += 1;
            }
            Tile::PowerUp(PowerUpKind::Shrinker) => {
                let cut = if length >= SHRINK_THRESHOLD {
                    length / 2 + 1
                } else {
                    length.saturating_sub(SHRINK_FLOOR)
                };
                assert!(cut < self.body.len(), "shrink cut would remove the head");
                for _ in 0..cut {
                    removed.push(self.body.pop_front().expect("the body is never empty"));
                }
                self.eaten.shrinkers += 1;
            }
            Tile::PowerUp(PowerUpKind::Slower) => {
                self.speed -= self.speed / 2;
                self.eaten.slowers += 1;
            }
            // Plain locomotion over vacant ground: the tail follows the head.
            _ => {
                removed.push(self.body.pop_front().expect("the body is never empty"));
            }
        }

        self.speed_delta = self.speed as i16 - speed_before;
        self.size_delta = self.body.len() as i16 - size_before;

        Moved { new_head: candidate, old_head, removed }
    }

    pub fn stats(&self) -> Stats {
        Stats {
            score: self.score,
            size: self.body.len(),
            speed: self.speed,
            eaten: self.eaten,
            speed_delta: self.speed_delta,
            size_delta: self.size_delta,
        }
    }
}
