//! The playing field: a decorative `ground` grid, a logical `scene` grid,
//! and the dirty-cell list that drives incremental repaints.

use std::mem;
use std::ops::Add;

use crate::snake::Direction;

pub const COLS: i16 = 62;
pub const ROWS: i16 = 32;

/// A grid position, column-major like the terminal: x is the column, y the row.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Pos {
    pub x: i16,
    pub y: i16,
}

impl Pos {
    pub const fn new(x: i16, y: i16) -> Self {
        Pos { x, y }
    }
}

impl Add for Pos {
    type Output = Pos;

    fn add(self, rhs: Pos) -> Pos {
        Pos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PowerUpKind {
    Speedster,
    Shrinker,
    Slower,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum GroundCover {
    Dirt,
    Grass,
}

/// What a cell holds. `Ground` variants live only in the decorative grid;
/// the scene uses `Empty` for vacant interior cells.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,
    Wall,
    Ground(GroundCover),
    SnakeBody,
    SnakeHead(Direction),
    Food,
    PowerUp(PowerUpKind),
}

impl Tile {
    /// Whether moving into this tile kills the snake.
    pub fn blocks(self) -> bool {
        matches!(self, Tile::Wall | Tile::SnakeBody | Tile::SnakeHead(_))
    }
}

pub struct Board {
    ground: Vec<Tile>,
    scene: Vec<Tile>,
    dirty: Vec<Pos>,
}

impl Board {
    /// A bordered board with a textured interior. Every cell starts dirty,
    /// so the first flush paints the whole board through the normal path.
    pub fn new() -> Self {
        let cells = COLS as usize * ROWS as usize;
        let mut ground = Vec::with_capacity(cells);
        let mut scene = Vec::with_capacity(cells);
        let mut dirty = Vec::with_capacity(cells);

        for y in 0..ROWS {
            for x in 0..COLS {
                let border = x == 0 || y == 0 || x == COLS - 1 || y == ROWS - 1;
                if border {
                    ground.push(Tile::Wall);
                    scene.push(Tile::Wall);
                } else {
                    ground.push(Tile::Ground(cover(x, y)));
                    scene.push(Tile::Empty);
                }
                dirty.push(Pos::new(x, y));
            }
        }

        Board { ground, scene, dirty }
    }

    fn idx(pos: Pos) -> usize {
        pos.y as usize * COLS as usize + pos.x as usize
    }

    /// The logical occupant of a cell, the single source of truth for collisions.
    pub fn occupant(&self, pos: Pos) -> Tile {
        self.scene[Self::idx(pos)]
    }

    pub fn ground_at(&self, pos: Pos) -> Tile {
        self.ground[Self::idx(pos)]
    }

    /// What the cell should look like right now: the occupant, or the
    /// decorative ground where the scene is vacant.
    pub fn display_tile(&self, pos: Pos) -> Tile {
        match self.occupant(pos) {
            Tile::Empty => self.ground_at(pos),
            tile => tile,
        }
    }

    pub fn set(&mut self, pos: Pos, tile: Tile) {
        self.scene[Self::idx(pos)] = tile;
        self.dirty.push(pos);
    }

    /// Vacates a cell; it will repaint with its decorative ground symbol.
    pub fn restore_ground(&mut self, pos: Pos) {
        self.scene[Self::idx(pos)] = Tile::Empty;
        self.dirty.push(pos);
    }

    pub fn is_free(&self, pos: Pos) -> bool {
        self.occupant(pos) == Tile::Empty
    }

    // The border is Wall, never Empty, so scanning everything only ever
    // finds interior cells.
    pub fn has_free_cell(&self) -> bool {
        self.scene.iter().any(|tile| matches!(tile, Tile::Empty))
    }

    /// Returns the cells touched since the last drain and clears the list.
    /// May contain duplicates; repainting a cell twice is harmless.
    pub fn drain_dirty(&mut self) -> Vec<Pos> {
        mem::take(&mut self.dirty)
    }
}

fn cover(x: i16, y: i16) -> GroundCover {
    if (x * 7 + y * 11) % 13 == 0 {
        GroundCover::Grass
    } else {
        GroundCover::Dirt
    }
}
