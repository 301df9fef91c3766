//! One round of play: owns the snake, board, and spawner, and advances the
//! simulation exactly one step per tick.

use std::time::Duration;

use crate::board::{Board, Pos, Tile};
use crate::snake::{Direction, MoveOutcome, Snake, Stats};
use crate::spawn::Spawner;

const INITIAL_SNAKE_LENGTH: i16 = 6;

// Where every round begins: a horizontal body ending at (15, 10), heading
// right into the open half of the board.
const INITIAL_HEAD: Pos = Pos::new(15, 10);

const BASE_DELAY_MS: u64 = 200;
const SPEED_STEP_MS: u64 = 10;

// Terminal cells are taller than wide; uncorrected vertical movement reads
// as faster than horizontal.
const VERTICAL_DRAG: f64 = 1.35;

/// What the input collaborator hands the round each tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Input {
    Turn(Direction),
    TogglePause,
    Quit,
}

/// What the presentation layer needs to know after a tick, beyond the
/// dirty cells: whether the stats row and the pause overlay are stale.
#[derive(Default)]
pub struct TickReport {
    pub stats_changed: bool,
    pub pause_toggled: bool,
}

pub struct Round {
    snake: Snake,
    board: Board,
    spawner: Spawner,
    paused: bool,
    quit: bool,
    won: bool,
}

impl Round {
    pub fn new(mut spawner: Spawner) -> Self {
        let mut board = Board::new();
        let snake = Snake::new(INITIAL_HEAD, INITIAL_SNAKE_LENGTH, Direction::Right);

        for pos in snake.segments() {
            board.set(pos, Tile::SnakeBody);
        }
        board.set(snake.head(), Tile::SnakeHead(snake.direction()));

        spawner
            .spawn_food(&mut board)
            .expect("a fresh board always has room for food");

        Round { snake, board, spawner, paused: false, quit: false, won: false }
    }

    /// Advances the simulation by one step. At most one input is processed
    /// per tick, so a double reversal within a tick cannot happen.
    pub fn tick(&mut self, input: Option<Input>) -> TickReport {
        let mut report = TickReport::default();

        match input {
            Some(Input::Quit) => {
                self.quit = true;
                self.snake.kill();
                return report;
            }
            Some(Input::TogglePause) => {
                self.paused = !self.paused;
                report.pause_toggled = true;
                return report;
            }
            Some(Input::Turn(dir)) if !self.paused => self.snake.set_direction(dir),
            _ => {}
        }

        if self.paused || self.snake.is_dead() || self.won {
            return report;
        }

        let candidate = self.snake.propose_move();
        let tile = self.board.occupant(candidate);

        if let MoveOutcome::Moved { new_head, old_head, removed } =
            self.snake.resolve(candidate, tile)
        {
            for pos in removed {
                self.board.restore_ground(pos);
            }
            self.board.set(old_head, Tile::SnakeBody);
            self.board.set(new_head, Tile::SnakeHead(self.snake.direction()));

            match tile {
                Tile::Food => {
                    report.stats_changed = true;
                    // Food first: a power-up must never claim the last free
                    // cell and mask the win.
                    match self.spawner.spawn_food(&mut self.board) {
                        Some(_) => {
                            self.spawner.maybe_schedule(&mut self.board, self.snake.speed());
                        }
                        None => self.won = true,
                    }
                }
                Tile::PowerUp(kind) => {
                    report.stats_changed = true;
                    self.spawner.collect(new_head, kind);
                }
                _ => {}
            }
        }

        self.spawner.tick(&mut self.board);
        report
    }

    /// How long the presentation layer should wait for input before the
    /// next tick. Shrinks as the snake speeds up, stays positive.
    pub fn frame_delay(&self) -> Duration {
        let mut ms = BASE_DELAY_MS
            .saturating_sub(SPEED_STEP_MS * u64::from(self.snake.speed()))
            .max(SPEED_STEP_MS);
        if self.snake.direction().is_vertical() {
            ms = (ms as f64 * VERTICAL_DRAG).ceil() as u64;
        }
        Duration::from_millis(ms)
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn won(&self) -> bool {
        self.won
    }

    /// The round is over: the snake died or the board filled up.
    pub fn finished(&self) -> bool {
        self.snake.is_dead() || self.won
    }

    pub fn stats(&self) -> Stats {
        self.snake.stats()
    }

    pub fn snake_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        self.snake.segments()
    }

    pub fn drain_dirty(&mut self) -> Vec<Pos> {
        self.board.drain_dirty()
    }

    pub fn display_tile(&self, pos: Pos) -> Tile {
        self.board.display_tile(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{COLS, ROWS};

    fn fresh_round() -> Round {
        Round::new(Spawner::with_seed(1234))
    }

    fn find_food(round: &Round) -> Pos {
        for y in 1..ROWS - 1 {
            for x in 1..COLS - 1 {
                let pos = Pos::new(x, y);
                if round.board.occupant(pos) == Tile::Food {
                    return pos;
                }
            }
        }
        panic!("no food on the board");
    }

    // Moves the food to a far corner so straight-line ticks stay food-free.
    fn park_food(round: &mut Round) {
        let pos = find_food(round);
        round.board.restore_ground(pos);
        round.board.set(Pos::new(1, 1), Tile::Food);
    }

    #[test]
    fn new_round_paints_snake_and_food() {
        let round = fresh_round();

        assert_eq!(round.board.occupant(INITIAL_HEAD), Tile::SnakeHead(Direction::Right));
        assert_eq!(
            round.board.occupant(Pos::new(INITIAL_HEAD.x - 1, INITIAL_HEAD.y)),
            Tile::SnakeBody
        );
        assert_eq!(round.stats().size, 6);
        find_food(&round);
    }

    #[test]
    fn plain_tick_advances_one_cell() {
        let mut round = fresh_round();
        park_food(&mut round);
        let tail = Pos::new(INITIAL_HEAD.x - 5, INITIAL_HEAD.y);

        let report = round.tick(None);

        assert!(!report.stats_changed);
        assert_eq!(round.snake.head(), Pos::new(INITIAL_HEAD.x + 1, INITIAL_HEAD.y));
        assert_eq!(round.stats().size, 6);
        assert_eq!(round.board.occupant(tail), Tile::Empty);
        assert_eq!(
            round.board.occupant(INITIAL_HEAD),
            Tile::SnakeBody,
            "the old head cell must repaint as body"
        );
    }

    #[test]
    fn tick_marks_touched_cells_dirty() {
        let mut round = fresh_round();
        park_food(&mut round);
        round.drain_dirty();
        let tail = Pos::new(INITIAL_HEAD.x - 5, INITIAL_HEAD.y);

        round.tick(None);

        let dirty = round.drain_dirty();
        assert!(dirty.contains(&tail));
        assert!(dirty.contains(&INITIAL_HEAD));
        assert!(dirty.contains(&Pos::new(INITIAL_HEAD.x + 1, INITIAL_HEAD.y)));
    }

    #[test]
    fn eating_food_grows_and_respawns() {
        let mut round = fresh_round();
        park_food(&mut round);
        let ahead = Pos::new(INITIAL_HEAD.x + 1, INITIAL_HEAD.y);
        round.board.restore_ground(Pos::new(1, 1));
        round.board.set(ahead, Tile::Food);

        let report = round.tick(None);

        assert!(report.stats_changed);
        let stats = round.stats();
        assert_eq!(stats.size, 7);
        assert_eq!(stats.score, 1);
        assert_eq!(stats.speed, 1);
        assert_eq!(stats.eaten.food, 1);
        assert_eq!(round.board.occupant(ahead), Tile::SnakeHead(Direction::Right));
        // A replacement spawned somewhere free.
        find_food(&round);
    }

    #[test]
    fn reversal_input_is_ignored() {
        let mut round = fresh_round();
        park_food(&mut round);

        round.tick(Some(Input::Turn(Direction::Left)));

        assert_eq!(round.snake.direction(), Direction::Right);
        assert_eq!(round.snake.head(), Pos::new(INITIAL_HEAD.x + 1, INITIAL_HEAD.y));
    }

    #[test]
    fn turn_applies_before_the_move() {
        let mut round = fresh_round();
        park_food(&mut round);

        round.tick(Some(Input::Turn(Direction::Up)));

        assert_eq!(round.snake.head(), Pos::new(INITIAL_HEAD.x, INITIAL_HEAD.y - 1));
    }

    #[test]
    fn pause_freezes_movement_and_direction() {
        let mut round = fresh_round();
        park_food(&mut round);

        let report = round.tick(Some(Input::TogglePause));
        assert!(report.pause_toggled);
        assert!(round.paused());

        round.tick(None);
        round.tick(Some(Input::Turn(Direction::Up)));
        assert_eq!(round.snake.head(), INITIAL_HEAD);
        assert_eq!(round.snake.direction(), Direction::Right);

        round.tick(Some(Input::TogglePause));
        assert!(!round.paused());
        round.tick(None);
        assert_eq!(round.snake.head(), Pos::new(INITIAL_HEAD.x + 1, INITIAL_HEAD.y));
    }

    #[test]
    fn quit_kills_and_flags_the_session() {
        let mut round = fresh_round();

        round.tick(Some(Input::Quit));

        assert!(round.quit_requested());
        assert!(round.finished());
        assert_eq!(round.stats().size, 6, "quit must not disturb the body");
    }

    #[test]
    fn running_into_the_wall_ends_the_round() {
        let mut round = fresh_round();
        park_food(&mut round);

        let mut guard = 0;
        while !round.finished() {
            round.tick(None);
            guard += 1;
            assert!(guard < 100, "the wall never came");
        }

        assert!(!round.won());
        assert_eq!(round.stats().size, 6);
        // The head stopped on the last interior column.
        assert_eq!(round.snake.head(), Pos::new(COLS - 2, INITIAL_HEAD.y));
    }

    #[test]
    fn running_into_the_body_ends_the_round() {
        let mut round = fresh_round();
        park_food(&mut round);

        // A tight left loop: down, left, then up into the body.
        round.tick(Some(Input::Turn(Direction::Down)));
        round.tick(Some(Input::Turn(Direction::Left)));
        round.tick(Some(Input::Turn(Direction::Up)));

        assert!(round.finished());
        assert!(!round.won());
    }

    #[test]
    fn ticks_after_death_change_nothing() {
        let mut round = fresh_round();
        park_food(&mut round);
        while !round.finished() {
            round.tick(None);
        }
        round.drain_dirty();

        round.tick(None);
        round.tick(Some(Input::Turn(Direction::Up)));

        assert!(round.drain_dirty().is_empty());
    }

    #[test]
    fn frame_delay_shrinks_with_speed() {
        let mut round = fresh_round();
        park_food(&mut round);
        assert_eq!(round.frame_delay(), Duration::from_millis(BASE_DELAY_MS));

        let ahead = Pos::new(INITIAL_HEAD.x + 1, INITIAL_HEAD.y);
        round.board.restore_ground(Pos::new(1, 1));
        round.board.set(ahead, Tile::Food);
        round.tick(None);

        assert_eq!(
            round.frame_delay(),
            Duration::from_millis(BASE_DELAY_MS - SPEED_STEP_MS)
        );
    }

    #[test]
    fn vertical_movement_gets_extra_delay() {
        let mut round = fresh_round();
        park_food(&mut round);

        round.tick(Some(Input::Turn(Direction::Down)));

        let expected = (BASE_DELAY_MS as f64 * VERTICAL_DRAG).ceil() as u64;
        assert_eq!(round.frame_delay(), Duration::from_millis(expected));
    }

    #[test]
    fn stepwise_food_then_wall() {
        // A full little scenario: turn, eat, then drive into the top wall.
        let mut round = fresh_round();
        park_food(&mut round);
        round.board.restore_ground(Pos::new(1, 1));
        round.board.set(Pos::new(INITIAL_HEAD.x, INITIAL_HEAD.y - 1), Tile::Food);

        round.tick(Some(Input::Turn(Direction::Up)));
        assert_eq!(round.stats().score, 1);
        assert_eq!(round.stats().size, 7);

        let mut guard = 0;
        while !round.finished() {
            round.tick(None);
            guard += 1;
            assert!(guard < 100, "the wall never came");
        }
        assert_eq!(round.snake.head().y, 1);
    }
}
