use std::process::exit;

use crate::board::{COLS, ROWS};
use crate::round::Round;
use crate::spawn::Spawner;
use crate::term::{is_quit_key, TermManager};

pub struct SnakeGame {
    term: TermManager,
}

impl SnakeGame {
    pub fn new() -> Self {
        SnakeGame { term: TermManager::new() }
    }

    pub fn initialize(&mut self) {
        self.term.setup();

        if !self.term.fits_board() {
            self.term.restore();
            println!(
                "This terminal is too small: the board needs {} columns and {} rows.",
                COLS,
                ROWS + 2
            );
            exit(1);
        }
    }

    /// The controls screen. Returns false when the player quits from it.
    pub fn show_intro(&mut self) -> bool {
        let lines = &[
            "S I D E W I N D E R",
            "",
            "Arrow keys, WASD or HJKL to move",
            "Eat @ to grow. Watch for special tiles:",
            "$ full speed    % shrinks you    ~ slows you",
            "Esc to pause, Q or CTRL+C to quit",
            "",
            "Press any key to begin",
        ];

        self.term.show_message(lines);
        let key = self.term.read_key_blocking();
        self.term.hide_message();
        !is_quit_key(&key)
    }

    /// Runs one round to completion. Returns false when the session should
    /// stop starting new rounds.
    pub fn play(&mut self) -> bool {
        let mut round = Round::new(Spawner::new());

        self.term.clear();
        self.term.draw_title();
        self.flush_cells(&mut round);
        self.term.draw_stats(&round.stats());
        self.term.flush();

        loop {
            let input = self.term.poll_input(round.frame_delay());
            let report = round.tick(input);

            if report.pause_toggled {
                self.pause_overlay(round.paused());
            }
            self.flush_cells(&mut round);
            if report.stats_changed {
                self.term.draw_stats(&round.stats());
            }
            self.term.flush();

            if round.quit_requested() {
                return false;
            }
            if round.finished() {
                break;
            }
        }

        self.game_over(&round)
    }

    pub fn shutdown(&mut self) {
        self.term.restore();
    }

    ///////////////////////////////////////////////////////////////////////////

    fn flush_cells(&mut self, round: &mut Round) {
        for pos in round.drain_dirty() {
            self.term.paint_tile(pos, round.display_tile(pos));
        }
    }

    fn pause_overlay(&mut self, paused: bool) {
        if paused {
            self.term.show_message(&[
                "Paused",
                "Press Esc to resume,",
                "or Q / CTRL+C to quit.",
            ]);
        } else {
            self.term.hide_message();
        }
    }

    fn game_over(&mut self, round: &Round) -> bool {
        if !round.won() {
            for pos in round.snake_cells() {
                self.term.paint_dead(pos);
            }
        }

        let headline = if round.won() { "You won!" } else { "Game over!" };
        self.term.show_message(&[
            headline,
            &*format!("Score: {}", round.stats().score),
            "",
            "Press any key to play again,",
            "or Q / CTRL+C to quit.",
        ]);

        let key = self.term.read_key_blocking();
        self.term.hide_message();
        !is_quit_key(&key)
    }
}
