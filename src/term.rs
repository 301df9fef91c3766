use std::{io::{stdout, Stdout, Write}, time::Duration};

use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Attribute;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style, terminal};

use crate::board::{GroundCover, Pos, PowerUpKind, Tile, COLS, ROWS};
use crate::round::Input;
use crate::snake::{Direction, Stats};

// The board sits below a one-row title bar; the stats row comes after it.
const BOARD_TOP: u16 = 1;

const TITLE: &str = "S I D E W I N D E R";

const SNAKE_BODY_CHAR: char = '█';
const DEAD_SNAKE_CHAR: char = 'X';
const FOOD_CHAR: char = '@';
const SPEEDSTER_CHAR: char = '$';
const SHRINKER_CHAR: char = '%';
const SLOWER_CHAR: char = '~';

pub struct TermManager {
    width: u16,
    height: u16,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: (u16, u16),
    width: u16,
    height: u16,
}

impl TermManager {
    pub fn new() -> Self {
        let (width, height) = terminal::size().expect("Error reading size.");
        let screen = vec![' '; width as usize * height as usize];
        TermManager { width, height, stdout: stdout(), screen, current_msg: None }
    }

    pub fn setup(&mut self) {
        execute!(self.stdout, EnterAlternateScreen).expect("Error entering alt screen");
        self.set_raw_mode(true);
        self.set_cursor_visibility(false);
        self.set_cursor_blink(false);
    }

    pub fn restore(&mut self) {
        self.set_raw_mode(false);
        self.set_cursor_visibility(true);
        self.set_cursor_blink(true);
        execute!(self.stdout, LeaveAlternateScreen).expect("Error leaving alt screen");
    }

    pub fn fits_board(&self) -> bool {
        self.width >= COLS as u16 && self.height >= ROWS as u16 + 2
    }

    /// Waits up to `timeout` for a key and maps it to the game's input
    /// vocabulary. `None` when the timer ran out or the key means nothing.
    pub fn poll_input(&mut self, timeout: Duration) -> Option<Input> {
        if poll(timeout).expect("Error polling input.") {
            if let Event::Key(ev) = read().expect("Error reading input.") {
                return map_key(&ev);
            }
        }
        None
    }

    pub fn read_key_blocking(&self) -> KeyEvent {
        loop {
            if let Event::Key(ev) = read().unwrap() {
                return ev;
            }
        }
    }

    /// Repaints one board cell with the glyph for its tile.
    pub fn paint_tile(&mut self, pos: Pos, tile: Tile) {
        let ch = match tile {
            Tile::Empty => ' ',
            Tile::Wall => wall_glyph(pos),
            Tile::Ground(GroundCover::Dirt) => '.',
            Tile::Ground(GroundCover::Grass) => ',',
            Tile::SnakeBody => SNAKE_BODY_CHAR,
            Tile::SnakeHead(dir) => head_glyph(dir),
            Tile::Food => FOOD_CHAR,
            Tile::PowerUp(PowerUpKind::Speedster) => SPEEDSTER_CHAR,
            Tile::PowerUp(PowerUpKind::Shrinker) => SHRINKER_CHAR,
            Tile::PowerUp(PowerUpKind::Slower) => SLOWER_CHAR,
        };
        self.print_at(term_coords(pos), ch);
    }

    pub fn paint_dead(&mut self, pos: Pos) {
        self.print_at(term_coords(pos), DEAD_SNAKE_CHAR);
    }

    pub fn draw_title(&mut self) {
        let banner = format!("{: ^width$}", TITLE, width = COLS as usize);
        queue!(
            self.stdout,
            cursor::MoveTo(0, 0),
            style::SetAttribute(Attribute::Reverse),
            style::Print(&banner),
            style::SetAttribute(Attribute::Reset)
        )
        .unwrap();
    }

    /// The line under the board: score, size and speed with their latest
    /// deltas, then the per-tile consumption counts.
    pub fn draw_stats(&mut self, stats: &Stats) {
        let mut line = format!(
            "Score {}  Size {} ({:+})  Speed {} ({:+})  {} {}  {} {}  {} {}  {} {}",
            stats.score,
            stats.size,
            stats.size_delta,
            stats.speed,
            stats.speed_delta,
            FOOD_CHAR,
            stats.eaten.food,
            SPEEDSTER_CHAR,
            stats.eaten.speedsters,
            SHRINKER_CHAR,
            stats.eaten.shrinkers,
            SLOWER_CHAR,
            stats.eaten.slowers,
        );
        line = format!("{: <width$}", line, width = COLS as usize);
        line.truncate(COLS as usize);

        queue!(
            self.stdout,
            cursor::MoveTo(0, BOARD_TOP + ROWS as u16),
            style::Print(&line)
        )
        .unwrap();
    }

    pub fn show_message(&mut self, lines: &[&str]) {
        if self.has_message() {
            self.hide_message();
        }

        let msg_height = (lines.len() + 2) as u16;
        let msg_width = (lines.iter().map(|x| x.len()).max().unwrap() + 2) as u16;
        let top_left = (
            self.width / 2 - msg_width / 2,
            self.height / 2 - msg_height / 2,
        );

        // Blank rows above and below the text.
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ');
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded = format!("{: ^width$}", line, width = msg_width as usize);
            let y = top_left.1 + i as u16 + 1;
            for (x_diff, ch) in padded.char_indices() {
                self.print_at_no_save((top_left.0 + x_diff as u16, y), ch);
            }
        }

        self.current_msg = Some(Message { top_left, width: msg_width, height: msg_height });
        self.flush();
    }

    pub fn hide_message(&mut self) {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return,
        };

        // Repaint what the box covered from the screen buffer.
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let (x, y) = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                let ch = self.screen[self.width as usize * y as usize + x as usize];
                self.print_at_no_save((x, y), ch);
            }
        }

        self.flush();
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    pub fn clear(&mut self) {
        execute!(self.stdout, terminal::Clear(ClearType::All)).expect("Error clearing.");
        self.screen = vec![' '; self.width as usize * self.height as usize];
        self.current_msg = None;
    }

    pub fn flush(&mut self) {
        self.stdout.flush().expect("Error flushing.");
    }

    ///////////////////////////////////////////////////////////////////////////

    fn print_at(&mut self, (x, y): (u16, u16), ch: char) {
        queue!(self.stdout, cursor::MoveTo(x, y), style::Print(ch)).unwrap();
        self.screen[self.width as usize * y as usize + x as usize] = ch;
    }

    // For message boxes, which must not overwrite the buffer they are
    // restored from.
    fn print_at_no_save(&mut self, (x, y): (u16, u16), ch: char) {
        queue!(self.stdout, cursor::MoveTo(x, y), style::Print(ch)).unwrap();
    }

    fn set_raw_mode(&self, option: bool) {
        let res = if option {
            terminal::enable_raw_mode()
        } else {
            terminal::disable_raw_mode()
        };
        res.expect("Error setting raw mode.");
    }

    fn set_cursor_blink(&mut self, option: bool) {
        let res = if option {
            execute!(self.stdout, cursor::EnableBlinking)
        } else {
            execute!(self.stdout, cursor::DisableBlinking)
        };
        res.expect("Error setting cursor blink.");
    }

    fn set_cursor_visibility(&mut self, option: bool) {
        let res = if option {
            execute!(self.stdout, cursor::Show)
        } else {
            execute!(self.stdout, cursor::Hide)
        };
        res.expect("Error setting cursor visibility.");
    }
}

fn term_coords(pos: Pos) -> (u16, u16) {
    (pos.x as u16, pos.y as u16 + BOARD_TOP)
}

fn wall_glyph(pos: Pos) -> char {
    let corner = (pos.x == 0 || pos.x == COLS - 1) && (pos.y == 0 || pos.y == ROWS - 1);
    if corner {
        '+'
    } else if pos.y == 0 || pos.y == ROWS - 1 {
        '-'
    } else {
        '|'
    }
}

fn head_glyph(dir: Direction) -> char {
    match dir {
        Direction::Up => '^',
        Direction::Down => 'v',
        Direction::Left => '<',
        Direction::Right => '>',
    }
}

fn map_key(ev: &KeyEvent) -> Option<Input> {
    if is_ctrl_c(ev) {
        return Some(Input::Quit);
    }

    match ev.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => Some(Input::Turn(Direction::Up)),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => {
            Some(Input::Turn(Direction::Down))
        }
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => {
            Some(Input::Turn(Direction::Left))
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => {
            Some(Input::Turn(Direction::Right))
        }
        KeyCode::Esc => Some(Input::TogglePause),
        KeyCode::Char('q') => Some(Input::Quit),
        _ => None,
    }
}

pub fn is_quit_key(ev: &KeyEvent) -> bool {
    is_ctrl_c(ev) || matches!(ev.code, KeyCode::Char('q'))
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
