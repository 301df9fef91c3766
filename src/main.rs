mod board;
mod game;
mod round;
mod snake;
mod spawn;
mod term;

fn main() {
    let mut game = game::SnakeGame::new();
    game.initialize();

    // Quitting from any screen ends the session; anything else replays.
    if game.show_intro() {
        while game.play() {}
    }

    game.shutdown();
}
