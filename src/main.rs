mod engine;
mod game;
mod term;

pub type TermInt = u16;

/// A position on the terminal screen, in character columns/rows.
pub type Coords = (u16, u16);

/// A position on the game grid, in [0, GRID_SIZE) on both axes.
pub type Cell = (u16, u16);

fn main() {
    let mut game = game::SnakeGame::new();
    game.initialize();
    game.show_intro();

    loop {
        // One round per play(); it returns when the player asks to
        // restart from the game-over screen. CTRL+C exits cleanly
        // from anywhere inside.
        game.play();
    }
}
