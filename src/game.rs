use std::process::exit;
use std::time::{Duration, Instant};

use crate::engine::{Direction::*, Engine, Tick, GRID_SIZE, TICK_MS};
use crate::term::TermManager;
use crate::{Cell, Coords, TermInt};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

const SNAKE_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';

/// Drives the engine from a fixed 200 ms tick, feeds key presses into
/// it and mirrors every committed state change onto the terminal.
pub struct SnakeGame {
    term: TermManager,
    engine: Engine,
    cell_width: TermInt,
    origin: Coords,
}

impl SnakeGame {
    pub fn new() -> Self {
        SnakeGame {
            term: TermManager::new(),
            engine: Engine::new(),
            cell_width: 1,
            origin: (0, 0),
        }
    }

    pub fn initialize(&mut self) {
        self.term.setup();
        self.fit_board();
    }

    pub fn show_intro(&mut self) {
        self.term.show_overlay(&[
            "Arrow keys or WASD to move",
            "The board wraps around at the edges",
            "CTRL+C to quit",
            "",
            "Press any key to begin",
        ]);

        if is_ctrl_c(&self.term.read_key_blocking()) {
            self.clean_exit()
        }

        self.term.hide_overlay();
    }

    /// Runs one round from a fresh board to the game-over screen, and
    /// returns once the player asks for a restart.
    pub fn play(&mut self) {
        self.engine.reset();
        self.redraw();

        let period = Duration::from_millis(TICK_MS);
        let mut next_tick = Instant::now() + period;

        loop {
            // Everything that arrives before the deadline influences
            // this tick; later input lands on the next one.
            for ev in self.term.read_events_until(next_tick) {
                match ev {
                    Event::Key(key) if is_ctrl_c(&key) => self.clean_exit(),
                    Event::Key(KeyEvent { code, .. }) => match code {
                        KeyCode::Char('w') | KeyCode::Up => self.engine.set_direction(Up),
                        KeyCode::Char('s') | KeyCode::Down => self.engine.set_direction(Down),
                        KeyCode::Char('a') | KeyCode::Left => self.engine.set_direction(Left),
                        KeyCode::Char('d') | KeyCode::Right => self.engine.set_direction(Right),
                        _ => {}
                    },
                    Event::Resize(w, h) => {
                        self.term.resize(w, h);
                        self.redraw();
                    }
                    _ => {}
                }
            }

            match self.engine.tick() {
                Tick::Moved { new_head, old_tail, ate } => {
                    self.print_cell(new_head, SNAKE_CHAR);

                    if let Some(tail) = old_tail {
                        // Food can be hiding under the snake; show it
                        // once the tail uncovers its cell.
                        let ch = if tail == self.engine.food() { FOOD_CHAR } else { ' ' };
                        self.print_cell(tail, ch);
                    }

                    if ate {
                        let food = self.engine.food();
                        if !self.engine.snake().contains(&food) {
                            self.print_cell(food, FOOD_CHAR);
                        }
                    }

                    self.term.flush();
                }
                // Leaving the loop is what stops the tick timer; a
                // dead game is never advanced.
                Tick::Died | Tick::Frozen => break,
            }

            next_tick += period;
        }

        self.show_game_over();

        loop {
            let key = self.term.read_key_blocking();

            if is_ctrl_c(&key) {
                self.clean_exit();
            }

            if matches!(key.code, KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R')) {
                return;
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn clean_exit(&mut self) {
        self.term.restore();
        exit(0);
    }

    /// Recomputes the cell size and board position from the current
    /// terminal size. GRID_SIZE itself never changes.
    fn fit_board(&mut self) {
        let (w, h) = self.term.size();

        // Two columns per cell when there is room, since terminal
        // characters are taller than they are wide.
        self.cell_width = if w >= GRID_SIZE * 2 + 2 { 2 } else { 1 };

        let board_w = GRID_SIZE * self.cell_width + 2;
        let board_h = GRID_SIZE + 2;
        self.origin = (
            w.saturating_sub(board_w) / 2,
            h.saturating_sub(board_h) / 2,
        );
    }

    /// Repaints the whole board from the engine snapshot. Used on
    /// reset and on resize; ticks repaint incrementally instead.
    fn redraw(&mut self) {
        self.fit_board();
        self.term.clear();

        let board_w = GRID_SIZE * self.cell_width + 2;
        self.term.draw_borders(self.origin, (board_w, GRID_SIZE + 2));

        let body: Vec<Cell> = self.engine.snake().to_vec();
        let food = self.engine.food();

        if !body.contains(&food) {
            self.print_cell(food, FOOD_CHAR);
        }

        for cell in body {
            self.print_cell(cell, SNAKE_CHAR);
        }

        self.term.flush();
    }

    fn show_game_over(&mut self) {
        let body: Vec<Cell> = self.engine.snake().to_vec();
        for cell in body {
            self.print_cell(cell, DEAD_SNAKE_CHAR);
        }

        self.term.show_overlay(&[
            "Game over!",
            "",
            "Press Enter or R to restart,",
            "or CTRL+C to quit.",
        ]);
    }

    fn print_cell(&mut self, cell: Cell, ch: char) {
        let x = self.origin.0 + 1 + cell.0 * self.cell_width;
        let y = self.origin.1 + 1 + cell.1;

        for dx in 0..self.cell_width {
            self.term.print_at((x + dx, y), ch);
        }
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
