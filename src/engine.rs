use crate::Cell;

use rand::Rng;
use Direction::*;
use Tick::*;

/// Board width and height in cells. The board is a torus: moving off
/// one edge re-enters from the opposite edge on the same axis.
pub const GRID_SIZE: u16 = 20;

/// Simulation period in milliseconds, fixed for the whole session.
pub const TICK_MS: u64 = 200;

const START_CELL: Cell = (10, 10);
const START_DIRECTION: Direction = Right;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }
}

/// What a single simulation step did, for the render sink to consume.
#[derive(Debug, PartialEq, Eq)]
pub enum Tick {
    /// The head advanced to `new_head`. `old_tail` is the cell vacated
    /// this step, or None when food was eaten and the snake kept its
    /// tail (net growth of one).
    Moved {
        new_head: Cell,
        old_tail: Option<Cell>,
        ate: bool,
    },
    /// The head ran into the body; the game is now over and the
    /// pre-step state was left untouched.
    Died,
    /// The game was already over; nothing happened.
    Frozen,
}

/// The whole simulation: snake body (head first), food cell, heading
/// and the terminal game-over flag. Owned by the controller and only
/// ever mutated through `reset`, `set_direction` and `tick`.
pub struct Engine {
    snake: Vec<Cell>,
    food: Cell,
    direction: Direction,
    game_over: bool,
}

impl Engine {
    pub fn new() -> Self {
        let mut engine = Engine {
            snake: vec![],
            food: (0, 0),
            direction: START_DIRECTION,
            game_over: false,
        };
        engine.reset();
        engine
    }

    /// Puts the simulation back in its starting state: a one-segment
    /// snake at the center, heading right, fresh food.
    pub fn reset(&mut self) {
        self.snake = vec![START_CELL];
        self.direction = START_DIRECTION;
        self.game_over = false;
        self.food = spawn_food();
    }

    /// Changes the heading for the next tick. Reversing straight into
    /// the body is silently ignored, as is any request after death.
    pub fn set_direction(&mut self, requested: Direction) {
        if self.game_over || requested == self.direction.opposite() {
            return;
        }

        self.direction = requested;
    }

    /// Advances the simulation by one step.
    pub fn tick(&mut self) -> Tick {
        if self.game_over {
            return Frozen;
        }

        let new_head = wrapped_step(self.snake[0], self.direction);

        // The check runs against the pre-move body, tail included, so
        // moving into the cell the tail is about to vacate also kills.
        if self.snake.contains(&new_head) {
            self.game_over = true;
            return Died;
        }

        self.snake.insert(0, new_head);

        let ate = new_head == self.food;
        let old_tail = if ate {
            self.food = spawn_food();
            None
        } else {
            self.snake.pop()
        };

        Moved { new_head, old_tail, ate }
    }

    pub fn snake(&self) -> &[Cell] {
        &self.snake
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }
}

fn wrapped_step(from: Cell, direction: Direction) -> Cell {
    let (x, y) = from;

    match direction {
        Up => (x, (y + GRID_SIZE - 1) % GRID_SIZE),
        Down => (x, (y + 1) % GRID_SIZE),
        Left => ((x + GRID_SIZE - 1) % GRID_SIZE, y),
        Right => ((x + 1) % GRID_SIZE, y),
    }
}

/// Picks a food cell with both axes drawn uniformly over the grid.
/// The snake body is NOT excluded: food can land under the snake and
/// only becomes reachable once the body moves off that cell.
fn spawn_food() -> Cell {
    let mut rng = rand::thread_rng();
    (rng.gen_range(0..GRID_SIZE), rng.gen_range(0..GRID_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(snake: Vec<Cell>, food: Cell, direction: Direction) -> Engine {
        Engine { snake, food, direction, game_over: false }
    }

    fn in_bounds(cell: Cell) -> bool {
        cell.0 < GRID_SIZE && cell.1 < GRID_SIZE
    }

    #[test]
    fn reset_restores_starting_state() {
        let mut engine = engine_with(vec![(1, 1), (1, 2)], (0, 0), Up);
        engine.game_over = true;

        engine.reset();

        assert_eq!(engine.snake(), &[(10, 10)]);
        assert_eq!(engine.direction(), Right);
        assert!(!engine.is_game_over());
        assert!(in_bounds(engine.food()));
    }

    #[test]
    fn wraps_around_every_edge() {
        let cases = [
            ((0, 5), Left, (GRID_SIZE - 1, 5)),
            ((GRID_SIZE - 1, 5), Right, (0, 5)),
            ((5, 0), Up, (5, GRID_SIZE - 1)),
            ((5, GRID_SIZE - 1), Down, (5, 0)),
        ];

        for &(start, direction, expected) in &cases {
            let mut engine = engine_with(vec![start], (0, 0), direction);
            engine.food = (start.0 + 3, start.1); // out of the way

            match engine.tick() {
                Moved { new_head, .. } => assert_eq!(new_head, expected),
                other => panic!("expected a move, got {:?}", other),
            }
        }
    }

    #[test]
    fn eating_grows_by_one_and_respawns_food() {
        let mut engine = engine_with(vec![(5, 5)], (6, 5), Right);

        let tick = engine.tick();

        assert_eq!(
            tick,
            Moved { new_head: (6, 5), old_tail: None, ate: true }
        );
        assert_eq!(engine.snake(), &[(6, 5), (5, 5)]);
        assert!(!engine.is_game_over());
        assert!(in_bounds(engine.food()));
    }

    #[test]
    fn missing_the_food_keeps_length_constant() {
        let mut engine = engine_with(vec![(19, 5), (18, 5)], (0, 0), Right);

        let tick = engine.tick();

        // Head wraps to the left edge, tail gets dropped.
        assert_eq!(
            tick,
            Moved { new_head: (0, 5), old_tail: Some((18, 5)), ate: false }
        );
        assert_eq!(engine.snake(), &[(0, 5), (19, 5)]);
    }

    #[test]
    fn growth_happens_only_on_the_eating_tick() {
        let mut engine = engine_with(vec![(5, 5)], (6, 5), Right);
        engine.tick(); // eats, length 2

        engine.food = (0, 0);
        engine.tick();

        assert_eq!(engine.snake().len(), 2);
    }

    #[test]
    fn reversal_is_silently_ignored() {
        let mut engine = engine_with(vec![(5, 5)], (0, 0), Right);

        engine.set_direction(Left);
        assert_eq!(engine.direction(), Right);

        engine.set_direction(Up);
        assert_eq!(engine.direction(), Up);

        engine.set_direction(Down);
        assert_eq!(engine.direction(), Up);
    }

    #[test]
    fn perpendicular_and_same_direction_requests_apply() {
        let mut engine = engine_with(vec![(5, 5)], (0, 0), Right);

        engine.set_direction(Right);
        assert_eq!(engine.direction(), Right);

        engine.set_direction(Down);
        assert_eq!(engine.direction(), Down);
    }

    #[test]
    fn running_into_the_body_ends_the_game_without_moving() {
        // Closed loop: moving right from (5,5) hits (6,5).
        let body = vec![(5, 5), (5, 6), (6, 6), (6, 5)];
        let mut engine = engine_with(body.clone(), (0, 0), Right);

        assert_eq!(engine.tick(), Died);
        assert!(engine.is_game_over());
        assert_eq!(engine.snake(), &body[..]);
    }

    #[test]
    fn chasing_the_vacating_tail_also_kills() {
        // The tail cell would be free after this step, but the check
        // runs on the pre-move body, so it still counts as a crash.
        let body = vec![(5, 5), (4, 5), (4, 6), (5, 6)];
        let mut engine = engine_with(body.clone(), (0, 0), Down);

        assert_eq!(engine.tick(), Died);
        assert_eq!(engine.snake(), &body[..]);
    }

    #[test]
    fn dead_engine_freezes_until_reset() {
        let mut engine = engine_with(vec![(5, 5), (6, 5)], (0, 0), Right);
        assert_eq!(engine.tick(), Died);

        assert_eq!(engine.tick(), Frozen);
        engine.set_direction(Up);
        assert_eq!(engine.direction(), Right);
        assert_eq!(engine.snake(), &[(5, 5), (6, 5)]);

        engine.reset();
        assert!(!engine.is_game_over());

        engine.food = (0, 0); // keep it out of the snake's path
        assert_eq!(engine.tick(), Moved { new_head: (11, 10), old_tail: Some((10, 10)), ate: false });
    }

    #[test]
    fn food_always_spawns_within_the_grid() {
        for _ in 0..500 {
            assert!(in_bounds(spawn_food()));
        }
    }

    #[test]
    fn a_single_segment_cannot_collide_with_itself() {
        let mut engine = engine_with(vec![(5, 5)], (0, 0), Right);

        for _ in 0..(GRID_SIZE as usize * 2) {
            assert!(matches!(engine.tick(), Moved { .. }));
        }
    }
}
