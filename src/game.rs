use log::{debug, info, warn};
use rand::{seq::SliceRandom, Rng};
use std::collections::VecDeque;

pub const CELL_SIZE: i32 = 30;
pub const BOARD_SIZE: i32 = 600;
pub const POINTS_PER_FOOD: u32 = 10;
pub const START_CELL: Cell = Cell::new(210, 210);

// Random draws before falling back to scanning the free cells.
const SPAWN_ATTEMPTS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Top-left corner of a board cell, in board units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    fn offset(&self, direction: Direction, cell_size: i32) -> Cell {
        let (dx, dy) = direction.delta();
        Cell {
            x: self.x + dx * cell_size,
            y: self.y + dy * cell_size,
        }
    }
}

/// A square board of `size` units split into cells of `cell` units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub size: i32,
    pub cell: i32,
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::new(BOARD_SIZE, CELL_SIZE)
    }
}

impl Bounds {
    pub fn new(size: i32, cell: i32) -> Self {
        Bounds { size, cell }
    }

    /// Largest coordinate a cell may start at.
    pub fn limit(&self) -> i32 {
        self.size - self.cell
    }

    pub fn columns(&self) -> i32 {
        self.size / self.cell
    }

    pub fn rows(&self) -> i32 {
        self.size / self.cell
    }

    /// Snaps a raw coordinate down to the cell grid, clamped onto the board.
    pub fn align(&self, raw: i32) -> i32 {
        let raw = raw.clamp(0, self.size - 1);
        (raw - raw.rem_euclid(self.cell)).min(self.limit())
    }

    pub fn random_cell(&self, rng: &mut impl Rng) -> Cell {
        Cell {
            x: self.align(rng.gen_range(0..self.size)),
            y: self.align(rng.gen_range(0..self.size)),
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (0..=self.limit()).contains(&cell.x) && (0..=self.limit()).contains(&cell.y)
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let step = self.cell as usize;
        let limit = self.limit();
        (0..=limit)
            .step_by(step)
            .flat_map(move |y| (0..=limit).step_by(step).map(move |x| Cell { x, y }))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn random(rng: &mut impl Rng) -> Self {
        Rgb {
            r: rng.gen(),
            g: rng.gen(),
            b: rng.gen(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Food {
    pub cell: Cell,
    pub color: Rgb,
}

/// Picks a free cell for the next food, or `None` if the snake covers the board.
pub fn spawn_food(bounds: Bounds, snake: &Snake, rng: &mut impl Rng) -> Option<Food> {
    let drawn = (0..SPAWN_ATTEMPTS)
        .map(|_| bounds.random_cell(&mut *rng))
        .find(|cell| !snake.contains(*cell));

    let cell = match drawn {
        Some(cell) => cell,
        None => {
            let free: Vec<Cell> = bounds.cells().filter(|cell| !snake.contains(*cell)).collect();
            *free.choose(rng)?
        }
    };

    Some(Food {
        cell,
        color: Rgb::random(rng),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Itself,
}

/// Body cells from tail (front) to head (back).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Cell>,
}

impl Snake {
    pub fn new(start: Cell) -> Self {
        Snake {
            body: VecDeque::from([start]),
        }
    }

    pub fn head(&self) -> Cell {
        // never empty: built with one cell and step pushes before it pops
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.body.iter()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Moves one cell in `direction`, keeping the length. Does nothing without a direction.
    pub fn step(&mut self, direction: Option<Direction>, cell_size: i32) {
        let Some(direction) = direction else {
            return;
        };

        let new_head = self.head().offset(direction, cell_size);
        self.body.push_back(new_head);
        self.body.pop_front();
    }

    /// Lengthens by one; the duplicate head stays behind as the next step's tail.
    pub fn grow(&mut self) {
        self.body.push_back(self.head());
    }

    pub fn hits_wall(&self, bounds: Bounds) -> bool {
        !bounds.contains(self.head())
    }

    pub fn hits_itself(&self) -> bool {
        let head = self.head();
        let neck = self.body.len().saturating_sub(2);
        self.body.iter().take(neck).any(|cell| *cell == head)
    }

    pub fn collision(&self, bounds: Bounds) -> Option<Collision> {
        if self.hits_wall(bounds) {
            Some(Collision::Wall)
        } else if self.hits_itself() {
            Some(Collision::Itself)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Idle,
    Running,
    Over { final_score: u32 },
}

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub points: Option<u32>,
    pub collision: Option<Collision>,
}

#[derive(Debug)]
pub struct Game {
    bounds: Bounds,
    snake: Snake,
    food: Option<Food>,
    direction: Option<Direction>,
    // direction of the last step actually taken
    moved: Option<Direction>,
    score: u32,
    status: Status,
}

impl Game {
    pub fn new(bounds: Bounds, rng: &mut impl Rng) -> Self {
        let snake = Snake::new(START_CELL);
        let food = spawn_food(bounds, &snake, rng);

        Game {
            bounds,
            snake,
            food,
            direction: None,
            moved: None,
            score: 0,
            status: Status::Idle,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Option<&Food> {
        self.food.as_ref()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Sets the pending direction unless it reverses the snake. Several calls
    /// between ticks are fine: the last accepted one is used.
    pub fn steer(&mut self, new_direction: Direction) {
        if matches!(self.status, Status::Over { .. }) {
            return;
        }
        // Before the first step the pending direction is all there is to reverse
        let heading = self.moved.or(self.direction);
        if heading != Some(new_direction.opposite()) {
            self.direction = Some(new_direction);
        }
    }

    /// Advances the game by one tick. Returns `None` once the game is over.
    pub fn tick(&mut self, rng: &mut impl Rng) -> Option<TickReport> {
        match self.status {
            Status::Over { .. } => return None,
            Status::Idle => {
                info!("Game started");
                self.status = Status::Running;
            }
            Status::Running => {}
        }

        let points = self.check_eat(rng);
        self.snake.step(self.direction, self.bounds.cell);
        if self.direction.is_some() {
            self.moved = self.direction;
        }
        let collision = self.snake.collision(self.bounds);

        if let Some(collision) = collision {
            self.game_over(collision);
        }

        Some(TickReport { points, collision })
    }

    fn check_eat(&mut self, rng: &mut impl Rng) -> Option<u32> {
        let food = self.food?;
        if food.cell != self.snake.head() {
            return None;
        }

        self.snake.grow();
        self.score += POINTS_PER_FOOD;

        self.food = spawn_food(self.bounds, &self.snake, rng);
        match &self.food {
            Some(next) => debug!(
                "Ate food at {:?}, score {}, next food at {:?}",
                food.cell, self.score, next.cell
            ),
            None => warn!("No free cell left for food, snake length {}", self.snake.len()),
        }

        Some(POINTS_PER_FOOD)
    }

    fn game_over(&mut self, collision: Collision) {
        info!(
            "Game over: {:?} collision at {:?}, final score {}",
            collision,
            self.snake.head(),
            self.score
        );
        self.direction = None;
        self.moved = None;
        self.status = Status::Over {
            final_score: self.score,
        };
    }

    /// Starts a new run after a game over. Does nothing while a game is in progress.
    pub fn restart(&mut self) {
        if !matches!(self.status, Status::Over { .. }) {
            return;
        }

        info!("Restarting");
        self.score = 0;
        self.direction = None;
        self.moved = None;
        self.snake = Snake::new(START_CELL);
        self.status = Status::Running;
    }
}
