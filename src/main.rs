mod game;
mod render;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use game::{Bounds, Direction, Game};
use log::{debug, info};
use ratatui::prelude::*;
use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

const TICK_RATE: Duration = Duration::from_millis(200);
const LOG_FILE: &str = "gridsnake.log";

fn main() -> Result<(), io::Error> {
    // Set up logging before anything else
    WriteLogger::init(LevelFilter::Info, Config::default(), File::create(LOG_FILE)?)
        .map_err(io::Error::other)?;

    info!("Starting gridsnake");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal);

    // Cleanup terminal, even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("Exiting");
    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), io::Error> {
    let mut rng = rand::thread_rng();
    let mut game = Game::new(Bounds::default(), &mut rng);

    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| render::draw(f, &game))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc | KeyCode::Char('q') => break,
                        KeyCode::Enter | KeyCode::Char(' ') => {
                            game.restart();
                        }
                        code => {
                            if let Some(direction) = direction_for(code) {
                                game.steer(direction);
                                debug!("Key {:?}, heading {:?}", code, game.direction());
                            }
                        }
                    }
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            if let Some(report) = game.tick(&mut rng) {
                if report.points.is_some() {
                    chime();
                }
                if let Some(collision) = report.collision {
                    debug!("Tick ended with {:?} collision", collision);
                }
            }
            last_tick = Instant::now();
        }
    }

    Ok(())
}

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}

/// Rings the terminal bell. Failures are not worth interrupting the game for.
fn chime() {
    let mut stdout = io::stdout();
    if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
        debug!("Could not ring bell: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, START_CELL};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_arrow_keys() {
        assert_eq!(direction_for(KeyCode::Up), Some(Direction::Up));
        assert_eq!(direction_for(KeyCode::Down), Some(Direction::Down));
        assert_eq!(direction_for(KeyCode::Left), Some(Direction::Left));
        assert_eq!(direction_for(KeyCode::Right), Some(Direction::Right));
    }

    #[test]
    fn test_other_keys_are_ignored() {
        assert_eq!(direction_for(KeyCode::Char('w')), None);
        assert_eq!(direction_for(KeyCode::Char('x')), None);
        assert_eq!(direction_for(KeyCode::Tab), None);
    }

    #[test]
    fn test_arrow_right_then_tick() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut game = Game::new(Bounds::default(), &mut rng);

        if let Some(direction) = direction_for(KeyCode::Right) {
            game.steer(direction);
        }
        let report = game.tick(&mut rng).expect("game is running");

        // Food never spawns under the snake, so nothing is eaten here
        assert_eq!(report.points, None);
        assert_eq!(game.snake().len(), 1);
        assert_eq!(game.score(), 0);
        assert_eq!(game.snake().head(), Cell::new(START_CELL.x + 30, START_CELL.y));
    }
}
