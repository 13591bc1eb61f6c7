use crate::game::{Bounds, Cell, Game, Status};
use ratatui::{
    layout::Flex,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

// Terminal columns per board cell, so cells come out roughly square.
const CELL_WIDTH: u16 = 2;

const GRID_SYMBOL: &str = "· ";
const FILLED_SYMBOL: &str = "██";

const GRID_COLOR: Color = Color::Rgb(0x19, 0x19, 0x19);
const BODY_COLOR: Color = Color::Rgb(0xdd, 0xdd, 0xdd);
const HEAD_COLOR: Color = Color::White;

pub fn draw(frame: &mut Frame, game: &Game) {
    let bounds = game.bounds();
    let board_width = bounds.columns() as u16 * CELL_WIDTH + 2;
    let board_height = bounds.rows() as u16 + 2;

    let [column] = Layout::horizontal([Constraint::Length(board_width)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [header, board] = Layout::vertical([
        Constraint::Length(3),            // Title + score
        Constraint::Length(board_height), // Board
    ])
    .areas(column);

    frame.render_widget(
        Paragraph::new(format!("SNAKE    Score: {:02}", game.score()))
            .alignment(Alignment::Left)
            .block(Block::default().borders(Borders::ALL)),
        header,
    );

    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(board);
    frame.render_widget(block, board);
    frame.render_widget(game, inner);

    if let Status::Over { final_score } = game.status() {
        let [menu] = Layout::vertical([Constraint::Length(5)])
            .flex(Flex::Center)
            .areas(inner);
        frame.render_widget(Clear, menu);
        frame.render_widget(
            Paragraph::new(format!(
                "GAME OVER\nFinal Score: {:02}\nPress ENTER to play again",
                final_score
            ))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
            menu,
        );
    }
}

impl Widget for &Game {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bounds = self.bounds();

        for cell in bounds.cells() {
            paint(buf, area, bounds, cell, GRID_SYMBOL, Style::default().fg(GRID_COLOR));
        }

        if let Some(food) = self.food() {
            let color = Color::Rgb(food.color.r, food.color.g, food.color.b);
            paint(buf, area, bounds, food.cell, FILLED_SYMBOL, Style::default().fg(color));
        }

        let head_index = self.snake().len() - 1;
        for (index, cell) in self.snake().cells().enumerate() {
            let color = if index == head_index {
                HEAD_COLOR
            } else {
                BODY_COLOR
            };
            paint(buf, area, bounds, *cell, FILLED_SYMBOL, Style::default().fg(color));
        }

        // Stand-in for blurring the board behind the menu
        if matches!(self.status(), Status::Over { .. }) {
            buf.set_style(area, Style::default().add_modifier(Modifier::DIM));
        }
    }
}

fn paint(buf: &mut Buffer, area: Rect, bounds: Bounds, cell: Cell, symbol: &str, style: Style) {
    // a head that just left the board is not drawn
    if !bounds.contains(cell) {
        return;
    }

    let col = (cell.x / bounds.cell) as u16 * CELL_WIDTH;
    let row = (cell.y / bounds.cell) as u16;
    if col + CELL_WIDTH > area.width || row >= area.height {
        return;
    }

    buf.set_string(area.x + col, area.y + row, symbol, style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, START_CELL};
    use rand::{rngs::StdRng, SeedableRng};
    use ratatui::backend::TestBackend;

    fn board_area() -> Rect {
        Rect::new(0, 0, 40, 20)
    }

    fn crash(game: &mut Game, rng: &mut StdRng) {
        game.steer(Direction::Up);
        while game.tick(rng).is_some() {}
    }

    #[test]
    fn test_snake_head_is_drawn() {
        let game = Game::new(Bounds::default(), &mut StdRng::seed_from_u64(3));
        let mut buf = Buffer::empty(board_area());

        (&game).render(board_area(), &mut buf);

        // (210, 210) is column 7, row 7
        let x = (START_CELL.x / 30) as u16 * CELL_WIDTH;
        let y = (START_CELL.y / 30) as u16;
        assert_eq!(buf[(x, y)].symbol(), "█");
        assert_eq!(buf[(x, y)].fg, HEAD_COLOR);
    }

    #[test]
    fn test_food_and_grid_are_drawn() {
        let game = Game::new(Bounds::default(), &mut StdRng::seed_from_u64(3));
        let mut buf = Buffer::empty(board_area());

        (&game).render(board_area(), &mut buf);

        let food = game.food().expect("empty board has room for food");
        let x = (food.cell.x / 30) as u16 * CELL_WIDTH;
        let y = (food.cell.y / 30) as u16;
        assert_eq!(buf[(x, y)].symbol(), "█");
        assert_eq!(
            buf[(x, y)].fg,
            Color::Rgb(food.color.r, food.color.g, food.color.b)
        );

        let empty = Bounds::default()
            .cells()
            .find(|cell| *cell != food.cell && !game.snake().contains(*cell))
            .expect("some empty cell");
        let x = (empty.x / 30) as u16 * CELL_WIDTH;
        let y = (empty.y / 30) as u16;
        assert_eq!(buf[(x, y)].symbol(), "·");
        assert_eq!(buf[(x, y)].fg, GRID_COLOR);
    }

    #[test]
    fn test_board_dims_after_game_over() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = Game::new(Bounds::default(), &mut rng);
        let mut buf = Buffer::empty(board_area());

        (&game).render(board_area(), &mut buf);
        assert!(!buf[(0, 0)].modifier.contains(Modifier::DIM));

        crash(&mut game, &mut rng);
        (&game).render(board_area(), &mut buf);
        assert!(buf[(0, 0)].modifier.contains(Modifier::DIM));
    }

    #[test]
    fn test_small_area_is_clipped() {
        let game = Game::new(Bounds::default(), &mut StdRng::seed_from_u64(3));
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);

        // The head sits outside this area; nothing panics
        (&game).render(area, &mut buf);
        assert!(["·", "█"].contains(&buf[(0, 0)].symbol()));
    }

    #[test]
    fn test_restart_clears_menu_and_dim() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = Game::new(Bounds::default(), &mut rng);
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();

        crash(&mut game, &mut rng);
        game.restart();
        assert_eq!(game.status(), Status::Running);

        terminal.draw(|f| draw(f, &game)).unwrap();
        let text = screen_text(&terminal);
        assert!(!text.contains("GAME OVER"));
        assert!(text.contains("Score: 00"));

        let mut buf = Buffer::empty(board_area());
        (&game).render(board_area(), &mut buf);
        assert!(!buf[(0, 0)].modifier.contains(Modifier::DIM));
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_draw_shows_score_and_menu() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = Game::new(Bounds::default(), &mut rng);
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();

        terminal.draw(|f| draw(f, &game)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Score: 00"));
        assert!(!text.contains("GAME OVER"));

        crash(&mut game, &mut rng);
        terminal.draw(|f| draw(f, &game)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("GAME OVER"));
        assert!(text.contains("Final Score:"));
    }
}
