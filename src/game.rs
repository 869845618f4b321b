use std::io;
use std::path::PathBuf;
use std::thread::sleep;
use std::time::{Duration, Instant};

use crate::{Coords, TermInt};
use crate::term::TermManager;
use gate_snake::config::GameConfig;
use gate_snake::map::{Cell, Position};
use gate_snake::score::ScoreBoard;
use gate_snake::snake::{Direction::{self, *}, Mover};
use gate_snake::world::{Command, TickOutcome, World};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Color;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

const TICK_INTERVAL_MS: u64 = 5;

const SNAKE_BODY_CHAR: char = '█';
const DEAD_SNAKE_CHAR: char = 'X';
const PANEL_WIDTH: usize = 34;

/// Terminal columns per board cell; keeps the board roughly square.
const CELL_COLUMNS: TermInt = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    PlayAgain,
    Quit,
}

pub struct SnakeGame {
    config: GameConfig,
    score_path: PathBuf,
    seed: Option<u64>,
    runs: u64,
    paused: bool,
    term: TermManager,
}

impl SnakeGame {
    pub fn new(config: GameConfig, score_path: PathBuf, seed: Option<u64>) -> io::Result<Self> {
        let term = TermManager::new()?;
        Ok(SnakeGame { config, score_path, seed, runs: 0, paused: false, term })
    }

    pub fn initialize(&mut self) -> io::Result<()> {
        self.term.setup()?;

        let (w, h) = self.term.get_terminal_size();
        let board_width = self.config.width as TermInt * CELL_COLUMNS;
        let needed = (
            board_origin().0 + board_width + PANEL_WIDTH as TermInt,
            self.config.height as TermInt + 2,
        );
        if w < needed.0 || h < needed.1 {
            warn!("terminal is {}x{}, the board needs about {}x{}", w, h, needed.0, needed.1);
        }
        Ok(())
    }

    pub fn restore(&mut self) -> io::Result<()> {
        self.term.restore()
    }

    pub fn show_intro(&mut self) -> io::Result<Flow> {
        let last = match ScoreBoard::load_from(&self.score_path) {
            Ok(board) => format!("Last run: {} points", board.score()),
            Err(e) => {
                warn!("could not read {}: {}", self.score_path.display(), e);
                String::new()
            }
        };

        self.term.show_message(&[
            "Arrow keys or WASD to move",
            "T to fence the head with temporary walls",
            "Esc to pause, Q to give up",
            "CTRL+C to quit",
            "",
            &*last,
            "",
            "Press any key to begin",
        ])?;

        if is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(Flow::Quit);
        }

        self.term.hide_message()?;
        Ok(Flow::PlayAgain)
    }

    /// Plays one run to the end, then asks whether to go again.
    pub fn play(&mut self) -> io::Result<Flow> {
        self.term.clear()?;
        self.paused = false;

        let mut world = World::new(self.config.clone(), self.next_rng());
        let mut dir_change: Option<Direction> = None;
        let mut last_update = Instant::now();

        self.render(&world)?;

        loop {
            sleep(Duration::from_millis(TICK_INTERVAL_MS));

            for key_ev in self.term.read_key_events_queue()? {
                if is_ctrl_c(&key_ev) {
                    self.finish_run(&world);
                    return Ok(Flow::Quit);
                }
                match key_ev.code {
                    KeyCode::Char('w') | KeyCode::Up => dir_change = Some(Up),
                    KeyCode::Char('a') | KeyCode::Left => dir_change = Some(Left),
                    KeyCode::Char('s') | KeyCode::Down => dir_change = Some(Down),
                    KeyCode::Char('d') | KeyCode::Right => dir_change = Some(Right),
                    KeyCode::Char('t') if !self.paused => {
                        world.apply(Command::PlaceTemporaryWalls);
                        self.render(&world)?;
                    }
                    KeyCode::Char('q') => world.abandon(),
                    KeyCode::Esc => self.toggle_pause()?,
                    _ => {}
                }
            }

            if world.outcome() != TickOutcome::Running {
                break;
            }
            if self.paused {
                last_update = Instant::now();
                continue;
            }
            if last_update.elapsed() < world.tick_duration() {
                continue;
            }
            last_update = Instant::now();

            if let Some(dir) = dir_change.take() {
                world.apply(Command::Turn(dir));
            }

            let stage_before = world.stages().current_number();
            let outcome = world.update();
            if world.stages().current_number() != stage_before {
                self.term.clear()?;
            }
            self.render(&world)?;

            if outcome != TickOutcome::Running {
                break;
            }
        }

        self.finish_run(&world);
        self.game_over(&world)?;

        // Quit if the user CTRL+C's after the game
        if is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(Flow::Quit);
        }
        Ok(Flow::PlayAgain)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn next_rng(&mut self) -> StdRng {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.runs)),
            None => StdRng::from_entropy(),
        };
        self.runs += 1;
        rng
    }

    fn finish_run(&self, world: &World) {
        match world.score().save_to(&self.score_path) {
            Ok(()) => info!("saved score to {}", self.score_path.display()),
            Err(e) => warn!("could not save score to {}: {}", self.score_path.display(), e),
        }
    }

    fn game_over(&mut self, world: &World) -> io::Result<()> {
        let title = if world.stages().is_game_completed() {
            "You cleared every stage!"
        } else {
            "Game over!"
        };

        if world.outcome() != TickOutcome::Completed {
            for pos in world.snake().body() {
                if world.map().in_bounds(*pos) {
                    self.print_cell(*pos, DEAD_SNAKE_CHAR, Color::Red)?;
                }
            }
        }

        self.term.show_message(&[
            title,
            &*format!("Score: {}", world.score().score()),
            &*format!("Stage reached: {}", world.stages().current_number()),
            "",
            "Press any key to play again,",
            "or CTRL+C to quit.",
        ])
    }

    fn toggle_pause(&mut self) -> io::Result<()> {
        if !self.paused {
            self.term.show_message(&["Paused", "Press Esc to resume", "or Ctrl+C to quit"])?;
        } else {
            self.term.hide_message()?;
        }

        self.paused = !self.paused;
        Ok(())
    }

    fn render(&mut self, world: &World) -> io::Result<()> {
        let map = world.map();
        let snake = world.snake();

        for pos in map.positions() {
            let cell = map.get(pos).unwrap_or(Cell::Empty);
            let (ch, color) = if cell == Cell::SnakeHead && pos == snake.head() {
                (snake.head_char(), Color::Green)
            } else {
                cell_glyph(cell)
            };
            self.print_cell(pos, ch, color)?;
        }

        self.render_panel(world)?;
        self.term.flush()
    }

    fn render_panel(&mut self, world: &World) -> io::Result<()> {
        let (origin_x, origin_y) = board_origin();
        let x = origin_x + world.map().width() as TermInt * CELL_COLUMNS + 3;
        for (i, (text, color)) in panel_lines(world).iter().enumerate() {
            let padded = format!("{text:<width$}", text = text, width = PANEL_WIDTH);
            self.term.print_str((x, origin_y + i as TermInt), &padded, *color)?;
        }
        Ok(())
    }

    fn print_cell(&mut self, pos: Position, ch: char, color: Color) -> io::Result<()> {
        let Some(origin) = cell_coords(pos) else {
            return Ok(());
        };
        let second = if matches!(ch, '█' | '▓' | '░' | '▒' | '#') { ch } else { ' ' };
        self.term.print_at(origin, ch, color)?;
        self.term.print_at((origin.0 + 1, origin.1), second, color)
    }
}

/// Side panel text, top to bottom.
fn panel_lines(world: &World) -> Vec<(String, Color)> {
    let score = world.score();
    let open = world.gates().pair_count();
    let mut lines = vec![
        (format!("Score    {}", score.score()), Color::White),
        (format!("Time     {}", score.formatted_survival_time()), Color::White),
        (format!("Length   {} (max {})", score.current_length(), score.max_length()), Color::White),
        (format!("Growth   {}", score.growth_items()), Color::Green),
        (format!("Poison   {}", score.poison_items()), Color::Magenta),
        (format!("Gates    {} ({} open)", score.gates_used(), open), Color::Cyan),
        (format!("Speed    {} ms", world.tick_duration().as_millis()), Color::Yellow),
        (String::new(), Color::Reset),
    ];

    let stages = world.stages();
    if let Some(stage) = stages.current() {
        let title = format!("Stage {}/{}: {}", stage.number(), stages.stage_count(), stage.name());
        lines.push((title, Color::White));
        for mission in stage.missions() {
            let (mark, color) = if mission.is_completed() {
                ('x', Color::Green)
            } else {
                (' ', Color::Grey)
            };
            let done = mission.current().min(mission.target());
            let target = mission.target();
            let text = format!("[{}] {} ({}/{})", mark, mission.description(), done, target);
            lines.push((text, color));
        }
        lines.push((format!("Progress {:.0}%", stage.overall_progress() * 100.0), Color::White));
    }

    lines
}

fn board_origin() -> Coords {
    (1, 1)
}

fn cell_coords(pos: Position) -> Option<Coords> {
    let (origin_x, origin_y) = board_origin();
    let x = TermInt::try_from(pos.x).ok()?;
    let y = TermInt::try_from(pos.y).ok()?;
    Some((origin_x + x * CELL_COLUMNS, origin_y + y))
}

fn cell_glyph(cell: Cell) -> (char, Color) {
    match cell {
        Cell::Empty => (' ', Color::Reset),
        Cell::Wall => ('▓', Color::Grey),
        Cell::ImmuneWall => ('#', Color::DarkGrey),
        Cell::SnakeHead => ('@', Color::Green),
        Cell::SnakeBody => (SNAKE_BODY_CHAR, Color::DarkGreen),
        Cell::GrowthItem => ('+', Color::Green),
        Cell::PoisonItem => ('-', Color::Magenta),
        Cell::Gate => ('░', Color::Cyan),
        Cell::SpeedItem => ('»', Color::Yellow),
        Cell::TemporaryWall => ('▒', Color::Red),
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_two_columns_wide() {
        assert_eq!(cell_coords(Position::new(0, 0)), Some((1, 1)));
        assert_eq!(cell_coords(Position::new(3, 2)), Some((7, 3)));
        assert_eq!(cell_coords(Position::new(-1, 2)), None);
    }

    #[test]
    fn every_cell_has_a_distinct_glyph() {
        let glyphs: Vec<char> = (0..=9)
            .filter_map(Cell::from_code)
            .map(|cell| cell_glyph(cell).0)
            .collect();
        assert_eq!(glyphs.len(), 10);
        for (i, a) in glyphs.iter().enumerate() {
            assert!(glyphs[i + 1..].iter().all(|b| a != b), "{} is reused", a);
        }
    }

    #[test]
    fn panel_shows_survival_time_from_the_world_clock() {
        let time_line = |world: &World| {
            panel_lines(world)
                .into_iter()
                .map(|(text, _)| text)
                .find(|text| text.starts_with("Time"))
        };

        // no items or wall waves, so nothing stops the snake for five ticks
        let config = GameConfig {
            max_items: 0,
            temporary_walls_per_wave: 0,
            ..GameConfig::default()
        };
        let mut world = World::new(config, StdRng::seed_from_u64(1));
        assert_eq!(time_line(&world).as_deref(), Some("Time     00:00"));

        for _ in 0..5 {
            assert_eq!(world.update(), TickOutcome::Running);
        }
        assert_eq!(world.clock(), Duration::from_secs(1));
        assert_eq!(time_line(&world).as_deref(), Some("Time     00:01"));
    }

    #[test]
    fn panel_lists_the_stage_missions() {
        let world = World::new(GameConfig::default(), StdRng::seed_from_u64(1));
        let lines: Vec<String> = panel_lines(&world).into_iter().map(|(text, _)| text).collect();
        assert!(lines.contains(&"Stage 1/4: Basic Stage".to_string()));
        assert!(lines.contains(&"[ ] Collect 1 growth item (0/1)".to_string()));
    }

    #[test]
    fn ctrl_c_needs_the_modifier() {
        assert!(is_ctrl_c(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_ctrl_c(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }
}
