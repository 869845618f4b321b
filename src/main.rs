mod game;
mod term;

use std::io;

use clap::Parser;
use gate_snake::config;

use crate::game::{Flow, SnakeGame};

pub type TermInt = u16;
pub type Coords = (u16, u16);

fn main() -> io::Result<()> {
    env_logger::init();

    let args = config::Args::parse();
    let mut game = SnakeGame::new(args.game_config(), args.score_path(), args.seed)?;
    game.initialize()?;

    let result = run(&mut game);
    // Leave the alternate screen even when the run failed
    game.restore()?;
    result
}

fn run(game: &mut SnakeGame) -> io::Result<()> {
    if game.show_intro()? == Flow::Quit {
        return Ok(());
    }

    while game.play()? == Flow::PlayAgain {}
    Ok(())
}
