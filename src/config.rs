use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::score::default_score_path;

#[derive(Parser, Debug)]
#[command(name = "gate-snake", about = "Terminal snake with stages, hazards and teleport gates")]
pub struct Args {
    /// Board width in cells
    #[arg(long, default_value_t = 31, value_parser = clap::value_parser!(i32).range(8..=200))]
    pub width: i32,

    /// Board height in cells
    #[arg(long, default_value_t = 31, value_parser = clap::value_parser!(i32).range(8..=200))]
    pub height: i32,

    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Base tick length in milliseconds
    #[arg(long, default_value_t = 200)]
    pub tick_ms: u64,

    /// Where the score counters are saved after each run
    #[arg(long)]
    pub score_file: Option<PathBuf>,
}

impl Args {
    pub fn game_config(&self) -> GameConfig {
        let base_tick = Duration::from_millis(self.tick_ms.max(1));
        GameConfig {
            width: self.width,
            height: self.height,
            base_tick,
            min_tick: GameConfig::default().min_tick.min(base_tick),
            ..GameConfig::default()
        }
    }

    pub fn score_path(&self) -> PathBuf {
        self.score_file.clone().unwrap_or_else(default_score_path)
    }
}

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub base_tick: Duration,
    pub min_tick: Duration,
    /// Each speed item shortens the tick to `base / (1 + boost_step * boosts)`.
    pub boost_step: f64,
    pub max_items: usize,
    pub item_lifetime: Duration,
    pub temporary_wall_lifetime: Duration,
    pub temporary_wall_interval: Duration,
    pub temporary_walls_per_wave: usize,
    pub temporary_wall_min_distance: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 31,
            height: 31,
            base_tick: Duration::from_millis(200),
            min_tick: Duration::from_millis(50),
            boost_step: 0.2,
            max_items: 3,
            item_lifetime: Duration::from_secs(5),
            temporary_wall_lifetime: Duration::from_secs(5),
            temporary_wall_interval: Duration::from_secs(20),
            temporary_walls_per_wave: 2,
            temporary_wall_min_distance: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_board() {
        let args = Args::parse_from(["gate-snake"]);
        let config = args.game_config();
        assert_eq!(config.width, 31);
        assert_eq!(config.height, 31);
        assert_eq!(config.base_tick, Duration::from_millis(200));
        assert_eq!(config.min_tick, Duration::from_millis(50));
        assert_eq!(args.seed, None);
    }

    #[test]
    fn flags_override_the_board() {
        let args = Args::parse_from([
            "gate-snake", "--width", "40", "--seed", "9",
            "--tick-ms", "30", "--score-file", "s.txt",
        ]);
        let config = args.game_config();
        assert_eq!(config.width, 40);
        assert_eq!(args.seed, Some(9));
        assert_eq!(config.base_tick, Duration::from_millis(30));
        assert_eq!(config.min_tick, Duration::from_millis(30));
        assert_eq!(args.score_path(), PathBuf::from("s.txt"));
    }

    #[test]
    fn tiny_boards_are_rejected() {
        assert!(Args::try_parse_from(["gate-snake", "--width", "3"]).is_err());
    }
}
