use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::snake::MIN_SNAKE_LENGTH;

/// Errors from reading or writing the score file.
#[derive(Debug, thiserror::Error)]
pub enum ScoreFileError {
    #[error("score file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("score file is malformed: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not encode score: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScoreBoard {
    current_length: u32,
    max_length: u32,
    growth_items: u32,
    poison_items: u32,
    gates_used: u32,
    survival_time: Duration,
}

/// On-disk layout: one `key = value` line per counter.
#[derive(Debug, Serialize, Deserialize)]
struct ScoreRecord {
    #[serde(default = "initial_length")]
    current_length: u32,
    #[serde(default = "initial_length")]
    max_length: u32,
    #[serde(default)]
    growth_items: u32,
    #[serde(default)]
    poison_items: u32,
    #[serde(default)]
    gates_used: u32,
    #[serde(default)]
    survival_seconds: u64,
    #[serde(default)]
    total_score: u32,
}

fn initial_length() -> u32 {
    MIN_SNAKE_LENGTH as u32
}

impl Default for ScoreBoard {
    fn default() -> Self {
        ScoreBoard {
            current_length: initial_length(),
            max_length: initial_length(),
            growth_items: 0,
            poison_items: 0,
            gates_used: 0,
            survival_time: Duration::ZERO,
        }
    }
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_length(&mut self, length: u32) {
        self.current_length = length;
        self.max_length = self.max_length.max(length);
    }

    pub fn current_length(&self) -> u32 {
        self.current_length
    }

    pub fn max_length(&self) -> u32 {
        self.max_length
    }

    pub fn add_growth_item(&mut self) {
        self.growth_items += 1;
    }

    pub fn add_poison_item(&mut self) {
        self.poison_items += 1;
    }

    pub fn add_gate_use(&mut self) {
        self.gates_used += 1;
    }

    pub fn growth_items(&self) -> u32 {
        self.growth_items
    }

    pub fn poison_items(&self) -> u32 {
        self.poison_items
    }

    pub fn gates_used(&self) -> u32 {
        self.gates_used
    }

    pub fn score(&self) -> u32 {
        self.current_length * 10
            + self.growth_items * 50
            + self.poison_items * 30
            + self.gates_used * 100
    }

    /// Time survived since the run started, on the game clock.
    pub fn update_survival_time(&mut self, elapsed: Duration) {
        self.survival_time = elapsed;
    }

    pub fn survival_time(&self) -> Duration {
        self.survival_time
    }

    /// `MM:SS`, with minutes left to grow past two digits.
    pub fn formatted_survival_time(&self) -> String {
        let secs = self.survival_time.as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Growth and gate counters restart with every stage; length, poison and
    /// survival time carry over.
    pub fn reset_stage_counters(&mut self) {
        self.growth_items = 0;
        self.gates_used = 0;
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ScoreFileError> {
        let record = ScoreRecord {
            current_length: self.current_length,
            max_length: self.max_length,
            growth_items: self.growth_items,
            poison_items: self.poison_items,
            gates_used: self.gates_used,
            survival_seconds: self.survival_time.as_secs(),
            total_score: self.score(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string(&record)?)?;
        Ok(())
    }

    /// Loads counters from `path`. A missing file yields a fresh board.
    /// The stored total is ignored and recomputed.
    pub fn load_from(path: &Path) -> Result<Self, ScoreFileError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        let record: ScoreRecord = toml::from_str(&contents)?;
        Ok(ScoreBoard {
            current_length: record.current_length,
            max_length: record.max_length,
            growth_items: record.growth_items,
            poison_items: record.poison_items,
            gates_used: record.gates_used,
            survival_time: Duration::from_secs(record.survival_seconds),
        })
    }
}

/// Where the score file lives unless `--score-file` says otherwise.
pub fn default_score_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "gate-snake")
        .map(|dirs| dirs.data_dir().join("score.txt"))
        .unwrap_or_else(|| PathBuf::from("score.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_weights_every_counter() {
        let mut board = ScoreBoard::new();
        assert_eq!(board.score(), 30);

        board.update_length(5);
        board.add_growth_item();
        board.add_poison_item();
        board.add_gate_use();
        board.add_gate_use();
        assert_eq!(board.score(), 50 + 50 + 30 + 200);
    }

    #[test]
    fn max_length_only_grows() {
        let mut board = ScoreBoard::new();
        board.update_length(8);
        board.update_length(4);
        assert_eq!(board.current_length(), 4);
        assert_eq!(board.max_length(), 8);
    }

    #[test]
    fn stage_reset_keeps_length_poison_and_time() {
        let mut board = ScoreBoard::new();
        board.update_length(6);
        board.add_growth_item();
        board.add_poison_item();
        board.add_gate_use();
        board.update_survival_time(Duration::from_secs(5));

        board.reset_stage_counters();
        assert_eq!(board.growth_items(), 0);
        assert_eq!(board.gates_used(), 0);
        assert_eq!(board.poison_items(), 1);
        assert_eq!(board.max_length(), 6);
        assert_eq!(board.survival_time(), Duration::from_secs(5));
        assert_eq!(board.formatted_survival_time(), "00:05");
    }

    #[test]
    fn survival_time_is_minutes_and_seconds() {
        let mut board = ScoreBoard::new();
        assert_eq!(board.formatted_survival_time(), "00:00");

        board.update_survival_time(Duration::from_millis(3_900));
        assert_eq!(board.formatted_survival_time(), "00:03");

        board.update_survival_time(Duration::from_secs(125));
        assert_eq!(board.formatted_survival_time(), "02:05");

        board.update_survival_time(Duration::from_secs(100 * 60 + 1));
        assert_eq!(board.formatted_survival_time(), "100:01");
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("score.txt");

        let mut board = ScoreBoard::new();
        board.update_length(7);
        board.add_growth_item();
        board.add_gate_use();
        board.update_survival_time(Duration::from_secs(75));
        board.save_to(&path).expect("save");

        let contents = std::fs::read_to_string(&path).expect("read");
        assert!(contents.contains("gates_used = 1"));
        assert!(contents.contains("survival_seconds = 75"));
        assert!(contents.contains(&format!("total_score = {}", board.score())));

        assert_eq!(ScoreBoard::load_from(&path).expect("load"), board);
    }

    #[test]
    fn loads_bare_key_value_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("score.txt");
        let contents = "current_length=4\nmax_length=9\ngates_used=3\ntotal_score=12345\n";
        std::fs::write(&path, contents).expect("write");

        let board = ScoreBoard::load_from(&path).expect("load");
        assert_eq!(board.current_length(), 4);
        assert_eq!(board.max_length(), 9);
        assert_eq!(board.gates_used(), 3);
        assert_eq!(board.growth_items(), 0);
        assert_eq!(board.score(), 40 + 300);
        assert_eq!(board.survival_time(), Duration::ZERO);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let board = ScoreBoard::load_from(&dir.path().join("absent.txt")).expect("load");
        assert_eq!(board, ScoreBoard::default());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("score.txt");
        std::fs::write(&path, "gates_used=lots\n").expect("write");

        assert!(matches!(ScoreBoard::load_from(&path), Err(ScoreFileError::Parse(_))));
    }
}
