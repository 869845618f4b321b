use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;

use crate::config::GameConfig;
use crate::gate_manager::{GateManager, Transit};
use crate::item::{Item, ItemKind, ItemManager};
use crate::map::{Cell, GameMap, Position};
use crate::snake::{Direction, Mover, Snake, MIN_SNAKE_LENGTH};
use crate::stage::{MissionKind, StageManager};
use crate::score::ScoreBoard;
use crate::temporary_wall::TemporaryWallManager;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    GameOver,
    Completed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    PlaceTemporaryWalls,
}

/// Everything that lives on the board, advanced one tick at a time on a
/// simulated clock.
pub struct World {
    config: GameConfig,
    map: GameMap,
    snake: Snake,
    gates: GateManager,
    items: ItemManager,
    temporary_walls: TemporaryWallManager,
    stages: StageManager,
    score: ScoreBoard,
    rng: StdRng,
    clock: Duration,
    tick: Duration,
    speed_boosts: u32,
    next_wall_wave: Duration,
    outcome: TickOutcome,
}

impl World {
    pub fn new(config: GameConfig, rng: StdRng) -> Self {
        Self::with_stages(config, StageManager::new(), rng)
    }

    pub fn with_stages(config: GameConfig, stages: StageManager, rng: StdRng) -> Self {
        let mut map = GameMap::new(config.width, config.height);
        stages.apply_current(&mut map);

        let start = start_position(&map);
        let items = ItemManager::new(config.max_items, config.item_lifetime);
        let tick = config.base_tick;

        let mut world = World {
            config,
            map,
            snake: Snake::new(start, MIN_SNAKE_LENGTH, Direction::Right),
            gates: GateManager::new(),
            items,
            temporary_walls: TemporaryWallManager::new(),
            stages,
            score: ScoreBoard::new(),
            rng,
            clock: Duration::ZERO,
            tick,
            speed_boosts: 0,
            next_wall_wave: Duration::ZERO,
            outcome: TickOutcome::Running,
        };
        world.refresh_map();
        world
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn gates(&self) -> &GateManager {
        &self.gates
    }

    pub fn items(&self) -> &ItemManager {
        &self.items
    }

    pub fn temporary_walls(&self) -> &TemporaryWallManager {
        &self.temporary_walls
    }

    pub fn stages(&self) -> &StageManager {
        &self.stages
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Current tick length, shortened by speed items.
    pub fn tick_duration(&self) -> Duration {
        self.tick
    }

    pub fn outcome(&self) -> TickOutcome {
        self.outcome
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Turn(dir) => self.snake.set_direction(dir),
            Command::PlaceTemporaryWalls => {
                let placed = self.temporary_walls.surround(
                    &self.map,
                    self.snake.head(),
                    self.clock,
                    self.config.temporary_wall_lifetime,
                );
                self.temporary_walls.stamp(&mut self.map);
                debug!("placed {} temporary walls around the head", placed);
            }
        }
    }

    /// Advances the board by one tick.
    pub fn update(&mut self) -> TickOutcome {
        if self.outcome != TickOutcome::Running {
            return self.outcome;
        }

        self.clock += self.tick;
        self.score.update_survival_time(self.clock);
        self.snake.move_step();

        self.gates.remove_expired_gates(&mut self.map, self.clock);
        self.gates.generate_gates(&mut self.map, &self.snake, self.clock, &mut self.rng);

        self.temporary_walls.remove_expired(&mut self.map, self.clock);
        self.spawn_wall_wave();

        self.handle_gate_collision();

        if self.hits_obstacle() {
            return self.finish(TickOutcome::GameOver);
        }

        self.items.remove_expired(self.clock);
        self.items.generate(&self.map, &self.snake, self.clock, &mut self.rng);
        if let Some(item) = self.items.check_collision(&self.snake) {
            if !self.consume(item) {
                return self.finish(TickOutcome::GameOver);
            }
        }

        self.score.update_length(self.snake.len() as u32);
        self.sync_missions();
        self.check_stage_completion();

        self.refresh_map();
        self.outcome
    }

    /// Ends the run early, as when the player quits.
    pub fn abandon(&mut self) {
        if self.outcome == TickOutcome::Running {
            self.finish(TickOutcome::GameOver);
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn handle_gate_collision(&mut self) {
        let Some(gate) = self.gates.check_collision(&self.snake).cloned() else {
            return;
        };
        let entry = gate.position();

        self.gates.set_entering(entry, true);

        let direction = self.gates.exit_direction(&self.map, &gate, self.snake.direction());
        match self.gates.resolve_transit(&self.map, &gate, direction, &self.snake) {
            Transit::Clear(exit) => {
                self.snake.teleport_to(exit.position);
                self.snake.turn_to(exit.direction);
                self.score.add_gate_use();
                debug!(
                    "passed gate {:?}, out at {:?} heading {:?}",
                    entry, exit.position, exit.direction
                );
            }
            // the head stays on the gate; whatever lies beyond it decides the rest
            Transit::Blocked { paired } => debug!("exit next to {:?} is blocked", paired),
            Transit::Unpaired => debug!("gate {:?} has no partner", entry),
        }

        self.gates.set_entering(entry, false);
    }

    fn hits_obstacle(&self) -> bool {
        let crashed = match self.map.get(self.snake.head()) {
            Some(cell) => cell.is_solid(),
            None => true,
        };
        crashed || self.snake.hits_itself()
    }

    /// Applies an item's effect. Returns `false` when it kills the snake.
    fn consume(&mut self, item: Item) -> bool {
        debug!("picked up {:?}", item.kind);

        match item.kind {
            ItemKind::Growth => {
                self.snake.grow();
                self.score.add_growth_item();
            }
            ItemKind::Poison => {
                if !self.snake.shrink() {
                    return false;
                }
                self.score.add_poison_item();
            }
            ItemKind::Speed => {
                self.speed_boosts += 1;
                let factor = 1.0 + self.config.boost_step * self.speed_boosts as f64;
                self.tick = self.config.base_tick.div_f64(factor).max(self.config.min_tick);
            }
        }

        true
    }

    fn spawn_wall_wave(&mut self) {
        if self.clock < self.next_wall_wave {
            return;
        }

        let placed = self.temporary_walls.scatter(
            &self.map,
            &self.snake,
            self.config.temporary_walls_per_wave,
            self.config.temporary_wall_min_distance,
            self.clock,
            self.config.temporary_wall_lifetime,
            &mut self.rng,
        );
        self.temporary_walls.stamp(&mut self.map);
        self.next_wall_wave = self.clock + self.config.temporary_wall_interval;
        debug!("temporary wall wave placed {} walls", placed);
    }

    fn sync_missions(&mut self) {
        let progress = [
            (MissionKind::Length, self.score.current_length()),
            (MissionKind::GrowthItems, self.score.growth_items()),
            (MissionKind::PoisonItems, self.score.poison_items()),
            (MissionKind::Gates, self.score.gates_used()),
        ];
        for (kind, value) in progress {
            self.stages.update_progress(kind, value);
        }
    }

    fn check_stage_completion(&mut self) {
        if !self.stages.is_current_completed() {
            return;
        }

        if !self.stages.next_stage() {
            self.finish(TickOutcome::Completed);
            return;
        }

        self.gates.restore_all_to_walls(&mut self.map);
        self.stages.apply_current(&mut self.map);
        self.score.reset_stage_counters();
        self.items.clear();
        self.temporary_walls.clear();

        self.snake.reset(start_position(&self.map));

        if let Some(stage) = self.stages.current() {
            info!("entering stage {}: {}", stage.number(), stage.name());
        }
    }

    fn finish(&mut self, outcome: TickOutcome) -> TickOutcome {
        self.outcome = outcome;
        info!("run ended ({:?}) with score {}", outcome, self.score.score());
        outcome
    }

    pub(crate) fn refresh_map(&mut self) {
        self.map.reset_transient();
        self.gates.stamp(&mut self.map);
        self.temporary_walls.stamp(&mut self.map);
        self.items.stamp(&mut self.map);

        let head = self.snake.head();
        for pos in self.snake.body() {
            let cell = if *pos == head { Cell::SnakeHead } else { Cell::SnakeBody };
            if self.map.is_empty(*pos) {
                self.map.set(*pos, cell);
            }
        }
    }
}

/// Where the snake starts on a fresh layout. Crowded boards fall back to the
/// centre so the snake is never placed off the map.
fn start_position(map: &GameMap) -> Position {
    map.find_safe_position()
        .unwrap_or_else(|| Position::new(map.width() / 2, map.height() / 2))
}
