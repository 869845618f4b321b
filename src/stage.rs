use crate::map::{Cell, GameMap, Position};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MissionKind {
    Length,
    GrowthItems,
    PoisonItems,
    Gates,
}

#[derive(Clone, Debug)]
pub struct Mission {
    kind: MissionKind,
    target: u32,
    current: u32,
    description: String,
}

impl Mission {
    pub fn new(kind: MissionKind, target: u32, description: &str) -> Self {
        Mission { kind, target, current: 0, description: description.to_string() }
    }

    pub fn kind(&self) -> MissionKind {
        self.kind
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn update(&mut self, value: u32) {
        self.current = value;
    }

    /// Fraction done, capped at 1.0. A zero target reports no progress.
    pub fn progress(&self) -> f32 {
        if self.target == 0 {
            return 0.0;
        }
        (self.current as f32 / self.target as f32).min(1.0)
    }

    pub fn is_completed(&self) -> bool {
        self.current >= self.target
    }
}

#[derive(Clone, Debug)]
pub struct Stage {
    number: u32,
    name: String,
    walls: Vec<Position>,
    missions: Vec<Mission>,
}

impl Stage {
    pub fn new(number: u32, name: &str) -> Self {
        Stage { number, name: name.to_string(), walls: vec![], missions: vec![] }
    }

    pub fn with_walls(mut self, walls: Vec<Position>) -> Self {
        self.walls = walls;
        self
    }

    pub fn with_mission(mut self, kind: MissionKind, target: u32, description: &str) -> Self {
        self.missions.push(Mission::new(kind, target, description));
        self
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    /// Clears the interior and lays down this stage's walls. Walls outside the
    /// interior are skipped.
    pub fn apply_to_map(&self, map: &mut GameMap) {
        map.clear_interior();
        for pos in &self.walls {
            if map.is_interior(*pos) {
                map.set(*pos, Cell::Wall);
            }
        }
    }

    pub fn update_progress(&mut self, kind: MissionKind, value: u32) {
        for mission in self.missions.iter_mut().filter(|m| m.kind() == kind) {
            mission.update(value);
        }
    }

    /// A stage without missions counts as done.
    pub fn all_missions_completed(&self) -> bool {
        self.missions.iter().all(Mission::is_completed)
    }

    pub fn completed_missions(&self) -> usize {
        self.missions.iter().filter(|m| m.is_completed()).count()
    }

    pub fn overall_progress(&self) -> f32 {
        if self.missions.is_empty() {
            return 1.0;
        }
        self.missions.iter().map(Mission::progress).sum::<f32>() / self.missions.len() as f32
    }
}

pub struct StageManager {
    stages: Vec<Stage>,
    current: usize,
}

impl StageManager {
    /// The four built-in stages, laid out for a 31x31 board.
    pub fn new() -> Self {
        Self::with_stages(builtin_stages())
    }

    pub fn with_stages(stages: Vec<Stage>) -> Self {
        StageManager { stages, current: 0 }
    }

    pub fn current(&self) -> Option<&Stage> {
        self.stages.get(self.current)
    }

    pub fn current_number(&self) -> u32 {
        self.current as u32 + 1
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.stages.len()
    }

    pub fn next_stage(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    pub fn apply_current(&self, map: &mut GameMap) {
        if let Some(stage) = self.current() {
            stage.apply_to_map(map);
        }
    }

    pub fn update_progress(&mut self, kind: MissionKind, value: u32) {
        if let Some(stage) = self.stages.get_mut(self.current) {
            stage.update_progress(kind, value);
        }
    }

    pub fn is_current_completed(&self) -> bool {
        self.current().map_or(false, Stage::all_missions_completed)
    }

    pub fn is_game_completed(&self) -> bool {
        self.is_last() && self.is_current_completed()
    }
}

fn horizontal(y: i32, xs: std::ops::RangeInclusive<i32>) -> impl Iterator<Item = Position> {
    xs.map(move |x| Position::new(x, y))
}

fn vertical(x: i32, ys: std::ops::RangeInclusive<i32>) -> impl Iterator<Item = Position> {
    ys.map(move |y| Position::new(x, y))
}

fn builtin_stages() -> Vec<Stage> {
    let cross = vertical(15, 8..=22)
        .chain(horizontal(15, 8..=14))
        .chain(horizontal(15, 16..=22))
        .collect();

    let l_shape = vertical(10, 8..=15).chain(horizontal(15, 11..=17)).collect();

    let boxes = horizontal(8, 8..=22)
        .chain(horizontal(22, 8..=22))
        .chain(vertical(8, 9..=21))
        .chain(vertical(22, 9..=21))
        .chain(horizontal(13, 13..=17))
        .chain(horizontal(17, 13..=17))
        .chain(vertical(13, 14..=16))
        .chain(vertical(17, 14..=16))
        .collect();

    vec![
        Stage::new(1, "Basic Stage")
            .with_mission(MissionKind::GrowthItems, 1, "Collect 1 growth item"),
        Stage::new(2, "Cross Stage")
            .with_walls(cross)
            .with_mission(MissionKind::GrowthItems, 1, "Collect 1 growth item")
            .with_mission(MissionKind::Gates, 1, "Use gates 1 time"),
        Stage::new(3, "L-Shape Stage")
            .with_walls(l_shape)
            .with_mission(MissionKind::GrowthItems, 1, "Collect 1 growth item")
            .with_mission(MissionKind::Gates, 1, "Use gates 1 time"),
        Stage::new(4, "Box Stage")
            .with_walls(boxes)
            .with_mission(MissionKind::GrowthItems, 1, "Collect 1 growth item")
            .with_mission(MissionKind::Gates, 1, "Use gates 1 time"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mission_progress_is_capped() {
        let mut mission = Mission::new(MissionKind::Gates, 4, "Use gates 4 times");
        assert_eq!(mission.progress(), 0.0);
        mission.update(2);
        assert_eq!(mission.progress(), 0.5);
        assert!(!mission.is_completed());
        mission.update(9);
        assert_eq!(mission.progress(), 1.0);
        assert!(mission.is_completed());
        assert_eq!(mission.current(), 9);
    }

    #[test]
    fn zero_target_reports_no_progress() {
        let mission = Mission::new(MissionKind::Length, 0, "nothing");
        assert_eq!(mission.progress(), 0.0);
        assert!(mission.is_completed());
    }

    #[test]
    fn stage_without_missions_is_done() {
        let stage = Stage::new(9, "Empty");
        assert!(stage.all_missions_completed());
        assert_eq!(stage.overall_progress(), 1.0);
    }

    #[test]
    fn progress_only_touches_matching_missions() {
        let mut stage = Stage::new(1, "Test")
            .with_mission(MissionKind::GrowthItems, 2, "grow")
            .with_mission(MissionKind::Gates, 2, "gates");

        stage.update_progress(MissionKind::Gates, 2);
        assert_eq!(stage.completed_missions(), 1);
        assert_eq!(stage.overall_progress(), 0.5);
        assert!(!stage.all_missions_completed());

        stage.update_progress(MissionKind::GrowthItems, 5);
        assert!(stage.all_missions_completed());
    }

    #[test]
    fn apply_to_map_replaces_the_layout() {
        let mut map = GameMap::new(31, 31);
        map.set(Position::new(3, 3), Cell::Wall);
        let walls = vec![Position::new(5, 5), Position::new(0, 5), Position::new(40, 5)];
        let stage = Stage::new(1, "Test").with_walls(walls);

        stage.apply_to_map(&mut map);

        assert_eq!(map.get(Position::new(3, 3)), Some(Cell::Empty));
        assert_eq!(map.get(Position::new(5, 5)), Some(Cell::Wall));
        assert_eq!(map.get(Position::new(0, 5)), Some(Cell::ImmuneWall));
    }

    #[test]
    fn builtin_stages_advance_to_the_last() {
        let mut stages = StageManager::new();
        assert_eq!(stages.stage_count(), 4);
        assert_eq!(stages.current_number(), 1);
        assert!(!stages.is_current_completed());

        stages.update_progress(MissionKind::GrowthItems, 1);
        assert!(stages.is_current_completed());
        assert!(!stages.is_game_completed());

        assert!(stages.next_stage());
        assert_eq!(stages.current().unwrap().name(), "Cross Stage");
        assert!(!stages.is_current_completed());

        assert!(stages.next_stage());
        assert!(stages.next_stage());
        assert!(stages.is_last());
        assert!(!stages.next_stage());

        stages.update_progress(MissionKind::GrowthItems, 1);
        stages.update_progress(MissionKind::Gates, 1);
        assert!(stages.is_game_completed());
    }

    #[test]
    fn cross_stage_has_inner_walls() {
        let stages = StageManager::new();
        let mut map = GameMap::new(31, 31);
        let cross = &builtin_stages()[1];
        cross.apply_to_map(&mut map);

        assert_eq!(map.get(Position::new(15, 8)), Some(Cell::Wall));
        assert_eq!(map.get(Position::new(8, 15)), Some(Cell::Wall));
        assert_eq!(map.get(Position::new(15, 7)), Some(Cell::Empty));

        stages.apply_current(&mut map);
        assert_eq!(map.get(Position::new(15, 8)), Some(Cell::Empty));
    }
}
