use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::map::{Cell, GameMap, Position};
use crate::snake::Mover;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TemporaryWall {
    pub position: Position,
    pub created_at: Duration,
    pub lifetime: Duration,
}

impl TemporaryWall {
    pub fn is_expired(&self, now: Duration) -> bool {
        now.saturating_sub(self.created_at) >= self.lifetime
    }
}

#[derive(Default)]
pub struct TemporaryWallManager {
    walls: Vec<TemporaryWall>,
}

impl TemporaryWallManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn walls(&self) -> &[TemporaryWall] {
        &self.walls
    }

    pub fn has_wall_at(&self, pos: Position) -> bool {
        self.walls.iter().any(|wall| wall.position == pos)
    }

    /// Adds a wall, replacing any older one on the same cell. Off-map cells
    /// are ignored.
    pub fn add(
        &mut self,
        map: &GameMap,
        position: Position,
        now: Duration,
        lifetime: Duration,
    ) -> bool {
        if !map.in_bounds(position) {
            return false;
        }

        self.walls.retain(|wall| wall.position != position);
        self.walls.push(TemporaryWall { position, created_at: now, lifetime });
        true
    }

    /// Drops expired walls and hands their cells back to the board.
    pub fn remove_expired(&mut self, map: &mut GameMap, now: Duration) {
        self.walls.retain(|wall| {
            if !wall.is_expired(now) {
                return true;
            }
            if map.get(wall.position) == Some(Cell::TemporaryWall) {
                map.set(wall.position, Cell::Empty);
            }
            false
        });
    }

    pub fn stamp(&self, map: &mut GameMap) {
        for wall in &self.walls {
            if map.is_empty(wall.position) {
                map.set(wall.position, Cell::TemporaryWall);
            }
        }
    }

    pub fn clear(&mut self) {
        self.walls.clear();
    }

    /// Fences the free cells around `center`. Returns how many walls went up.
    pub fn surround(
        &mut self,
        map: &GameMap,
        center: Position,
        now: Duration,
        lifetime: Duration,
    ) -> usize {
        let mut placed = 0;

        for dy in -1..=1 {
            for dx in -1..=1 {
                let pos = Position::new(center.x + dx, center.y + dy);
                if (dx, dy) != (0, 0) && map.is_empty(pos) && self.add(map, pos, now, lifetime) {
                    placed += 1;
                }
            }
        }

        placed
    }

    /// Drops up to `count` walls on random free interior cells that are at
    /// least `min_distance` steps away from every body segment.
    pub fn scatter<M, R>(
        &mut self,
        map: &GameMap,
        mover: &M,
        count: usize,
        min_distance: i32,
        now: Duration,
        lifetime: Duration,
        rng: &mut R,
    ) -> usize
    where
        M: Mover + ?Sized,
        R: Rng + ?Sized,
    {
        let candidates: Vec<Position> = map
            .interior_positions()
            .filter(|pos| map.is_empty(*pos))
            .filter(|pos| mover.body().iter().all(|part| part.manhattan(*pos) >= min_distance))
            .collect();

        let chosen: Vec<Position> = candidates.choose_multiple(rng, count).copied().collect();
        for pos in &chosen {
            self.add(map, *pos, now, lifetime);
        }
        chosen.len()
    }
}
