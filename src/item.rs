use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::map::{Cell, GameMap, Position};
use crate::snake::Mover;

const SPAWN_ATTEMPTS: usize = 100;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Growth,
    Poison,
    Speed,
}

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [ItemKind::Growth, ItemKind::Poison, ItemKind::Speed];

    pub fn cell(self) -> Cell {
        match self {
            ItemKind::Growth => Cell::GrowthItem,
            ItemKind::Poison => Cell::PoisonItem,
            ItemKind::Speed => Cell::SpeedItem,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub position: Position,
    pub kind: ItemKind,
    pub created_at: Duration,
    pub lifetime: Duration,
}

impl Item {
    pub fn is_expired(&self, now: Duration) -> bool {
        now.saturating_sub(self.created_at) >= self.lifetime
    }
}

pub struct ItemManager {
    items: Vec<Item>,
    max_items: usize,
    lifetime: Duration,
}

impl ItemManager {
    pub fn new(max_items: usize, lifetime: Duration) -> Self {
        ItemManager { items: Vec::with_capacity(max_items), max_items, lifetime }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Drops a random item on a free cell if there is room for one more.
    pub fn generate<M, R>(
        &mut self,
        map: &GameMap,
        mover: &M,
        now: Duration,
        rng: &mut R,
    ) -> Option<Item>
    where
        M: Mover + ?Sized,
        R: Rng + ?Sized,
    {
        if self.items.len() >= self.max_items {
            return None;
        }

        let position = self.find_empty_position(map, mover, rng)?;
        let kind = ItemKind::ALL[rng.gen_range(0..ItemKind::ALL.len())];
        self.add(position, kind, now)
    }

    pub fn add(&mut self, position: Position, kind: ItemKind, now: Duration) -> Option<Item> {
        if self.items.len() >= self.max_items {
            return None;
        }

        let item = Item { position, kind, created_at: now, lifetime: self.lifetime };
        self.items.push(item);
        debug!("spawned {:?} at {:?}", kind, position);
        Some(item)
    }

    pub fn remove_expired(&mut self, now: Duration) {
        self.items.retain(|item| !item.is_expired(now));
    }

    /// Removes and returns the item under the mover's head.
    pub fn check_collision<M: Mover + ?Sized>(&mut self, mover: &M) -> Option<Item> {
        let head = mover.head();
        let index = self.items.iter().position(|item| item.position == head)?;
        Some(self.items.remove(index))
    }

    pub fn stamp(&self, map: &mut GameMap) {
        for item in &self.items {
            if map.is_empty(item.position) {
                map.set(item.position, item.kind.cell());
            }
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    ///////////////////////////////////////////////////////////////////////////

    fn find_empty_position<M, R>(&self, map: &GameMap, mover: &M, rng: &mut R) -> Option<Position>
    where
        M: Mover + ?Sized,
        R: Rng + ?Sized,
    {
        if map.width() < 3 || map.height() < 3 {
            return None;
        }

        (0..SPAWN_ATTEMPTS)
            .map(|_| {
                let x = rng.gen_range(1..map.width() - 1);
                Position::new(x, rng.gen_range(1..map.height() - 1))
            })
            .find(|pos| self.is_position_valid(map, mover, *pos))
    }

    fn is_position_valid<M>(&self, map: &GameMap, mover: &M, pos: Position) -> bool
    where
        M: Mover + ?Sized,
    {
        map.is_interior(pos)
            && map.is_empty(pos)
            && !mover.occupies(pos)
            && !self.items.iter().any(|item| item.position == pos)
    }
}
