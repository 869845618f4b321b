use std::time::Duration;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::gate::{Gate, GateRole, TransitState, WallClass};
use crate::map::{Cell, Edge, GameMap, Position};
use crate::snake::{Direction, Mover};

/// Only one portal pair is ever open at a time.
pub const MAX_PAIRS: usize = 1;

/// Where and which way the mover leaves the paired gate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Exit {
    pub position: Position,
    pub direction: Direction,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transit {
    /// A free cell next to the paired gate.
    Clear(Exit),
    /// Every candidate cell around the paired gate is taken.
    Blocked { paired: Position },
    /// The struck gate has no partner.
    Unpaired,
}

pub struct GateManager {
    gates: Vec<Gate>,
    next_pair_id: u32,
}

impl GateManager {
    pub fn new() -> Self {
        GateManager { gates: Vec::with_capacity(MAX_PAIRS * 2), next_pair_id: 1 }
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    pub fn pair_count(&self) -> usize {
        let mut ids: Vec<u32> = self.gates.iter().map(Gate::pair_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    pub fn gate_at(&self, pos: Position) -> Option<&Gate> {
        self.gates.iter().find(|gate| gate.position() == pos)
    }

    pub fn paired_gate(&self, gate: &Gate) -> Option<&Gate> {
        self.gates
            .iter()
            .find(|other| other.pair_id() == gate.pair_id() && other.position() != gate.position())
    }

    /// Opens a new pair on two random wall cells, returning its id.
    ///
    /// Nothing happens while a pair is already open or while the mover is
    /// passing through a gate. Any leftover gate is turned back into its wall
    /// before new cells are drawn.
    pub fn generate_gates<M, R>(
        &mut self,
        map: &mut GameMap,
        mover: &M,
        now: Duration,
        rng: &mut R,
    ) -> Option<u32>
    where
        M: Mover + ?Sized,
        R: Rng + ?Sized,
    {
        if self.gates.len() >= MAX_PAIRS * 2 || self.gates.iter().any(Gate::in_transit) {
            return None;
        }

        if !self.gates.is_empty() {
            self.restore_all_to_walls(map);
        }

        let candidates = self.wall_candidates(map, mover);
        if candidates.len() < 2 {
            return None;
        }

        let entrance = *candidates.choose(rng)?;
        let entrance_outer = wall_class(map, entrance) == WallClass::Outer;

        let exits: Vec<Position> = candidates
            .iter()
            .copied()
            .filter(|&pos| pos != entrance)
            .filter(|&pos| !(entrance_outer && map.same_outer_wall(entrance, pos)))
            .collect();
        let exit = *exits.choose(rng)?;

        self.place_pair(map, entrance, exit, now)
    }

    /// Closes every expired gate that nobody is passing through. Returns how
    /// many were closed.
    pub fn remove_expired_gates(&mut self, map: &mut GameMap, now: Duration) -> usize {
        let before = self.gates.len();

        self.gates.retain(|gate| {
            if gate.is_expired(now) && !gate.in_transit() {
                map.set(gate.position(), gate.original());
                debug!("gate {:?} of pair {} expired", gate.position(), gate.pair_id());
                false
            } else {
                true
            }
        });

        before - self.gates.len()
    }

    /// Turns every gate back into the wall it replaced.
    pub fn restore_all_to_walls(&mut self, map: &mut GameMap) {
        for gate in self.gates.drain(..) {
            map.set(gate.position(), gate.original());
        }
    }

    /// Repaints the gate markers.
    pub fn stamp(&self, map: &mut GameMap) {
        for gate in &self.gates {
            map.set(gate.position(), Cell::Gate);
        }
    }

    pub fn check_collision<M: Mover + ?Sized>(&self, mover: &M) -> Option<&Gate> {
        self.gate_at(mover.head())
    }

    /// Flags the gate at `pos` as being passed through. Returns `false` if no
    /// gate sits there.
    pub fn set_entering(&mut self, pos: Position, entering: bool) -> bool {
        let state = if entering { TransitState::InTransit } else { TransitState::Idle };

        match self.gates.iter_mut().find(|gate| gate.position() == pos) {
            Some(gate) => {
                gate.set_transit(state);
                true
            }
            None => false,
        }
    }

    pub fn is_entering(&self, pos: Position) -> bool {
        self.gate_at(pos).map_or(false, Gate::in_transit)
    }

    /// Direction the mover should leave with after striking `gate` while
    /// facing `facing`.
    pub fn exit_direction(&self, map: &GameMap, gate: &Gate, facing: Direction) -> Direction {
        match gate.wall() {
            WallClass::Outer => Self::outer_exit_direction(map, gate.position(), facing),
            WallClass::Inner => Self::inner_direction_priority(facing)[0],
        }
    }

    /// Outer gates always point back into the board. `fallback` is returned
    /// for cells off the outer ring.
    pub fn outer_exit_direction(map: &GameMap, pos: Position, fallback: Direction) -> Direction {
        match map.outer_edges(pos).first() {
            Some(Edge::Top) => Direction::Down,
            Some(Edge::Bottom) => Direction::Up,
            Some(Edge::Left) => Direction::Right,
            Some(Edge::Right) => Direction::Left,
            None => fallback,
        }
    }

    pub fn inner_direction_priority(entry: Direction) -> [Direction; 4] {
        [entry, entry.clockwise(), entry.counterclockwise(), entry.opposite()]
    }

    /// Fixed answers for inner gates whose exit corridor runs along a single
    /// axis. Not used by [`GateManager::resolve_transit`].
    pub fn apply_inner_wall_special_rules(entry: Direction, horizontal_exit: bool) -> Direction {
        use Direction::*;

        match (horizontal_exit, entry) {
            (true, Right) => Right,
            (true, Down | Left | Up) => Left,
            (false, Right | Up) => Up,
            (false, Left | Down) => Down,
        }
    }

    /// Finds the cell next to the partner of `gate` that the mover should
    /// land on, trying directions in priority order.
    pub fn resolve_transit<M: Mover + ?Sized>(
        &self,
        map: &GameMap,
        gate: &Gate,
        direction: Direction,
        mover: &M,
    ) -> Transit {
        let Some(paired) = self.paired_gate(gate) else {
            return Transit::Unpaired;
        };

        let candidates = match paired.wall() {
            WallClass::Outer => vec![Self::outer_exit_direction(map, paired.position(), direction)],
            WallClass::Inner => Self::inner_direction_priority(direction).to_vec(),
        };

        for dir in candidates {
            let cell = paired.position().step(dir);
            if map.is_empty(cell) && !mover.occupies(cell) {
                return Transit::Clear(Exit { position: cell, direction: dir });
            }
        }

        Transit::Blocked { paired: paired.position() }
    }

    /// Position-only view of [`GateManager::resolve_transit`]: a blocked exit
    /// falls back to the partner's own cell, a missing partner gives `None`.
    pub fn calculate_bidirectional_exit_position<M: Mover + ?Sized>(
        &self,
        map: &GameMap,
        gate: &Gate,
        direction: Direction,
        mover: &M,
    ) -> Option<Position> {
        match self.resolve_transit(map, gate, direction, mover) {
            Transit::Clear(exit) => Some(exit.position),
            Transit::Blocked { paired } => Some(paired),
            Transit::Unpaired => None,
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn wall_candidates<M: Mover + ?Sized>(&self, map: &GameMap, mover: &M) -> Vec<Position> {
        map.positions()
            .filter(|&pos| map.get(pos).map_or(false, Cell::is_wall))
            .filter(|&pos| !map.is_corner(pos))
            .filter(|&pos| !mover.occupies(pos))
            .filter(|&pos| self.gate_at(pos).is_none())
            .collect()
    }

    /// Opens a pair on two chosen wall cells.
    pub(crate) fn place_pair(
        &mut self,
        map: &mut GameMap,
        entrance: Position,
        exit: Position,
        now: Duration,
    ) -> Option<u32> {
        let entrance_original = map.get(entrance)?;
        let exit_original = map.get(exit)?;

        let pair_id = self.next_pair_id;
        self.next_pair_id += 1;

        for (pos, role, original) in [
            (entrance, GateRole::Entrance, entrance_original),
            (exit, GateRole::Exit, exit_original),
        ] {
            self.gates.push(Gate::new(pos, role, wall_class(map, pos), pair_id, original, now));
            map.set(pos, Cell::Gate);
        }

        debug!("opened gate pair {} between {:?} and {:?}", pair_id, entrance, exit);
        Some(pair_id)
    }
}

fn wall_class(map: &GameMap, pos: Position) -> WallClass {
    if map.is_outer(pos) {
        WallClass::Outer
    } else {
        WallClass::Inner
    }
}
