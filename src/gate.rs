use std::time::Duration;

use crate::map::{Cell, Position};

/// How long a gate stays open, measured on the game clock.
pub const GATE_LIFETIME: Duration = Duration::from_secs(10);

/// Purely cosmetic: transit works the same from either end.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GateRole {
    Entrance,
    Exit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WallClass {
    Outer,
    Inner,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransitState {
    Idle,
    InTransit,
}

/// One end of a portal pair carved into a wall cell.
#[derive(Clone, Debug)]
pub struct Gate {
    position: Position,
    role: GateRole,
    wall: WallClass,
    pair_id: u32,
    original: Cell,
    created_at: Duration,
    transit: TransitState,
}

impl Gate {
    pub fn new(
        position: Position,
        role: GateRole,
        wall: WallClass,
        pair_id: u32,
        original: Cell,
        created_at: Duration,
    ) -> Self {
        Gate { position, role, wall, pair_id, original, created_at, transit: TransitState::Idle }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn role(&self) -> GateRole {
        self.role
    }

    pub fn wall(&self) -> WallClass {
        self.wall
    }

    pub fn is_outer(&self) -> bool {
        self.wall == WallClass::Outer
    }

    pub fn pair_id(&self) -> u32 {
        self.pair_id
    }

    /// The wall this gate replaced.
    pub fn original(&self) -> Cell {
        self.original
    }

    pub fn created_at(&self) -> Duration {
        self.created_at
    }

    pub fn is_expired(&self, now: Duration) -> bool {
        now.saturating_sub(self.created_at) >= GATE_LIFETIME
    }

    pub fn transit(&self) -> TransitState {
        self.transit
    }

    pub fn in_transit(&self) -> bool {
        self.transit == TransitState::InTransit
    }

    pub(crate) fn set_transit(&mut self, transit: TransitState) {
        self.transit = transit;
    }
}
