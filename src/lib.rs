//! Rules engine for a terminal snake game with stages, timed hazards and
//! paired teleport gates. Rendering and input live in the binary.

pub mod config;
pub mod gate;
pub mod gate_manager;
pub mod item;
pub mod map;
pub mod score;
pub mod snake;
pub mod stage;
pub mod temporary_wall;
pub mod world;
