pub mod body;
pub mod constants;
pub mod engine;
pub mod input;
pub mod scoreboard;
pub mod shots;
pub mod state;
pub mod systems;
pub mod tables;
pub mod terrain;
pub mod weapons;
