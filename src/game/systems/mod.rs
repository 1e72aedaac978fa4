//! Per-phase step functions of a simulation tick
//!
//! Each phase module exposes `update(state)`; the engine calls them in a
//! fixed order. `combat` and `spawn` are shared helpers without a phase of
//! their own.

pub mod bullets;
pub mod combat;
pub mod controls;
pub mod decorations;
pub mod explosions;
pub mod forces;
pub mod polyline;
pub mod ropes;
pub mod spawn;
pub mod worms;
