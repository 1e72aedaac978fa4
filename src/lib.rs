//! Worms Arena Server Library
//!
//! A tick-driven simulation of worms fighting in a destructible grid
//! world, plus the fixed-period session that runs it.

pub mod config;
pub mod game;
pub mod server;
pub mod util;
