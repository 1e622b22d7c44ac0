//! Side games: fishing and the casino.

pub mod casino;
pub mod fishing;
