//! Compute module - Evolution and pattern scanning for Game of Life.

mod evolution;
mod grid;
mod scanner;
mod simulation;

pub use evolution::*;
pub use grid::*;
pub use scanner::*;
pub use simulation::*;
