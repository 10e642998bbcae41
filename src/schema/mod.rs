//! Schema module - Patterns, configuration and seeding types for Game of Life simulations.

mod config;
mod library;
mod rle;
mod seed;

pub use config::*;
pub use library::*;
pub use rle::*;
pub use seed::*;
