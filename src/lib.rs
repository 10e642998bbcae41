//! Life Patterns - Conway's Game of Life with library pattern recognition.
//!
//! This crate evolves a bounded Game of Life grid and, after each
//! generation, scans it in parallel for instances of known patterns
//! (still lifes, oscillators, spaceships) so a renderer can colour them.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: RLE patterns, the pattern library, configuration and seeding
//! - `compute`: Grid evolution, the pattern scanner and the simulation driver
//!
//! # Example
//!
//! ```rust,no_run
//! use life_patterns::{
//!     compute::{Simulation, SimulationStats},
//!     schema::{PatternLibrary, Seed, SimulationConfig},
//! };
//!
//! let library = PatternLibrary::builtin()?;
//! let config = SimulationConfig::default();
//! let mut sim = Simulation::new(config, &Seed::library("R-pentomino"), library)?;
//!
//! sim.run(99);
//! let frame = sim.tick();
//! let stats = SimulationStats::from_frame(&frame);
//!
//! println!("Population after 100 generations: {}", stats.population);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{Frame, Grid, Overlay, PatternScanner, Simulation, SimulationStats};
pub use schema::{Pattern, PatternLibrary, Seed, SimulationConfig};
