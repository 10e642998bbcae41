//! Seed types for initializing Game of Life simulations.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{FormatError, LoadError, Pattern, PatternLibrary};
use crate::compute::Grid;

/// Initial grid contents for a simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    /// Pattern to use for seeding.
    pub pattern: SeedPattern,
    /// Top-left grid position of the pattern. `None` centres its bounding
    /// box. Ignored for patterns that cover the whole grid.
    #[serde(default)]
    pub position: Option<(i64, i64)>,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            pattern: SeedPattern::Library {
                name: "Glider loop".to_string(),
            },
            position: None,
        }
    }
}

/// Initial cell configurations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SeedPattern {
    /// A pattern from the built-in library, by name.
    Library { name: String },
    /// Inline RLE text.
    Rle { text: String },
    /// RLE file on disk.
    File { path: PathBuf },
    /// Uniform random soup covering the whole grid.
    Random {
        /// Probability of a cell starting alive (0.0-1.0).
        density: f64,
        /// Random seed.
        seed: u64,
    },
    /// Explicit live cell coordinates, relative to the seed position.
    Cells { cells: Vec<(usize, usize)> },
}

/// Errors produced while building the initial grid.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Grid dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("No library pattern named {0:?}")]
    UnknownPattern(String),
    #[error("Random density must be within 0.0..=1.0, got {0}")]
    InvalidDensity(f64),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl Seed {
    /// Seed with a library pattern placed at the centre of the grid.
    pub fn library(name: impl Into<String>) -> Self {
        Self {
            pattern: SeedPattern::Library { name: name.into() },
            position: None,
        }
    }

    /// Generate the initial grid.
    pub fn generate(
        &self,
        width: usize,
        height: usize,
        library: &PatternLibrary,
    ) -> Result<Grid, SeedError> {
        if width == 0 || height == 0 {
            return Err(SeedError::InvalidDimensions { width, height });
        }
        let mut grid = Grid::new(width, height);

        match &self.pattern {
            SeedPattern::Library { name } => {
                let entry = library
                    .find(name)
                    .ok_or_else(|| SeedError::UnknownPattern(name.clone()))?;
                self.place(&mut grid, &entry.pattern);
            }
            SeedPattern::Rle { text } => {
                let pattern = Pattern::decode(text)?;
                self.place(&mut grid, &pattern);
            }
            SeedPattern::File { path } => {
                let pattern = Pattern::from_file(path)?;
                self.place(&mut grid, &pattern);
            }
            SeedPattern::Random { density, seed } => {
                if !(0.0..=1.0).contains(density) {
                    return Err(SeedError::InvalidDensity(*density));
                }
                let mut rng = StdRng::seed_from_u64(*seed);
                let cells = (0..width * height).map(|_| rng.gen_bool(*density)).collect();
                grid = Grid::from_cells(width, height, cells);
            }
            SeedPattern::Cells { cells } => {
                let (x0, y0) = match self.position {
                    Some(position) => position,
                    None => {
                        let box_width = cells.iter().map(|&(x, _)| x + 1).max().unwrap_or(0);
                        let box_height = cells.iter().map(|&(_, y)| y + 1).max().unwrap_or(0);
                        grid.centered_origin(box_width, box_height)
                    }
                };
                for &(x, y) in cells {
                    let gx = x0 + x as i64;
                    let gy = y0 + y as i64;
                    if (0..width as i64).contains(&gx) && (0..height as i64).contains(&gy) {
                        grid.set(gx as usize, gy as usize, true);
                    }
                }
            }
        }

        Ok(grid)
    }

    fn place(&self, grid: &mut Grid, pattern: &Pattern) {
        match self.position {
            Some((x, y)) => grid.stamp(pattern, x, y),
            None => grid.stamp_centered(pattern),
        }
    }
}
