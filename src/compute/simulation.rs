//! Simulation driver - advances generations and annotates them with pattern scans.
//!
//! The driver owns the grid between calls. Each tick evolves the grid by one
//! generation and, when scanning is enabled, tags recognized patterns. A
//! failed scan only drops that tick's annotation; evolution carries on.

use serde::{Deserialize, Serialize};

use crate::schema::{
    ConfigError, PatternLibrary, Rgb, Seed, SeedError, SimulationConfig,
};

use super::{Grid, Overlay, PatternScanner, ScanError, step_into, step_parallel_into};

/// Errors produced while setting up a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to seed grid: {0}")]
    Seed(#[from] SeedError),
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Game of Life simulation with optional pattern recognition.
pub struct Simulation {
    config: SimulationConfig,
    library: PatternLibrary,
    grid: Grid,
    /// Back buffer for the next generation (swapped each step).
    scratch: Grid,
    scanner: Option<PatternScanner>,
    overlay: Overlay,
    /// Whether `overlay` describes the current generation.
    overlay_current: bool,
    generation: u64,
}

/// One rendered tick: the current grid and, if the scan succeeded, its overlay.
pub struct Frame<'a> {
    pub generation: u64,
    pub grid: &'a Grid,
    pub overlay: Option<&'a Overlay>,
    pub library: &'a PatternLibrary,
}

impl Frame<'_> {
    /// Display colour of the cell at (x, y).
    pub fn color_at(&self, x: usize, y: usize) -> Rgb {
        let mark = self.overlay.and_then(|overlay| overlay.get(x, y));
        self.library.cell_color(self.grid.get(x, y), mark)
    }
}

impl Simulation {
    /// Create a simulation from configuration and seed.
    pub fn new(
        config: SimulationConfig,
        seed: &Seed,
        library: PatternLibrary,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let grid = seed.generate(config.width, config.height, &library)?;
        Self::from_grid(config, grid, library)
    }

    /// Create a simulation starting from an existing grid.
    ///
    /// The grid's dimensions take precedence over the configured ones.
    pub fn from_grid(
        mut config: SimulationConfig,
        grid: Grid,
        library: PatternLibrary,
    ) -> Result<Self, SimulationError> {
        config.width = grid.width();
        config.height = grid.height();
        config.validate()?;

        let scanner = if config.scan.enabled {
            let scanner = PatternScanner::new(config.scan.workers)?;
            log::debug!("Pattern scanner using {} workers", scanner.workers());
            Some(scanner)
        } else {
            None
        };

        Ok(Self {
            scratch: Grid::new(grid.width(), grid.height()),
            overlay: Overlay::new(grid.width(), grid.height()),
            config,
            library,
            grid,
            scanner,
            overlay_current: false,
            generation: 0,
        })
    }

    /// Advance one generation.
    pub fn step(&mut self) {
        if self.config.parallel_evolution {
            step_parallel_into(&self.grid, &mut self.scratch);
        } else {
            step_into(&self.grid, &mut self.scratch);
        }
        std::mem::swap(&mut self.grid, &mut self.scratch);
        self.overlay_current = false;
        self.generation += 1;
    }

    /// Advance `steps` generations without scanning.
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Scan the current grid, replacing the stored overlay.
    ///
    /// Returns `Ok(None)` when scanning is disabled.
    pub fn scan(&mut self) -> Result<Option<&Overlay>, ScanError> {
        let Some(scanner) = &self.scanner else {
            return Ok(None);
        };
        scanner.scan_into(&self.grid, &self.library, &mut self.overlay)?;
        self.overlay_current = true;
        Ok(Some(&self.overlay))
    }

    /// Advance one generation and scan it.
    pub fn tick(&mut self) -> Frame<'_> {
        self.step();

        if let Err(err) = self.scan() {
            log::warn!(
                "Pattern scan failed at generation {}: {err}",
                self.generation
            );
        }

        self.frame()
    }

    /// Current generation with its overlay, if the last scan covered it.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            generation: self.generation,
            grid: &self.grid,
            overlay: self.overlay_current.then_some(&self.overlay),
            library: &self.library,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Get configuration reference.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

/// Number of recognized instances of one library pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCount {
    pub name: String,
    pub count: usize,
}

/// Simulation statistics for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationStats {
    pub generation: u64,
    pub population: usize,
    pub marked_cells: usize,
    /// Per-pattern instance counts; empty when the frame has no overlay.
    pub instances: Vec<PatternCount>,
}

impl SimulationStats {
    /// Compute statistics from a frame.
    pub fn from_frame(frame: &Frame<'_>) -> Self {
        let (marked_cells, instances) = match frame.overlay {
            Some(overlay) => (
                overlay.marked_count(),
                overlay
                    .instances(frame.library)
                    .into_iter()
                    .filter_map(|(id, count)| {
                        frame.library.get(id).map(|entry| PatternCount {
                            name: entry.pattern.name().to_string(),
                            count,
                        })
                    })
                    .collect(),
            ),
            None => (0, Vec::new()),
        };

        Self {
            generation: frame.generation,
            population: frame.grid.population(),
            marked_cells,
            instances,
        }
    }

    /// Total recognized instances across all patterns.
    pub fn total_instances(&self) -> usize {
        self.instances.iter().map(|p| p.count).sum()
    }
}
