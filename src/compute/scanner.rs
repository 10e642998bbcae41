//! Parallel recognition of library patterns in a grid.
//!
//! The flattened cell range is split into one contiguous chunk per worker.
//! Each worker treats every cell of its chunk as a top-left anchor and
//! records which library patterns match the grid there. Matches are then
//! claimed in anchor order (ties broken by library order): a match is kept
//! only if none of its footprint cells were claimed before, so the first
//! eligible pattern wins and no cell ever carries two ids. The result does
//! not depend on the number of workers.

use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;

use super::Grid;
use crate::schema::{Pattern, PatternId, PatternLibrary, UNMARKED};

/// Per-cell pattern ids produced by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    width: usize,
    height: usize,
    cells: Vec<PatternId>,
}

impl Overlay {
    /// Create an overlay with every cell unmarked.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![UNMARKED; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major ids, [`UNMARKED`] where no pattern was found.
    #[inline]
    pub fn cells(&self) -> &[PatternId] {
        &self.cells
    }

    /// Pattern id at (x, y), if the cell belongs to a recognized pattern.
    pub fn get(&self, x: usize, y: usize) -> Option<PatternId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.mark_at(y * self.width + x)
    }

    /// Pattern id at a flat index.
    #[inline]
    pub fn mark_at(&self, idx: usize) -> Option<PatternId> {
        self.cells.get(idx).copied().filter(|&id| id != UNMARKED)
    }

    #[inline]
    pub fn is_marked(&self, idx: usize) -> bool {
        self.mark_at(idx).is_some()
    }

    /// Number of cells carrying any pattern id.
    pub fn marked_count(&self) -> usize {
        self.cells.iter().filter(|&&id| id != UNMARKED).count()
    }

    /// Number of cells carrying `id`.
    pub fn count_of(&self, id: PatternId) -> usize {
        self.cells.iter().filter(|&&cell| cell == id).count()
    }

    /// Number of recognized instances of each library pattern, in library order.
    ///
    /// Every claim tags a pattern's whole bounding box, so the instance count
    /// is the tagged cell count divided by the pattern's area.
    pub fn instances(&self, library: &PatternLibrary) -> Vec<(PatternId, usize)> {
        let mut tagged = vec![0usize; library.len() + 1];
        for &id in &self.cells {
            if let Some(slot) = tagged.get_mut(id as usize) {
                *slot += 1;
            }
        }

        library
            .iter()
            .map(|entry| (entry.id, tagged[entry.id as usize] / entry.pattern.area()))
            .collect()
    }

    /// Reset every cell to [`UNMARKED`].
    pub fn clear(&mut self) {
        self.cells.fill(UNMARKED);
    }

    /// Tag a `width` x `height` footprint at (x, y) with `id` if none of its
    /// cells is marked yet. Returns whether the claim succeeded.
    fn claim(&mut self, x: usize, y: usize, width: usize, height: usize, id: PatternId) -> bool {
        let rows = y..y + height;
        let free = rows.clone().all(|row| {
            let start = row * self.width + x;
            self.cells[start..start + width]
                .iter()
                .all(|&cell| cell == UNMARKED)
        });
        if !free {
            return false;
        }

        for row in rows {
            let start = row * self.width + x;
            self.cells[start..start + width].fill(id);
        }
        true
    }
}

/// A pattern whose footprint matches the grid at an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    x: usize,
    y: usize,
    id: PatternId,
}

/// Pattern scan errors.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Failed to build scanner thread pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("Scanner worker panicked: {0}")]
    WorkerPanicked(String),
    #[error("Overlay is {overlay:?} but the grid is {grid:?}")]
    DimensionMismatch {
        overlay: (usize, usize),
        grid: (usize, usize),
    },
}

/// Chunk-partitioned pattern scanner backed by its own worker pool.
pub struct PatternScanner {
    pool: rayon::ThreadPool,
}

impl PatternScanner {
    /// Create a scanner with `workers` threads; 0 uses the available
    /// hardware parallelism.
    pub fn new(workers: usize) -> Result<Self, ScanError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("scan-worker-{index}"))
            .build()?;
        Ok(Self { pool })
    }

    /// Number of workers (and chunks) used per scan.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Scan `grid` for every pattern in `library`.
    pub fn scan(&self, grid: &Grid, library: &PatternLibrary) -> Result<Overlay, ScanError> {
        let mut overlay = Overlay::new(grid.width(), grid.height());
        self.scan_into(grid, library, &mut overlay)?;
        Ok(overlay)
    }

    /// Scan into a caller-owned overlay, which is cleared first.
    ///
    /// If a worker panics the overlay is left cleared rather than partially
    /// written.
    pub fn scan_into(
        &self,
        grid: &Grid,
        library: &PatternLibrary,
        overlay: &mut Overlay,
    ) -> Result<(), ScanError> {
        if overlay.width != grid.width() || overlay.height != grid.height() {
            return Err(ScanError::DimensionMismatch {
                overlay: (overlay.width, overlay.height),
                grid: (grid.width(), grid.height()),
            });
        }
        overlay.clear();

        let chunks = chunk_ranges(grid.len(), self.workers());
        let per_chunk: Vec<Vec<Candidate>> = self.run_workers(|| {
            chunks
                .par_iter()
                .map(|anchors| find_candidates(grid, library, anchors.clone()))
                .collect()
        })?;

        let mut claimed = 0usize;
        let mut found = 0usize;
        for candidate in per_chunk.iter().flatten() {
            found += 1;
            let Some(entry) = library.get(candidate.id) else {
                continue;
            };
            let pattern = &entry.pattern;
            if overlay.claim(
                candidate.x,
                candidate.y,
                pattern.width(),
                pattern.height(),
                candidate.id,
            ) {
                claimed += 1;
            }
        }
        log::trace!(
            "Scanned {} cells in {} chunks: {found} matches, {claimed} claimed",
            grid.len(),
            chunks.len()
        );

        Ok(())
    }

    /// Run parallel work on the pool, turning a worker panic into an error.
    fn run_workers<T, F>(&self, work: F) -> Result<T, ScanError>
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        panic::catch_unwind(AssertUnwindSafe(|| self.pool.install(work)))
            .map_err(|payload| ScanError::WorkerPanicked(panic_message(payload.as_ref())))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Split `0..len` into `jobs` contiguous ranges.
///
/// Every range has `len / jobs` indices and the first `len % jobs` ranges get
/// one more, so the ranges cover `0..len` with no gaps or overlaps. Empty
/// ranges (when `len < jobs`) are omitted.
pub fn chunk_ranges(len: usize, jobs: usize) -> Vec<Range<usize>> {
    let jobs = jobs.max(1);
    let base = len / jobs;
    let extra = len % jobs;

    let mut start = 0;
    (0..jobs)
        .map(|job| {
            let size = base + usize::from(job < extra);
            let range = start..start + size;
            start += size;
            range
        })
        .filter(|range| !range.is_empty())
        .collect()
}

/// Every (anchor, pattern) match within a chunk of anchors, in anchor order
/// and then library order.
fn find_candidates(grid: &Grid, library: &PatternLibrary, anchors: Range<usize>) -> Vec<Candidate> {
    let width = grid.width();
    let mut found = Vec::new();

    for anchor in anchors {
        let (x, y) = (anchor % width, anchor / width);
        for entry in library {
            if footprint_matches(grid, &entry.pattern, x, y) {
                found.push(Candidate { x, y, id: entry.id });
            }
        }
    }

    found
}

/// Whether the pattern's bounding box anchored at (x, y) lies inside the grid
/// and equals the grid cell for cell. Footprints never wrap across rows.
fn footprint_matches(grid: &Grid, pattern: &Pattern, x: usize, y: usize) -> bool {
    if x + pattern.width() > grid.width() || y + pattern.height() > grid.height() {
        return false;
    }

    let cells = grid.cells();
    pattern.rows().iter().enumerate().all(|(py, row)| {
        let start = grid.idx(x, y + py);
        cells[start..start + row.len()] == row[..]
    })
}
