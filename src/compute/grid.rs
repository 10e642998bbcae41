//! Fixed-size boolean cell grid.

use std::fmt;

use crate::schema::Pattern;

/// One generation of cell states.
///
/// Cells are stored row-major: `(x, y)` lives at `y * width + x`. Dimensions
/// are fixed at construction; cells outside the grid are treated as dead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Create an all-dead grid.
    ///
    /// # Panics
    /// Panics if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be non-zero");
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Create a grid from row-major cell states.
    ///
    /// # Panics
    /// Panics if either dimension is zero or `cells.len() != width * height`.
    pub fn from_cells(width: usize, height: usize, cells: Vec<bool>) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be non-zero");
        assert_eq!(cells.len(), width * height, "cell count does not match dimensions");
        Self {
            width,
            height,
            cells,
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

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; grids have at least one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Convert (x, y) coordinates to flat index.
    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Row-major cell states.
    #[inline]
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [bool] {
        &mut self.cells
    }

    /// Cell state at (x, y); dead outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[self.idx(x, y)]
    }

    /// Set the cell at (x, y).
    ///
    /// # Panics
    /// Panics if (x, y) is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        assert!(x < self.width && y < self.height, "cell ({x}, {y}) out of bounds");
        let idx = self.idx(x, y);
        self.cells[idx] = alive;
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    /// Copy a pattern's bounding box into the grid with its top-left corner
    /// at (x, y). Cells falling outside the grid are dropped.
    pub fn stamp(&mut self, pattern: &Pattern, x: i64, y: i64) {
        for (py, row) in pattern.rows().iter().enumerate() {
            let gy = y + py as i64;
            if gy < 0 || gy >= self.height as i64 {
                continue;
            }
            for (px, &alive) in row.iter().enumerate() {
                let gx = x + px as i64;
                if gx < 0 || gx >= self.width as i64 {
                    continue;
                }
                let idx = self.idx(gx as usize, gy as usize);
                self.cells[idx] = alive;
            }
        }
    }

    /// Top-left position that centres a `width` x `height` box in this grid.
    /// May be negative when the box is larger than the grid.
    pub fn centered_origin(&self, width: usize, height: usize) -> (i64, i64) {
        (
            (self.width / 2) as i64 - (width / 2) as i64,
            (self.height / 2) as i64 - (height / 2) as i64,
        )
    }

    /// Copy a pattern into the centre of the grid.
    pub fn stamp_centered(&mut self, pattern: &Pattern) {
        let (x, y) = self.centered_origin(pattern.width(), pattern.height());
        self.stamp(pattern, x, y);
    }

    /// New grid of a different size keeping the overlapping top-left region.
    pub fn resized(&self, width: usize, height: usize) -> Self {
        let mut grid = Self::new(width, height);
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                let idx = grid.idx(x, y);
                grid.cells[idx] = self.cells[self.idx(x, y)];
            }
        }
        grid
    }
}

impl fmt::Display for Grid {
    /// Renders live cells as `o` and dead cells as `.`, one line per row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for &alive in row {
                f.write_str(if alive { "o" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl Grid {
    /// Build a grid from lines of `o` (alive) and `.` (dead).
    pub(crate) fn from_picture(picture: &str) -> Self {
        let rows: Vec<&str> = picture
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let width = rows[0].len();
        let cells = rows
            .iter()
            .flat_map(|row| {
                assert_eq!(row.len(), width, "ragged picture");
                row.chars().map(|c| c == 'o')
            })
            .collect();
        Self::from_cells(width, rows.len(), cells)
    }
}
