//! Generation stepping for Conway's Game of Life (B3/S23).
//!
//! The grid is zero-padded: neighbours outside the grid count as dead, so
//! nothing wraps around the edges. Every step reads only the previous
//! generation, never partially updated cells.

use rayon::prelude::*;

use super::Grid;

/// Moore neighbourhood offsets as (dx, dy).
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Count live cells among the 8 neighbours of (x, y).
#[inline]
pub fn neighbor_count(grid: &Grid, x: usize, y: usize) -> u8 {
    let width = grid.width() as isize;
    let height = grid.height() as isize;
    let cells = grid.cells();

    let mut count = 0;
    for (dx, dy) in NEIGHBOR_OFFSETS {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        if nx < 0 || nx >= width || ny < 0 || ny >= height {
            continue;
        }
        if cells[(ny * width + nx) as usize] {
            count += 1;
        }
    }
    count
}

/// B3/S23: survive on 2 or 3 neighbours, birth on exactly 3.
#[inline]
pub fn next_state(alive: bool, neighbors: u8) -> bool {
    matches!((alive, neighbors), (true, 2) | (_, 3))
}

/// Compute the next generation.
pub fn step(grid: &Grid) -> Grid {
    let mut next = Grid::new(grid.width(), grid.height());
    step_into(grid, &mut next);
    next
}

/// Compute the next generation into a pre-allocated grid of the same size.
///
/// # Panics
/// Panics if `target` and `source` differ in width or height.
pub fn step_into(source: &Grid, target: &mut Grid) {
    assert_same_size(source, target);

    let width = source.width();
    for (y, row) in target.cells_mut().chunks_mut(width).enumerate() {
        evolve_row(source, y, row);
    }
}

/// Compute the next generation with rows spread across the rayon pool.
///
/// Produces exactly the same grid as [`step`].
pub fn step_parallel(grid: &Grid) -> Grid {
    let mut next = Grid::new(grid.width(), grid.height());
    step_parallel_into(grid, &mut next);
    next
}

/// Parallel variant of [`step_into`].
///
/// # Panics
/// Panics if `target` and `source` differ in width or height.
pub fn step_parallel_into(source: &Grid, target: &mut Grid) {
    assert_same_size(source, target);

    let width = source.width();
    target
        .cells_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| evolve_row(source, y, row));
}

fn assert_same_size(source: &Grid, target: &Grid) {
    assert_eq!(
        (source.width(), source.height()),
        (target.width(), target.height()),
        "target grid must match the source dimensions"
    );
}

fn evolve_row(source: &Grid, y: usize, row: &mut [bool]) {
    let cells = source.cells();
    let offset = y * source.width();
    for (x, cell) in row.iter_mut().enumerate() {
        *cell = next_state(cells[offset + x], neighbor_count(source, x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_next_state_rule() {
        for n in 0..=8 {
            assert_eq!(next_state(true, n), n == 2 || n == 3, "live with {n}");
            assert_eq!(next_state(false, n), n == 3, "dead with {n}");
        }
    }

    #[test]
    fn test_neighbor_count_zero_padded() {
        let grid = Grid::from_picture(
            "ooo
             ooo
             ooo",
        );

        assert_eq!(neighbor_count(&grid, 1, 1), 8);
        assert_eq!(neighbor_count(&grid, 0, 0), 3);
        assert_eq!(neighbor_count(&grid, 1, 0), 5);
        assert_eq!(neighbor_count(&grid, 2, 2), 3);
    }

    #[test]
    fn test_empty_grid_stays_empty() {
        let grid = Grid::new(16, 9);
        assert_eq!(step(&grid), grid);
    }

    #[test]
    fn test_lone_cell_dies() {
        let mut grid = Grid::new(5, 5);
        grid.set(2, 2, true);

        assert_eq!(step(&grid).population(), 0);
    }

    #[test]
    fn test_block_is_still() {
        let block = Grid::from_picture(
            "....
             .oo.
             .oo.
             ....",
        );
        assert_eq!(step(&block), block);

        // Touching the boundary does not matter for a block
        let tight = Grid::from_picture(
            "oo
             oo",
        );
        assert_eq!(step(&tight), tight);
    }

    #[test]
    fn test_blinker_period_two() {
        let blinker = Grid::from_picture(
            ".....
             .....
             .ooo.
             .....
             .....",
        );
        let vertical = Grid::from_picture(
            ".....
             ..o..
             ..o..
             ..o..
             .....",
        );

        let once = step(&blinker);
        assert_eq!(once, vertical);
        assert_ne!(once, blinker);
        assert_eq!(step(&once), blinker);
    }

    #[test]
    fn test_glider_translates() {
        let grid = Grid::from_picture(
            ".o....
             ..o...
             ooo...
             ......
             ......
             ......",
        );
        let expected = Grid::from_picture(
            "......
             ..o...
             ...o..
             .ooo..
             ......
             ......",
        );

        let mut current = grid;
        for _ in 0..4 {
            current = step(&current);
        }
        assert_eq!(current, expected);
    }

    #[test]
    fn test_edge_does_not_wrap() {
        // A blinker against the left edge would gain a neighbour on a torus
        let grid = Grid::from_picture(
            "o...o
             o...o
             o...o",
        );
        let next = step(&grid);

        assert_eq!(next.to_string(), ".....\noo.oo\n.....\n");
    }

    #[test]
    fn test_step_does_not_mutate_input() {
        let grid = Grid::from_picture(
            ".o.
             .o.
             .o.",
        );
        let copy = grid.clone();
        let _ = step(&grid);
        let _ = step_parallel(&grid);
        assert_eq!(grid, copy);
    }

    #[test]
    fn test_step_into_reuses_buffer() {
        let grid = Grid::from_picture(
            "...
             ooo
             ...",
        );
        let mut target = Grid::from_picture(
            "ooo
             ooo
             ooo",
        );
        step_into(&grid, &mut target);
        assert_eq!(target.to_string(), ".o.\n.o.\n.o.\n");
    }

    #[test]
    #[should_panic(expected = "target grid must match the source dimensions")]
    fn test_step_into_rejects_mismatched_target() {
        let grid = Grid::new(4, 3);
        let mut target = Grid::new(3, 4);
        step_into(&grid, &mut target);
    }

    #[test]
    #[should_panic(expected = "target grid must match the source dimensions")]
    fn test_step_parallel_into_rejects_mismatched_target() {
        let grid = Grid::new(4, 3);
        let mut target = Grid::new(4, 2);
        step_parallel_into(&grid, &mut target);
    }

    fn arb_grid() -> impl Strategy<Value = Grid> {
        (1usize..24, 1usize..24).prop_flat_map(|(w, h)| {
            prop::collection::vec(any::<bool>(), w * h)
                .prop_map(move |cells| Grid::from_cells(w, h, cells))
        })
    }

    proptest! {
        #[test]
        fn prop_parallel_matches_sequential(grid in arb_grid()) {
            prop_assert_eq!(step_parallel(&grid), step(&grid));
        }

        #[test]
        fn prop_isolated_corner_cell_dies(w in 1usize..40, h in 1usize..40, corner in 0usize..4) {
            let mut grid = Grid::new(w, h);
            let x = if corner & 1 == 0 { 0 } else { w - 1 };
            let y = if corner & 2 == 0 { 0 } else { h - 1 };
            grid.set(x, y, true);

            prop_assert!(!step(&grid).get(x, y));
        }

        #[test]
        fn prop_population_bounded_by_births(grid in arb_grid()) {
            // Every live cell in the next generation is live now or has 3 neighbours
            let next = step(&grid);
            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    if next.get(x, y) {
                        prop_assert!(grid.get(x, y) || neighbor_count(&grid, x, y) == 3);
                    }
                }
            }
        }
    }
}
