//! Uniform grid partition of the arena
//!
//! The grid is a transient index: it is cleared and refilled every step and
//! never owns bubbles. Cells hold registry slot indices, which stay valid from
//! the broad phase until the next lifecycle pass reorders the registry.

use super::geometry::Aabb;
use crate::consts::{CELL_DIAMETERS, MAX_GRID_CELLS};
use crate::error::{Error, Result};

/// Column/row address of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    /// Column index
    pub x: u32,
    /// Row index
    pub y: u32,
}

impl CellCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Rows x columns partition of an arena
#[derive(Debug, Clone)]
pub struct Grid {
    rows: u32,
    columns: u32,
    cell_width: f64,
    cell_height: f64,
    /// Column-major cell contents (`x * rows + y`)
    cells: Vec<Vec<usize>>,
}

impl Grid {
    /// Partition `arena` into `rows x columns` cells
    pub fn new(arena: &Aabb, rows: u32, columns: u32) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(Error::DegenerateGrid { rows, columns });
        }
        let count = (rows as usize)
            .checked_mul(columns as usize)
            .filter(|&n| n <= MAX_GRID_CELLS)
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "grid of {rows} x {columns} cells exceeds the limit of {MAX_GRID_CELLS}"
                ))
            })?;
        Ok(Self {
            rows,
            columns,
            cell_width: arena.width() / columns as f64,
            cell_height: arena.height() / rows as f64,
            cells: vec![Vec::new(); count],
        })
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    #[inline]
    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    #[inline]
    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Rectangle covered by cell `(x, y)` within `arena`
    pub fn cell_bounds(&self, arena: &Aabb, x: u32, y: u32) -> Aabb {
        let min_x = arena.min_x + x as f64 * self.cell_width;
        let min_y = arena.min_y + y as f64 * self.cell_height;
        Aabb::new(
            min_x,
            min_x + self.cell_width,
            min_y,
            min_y + self.cell_height,
        )
    }

    /// All cell coordinates, column by column
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.columns).flat_map(move |x| (0..self.rows).map(move |y| CellCoord::new(x, y)))
    }

    /// Registry slots currently in `coord`; empty for coordinates off the grid
    #[inline]
    pub fn cell(&self, coord: CellCoord) -> &[usize] {
        self.index(coord)
            .and_then(|idx| self.cells.get(idx))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[inline]
    pub fn is_occupied(&self, coord: CellCoord) -> bool {
        !self.cell(coord).is_empty()
    }

    /// Number of non-empty cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Empty every cell, keeping allocations
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    pub(crate) fn insert(&mut self, coord: CellCoord, slot: usize) {
        match self.index(coord).and_then(|idx| self.cells.get_mut(idx)) {
            Some(cell) => cell.push(slot),
            None => debug_assert!(false, "cell {coord:?} is off the grid"),
        }
    }

    /// Column range `[first, last]` that a span `[lo, hi]` along x may touch.
    ///
    /// Padded by one cell each side so rounding in the division can never
    /// drop a cell that the exact overlap test would accept. `None` if the
    /// span lies entirely outside the grid.
    pub fn column_span(&self, arena: &Aabb, lo: f64, hi: f64) -> Option<(u32, u32)> {
        span_indices(lo - arena.min_x, hi - arena.min_x, self.cell_width, self.columns)
    }

    /// Row range `[first, last]` that a span `[lo, hi]` along y may touch
    pub fn row_span(&self, arena: &Aabb, lo: f64, hi: f64) -> Option<(u32, u32)> {
        span_indices(lo - arena.min_y, hi - arena.min_y, self.cell_height, self.rows)
    }

    #[inline]
    fn index(&self, coord: CellCoord) -> Option<usize> {
        (coord.x < self.columns && coord.y < self.rows)
            .then(|| coord.x as usize * self.rows as usize + coord.y as usize)
    }
}

fn span_indices(lo: f64, hi: f64, cell: f64, count: u32) -> Option<(u32, u32)> {
    let first = (lo / cell).floor() - 1.0;
    let last = (hi / cell).floor() + 1.0;
    let max = (count - 1) as f64;
    if last < 0.0 || first > max {
        return None;
    }
    Some((first.max(0.0) as u32, last.min(max) as u32))
}

/// Largest square partition whose cells are at least `CELL_DIAMETERS` bubble
/// diameters wide on both axes. May be zero for tiny arenas; `Grid::new`
/// rejects that.
pub fn best_grid_size(arena: &Aabb, bubble_radius: f64) -> (u32, u32) {
    let diameter = bubble_radius * 2.0;
    let x = (arena.width() / diameter / CELL_DIAMETERS).floor();
    let y = (arena.height() / diameter / CELL_DIAMETERS).floor();
    let c = x.min(y).clamp(0.0, u32::MAX as f64) as u32;
    (c, c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Aabb {
        Aabb::new(0.0, 100.0, 0.0, 100.0)
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            Grid::new(&arena(), 0, 2),
            Err(Error::DegenerateGrid { rows: 0, columns: 2 })
        ));
        assert!(Grid::new(&arena(), 2, 0).is_err());
    }

    #[test]
    fn test_oversized_grid_rejected() {
        assert!(matches!(
            Grid::new(&arena(), u32::MAX, u32::MAX),
            Err(Error::InvalidConfig(_))
        ));
        assert!(Grid::new(&arena(), 1025, 1024).is_err());
        assert!(Grid::new(&arena(), 1024, 1024).is_ok());
    }

    #[test]
    fn test_cell_bounds() -> Result<()> {
        let arena = Aabb::new(10.0, 110.0, 100.0, 300.0);
        let grid = Grid::new(&arena, 4, 2)?;
        assert_eq!(grid.cell_width(), 50.0);
        assert_eq!(grid.cell_height(), 50.0);
        let b = grid.cell_bounds(&arena, 1, 3);
        assert_eq!(b, Aabb::new(60.0, 110.0, 250.0, 300.0));
        Ok(())
    }

    #[test]
    fn test_coords_cover_every_cell_once() -> Result<()> {
        let grid = Grid::new(&arena(), 3, 4)?;
        let coords: Vec<_> = grid.coords().collect();
        assert_eq!(coords.len(), 12);
        assert_eq!(coords.len(), grid.cell_count());
        let mut sorted = coords.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 12);
        Ok(())
    }

    #[test]
    fn test_insert_and_clear() -> Result<()> {
        let mut grid = Grid::new(&arena(), 2, 2)?;
        grid.insert(CellCoord::new(1, 0), 7);
        assert!(grid.is_occupied(CellCoord::new(1, 0)));
        assert!(!grid.is_occupied(CellCoord::new(0, 1)));
        assert_eq!(grid.cell(CellCoord::new(1, 0)), &[7]);
        assert_eq!(grid.occupied_count(), 1);
        grid.clear();
        assert_eq!(grid.occupied_count(), 0);
        Ok(())
    }

    #[test]
    fn test_off_grid_cell_is_empty() -> Result<()> {
        let mut grid = Grid::new(&arena(), 2, 2)?;
        grid.insert(CellCoord::new(1, 0), 3);
        // (0, 2) would alias (1, 0) in the flat layout
        assert!(grid.cell(CellCoord::new(0, 2)).is_empty());
        assert!(grid.cell(CellCoord::new(2, 0)).is_empty());
        assert!(!grid.is_occupied(CellCoord::new(5, 5)));
        Ok(())
    }

    #[test]
    fn test_spans_are_padded_and_clamped() -> Result<()> {
        let grid = Grid::new(&arena(), 10, 10)?;
        assert_eq!(grid.column_span(&arena(), 42.0, 48.0), Some((3, 5)));
        assert_eq!(grid.column_span(&arena(), -3.0, 2.0), Some((0, 1)));
        assert_eq!(grid.row_span(&arena(), 95.0, 105.0), Some((8, 9)));
        assert_eq!(grid.row_span(&arena(), 150.0, 160.0), None);
        assert_eq!(grid.row_span(&arena(), -30.0, -20.0), None);
        Ok(())
    }

    #[test]
    fn test_best_grid_size_defaults() {
        let arena = Aabb::new(0.0, 1280.0, 100.0, 700.0);
        // 1280 / 12 / 6 = 17.7, 600 / 12 / 6 = 8.3
        assert_eq!(best_grid_size(&arena, 6.0), (8, 8));
    }

    #[test]
    fn test_best_grid_size_can_be_zero() {
        // 100 / 10 / 6 < 2, 50 / 10 / 6 < 1
        let arena = Aabb::new(0.0, 100.0, 0.0, 50.0);
        assert_eq!(best_grid_size(&arena, 5.0), (0, 0));
    }
}
