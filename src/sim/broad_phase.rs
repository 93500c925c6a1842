//! Broad phase: assign bubbles to every grid cell their circle overlaps
//!
//! Each bubble only visits the cells under its bounding square (plus one cell
//! of padding), and every visited cell is confirmed with the exact inclusive
//! circle/rectangle test. The result is identical to scanning every cell for
//! every bubble, which `partition_exhaustive` still does for verification.

use super::collision::circle_rect_overlap;
use super::grid::CellCoord;
use super::state::World;

/// Rebuild the grid and each bubble's cell memberships.
///
/// Returns the number of (bubble, cell) memberships recorded.
pub fn partition(world: &mut World) -> usize {
    let World {
        arena,
        grid,
        bubbles,
        ..
    } = world;

    grid.clear();
    let mut memberships = 0;

    for (slot, bubble) in bubbles.iter_mut().enumerate() {
        bubble.cells.clear();
        let (pos, r) = (bubble.pos, bubble.radius);

        let Some((x0, x1)) = grid.column_span(arena, pos.x - r, pos.x + r) else {
            continue;
        };
        let Some((y0, y1)) = grid.row_span(arena, pos.y - r, pos.y + r) else {
            continue;
        };

        for x in x0..=x1 {
            for y in y0..=y1 {
                let bounds = grid.cell_bounds(arena, x, y);
                if circle_rect_overlap(pos, r, &bounds) {
                    let coord = CellCoord::new(x, y);
                    grid.insert(coord, slot);
                    bubble.cells.push(coord);
                    memberships += 1;
                }
            }
        }
    }

    check_coverage(world);
    memberships
}

/// Reference broad phase: every cell against every bubble.
///
/// `O(cells * bubbles)`; used to verify `partition`.
pub fn partition_exhaustive(world: &mut World) -> usize {
    let World {
        arena,
        grid,
        bubbles,
        ..
    } = world;

    grid.clear();
    for bubble in bubbles.iter_mut() {
        bubble.cells.clear();
    }

    let mut memberships = 0;
    let coords: Vec<CellCoord> = grid.coords().collect();
    for coord in coords {
        let bounds = grid.cell_bounds(arena, coord.x, coord.y);
        for (slot, bubble) in bubbles.iter_mut().enumerate() {
            if circle_rect_overlap(bubble.pos, bubble.radius, &bounds) {
                grid.insert(coord, slot);
                bubble.cells.push(coord);
                memberships += 1;
            }
        }
    }
    for bubble in bubbles.iter_mut() {
        bubble.cells.sort();
    }
    memberships
}

/// A bubble whose center is inside the arena must land in at least one cell.
/// Anything else is a geometry bug.
fn check_coverage(world: &World) {
    for bubble in &world.bubbles {
        if bubble.cells.is_empty() && world.arena.contains_point(bubble.pos) {
            log::error!(
                "Bubble {:?} at ({}, {}) is inside the arena but in no grid cell",
                bubble.id,
                bubble.pos.x,
                bubble.pos.y
            );
            debug_assert!(false, "bubble inside arena has no grid cell");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::settings::{GridDimensions, SimConfig};
    use glam::DVec2;

    fn world(rows: u32, columns: u32) -> Result<World> {
        World::new(&SimConfig {
            arena_offset_x: 0.0,
            arena_offset_y: 0.0,
            arena_width: 100.0,
            arena_height: 100.0,
            bubble_radius: 5.0,
            max_population: 64,
            grid: Some(GridDimensions { rows, columns }),
            seed: Some(3),
            ..Default::default()
        })
    }

    #[test]
    fn test_bubble_in_one_cell() -> Result<()> {
        let mut world = world(2, 2)?;
        let id = world.insert_bubble(DVec2::new(10.0, 10.0), DVec2::X)?;
        assert_eq!(partition(&mut world), 1);
        let cells = world.bubble(id).map(|b| b.cells.clone()).unwrap_or_default();
        assert_eq!(cells, vec![CellCoord::new(0, 0)]);
        assert_eq!(world.grid().cell(CellCoord::new(0, 0)), &[0]);
        Ok(())
    }

    #[test]
    fn test_bubble_on_boundary_spans_cells() -> Result<()> {
        let mut world = world(2, 2)?;
        let id = world.insert_bubble(DVec2::new(49.0, 50.0), DVec2::X)?;
        partition(&mut world);
        let cells = world.bubble(id).map(|b| b.cells.clone()).unwrap_or_default();
        assert_eq!(cells.len(), 4);
        assert_eq!(world.grid().occupied_count(), 4);
        Ok(())
    }

    #[test]
    fn test_touching_cell_edge_counts() -> Result<()> {
        let mut world = world(2, 2)?;
        // Right edge of the circle lands exactly on x = 50
        let id = world.insert_bubble(DVec2::new(45.0, 25.0), DVec2::X)?;
        partition(&mut world);
        let cells = world.bubble(id).map(|b| b.cells.clone()).unwrap_or_default();
        assert_eq!(cells, vec![CellCoord::new(0, 0), CellCoord::new(1, 0)]);
        Ok(())
    }

    #[test]
    fn test_partition_clears_previous_step() -> Result<()> {
        let mut world = world(2, 2)?;
        let id = world.insert_bubble(DVec2::new(10.0, 10.0), DVec2::X)?;
        partition(&mut world);
        if let Some(b) = world.bubble_mut(id) {
            b.pos = DVec2::new(90.0, 90.0);
        }
        partition(&mut world);
        let cells = world.bubble(id).map(|b| b.cells.clone()).unwrap_or_default();
        assert_eq!(cells, vec![CellCoord::new(1, 1)]);
        assert!(!world.grid().is_occupied(CellCoord::new(0, 0)));
        Ok(())
    }

    #[test]
    fn test_matches_exhaustive_scan() -> Result<()> {
        let mut world = world(7, 9)?;
        for i in 0..40 {
            let t = i as f64;
            let pos = DVec2::new((t * 37.3) % 100.0, (t * 11.9 + 3.0) % 100.0);
            world.insert_bubble(pos, DVec2::Y)?;
        }
        let fast = partition(&mut world);
        let fast_cells: Vec<_> = world.bubbles().iter().map(|b| b.cells.clone()).collect();
        let slow = partition_exhaustive(&mut world);
        let slow_cells: Vec<_> = world.bubbles().iter().map(|b| b.cells.clone()).collect();
        assert_eq!(fast, slow);
        assert_eq!(fast_cells, slow_cells);
        Ok(())
    }
}
