//! Read-only view of the world handed to renderers after each step
//!
//! Everything is copied out, so a renderer can hold on to a snapshot while the
//! loop keeps mutating the world.

use glam::DVec2;
use serde::Serialize;

use super::geometry::Aabb;
use super::grid::CellCoord;
use super::state::{BubbleId, World};

/// Per-bubble render data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleView {
    pub id: BubbleId,
    pub pos: DVec2,
    pub radius: f64,
    /// True if the bubble overlaps at least one other
    pub in_contact: bool,
}

/// Grid dimensions and which cells hold at least one bubble
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridView {
    pub rows: u32,
    pub columns: u32,
    pub cell_width: f64,
    pub cell_height: f64,
    /// Column-major (`x * rows + y`) occupancy flags
    pub occupied: Vec<bool>,
}

impl GridView {
    pub fn is_occupied(&self, coord: CellCoord) -> bool {
        self.occupied
            .get(coord.x as usize * self.rows as usize + coord.y as usize)
            .copied()
            .unwrap_or(false)
    }

    /// Rectangle of cell `(x, y)` inside `arena`
    pub fn cell_bounds(&self, arena: &Aabb, coord: CellCoord) -> Aabb {
        let min_x = arena.min_x + coord.x as f64 * self.cell_width;
        let min_y = arena.min_y + coord.y as f64 * self.cell_height;
        Aabb::new(
            min_x,
            min_x + self.cell_width,
            min_y,
            min_y + self.cell_height,
        )
    }
}

/// Snapshot published after a completed step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub step_index: u64,
    pub sim_time: f64,
    pub arena: Aabb,
    pub grid: GridView,
    pub bubbles: Vec<BubbleView>,
    /// Seconds covered by the step that produced this snapshot
    pub delta_time: f64,
    /// `1 / delta_time`, or 0 for an empty step
    pub step_rate: f64,
    /// Rate averaged over recent steps
    pub average_rate: f64,
}

impl Snapshot {
    pub fn capture(world: &World, delta_time: f64, average_rate: f64) -> Self {
        let grid = world.grid();
        Self {
            step_index: world.step_index(),
            sim_time: world.sim_time(),
            arena: *world.arena(),
            grid: GridView {
                rows: grid.rows(),
                columns: grid.columns(),
                cell_width: grid.cell_width(),
                cell_height: grid.cell_height(),
                occupied: grid.coords().map(|c| grid.is_occupied(c)).collect(),
            },
            bubbles: world
                .bubbles()
                .iter()
                .map(|b| BubbleView {
                    id: b.id,
                    pos: b.pos,
                    radius: b.radius,
                    in_contact: b.in_contact(),
                })
                .collect(),
            delta_time,
            step_rate: instantaneous_rate(delta_time),
            average_rate,
        }
    }

    pub fn contact_count(&self) -> usize {
        self.bubbles.iter().filter(|b| b.in_contact).count()
    }
}

/// Steps per second implied by a single delta
#[inline]
pub fn instantaneous_rate(delta_time: f64) -> f64 {
    if delta_time > 0.0 {
        1.0 / delta_time
    } else {
        0.0
    }
}
