//! Simulation core
//!
//! All per-step logic lives here and is free of timing and rendering:
//! - The caller supplies every delta
//! - Seeded RNG only
//! - Stable iteration order (registry keeps spawn order)
//! - Grid and contact sets are rebuilt from positions every step

pub mod broad_phase;
pub mod collision;
pub mod geometry;
pub mod grid;
pub mod lifecycle;
pub mod narrow_phase;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use broad_phase::{partition, partition_exhaustive};
pub use collision::{circle_circle_overlap, circle_rect_overlap};
pub use geometry::Aabb;
pub use grid::{CellCoord, Grid, best_grid_size};
pub use narrow_phase::{NarrowPhaseStats, detect, detect_brute_force};
pub use snapshot::{BubbleView, GridView, Snapshot};
pub use state::{Bubble, BubbleId, LifecycleParams, World};
pub use tick::{StepStats, step};
