//! Bubble Grid - bubble population simulation with grid-accelerated overlap detection
//!
//! Core modules:
//! - `sim`: Simulation core (arena/grid geometry, lifecycle, broad and narrow phase)
//! - `runner`: Cancellable step loop that publishes snapshots to a renderer
//! - `settings`: Construction-time configuration
//! - `error`: Crate-wide error type

pub mod error;
pub mod runner;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use runner::{
    Clock, LoopState, ManualClock, RunSummary, SimulationLoop, StopHandle, SystemClock,
};
pub use settings::SimConfig;

use glam::DVec2;

/// Simulation configuration defaults
pub mod consts {
    /// Arena offset from the origin (leaves room for a HUD strip above)
    pub const ARENA_OFFSET_X: f64 = 0.0;
    pub const ARENA_OFFSET_Y: f64 = 100.0;
    /// Arena size
    pub const ARENA_WIDTH: f64 = 1280.0;
    pub const ARENA_HEIGHT: f64 = 600.0;

    /// Bubble defaults
    pub const BUBBLE_RADIUS: f64 = 6.0;
    pub const MAX_POPULATION: usize = 312;
    /// Seconds between spawns (0 = one spawn every step)
    pub const SPAWN_INTERVAL: f64 = 0.0;
    /// Seconds a bubble lives before it expires
    pub const BUBBLE_LIFETIME: f64 = 10.0;
    /// Units per second
    pub const BUBBLE_SPEED: f64 = 25.0;

    /// Target loop cadence (steps per second)
    pub const TARGET_STEP_RATE: f64 = 60.0;

    /// Minimum cell size, in bubble diameters, used by the grid sizing heuristic
    pub const CELL_DIAMETERS: f64 = 6.0;
    /// Upper bound on `rows * columns` for any grid
    pub const MAX_GRID_CELLS: usize = 1 << 20;

    /// Number of steps averaged by the rate meter
    pub const RATE_WINDOW: usize = 60;
}

/// Unit vector for an angle in radians
#[inline]
pub fn angle_to_direction(angle: f64) -> DVec2 {
    DVec2::new(angle.cos(), angle.sin())
}
