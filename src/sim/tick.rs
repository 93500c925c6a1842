//! One simulation step
//!
//! Fixed phase order: spawn, move, cull, broad phase, narrow phase, then the
//! clock advances. Lifecycle always finishes before the grid is rebuilt.

use super::broad_phase::partition;
use super::lifecycle::{advance, cull, spawn};
use super::narrow_phase::detect;
use super::state::World;

/// What happened during a step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepStats {
    /// Delta applied to motion and the clock
    pub dt: f64,
    pub spawned: bool,
    pub culled: usize,
    pub population: usize,
    /// Bubble/cell memberships recorded by the broad phase
    pub memberships: usize,
    pub occupied_cells: usize,
    /// Exact overlap tests performed by the narrow phase
    pub checks: usize,
    pub contact_pairs: usize,
}

/// Advance the world by one step of `dt` seconds
pub fn step(world: &mut World, dt: f64) -> StepStats {
    let spawned = spawn(world);
    advance(world, dt);
    let culled = cull(world);

    let memberships = partition(world);
    let narrow = detect(world);

    world.sim_time += dt;
    world.step_index += 1;

    let stats = StepStats {
        dt,
        spawned,
        culled,
        population: world.bubbles.len(),
        memberships,
        occupied_cells: world.grid.occupied_count(),
        checks: narrow.checks,
        contact_pairs: narrow.contact_pairs,
    };
    log::trace!("Step {}: {:?}", world.step_index, stats);
    stats
}
