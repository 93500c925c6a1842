//! World state and core simulation types
//!
//! The `World` owns the arena, the grid, the bubble registry and the RNG.
//! Phase functions borrow it mutably one at a time; nothing is global.

use std::collections::BTreeSet;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::geometry::Aabb;
use super::grid::{CellCoord, Grid, best_grid_size};
use crate::angle_to_direction;
use crate::error::{Error, Result};
use crate::settings::SimConfig;

/// Stable bubble identity, never reused within a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BubbleId(pub u64);

/// A bubble entity
#[derive(Debug, Clone)]
pub struct Bubble {
    pub id: BubbleId,
    pub pos: DVec2,
    pub(crate) radius: f64,
    /// Unit heading, fixed at spawn
    direction: DVec2,
    /// Simulation time at creation
    pub spawn_time: f64,
    /// Cells the circle overlapped after the last broad phase
    pub(crate) cells: Vec<CellCoord>,
    /// Bubbles overlapping this one after the last narrow phase
    pub(crate) contacts: BTreeSet<BubbleId>,
}

impl Bubble {
    /// Create a bubble; `direction` is normalized and must be non-zero
    pub fn new(
        id: BubbleId,
        pos: DVec2,
        radius: f64,
        direction: DVec2,
        spawn_time: f64,
    ) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !pos.is_finite() {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        let direction = direction
            .try_normalize()
            .ok_or_else(|| Error::InvalidParam("direction must be a non-zero vector".into()))?;
        Ok(Self {
            id,
            pos,
            radius,
            direction,
            spawn_time,
            cells: Vec::new(),
            contacts: BTreeSet::new(),
        })
    }

    #[inline]
    pub fn direction(&self) -> DVec2 {
        self.direction
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Resize the bubble; takes effect from the next broad phase
    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        self.radius = radius;
        Ok(())
    }

    /// Cells the bubble occupied at the last broad phase, sorted
    #[inline]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Bubbles in contact at the last narrow phase
    #[inline]
    pub fn contacts(&self) -> &BTreeSet<BubbleId> {
        &self.contacts
    }

    /// Seconds since spawn at simulation time `now`
    #[inline]
    pub fn age(&self, now: f64) -> f64 {
        now - self.spawn_time
    }

    #[inline]
    pub fn in_contact(&self) -> bool {
        !self.contacts.is_empty()
    }
}

/// Tunables read by the lifecycle passes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifecycleParams {
    pub bubble_radius: f64,
    pub max_population: usize,
    pub spawn_interval: f64,
    pub lifetime: f64,
    pub move_speed: f64,
}

impl From<&SimConfig> for LifecycleParams {
    fn from(config: &SimConfig) -> Self {
        Self {
            bubble_radius: config.bubble_radius,
            max_population: config.max_population,
            spawn_interval: config.spawn_interval,
            lifetime: config.lifetime,
            move_speed: config.move_speed,
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    /// Seed the RNG was created from, for reproducing a run
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) arena: Aabb,
    pub(crate) grid: Grid,
    pub(crate) params: LifecycleParams,
    /// Live bubbles, in spawn order
    pub(crate) bubbles: Vec<Bubble>,
    /// Simulation clock (seconds)
    pub(crate) sim_time: f64,
    pub(crate) last_spawn_time: f64,
    /// Completed steps
    pub(crate) step_index: u64,
    pub(crate) next_id: u64,
}

impl World {
    /// Build a world from a validated configuration
    pub fn new(config: &SimConfig) -> Result<Self> {
        config.validate()?;

        let arena = Aabb::arena(
            DVec2::new(config.arena_offset_x, config.arena_offset_y),
            DVec2::new(config.arena_width, config.arena_height),
        )?;
        let (rows, columns) = match config.grid {
            Some(dims) => (dims.rows, dims.columns),
            None => best_grid_size(&arena, config.bubble_radius),
        };
        let grid = Grid::new(&arena, rows, columns)?;

        let seed = config.seed.unwrap_or_else(rand::random);

        log::info!(
            "World created: arena {}x{} at ({}, {}), grid {}x{} (rows x columns), seed {}",
            arena.width(),
            arena.height(),
            arena.min_x,
            arena.min_y,
            rows,
            columns,
            seed
        );

        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            arena,
            grid,
            params: LifecycleParams::from(config),
            bubbles: Vec::new(),
            sim_time: 0.0,
            last_spawn_time: 0.0,
            step_index: 0,
            next_id: 1,
        })
    }

    #[inline]
    pub fn arena(&self) -> &Aabb {
        &self.arena
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn params(&self) -> &LifecycleParams {
        &self.params
    }

    #[inline]
    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    #[inline]
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    #[inline]
    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    #[inline]
    pub fn population(&self) -> usize {
        self.bubbles.len()
    }

    pub fn bubble(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    /// Mutable access, for hosts and tests that reposition a bubble.
    /// Derived sets are refreshed by the next step.
    pub fn bubble_mut(&mut self, id: BubbleId) -> Option<&mut Bubble> {
        self.bubbles.iter_mut().find(|b| b.id == id)
    }

    /// Allocate a new bubble ID
    pub fn next_bubble_id(&mut self) -> BubbleId {
        let id = BubbleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Place a bubble with the configured radius at an explicit position and
    /// heading, stamped with the current simulation time.
    ///
    /// Bypasses the spawn cadence but not the population cap.
    pub fn insert_bubble(&mut self, pos: DVec2, direction: DVec2) -> Result<BubbleId> {
        if self.bubbles.len() >= self.params.max_population {
            return Err(Error::InvalidParam(format!(
                "population cap of {} reached",
                self.params.max_population
            )));
        }
        let id = self.next_bubble_id();
        let bubble = Bubble::new(id, pos, self.params.bubble_radius, direction, self.sim_time)?;
        self.bubbles.push(bubble);
        Ok(id)
    }

    /// Uniformly random point inside the arena
    pub(crate) fn random_point(&mut self) -> DVec2 {
        let u: f64 = self.rng.random();
        let v: f64 = self.rng.random();
        self.arena.lerp_point(u, v)
    }

    /// Uniformly random unit heading
    pub(crate) fn random_direction(&mut self) -> DVec2 {
        let angle = self.rng.random_range(0.0..std::f64::consts::TAU);
        angle_to_direction(angle)
    }
}
