//! Simulation configuration
//!
//! Accepted once at construction; there is no runtime reconfiguration.
//! Stored as JSON so hosts can ship tuned presets alongside the binary.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// Explicit grid partition, overriding the sizing heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub rows: u32,
    pub columns: u32,
}

/// Construction-time simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Arena ===
    /// Arena minimum corner (x)
    pub arena_offset_x: f64,
    /// Arena minimum corner (y)
    pub arena_offset_y: f64,
    /// Arena extent along x
    pub arena_width: f64,
    /// Arena extent along y
    pub arena_height: f64,

    // === Bubbles ===
    /// Radius given to every spawned bubble
    pub bubble_radius: f64,
    /// Population cap
    pub max_population: usize,
    /// Seconds of simulation time between spawns (0 = every step)
    pub spawn_interval: f64,
    /// Seconds of simulation time a bubble lives
    pub lifetime: f64,
    /// Movement speed in units per second
    pub move_speed: f64,

    // === Partition ===
    /// Grid override; `None` picks dimensions from the bubble radius
    pub grid: Option<GridDimensions>,

    // === Loop ===
    /// Steps per second the loop aims for
    pub target_step_rate: f64,
    /// Use this delta for every step instead of measuring the wall clock
    pub fixed_delta_time: Option<f64>,
    /// Upper bound applied to measured deltas (after stalls)
    pub max_delta_time: Option<f64>,
    /// RNG seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena_offset_x: ARENA_OFFSET_X,
            arena_offset_y: ARENA_OFFSET_Y,
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,

            bubble_radius: BUBBLE_RADIUS,
            max_population: MAX_POPULATION,
            spawn_interval: SPAWN_INTERVAL,
            lifetime: BUBBLE_LIFETIME,
            move_speed: BUBBLE_SPEED,

            grid: None,

            target_step_rate: TARGET_STEP_RATE,
            fixed_delta_time: None,
            max_delta_time: None,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field; the first violation is reported.
    ///
    /// Grid dimensions derived from the radius are checked when the world is
    /// built, since they depend on the arena as well.
    pub fn validate(&self) -> Result<()> {
        require_finite("arena_offset_x", self.arena_offset_x)?;
        require_finite("arena_offset_y", self.arena_offset_y)?;
        require_positive("arena_width", self.arena_width)?;
        require_positive("arena_height", self.arena_height)?;
        require_positive("bubble_radius", self.bubble_radius)?;
        if self.max_population == 0 {
            return Err(Error::InvalidConfig("max_population must be > 0".into()));
        }
        require_non_negative("spawn_interval", self.spawn_interval)?;
        require_positive("lifetime", self.lifetime)?;
        require_non_negative("move_speed", self.move_speed)?;
        require_positive("target_step_rate", self.target_step_rate)?;
        if let Some(dt) = self.fixed_delta_time {
            require_positive("fixed_delta_time", dt)?;
        }
        if let Some(dt) = self.max_delta_time {
            require_positive("max_delta_time", dt)?;
        }
        if let Some(grid) = self.grid
            && (grid.rows == 0 || grid.columns == 0)
        {
            return Err(Error::DegenerateGrid {
                rows: grid.rows,
                columns: grid.columns,
            });
        }
        Ok(())
    }

    /// Seconds budgeted per step at the target rate
    pub fn step_budget(&self) -> f64 {
        1.0 / self.target_step_rate
    }
}

fn require_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::InvalidConfig(format!("{name} must be finite")));
    }
    Ok(())
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidConfig(format!(
            "{name} must be finite and > 0 (got {value})"
        )));
    }
    Ok(())
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidConfig(format!(
            "{name} must be finite and >= 0 (got {value})"
        )));
    }
    Ok(())
}
