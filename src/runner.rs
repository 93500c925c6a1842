//! Simulation loop
//!
//! Drives `sim::step` at a target cadence, measuring the wall clock between
//! steps and publishing a snapshot after each one. The loop checks its stop
//! handle before starting a step, so a step always runs to completion.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::consts::RATE_WINDOW;
use crate::error::{Error, Result};
use crate::settings::SimConfig;
use crate::sim::snapshot::instantaneous_rate;
use crate::sim::{Snapshot, World, step};

/// Time source and suspension primitive for the loop
pub trait Clock {
    /// Monotonic time since an arbitrary origin
    fn now(&self) -> Duration;
    /// Suspend the loop between steps
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `Instant` and `thread::sleep`
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Hand-driven clock: time only moves through `advance` or `sleep`.
///
/// Clones share the same time, so a test can keep one and hand another to
/// the loop.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Cloneable cancellation flag shared with the loop
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to finish after the step in progress
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Loop lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Built, not started
    Idle,
    /// Stepping
    Running,
    /// Finished; cannot be restarted
    Stopped,
}

/// Step rate averaged over the last `RATE_WINDOW` deltas
#[derive(Debug, Clone)]
pub struct RateMeter {
    deltas: [f64; RATE_WINDOW],
    index: usize,
    filled: usize,
}

impl Default for RateMeter {
    fn default() -> Self {
        Self {
            deltas: [0.0; RATE_WINDOW],
            index: 0,
            filled: 0,
        }
    }
}

impl RateMeter {
    pub fn record(&mut self, dt: f64) {
        self.deltas[self.index] = dt;
        self.index = (self.index + 1) % RATE_WINDOW;
        self.filled = (self.filled + 1).min(RATE_WINDOW);
    }

    /// Steps per second over the window, 0 until time has passed
    pub fn average(&self) -> f64 {
        let total: f64 = self.deltas[..self.filled].iter().sum();
        if total > 0.0 {
            self.filled as f64 / total
        } else {
            0.0
        }
    }
}

/// Totals reported when `run` returns
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub steps: u64,
    pub sim_time: f64,
    pub peak_population: usize,
    pub final_population: usize,
}

/// Cancellable fixed-cadence driver owning the world
pub struct SimulationLoop<C: Clock = SystemClock> {
    world: World,
    clock: C,
    state: LoopState,
    stop: StopHandle,
    budget: Duration,
    fixed_delta: Option<f64>,
    max_delta: Option<f64>,
    last_tick: Duration,
    rate: RateMeter,
    summary: RunSummary,
}

impl SimulationLoop<SystemClock> {
    /// Build a loop on the wall clock
    pub fn new(config: &SimConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> SimulationLoop<C> {
    /// Build a loop on a caller-supplied clock
    pub fn with_clock(config: &SimConfig, clock: C) -> Result<Self> {
        let world = World::new(config)?;
        let budget = Duration::try_from_secs_f64(config.step_budget()).map_err(|e| {
            Error::InvalidConfig(format!("target_step_rate gives no usable step budget: {e}"))
        })?;
        Ok(Self {
            world,
            clock,
            state: LoopState::Idle,
            stop: StopHandle::new(),
            budget,
            fixed_delta: config.fixed_delta_time,
            max_delta: config.max_delta_time,
            last_tick: Duration::ZERO,
            rate: RateMeter::default(),
            summary: RunSummary::default(),
        })
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access between steps (e.g. to place bubbles)
    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Handle that stops the loop from a callback or another thread
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    #[inline]
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Idle -> Running. The first delta is measured from here.
    pub fn start(&mut self) -> Result<()> {
        if self.state != LoopState::Idle {
            return Err(Error::InvalidState(format!(
                "start requires Idle, loop is {:?}",
                self.state
            )));
        }
        self.last_tick = self.clock.now();
        self.state = LoopState::Running;
        log::info!(
            "Simulation loop running at {:.1} steps/s target",
            1.0 / self.budget.as_secs_f64()
        );
        Ok(())
    }

    /// Run exactly one step and return its snapshot
    pub fn step_once(&mut self) -> Result<Snapshot> {
        if self.state != LoopState::Running {
            return Err(Error::InvalidState(format!(
                "step requires Running, loop is {:?}",
                self.state
            )));
        }

        let dt = self.next_delta();
        let stats = step(&mut self.world, dt);
        self.rate.record(dt);

        self.summary.steps += 1;
        self.summary.sim_time = self.world.sim_time();
        self.summary.peak_population = self.summary.peak_population.max(stats.population);
        self.summary.final_population = stats.population;

        if self.summary.steps % RATE_WINDOW as u64 == 0 {
            log::debug!(
                "Step {}: {} bubbles, {} contact pairs, {} checks, {:.1} steps/s (now {:.1})",
                self.summary.steps,
                stats.population,
                stats.contact_pairs,
                stats.checks,
                self.rate.average(),
                instantaneous_rate(dt)
            );
        }

        Ok(Snapshot::capture(&self.world, dt, self.rate.average()))
    }

    /// Running -> Stopped
    pub fn finish(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        self.state = LoopState::Stopped;
        log::info!(
            "Simulation loop stopped after {} steps ({:.2}s simulated, peak population {})",
            self.summary.steps,
            self.summary.sim_time,
            self.summary.peak_population
        );
    }

    /// Step until the stop handle fires, publishing every snapshot.
    ///
    /// Sleeps whatever is left of the per-step budget between steps.
    pub fn run<F>(&mut self, mut publish: F) -> Result<RunSummary>
    where
        F: FnMut(&Snapshot),
    {
        self.start()?;
        while !self.stop.is_stopped() {
            let began = self.clock.now();
            let snapshot = self.step_once()?;
            publish(&snapshot);

            let spent = self.clock.now().saturating_sub(began);
            if let Some(rest) = self.budget.checked_sub(spent)
                && !rest.is_zero()
            {
                self.clock.sleep(rest);
            }
        }
        self.finish();
        Ok(self.summary)
    }

    fn next_delta(&mut self) -> f64 {
        let now = self.clock.now();
        let measured = now.saturating_sub(self.last_tick).as_secs_f64();
        self.last_tick = now;

        if let Some(fixed) = self.fixed_delta {
            return fixed;
        }
        match self.max_delta {
            Some(max) if measured > max => {
                log::warn!("Step delta {:.3}s clamped to {:.3}s", measured, max);
                max
            }
            _ => measured,
        }
    }
}
