//! Bubble Grid entry point
//!
//! Headless host: runs the simulation loop for a fixed wall-clock duration,
//! logs progress, then prints the final snapshot as JSON.
//!
//! Usage: `bubble-grid [CONFIG.json] [SECONDS]`

use std::time::Duration;

use bubble_grid::{Result, SimConfig, SimulationLoop};

/// Default run length in seconds
const DEFAULT_RUN_SECS: f64 = 5.0;

fn main() {
    env_logger::init();
    log::info!("Bubble Grid starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let run_secs = match args.next() {
        Some(s) => s.parse::<f64>().map_err(|e| {
            bubble_grid::Error::InvalidParam(format!("run length '{s}' is not a number: {e}"))
        })?,
        None => DEFAULT_RUN_SECS,
    };
    let run_for = Duration::try_from_secs_f64(run_secs).map_err(|e| {
        bubble_grid::Error::InvalidParam(format!("run length {run_secs} is invalid: {e}"))
    })?;

    let mut sim = SimulationLoop::new(&config)?;

    let stop = sim.stop_handle();
    std::thread::spawn(move || {
        std::thread::sleep(run_for);
        stop.stop();
    });

    let mut last = None;
    let mut next_report = 1.0;
    let summary = sim.run(|snapshot| {
        if snapshot.sim_time >= next_report {
            log::info!(
                "t={:.1}s bubbles={} in contact={} occupied cells={} rate={:.1}/s",
                snapshot.sim_time,
                snapshot.bubbles.len(),
                snapshot.contact_count(),
                snapshot.grid.occupied.iter().filter(|&&o| o).count(),
                snapshot.average_rate
            );
            next_report += 1.0;
        }
        last = Some(snapshot.clone());
    })?;

    log::info!(
        "Ran {} steps, {:.2}s simulated, peak population {}",
        summary.steps,
        summary.sim_time,
        summary.peak_population
    );

    if let Some(snapshot) = last {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}
