//! mdone — M/D/1 experiments on the qnsim engine.
//!
//! Two Poisson sources (a "slow" and a "fast" agent class) feed one
//! deterministic server, optionally followed by a second one.  Each
//! replication streams finished agents to CSV and the run ends with the mean
//! time spent at the first server and in the whole system, per class.
//!
//! ```text
//! mdone --nodes 2 --replications 8 --out output/two_node
//! RUST_LOG=qn_sim=debug mdone --config demos/mdone/scenarios/two_node.json
//! ```

mod scenario;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use qn_agent::DataRecorder;
use qn_core::{ClassTag, SimRng};
use qn_output::{CsvWriter, HistoryObserver};

use scenario::{ENTRY_EDGES, FAST, FIRST_SERVER, SLOW, Scenario, ScenarioFile};

/// M/D/1 queueing experiments with fast and slow agent classes
#[derive(Parser, Debug)]
#[command(name = "mdone")]
#[command(about = "Run the one- or two-node M/D/1 experiment", long_about = None)]
struct Args {
    /// Number of servers in series (1 or 2); selects the preset when no
    /// config file is given
    #[arg(short, long)]
    nodes: Option<u8>,

    /// Events to process per replication
    #[arg(short, long)]
    events: Option<u64>,

    /// Root seed; each replication's seed is drawn from it
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON scenario file; flags override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Independent replications, run in parallel
    #[arg(short, long, default_value = "1")]
    replications: u32,

    /// Directory for the CSV output (one subdirectory per replication)
    #[arg(short, long, default_value = "output/mdone")]
    out: PathBuf,
}

// ── Per-class summary ─────────────────────────────────────────────────────────

struct ClassStats {
    agents:      usize,
    first_node:  Option<f64>,
    whole_trip:  Option<f64>,
}

impl ClassStats {
    /// Means over agents of `class` that left the network.
    fn collect(recorder: &DataRecorder, class: &ClassTag) -> Self {
        let done: Vec<_> = recorder.class_histories(class).filter(|h| h.is_sealed()).collect();
        Self {
            agents:     done.len(),
            first_node: mean(done.iter().filter_map(|h| h.time_between(FIRST_SERVER, FIRST_SERVER))),
            whole_trip: mean(done.iter().filter_map(|h| h.sojourn_time())),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn fmt_secs(v: Option<f64>) -> String {
    v.map(|s| format!("{s:.9}")).unwrap_or_else(|| "-".to_owned())
}

struct Report {
    index:     u32,
    seed:      u64,
    processed: u64,
    completed: usize,
    slow:      ClassStats,
    fast:      ClassStats,
}

// ── Replication ───────────────────────────────────────────────────────────────

fn run_replication(scenario: &Scenario, index: u32, seed: u64, out: &Path) -> Result<Report> {
    let mut sim = scenario.build(seed)?;
    sim.initialize(&ENTRY_EDGES)?;

    let writer = CsvWriter::new(&out.join(format!("rep-{index:03}")))?;
    let mut obs = HistoryObserver::new(writer);
    let processed = sim.simulate_observed(scenario.events, &mut obs)?;
    obs.finish()?;
    if let Some(e) = obs.take_error() {
        return Err(e.into());
    }

    info!(replication = index, seed, processed, now = %sim.now(), "replication done");
    Ok(Report {
        index,
        seed,
        processed,
        completed: sim.completed(),
        slow:      ClassStats::collect(sim.recorder(), &SLOW),
        fast:      ClassStats::collect(sim.recorder(), &FAST),
    })
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let file = match &args.config {
        Some(path) => ScenarioFile::load(path)?,
        None       => ScenarioFile::default(),
    };
    let mut scenario = file.resolve(args.nodes);
    if let Some(events) = args.events {
        scenario.events = events;
    }
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }
    scenario.validate()?;

    println!("=== mdone — M/D/1 with fast and slow agents ===");
    println!(
        "Servers: {}  |  Events: {}  |  Seed: {}  |  Replications: {}",
        scenario.nodes, scenario.events, scenario.seed, args.replications
    );
    println!(
        "Rates: slow {} /s, fast {} /s  |  Service: {} s{}",
        scenario.slow_rate,
        scenario.fast_rate,
        scenario.service,
        if scenario.nodes == 2 { format!(", then {} s", scenario.second_service) } else { String::new() },
    );
    println!();

    let mut root = SimRng::new(scenario.seed);
    let seeds: Vec<(u32, u64)> =
        (0..args.replications).map(|i| (i, root.child_seed(u64::from(i)))).collect();

    let t0 = Instant::now();
    let mut reports = seeds
        .into_par_iter()
        .map(|(i, seed)| run_replication(&scenario, i, seed, &args.out))
        .collect::<Result<Vec<_>>>()?;
    reports.sort_by_key(|r| r.index);
    let elapsed = t0.elapsed();

    println!(
        "{:<5} {:<8} {:<8} {:<7} {:<14} {:<14} {:<14} {:<14}",
        "Rep", "Seed", "Events", "Done", "slow@first", "slow total", "fast@first", "fast total"
    );
    println!("{}", "-".repeat(90));
    for r in &reports {
        println!(
            "{:<5} {:<8} {:<8} {:<7} {:<14} {:<14} {:<14} {:<14}",
            r.index,
            r.seed,
            r.processed,
            r.completed,
            fmt_secs(r.slow.first_node),
            fmt_secs(r.slow.whole_trip),
            fmt_secs(r.fast.first_node),
            fmt_secs(r.fast.whole_trip),
        );
    }
    println!();

    let slow_agents: usize = reports.iter().map(|r| r.slow.agents).sum();
    let fast_agents: usize = reports.iter().map(|r| r.fast.agents).sum();
    println!("Completed agents: {slow_agents} slow, {fast_agents} fast");
    println!("CSV output in {}", args.out.display());
    println!("Finished in {:.3} s", elapsed.as_secs_f64());
    Ok(())
}
