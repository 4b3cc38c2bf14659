#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Waypoint Defence scenarios headlessly.

mod scenario;

use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use waypoint_defence_core::{AgentId, Event};
use waypoint_defence_graph::WaypointGraph;
use waypoint_defence_system_simulation::Simulation;

use self::scenario::Scenario;

/// Runs agents across a scenario's waypoint graph and reports their routes.
#[derive(Debug, Parser)]
#[command(name = "waypoint-defence", version, about)]
struct Args {
    /// Scenario TOML describing the graph and the agents.
    #[arg(long)]
    scenario: PathBuf,
    /// Maximum number of ticks to simulate.
    #[arg(long, default_value_t = 100_000)]
    ticks: u32,
    /// Tick length in seconds, overriding the scenario.
    #[arg(long)]
    dt: Option<f32>,
    /// Master seed, overriding the scenario.
    #[arg(long)]
    seed: Option<u64>,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log: String,
}

#[derive(Debug, Default)]
struct AgentSummary {
    waypoints: u32,
    teleports: u32,
    finished_at: Option<u32>,
}

/// Entry point for the Waypoint Defence command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let scenario = Scenario::load(&args.scenario)?;
    let dt = scenario.tick(args.dt)?;
    let seed = args.seed.unwrap_or(scenario.seed);
    let graph = WaypointGraph::from_layout(&scenario.graph).context("scenario graph is malformed")?;
    info!(
        chains = graph.chain_count(),
        waypoints = graph.waypoint_count(),
        seed,
        "scenario loaded"
    );

    let mut simulation = Simulation::new(Arc::new(graph), seed);
    let mut events = Vec::new();
    for group in &scenario.agents {
        let config = group.agent_config()?;
        let teleport = group.teleport_config()?;
        for _ in 0..group.count {
            let _ = simulation.spawn(
                config,
                teleport,
                |agent| info!(%agent, "agent escaped"),
                &mut events,
            );
        }
    }

    let mut summaries: BTreeMap<AgentId, AgentSummary> = BTreeMap::new();
    let mut elapsed_ticks = 0;
    record(&events, elapsed_ticks, &mut summaries);

    while elapsed_ticks < args.ticks && !simulation.is_idle() {
        events.clear();
        simulation.tick(dt, &mut events);
        elapsed_ticks += 1;
        record(&events, elapsed_ticks, &mut summaries);
    }

    for (agent, summary) in &summaries {
        match summary.finished_at {
            Some(tick) => println!(
                "{agent}: finished at tick {tick} after {} waypoints and {} teleports",
                summary.waypoints, summary.teleports
            ),
            None => println!(
                "{agent}: still traveling after {} waypoints and {} teleports",
                summary.waypoints, summary.teleports
            ),
        }
    }
    println!(
        "{elapsed_ticks} ticks simulated, {} of {} agents finished",
        summaries
            .values()
            .filter(|summary| summary.finished_at.is_some())
            .count(),
        summaries.len()
    );

    Ok(())
}

fn record(events: &[Event], tick: u32, summaries: &mut BTreeMap<AgentId, AgentSummary>) {
    for event in events {
        match *event {
            Event::TimeAdvanced { .. } => {}
            Event::AgentSpawned { agent } => {
                let _ = summaries.entry(agent).or_default();
            }
            Event::WaypointReached { agent, from, to } => {
                debug!(%agent, %from, %to, "waypoint reached");
                summaries.entry(agent).or_default().waypoints += 1;
            }
            Event::AgentTeleported { agent, from, to } => {
                info!(%agent, %from, %to, "agent teleported");
                summaries.entry(agent).or_default().teleports += 1;
            }
            Event::PathFinished { agent } => {
                summaries.entry(agent).or_default().finished_at = Some(tick);
            }
        }
    }
}
