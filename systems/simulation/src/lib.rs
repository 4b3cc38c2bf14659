#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Driver loop that owns the active navigation agents.
//!
//! The simulation holds the shared graph, hands every spawned agent a seed
//! drawn from one master stream, advances agents sequentially in spawn order,
//! fires teleport attempts on per-agent timers, and reports each tick through
//! [`Event`] values. Agents whose path ended leave the roster at the end of
//! the tick that finished them.

use std::{sync::Arc, time::Duration};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use waypoint_defence_core::{AgentConfig, AgentId, Event, TeleportConfig};
use waypoint_defence_graph::WaypointGraph;
use waypoint_defence_system_movement::{NavigationAgent, Progress};
use waypoint_defence_system_teleport::Teleporter;

/// Owns the agent roster and advances it one tick at a time.
#[derive(Debug)]
pub struct Simulation {
    graph: Arc<WaypointGraph>,
    seeds: ChaCha8Rng,
    next_agent: u32,
    roster: Vec<Runner>,
}

impl Simulation {
    /// Creates an empty simulation over `graph`; `seed` drives every agent seed.
    #[must_use]
    pub fn new(graph: Arc<WaypointGraph>, seed: u64) -> Self {
        Self {
            graph,
            seeds: ChaCha8Rng::seed_from_u64(seed),
            next_agent: 0,
            roster: Vec::new(),
        }
    }

    /// Graph shared by every agent.
    #[must_use]
    pub fn graph(&self) -> &Arc<WaypointGraph> {
        &self.graph
    }

    /// Adds an agent to the roster.
    ///
    /// Agents with a `teleport` configuration attempt a jump every time its
    /// interval elapses. `on_finished` runs once when the agent's path ends.
    pub fn spawn<F>(
        &mut self,
        config: AgentConfig,
        teleport: Option<TeleportConfig>,
        on_finished: F,
        out: &mut Vec<Event>,
    ) -> AgentId
    where
        F: FnMut(AgentId) + 'static,
    {
        let id = AgentId::new(self.next_agent);
        self.next_agent = self.next_agent.saturating_add(1);
        let seed = self.seeds.next_u64();

        let agent = NavigationAgent::new(id, Arc::clone(&self.graph), config, seed, on_finished);
        let teleport = teleport.map(|config| TeleportTimer::new(config, seed));
        debug!(agent = %id, teleports = teleport.is_some(), "agent spawned");

        self.roster.push(Runner { agent, teleport });
        out.push(Event::AgentSpawned { agent: id });
        id
    }

    /// Advances every agent by `dt` and records what happened.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        out.push(Event::TimeAdvanced { dt });
        let seconds = dt.as_secs_f32();

        for runner in &mut self.roster {
            runner.advance(dt, seconds, out);
        }

        self.roster.retain(|runner| !runner.agent.is_finished());
    }

    /// Looks up an active agent.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&NavigationAgent> {
        self.roster
            .iter()
            .map(|runner| &runner.agent)
            .find(|agent| agent.id() == id)
    }

    /// Looks up an active agent for speed adjustments.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut NavigationAgent> {
        self.roster
            .iter_mut()
            .map(|runner| &mut runner.agent)
            .find(|agent| agent.id() == id)
    }

    /// Active agents in spawn order.
    pub fn agents(&self) -> impl Iterator<Item = &NavigationAgent> {
        self.roster.iter().map(|runner| &runner.agent)
    }

    /// Number of agents still on the roster.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.roster.len()
    }

    /// Reports whether every agent has finished.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.roster.is_empty()
    }
}

#[derive(Debug)]
struct Runner {
    agent: NavigationAgent,
    teleport: Option<TeleportTimer>,
}

impl Runner {
    fn advance(&mut self, dt: Duration, seconds: f32, out: &mut Vec<Event>) {
        let id = self.agent.id();
        match self.agent.advance(seconds) {
            Progress::Arrived { from, to } => {
                out.push(Event::WaypointReached { agent: id, from, to });
            }
            Progress::Finished => {
                out.push(Event::PathFinished { agent: id });
                return;
            }
            Progress::Idle | Progress::Moved => {}
        }

        if self.agent.is_finished() {
            return;
        }

        if let Some(timer) = self.teleport.as_mut() {
            if !timer.elapse(dt) {
                return;
            }

            if let Some(outcome) = timer.teleporter.try_teleport(&mut self.agent, &timer.config) {
                out.push(Event::AgentTeleported {
                    agent: id,
                    from: outcome.from,
                    to: outcome.to,
                });
            }
        }
    }
}

#[derive(Debug)]
struct TeleportTimer {
    config: TeleportConfig,
    teleporter: Teleporter,
    accumulator: Duration,
}

impl TeleportTimer {
    fn new(config: TeleportConfig, seed: u64) -> Self {
        Self {
            config,
            teleporter: Teleporter::new(seed),
            accumulator: Duration::ZERO,
        }
    }

    /// Accumulates `dt` and reports whether at least one interval elapsed.
    ///
    /// Several intervals elapsing within one tick still yield one attempt.
    fn elapse(&mut self, dt: Duration) -> bool {
        let interval = self.config.interval();
        if interval.is_zero() {
            return false;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        if self.accumulator < interval {
            return false;
        }

        self.accumulator = remainder(self.accumulator, interval);
        true
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

fn remainder(elapsed: Duration, interval: Duration) -> Duration {
    let nanos = elapsed.as_nanos() % interval.as_nanos();
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    let subsec = u32::try_from(nanos % NANOS_PER_SEC).unwrap_or(0);
    Duration::new(secs, subsec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(interval: Duration) -> TeleportTimer {
        let config = TeleportConfig::new(interval, 2, 3.0).expect("valid config");
        TeleportTimer::new(config, 1)
    }

    #[test]
    fn timer_fires_once_per_elapsed_interval() {
        let mut timer = timer(Duration::from_secs(2));

        assert!(!timer.elapse(Duration::from_millis(1_500)));
        assert!(timer.elapse(Duration::from_millis(1_000)));
        assert_eq!(timer.accumulator, Duration::from_millis(500));
        assert!(timer.elapse(Duration::from_secs(5)));
        assert_eq!(timer.accumulator, Duration::from_millis(1_500));
    }

    #[test]
    fn tiny_intervals_settle_in_one_step() {
        let mut nanosecond = timer(Duration::from_nanos(1));

        assert!(nanosecond.elapse(Duration::from_millis(50)));
        assert_eq!(nanosecond.accumulator, Duration::ZERO);
        assert!(nanosecond.elapse(Duration::MAX));
        assert_eq!(nanosecond.accumulator, Duration::ZERO);

        let mut uneven = timer(Duration::from_nanos(3));
        assert!(uneven.elapse(Duration::from_nanos(10)));
        assert_eq!(uneven.accumulator, Duration::from_nanos(1));
        assert!(!uneven.elapse(Duration::from_nanos(1)));
    }

    #[test]
    fn zero_interval_disables_the_timer() {
        let mut timer = timer(Duration::ZERO);

        assert!(!timer.elapse(Duration::from_secs(60)));
        assert_eq!(timer.accumulator, Duration::ZERO);
    }
}
