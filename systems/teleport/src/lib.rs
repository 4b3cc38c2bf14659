#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bounded teleport search and the jump that follows it.
//!
//! [`TeleportSearch`] explores the graph breadth-first along the same edges
//! route resolution uses, capped by a hop count and filtered by straight-line
//! distance. [`Teleporter`] picks one result with its own random stream and
//! moves an agent onto it with a freshly seeded traversal state.

use std::{
    collections::{HashSet, VecDeque},
    sync::Arc,
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace, warn};
use waypoint_defence_core::{TeleportConfig, WaypointKey};
use waypoint_defence_graph::WaypointGraph;
use waypoint_defence_system_movement::{NavigationAgent, Phase};
use waypoint_defence_system_routing::{select, RouteResolver, TraversalState};

/// ChaCha stream reserved for teleport target choice and reseeding.
pub const TELEPORT_STREAM: u64 = 1;

/// Breadth-first search for teleport destinations.
#[derive(Clone, Copy, Debug)]
pub struct TeleportSearch<'graph> {
    resolver: RouteResolver<'graph>,
}

impl<'graph> TeleportSearch<'graph> {
    /// Creates a search over the shared graph.
    #[must_use]
    pub const fn new(graph: &'graph WaypointGraph) -> Self {
        Self {
            resolver: RouteResolver::new(graph),
        }
    }

    /// Waypoints reachable from `origin` within `max_hops` edges whose
    /// distance from the origin's target lies in `(0, max_distance]`.
    ///
    /// Results come back in discovery order. Nodes rejected by the distance
    /// filter are still expanded while hops remain.
    #[must_use]
    pub fn find_targets(
        &self,
        origin: &TraversalState,
        max_hops: u32,
        max_distance: f32,
    ) -> Vec<WaypointKey> {
        let graph = self.resolver.graph();
        let anchor = origin.target_position();
        let mut targets = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        let _ = visited.insert(origin.key());
        queue.push_back((origin.key(), 0_u32));

        while let Some((key, hops)) = queue.pop_front() {
            if hops >= max_hops {
                continue;
            }
            let next_hops = hops + 1;

            for candidate in self.resolver.candidates_from(key) {
                if !visited.insert(candidate) {
                    continue;
                }

                if let Ok(position) = graph.world_position(candidate) {
                    let distance = anchor.distance(position);
                    if distance > 0.0 && distance <= max_distance {
                        targets.push(candidate);
                    }
                }

                if next_hops < max_hops {
                    queue.push_back((candidate, next_hops));
                }
            }
        }

        trace!(
            origin = %origin.key(),
            max_hops,
            max_distance,
            explored = visited.len(),
            found = targets.len(),
            "teleport search finished"
        );

        targets
    }
}

/// Endpoints of a completed teleport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TeleportOutcome {
    /// Waypoint the agent was heading for before the jump.
    pub from: WaypointKey,
    /// Waypoint the agent landed on.
    pub to: WaypointKey,
}

/// Per-agent teleport ability with a random stream independent of routing.
#[derive(Clone, Debug, PartialEq)]
pub struct Teleporter {
    rng: ChaCha8Rng,
}

impl Teleporter {
    /// Creates a teleporter drawing from the teleport stream of `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(TELEPORT_STREAM);
        Self { rng }
    }

    /// Searches from the agent's current state and jumps to a random result.
    ///
    /// Returns `None` when the agent is not traveling or nothing qualifies.
    /// On success the agent receives a new traversal state, seeded from this
    /// teleporter's stream, positioned on the chosen waypoint.
    pub fn try_teleport(
        &mut self,
        agent: &mut NavigationAgent,
        config: &TeleportConfig,
    ) -> Option<TeleportOutcome> {
        if agent.phase() != Phase::Traveling {
            return None;
        }

        let graph = Arc::clone(agent.graph());
        let origin = agent.state()?;
        let from = origin.key();
        let targets =
            TeleportSearch::new(&graph).find_targets(origin, config.max_hops(), config.max_distance());
        let to = select(targets, &mut self.rng)?;

        let seed = self.rng.next_u64();
        let state = match TraversalState::at(&graph, to, seed) {
            Ok(state) => state,
            Err(error) => {
                warn!(agent = %agent.id(), %error, "teleport target vanished from graph");
                return None;
            }
        };

        if !agent.relocate(state) {
            return None;
        }
        debug!(agent = %agent.id(), %from, %to, "agent teleported");

        Some(TeleportOutcome { from, to })
    }
}
