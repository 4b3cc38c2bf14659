#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Route resolution: which waypoint an agent heads for after arriving.
//!
//! Candidates are the direct successor in the agent's chain followed by every
//! waypoint linked from its current key. One candidate is picked uniformly
//! with single-slot reservoir sampling driven by the agent's own random
//! stream.

mod state;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use waypoint_defence_core::{NavError, WaypointKey};
use waypoint_defence_graph::WaypointGraph;

pub use state::{TraversalState, ROUTE_STREAM};

/// Source of uniform integer draws consumed by [`select`].
pub trait UniformDraw {
    /// Returns an integer drawn uniformly from `[0, bound)`.
    ///
    /// A `bound` of one has a single outcome; implementations backed by a
    /// random stream answer it without consuming entropy.
    fn draw_below(&mut self, bound: usize) -> usize;
}

impl UniformDraw for ChaCha8Rng {
    fn draw_below(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        self.gen_range(0..bound)
    }
}

/// Picks one candidate uniformly using reservoir sampling of size one.
///
/// The candidate at 1-based position `i` replaces the winner when a draw from
/// `[0, i)` comes up zero. The first draw has bound one and always takes the
/// first candidate, so a random stream spends entropy on exactly `n - 1`
/// draws and a single candidate costs none. Returns `None` for an empty
/// input.
pub fn select<T, I, D>(candidates: I, draws: &mut D) -> Option<T>
where
    I: IntoIterator<Item = T>,
    D: UniformDraw + ?Sized,
{
    let mut winner = None;

    for (candidate, seen) in candidates.into_iter().zip(1_usize..) {
        let draw = draws.draw_below(seen);
        if draw == 0 || winner.is_none() {
            winner = Some(candidate);
        }
    }

    winner
}

/// Computes next-hop candidates and transitions traversal states.
#[derive(Clone, Copy, Debug)]
pub struct RouteResolver<'graph> {
    graph: &'graph WaypointGraph,
}

impl<'graph> RouteResolver<'graph> {
    /// Creates a resolver reading from the shared graph.
    #[must_use]
    pub const fn new(graph: &'graph WaypointGraph) -> Self {
        Self { graph }
    }

    /// Graph the resolver reads from.
    #[must_use]
    pub const fn graph(&self) -> &'graph WaypointGraph {
        self.graph
    }

    /// Candidate next waypoints for the provided state.
    #[must_use]
    pub fn candidate_routes(&self, state: &TraversalState) -> Vec<WaypointKey> {
        self.candidates_from(state.key())
    }

    /// Candidate next waypoints for an arbitrary key.
    ///
    /// The direct successor comes first, then linked waypoints in ascending
    /// key order. The key itself and repeated keys are never included, and an
    /// unknown key yields an empty list.
    #[must_use]
    pub fn candidates_from(&self, key: WaypointKey) -> Vec<WaypointKey> {
        let mut candidates = Vec::new();
        if let Some(successor) = self.graph.direct_successor(key) {
            candidates.push(successor);
        }

        for linked in self.graph.linked_waypoints(key) {
            if linked != key && !candidates.contains(&linked) {
                candidates.push(linked);
            }
        }

        candidates
    }

    /// Resolves the state an agent should adopt after arriving at `state`.
    ///
    /// Returns `Ok(None)` when no candidates remain, which marks the end of
    /// the path. The returned state continues the route stream of `state`.
    pub fn advance(&self, state: &TraversalState) -> Result<Option<TraversalState>, NavError> {
        let candidates = self.candidate_routes(state);
        let choices = candidates.len();
        let mut rng = state.route_stream().clone();

        let Some(winner) = select(candidates, &mut rng) else {
            return Ok(None);
        };
        let target_position = self.graph.world_position(winner)?;

        debug!(from = %state.key(), to = %winner, choices, "resolved next waypoint");

        Ok(Some(TraversalState::with_rng(winner, target_position, rng)))
    }
}
