//! Per-agent traversal record.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use waypoint_defence_core::{ChainId, NavError, Position, WaypointKey};
use waypoint_defence_graph::WaypointGraph;

/// ChaCha stream reserved for route selection draws.
pub const ROUTE_STREAM: u64 = 0;

/// Where an agent stands on the graph and where it is heading.
///
/// The state owns a private random stream seeded at construction. Route
/// transitions hand that stream to the successor state unchanged, so one
/// agent's choices form a single continuous sequence and never touch
/// another agent's draws. Cloning a state clones the stream position, which
/// replays the same future choices.
#[derive(Clone, Debug, PartialEq)]
pub struct TraversalState {
    key: WaypointKey,
    target_position: Position,
    rng: ChaCha8Rng,
}

impl TraversalState {
    /// Creates a state at `key` heading for `target_position`, seeding a fresh stream.
    #[must_use]
    pub fn new(key: WaypointKey, target_position: Position, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(ROUTE_STREAM);
        Self {
            key,
            target_position,
            rng,
        }
    }

    /// Creates a state at `key`, resolving its target position through the graph.
    pub fn at(graph: &WaypointGraph, key: WaypointKey, seed: u64) -> Result<Self, NavError> {
        let target_position = graph.world_position(key)?;
        Ok(Self::new(key, target_position, seed))
    }

    pub(crate) fn with_rng(key: WaypointKey, target_position: Position, rng: ChaCha8Rng) -> Self {
        Self {
            key,
            target_position,
            rng,
        }
    }

    /// Waypoint the state is heading for.
    #[must_use]
    pub const fn key(&self) -> WaypointKey {
        self.key
    }

    /// Chain containing the current waypoint.
    #[must_use]
    pub const fn chain_id(&self) -> ChainId {
        self.key.chain()
    }

    /// Index of the current waypoint within its chain.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.key.index()
    }

    /// World position the agent moves toward.
    #[must_use]
    pub const fn target_position(&self) -> Position {
        self.target_position
    }

    /// Number of 32-bit words consumed from the route stream so far.
    #[must_use]
    pub fn stream_position(&self) -> u128 {
        self.rng.get_word_pos()
    }

    pub(crate) fn route_stream(&self) -> &ChaCha8Rng {
        &self.rng
    }
}
