#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable waypoint graph shared by every navigation agent.
//!
//! The graph is an ordered list of chains, each an ordered run of waypoint
//! positions, plus a table of directed cross-links between waypoints. It is
//! compiled once from authored data and then only read. Queries against keys
//! that do not exist never panic: positional lookups return
//! [`NavError::InvalidKey`] and adjacency lookups come back empty.

mod builder;

use std::collections::{BTreeMap, BTreeSet};

use waypoint_defence_core::{ChainId, GraphError, GraphLayout, NavError, Position, WaypointKey};

pub use builder::GraphBuilder;

/// Chains of waypoints connected by authored cross-links.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaypointGraph {
    chains: Vec<Vec<Position>>,
    links: BTreeMap<WaypointKey, BTreeSet<WaypointKey>>,
}

impl WaypointGraph {
    /// Starts a builder for assembling a graph in code.
    #[must_use]
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// Compiles authored layout data, validating every chain and link.
    pub fn from_layout(layout: &GraphLayout) -> Result<Self, GraphError> {
        let mut builder = GraphBuilder::default();
        for chain in &layout.chains {
            let _ = builder.chain(chain.waypoints.iter().copied().map(Position::from));
        }
        for link in &layout.links {
            if link.one_way {
                builder.one_way_link(link.from, link.to);
            } else {
                builder.link(link.from, link.to);
            }
        }
        builder.build()
    }

    /// Resolves a waypoint key to its world position.
    pub fn world_position(&self, key: WaypointKey) -> Result<Position, NavError> {
        self.position_at(key).ok_or(NavError::InvalidKey(key))
    }

    /// Position of the canonical spawn waypoint (chain 0, index 0).
    pub fn first_waypoint(&self) -> Result<Position, NavError> {
        self.world_position(WaypointKey::origin())
    }

    /// Next waypoint in the same chain, or `None` at the end of the chain.
    #[must_use]
    pub fn direct_successor(&self, key: WaypointKey) -> Option<WaypointKey> {
        key.next_in_chain().filter(|next| self.contains(*next))
    }

    /// Waypoints explicitly linked from `key`, in ascending key order.
    ///
    /// Links are directed: a mirrored entry is only reported when it was
    /// recorded. Self-references are skipped.
    pub fn linked_waypoints(&self, key: WaypointKey) -> impl Iterator<Item = WaypointKey> + '_ {
        self.links
            .get(&key)
            .into_iter()
            .flatten()
            .copied()
            .filter(move |linked| *linked != key)
    }

    /// Reports whether the key addresses an existing waypoint.
    #[must_use]
    pub fn contains(&self, key: WaypointKey) -> bool {
        self.position_at(key).is_some()
    }

    /// Number of chains in the graph.
    #[must_use]
    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    /// Number of waypoints in the provided chain, if it exists.
    #[must_use]
    pub fn chain_len(&self, chain: ChainId) -> Option<usize> {
        let chain = usize::try_from(chain.get()).ok()?;
        self.chains.get(chain).map(Vec::len)
    }

    /// Total number of waypoints across all chains.
    #[must_use]
    pub fn waypoint_count(&self) -> usize {
        self.chains.iter().map(Vec::len).sum()
    }

    /// Number of directed links recorded in the link table.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.values().map(BTreeSet::len).sum()
    }

    /// Every waypoint key, chain by chain and in travel order.
    pub fn keys(&self) -> impl Iterator<Item = WaypointKey> + '_ {
        self.chains
            .iter()
            .zip(0_u32..)
            .flat_map(|(chain, chain_id)| {
                (0_u32..)
                    .take(chain.len())
                    .map(move |index| WaypointKey::new(ChainId::new(chain_id), index))
            })
    }

    fn position_at(&self, key: WaypointKey) -> Option<Position> {
        let chain = usize::try_from(key.chain().get()).ok()?;
        let index = usize::try_from(key.index()).ok()?;
        self.chains.get(chain)?.get(index).copied()
    }
}
