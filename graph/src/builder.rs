//! Incremental assembly and validation of waypoint graphs.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;
use waypoint_defence_core::{ChainId, GraphError, Position, WaypointKey};

use crate::WaypointGraph;

/// Collects chains and links, then validates them into a [`WaypointGraph`].
#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    chains: Vec<Vec<Position>>,
    links: Vec<(WaypointKey, WaypointKey)>,
}

impl GraphBuilder {
    /// Appends a chain and returns the identifier it will carry.
    pub fn chain<I>(&mut self, waypoints: I) -> ChainId
    where
        I: IntoIterator<Item = Position>,
    {
        let id = u32::try_from(self.chains.len()).unwrap_or(u32::MAX);
        self.chains.push(waypoints.into_iter().collect());
        ChainId::new(id)
    }

    /// Records a link in both directions.
    pub fn link(&mut self, a: WaypointKey, b: WaypointKey) {
        self.links.push((a, b));
        self.links.push((b, a));
    }

    /// Records a link that only leads from `from` to `to`.
    pub fn one_way_link(&mut self, from: WaypointKey, to: WaypointKey) {
        self.links.push((from, to));
    }

    /// Validates the collected data and produces the immutable graph.
    pub fn build(self) -> Result<WaypointGraph, GraphError> {
        if u32::try_from(self.chains.len()).is_err() {
            return Err(GraphError::TooLarge);
        }

        for (chain, chain_id) in self.chains.iter().zip(0_u32..) {
            validate_chain(chain, chain_id)?;
        }

        let mut graph = WaypointGraph {
            chains: self.chains,
            links: BTreeMap::new(),
        };

        let mut links: BTreeMap<WaypointKey, BTreeSet<WaypointKey>> = BTreeMap::new();
        for (from, to) in self.links {
            if !graph.contains(from) || !graph.contains(to) {
                return Err(GraphError::DanglingLink { from, to });
            }
            let _ = links.entry(from).or_default().insert(to);
        }
        graph.links = links;

        debug!(
            chains = graph.chain_count(),
            waypoints = graph.waypoint_count(),
            links = graph.link_count(),
            "compiled waypoint graph"
        );

        Ok(graph)
    }
}

fn validate_chain(chain: &[Position], chain_id: u32) -> Result<(), GraphError> {
    if u32::try_from(chain.len()).is_err() {
        return Err(GraphError::TooLarge);
    }

    let mut seen: HashMap<[u32; 3], u32> = HashMap::with_capacity(chain.len());
    for (position, index) in chain.iter().zip(0_u32..) {
        if !position.is_finite() {
            return Err(GraphError::NonFinitePosition(WaypointKey::new(
                ChainId::new(chain_id),
                index,
            )));
        }

        if let Some(first) = seen.insert(position_bits(*position), index) {
            return Err(GraphError::DuplicatePosition {
                chain: chain_id,
                first,
                second: index,
                position: *position,
            });
        }
    }

    Ok(())
}

// Adding 0.0 folds -0.0 into 0.0 so both signs hash to the same bits.
fn position_bits(position: Position) -> [u32; 3] {
    let normalized = position + Position::ZERO;
    [
        normalized.x.to_bits(),
        normalized.y.to_bits(),
        normalized.z.to_bits(),
    ]
}
