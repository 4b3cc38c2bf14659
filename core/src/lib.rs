#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Waypoint Defence navigation engine.
//!
//! This crate defines the vocabulary that connects the waypoint graph, the
//! pure routing and teleport systems, the navigation agents, and the driver
//! loop that owns them. Graph data arrives as a [`GraphLayout`] authored
//! elsewhere, agents address the graph through [`WaypointKey`] values, and the
//! driver reports what happened during a tick through [`Event`] values.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// World-space position of a waypoint or agent.
pub type Position = glam::Vec3;

/// Squared distance below which an agent counts as standing on its target.
pub const DEFAULT_ARRIVAL_EPSILON_SQUARED: f32 = 1e-4;

/// Movement speed assigned to agents that have no explicit tuning.
pub const DEFAULT_SPEED: f32 = 1.0;

/// Identifier of a chain inside the waypoint graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(u32);

impl ChainId {
    /// Creates a new chain identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Address of a single waypoint: a chain and a zero-based index inside it.
///
/// Keys order by chain first and index second, which gives every collection
/// of keys a stable iteration order independent of hashing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaypointKey {
    chain: ChainId,
    index: u32,
}

impl WaypointKey {
    /// Creates a key addressing `index` within `chain`.
    #[must_use]
    pub const fn new(chain: ChainId, index: u32) -> Self {
        Self { chain, index }
    }

    /// Canonical spawn key: the first waypoint of the first chain.
    #[must_use]
    pub const fn origin() -> Self {
        Self::new(ChainId::new(0), 0)
    }

    /// Chain that contains the waypoint.
    #[must_use]
    pub const fn chain(&self) -> ChainId {
        self.chain
    }

    /// Zero-based index of the waypoint within its chain.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Key of the following waypoint in the same chain, if the index can grow.
    ///
    /// The returned key is not checked against any graph.
    #[must_use]
    pub fn next_in_chain(self) -> Option<Self> {
        self.index
            .checked_add(1)
            .map(|index| Self::new(self.chain, index))
    }
}

impl fmt::Display for WaypointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.chain.get(), self.index)
    }
}

/// Unique identifier assigned to a navigation agent by its driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Runtime failures raised while resolving waypoint references.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum NavError {
    /// The key does not identify a waypoint inside the graph.
    #[error("waypoint {0} does not exist in the graph")]
    InvalidKey(WaypointKey),
}

/// Failures raised while compiling authored layout data into a graph.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GraphError {
    /// A link referenced a waypoint that no chain provides.
    #[error("link {from} -> {to} references a missing waypoint")]
    DanglingLink {
        /// Source key of the offending link.
        from: WaypointKey,
        /// Destination key of the offending link.
        to: WaypointKey,
    },
    /// Two waypoints inside a single chain share the same position.
    #[error("chain {chain} repeats position {position} at indices {first} and {second}")]
    DuplicatePosition {
        /// Chain containing the duplicate.
        chain: u32,
        /// Index of the first occurrence.
        first: u32,
        /// Index of the repeated occurrence.
        second: u32,
        /// Position shared by both waypoints.
        position: Position,
    },
    /// A waypoint coordinate was NaN or infinite.
    #[error("waypoint {0} has a non-finite position")]
    NonFinitePosition(WaypointKey),
    /// The layout contained more chains or waypoints than keys can address.
    #[error("layout exceeds the addressable number of chains or waypoints")]
    TooLarge,
}

/// Failures raised while validating tuning values.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Speeds must be finite and non-negative.
    #[error("speed {0} must be finite and non-negative")]
    InvalidSpeed(f32),
    /// Arrival thresholds must be finite and strictly positive.
    #[error("arrival epsilon {0} must be finite and positive")]
    InvalidArrivalEpsilon(f32),
    /// Teleport distance ceilings must be finite and strictly positive.
    #[error("teleport distance {0} must be finite and positive")]
    InvalidTeleportDistance(f32),
}

/// Movement tuning shared by navigation agents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentConfig {
    default_speed: f32,
    arrival_epsilon_squared: f32,
}

impl AgentConfig {
    /// Creates a configuration after validating both values.
    pub fn new(default_speed: f32, arrival_epsilon_squared: f32) -> Result<Self, ConfigError> {
        if !default_speed.is_finite() || default_speed < 0.0 {
            return Err(ConfigError::InvalidSpeed(default_speed));
        }
        if !arrival_epsilon_squared.is_finite() || arrival_epsilon_squared <= 0.0 {
            return Err(ConfigError::InvalidArrivalEpsilon(arrival_epsilon_squared));
        }

        Ok(Self {
            default_speed,
            arrival_epsilon_squared,
        })
    }

    /// Speed restored when an agent's modifiers are reset.
    #[must_use]
    pub const fn default_speed(&self) -> f32 {
        self.default_speed
    }

    /// Squared distance under which an agent has arrived at its target.
    #[must_use]
    pub const fn arrival_epsilon_squared(&self) -> f32 {
        self.arrival_epsilon_squared
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            default_speed: DEFAULT_SPEED,
            arrival_epsilon_squared: DEFAULT_ARRIVAL_EPSILON_SQUARED,
        }
    }
}

/// Cadence and reach of the teleport ability granted to some agents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TeleportConfig {
    interval: Duration,
    max_hops: u32,
    max_distance: f32,
}

impl TeleportConfig {
    /// Creates a teleport configuration.
    ///
    /// A zero `interval` disables the timer; a zero `max_hops` makes every
    /// search come back empty.
    pub fn new(interval: Duration, max_hops: u32, max_distance: f32) -> Result<Self, ConfigError> {
        if !max_distance.is_finite() || max_distance <= 0.0 {
            return Err(ConfigError::InvalidTeleportDistance(max_distance));
        }

        Ok(Self {
            interval,
            max_hops,
            max_distance,
        })
    }

    /// Simulated time between teleport attempts.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Maximum number of graph edges a teleport may span.
    #[must_use]
    pub const fn max_hops(&self) -> u32 {
        self.max_hops
    }

    /// Maximum straight-line distance a teleport may cover.
    #[must_use]
    pub const fn max_distance(&self) -> f32 {
        self.max_distance
    }
}

/// Authored description of a waypoint graph, as produced by import tooling.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphLayout {
    /// Chains in id order; the position in this list is the chain id.
    #[serde(default)]
    pub chains: Vec<ChainLayout>,
    /// Cross-links between waypoints.
    #[serde(default)]
    pub links: Vec<LinkLayout>,
}

/// Ordered waypoint positions that make up one chain.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainLayout {
    /// Waypoint coordinates in travel order.
    pub waypoints: Vec<[f32; 3]>,
}

/// Authored link between two waypoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkLayout {
    /// Waypoint the link starts from.
    pub from: WaypointKey,
    /// Waypoint reachable through the link.
    pub to: WaypointKey,
    /// When set only `from -> to` is recorded; otherwise the mirror is added too.
    #[serde(default)]
    pub one_way: bool,
}

/// Notifications emitted by the driver loop while advancing agents.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an agent joined the roster.
    AgentSpawned {
        /// Identifier assigned to the agent.
        agent: AgentId,
    },
    /// Reports that an agent reached its target and picked the next waypoint.
    WaypointReached {
        /// Agent that arrived.
        agent: AgentId,
        /// Waypoint the agent arrived at.
        from: WaypointKey,
        /// Waypoint the agent now travels toward.
        to: WaypointKey,
    },
    /// Reports that an agent jumped to a non-adjacent waypoint.
    AgentTeleported {
        /// Agent that teleported.
        agent: AgentId,
        /// Waypoint the agent was heading for before the jump.
        from: WaypointKey,
        /// Waypoint the agent landed on.
        to: WaypointKey,
    },
    /// Announces that an agent ran out of route and left the roster.
    PathFinished {
        /// Agent whose path ended.
        agent: AgentId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_order_by_chain_then_index() {
        let mut keys = vec![
            WaypointKey::new(ChainId::new(1), 0),
            WaypointKey::new(ChainId::new(0), 3),
            WaypointKey::new(ChainId::new(0), 1),
        ];
        keys.sort();

        assert_eq!(
            keys,
            vec![
                WaypointKey::new(ChainId::new(0), 1),
                WaypointKey::new(ChainId::new(0), 3),
                WaypointKey::new(ChainId::new(1), 0),
            ]
        );
    }

    #[test]
    fn next_in_chain_stops_at_index_overflow() {
        let last = WaypointKey::new(ChainId::new(2), u32::MAX);
        assert_eq!(last.next_in_chain(), None);
        assert_eq!(
            WaypointKey::origin().next_in_chain(),
            Some(WaypointKey::new(ChainId::new(0), 1))
        );
    }

    #[test]
    fn agent_config_rejects_bad_values() {
        assert_eq!(
            AgentConfig::new(-1.0, 0.01),
            Err(ConfigError::InvalidSpeed(-1.0))
        );
        assert!(matches!(
            AgentConfig::new(1.0, 0.0),
            Err(ConfigError::InvalidArrivalEpsilon(_))
        ));
        assert!(AgentConfig::new(f32::NAN, 0.01).is_err());
        assert!(AgentConfig::new(0.0, 0.01).is_ok());
    }

    #[test]
    fn teleport_config_requires_positive_distance() {
        assert!(TeleportConfig::new(Duration::from_secs(2), 3, 0.0).is_err());
        assert!(TeleportConfig::new(Duration::from_secs(2), 3, f32::INFINITY).is_err());

        let config =
            TeleportConfig::new(Duration::from_secs(2), 3, 5.0).expect("valid teleport config");
        assert_eq!(config.max_hops(), 3);
        assert_eq!(config.interval(), Duration::from_secs(2));
    }

    #[test]
    fn layout_parses_from_toml() {
        let source = r#"
            [[chains]]
            waypoints = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]

            [[chains]]
            waypoints = [[0.0, 1.0, 0.0], [1.0, 1.0, 0.0]]

            [[links]]
            from = { chain = 0, index = 1 }
            to = { chain = 1, index = 0 }
        "#;

        let layout: GraphLayout = toml::from_str(source).expect("layout parses");

        assert_eq!(layout.chains.len(), 2);
        assert_eq!(layout.chains[1].waypoints[1], [1.0, 1.0, 0.0]);
        assert_eq!(
            layout.links,
            vec![LinkLayout {
                from: WaypointKey::new(ChainId::new(0), 1),
                to: WaypointKey::new(ChainId::new(1), 0),
                one_way: false,
            }]
        );
    }
}
