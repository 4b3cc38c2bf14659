//! TOML scenario files describing a graph and the agents walking it.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use waypoint_defence_core::{
    AgentConfig, GraphLayout, TeleportConfig, DEFAULT_ARRIVAL_EPSILON_SQUARED, DEFAULT_SPEED,
};

const DEFAULT_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;
const DEFAULT_TICK_SECONDS: f32 = 1.0 / 60.0;

/// Graph layout, timing and agent roster loaded from disk.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    /// Master seed for every agent's random streams.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Simulated seconds per tick.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f32,
    /// Authored chains and links.
    pub graph: GraphLayout,
    /// Agent groups spawned at the start of the run.
    #[serde(default)]
    pub agents: Vec<AgentGroup>,
}

/// Identically tuned agents spawned together.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct AgentGroup {
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_arrival_epsilon_squared")]
    pub arrival_epsilon_squared: f32,
    #[serde(default)]
    pub teleport: Option<TeleportSection>,
}

/// Teleport ability granted to an agent group.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TeleportSection {
    pub interval_seconds: f32,
    pub max_hops: u32,
    pub max_distance: f32,
}

impl Scenario {
    /// Reads and parses the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid scenario {}", path.display()))
    }

    /// Parses scenario TOML contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse scenario toml contents")
    }

    /// Tick length as a duration, optionally overridden from the command line.
    pub(crate) fn tick(&self, override_seconds: Option<f32>) -> Result<Duration> {
        let seconds = override_seconds.unwrap_or(self.tick_seconds);
        Duration::try_from_secs_f32(seconds)
            .with_context(|| format!("tick length {seconds} is not a valid duration"))
    }
}

impl AgentGroup {
    /// Movement tuning shared by the group.
    pub(crate) fn agent_config(&self) -> Result<AgentConfig> {
        AgentConfig::new(self.speed, self.arrival_epsilon_squared)
            .context("invalid agent tuning")
    }

    /// Teleport tuning, if the group can teleport.
    pub(crate) fn teleport_config(&self) -> Result<Option<TeleportConfig>> {
        let Some(section) = &self.teleport else {
            return Ok(None);
        };

        let interval = Duration::try_from_secs_f32(section.interval_seconds).with_context(|| {
            format!(
                "teleport interval {} is not a valid duration",
                section.interval_seconds
            )
        })?;
        let config = TeleportConfig::new(interval, section.max_hops, section.max_distance)
            .context("invalid teleport tuning")?;
        Ok(Some(config))
    }
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_tick_seconds() -> f32 {
    DEFAULT_TICK_SECONDS
}

fn default_count() -> u32 {
    1
}

fn default_speed() -> f32 {
    DEFAULT_SPEED
}

fn default_arrival_epsilon_squared() -> f32 {
    DEFAULT_ARRIVAL_EPSILON_SQUARED
}
