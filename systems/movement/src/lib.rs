#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Navigation agents that walk the waypoint graph one tick at a time.
//!
//! An agent starts `Unstarted`, is placed on the graph on its first advance
//! (or explicitly through [`NavigationAgent::place_at`]), travels from target
//! to target while the route resolver keeps producing successors, and ends
//! `Finished` once no candidate remains. Reaching `Finished` invokes the
//! path-finished callback exactly once; later advances do nothing.

use std::{fmt, sync::Arc};

use tracing::{debug, warn};
use waypoint_defence_core::{AgentConfig, AgentId, NavError, Position, WaypointKey};
use waypoint_defence_graph::WaypointGraph;
use waypoint_defence_system_routing::{RouteResolver, TraversalState};

/// Notification invoked once when an agent runs out of route.
pub type FinishedCallback = Box<dyn FnMut(AgentId)>;

/// Lifecycle of a navigation agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No traversal state has been assigned yet.
    Unstarted,
    /// The agent is moving toward its current target.
    Traveling,
    /// The route ended or the graph could not be read; the agent is inert.
    Finished,
}

/// Outcome of a single [`NavigationAgent::advance`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Progress {
    /// Nothing changed: the agent is finished or did not move.
    Idle,
    /// The agent moved but has not reached its target.
    Moved,
    /// The agent reached its target and adopted a new one.
    Arrived {
        /// Waypoint that was reached.
        from: WaypointKey,
        /// Waypoint the agent heads for next.
        to: WaypointKey,
    },
    /// The agent finished during this advance.
    Finished,
}

/// Agent that follows the waypoint graph using its own traversal state.
pub struct NavigationAgent {
    id: AgentId,
    graph: Arc<WaypointGraph>,
    config: AgentConfig,
    seed: u64,
    speed: f32,
    position: Position,
    phase: Phase,
    state: Option<TraversalState>,
    on_finished: Option<FinishedCallback>,
}

impl NavigationAgent {
    /// Creates an unstarted agent.
    ///
    /// `seed` initialises the route stream of every state the agent creates
    /// for itself; `on_finished` runs once when the path ends.
    pub fn new<F>(
        id: AgentId,
        graph: Arc<WaypointGraph>,
        config: AgentConfig,
        seed: u64,
        on_finished: F,
    ) -> Self
    where
        F: FnMut(AgentId) + 'static,
    {
        Self {
            id,
            graph,
            speed: config.default_speed(),
            config,
            seed,
            position: Position::ZERO,
            phase: Phase::Unstarted,
            state: None,
            on_finished: Some(Box::new(on_finished)),
        }
    }

    /// Identifier assigned at construction.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Reports whether the agent reached the end of its path.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Current world position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Current movement speed in world units per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Traversal state, once the agent has been placed on the graph.
    #[must_use]
    pub fn state(&self) -> Option<&TraversalState> {
        self.state.as_ref()
    }

    /// Shared graph the agent navigates.
    #[must_use]
    pub fn graph(&self) -> &Arc<WaypointGraph> {
        &self.graph
    }

    /// Tuning the agent was created with.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Overrides the movement speed.
    ///
    /// Negative and NaN values become zero and infinite speeds saturate at
    /// `f32::MAX`, so the stored speed is always finite.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = if speed.is_nan() {
            0.0
        } else {
            speed.clamp(0.0, f32::MAX)
        };
    }

    /// Restores the configured default speed.
    pub fn reset_speed(&mut self) {
        self.speed = self.config.default_speed();
    }

    /// Normalised direction toward the current target.
    ///
    /// Zero when the agent is not traveling or already sits on its target.
    #[must_use]
    pub fn heading(&self) -> Position {
        match (&self.state, self.phase) {
            (Some(state), Phase::Traveling) => {
                (state.target_position() - self.position).normalize_or_zero()
            }
            _ => Position::ZERO,
        }
    }

    /// Places the agent on `key` with a state seeded from the agent's seed.
    ///
    /// Returns `Ok(false)` without changes when the agent already finished.
    pub fn place_at(&mut self, key: WaypointKey) -> Result<bool, NavError> {
        let state = TraversalState::at(&self.graph, key, self.seed)?;
        Ok(self.relocate(state))
    }

    /// Replaces the traversal state and moves the agent onto its target.
    ///
    /// Returns `false` and leaves the agent untouched once it has finished.
    pub fn relocate(&mut self, state: TraversalState) -> bool {
        if self.phase == Phase::Finished {
            return false;
        }

        self.position = state.target_position();
        self.state = Some(state);
        self.phase = Phase::Traveling;
        true
    }

    /// Advances the agent by `dt` seconds.
    ///
    /// Non-finite or negative `dt` counts as zero elapsed time.
    pub fn advance(&mut self, dt: f32) -> Progress {
        match self.phase {
            Phase::Finished => return Progress::Idle,
            Phase::Unstarted => {
                if let Err(error) = self.start() {
                    warn!(agent = %self.id, %error, "graph has no spawn waypoint; finishing agent");
                    self.finish();
                    return Progress::Finished;
                }
            }
            Phase::Traveling => {}
        }

        let Some(state) = self.state.as_ref() else {
            self.finish();
            return Progress::Finished;
        };

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let target = state.target_position();
        let before = self.position;
        self.position = step_towards(self.position, target, self.speed * dt);

        if self.position.distance_squared(target) >= self.config.arrival_epsilon_squared() {
            return if self.position == before {
                Progress::Idle
            } else {
                Progress::Moved
            };
        }

        let from = state.key();
        match RouteResolver::new(&self.graph).advance(state) {
            Ok(Some(next)) => {
                let to = next.key();
                debug!(agent = %self.id, %from, %to, "waypoint reached");
                self.state = Some(next);
                Progress::Arrived { from, to }
            }
            Ok(None) => {
                debug!(agent = %self.id, %from, "path finished");
                self.finish();
                Progress::Finished
            }
            Err(error) => {
                warn!(agent = %self.id, %error, "malformed graph data; finishing agent");
                self.finish();
                Progress::Finished
            }
        }
    }

    fn start(&mut self) -> Result<(), NavError> {
        let spawn = self.graph.first_waypoint()?;
        let state = TraversalState::new(WaypointKey::origin(), spawn, self.seed);
        let _ = self.relocate(state);
        Ok(())
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        if let Some(mut on_finished) = self.on_finished.take() {
            on_finished(self.id);
        }
    }
}

impl fmt::Debug for NavigationAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationAgent")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("position", &self.position)
            .field("speed", &self.speed)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn step_towards(from: Position, to: Position, max_step: f32) -> Position {
    if max_step.is_nan() {
        return from;
    }

    let offset = to - from;
    let distance = offset.length();
    if distance <= max_step || distance <= f32::EPSILON {
        return to;
    }

    from + offset * (max_step / distance)
}
