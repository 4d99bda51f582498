//! Agent definitions and pre-launch validation.

use rustc_hash::FxHashSet;

use gw_core::{AgentId, GroupId};

use crate::{Route, RouteError, RouteResult};

/// An agent as loaded from input: identity, group, and itinerary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentSpec {
    pub id:    AgentId,
    pub group: GroupId,
    pub route: Route,
}

impl AgentSpec {
    pub fn new(id: u32, group: u32, route: Route) -> Self {
        Self { id: AgentId(id), group: GroupId(group), route }
    }
}

/// A fully loaded input: grid side plus every agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    pub grid_size: u32,
    pub agents:    Vec<AgentSpec>,
}

impl Scenario {
    /// Run [`validate_agents`] against this scenario's own grid size.
    pub fn validate(&self) -> RouteResult<()> {
        validate_agents(&self.agents, self.grid_size)
    }
}

/// Check ids are unique and every step lies on a `grid_size`² grid.
pub fn validate_agents(agents: &[AgentSpec], grid_size: u32) -> RouteResult<()> {
    let mut seen = FxHashSet::default();
    for agent in agents {
        if !seen.insert(agent.id) {
            return Err(RouteError::DuplicateAgent(agent.id));
        }
        if let Some((step, s)) = agent.route.first_out_of_bounds(grid_size) {
            return Err(RouteError::OutOfBounds {
                agent: agent.id,
                step,
                pos: s.pos,
                size: grid_size,
            });
        }
    }
    Ok(())
}
