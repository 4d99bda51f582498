//! Fluent builder for constructing a [`Sim`].

use gw_core::SimConfig;
use gw_grid::Grid;
use gw_route::{AgentSpec, Scenario, validate_agents};

use crate::{NoopObserver, Sim, SimObserver, SimResult};

/// Fluent builder for [`Sim<O>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: grid size, tenth length, grid-size cap
/// - `Vec<AgentSpec>`: from a loader or the route generator
///
/// # Optional inputs
///
/// | Method          | Default          |
/// |-----------------|------------------|
/// | `.observer(o)`  | [`NoopObserver`] |
///
/// All validation happens in [`build`](Self::build), before any thread
/// exists: a bad grid size or an off-grid step never reaches a runner.
///
/// # Example
///
/// ```rust,ignore
/// let sim = SimBuilder::new(config, agents)
///     .observer(EventLogObserver::new(ConsoleWriter::stdout()))
///     .build()?;
/// let report = sim.run()?;
/// ```
pub struct SimBuilder<O: SimObserver> {
    config:   SimConfig,
    agents:   Vec<AgentSpec>,
    observer: O,
}

impl SimBuilder<NoopObserver> {
    pub fn new(config: SimConfig, agents: Vec<AgentSpec>) -> Self {
        Self { config, agents, observer: NoopObserver }
    }

    /// Take grid size and agents from a loaded scenario; `config` supplies
    /// everything else.
    pub fn from_scenario(mut config: SimConfig, scenario: Scenario) -> Self {
        config.grid_size = scenario.grid_size;
        Self::new(config, scenario.agents)
    }
}

impl<O: SimObserver> SimBuilder<O> {
    /// Replace the observer.
    pub fn observer<P: SimObserver>(self, observer: P) -> SimBuilder<P> {
        SimBuilder { config: self.config, agents: self.agents, observer }
    }

    /// Validate configuration and routes, build the grid, return a ready
    /// [`Sim`].
    pub fn build(self) -> SimResult<Sim<O>> {
        let grid = Grid::from_config(&self.config)?;
        validate_agents(&self.agents, grid.size())?;

        Ok(Sim {
            config:   self.config,
            grid,
            agents:   self.agents,
            observer: self.observer,
        })
    }
}
