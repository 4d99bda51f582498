//! The launcher: one scoped thread per agent, all sharing one grid.

use std::thread;

use gw_core::SimConfig;
use gw_grid::Grid;
use gw_route::AgentSpec;
use tracing::{error, info};

use crate::{AgentRunner, AgentStats, SimError, SimObserver, SimReport, SimResult};

/// A validated, ready-to-run simulation.
///
/// Create via [`SimBuilder`][crate::SimBuilder].  [`run`](Self::run) may be
/// called more than once: every runner leaves the grid free when it finishes.
pub struct Sim<O: SimObserver> {
    pub config:   SimConfig,
    pub grid:     Grid,
    pub agents:   Vec<AgentSpec>,
    pub observer: O,
}

impl<O: SimObserver> Sim<O> {
    /// Start one thread per agent and wait for all of them.
    ///
    /// No thread outlives this call.  If any runner fails, the remaining
    /// runners still finish and the first failure (in agent order) is
    /// returned.
    pub fn run(&self) -> SimResult<SimReport> {
        let clock = self.config.make_clock();
        info!(
            agents = self.agents.len(),
            grid = self.grid.size(),
            tenth_ms = self.config.tenth_millis,
            "launching agents"
        );

        let grid = &self.grid;
        let observer = &self.observer;

        let outcomes: Vec<SimResult<AgentStats>> = thread::scope(|s| {
            let handles: Vec<_> = self
                .agents
                .iter()
                .map(|agent| {
                    let handle = thread::Builder::new()
                        .name(format!("agent-{}", agent.id.0))
                        .spawn_scoped(s, move || {
                            AgentRunner::new(agent, grid, clock, observer).run()
                        });
                    (agent, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(agent, handle)| match handle {
                    Err(source) => Err(SimError::Spawn { agent: agent.id, source }),
                    Ok(h) => h.join().unwrap_or_else(|_| Err(SimError::AgentPanicked(agent.id))),
                })
                .collect()
        });

        let mut stats = Vec::with_capacity(outcomes.len());
        let mut first_err = None;
        for outcome in outcomes {
            match outcome {
                Ok(s) => stats.push(s),
                Err(e) => {
                    error!(error = %e, "agent failed");
                    first_err.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_err {
            return Err(e);
        }

        let report = SimReport { agents: stats, elapsed: clock.now() };
        info!(
            elapsed_tenths = report.elapsed.0,
            claims = report.total_claims(),
            waits = report.total_waits(),
            "all agents finished"
        );
        self.observer.on_sim_end(&report);
        Ok(report)
    }

    /// Unwrap the observer (e.g. to inspect recorded events after the run).
    pub fn into_observer(self) -> O {
        self.observer
    }
}
