//! Per-agent counters and the run summary returned by [`Sim::run`][crate::Sim::run].

use gw_core::{AgentId, GroupId, Tenths};

/// What one runner did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentStats {
    pub agent:             AgentId,
    pub group:             GroupId,
    /// Markers written through `enter`/`try_enter`.
    pub claims:            u32,
    /// Consecutive steps on the same cell.
    pub reclaims:          u32,
    /// Markers cleared (hand-offs, yields, and the final release).
    pub releases:          u32,
    /// Times the runner suspended on a same-group occupant.
    pub waits:             u32,
    /// Hand-offs whose old-cell lock was busy and was taken after dropping
    /// the new one.
    pub deferred_handoffs: u32,
    pub started_at:        Tenths,
    pub finished_at:       Tenths,
}

impl AgentStats {
    pub fn new(agent: AgentId, group: GroupId) -> Self {
        Self {
            agent,
            group,
            claims:            0,
            reclaims:          0,
            releases:          0,
            waits:             0,
            deferred_handoffs: 0,
            started_at:        Tenths::ZERO,
            finished_at:       Tenths::ZERO,
        }
    }
}

/// Summary of a completed run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimReport {
    /// One entry per agent, in input order.
    pub agents:  Vec<AgentStats>,
    /// Clock reading after the last runner was joined.
    pub elapsed: Tenths,
}

impl SimReport {
    pub fn total_waits(&self) -> u64 {
        self.agents.iter().map(|a| a.waits as u64).sum()
    }

    pub fn total_claims(&self) -> u64 {
        self.agents.iter().map(|a| a.claims as u64).sum()
    }

    pub fn stats_for(&self, agent: AgentId) -> Option<&AgentStats> {
        self.agents.iter().find(|a| a.agent == agent)
    }
}
