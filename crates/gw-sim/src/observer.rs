//! Simulation observer trait for event logging and test instrumentation.

use std::sync::Arc;

use gw_core::{AgentId, GroupId, Position, Tenths};

use crate::SimReport;

/// An agent acting on a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellEvent {
    pub agent: AgentId,
    pub group: GroupId,
    pub pos:   Position,
}

/// Start or end of one dwell.  `at` is read from the shared clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DwellEvent {
    pub agent: AgentId,
    pub group: GroupId,
    pub pos:   Position,
    pub dwell: Tenths,
    pub at:    Tenths,
}

/// Callbacks invoked by agent runners.
///
/// Every runner calls the same observer from its own thread, so methods take
/// `&self` and implementors synchronise internally.  All methods have default
/// no-op implementations.
///
/// [`on_claim`](Self::on_claim) and [`on_release`](Self::on_release) run
/// while the affected cell's lock is held: events for one cell are therefore
/// totally ordered, but the callback must not touch the grid and should be
/// quick.
///
/// # Example: claim counter
///
/// ```rust,ignore
/// struct Claims(AtomicUsize);
///
/// impl SimObserver for Claims {
///     fn on_claim(&self, _ev: &CellEvent) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait SimObserver: Sync {
    /// The runner thread for `agent` has started.
    fn on_agent_start(&self, _agent: AgentId, _group: GroupId) {}

    /// The target cell is held by the agent's own group; the runner has
    /// released its previous cell and is about to suspend.
    fn on_wait(&self, _event: &CellEvent) {}

    /// The agent's group marker was just written.  Cell lock held.
    fn on_claim(&self, _event: &CellEvent) {}

    /// The agent is about to clear the marker.  Cell lock held.
    fn on_release(&self, _event: &CellEvent) {}

    fn on_dwell_start(&self, _event: &DwellEvent) {}

    fn on_dwell_end(&self, _event: &DwellEvent) {}

    /// The runner reached `Finished` and holds no cell.
    fn on_agent_finish(&self, _agent: AgentId, _at: Tenths) {}

    /// Called once by the launcher after every runner has been joined.
    fn on_sim_end(&self, _report: &SimReport) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

impl<T: SimObserver + ?Sized> SimObserver for &T {
    fn on_agent_start(&self, agent: AgentId, group: GroupId) { (**self).on_agent_start(agent, group) }
    fn on_wait(&self, event: &CellEvent) { (**self).on_wait(event) }
    fn on_claim(&self, event: &CellEvent) { (**self).on_claim(event) }
    fn on_release(&self, event: &CellEvent) { (**self).on_release(event) }
    fn on_dwell_start(&self, event: &DwellEvent) { (**self).on_dwell_start(event) }
    fn on_dwell_end(&self, event: &DwellEvent) { (**self).on_dwell_end(event) }
    fn on_agent_finish(&self, agent: AgentId, at: Tenths) { (**self).on_agent_finish(agent, at) }
    fn on_sim_end(&self, report: &SimReport) { (**self).on_sim_end(report) }
}

impl<T: SimObserver + Send + ?Sized> SimObserver for Arc<T> {
    fn on_agent_start(&self, agent: AgentId, group: GroupId) { (**self).on_agent_start(agent, group) }
    fn on_wait(&self, event: &CellEvent) { (**self).on_wait(event) }
    fn on_claim(&self, event: &CellEvent) { (**self).on_claim(event) }
    fn on_release(&self, event: &CellEvent) { (**self).on_release(event) }
    fn on_dwell_start(&self, event: &DwellEvent) { (**self).on_dwell_start(event) }
    fn on_dwell_end(&self, event: &DwellEvent) { (**self).on_dwell_end(event) }
    fn on_agent_finish(&self, agent: AgentId, at: Tenths) { (**self).on_agent_finish(agent, at) }
    fn on_sim_end(&self, report: &SimReport) { (**self).on_sim_end(report) }
}

/// Fan out to two observers, first `A` then `B`.
impl<A: SimObserver, B: SimObserver> SimObserver for (A, B) {
    fn on_agent_start(&self, agent: AgentId, group: GroupId) {
        self.0.on_agent_start(agent, group);
        self.1.on_agent_start(agent, group);
    }
    fn on_wait(&self, event: &CellEvent) {
        self.0.on_wait(event);
        self.1.on_wait(event);
    }
    fn on_claim(&self, event: &CellEvent) {
        self.0.on_claim(event);
        self.1.on_claim(event);
    }
    fn on_release(&self, event: &CellEvent) {
        self.0.on_release(event);
        self.1.on_release(event);
    }
    fn on_dwell_start(&self, event: &DwellEvent) {
        self.0.on_dwell_start(event);
        self.1.on_dwell_start(event);
    }
    fn on_dwell_end(&self, event: &DwellEvent) {
        self.0.on_dwell_end(event);
        self.1.on_dwell_end(event);
    }
    fn on_agent_finish(&self, agent: AgentId, at: Tenths) {
        self.0.on_agent_finish(agent, at);
        self.1.on_agent_finish(agent, at);
    }
    fn on_sim_end(&self, report: &SimReport) {
        self.0.on_sim_end(report);
        self.1.on_sim_end(report);
    }
}
