//! The per-agent state machine.

use gw_core::{Position, SimClock};
use gw_grid::{CellGuard, Grid, TryEnter};
use gw_route::{AgentSpec, Step};
use tracing::{debug, trace};

use crate::{AgentStats, CellEvent, DwellEvent, SimError, SimObserver, SimResult};

/// Where a runner is in its route.  The index is the step number.
///
/// ```text
/// Idle → Entering(0) → Occupying(0) → Dwelling(0) → Releasing(0)
///      → Entering(1) → … → Releasing(last) → Finished
/// ```
///
/// `Releasing(i)` covers the hand-off of cell `i`: it is cleared while the
/// runner enters step `i + 1`, or by the final release after the last step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Entering(usize),
    Occupying(usize),
    Dwelling(usize),
    Releasing(usize),
    Finished,
}

/// Walks one agent's route on the shared grid.
///
/// One runner per agent, each on its own thread.  Runners never talk to each
/// other; they only meet through cell markers.
///
/// If the runner is dropped while still holding a cell (an error or a panic
/// in an observer), the cell is cleared so same-group waiters are not stranded.
pub struct AgentRunner<'a, O: SimObserver + ?Sized> {
    agent:    &'a AgentSpec,
    grid:     &'a Grid,
    clock:    SimClock,
    observer: &'a O,
    state:    RunnerState,
    /// The cell whose marker this runner set and has not cleared yet.
    held:     Option<Position>,
    /// A newly marked cell whose hand-off has not completed.
    claimed:  Option<Position>,
    stats:    AgentStats,
}

impl<'a, O: SimObserver + ?Sized> AgentRunner<'a, O> {
    pub fn new(agent: &'a AgentSpec, grid: &'a Grid, clock: SimClock, observer: &'a O) -> Self {
        Self {
            agent,
            grid,
            clock,
            observer,
            state: RunnerState::Idle,
            held: None,
            claimed: None,
            stats: AgentStats::new(agent.id, agent.group),
        }
    }

    #[inline]
    pub fn state(&self) -> RunnerState {
        self.state
    }

    #[inline]
    pub fn held(&self) -> Option<Position> {
        self.held
    }

    /// Walk the whole route and return the runner's counters.
    pub fn run(mut self) -> SimResult<AgentStats> {
        self.stats.started_at = self.clock.now();
        self.observer.on_agent_start(self.agent.id, self.agent.group);
        debug!(
            agent = self.agent.id.0,
            group = self.agent.group.0,
            steps = self.agent.route.len(),
            "runner started"
        );

        let agent = self.agent;
        for (i, step) in agent.route.steps().iter().enumerate() {
            self.advance(RunnerState::Entering(i))?;
            self.enter_step(step)?;
            self.advance(RunnerState::Occupying(i))?;

            self.advance(RunnerState::Dwelling(i))?;
            self.dwell(step);
            self.advance(RunnerState::Releasing(i))?;
        }

        // Final release, exactly once.
        let last = self
            .held
            .ok_or_else(|| self.violation("route finished without a held cell".into()))?;
        let grid = self.grid;
        self.vacate(grid.cell(last)?.hold())?;
        self.advance(RunnerState::Finished)?;

        self.stats.finished_at = self.clock.now();
        self.observer.on_agent_finish(self.agent.id, self.stats.finished_at);
        debug!(agent = self.agent.id.0, at = self.stats.finished_at.0, "runner finished");
        Ok(self.stats.clone())
    }

    // ── Entry and hand-off ────────────────────────────────────────────────

    fn enter_step(&mut self, step: &Step) -> SimResult<()> {
        let grid = self.grid;
        let cell = grid.cell(step.pos)?;
        let group = self.agent.group;

        // Same cell again: never wait on our own marker, never lock twice.
        if self.held == Some(step.pos) {
            cell.reclaim(group);
            self.stats.reclaims += 1;
            trace!(agent = self.agent.id.0, cell = %step.pos, "stays on cell");
            return Ok(());
        }

        let guard = match cell.try_enter(group) {
            TryEnter::Claimed(guard) => guard,
            TryEnter::Contended => {
                // Nobody sleeps while holding a claim.
                if let Some(prev) = self.held {
                    let prev_guard = grid.cell(prev)?.hold();
                    self.vacate(prev_guard)?;
                }
                self.stats.waits += 1;
                self.observer.on_wait(&self.cell_event(step.pos));
                debug!(
                    agent = self.agent.id.0,
                    group = group.0,
                    cell = %step.pos,
                    "waiting for same-group occupant"
                );
                cell.enter(group)
            }
        };

        // Recorded before any observer runs, so an unwinding runner clears it.
        self.claimed = Some(step.pos);
        self.stats.claims += 1;
        self.observer.on_claim(&self.cell_event(step.pos));

        match self.held {
            None => {
                self.held = self.claimed.take();
                drop(guard);
            }
            Some(prev) => self.handoff(guard, prev)?,
        }
        Ok(())
    }

    /// Clear `prev` after the new cell has been marked.  `new_guard` still
    /// holds the new cell's lock.
    fn handoff(&mut self, new_guard: CellGuard<'a>, prev: Position) -> SimResult<()> {
        let new_pos = new_guard.position();
        let grid = self.grid;
        let prev_cell = grid.cell(prev)?;

        match prev_cell.try_hold() {
            Some(prev_guard) => {
                self.vacate(prev_guard)?;
                drop(new_guard);
            }
            None => {
                // Blocking on the old lock while holding the new one could
                // close a cycle with a runner moving the other way.
                drop(new_guard);
                self.stats.deferred_handoffs += 1;
                let prev_guard = prev_cell.hold();
                self.vacate(prev_guard)?;
            }
        }
        self.held = self.claimed.take();
        trace!(agent = self.agent.id.0, from = %prev, to = %new_pos, "handed off");
        Ok(())
    }

    /// Clear the marker of the held cell and broadcast.
    fn vacate(&mut self, guard: CellGuard<'_>) -> SimResult<()> {
        let pos = guard.position();
        if self.held != Some(pos) {
            return Err(self.violation(format!("released {pos} while holding {:?}", self.held)));
        }
        self.observer.on_release(&self.cell_event(pos));
        let cleared = guard.vacate();
        if cleared != Some(self.agent.group) {
            trace!(agent = self.agent.id.0, cell = %pos, ?cleared, "marker had been overwritten");
        }
        self.held = None;
        self.stats.releases += 1;
        Ok(())
    }

    // ── Dwell ─────────────────────────────────────────────────────────────

    fn dwell(&self, step: &Step) {
        let mut event = DwellEvent {
            agent: self.agent.id,
            group: self.agent.group,
            pos:   step.pos,
            dwell: step.dwell,
            at:    self.clock.now(),
        };
        self.observer.on_dwell_start(&event);
        self.clock.sleep(step.dwell);
        event.at = self.clock.now();
        self.observer.on_dwell_end(&event);
    }

    // ── State machine ─────────────────────────────────────────────────────

    pub(crate) fn advance(&mut self, next: RunnerState) -> SimResult<()> {
        use RunnerState::*;

        let last = self.agent.route.len() - 1;
        let legal = match (self.state, next) {
            (Idle, Entering(0)) => true,
            (Entering(i), Occupying(j))
            | (Occupying(i), Dwelling(j))
            | (Dwelling(i), Releasing(j)) => i == j,
            (Releasing(i), Entering(j)) => j == i + 1 && j <= last,
            (Releasing(i), Finished) => i == last && self.held.is_none(),
            _ => false,
        };
        if !legal {
            return Err(self.violation(format!("illegal transition {:?} -> {next:?}", self.state)));
        }
        self.state = next;
        Ok(())
    }

    fn violation(&self, detail: String) -> SimError {
        SimError::ProtocolViolation { agent: self.agent.id, detail }
    }

    fn cell_event(&self, pos: Position) -> CellEvent {
        CellEvent { agent: self.agent.id, group: self.agent.group, pos }
    }
}

impl<O: SimObserver + ?Sized> Drop for AgentRunner<'_, O> {
    fn drop(&mut self) {
        for pos in [self.held.take(), self.claimed.take()].into_iter().flatten() {
            debug!(agent = self.agent.id.0, cell = %pos, "abandoning held cell");
            if let Ok(cell) = self.grid.cell(pos) {
                cell.leave();
            }
        }
    }
}
