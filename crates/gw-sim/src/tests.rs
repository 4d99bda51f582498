//! Integration tests for gw-sim.
//!
//! Every concurrent run goes through `run_bounded`, which fails the test
//! instead of hanging when the runners deadlock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use gw_core::{AgentId, GroupId, Position, SimConfig, Tenths};
use gw_route::{AgentSpec, GeneratorParams, Route, RouteGenerator, Step};

use crate::{CellEvent, DwellEvent, Sim, SimBuilder, SimObserver, SimReport, SimResult};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(grid_size: u32) -> SimConfig {
    SimConfig {
        grid_size,
        tenth_millis:  10,
        seed:          1,
        max_grid_size: None,
    }
}

fn agent(id: u32, group: u32, steps: &[(u32, u32, u64)]) -> AgentSpec {
    let steps = steps.iter().map(|&(x, y, d)| Step::new(x, y, d)).collect();
    AgentSpec::new(id, group, Route::new(steps).unwrap())
}

/// Run `sim` on a helper thread; panic if it is not done within `secs`.
fn run_bounded<O>(sim: Sim<O>, secs: u64) -> (SimResult<SimReport>, Sim<O>)
where
    O: SimObserver + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = sim.run();
        let _ = tx.send((result, sim));
    });
    rx.recv_timeout(Duration::from_secs(secs))
        .unwrap_or_else(|_| panic!("simulation did not finish within {secs} s (deadlock?)"))
}

#[derive(Copy, Clone, Debug)]
enum Recorded {
    DwellStart(DwellEvent),
    DwellEnd(DwellEvent),
}

/// Records dwell events and audits same-group co-occupancy per cell.
///
/// Claims and releases for one cell arrive under that cell's lock, so the
/// per-cell bookkeeping below sees them in their true order.
#[derive(Default)]
struct Recorder {
    events:     Mutex<Vec<Recorded>>,
    inside:     Mutex<HashMap<(Position, GroupId), Vec<AgentId>>>,
    violations: AtomicUsize,
    waits:      AtomicUsize,
    finished:   AtomicUsize,
}

impl Recorder {
    fn dwells_of(&self, agent: AgentId) -> Vec<(Tenths, Tenths, Tenths)> {
        let events = self.events.lock().unwrap();
        let mut starts = Vec::new();
        let mut pairs = Vec::new();
        for ev in events.iter() {
            match ev {
                Recorded::DwellStart(e) if e.agent == agent => starts.push(e.at),
                Recorded::DwellEnd(e) if e.agent == agent => {
                    pairs.push((starts[pairs.len()], e.at, e.dwell));
                }
                _ => {}
            }
        }
        pairs
    }

    fn violations(&self) -> usize {
        self.violations.load(Ordering::SeqCst)
    }
}

impl SimObserver for Recorder {
    fn on_wait(&self, _event: &CellEvent) {
        self.waits.fetch_add(1, Ordering::SeqCst);
    }

    fn on_claim(&self, ev: &CellEvent) {
        let mut inside = self.inside.lock().unwrap();
        let here = inside.entry((ev.pos, ev.group)).or_default();
        if !here.is_empty() {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
        here.push(ev.agent);
    }

    fn on_release(&self, ev: &CellEvent) {
        let mut inside = self.inside.lock().unwrap();
        if let Some(here) = inside.get_mut(&(ev.pos, ev.group)) {
            here.retain(|&a| a != ev.agent);
        }
    }

    fn on_dwell_start(&self, ev: &DwellEvent) {
        self.events.lock().unwrap().push(Recorded::DwellStart(*ev));
    }

    fn on_dwell_end(&self, ev: &DwellEvent) {
        self.events.lock().unwrap().push(Recorded::DwellEnd(*ev));
    }

    fn on_agent_finish(&self, _agent: AgentId, _at: Tenths) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

fn recorded_sim(grid: u32, agents: Vec<AgentSpec>) -> Sim<Arc<Recorder>> {
    SimBuilder::new(test_config(grid), agents)
        .observer(Arc::new(Recorder::default()))
        .build()
        .unwrap()
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use gw_route::{RouteError, Scenario};

    use super::*;
    use crate::SimError;

    #[test]
    fn out_of_bounds_route_rejected_before_launch() {
        let result = SimBuilder::new(test_config(3), vec![agent(1, 1, &[(0, 0, 1), (3, 1, 1)])]).build();
        assert!(matches!(result, Err(SimError::Route(RouteError::OutOfBounds { .. }))));
    }

    #[test]
    fn duplicate_agent_rejected() {
        let agents = vec![agent(1, 1, &[(0, 0, 1)]), agent(1, 2, &[(1, 1, 1)])];
        assert!(SimBuilder::new(test_config(3), agents).build().is_err());
    }

    #[test]
    fn zero_grid_rejected() {
        let result = SimBuilder::new(test_config(0), vec![]).build();
        assert!(matches!(result, Err(SimError::Grid(_))));
    }

    #[test]
    fn grid_cap_applies() {
        let config = SimConfig { max_grid_size: Some(4), ..test_config(5) };
        assert!(SimBuilder::new(config, vec![]).build().is_err());
    }

    #[test]
    fn from_scenario_takes_grid_size() {
        let scenario = Scenario { grid_size: 7, agents: vec![agent(1, 1, &[(6, 6, 0)])] };
        let sim = SimBuilder::from_scenario(test_config(1), scenario).build().unwrap();
        assert_eq!(sim.grid.size(), 7);
        assert_eq!(sim.config.grid_size, 7);
    }

    #[test]
    fn empty_population_runs() {
        let sim = SimBuilder::new(test_config(2), vec![]).build().unwrap();
        let report = sim.run().unwrap();
        assert!(report.agents.is_empty());
    }
}

// ── Runner state machine ──────────────────────────────────────────────────────

#[cfg(test)]
mod runner_tests {
    use gw_grid::Grid;

    use super::*;
    use crate::{AgentRunner, NoopObserver, RunnerState, SimError};

    #[test]
    fn illegal_transitions_are_protocol_violations() {
        let spec = agent(3, 1, &[(0, 0, 0), (1, 0, 0)]);
        let grid = Grid::new(2).unwrap();
        let clock = test_config(2).make_clock();
        let mut runner = AgentRunner::new(&spec, &grid, clock, &NoopObserver);

        assert_eq!(runner.state(), RunnerState::Idle);
        assert!(matches!(
            runner.advance(RunnerState::Dwelling(0)),
            Err(SimError::ProtocolViolation { agent: AgentId(3), .. })
        ));
        runner.advance(RunnerState::Entering(0)).unwrap();
        assert!(runner.advance(RunnerState::Entering(1)).is_err());
        runner.advance(RunnerState::Occupying(0)).unwrap();
        runner.advance(RunnerState::Dwelling(0)).unwrap();
        runner.advance(RunnerState::Releasing(0)).unwrap();
        // Step 1 remains, so finishing now is illegal.
        assert!(runner.advance(RunnerState::Finished).is_err());
        runner.advance(RunnerState::Entering(1)).unwrap();
        assert_eq!(runner.state(), RunnerState::Entering(1));
        assert_eq!(runner.held(), None);
    }

    #[test]
    fn single_agent_walk_counts() {
        let sim = recorded_sim(3, vec![agent(1, 1, &[(0, 0, 1), (0, 1, 0), (1, 1, 2)])]);
        let (result, sim) = run_bounded(sim, 10);
        let report = result.unwrap();

        let stats = report.stats_for(AgentId(1)).unwrap();
        assert_eq!(stats.claims, 3);
        assert_eq!(stats.releases, 3);
        assert_eq!(stats.reclaims, 0);
        assert_eq!(stats.waits, 0);
        assert!(stats.finished_at >= stats.started_at + 3);
        assert_eq!(sim.grid.occupied_count(), 0, "final cell released");
        assert_eq!(sim.observer.finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn consecutive_steps_on_same_cell_do_not_self_block() {
        let sim = recorded_sim(2, vec![agent(1, 1, &[(1, 1, 1), (1, 1, 1), (0, 0, 0)])]);
        let (result, sim) = run_bounded(sim, 10);
        let stats = result.unwrap().agents[0].clone();

        assert_eq!(stats.reclaims, 1);
        assert_eq!(stats.claims, 2);
        assert_eq!(stats.releases, 2);
        assert_eq!(sim.grid.occupied_count(), 0);
    }

    #[test]
    fn route_ending_on_repeated_cell_releases_once() {
        let sim = recorded_sim(2, vec![agent(1, 1, &[(0, 1, 0), (0, 1, 0), (0, 1, 0)])]);
        let (result, sim) = run_bounded(sim, 10);
        let stats = result.unwrap().agents[0].clone();

        assert_eq!(stats.claims, 1);
        assert_eq!(stats.reclaims, 2);
        assert_eq!(stats.releases, 1);
        assert_eq!(sim.grid.occupant(Position::new(0, 1)).unwrap(), None);
    }

    #[test]
    fn sim_can_run_twice() {
        let sim = recorded_sim(2, vec![agent(1, 1, &[(0, 0, 0), (1, 1, 0)])]);
        sim.run().unwrap();
        sim.run().unwrap();
        assert_eq!(sim.grid.occupied_count(), 0);
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use super::*;

    /// Two same-group agents whose first cells are each other's targets.
    #[test]
    fn same_group_swap_completes() {
        let sim = recorded_sim(
            3,
            vec![
                agent(1, 1, &[(0, 0, 0), (1, 1, 5)]),
                agent(2, 1, &[(1, 1, 0), (0, 0, 5)]),
            ],
        );
        let (result, sim) = run_bounded(sim, 10);
        let report = result.unwrap();

        assert_eq!(report.agents.len(), 2);
        assert_eq!(sim.observer.violations(), 0, "(1,1) held twice by group 1");
        assert_eq!(sim.observer.finished.load(Ordering::SeqCst), 2);
        assert_eq!(sim.grid.occupied_count(), 0);
    }

    /// Agents of different groups share a cell without blocking each other.
    #[test]
    fn cross_group_agents_overlap_on_a_cell() {
        let sim = recorded_sim(
            3,
            vec![agent(1, 1, &[(2, 2, 20)]), agent(3, 2, &[(2, 2, 20)])],
        );
        let (result, sim) = run_bounded(sim, 10);
        let report = result.unwrap();

        assert_eq!(report.total_waits(), 0);
        assert_eq!(sim.observer.waits.load(Ordering::SeqCst), 0);
        let a = sim.observer.dwells_of(AgentId(1))[0];
        let c = sim.observer.dwells_of(AgentId(3))[0];
        assert!(c.0 < a.1 && a.0 < c.1, "dwell windows should overlap: {a:?} {c:?}");
    }

    /// Agents of the same group take turns on a shared cell.
    #[test]
    fn same_group_agents_take_turns() {
        let sim = recorded_sim(
            3,
            vec![agent(1, 1, &[(2, 2, 5)]), agent(2, 1, &[(2, 2, 5)])],
        );
        let (result, sim) = run_bounded(sim, 10);
        result.unwrap();

        let a = sim.observer.dwells_of(AgentId(1))[0];
        let b = sim.observer.dwells_of(AgentId(2))[0];
        let (first, second) = if a.0 <= b.0 { (a, b) } else { (b, a) };
        assert!(second.0 >= first.1, "dwells must not overlap: {first:?} {second:?}");
        assert_eq!(sim.observer.violations(), 0);
    }

    /// Four same-group agents rotating around a 2×2 ring, every cell taken.
    #[test]
    fn full_ring_rotation_completes() {
        let ring = [(0, 0), (0, 1), (1, 1), (1, 0)];
        let agents = (0..4)
            .map(|k| {
                let steps: Vec<(u32, u32, u64)> = (0..6)
                    .map(|i| {
                        let (x, y) = ring[(k + i) % 4];
                        (x, y, 1)
                    })
                    .collect();
                agent(k as u32 + 1, 7, &steps)
            })
            .collect();

        let (result, sim) = run_bounded(recorded_sim(2, agents), 20);
        result.unwrap();
        assert_eq!(sim.observer.violations(), 0);
        assert_eq!(sim.grid.occupied_count(), 0);
    }

    /// Holds every claimed cell's lock for a while.
    struct SlowClaims(Duration);

    impl SimObserver for SlowClaims {
        fn on_claim(&self, _ev: &CellEvent) {
            thread::sleep(self.0);
        }
    }

    /// Two groups crossing between the same two cells in opposite directions.
    /// Each runner finds its old cell locked by the other's claim and must
    /// drop its new lock before taking the old one.
    #[test]
    fn crossing_groups_defer_handoff() {
        let sim = SimBuilder::new(
            test_config(2),
            vec![
                agent(1, 1, &[(0, 0, 0), (0, 1, 0)]),
                agent(2, 2, &[(0, 1, 0), (0, 0, 0)]),
            ],
        )
        .observer(SlowClaims(Duration::from_millis(150)))
        .build()
        .unwrap();

        let (result, sim) = run_bounded(sim, 10);
        let report = result.unwrap();
        let deferred: u32 = report.agents.iter().map(|a| a.deferred_handoffs).sum();
        assert!(deferred >= 1, "no deferred hand-off: {:?}", report.agents);
        assert_eq!(sim.grid.occupied_count(), 0);
    }

    /// Dwell pairs are ordered and each lasts at least its declared length.
    #[test]
    fn dwell_accounting() {
        let dwells = [3u64, 0, 5, 2];
        let steps: Vec<_> = dwells.iter().enumerate().map(|(i, &d)| (i as u32, 0, d)).collect();
        let sim = recorded_sim(4, vec![agent(9, 1, &steps)]);
        let (result, sim) = run_bounded(sim, 10);
        result.unwrap();

        let pairs = sim.observer.dwells_of(AgentId(9));
        assert_eq!(pairs.len(), dwells.len());
        let mut last_end = Tenths::ZERO;
        for (&(start, end, declared), &d) in pairs.iter().zip(&dwells) {
            assert_eq!(declared, Tenths(d));
            assert!(start >= last_end, "start {start:?} before previous end {last_end:?}");
            let gap = end - start;
            assert!(gap >= d && gap <= d + 5, "dwell {d} took {gap} tenths");
            last_end = end;
        }
    }
}

// ── Stress and failure ────────────────────────────────────────────────────────

#[cfg(test)]
mod stress_tests {
    use super::*;
    use crate::SimError;

    fn generated(groups: u32, seed: u64) -> Vec<AgentSpec> {
        let params = GeneratorParams {
            grid_size: 3,
            agents:    16,
            groups,
            min_steps: 3,
            max_steps: 10,
            max_dwell: 2,
            stay_prob: 0.2,
        };
        RouteGenerator::new(params, seed).unwrap().generate().agents
    }

    #[test]
    fn single_group_crowd_keeps_exclusion() {
        for seed in 0..3 {
            let (result, sim) = run_bounded(recorded_sim(3, generated(1, seed)), 60);
            let report = result.unwrap();
            assert_eq!(report.agents.len(), 16);
            assert_eq!(sim.observer.violations(), 0, "seed {seed}");
            assert_eq!(sim.grid.occupied_count(), 0, "seed {seed}");
        }
    }

    #[test]
    fn mixed_group_crowd_completes() {
        let (result, sim) = run_bounded(recorded_sim(3, generated(3, 42)), 60);
        result.unwrap();
        assert_eq!(sim.observer.finished.load(Ordering::SeqCst), 16);
        assert_eq!(sim.grid.occupied_count(), 0);
    }

    /// Panics on the first dwell of one agent.
    struct PanicOn(AgentId);

    impl SimObserver for PanicOn {
        fn on_dwell_start(&self, ev: &DwellEvent) {
            if ev.agent == self.0 {
                panic!("observer failure for {}", ev.agent);
            }
        }
    }

    #[test]
    fn panicking_runner_releases_its_cell() {
        let sim = SimBuilder::new(
            test_config(3),
            vec![agent(1, 1, &[(2, 2, 3)]), agent(2, 1, &[(2, 2, 3)])],
        )
        .observer(PanicOn(AgentId(1)))
        .build()
        .unwrap();

        let (result, sim) = run_bounded(sim, 10);
        assert!(matches!(result, Err(SimError::AgentPanicked(AgentId(1)))));
        assert_eq!(sim.grid.occupied_count(), 0);
    }

    /// Panics when `agent` claims or releases `pos`.
    struct PanicAtCell {
        agent:      AgentId,
        pos:        Position,
        on_release: bool,
    }

    impl PanicAtCell {
        fn check(&self, ev: &CellEvent) {
            if ev.agent == self.agent && ev.pos == self.pos {
                panic!("observer failure for {} at {}", ev.agent, ev.pos);
            }
        }
    }

    impl SimObserver for PanicAtCell {
        fn on_claim(&self, ev: &CellEvent) {
            if !self.on_release {
                self.check(ev);
            }
        }

        fn on_release(&self, ev: &CellEvent) {
            if self.on_release {
                self.check(ev);
            }
        }
    }

    #[test]
    fn panic_while_claiming_frees_the_new_cell() {
        let sim = SimBuilder::new(
            test_config(3),
            vec![
                agent(1, 1, &[(0, 0, 0), (1, 1, 0)]),
                agent(2, 1, &[(2, 2, 20), (1, 1, 0)]),
            ],
        )
        .observer(PanicAtCell { agent: AgentId(1), pos: Position::new(1, 1), on_release: false })
        .build()
        .unwrap();

        let (result, sim) = run_bounded(sim, 10);
        assert!(matches!(result, Err(SimError::AgentPanicked(AgentId(1)))));
        assert_eq!(sim.grid.occupied_count(), 0);
    }

    #[test]
    fn panic_during_handoff_frees_both_cells() {
        let sim = SimBuilder::new(
            test_config(3),
            vec![
                agent(1, 1, &[(0, 0, 0), (1, 1, 0)]),
                agent(2, 1, &[(2, 2, 20), (0, 0, 0), (1, 1, 0)]),
            ],
        )
        .observer(PanicAtCell { agent: AgentId(1), pos: Position::new(0, 0), on_release: true })
        .build()
        .unwrap();

        let (result, sim) = run_bounded(sim, 10);
        assert!(matches!(result, Err(SimError::AgentPanicked(AgentId(1)))));
        assert_eq!(sim.grid.occupied_count(), 0);
    }
}
