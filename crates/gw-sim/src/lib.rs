//! `gw-sim`: agent runners and the thread-per-agent launcher.
//!
//! # Runner protocol
//!
//! ```text
//! for step i at position p (prev = position of step i-1):
//!   p == prev  → reclaim(p)                      single lock, no wait
//!   otherwise  → try_enter(p)
//!                  Claimed  → on_claim; hand prev off while p is locked
//!                  Contended → release prev; enter(p) (suspends); on_claim
//!   dwell outside every lock
//! after the last dwell: release the final cell exactly once
//! ```
//!
//! On the uncontended path the new cell is marked before the old one is
//! cleared, so there is no instant at which the agent is on no cell.  Locks
//! are taken new-first, old-second; the old lock is only *tried* while the new
//! one is held and, if busy, taken after the new one is dropped.  A runner
//! that has to wait gives up its previous cell first, so no thread ever
//! sleeps on a condition while holding a claim another thread may need.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use gw_core::SimConfig;
//! use gw_route::load_scenario_reader;
//! use gw_sim::SimBuilder;
//!
//! let scenario = load_scenario_reader(std::io::stdin())?;
//! let sim = SimBuilder::from_scenario(SimConfig::default(), scenario).build()?;
//! let report = sim.run()?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod report;
pub mod runner;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{CellEvent, DwellEvent, NoopObserver, SimObserver};
pub use report::{AgentStats, SimReport};
pub use runner::{AgentRunner, RunnerState};
pub use sim::Sim;
