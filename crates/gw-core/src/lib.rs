//! `gw-core`: foundational types for the `gridwalk` simulator.
//!
//! This crate is a dependency of every other `gw-*` crate.  It has no `gw-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `GroupId`                                  |
//! | [`position`]    | `Position`                                            |
//! | [`time`]        | `Tenths`, `SimClock`, `SimConfig`                     |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (global)             |
//! | [`error`]       | `GwError`, `GwResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod position;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{GwError, GwResult};
pub use ids::{AgentId, GroupId};
pub use position::Position;
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, SimConfig, Tenths};
