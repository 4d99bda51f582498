//! `gw-route`: agent itineraries and the loaders that produce them.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`route`]      | `Step`, `Route` (non-empty, immutable)                    |
//! | [`agent`]      | `AgentSpec`, `Scenario`, `validate_agents`                |
//! | [`loader`]     | `load_scenario_reader` (classic text), `load_agents_csv`  |
//! | [`generator`]  | `RouteGenerator`, seeded random populations               |
//! | [`error`]      | `RouteError`, `RouteResult<T>`                            |
//!
//! Everything here runs before any agent thread starts.  A route that
//! leaves the grid is rejected at load time, never mid-walk.

pub mod agent;
pub mod error;
pub mod generator;
pub mod loader;
pub mod route;


pub use agent::{AgentSpec, Scenario, validate_agents};
pub use error::{RouteError, RouteResult};
pub use generator::{GeneratorParams, RouteGenerator};
pub use loader::{load_agents_csv, load_agents_csv_reader, load_scenario, load_scenario_reader};
pub use route::{Route, Step};
