use gw_core::{AgentId, GwError, Position};
use thiserror::Error;

/// Configuration errors found while loading or validating routes.  All of
/// them are fatal: the simulation does not start.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("{agent} has an empty route")]
    EmptyRoute { agent: AgentId },

    #[error("{agent} step {step}: position {pos} lies outside the {size}x{size} grid")]
    OutOfBounds {
        agent: AgentId,
        step:  usize,
        pos:   Position,
        size:  u32,
    },

    #[error("duplicate {0}")]
    DuplicateAgent(AgentId),

    #[error("input parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] GwError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RouteResult<T> = Result<T, RouteError>;
