use gw_core::{AgentId, GwError};
use gw_grid::GridError;
use gw_route::RouteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] GwError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Grid(#[from] GridError),

    /// The runner broke its own protocol.  Always a bug, never retried.
    #[error("protocol violation by {agent}: {detail}")]
    ProtocolViolation { agent: AgentId, detail: String },

    #[error("thread for {0} panicked")]
    AgentPanicked(AgentId),

    #[error("failed to spawn thread for {agent}: {source}")]
    Spawn {
        agent:  AgentId,
        #[source]
        source: std::io::Error,
    },
}

pub type SimResult<T> = Result<T, SimError>;
