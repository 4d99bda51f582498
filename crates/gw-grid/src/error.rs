use gw_core::{GwError, Position};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("position {pos} lies outside the {size}x{size} grid")]
    OutOfBounds { pos: Position, size: u32 },

    #[error(transparent)]
    Core(#[from] GwError),
}

pub type GridResult<T> = Result<T, GridError>;
