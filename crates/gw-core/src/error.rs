//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `GwError` as one variant
//! through `#[from]`, so configuration problems found here surface unchanged
//! at the launcher.

use thiserror::Error;

/// The top-level error type for `gw-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum GwError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("grid size must be positive, got {0}")]
    NonPositiveGridSize(i64),

    #[error("grid size {size} exceeds the configured maximum of {max}")]
    GridTooLarge { size: u32, max: u32 },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `gw-*` crates.
pub type GwResult<T> = Result<T, GwError>;
