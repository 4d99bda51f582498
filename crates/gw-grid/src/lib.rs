//! `gw-grid`: the shared grid and its per-cell exclusion monitor.
//!
//! # Crate layout
//!
//! | Module     | Contents                                              |
//! |------------|-------------------------------------------------------|
//! | [`cell`]   | `CellState`, `CellGuard`, `TryEnter`                  |
//! | [`grid`]   | `Grid` (flat row-major `Box<[CellState]>`)            |
//! | [`error`]  | `GridError`, `GridResult<T>`                          |
//!
//! # Exclusion rule
//!
//! Every cell carries one `Mutex<Option<GroupId>>` and one `Condvar`.
//! Entering waits only while the cell is marked with the entrant's *own*
//! group; a different group's marker is simply overwritten.  Leaving clears
//! the marker and wakes every waiter, each of which re-checks the predicate.
//!
//! ```text
//! enter(g):  lock; while occupant == g { wait }; occupant = g; → guard (lock held)
//! leave():   lock; occupant = none; notify_all; unlock
//! ```

pub mod cell;
pub mod error;
pub mod grid;


pub use cell::{CellGuard, CellState, TryEnter};
pub use error::{GridError, GridResult};
pub use grid::Grid;
