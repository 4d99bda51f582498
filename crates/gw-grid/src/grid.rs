//! The N×N grid of cell monitors.

use gw_core::{GroupId, GwError, Position, SimConfig};

use crate::{CellState, GridError, GridResult};

/// Fixed-shape shared storage for all cells.
///
/// Cells live in a flat row-major slice indexed by [`Position::index`].  The
/// grid is created once before any agent starts and shared by reference for
/// the whole run; it has no behavior of its own.
#[derive(Debug)]
pub struct Grid {
    size:  u32,
    cells: Box<[CellState]>,
}

impl Grid {
    /// Build a `size`×`size` grid with every cell free.
    pub fn new(size: u32) -> GridResult<Self> {
        if size == 0 {
            return Err(GwError::NonPositiveGridSize(0).into());
        }
        let cells = (0..size)
            .flat_map(|x| (0..size).map(move |y| CellState::new(Position::new(x, y))))
            .collect();
        Ok(Self { size, cells })
    }

    /// Validate `config` and build a grid of `config.grid_size`.
    pub fn from_config(config: &SimConfig) -> GridResult<Self> {
        config.validate()?;
        Self::new(config.grid_size)
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.within(self.size)
    }

    /// The cell at `pos`, or `OutOfBounds`.
    pub fn cell(&self, pos: Position) -> GridResult<&CellState> {
        if !self.contains(pos) {
            return Err(GridError::OutOfBounds { pos, size: self.size });
        }
        Ok(&self.cells[pos.index(self.size)])
    }

    /// Snapshot of the marker at `pos`.
    pub fn occupant(&self, pos: Position) -> GridResult<Option<GroupId>> {
        self.cell(pos).map(CellState::occupant)
    }

    /// Number of cells currently marked.  Takes every lock in turn, so the
    /// result is not an atomic snapshot while agents are running.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.occupant().is_some()).count()
    }

    pub fn cells(&self) -> impl Iterator<Item = &CellState> {
        self.cells.iter()
    }
}
