//! Grid coordinates.

/// A cell coordinate on an N×N grid.  Valid when `x < N && y < N`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    #[inline]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// `true` if this position addresses a cell of a `size`×`size` grid.
    #[inline]
    pub fn within(self, size: u32) -> bool {
        self.x < size && self.y < size
    }

    /// Row-major index into a flat cell array of side `size`.
    ///
    /// Callers must check [`within`](Self::within) first.
    #[inline]
    pub fn index(self, size: u32) -> usize {
        self.x as usize * size as usize + self.y as usize
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
