//! Simulation time model.
//!
//! # Design
//!
//! Dwell durations and log timestamps are integer counts of *tenths* of a
//! time unit.  The real length of one tenth is held in `SimClock`:
//!
//!   real_duration = tenths * tenth
//!
//! The default tenth is 100 ms, so a dwell of `10` sleeps one second.  Tests
//! shrink the tenth to a few milliseconds; nothing else in the workspace
//! depends on the real value.

use std::fmt;
use std::time::{Duration, Instant};

use crate::{GwError, GwResult};

// ── Tenths ────────────────────────────────────────────────────────────────────

/// A count of tenths of a time unit: either a dwell duration or a timestamp
/// relative to the simulation start.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tenths(pub u64);

impl Tenths {
    pub const ZERO: Tenths = Tenths(0);

    /// Tenths elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tenths) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tenths {
    type Output = Tenths;
    #[inline]
    fn add(self, rhs: u64) -> Tenths {
        Tenths(self.0 + rhs)
    }
}

/// Same as [`Tenths::since`]: saturates at zero.
impl std::ops::Sub for Tenths {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tenths) -> u64 {
        self.since(rhs)
    }
}

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Monotonic wall clock shared by all agent threads.
///
/// The origin is fixed when the clock is created, so every thread reads
/// timestamps against the same start instant.  `SimClock` is `Copy` and holds
/// no heap data.
#[derive(Copy, Clone, Debug)]
pub struct SimClock {
    start: Instant,
    tenth: Duration,
}

impl SimClock {
    /// Start a clock now, with `tenth` as the real length of one tenth.
    pub fn start(tenth: Duration) -> Self {
        Self { start: Instant::now(), tenth }
    }

    /// Real length of one tenth.
    #[inline]
    pub fn tenth(&self) -> Duration {
        self.tenth
    }

    /// Whole tenths elapsed since the clock started (rounded down).
    pub fn now(&self) -> Tenths {
        let tenth_nanos = self.tenth.as_nanos().max(1);
        Tenths((self.start.elapsed().as_nanos() / tenth_nanos) as u64)
    }

    /// Real duration of `tenths`.
    #[inline]
    pub fn duration_of(&self, tenths: Tenths) -> Duration {
        self.tenth.saturating_mul(tenths.0.min(u32::MAX as u64) as u32)
    }

    /// Block the calling thread for `tenths`.  A zero dwell returns at once.
    pub fn sleep(&self, tenths: Tenths) {
        if tenths.0 > 0 {
            std::thread::sleep(self.duration_of(tenths));
        }
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Loaded from TOML by the command-line front end (with the `serde` feature)
/// or built directly in tests.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Side length N of the N×N grid.
    pub grid_size: u32,

    /// Real milliseconds per tenth.  Default: 100.
    pub tenth_millis: u64,

    /// Seed for the random route generator.
    pub seed: u64,

    /// Largest accepted grid side.  `None` lifts the cap.  Default: 20.
    pub max_grid_size: Option<u32>,
}

impl SimConfig {
    /// Classic input limit on the grid side.
    pub const DEFAULT_MAX_GRID_SIZE: u32 = 20;

    pub fn new(grid_size: u32) -> Self {
        Self { grid_size, ..Self::default() }
    }

    /// Reject a zero grid or one above `max_grid_size`.
    pub fn validate(&self) -> GwResult<()> {
        if self.grid_size == 0 {
            return Err(GwError::NonPositiveGridSize(0));
        }
        match self.max_grid_size {
            Some(max) if self.grid_size > max => {
                return Err(GwError::GridTooLarge { size: self.grid_size, max });
            }
            _ => {}
        }
        if self.tenth_millis == 0 {
            return Err(GwError::Config("tenth_millis must be at least 1".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn tenth(&self) -> Duration {
        Duration::from_millis(self.tenth_millis)
    }

    /// Construct a `SimClock` started now.
    pub fn make_clock(&self) -> SimClock {
        SimClock::start(self.tenth())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size:     1,
            tenth_millis:  100,
            seed:          0,
            max_grid_size: Some(Self::DEFAULT_MAX_GRID_SIZE),
        }
    }
}
