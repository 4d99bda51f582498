//! One grid cell: an occupancy marker behind its own lock and wait-condition.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError, TryLockError};

use gw_core::{GroupId, Position};
use tracing::trace;

// ── CellState ─────────────────────────────────────────────────────────────────

/// Occupancy monitor for a single cell.
///
/// `occupant` is `None` when the cell is free, otherwise the group of the
/// agent that most recently entered.  Two agents of *different* groups may
/// both be inside the cell; the marker then holds whichever wrote last.
///
/// A poisoned lock is recovered rather than propagated: the protected value
/// is a plain `Option<GroupId>` and every write to it is a single store.
#[derive(Debug)]
pub struct CellState {
    pos:      Position,
    occupant: Mutex<Option<GroupId>>,
    vacated:  Condvar,
}

/// Outcome of the non-waiting [`CellState::try_enter`].
#[derive(Debug)]
pub enum TryEnter<'a> {
    /// The predicate held; the cell is now marked and its lock is held.
    Claimed(CellGuard<'a>),
    /// The cell is marked with the caller's own group.  Nothing was changed
    /// and the lock has been released.
    Contended,
}

impl CellState {
    pub fn new(pos: Position) -> Self {
        Self {
            pos,
            occupant: Mutex::new(None),
            vacated:  Condvar::new(),
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Snapshot of the marker.  Stale as soon as it returns.
    pub fn occupant(&self) -> Option<GroupId> {
        *self.lock()
    }

    /// Claim the cell for `group`, suspending while it is marked with `group`.
    ///
    /// Returns with the cell's lock held; drop the guard to release it.
    /// Spurious wakeups are absorbed by re-checking the predicate.
    pub fn enter(&self, group: GroupId) -> CellGuard<'_> {
        let mut occupant = self.lock();
        while *occupant == Some(group) {
            trace!(cell = %self.pos, group = group.0, "waiting for same-group occupant to leave");
            occupant = self
                .vacated
                .wait(occupant)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *occupant = Some(group);
        CellGuard { cell: self, occupant }
    }

    /// Like [`enter`](Self::enter) but never waits on the condition.
    pub fn try_enter(&self, group: GroupId) -> TryEnter<'_> {
        let mut occupant = self.lock();
        if *occupant == Some(group) {
            return TryEnter::Contended;
        }
        *occupant = Some(group);
        TryEnter::Claimed(CellGuard { cell: self, occupant })
    }

    /// Acquire the lock without touching the marker.
    pub fn hold(&self) -> CellGuard<'_> {
        CellGuard { cell: self, occupant: self.lock() }
    }

    /// Acquire the lock only if nobody else holds it right now.
    pub fn try_hold(&self) -> Option<CellGuard<'_>> {
        match self.occupant.try_lock() {
            Ok(occupant) => Some(CellGuard { cell: self, occupant }),
            Err(TryLockError::Poisoned(p)) => Some(CellGuard { cell: self, occupant: p.into_inner() }),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Clear the marker, wake every waiter, release the lock.
    pub fn leave(&self) {
        self.hold().vacate();
    }

    /// Re-mark the cell for `group` without the wait predicate.
    ///
    /// Only valid for an agent that is already inside this cell and stays for
    /// another step; waiting here would block on the caller's own marker.
    pub fn reclaim(&self, group: GroupId) {
        *self.lock() = Some(group);
    }

    fn lock(&self) -> MutexGuard<'_, Option<GroupId>> {
        self.occupant.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── CellGuard ─────────────────────────────────────────────────────────────────

/// A held cell lock.  Dropping the guard releases the lock and leaves the
/// marker as it is; [`vacate`](Self::vacate) clears it first.
#[derive(Debug)]
pub struct CellGuard<'a> {
    cell:     &'a CellState,
    occupant: MutexGuard<'a, Option<GroupId>>,
}

impl CellGuard<'_> {
    #[inline]
    pub fn position(&self) -> Position {
        self.cell.pos
    }

    #[inline]
    pub fn occupant(&self) -> Option<GroupId> {
        *self.occupant
    }

    /// Clear the marker, broadcast to all waiters and release the lock.
    ///
    /// Returns the marker that was cleared.  It may belong to another group
    /// (last writer wins) or already be `None` if that group left first.
    pub fn vacate(mut self) -> Option<GroupId> {
        let previous = self.occupant.take();
        self.cell.vacated.notify_all();
        previous
    }
}
