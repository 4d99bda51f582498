//! `EventLogObserver<W>`: bridges `SimObserver` to an `EventWriter`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use gw_sim::{DwellEvent, SimObserver, SimReport};
use tracing::warn;

use crate::row::{DwellPhase, DwellRow};
use crate::writer::EventWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that logs every dwell start and end to any
/// [`EventWriter`] backend.
///
/// Runners call in from their own threads; the writer sits behind a mutex so
/// lines are never interleaved.  Errors are stored because `SimObserver`
/// methods have no return value.  After `sim.run()` returns, check with
/// [`take_error`][Self::take_error].
pub struct EventLogObserver<W: EventWriter> {
    writer:      Mutex<W>,
    first_error: Mutex<Option<OutputError>>,
}

impl<W: EventWriter> EventLogObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer), first_error: Mutex::new(None) }
    }

    /// Take the stored write error (if any).  `None` if all writes succeeded.
    pub fn take_error(&self) -> Option<OutputError> {
        self.first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Flush the writer.  Also called from `on_sim_end`; calling it again
    /// after a failed run is harmless.
    pub fn finish(&self) {
        let result = self.lock_writer().finish();
        self.store_err(result);
    }

    /// Unwrap the inner writer (e.g. to inspect output after the run).
    pub fn into_writer(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_writer(&self) -> MutexGuard<'_, W> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, phase: DwellPhase, ev: &DwellEvent) {
        let row = DwellRow::from_event(phase, ev);
        let result = self.lock_writer().write_row(&row);
        self.store_err(result);
    }

    fn store_err(&self, result: OutputResult<()>) {
        if let Err(e) = result {
            let mut slot = self.first_error.lock().unwrap_or_else(PoisonError::into_inner);
            // Keep only the first error.
            if slot.is_none() {
                warn!(error = %e, "event log write failed");
                *slot = Some(e);
            }
        }
    }
}

impl<W: EventWriter + Send> SimObserver for EventLogObserver<W> {
    fn on_dwell_start(&self, event: &DwellEvent) {
        self.write(DwellPhase::Start, event);
    }

    fn on_dwell_end(&self, event: &DwellEvent) {
        self.write(DwellPhase::End, event);
    }

    fn on_sim_end(&self, _report: &SimReport) {
        self.finish();
    }
}
