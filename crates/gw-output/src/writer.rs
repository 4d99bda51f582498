//! The `EventWriter` trait implemented by all backend writers.

use crate::{DwellRow, OutputResult};

/// Trait implemented by the console, CSV, and SQLite writers.
///
/// Writers are driven from many agent threads through
/// [`EventLogObserver`][crate::EventLogObserver], which serialises calls.
pub trait EventWriter {
    /// Append one row.
    fn write_row(&mut self, row: &DwellRow) -> OutputResult<()>;

    /// Flush and close underlying handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}

impl<W: EventWriter + ?Sized> EventWriter for Box<W> {
    fn write_row(&mut self, row: &DwellRow) -> OutputResult<()> {
        (**self).write_row(row)
    }

    fn finish(&mut self) -> OutputResult<()> {
        (**self).finish()
    }
}

/// Fan out to several backends in order.  Stops at the first failing writer.
impl<W: EventWriter> EventWriter for Vec<W> {
    fn write_row(&mut self, row: &DwellRow) -> OutputResult<()> {
        self.iter_mut().try_for_each(|w| w.write_row(row))
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.iter_mut().try_for_each(|w| w.finish())
    }
}
