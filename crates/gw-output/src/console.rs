//! Classic text log.
//!
//! ```text
//!   0 [  1 @( 0, 0) z   0
//!   0 )  1 @( 0, 0) z   0
//!   5 [  2 @( 0, 0) z   5
//! ```
//!
//! Columns: timestamp in tenths, `[` (dwell start) or `)` (dwell end),
//! agent id, cell, declared dwell.

use std::io::{self, Stdout, Write};

use crate::writer::EventWriter;
use crate::{DwellRow, OutputResult};

/// Render one row in the classic fixed-width format (no trailing newline).
pub fn format_row(row: &DwellRow) -> String {
    format!(
        "{:3} {} {:2} @({:2},{:2}) z{:4}",
        row.at,
        row.phase.marker(),
        row.agent_id,
        row.x,
        row.y,
        row.dwell
    )
}

/// Writes one classic text line per row to any `io::Write`.
pub struct ConsoleWriter<W: Write> {
    out:      W,
    finished: bool,
}

impl ConsoleWriter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, finished: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventWriter for ConsoleWriter<W> {
    fn write_row(&mut self, row: &DwellRow) -> OutputResult<()> {
        writeln!(self.out, "{}", format_row(row))?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.out.flush()?;
        Ok(())
    }
}
