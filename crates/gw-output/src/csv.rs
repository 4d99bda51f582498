//! CSV output backend.
//!
//! Creates `dwell_events.csv` in the configured output directory.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::EventWriter;
use crate::{DwellRow, OutputResult};

pub const FILE_NAME: &str = "dwell_events.csv";

/// Writes the event log to one CSV file.
pub struct CsvWriter {
    events:   Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create `dwell_events.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut events = Writer::from_path(dir.join(FILE_NAME))?;
        events.write_record(["at", "phase", "agent_id", "group_id", "x", "y", "dwell"])?;
        Ok(Self { events, finished: false })
    }
}

impl EventWriter for CsvWriter {
    fn write_row(&mut self, row: &DwellRow) -> OutputResult<()> {
        self.events.write_record(&[
            row.at.to_string(),
            row.phase.as_str().to_owned(),
            row.agent_id.to_string(),
            row.group_id.to_string(),
            row.x.to_string(),
            row.y.to_string(),
            row.dwell.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.events.flush()?;
        Ok(())
    }
}
