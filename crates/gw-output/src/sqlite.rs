//! SQLite output backend (feature `sqlite`).
//!
//! Creates `events.db` in the configured output directory with one table,
//! `dwell_events`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::EventWriter;
use crate::{DwellRow, OutputResult};

pub const FILE_NAME: &str = "events.db";

/// Writes the event log to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `events.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join(FILE_NAME))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS dwell_events (
                 at       INTEGER NOT NULL,
                 phase    TEXT    NOT NULL,
                 agent_id INTEGER NOT NULL,
                 group_id INTEGER NOT NULL,
                 x        INTEGER NOT NULL,
                 y        INTEGER NOT NULL,
                 dwell    INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl EventWriter for SqliteWriter {
    fn write_row(&mut self, row: &DwellRow) -> OutputResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO dwell_events (at, phase, agent_id, group_id, x, y, dwell) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        stmt.execute(rusqlite::params![
            row.at as i64,
            row.phase.as_str(),
            row.agent_id,
            row.group_id,
            row.x,
            row.y,
            row.dwell as i64,
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
