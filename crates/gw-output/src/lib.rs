//! `gw-output`: dwell-event log writers for the gridwalk simulator.
//!
//! | Feature   | Backend  | Output                                  |
//! |-----------|----------|-----------------------------------------|
//! | *(none)*  | Console  | classic text lines on any `io::Write`   |
//! | *(none)*  | CSV      | `dwell_events.csv`                      |
//! | `sqlite`  | SQLite   | `events.db`                             |
//!
//! All backends implement [`EventWriter`] and are driven by
//! [`EventLogObserver`], which implements `gw_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gw_output::{ConsoleWriter, EventLogObserver};
//!
//! let log = EventLogObserver::new(ConsoleWriter::stdout());
//! let sim = SimBuilder::from_scenario(config, scenario).observer(&log).build()?;
//! sim.run()?;
//! if let Some(e) = log.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod console;
pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use console::ConsoleWriter;
pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::EventLogObserver;
pub use row::{DwellPhase, DwellRow};
pub use writer::EventWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
