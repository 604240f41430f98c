//! `qn-output` — export of recorded agent histories.
//!
//! | Backend | Files created                    |
//! |---------|----------------------------------|
//! | CSV     | `history.csv`, `sojourns.csv`    |
//!
//! Writers implement [`OutputWriter`].  They are driven either live, through
//! [`HistoryObserver`] (a `qn_sim::SimObserver` that writes each agent as it
//! leaves the network), or after the run with [`write_history`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use qn_output::{CsvWriter, HistoryObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = HistoryObserver::new(writer);
//! sim.simulate_observed(100_000, &mut obs)?;
//! obs.finish()?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::{HistoryObserver, write_history};
pub use row::{AGENT_COLUMNS, HistoryRow, SojournRow};
pub use writer::OutputWriter;
