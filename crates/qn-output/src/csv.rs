//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `history.csv`: one row per visit, agent columns then the visit schema
//! - `sojourns.csv`: one row per agent that left through a sink

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{HistoryRow, OutputResult, SojournRow};

/// Writes histories to two CSV files.
pub struct CsvWriter {
    history:  Writer<File>,
    sojourns: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut history = Writer::from_path(dir.join("history.csv"))?;
        history.write_record(HistoryRow::header())?;

        let mut sojourns = Writer::from_path(dir.join("sojourns.csv"))?;
        sojourns.write_record(["agent_origin", "agent_sequence", "agent_class", "visits", "sojourn_time"])?;

        Ok(Self {
            history,
            sojourns,
            finished: false,
        })
    }
}

fn optional(t: Option<f64>) -> String {
    t.map(|v| v.to_string()).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_history(&mut self, rows: &[HistoryRow]) -> OutputResult<()> {
        for row in rows {
            self.history.write_record(&[
                row.origin.to_string(),
                row.sequence.to_string(),
                row.class.clone(),
                row.node.to_string(),
                row.arrival.to_string(),
                optional(row.service_start),
                optional(row.departure),
                row.queue_length_before.to_string(),
                row.total_in_system.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_sojourn(&mut self, row: &SojournRow) -> OutputResult<()> {
        self.sojourns.write_record(&[
            row.origin.to_string(),
            row.sequence.to_string(),
            row.class.clone(),
            row.visits.to_string(),
            row.sojourn.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.history.flush()?;
        self.sojourns.flush()?;
        Ok(())
    }
}
