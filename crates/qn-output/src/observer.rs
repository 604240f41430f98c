//! `HistoryObserver<W>` — bridges `SimObserver` to an `OutputWriter`, plus a
//! one-shot dump of a whole recorder.

use qn_agent::{AgentHistory, DataRecorder};
use qn_core::SimTime;
use qn_sim::SimObserver;
use tracing::debug;

use crate::row::{HistoryRow, SojournRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that streams each agent's history to an
/// [`OutputWriter`] the moment it is sealed.
///
/// Only agents that left through a sink are written; agents still in the
/// network when the run stops are not.  Use [`write_history`] for a full
/// dump instead.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After the last `simulate_observed` call, check for
/// errors with [`take_error`][Self::take_error].
pub struct HistoryObserver<W: OutputWriter> {
    writer:     W,
    agents:     u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> HistoryObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, agents: 0, last_error: None }
    }

    /// Number of sealed agents handed to the writer.
    pub fn agents_written(&self) -> u64 {
        self.agents
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush the writer.  Call once the run is over.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for HistoryObserver<W> {
    fn on_agent_sealed(&mut self, history: &AgentHistory) {
        let result = write_agent(&mut self.writer, history);
        self.store_err(result);
        self.agents += 1;
    }

    fn on_batch_end(&mut self, processed: u64, now: SimTime) {
        debug!(processed, %now, agents = self.agents, "history rows streamed");
    }
}

fn write_agent<W: OutputWriter>(writer: &mut W, history: &AgentHistory) -> OutputResult<()> {
    writer.write_history(&HistoryRow::from_history(history))?;
    if let Some(row) = SojournRow::from_history(history) {
        writer.write_sojourn(&row)?;
    }
    Ok(())
}

/// Write every recorded history, in agent-id order, then flush.
///
/// Visits still in progress are included with empty service-start or
/// departure cells.  Returns the number of agents written.
pub fn write_history<W: OutputWriter>(writer: &mut W, recorder: &DataRecorder) -> OutputResult<usize> {
    let mut agents = 0;
    for history in recorder.iter_by_id() {
        write_agent(writer, history)?;
        agents += 1;
    }
    writer.finish()?;
    Ok(agents)
}
