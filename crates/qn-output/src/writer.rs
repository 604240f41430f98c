//! The `OutputWriter` trait implemented by all backend writers.

use crate::{HistoryRow, OutputResult, SojournRow};

/// Trait implemented by history export backends.
///
/// When driven by [`HistoryObserver`][crate::HistoryObserver], errors are
/// stored and retrieved with
/// [`take_error`][crate::HistoryObserver::take_error].
pub trait OutputWriter {
    /// Write the visit rows of one or more agents.
    fn write_history(&mut self, rows: &[HistoryRow]) -> OutputResult<()>;

    /// Write the sojourn summary of one departed agent.
    fn write_sojourn(&mut self, row: &SojournRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
