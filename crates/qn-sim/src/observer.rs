//! Simulation observer trait for progress reporting and data collection.

use qn_agent::AgentHistory;
use qn_core::SimTime;

use crate::event::Event;

/// Callbacks invoked by [`Scheduler::simulate_observed`][crate::Scheduler::simulate_observed].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — sojourn collector
///
/// ```rust,ignore
/// struct Sojourns(Vec<f64>);
///
/// impl SimObserver for Sojourns {
///     fn on_agent_sealed(&mut self, history: &AgentHistory) {
///         self.0.extend(history.sojourn_time());
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called after each event has been applied.
    fn on_event(&mut self, _event: &Event) {}

    /// Called when an agent departs a sink and its history is sealed.
    ///
    /// The history is final; streaming writers can export it right away.
    fn on_agent_sealed(&mut self, _history: &AgentHistory) {}

    /// Called once at the end of every `simulate*` call.
    ///
    /// `processed` may be lower than requested when the event list ran dry.
    fn on_batch_end(&mut self, _processed: u64, _now: SimTime) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
