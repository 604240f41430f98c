//! Plain data row types written by output backends.

use qn_agent::{AgentHistory, HISTORY_COLUMNS};

/// Leading columns identifying the agent a history row belongs to.
pub const AGENT_COLUMNS: [&str; 3] = ["agent_origin", "agent_sequence", "agent_class"];

/// One visit of one agent, flattened for tabular export.
///
/// Times are seconds.  `None` marks a visit still waiting for service or
/// still in service; writers render it as an empty cell.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub origin:              u32,
    pub sequence:            u32,
    pub class:               String,
    pub node:                u32,
    pub arrival:             f64,
    pub service_start:       Option<f64>,
    pub departure:           Option<f64>,
    pub queue_length_before: u32,
    pub total_in_system:     u32,
}

impl HistoryRow {
    /// One row per recorded visit, in visit order.
    pub fn from_history(history: &AgentHistory) -> Vec<HistoryRow> {
        history
            .records()
            .iter()
            .map(|r| HistoryRow {
                origin:              history.id.origin,
                sequence:            history.id.sequence,
                class:               history.id.class.to_string(),
                node:                r.node.0,
                arrival:             r.arrival.as_secs(),
                service_start:       r.service_start.map(|t| t.as_secs()),
                departure:           r.departure.map(|t| t.as_secs()),
                queue_length_before: r.queue_length_before,
                total_in_system:     r.total_in_system,
            })
            .collect()
    }

    /// Agent columns followed by the visit record schema.
    pub fn header() -> Vec<&'static str> {
        AGENT_COLUMNS.iter().chain(HISTORY_COLUMNS.iter()).copied().collect()
    }
}

/// Total time in the system of one agent that left through a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct SojournRow {
    pub origin:   u32,
    pub sequence: u32,
    pub class:    String,
    pub visits:   u32,
    pub sojourn:  f64,
}

impl SojournRow {
    /// `None` unless the history is sealed.
    pub fn from_history(history: &AgentHistory) -> Option<SojournRow> {
        if !history.is_sealed() {
            return None;
        }
        Some(SojournRow {
            origin:   history.id.origin,
            sequence: history.id.sequence,
            class:    history.id.class.to_string(),
            visits:   history.records().len() as u32,
            sojourn:  history.sojourn_time()?,
        })
    }
}
