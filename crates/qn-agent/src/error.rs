//! Errors raised when a state transition would break an agent's timeline.

use thiserror::Error;

use qn_core::{AgentKey, NodeId, SimTime};

use crate::AgentId;

/// Recorder and store errors.  Every variant signals a scheduler bug or a
/// misuse of the recorder API; none is expected during a correct run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AgentError {
    #[error("agent key {0} is not registered")]
    UnknownAgent(AgentKey),

    #[error("agent {0} has left the system; its history is sealed")]
    Sealed(AgentId),

    #[error("agent {agent} arrived at {node} while its visit to {open_at} is still open")]
    VisitStillOpen {
        agent:   AgentId,
        node:    NodeId,
        open_at: NodeId,
    },

    #[error("agent {agent} cannot be sealed while its visit to {node} is open")]
    SealWithOpenVisit { agent: AgentId, node: NodeId },

    #[error("agent {0} has no open visit")]
    NoOpenVisit(AgentId),

    #[error("agent {0} already started service on its current visit")]
    AlreadyStarted(AgentId),

    #[error("agent {0} departed before starting service")]
    NotStarted(AgentId),

    #[error("agent {agent}: {later} precedes {earlier}")]
    OutOfOrder {
        agent:   AgentId,
        earlier: SimTime,
        later:   SimTime,
    },
}

pub type AgentResult<T> = Result<T, AgentError>;
