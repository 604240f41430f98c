//! Agent identity and per-agent bookkeeping.

use std::fmt;

use qn_core::{AgentKey, ClassTag, NodeId, SimTime};

// ── AgentId ───────────────────────────────────────────────────────────────────

/// Public identity of an agent: `(origin, sequence, class)`.
///
/// `origin` names the arrival stream that created the agent (a source node's
/// own process, or one injection), `sequence` counts agents created by that
/// stream.  Ordering is lexicographic, so sorting ids groups agents by stream
/// in creation order.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId {
    pub origin:   u32,
    pub sequence: u32,
    pub class:    ClassTag,
}

impl AgentId {
    pub fn new(origin: u32, sequence: u32, class: ClassTag) -> Self {
        Self { origin, sequence, class }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.origin, self.sequence, self.class)
    }
}

// ── AgentLocation ─────────────────────────────────────────────────────────────

/// Where an agent is right now.  An agent is in exactly one of these states,
/// so it can never be at two nodes at once.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AgentLocation {
    /// Drawn from an arrival stream; its first arrival, at `to`, is pending.
    Scheduled { to: NodeId },
    /// Routed after a departure; its arrival event at `to` is pending.
    InTransit { to: NodeId },
    /// In the waiting line of a node.
    Waiting(NodeId),
    /// Holding a server at a node (including the instant between admission
    /// and its `ServiceStart` event).
    InService(NodeId),
    /// Departed a sink; its history is sealed.
    Departed,
}

impl AgentLocation {
    /// The node the agent is at, if it is at one.
    pub fn node(self) -> Option<NodeId> {
        match self {
            AgentLocation::Waiting(n) | AgentLocation::InService(n) => Some(n),
            AgentLocation::Scheduled { .. }
            | AgentLocation::InTransit { .. }
            | AgentLocation::Departed => None,
        }
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// One simulated request/customer.
///
/// The visit history lives in the [`DataRecorder`](crate::DataRecorder), not
/// here, so the scheduler can mutate locations while reporting code holds a
/// shared borrow of the recorder.
///
/// The location is changed only through
/// [`AgentStore::set_location`](crate::AgentStore::set_location), which keeps
/// the store's per-location counts current.
#[derive(Clone, Debug)]
pub struct Agent {
    pub key:             AgentKey,
    pub id:              AgentId,
    pub created_at:      SimTime,
    pub(crate) location: AgentLocation,
    /// Number of arrivals processed so far.  Zero until the first arrival,
    /// which is how the scheduler recognises a stream's freshly spawned agent.
    pub visits:          u32,
}

impl Agent {
    pub fn location(&self) -> AgentLocation {
        self.location
    }

    pub fn is_departed(&self) -> bool {
        self.location == AgentLocation::Departed
    }
}
