//! Per-node queueing state machine.
//!
//! A node's state is implicit in its counters:
//!
//! | State       | Condition                                      |
//! |-------------|------------------------------------------------|
//! | `Idle`      | `busy == 0` and the waiting line is empty      |
//! | `Serving`   | `0 < busy ≤ capacity` and nobody waits         |
//! | `Saturated` | `busy == capacity` and the waiting line is not empty |
//!
//! A server is reserved the moment an agent is admitted (or handed over from
//! the waiting line), even though the agent's `ServiceStart` event fires
//! later in the same instant.  That keeps `waiting` non-empty only while
//! every server is taken.

use std::collections::VecDeque;
use std::fmt;

use qn_core::{AgentKey, NodeId, SimRng, SimTime};

use crate::error::GeneratorKind;
use crate::generator::ServiceProcess;
use crate::{SimError, SimResult};

// ── Capacity ──────────────────────────────────────────────────────────────────

/// Number of parallel servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    Finite(u32),
    /// Infinite-server (delay) node: nobody ever waits.
    Infinite,
}

impl Capacity {
    fn has_room(self, busy: u32) -> bool {
        match self {
            Capacity::Finite(c) => busy < c,
            Capacity::Infinite  => true,
        }
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Finite(c) => write!(f, "{c}"),
            Capacity::Infinite  => f.write_str("inf"),
        }
    }
}

// ── State & snapshot ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Idle,
    Serving,
    Saturated,
}

/// Outcome of an arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A server was reserved for the agent.
    Serve,
    /// The agent joined the back of the waiting line.
    Wait,
}

/// Read-only view of a node's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSnapshot {
    pub node:       NodeId,
    pub capacity:   Capacity,
    pub busy:       u32,
    pub waiting:    u32,
    pub state:      NodeState,
    pub arrivals:   u64,
    pub departures: u64,
}

// ── QueueNode ─────────────────────────────────────────────────────────────────

/// Server pool plus FIFO waiting line of one node.
pub struct QueueNode {
    id:         NodeId,
    capacity:   Capacity,
    /// `None` for pass-through source nodes: service takes no time.
    service:    Option<Box<dyn ServiceProcess>>,
    busy:       u32,
    waiting:    VecDeque<AgentKey>,
    arrivals:   u64,
    departures: u64,
}

impl QueueNode {
    pub(crate) fn new(id: NodeId, capacity: Capacity, service: Option<Box<dyn ServiceProcess>>) -> Self {
        Self {
            id,
            capacity,
            service,
            busy:       0,
            waiting:    VecDeque::new(),
            arrivals:   0,
            departures: 0,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Admit an arriving agent.
    ///
    /// Returns the admission outcome, the waiting-line length the agent
    /// observes (counting itself if it waits) and the number of agents at the
    /// node including it.
    pub(crate) fn admit(&mut self, agent: AgentKey) -> (Admission, u32, u32) {
        self.arrivals += 1;
        let admission = if self.capacity.has_room(self.busy) {
            self.busy += 1;
            Admission::Serve
        } else {
            self.waiting.push_back(agent);
            Admission::Wait
        };
        (admission, self.waiting.len() as u32, self.occupancy())
    }

    /// Free the server of a departing agent.
    ///
    /// If someone is waiting, the server passes straight to the head of the
    /// line (returned) and `busy` is unchanged.
    pub(crate) fn release(&mut self) -> Option<AgentKey> {
        self.departures += 1;
        match self.waiting.pop_front() {
            Some(next) => Some(next),
            None => {
                debug_assert!(self.busy > 0, "release on idle node {}", self.id);
                self.busy = self.busy.saturating_sub(1);
                None
            }
        }
    }

    /// Departure time for service starting at `start`.
    ///
    /// Pass-through nodes depart immediately.  Otherwise the service
    /// generator's output must be finite and strictly after `start`.
    pub(crate) fn departure_time(&mut self, start: SimTime, rng: &mut SimRng) -> SimResult<SimTime> {
        let Some(service) = self.service.as_mut() else {
            return Ok(start);
        };
        let output = service.departure_time(start, rng);
        checked_later(self.id, GeneratorKind::Service, start, output)
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn busy(&self) -> u32 {
        self.busy
    }

    pub fn waiting(&self) -> u32 {
        self.waiting.len() as u32
    }

    /// Agents at the node, served or waiting.
    pub fn occupancy(&self) -> u32 {
        self.busy + self.waiting.len() as u32
    }

    pub fn is_pass_through(&self) -> bool {
        self.service.is_none()
    }

    pub fn state(&self) -> NodeState {
        if !self.waiting.is_empty() {
            NodeState::Saturated
        } else if self.busy > 0 {
            NodeState::Serving
        } else {
            NodeState::Idle
        }
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            node:       self.id,
            capacity:   self.capacity,
            busy:       self.busy,
            waiting:    self.waiting(),
            state:      self.state(),
            arrivals:   self.arrivals,
            departures: self.departures,
        }
    }
}

/// Validate a generator output against its input time.
pub(crate) fn checked_later(
    node:   NodeId,
    kind:   GeneratorKind,
    input:  SimTime,
    output: f64,
) -> SimResult<SimTime> {
    if output.is_finite() && output > input.as_secs() {
        SimTime::new(output).map_err(|_| SimError::NonMonotonicGenerator { node, kind, input, output })
    } else {
        Err(SimError::NonMonotonicGenerator { node, kind, input, output })
    }
}
