use std::fmt;

use qn_agent::AgentError;
use qn_core::{EdgeId, EdgeType, NodeId, SimTime};
use qn_topology::TopologyError;
use thiserror::Error;

/// Which generator produced a bad time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    Arrival,
    Service,
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorKind::Arrival => f.write_str("arrival"),
            GeneratorKind::Service => f.write_str("service"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),

    #[error("{kind} generator at {node} returned {output} for input {input}; output must be finite and later than input")]
    NonMonotonicGenerator {
        node:   NodeId,
        kind:   GeneratorKind,
        input:  SimTime,
        output: f64,
    },

    #[error("{edge} ({edge_type}) was not declared open at initialize")]
    ClosedEdge { edge: EdgeId, edge_type: EdgeType },

    #[error("{0} does not exist in the topology")]
    UnknownEdge(EdgeId),

    #[error("cannot inject at {at}: simulation clock is already at {now}")]
    InjectInPast { at: SimTime, now: SimTime },

    #[error("arrival stream {0} does not exist")]
    UnknownStream(u32),

    #[error("node {0} has no arrival process")]
    NoArrivalProcess(NodeId),

    #[error("arrival process of node {0} is already running")]
    ArrivalsAlreadyStarted(NodeId),

    #[error("invalid {what} parameter: {value}")]
    InvalidParameter { what: &'static str, value: f64 },

    #[error("simulation has not been initialized")]
    NotInitialized,

    #[error("simulation is already initialized")]
    AlreadyInitialized,

    #[error("simulation halted after a fatal error")]
    Halted,

    #[error("timeline violation: {0}")]
    Timeline(#[from] AgentError),
}

pub type SimResult<T> = Result<T, SimError>;
