//! Topology and node-configuration validation errors.

use thiserror::Error;

use qn_core::{EdgeType, NodeId};

/// Construction-time errors.  All of them are fatal: a network that fails
/// validation is never simulated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TopologyError {
    #[error("node {0} is not part of the topology")]
    UnknownNode(NodeId),

    #[error("edge {source_node} -> {target} references an undeclared node")]
    DanglingEdge { source_node: NodeId, target: NodeId },

    #[error("edge {source_node} -> {target} of {edge_type} declared twice")]
    DuplicateEdge {
        source_node: NodeId,
        target:      NodeId,
        edge_type:   EdgeType,
    },

    #[error("edge type given for {source_node} -> {target}, but no such edge exists")]
    DanglingEdgeType { source_node: NodeId, target: NodeId },

    #[error("node {0} receives routed agents but defines no service generator")]
    MissingServiceGenerator(NodeId),

    #[error("node {node} has invalid capacity {capacity}: must be at least 1")]
    InvalidCapacity { node: NodeId, capacity: u32 },

    #[error("routing weight {weight} on {source_node} -> {target} must be finite and positive")]
    InvalidWeight {
        source_node: NodeId,
        target:      NodeId,
        weight:      f64,
    },

    #[error("routing weight given for {source_node} -> {target}, but no such edge exists")]
    UnknownWeightTarget { source_node: NodeId, target: NodeId },
}

pub type TopologyResult<T> = Result<T, TopologyError>;
