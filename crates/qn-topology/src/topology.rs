//! Queue-network representation and builder.
//!
//! # Data layout
//!
//! Nodes are kept in ascending `NodeId` order; a node's *slot* is its position
//! in that list.  Outgoing edges use **Compressed Sparse Row (CSR)** format:
//! given the slot `s` of a node, its outgoing edges occupy
//!
//! ```text
//! edges[ node_out_start[s] .. node_out_start[s+1] ]
//! ```
//!
//! The edge table is sorted by `(source, target, edge_type)` and indexed by
//! `EdgeId`, so a node's fan-out is a contiguous scan and edge ids are stable
//! for a given declaration regardless of insertion order.

use std::collections::{BTreeMap, BTreeSet};

use qn_core::{ClassTag, EdgeId, EdgeType, NodeId};

use crate::{TopologyError, TopologyResult};

/// Edge type used by [`Topology::from_adjacency`] when the edge-type map has
/// no entry for an adjacency pair.
pub const DEFAULT_EDGE_TYPE: EdgeType = EdgeType(0);

// ── Edge ──────────────────────────────────────────────────────────────────────

/// A directed, typed routing link.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source:    NodeId,
    pub target:    NodeId,
    pub edge_type: EdgeType,
    /// Relative routing weight among the source's candidate edges.
    pub weight:    f64,
}

// ── Topology ──────────────────────────────────────────────────────────────────

/// Directed multigraph of queue nodes in CSR format.
///
/// Do not construct directly; use [`TopologyBuilder`] or
/// [`Topology::from_adjacency`].  The `with_*` methods consume the topology
/// and are meant for the scheduler builder, which folds per-node routing
/// configuration in before the simulation takes ownership.
#[derive(Debug, Clone)]
pub struct Topology {
    /// All nodes, ascending.
    nodes: Vec<NodeId>,

    /// CSR row pointer, length `nodes.len() + 1`.
    node_out_start: Vec<u32>,

    /// Sorted edge table, indexed by `EdgeId`.
    edges: Vec<Edge>,

    /// Edge types reserved for one agent class.
    class_channels: BTreeMap<EdgeType, ClassTag>,

    /// Nodes explicitly marked as sinks even though they have out-edges.
    terminal: BTreeSet<NodeId>,
}

impl Topology {
    /// Build from an adjacency mapping `node → [targets]` plus an edge-type
    /// mapping `source → {target: type}`.
    ///
    /// Every key and every target becomes a node, so sinks need not be listed
    /// as keys.  Pairs missing from `edge_types` get [`DEFAULT_EDGE_TYPE`]; an
    /// `edge_types` entry for a pair absent from `adjacency` is rejected.
    pub fn from_adjacency(
        adjacency:  &BTreeMap<NodeId, Vec<NodeId>>,
        edge_types: &BTreeMap<NodeId, BTreeMap<NodeId, EdgeType>>,
    ) -> TopologyResult<Topology> {
        for (&source, targets) in edge_types {
            for &target in targets.keys() {
                let declared = adjacency
                    .get(&source)
                    .is_some_and(|adj| adj.contains(&target));
                if !declared {
                    return Err(TopologyError::DanglingEdgeType { source_node: source, target });
                }
            }
        }

        let mut b = TopologyBuilder::new();
        for (&source, targets) in adjacency {
            b.add_node(source);
            for &target in targets {
                b.add_node(target);
            }
        }
        for (&source, targets) in adjacency {
            for &target in targets {
                let edge_type = edge_types
                    .get(&source)
                    .and_then(|m| m.get(&target))
                    .copied()
                    .unwrap_or(DEFAULT_EDGE_TYPE);
                b.add_edge(source, target, edge_type);
            }
        }
        b.build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in ascending order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Position of `node` in [`nodes`](Self::nodes), or `None` if unknown.
    #[inline]
    pub fn slot(&self, node: NodeId) -> Option<usize> {
        self.nodes.binary_search(&node).ok()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.slot(node).is_some()
    }

    // ── Edges ─────────────────────────────────────────────────────────────

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    /// All edges in `EdgeId` order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, e)| (EdgeId(i as u32), e))
    }

    /// Outgoing edges of `node`, in `(target, edge_type)` order.  Empty for
    /// unknown nodes.
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        let range = match self.slot(node) {
            Some(s) => self.node_out_start[s] as usize..self.node_out_start[s + 1] as usize,
            None    => 0..0,
        };
        range.map(|i| (EdgeId(i as u32), &self.edges[i]))
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        match self.slot(node) {
            Some(s) => (self.node_out_start[s + 1] - self.node_out_start[s]) as usize,
            None    => 0,
        }
    }

    /// First edge `source → target` of any type.
    pub fn find_edge(&self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        self.out_edges(source)
            .find(|(_, e)| e.target == target)
            .map(|(id, _)| id)
    }

    /// `true` if `node` has any incoming edge.
    pub fn has_in_edges(&self, node: NodeId) -> bool {
        self.edges.iter().any(|e| e.target == node)
    }

    /// `true` if agents departing `node` leave the system.
    pub fn is_sink(&self, node: NodeId) -> bool {
        self.terminal.contains(&node) || self.out_degree(node) == 0
    }

    /// The class an edge type is reserved for, if any.
    pub fn class_of(&self, edge_type: EdgeType) -> Option<&ClassTag> {
        self.class_channels.get(&edge_type)
    }

    // ── Post-build configuration ──────────────────────────────────────────

    /// Set the routing weight of every edge `source → target`.
    pub fn with_weight(mut self, source: NodeId, target: NodeId, weight: f64) -> TopologyResult<Self> {
        validate_weight(source, target, weight)?;
        let Some(s) = self.slot(source) else {
            return Err(TopologyError::UnknownNode(source));
        };
        let range = self.node_out_start[s] as usize..self.node_out_start[s + 1] as usize;
        let mut found = false;
        for e in &mut self.edges[range] {
            if e.target == target {
                e.weight = weight;
                found = true;
            }
        }
        if !found {
            return Err(TopologyError::UnknownWeightTarget { source_node: source, target });
        }
        Ok(self)
    }

    /// Mark `node` as a sink regardless of its out-edges.
    pub fn with_terminal(mut self, node: NodeId) -> TopologyResult<Self> {
        if !self.contains(node) {
            return Err(TopologyError::UnknownNode(node));
        }
        self.terminal.insert(node);
        Ok(self)
    }
}

fn validate_weight(source: NodeId, target: NodeId, weight: f64) -> TopologyResult<()> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(TopologyError::InvalidWeight { source_node: source, target, weight })
    }
}

// ── TopologyBuilder ───────────────────────────────────────────────────────────

/// Construct a [`Topology`] incrementally, then call [`build`](Self::build).
///
/// Nodes and edges may be added in any order; `build()` validates references,
/// sorts edges by source and constructs the CSR arrays.
///
/// # Example
///
/// ```
/// use qn_core::{EdgeType, NodeId};
/// use qn_topology::TopologyBuilder;
///
/// let mut b = TopologyBuilder::new();
/// b.add_node(NodeId(0)).add_node(NodeId(1));
/// b.add_edge(NodeId(0), NodeId(1), EdgeType(1));
/// let topo = b.build().unwrap();
/// assert_eq!(topo.node_count(), 2);
/// assert!(topo.is_sink(NodeId(1)));
/// ```
#[derive(Default)]
pub struct TopologyBuilder {
    nodes:          BTreeSet<NodeId>,
    raw_edges:      Vec<Edge>,
    class_channels: BTreeMap<EdgeType, ClassTag>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node.  Declaring the same id twice is a no-op.
    pub fn add_node(&mut self, id: NodeId) -> &mut Self {
        self.nodes.insert(id);
        self
    }

    /// Add a directed edge with unit weight.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, edge_type: EdgeType) -> &mut Self {
        self.add_weighted_edge(source, target, edge_type, 1.0)
    }

    /// Add a directed edge with an explicit routing weight.
    pub fn add_weighted_edge(
        &mut self,
        source:    NodeId,
        target:    NodeId,
        edge_type: EdgeType,
        weight:    f64,
    ) -> &mut Self {
        self.raw_edges.push(Edge { source, target, edge_type, weight });
        self
    }

    /// Reserve `edge_type` for agents of `class`.  The router prefers such
    /// edges for matching agents.
    pub fn class_channel(&mut self, edge_type: EdgeType, class: ClassTag) -> &mut Self {
        self.class_channels.insert(edge_type, class);
        self
    }

    /// Validate and build.
    pub fn build(self) -> TopologyResult<Topology> {
        let nodes: Vec<NodeId> = self.nodes.into_iter().collect();

        let mut edges = self.raw_edges;
        for e in &edges {
            if nodes.binary_search(&e.source).is_err() || nodes.binary_search(&e.target).is_err() {
                return Err(TopologyError::DanglingEdge { source_node: e.source, target: e.target });
            }
            validate_weight(e.source, e.target, e.weight)?;
        }

        edges.sort_by_key(|e| (e.source, e.target, e.edge_type));
        if let Some(dup) = edges.windows(2).find(|w| {
            (w[0].source, w[0].target, w[0].edge_type) == (w[1].source, w[1].target, w[1].edge_type)
        }) {
            return Err(TopologyError::DuplicateEdge {
                source_node: dup[0].source,
                target:      dup[0].target,
                edge_type:   dup[0].edge_type,
            });
        }

        // ── CSR row pointers ──────────────────────────────────────────────
        let mut node_out_start = Vec::with_capacity(nodes.len() + 1);
        let mut cursor = 0usize;
        for &node in &nodes {
            node_out_start.push(cursor as u32);
            while cursor < edges.len() && edges[cursor].source == node {
                cursor += 1;
            }
        }
        node_out_start.push(edges.len() as u32);

        Ok(Topology {
            nodes,
            node_out_start,
            edges,
            class_channels: self.class_channels,
            terminal:       BTreeSet::new(),
        })
    }
}
