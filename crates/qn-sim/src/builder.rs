//! Fluent builder for constructing a [`Scheduler`].

use std::collections::BTreeMap;

use qn_core::{NodeId, SimConfig};
use qn_topology::{Router, Topology, TopologyError, WeightedRouter};
use tracing::debug;

use crate::config::NodeConfig;
use crate::queue::{Capacity, QueueNode};
use crate::scheduler::ArrivalStream;
use crate::{Scheduler, SimResult};

/// Fluent builder for [`Scheduler<R>`].
///
/// # Required inputs
///
/// - [`Topology`]: the node/edge graph
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                               |
/// |-------------------|---------------------------------------|
/// | `.config(c)`      | `SimConfig::default()` (seed 42)      |
/// | `.seed(s)`        | —                                     |
/// | `.node(id, cfg)`  | no configuration (build fails unless the node gets one) |
/// | `.router(r)`      | [`WeightedRouter`]                    |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SchedulerBuilder::new(topology)
///     .seed(7)
///     .node(NodeId(0), NodeConfig::new().arrivals(Exponential::new(2.0)?))
///     .node(NodeId(1), NodeConfig::new().service(Deterministic::new(0.3)?))
///     .build()?;
/// sim.initialize(&[])?;
/// sim.simulate(10_000)?;
/// ```
pub struct SchedulerBuilder<R: Router = WeightedRouter> {
    topology: Topology,
    config:   SimConfig,
    nodes:    BTreeMap<NodeId, NodeConfig>,
    router:   R,
}

impl SchedulerBuilder<WeightedRouter> {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            config: SimConfig::default(),
            nodes:  BTreeMap::new(),
            router: WeightedRouter,
        }
    }
}

impl<R: Router> SchedulerBuilder<R> {
    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for `.config(SimConfig::with_seed(seed))`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Configure one node.  A second call for the same id replaces the first.
    pub fn node(mut self, id: NodeId, config: NodeConfig) -> Self {
        self.nodes.insert(id, config);
        self
    }

    /// Swap the routing policy.
    pub fn router<R2: Router>(self, router: R2) -> SchedulerBuilder<R2> {
        SchedulerBuilder {
            topology: self.topology,
            config:   self.config,
            nodes:    self.nodes,
            router,
        }
    }

    /// Validate node configuration against the topology and return a
    /// scheduler ready for [`initialize`](Scheduler::initialize).
    pub fn build(self) -> SimResult<Scheduler<R>> {
        let SchedulerBuilder { mut topology, config, mut nodes, router } = self;

        // ── Validate configuration references ─────────────────────────────
        for (&id, cfg) in &nodes {
            if !topology.contains(id) {
                return Err(TopologyError::UnknownNode(id).into());
            }
            if cfg.capacity == Some(Capacity::Finite(0)) {
                return Err(TopologyError::InvalidCapacity { node: id, capacity: 0 }.into());
            }
        }

        // ── Fold routing configuration into the graph ─────────────────────
        for (&id, cfg) in &nodes {
            for &(target, weight) in &cfg.weights {
                topology = topology.with_weight(id, target, weight)?;
            }
            if cfg.terminal {
                topology = topology.with_terminal(id)?;
            }
        }

        // ── Queues and arrival streams, in node order ─────────────────────
        let mut queues = Vec::with_capacity(topology.node_count());
        let mut streams = Vec::new();
        for &id in topology.nodes() {
            let NodeConfig { capacity, arrivals, service, class, start_on_initialize, .. } =
                nodes.remove(&id).unwrap_or_default();
            if service.is_none() && arrivals.is_none() {
                return Err(TopologyError::MissingServiceGenerator(id).into());
            }
            let capacity = capacity.unwrap_or(match service {
                Some(_) => Capacity::Finite(1),
                None    => Capacity::Infinite,
            });
            queues.push(QueueNode::new(id, capacity, service));
            if let Some(process) = arrivals {
                streams.push(ArrivalStream::for_node(id, class, process, start_on_initialize));
            }
        }

        debug!(
            nodes   = topology.node_count(),
            edges   = topology.edge_count(),
            sources = streams.len(),
            seed    = config.seed,
            "scheduler built"
        );

        Ok(Scheduler::assemble(config, topology, router, queues, streams))
    }
}
