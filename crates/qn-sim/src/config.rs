//! Per-node configuration.

use qn_core::{ClassTag, NodeId};

use crate::generator::{ArrivalProcess, ServiceProcess};
use crate::queue::Capacity;

/// Everything the scheduler needs to know about one node beyond the graph.
///
/// All fields are optional, but a node without an arrival process must have a
/// service process.  A node with an arrival process and no service process is
/// a pass-through source: its agents leave at the instant they are created.
///
/// | Method                     | Default                                      |
/// |----------------------------|----------------------------------------------|
/// | `.servers(n)`              | 1, or infinite for pass-through sources      |
/// | `.arrivals(p)`             | none (node only receives routed agents)     |
/// | `.service(p)`              | none                                         |
/// | `.agent_class(tag)`        | `ClassTag::DEFAULT`                          |
/// | `.routing_weight(t, w)`    | every out-edge weighted as declared          |
/// | `.terminal()`              | sink only if the node has no out-edges       |
/// | `.start_on_initialize(b)`  | `true`                                       |
///
/// # Example
///
/// ```rust,ignore
/// let source = NodeConfig::new()
///     .arrivals(Exponential::new(3_333.3)?)
///     .agent_class(ClassTag::from_static("slow"));
/// let queue = NodeConfig::new().service(Deterministic::new(0.000012)?);
/// ```
pub struct NodeConfig {
    pub(crate) capacity:            Option<Capacity>,
    pub(crate) arrivals:            Option<Box<dyn ArrivalProcess>>,
    pub(crate) service:             Option<Box<dyn ServiceProcess>>,
    pub(crate) class:               ClassTag,
    pub(crate) weights:             Vec<(NodeId, f64)>,
    pub(crate) terminal:            bool,
    pub(crate) start_on_initialize: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            capacity:            None,
            arrivals:            None,
            service:             None,
            class:               ClassTag::DEFAULT,
            weights:             Vec::new(),
            terminal:            false,
            start_on_initialize: true,
        }
    }
}

impl NodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parallel servers.  Zero is rejected at build time.
    pub fn servers(mut self, n: u32) -> Self {
        self.capacity = Some(Capacity::Finite(n));
        self
    }

    /// Make this an infinite-server (pure delay) node.
    pub fn infinite_servers(mut self) -> Self {
        self.capacity = Some(Capacity::Infinite);
        self
    }

    /// Attach an exogenous arrival process.  Each agent it creates enters the
    /// network at this node.
    pub fn arrivals(mut self, process: impl ArrivalProcess + 'static) -> Self {
        self.arrivals = Some(Box::new(process));
        self
    }

    pub fn service(mut self, process: impl ServiceProcess + 'static) -> Self {
        self.service = Some(Box::new(process));
        self
    }

    /// Class tag given to agents created by this node's arrival process.
    pub fn agent_class(mut self, class: ClassTag) -> Self {
        self.class = class;
        self
    }

    /// Override the routing weight of the edges to `target`.
    pub fn routing_weight(mut self, target: NodeId, weight: f64) -> Self {
        self.weights.push((target, weight));
        self
    }

    /// Agents departing this node leave the system even if it has out-edges.
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    /// With `false`, the arrival process stays dormant until
    /// [`Scheduler::start_arrivals`](crate::Scheduler::start_arrivals).
    pub fn start_on_initialize(mut self, start: bool) -> Self {
        self.start_on_initialize = start;
        self
    }
}
