//! Scenario parameters and network construction.
//!
//! Node layout (both variants):
//!
//! ```text
//! slow source (0) ─type 1─┐
//!                          ├─► first server (2) ─type 3─► second server (3)
//! fast source (1) ─type 2─┘                               (two-node only)
//! ```
//!
//! Sources are pass-through: each new agent is forwarded at the instant it
//! is created.  Servers are single deterministic M/D/1 stations.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use qn_core::{ClassTag, EdgeType, NodeId};
use qn_sim::{Deterministic, NodeConfig, PoissonRandomMeasure, Scheduler, SchedulerBuilder};
use qn_topology::Topology;

pub const SLOW: ClassTag = ClassTag::from_static("slow");
pub const FAST: ClassTag = ClassTag::from_static("fast");

pub const SLOW_SOURCE:   NodeId = NodeId(0);
pub const FAST_SOURCE:   NodeId = NodeId(1);
pub const FIRST_SERVER:  NodeId = NodeId(2);
pub const SECOND_SERVER: NodeId = NodeId(3);

/// Edge types through which sources feed the network.
pub const ENTRY_EDGES: [EdgeType; 2] = [EdgeType(1), EdgeType(2)];

/// One experiment.  Rates are arrivals per second; service values are
/// constant service times in seconds.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub nodes:          u8,
    pub slow_rate:      f64,
    pub fast_rate:      f64,
    pub service:        f64,
    pub second_service: f64,
    pub events:         u64,
    pub seed:           u64,
}

/// A JSON scenario file.  Every field is optional; absent ones come from
/// the preset for the chosen node count.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    pub nodes:          Option<u8>,
    pub slow_rate:      Option<f64>,
    pub fast_rate:      Option<f64>,
    pub service:        Option<f64>,
    pub second_service: Option<f64>,
    pub events:         Option<u64>,
    pub seed:           Option<u64>,
}

impl ScenarioFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// Merge over `Scenario::preset`.  `nodes` overrides the file's node
    /// count and so also picks the preset.
    pub fn resolve(self, nodes: Option<u8>) -> Scenario {
        let base = Scenario::preset(nodes.or(self.nodes).unwrap_or(1));
        Scenario {
            nodes:          base.nodes,
            slow_rate:      self.slow_rate.unwrap_or(base.slow_rate),
            fast_rate:      self.fast_rate.unwrap_or(base.fast_rate),
            service:        self.service.unwrap_or(base.service),
            second_service: self.second_service.unwrap_or(base.second_service),
            events:         self.events.unwrap_or(base.events),
            seed:           self.seed.unwrap_or(base.seed),
        }
    }
}

impl Scenario {
    /// The published one-node and two-node experiments.  Any other node
    /// count keeps the one-node rates but is left for `validate` to reject.
    pub fn preset(nodes: u8) -> Self {
        match nodes {
            2 => Self {
                nodes:          2,
                slow_rate:      333.333_33,
                fast_rate:      63_333.333_4,
                service:        0.000_012,
                second_service: 0.001_313,
                events:         20_000,
                seed:           42,
            },
            _ => Self {
                nodes,
                slow_rate:      3_333.333_33,
                fast_rate:      63_333.333_4,
                service:        0.000_012,
                second_service: 0.001_313,
                events:         200,
                seed:           42,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=2).contains(&self.nodes) {
            bail!("nodes must be 1 or 2, got {}", self.nodes);
        }
        for (what, v) in [
            ("slow_rate", self.slow_rate),
            ("fast_rate", self.fast_rate),
            ("service", self.service),
            ("second_service", self.second_service),
        ] {
            if !(v.is_finite() && v > 0.0) {
                bail!("{what} must be a positive number, got {v}");
            }
        }
        Ok(())
    }

    pub fn topology(&self) -> Result<Topology> {
        let mut adjacency = BTreeMap::from([
            (SLOW_SOURCE, vec![FIRST_SERVER]),
            (FAST_SOURCE, vec![FIRST_SERVER]),
        ]);
        let mut edge_types = BTreeMap::from([
            (SLOW_SOURCE, BTreeMap::from([(FIRST_SERVER, ENTRY_EDGES[0])])),
            (FAST_SOURCE, BTreeMap::from([(FIRST_SERVER, ENTRY_EDGES[1])])),
        ]);
        if self.nodes == 2 {
            adjacency.insert(FIRST_SERVER, vec![SECOND_SERVER]);
            edge_types.insert(FIRST_SERVER, BTreeMap::from([(SECOND_SERVER, EdgeType(3))]));
        }
        Ok(Topology::from_adjacency(&adjacency, &edge_types)?)
    }

    /// A ready-to-initialize scheduler for one replication.
    pub fn build(&self, seed: u64) -> Result<Scheduler> {
        let mut builder = SchedulerBuilder::new(self.topology()?)
            .seed(seed)
            .node(SLOW_SOURCE, source(self.slow_rate, SLOW)?)
            .node(FAST_SOURCE, source(self.fast_rate, FAST)?)
            .node(FIRST_SERVER, NodeConfig::new().service(Deterministic::new(self.service)?));
        if self.nodes == 2 {
            builder = builder.node(
                SECOND_SERVER,
                NodeConfig::new().service(Deterministic::new(self.second_service)?),
            );
        }
        Ok(builder.build()?)
    }
}

/// Pass-through source emitting a homogeneous Poisson stream of `class`.
fn source(rate: f64, class: ClassTag) -> Result<NodeConfig> {
    let arrivals = PoissonRandomMeasure::new(move |_t: f64| rate, rate)?;
    Ok(NodeConfig::new().arrivals(arrivals).agent_class(class))
}
