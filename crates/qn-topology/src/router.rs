//! Routing trait and default weighted implementation.
//!
//! # Pluggability
//!
//! `qn-sim` calls routing via the [`Router`] trait, so applications can swap
//! in custom policies (join-shortest-queue, round robin, …) without touching
//! the scheduler.  The default [`WeightedRouter`] covers linear chains and
//! probabilistic fan-out.

use qn_core::{ClassTag, EdgeId, NodeId, SimRng};

use crate::topology::{Edge, Topology};

// ── RouteDecision ─────────────────────────────────────────────────────────────

/// Where an agent departing a node goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The node is a sink; the agent leaves the system.
    Sink,
    /// The agent enters `target` through `edge`.
    Next { edge: EdgeId, target: NodeId },
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing policy.
///
/// Implementations must be `Send` so a scheduler can be moved to a worker
/// thread when replications run in parallel.  Routers hold no mutable state:
/// any randomness must come from the supplied `rng` so runs stay reproducible.
pub trait Router: Send {
    /// Pick the next hop for an agent of `class` departing `from`.
    fn route(
        &self,
        topology: &Topology,
        from:     NodeId,
        class:    &ClassTag,
        rng:      &mut SimRng,
    ) -> RouteDecision;
}

// ── WeightedRouter ────────────────────────────────────────────────────────────

/// Class-aware, weight-proportional routing.
///
/// 1. Sinks (no out-edges, or marked terminal) return [`RouteDecision::Sink`].
/// 2. If any out-edge's type is reserved for the agent's class, only those
///    edges are candidates; otherwise all out-edges are.
/// 3. A single candidate is taken without touching the RNG.  Equal weights
///    draw uniformly; unequal weights draw proportionally.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedRouter;

impl Router for WeightedRouter {
    fn route(
        &self,
        topology: &Topology,
        from:     NodeId,
        class:    &ClassTag,
        rng:      &mut SimRng,
    ) -> RouteDecision {
        if topology.is_sink(from) {
            return RouteDecision::Sink;
        }

        let all: Vec<(EdgeId, &Edge)> = topology.out_edges(from).collect();
        let matching: Vec<(EdgeId, &Edge)> = all
            .iter()
            .copied()
            .filter(|(_, e)| topology.class_of(e.edge_type) == Some(class))
            .collect();
        let candidates = if matching.is_empty() { all } else { matching };

        let (edge, chosen) = match candidates.as_slice() {
            [] => return RouteDecision::Sink,
            [only] => *only,
            many => many[pick(many, rng)],
        };
        RouteDecision::Next { edge, target: chosen.target }
    }
}

/// Index of the chosen candidate.  `candidates` has at least two entries.
fn pick(candidates: &[(EdgeId, &Edge)], rng: &mut SimRng) -> usize {
    let first = candidates[0].1.weight;
    if candidates.iter().all(|(_, e)| e.weight == first) {
        return rng.gen_range(0..candidates.len());
    }

    let total: f64 = candidates.iter().map(|(_, e)| e.weight).sum();
    let mut x = rng.gen_range(0.0..total);
    for (i, (_, e)) in candidates.iter().enumerate() {
        if x < e.weight {
            return i;
        }
        x -= e.weight;
    }
    // Floating-point slack can leave x just above the last bucket.
    candidates.len() - 1
}
