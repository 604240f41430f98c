//! `qn-topology` — the immutable queue-network graph and routing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`topology`] | `Topology` (CSR edge table), `TopologyBuilder`, `Edge`       |
//! | [`router`]   | `Router` trait, `RouteDecision`, `WeightedRouter`            |
//! | [`error`]    | `TopologyError`, `TopologyResult<T>`                         |

pub mod error;
pub mod router;
pub mod topology;


pub use error::{TopologyError, TopologyResult};
pub use router::{RouteDecision, Router, WeightedRouter};
pub use topology::{Edge, Topology, TopologyBuilder};
