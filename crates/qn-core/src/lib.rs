//! `qn-core` — foundational types for the `qnsim` queueing-network simulator.
//!
//! This crate is a dependency of every other `qn-*` crate.  It has no `qn-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `EdgeType`, `AgentKey`            |
//! | [`time`]        | `SimTime`, `SimConfig`                                |
//! | [`class`]       | `ClassTag` (agent population label)                   |
//! | [`rng`]         | `SimRng` (one per simulation run)                     |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod class;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use class::ClassTag;
pub use error::{CoreError, CoreResult};
pub use ids::{AgentKey, EdgeId, EdgeType, NodeId};
pub use rng::SimRng;
pub use time::{SimConfig, SimTime};
