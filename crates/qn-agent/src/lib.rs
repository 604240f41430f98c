//! `qn-agent` — agents and their recorded timelines.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`agent`]    | `AgentId` (origin, sequence, class), `Agent`, `AgentLocation` |
//! | [`store`]    | `AgentStore` — dense slab indexed by `AgentKey`              |
//! | [`record`]   | `VisitRecord`, `AgentHistory`, `DataRecorder`, column schema |
//! | [`error`]    | `AgentError`, `AgentResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on ids and visit records.|

pub mod agent;
pub mod error;
pub mod record;
pub mod store;

#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentId, AgentLocation};
pub use error::{AgentError, AgentResult};
pub use record::{AgentHistory, DataRecorder, HISTORY_COLUMNS, VisitRecord};
pub use store::AgentStore;
