//! `qn-sim` — discrete-event engine for the `qnsim` queueing-network simulator.
//!
//! # Event loop
//!
//! ```text
//! initialize(open edge types)
//!   seed the first arrival of every source node
//! simulate(n):
//!   repeat n times:
//!     pop the earliest event       (time, then Departure < ServiceStart < Arrival)
//!     Arrival       → admit to a server or the FIFO waiting line
//!     ServiceStart  → draw the departure time from the service process
//!     Departure     → free the server, route onward or seal at a sink
//! ```
//!
//! Between `simulate` calls, callers may [`inject`](Scheduler::inject) agents
//! at open edges or [`start_arrivals`](Scheduler::start_arrivals) of dormant
//! sources.  All state lives in one owned [`Scheduler`], so independent runs
//! can proceed side by side on different threads.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use qn_sim::{Deterministic, Exponential, NodeConfig, SchedulerBuilder};
//!
//! let mut sim = SchedulerBuilder::new(topology)
//!     .seed(42)
//!     .node(NodeId(0), NodeConfig::new().arrivals(Exponential::new(1.0)?))
//!     .node(NodeId(1), NodeConfig::new().service(Deterministic::new(0.5)?))
//!     .build()?;
//! sim.initialize(&[])?;
//! let processed = sim.simulate(1_000)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod event;
pub mod generator;
pub mod observer;
pub mod queue;
pub mod scheduler;


pub use builder::SchedulerBuilder;
pub use config::NodeConfig;
pub use error::{GeneratorKind, SimError, SimResult};
pub use event::{Event, EventKind, EventQueue};
pub use generator::{ArrivalProcess, Deterministic, Exponential, PoissonRandomMeasure, ServiceProcess};
pub use observer::{NoopObserver, SimObserver};
pub use queue::{Capacity, NodeSnapshot, NodeState, QueueNode};
pub use scheduler::{Injection, Scheduler};
