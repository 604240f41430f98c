//! The `Scheduler` and its event loop.

use std::collections::BTreeSet;

use qn_agent::{AgentHistory, AgentId, AgentLocation, AgentStore, DataRecorder};
use qn_core::{AgentKey, ClassTag, EdgeId, EdgeType, NodeId, SimConfig, SimRng, SimTime};
use qn_topology::{RouteDecision, Router, Topology, TopologyError, WeightedRouter};
use tracing::{debug, info, trace, warn};

use crate::error::GeneratorKind;
use crate::event::{Event, EventKind, EventQueue};
use crate::generator::ArrivalProcess;
use crate::observer::{NoopObserver, SimObserver};
use crate::queue::{Admission, NodeSnapshot, QueueNode, checked_later};
use crate::{SimError, SimResult};

// ── Arrival streams ───────────────────────────────────────────────────────────

/// Where a stream's agents come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamSource {
    /// A source node's own arrival process.
    Node(NodeId),
    /// An injection through an open edge.
    Edge(EdgeId),
}

/// One origin of agents.  Its index in `Scheduler::streams` is the `origin`
/// field of every `AgentId` it creates.
pub(crate) struct ArrivalStream {
    source:        StreamSource,
    /// Node the agents arrive at first.
    target:        NodeId,
    class:         ClassTag,
    /// `None` for one-shot injections.
    process:       Option<Box<dyn ArrivalProcess>>,
    auto_start:    bool,
    started:       bool,
    next_sequence: u32,
}

impl ArrivalStream {
    pub(crate) fn for_node(
        node:       NodeId,
        class:      ClassTag,
        process:    Box<dyn ArrivalProcess>,
        auto_start: bool,
    ) -> Self {
        Self {
            source:        StreamSource::Node(node),
            target:        node,
            class,
            process:       Some(process),
            auto_start,
            started:       false,
            next_sequence: 0,
        }
    }
}

// ── Injection ─────────────────────────────────────────────────────────────────

/// An externally constructed agent to place on an open edge.
///
/// By default the agent arrives at the current simulation time and is a
/// one-off.  With [`recurring`](Self::recurring) its arrival seeds a stream
/// of same-class agents through the same edge.
pub struct Injection {
    class:    ClassTag,
    at:       Option<SimTime>,
    arrivals: Option<Box<dyn ArrivalProcess>>,
}

impl Injection {
    pub fn new(class: ClassTag) -> Self {
        Self { class, at: None, arrivals: None }
    }

    /// Arrival time at the edge's target.  Must not be before the clock.
    pub fn at(mut self, at: SimTime) -> Self {
        self.at = Some(at);
        self
    }

    /// Keep injecting agents of this class, timed by `process`.
    pub fn recurring(mut self, process: impl ArrivalProcess + 'static) -> Self {
        self.arrivals = Some(Box::new(process));
        self
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Configured,
    Running,
    Halted,
}

/// Owns every node, agent and pending event of one simulation run.
///
/// # Event loop
///
/// ```text
/// Arrival(t, a, n)      admit a at n; record arrival
///                       if a server was free → ServiceStart(t, a, n)
///                       if a is fresh from a stream → spawn the next one
/// ServiceStart(t, a, n) record start; Departure(service(t), a, n)
/// Departure(t, a, n)    record departure; hand the server to the head of
///                       the line → ServiceStart(t, head, n)
///                       route a: Arrival(t, a, next) or seal at a sink
/// ```
///
/// A fatal error while processing an event (a generator going backwards in
/// time, or an inconsistent timeline) halts the scheduler: the error is
/// returned once and every later call fails with [`SimError::Halted`].
///
/// Create via [`SchedulerBuilder`][crate::SchedulerBuilder].
pub struct Scheduler<R: Router = WeightedRouter> {
    config:     SimConfig,
    topology:   Topology,
    router:     R,
    rng:        SimRng,

    /// Queue state, indexed by topology slot.
    nodes:      Vec<QueueNode>,
    streams:    Vec<ArrivalStream>,
    events:     EventQueue,
    agents:     AgentStore,
    recorder:   DataRecorder,

    now:        SimTime,
    open_edges: BTreeSet<EdgeType>,
    phase:      Phase,
    processed:  u64,
}

impl<R: Router> Scheduler<R> {
    pub(crate) fn assemble(
        config:   SimConfig,
        topology: Topology,
        router:   R,
        nodes:    Vec<QueueNode>,
        streams:  Vec<ArrivalStream>,
    ) -> Self {
        Self {
            rng:        SimRng::new(config.seed),
            config,
            topology,
            router,
            nodes,
            streams,
            events:     EventQueue::new(),
            agents:     AgentStore::new(),
            recorder:   DataRecorder::new(),
            now:        SimTime::ZERO,
            open_edges: BTreeSet::new(),
            phase:      Phase::Configured,
            processed:  0,
        }
    }

    // ── Control ───────────────────────────────────────────────────────────

    /// Declare which edge types accept injections and seed the first arrival
    /// of every source node configured to start immediately.
    pub fn initialize(&mut self, open_edge_types: &[EdgeType]) -> SimResult<()> {
        match self.phase {
            Phase::Configured => {}
            Phase::Running    => return Err(SimError::AlreadyInitialized),
            Phase::Halted     => return Err(SimError::Halted),
        }
        self.open_edges = open_edge_types.iter().copied().collect();

        let auto: Vec<u32> = self
            .streams
            .iter()
            .enumerate()
            .filter(|(_, s)| s.auto_start)
            .map(|(origin, _)| origin as u32)
            .collect();
        for origin in auto {
            if let Err(e) = self.start_stream(origin) {
                return Err(self.halt(e));
            }
        }
        self.phase = Phase::Running;

        info!(
            seed       = self.config.seed,
            nodes      = self.nodes.len(),
            streams    = self.streams.len(),
            open_edges = self.open_edges.len(),
            pending    = self.events.len(),
            "simulation initialized"
        );
        Ok(())
    }

    /// Process up to `n` events.  Returns how many were processed; fewer
    /// than `n` means the network went quiet.
    pub fn simulate(&mut self, n: u64) -> SimResult<u64> {
        self.simulate_observed(n, &mut NoopObserver)
    }

    /// [`simulate`](Self::simulate) with observer callbacks.
    pub fn simulate_observed<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<u64> {
        self.ensure_running()?;
        let mut processed = 0u64;
        while processed < n {
            let Some(event) = self.events.pop() else { break };
            if let Err(e) = self.dispatch(event, observer) {
                self.processed += processed;
                return Err(self.halt(e));
            }
            processed += 1;
        }
        self.finish_batch(processed, observer);
        Ok(processed)
    }

    /// Process every pending event with `time ≤ until`, then advance the
    /// clock to `until`.
    pub fn simulate_until(&mut self, until: SimTime) -> SimResult<u64> {
        self.simulate_until_observed(until, &mut NoopObserver)
    }

    pub fn simulate_until_observed<O: SimObserver>(
        &mut self,
        until:    SimTime,
        observer: &mut O,
    ) -> SimResult<u64> {
        self.ensure_running()?;
        let mut processed = 0u64;
        while self.events.next_time().is_some_and(|t| t <= until) {
            let Some(event) = self.events.pop() else { break };
            if let Err(e) = self.dispatch(event, observer) {
                self.processed += processed;
                return Err(self.halt(e));
            }
            processed += 1;
        }
        self.now = self.now.max(until);
        self.finish_batch(processed, observer);
        Ok(processed)
    }

    /// Place one agent on an open edge.  Its arrival at the edge's target is
    /// scheduled like any other event.
    pub fn inject(&mut self, edge: EdgeId, injection: Injection) -> SimResult<AgentId> {
        self.ensure_running()?;
        let Some(e) = self.topology.edge(edge) else {
            return Err(SimError::UnknownEdge(edge));
        };
        if !self.open_edges.contains(&e.edge_type) {
            return Err(SimError::ClosedEdge { edge, edge_type: e.edge_type });
        }
        let target = e.target;
        let at = injection.at.unwrap_or(self.now);
        if at < self.now {
            return Err(SimError::InjectInPast { at, now: self.now });
        }

        let origin = self.streams.len() as u32;
        let recurring = injection.arrivals.is_some();
        self.streams.push(ArrivalStream {
            source:        StreamSource::Edge(edge),
            target,
            class:         injection.class,
            process:       injection.arrivals,
            auto_start:    false,
            started:       true,
            next_sequence: 0,
        });
        let key = self.spawn(origin, at)?;
        let id = self.agents.get(key)?.id.clone();

        debug!(agent = %id, %edge, node = %target, %at, recurring, "agent injected");
        Ok(id)
    }

    /// Start the arrival process of a source node that was configured with
    /// `start_on_initialize(false)`.  The first arrival is drawn from the
    /// current clock.
    pub fn start_arrivals(&mut self, node: NodeId) -> SimResult<()> {
        self.ensure_running()?;
        let Some(origin) = self
            .streams
            .iter()
            .position(|s| s.source == StreamSource::Node(node))
        else {
            return Err(SimError::NoArrivalProcess(node));
        };
        if self.streams[origin].started {
            return Err(SimError::ArrivalsAlreadyStarted(node));
        }
        if let Err(e) = self.start_stream(origin as u32) {
            return Err(self.halt(e));
        }
        debug!(%node, now = %self.now, "arrival process started");
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Time of the most recently processed event.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Events processed since construction.
    pub fn events_processed(&self) -> u64 {
        self.processed
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn next_event_time(&self) -> Option<SimTime> {
        self.events.next_time()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn recorder(&self) -> &DataRecorder {
        &self.recorder
    }

    /// Every agent with at least one recorded visit, in `AgentId` order.
    pub fn history(&self) -> impl Iterator<Item = &AgentHistory> + '_ {
        self.recorder.iter_by_id()
    }

    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    pub fn node_snapshot(&self, node: NodeId) -> Option<NodeSnapshot> {
        let slot = self.topology.slot(node)?;
        self.nodes.get(slot).map(QueueNode::snapshot)
    }

    /// Snapshots of every node in `NodeId` order.
    pub fn node_snapshots(&self) -> Vec<NodeSnapshot> {
        self.nodes.iter().map(QueueNode::snapshot).collect()
    }

    /// Agents that have arrived at a node and not yet departed from a sink.
    ///
    /// Always equals the agents held at nodes (busy plus waiting) plus
    /// [`in_transit`](Self::in_transit).
    pub fn in_flight(&self) -> usize {
        self.agents.in_flight()
    }

    /// Agents between a departure and their next arrival.  Routing takes no
    /// time, so each of them arrives at the instant it departed.
    pub fn in_transit(&self) -> usize {
        self.agents.in_transit()
    }

    /// Agents already drawn from an arrival stream or injected whose first
    /// arrival is still pending.  They are not yet in flight.
    pub fn awaiting_entry(&self) -> usize {
        self.agents.awaiting_entry()
    }

    pub fn completed(&self) -> usize {
        self.agents.completed()
    }

    pub fn open_edge_types(&self) -> impl Iterator<Item = EdgeType> + '_ {
        self.open_edges.iter().copied()
    }

    pub fn is_initialized(&self) -> bool {
        self.phase != Phase::Configured
    }

    pub fn is_halted(&self) -> bool {
        self.phase == Phase::Halted
    }

    // ── Event dispatch ────────────────────────────────────────────────────

    fn dispatch<O: SimObserver>(&mut self, event: Event, observer: &mut O) -> SimResult<()> {
        trace!(
            time  = %event.time,
            kind  = ?event.kind,
            node  = %event.node,
            agent = %event.agent,
            "dispatch"
        );
        self.now = event.time;
        match event.kind {
            EventKind::Arrival      => self.on_arrival(event.time, event.node, event.agent)?,
            EventKind::ServiceStart => self.on_service_start(event.time, event.node, event.agent)?,
            EventKind::Departure    => self.on_departure(event.time, event.node, event.agent, observer)?,
        }
        observer.on_event(&event);
        Ok(())
    }

    fn on_arrival(&mut self, t: SimTime, node: NodeId, key: AgentKey) -> SimResult<()> {
        let (admission, queued, total) = self.queue_mut(node)?.admit(key);
        self.recorder.record_arrival(key, node, t, queued, total)?;

        let agent = self.agents.get_mut(key)?;
        let fresh = agent.visits == 0;
        agent.visits += 1;
        let origin = agent.id.origin;
        let location = match admission {
            Admission::Serve => AgentLocation::InService(node),
            Admission::Wait  => AgentLocation::Waiting(node),
        };
        self.agents.set_location(key, location)?;

        if admission == Admission::Serve {
            self.events.push(t, EventKind::ServiceStart, node, key);
        }
        if fresh {
            self.spawn_next(origin, t)?;
        }
        Ok(())
    }

    fn on_service_start(&mut self, t: SimTime, node: NodeId, key: AgentKey) -> SimResult<()> {
        self.recorder.record_service_start(key, t)?;
        let slot = self.slot(node)?;
        let Some(queue) = self.nodes.get_mut(slot) else {
            return Err(TopologyError::UnknownNode(node).into());
        };
        let departure = queue.departure_time(t, &mut self.rng)?;
        self.events.push(departure, EventKind::Departure, node, key);
        Ok(())
    }

    fn on_departure<O: SimObserver>(
        &mut self,
        t:        SimTime,
        node:     NodeId,
        key:      AgentKey,
        observer: &mut O,
    ) -> SimResult<()> {
        self.recorder.record_departure(key, t)?;

        if let Some(next) = self.queue_mut(node)?.release() {
            self.agents.set_location(next, AgentLocation::InService(node))?;
            self.events.push(t, EventKind::ServiceStart, node, next);
        }

        let class = self.agents.get(key)?.id.class.clone();
        match self.router.route(&self.topology, node, &class, &mut self.rng) {
            RouteDecision::Next { target, .. } => {
                self.agents.set_location(key, AgentLocation::InTransit { to: target })?;
                self.events.push(t, EventKind::Arrival, target, key);
            }
            RouteDecision::Sink => {
                self.recorder.seal(key)?;
                self.agents.set_location(key, AgentLocation::Departed)?;
                if let Some(history) = self.recorder.by_key(key) {
                    observer.on_agent_sealed(history);
                }
            }
        }
        Ok(())
    }

    // ── Streams ───────────────────────────────────────────────────────────

    /// Draw a stream's first arrival from the current clock and spawn it.
    fn start_stream(&mut self, origin: u32) -> SimResult<()> {
        let stream = self
            .streams
            .get_mut(origin as usize)
            .ok_or(SimError::UnknownStream(origin))?;
        stream.started = true;
        self.spawn_next(origin, self.now)
    }

    /// If the stream has an arrival process, draw its next arrival after
    /// `after` and spawn the agent for it.
    fn spawn_next(&mut self, origin: u32, after: SimTime) -> SimResult<()> {
        let stream = self
            .streams
            .get_mut(origin as usize)
            .ok_or(SimError::UnknownStream(origin))?;
        let Some(process) = stream.process.as_mut() else {
            return Ok(());
        };
        let raw = process.next_arrival(after, &mut self.rng);
        let at = checked_later(stream.target, GeneratorKind::Arrival, after, raw)?;
        self.spawn(origin, at)?;
        Ok(())
    }

    /// Create the stream's next agent and schedule its arrival at `at`.
    fn spawn(&mut self, origin: u32, at: SimTime) -> SimResult<AgentKey> {
        let stream = self
            .streams
            .get_mut(origin as usize)
            .ok_or(SimError::UnknownStream(origin))?;
        let id = AgentId::new(origin, stream.next_sequence, stream.class.clone());
        stream.next_sequence += 1;
        let target = stream.target;

        let key = self.agents.spawn(id.clone(), at, target);
        self.recorder.register(key, id)?;
        self.events.push(at, EventKind::Arrival, target, key);
        Ok(key)
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn slot(&self, node: NodeId) -> SimResult<usize> {
        self.topology
            .slot(node)
            .ok_or(SimError::Topology(TopologyError::UnknownNode(node)))
    }

    fn queue_mut(&mut self, node: NodeId) -> SimResult<&mut QueueNode> {
        let slot = self.slot(node)?;
        self.nodes
            .get_mut(slot)
            .ok_or(SimError::Topology(TopologyError::UnknownNode(node)))
    }

    fn ensure_running(&self) -> SimResult<()> {
        match self.phase {
            Phase::Running    => Ok(()),
            Phase::Configured => Err(SimError::NotInitialized),
            Phase::Halted     => Err(SimError::Halted),
        }
    }

    fn halt(&mut self, error: SimError) -> SimError {
        warn!(now = %self.now, error = %error, "simulation halted");
        self.phase = Phase::Halted;
        error
    }

    fn finish_batch<O: SimObserver>(&mut self, processed: u64, observer: &mut O) {
        self.processed += processed;
        observer.on_batch_end(processed, self.now);
        info!(
            processed,
            total     = self.processed,
            now       = %self.now,
            in_flight = self.agents.in_flight(),
            pending   = self.events.len(),
            "batch complete"
        );
    }
}
