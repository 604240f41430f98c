//! `EventQueue` — the global time-ordered event list.
//!
//! # Ordering
//!
//! Events are totally ordered by
//!
//! 1. `time` (earliest first),
//! 2. `kind`: `Departure < ServiceStart < Arrival`, so servers freed at an
//!    instant are handed to waiting agents before new arrivals at that same
//!    instant are admitted,
//! 3. scheduling sequence number (FIFO among otherwise equal events).
//!
//! The third key makes the order independent of `BinaryHeap` internals, so
//! a run is reproducible event for event.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use qn_core::{AgentKey, NodeId, SimTime};

/// What happens to an agent at a node.  Declaration order is the tie-break
/// priority at equal times.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum EventKind {
    Departure,
    ServiceStart,
    Arrival,
}

/// One scheduled state transition.
#[derive(Copy, Clone, Debug)]
pub struct Event {
    pub time:  SimTime,
    pub kind:  EventKind,
    pub node:  NodeId,
    pub agent: AgentKey,
    seq:       u64,
}

impl Event {
    /// Position in scheduling order; unique within one queue.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    fn key(&self) -> (SimTime, EventKind, u64) {
        (self.time, self.kind, self.seq)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Min-heap of pending events.
#[derive(Default, Debug)]
pub struct EventQueue {
    heap:     BinaryHeap<Reverse<Event>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event.
    pub fn push(&mut self, time: SimTime, kind: EventKind, node: NodeId, agent: AgentKey) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Event { time, kind, node, agent, seq }));
    }

    /// Remove and return the earliest event.
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(e)| e)
    }

    /// The earliest event without removing it.
    pub fn peek(&self) -> Option<&Event> {
        self.heap.peek().map(|Reverse(e)| e)
    }

    /// Time of the earliest event, or `None` if empty.
    pub fn next_time(&self) -> Option<SimTime> {
        self.peek().map(|e| e.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
