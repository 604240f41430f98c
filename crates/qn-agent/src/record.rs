//! Append-only visit recording.
//!
//! # Lifecycle of one visit
//!
//! ```text
//! record_arrival        → (node, arrival, —, —, queued, total)
//! record_service_start  → service_start filled in
//! record_departure      → departure filled in; visit closed
//! seal                  → only after departing a sink; no further writes
//! ```
//!
//! Each step checks the previous one happened and that times never run
//! backwards, so a recorded timeline always satisfies
//! `arrival ≤ service_start ≤ departure`.  Histories are stored densely by
//! `AgentKey` (parallel to [`AgentStore`](crate::AgentStore)) with a
//! `BTreeMap` index for lookup by public [`AgentId`].

use std::collections::BTreeMap;

use qn_core::{AgentKey, ClassTag, NodeId, SimTime};

use crate::{AgentError, AgentId, AgentResult};

/// Column names of a visit record, in the order [`VisitRecord`] fields are
/// exported.
pub const HISTORY_COLUMNS: [&str; 6] = [
    "node_id",
    "arrival_time",
    "service_start_time",
    "departure_time",
    "queue_length_before",
    "total_in_system",
];

// ── VisitRecord ───────────────────────────────────────────────────────────────

/// One agent's stay at one node.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisitRecord {
    pub node:                NodeId,
    pub arrival:             SimTime,
    /// `None` while the agent waits.
    pub service_start:       Option<SimTime>,
    /// `None` until the agent departs.
    pub departure:           Option<SimTime>,
    /// Waiting-line length seen on arrival, counting the agent itself if it
    /// had to wait.
    pub queue_length_before: u32,
    /// Agents at the node (served + waiting) right after this arrival.
    pub total_in_system:     u32,
}

impl VisitRecord {
    pub fn is_open(&self) -> bool {
        self.departure.is_none()
    }

    /// Time spent waiting before service, once service has started.
    pub fn waiting_time(&self) -> Option<f64> {
        self.service_start.map(|s| s.since(self.arrival))
    }
}

// ── AgentHistory ──────────────────────────────────────────────────────────────

/// The ordered visit records of one agent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentHistory {
    pub id:  AgentId,
    records: Vec<VisitRecord>,
    sealed:  bool,
}

impl AgentHistory {
    fn new(id: AgentId) -> Self {
        Self { id, records: Vec::new(), sealed: false }
    }

    pub fn records(&self) -> &[VisitRecord] {
        &self.records
    }

    /// `true` once the agent departed a sink.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Total time in the system: last departure minus first arrival.
    ///
    /// `None` until the last recorded visit has a departure.
    pub fn sojourn_time(&self) -> Option<f64> {
        let first = self.records.first()?;
        let last_departure = self.records.last()?.departure?;
        Some(last_departure.since(first.arrival))
    }

    /// Time between arriving at `from` and departing `to`, using the first
    /// visit to each.
    pub fn time_between(&self, from: NodeId, to: NodeId) -> Option<f64> {
        let start = self.records.iter().find(|r| r.node == from)?.arrival;
        let end = self.records.iter().find(|r| r.node == to)?.departure?;
        Some(end.since(start))
    }

    fn open_visit_mut(&mut self) -> AgentResult<&mut VisitRecord> {
        match self.records.last_mut() {
            Some(r) if r.is_open() => Ok(r),
            _ => Err(AgentError::NoOpenVisit(self.id.clone())),
        }
    }

    fn ensure_writable(&self) -> AgentResult<()> {
        if self.sealed {
            Err(AgentError::Sealed(self.id.clone()))
        } else {
            Ok(())
        }
    }
}

// ── DataRecorder ──────────────────────────────────────────────────────────────

/// Accumulates every agent's visit history for later export.
///
/// The recorder never computes aggregates; it only guarantees the recorded
/// timelines are consistent.
#[derive(Default, Debug)]
pub struct DataRecorder {
    histories: Vec<AgentHistory>,
    by_id:     BTreeMap<AgentId, AgentKey>,
    /// Histories with at least one visit.
    visited:   usize,
}

impl DataRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty history for a freshly created agent.
    ///
    /// Keys must be registered in order, mirroring `AgentStore::spawn`.
    pub fn register(&mut self, key: AgentKey, id: AgentId) -> AgentResult<()> {
        if key.index() != self.histories.len() {
            return Err(AgentError::UnknownAgent(key));
        }
        self.by_id.insert(id.clone(), key);
        self.histories.push(AgentHistory::new(id));
        Ok(())
    }

    /// Open a new visit at `node`.
    pub fn record_arrival(
        &mut self,
        key:                 AgentKey,
        node:                NodeId,
        at:                  SimTime,
        queue_length_before: u32,
        total_in_system:     u32,
    ) -> AgentResult<()> {
        let h = self.history_mut(key)?;
        h.ensure_writable()?;
        if let Some(prev) = h.records.last() {
            let Some(left) = prev.departure else {
                return Err(AgentError::VisitStillOpen {
                    agent:   h.id.clone(),
                    node,
                    open_at: prev.node,
                });
            };
            if at < left {
                return Err(AgentError::OutOfOrder { agent: h.id.clone(), earlier: left, later: at });
            }
        }
        let first_visit = h.records.is_empty();
        h.records.push(VisitRecord {
            node,
            arrival: at,
            service_start: None,
            departure: None,
            queue_length_before,
            total_in_system,
        });
        if first_visit {
            self.visited += 1;
        }
        Ok(())
    }

    /// Fill in the service start of the open visit.
    pub fn record_service_start(&mut self, key: AgentKey, at: SimTime) -> AgentResult<()> {
        let h = self.history_mut(key)?;
        h.ensure_writable()?;
        let id = h.id.clone();
        let visit = h.open_visit_mut()?;
        if visit.service_start.is_some() {
            return Err(AgentError::AlreadyStarted(id));
        }
        if at < visit.arrival {
            return Err(AgentError::OutOfOrder { agent: id, earlier: visit.arrival, later: at });
        }
        visit.service_start = Some(at);
        Ok(())
    }

    /// Close the open visit.
    pub fn record_departure(&mut self, key: AgentKey, at: SimTime) -> AgentResult<()> {
        let h = self.history_mut(key)?;
        h.ensure_writable()?;
        let id = h.id.clone();
        let visit = h.open_visit_mut()?;
        let Some(started) = visit.service_start else {
            return Err(AgentError::NotStarted(id));
        };
        if at < started {
            return Err(AgentError::OutOfOrder { agent: id, earlier: started, later: at });
        }
        visit.departure = Some(at);
        Ok(())
    }

    /// Freeze the agent's history.  Fails if a visit is still open.
    pub fn seal(&mut self, key: AgentKey) -> AgentResult<()> {
        let h = self.history_mut(key)?;
        h.ensure_writable()?;
        if let Some(open) = h.records.last().filter(|r| r.is_open()) {
            return Err(AgentError::SealWithOpenVisit { agent: h.id.clone(), node: open.node });
        }
        h.sealed = true;
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn get(&self, id: &AgentId) -> Option<&AgentHistory> {
        self.by_id.get(id).and_then(|k| self.histories.get(k.index()))
    }

    pub fn by_key(&self, key: AgentKey) -> Option<&AgentHistory> {
        self.histories.get(key.index())
    }

    /// Histories with at least one recorded visit, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentHistory> + '_ {
        self.histories.iter().filter(|h| !h.records.is_empty())
    }

    /// Histories with at least one visit, in `AgentId` order.
    pub fn iter_by_id(&self) -> impl Iterator<Item = &AgentHistory> + '_ {
        self.by_id
            .values()
            .filter_map(|k| self.histories.get(k.index()))
            .filter(|h| !h.records.is_empty())
    }

    /// Histories of one agent class, in creation order.
    pub fn class_histories<'a>(&'a self, class: &'a ClassTag) -> impl Iterator<Item = &'a AgentHistory> + 'a {
        self.iter().filter(move |h| &h.id.class == class)
    }

    /// Number of agents with at least one visit.
    pub fn len(&self) -> usize {
        self.visited
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The column schema as one comma-separated header line.
    pub fn header() -> String {
        HISTORY_COLUMNS.join(",")
    }

    fn history_mut(&mut self, key: AgentKey) -> AgentResult<&mut AgentHistory> {
        self.histories
            .get_mut(key.index())
            .ok_or(AgentError::UnknownAgent(key))
    }
}
