//! Dense agent storage.
//!
//! Agents are appended as they are created and never removed: a departed
//! agent stays in place with `AgentLocation::Departed`, so an `AgentKey` is a
//! stable index for the whole run.  Departed agents leave active tracking
//! through the store's location counts, which every query reads in O(1).

use qn_core::{AgentKey, NodeId, SimTime};

use crate::{Agent, AgentError, AgentId, AgentLocation, AgentResult};

/// Agents per location kind, maintained by [`AgentStore::set_location`].
#[derive(Default, Debug, Clone, Copy)]
struct LocationCounts {
    scheduled:  usize,
    in_transit: usize,
    at_node:    usize,
    departed:   usize,
}

impl LocationCounts {
    fn slot(&mut self, location: AgentLocation) -> &mut usize {
        match location {
            AgentLocation::Scheduled { .. }                          => &mut self.scheduled,
            AgentLocation::InTransit { .. }                          => &mut self.in_transit,
            AgentLocation::Waiting(_) | AgentLocation::InService(_) => &mut self.at_node,
            AgentLocation::Departed                                  => &mut self.departed,
        }
    }
}

/// All agents ever created in a run, indexed by [`AgentKey`].
#[derive(Default, Debug)]
pub struct AgentStore {
    agents: Vec<Agent>,
    counts: LocationCounts,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an agent whose first arrival, at `to`, is still pending, and
    /// return its key.
    pub fn spawn(&mut self, id: AgentId, created_at: SimTime, to: NodeId) -> AgentKey {
        let key = AgentKey(self.agents.len() as u32);
        let location = AgentLocation::Scheduled { to };
        self.agents.push(Agent {
            key,
            id,
            created_at,
            location,
            visits: 0,
        });
        *self.counts.slot(location) += 1;
        key
    }

    pub fn get(&self, key: AgentKey) -> AgentResult<&Agent> {
        self.agents.get(key.index()).ok_or(AgentError::UnknownAgent(key))
    }

    pub fn get_mut(&mut self, key: AgentKey) -> AgentResult<&mut Agent> {
        self.agents.get_mut(key.index()).ok_or(AgentError::UnknownAgent(key))
    }

    /// Move an agent and update the location counts.
    pub fn set_location(&mut self, key: AgentKey, location: AgentLocation) -> AgentResult<()> {
        let agent = self
            .agents
            .get_mut(key.index())
            .ok_or(AgentError::UnknownAgent(key))?;
        let previous = std::mem::replace(&mut agent.location, location);
        *self.counts.slot(previous) -= 1;
        *self.counts.slot(location) += 1;
        Ok(())
    }

    /// Total agents ever created.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Iterator over all agents in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.iter()
    }

    /// Agents that have entered the network and not yet departed a sink:
    /// those at a node plus those routed between nodes.
    pub fn in_flight(&self) -> usize {
        self.counts.at_node + self.counts.in_transit
    }

    /// Agents routed by a departure whose next arrival is still pending.
    /// Agents that have not made their first arrival are counted by
    /// [`awaiting_entry`](Self::awaiting_entry) instead.
    pub fn in_transit(&self) -> usize {
        self.counts.in_transit
    }

    /// Agents drawn from an arrival stream whose first arrival is pending.
    pub fn awaiting_entry(&self) -> usize {
        self.counts.scheduled
    }

    /// Agents that have left the system.
    pub fn completed(&self) -> usize {
        self.counts.departed
    }
}
