//! The agent registry: ground truth for who exists and who can be talked to.
//!
//! The registry is a plain, unsynchronized table. The [`Router`] owns the
//! lock around it; every mutation here runs inside that exclusive section.
//!
//! [`Router`]: crate::router::Router

use crate::address::NameIndex;
use crate::agent::NpcAgent;
use crate::error::DispatchError;
use std::collections::HashMap;
use std::sync::Arc;

/// A registered agent and its session-local state.
pub struct AgentEntry {
    /// Handle to the agent itself.
    pub agent: Arc<dyn NpcAgent>,
    /// Muted agents are never routed to and receive no scene updates.
    pub muted: bool,
}

/// A point-in-time copy of one registry row, handed out by [`Registry::snapshot`].
#[derive(Clone)]
pub struct AgentSnapshot {
    pub agent: Arc<dyn NpcAgent>,
    pub muted: bool,
}

/// Identity-keyed table of agents plus the cross-agent routing state:
/// the last routed-to speaker and DM puppet overrides.
///
/// Invariant: `last_speaker` and every puppet override target reference an
/// ID present in the table; [`Registry::remove`] clears stale references.
#[derive(Default)]
pub struct Registry {
    agents: HashMap<String, AgentEntry>,
    last_speaker: Option<String>,
    puppets: HashMap<String, String>,
    index: NameIndex,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an agent. Fails if the ID is already taken.
    pub fn add(&mut self, agent: Arc<dyn NpcAgent>) -> Result<(), DispatchError> {
        let id = agent.id().to_string();
        if self.agents.contains_key(&id) {
            return Err(DispatchError::DuplicateAgent(id));
        }
        self.agents.insert(id, AgentEntry { agent, muted: false });
        self.rebuild_index();
        Ok(())
    }

    /// Deregisters an agent and clears any routing state that referenced it.
    pub fn remove(&mut self, id: &str) -> Result<(), DispatchError> {
        if self.agents.remove(id).is_none() {
            return Err(DispatchError::UnknownAgent(id.to_string()));
        }
        if self.last_speaker.as_deref() == Some(id) {
            self.last_speaker = None;
        }
        self.puppets.retain(|_, target| target.as_str() != id);
        self.rebuild_index();
        Ok(())
    }

    /// Sets the muted flag. Repeating the current state is a no-op success.
    pub fn set_muted(&mut self, id: &str, muted: bool) -> Result<(), DispatchError> {
        match self.agents.get_mut(id) {
            Some(entry) => {
                entry.muted = muted;
                Ok(())
            }
            None => Err(DispatchError::UnknownAgent(id.to_string())),
        }
    }

    /// Records or clears a DM puppet override for a speaker.
    ///
    /// `None` clears the speaker's override; otherwise the target must be a
    /// registered agent.
    pub fn set_puppet(
        &mut self,
        speaker_id: &str,
        target_id: Option<&str>,
    ) -> Result<(), DispatchError> {
        match target_id {
            None => {
                self.puppets.remove(speaker_id);
                Ok(())
            }
            Some(target) => {
                if !self.agents.contains_key(target) {
                    return Err(DispatchError::UnknownAgent(target.to_string()));
                }
                self.puppets
                    .insert(speaker_id.to_string(), target.to_string());
                Ok(())
            }
        }
    }

    /// Returns a copy of every registered agent, muted or not. The live
    /// table cannot be reached through the result.
    pub fn snapshot(&self) -> Vec<AgentSnapshot> {
        self.agents
            .values()
            .map(|entry| AgentSnapshot {
                agent: Arc::clone(&entry.agent),
                muted: entry.muted,
            })
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&AgentEntry> {
        self.agents.get(id)
    }

    /// True if `id` is registered and not muted.
    pub fn is_active(&self, id: &str) -> bool {
        self.agents.get(id).is_some_and(|entry| !entry.muted)
    }

    pub fn last_speaker(&self) -> Option<&str> {
        self.last_speaker.as_deref()
    }

    pub fn set_last_speaker(&mut self, id: &str) {
        self.last_speaker = Some(id.to_string());
    }

    pub fn puppet_for(&self, speaker_id: &str) -> Option<&str> {
        self.puppets.get(speaker_id).map(String::as_str)
    }

    /// If exactly one unmuted agent is registered, returns its ID.
    pub fn sole_active(&self) -> Option<&str> {
        let mut active = self
            .agents
            .iter()
            .filter(|(_, entry)| !entry.muted)
            .map(|(id, _)| id.as_str());
        match (active.next(), active.next()) {
            (Some(id), None) => Some(id),
            _ => None,
        }
    }

    pub fn index(&self) -> &NameIndex {
        &self.index
    }

    // Wholesale rebuild on every membership change keeps the index
    // trivially consistent; the agent set is session-sized.
    fn rebuild_index(&mut self) {
        self.index = NameIndex::build(
            self.agents
                .iter()
                .map(|(id, entry)| (id.as_str(), entry.agent.name())),
        );
    }
}
