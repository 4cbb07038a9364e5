//! The router: orchestrates registry, address detection, and the shared
//! utterance buffer.
//!
//! Locking discipline, the component's central correctness property: the
//! registry (agent table, last speaker, puppet overrides) sits behind one
//! `std::sync::RwLock`, the utterance buffer behind its own independent
//! `Mutex`, and **no lock is ever held across a call into a collaborator**.
//! Uses synchronous locks intentionally: every acquisition is a brief map
//! or vec operation that never spans an `.await` point. Route resolution
//! computes and copies everything it needs (target handle, context
//! snapshot) inside the critical section, releases it, and only then
//! performs the context-injection call whose latency this layer does not
//! control.
//!
//! Mutations and the resolution phase of concurrent routes are totally
//! ordered by the registry lock. The injection phase is explicitly not
//! serialized: two concurrent routes to the same agent may interleave at
//! the engine boundary, and any ordering needed there belongs to the
//! engine.

use crate::address;
use crate::agent::NpcAgent;
use crate::buffer::UtteranceBuffer;
use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::registry::{AgentSnapshot, Registry};
use chrono::{Duration, Utc};
use greenroom_types::{ContextUpdate, HeardUtterance, SceneUpdate, Utterance};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Routes utterances to NPC agents and maintains the shared session state.
///
/// All methods take `&self`; share the router as `Arc<Router>` across
/// however many concurrent callers the session has.
pub struct Router {
    registry: RwLock<Registry>,
    buffer: Mutex<UtteranceBuffer>,
    context_limit: usize,
}

impl Router {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            registry: RwLock::new(Registry::new()),
            buffer: Mutex::new(UtteranceBuffer::new(
                config.buffer.max_entries,
                Duration::seconds(config.buffer.max_age_secs as i64),
            )),
            context_limit: config.context.max_entries,
        }
    }

    /// Routes one utterance to its target agent.
    ///
    /// Resolves a target through the address detector, re-validates it
    /// against the live table, updates the last-speaker continuity state,
    /// records the utterance in the shared buffer, and injects the buffered
    /// context (minus the target's own lines) into the target's engine
    /// before handing the agent back for the conversational turn.
    ///
    /// Returns [`DispatchError::NoTarget`] when resolution finds no valid
    /// candidate; callers should ask the player to clarify, not treat it
    /// as a fault.
    pub async fn route(
        &self,
        cancel: &CancellationToken,
        speaker_id: &str,
        utterance: &Utterance,
    ) -> Result<Arc<dyn NpcAgent>, DispatchError> {
        if cancel.is_cancelled() {
            return Err(DispatchError::Cancelled);
        }

        let (agent, target, context) = {
            let mut registry = self.registry_write()?;
            let target = address::resolve_target(&registry, speaker_id, &utterance.text)
                .ok_or(DispatchError::NoTarget)?;

            // Re-validate: guards the race between detection and validation.
            let entry = registry
                .get(&target)
                .filter(|entry| !entry.muted)
                .ok_or(DispatchError::NoTarget)?;
            let agent = Arc::clone(&entry.agent);
            registry.set_last_speaker(&target);

            // Snapshot context before the current line is recorded: an
            // utterance is context for later turns, never for its own.
            let context = {
                let mut buffer = self.buffer_lock()?;
                let recent = buffer.recent(Some(target.as_str()), self.context_limit);
                buffer.add(HeardUtterance::player(
                    speaker_id,
                    &utterance.speaker_name,
                    &utterance.text,
                    Utc::now(),
                ));
                recent
            };
            (agent, target, context)
        };

        debug!(
            speaker = speaker_id,
            target = %target,
            context_entries = context.len(),
            "routed utterance"
        );

        if !context.is_empty() {
            agent
                .engine()
                .inject_context(ContextUpdate { entries: context }, cancel.clone())
                .await
                .map_err(|source| DispatchError::ContextInjection {
                    agent: target,
                    source,
                })?;
        }

        Ok(agent)
    }

    /// Records a line produced by an NPC agent into the shared buffer so
    /// other agents can react to it on their next turn.
    pub fn record_npc_utterance(
        &self,
        npc_id: &str,
        npc_name: &str,
        text: &str,
    ) -> Result<(), DispatchError> {
        self.buffer_lock()?
            .add(HeardUtterance::npc(npc_id, npc_name, text, Utc::now()));
        Ok(())
    }

    /// Snapshot of every registered agent, muted included.
    pub fn active_agents(&self) -> Result<Vec<AgentSnapshot>, DispatchError> {
        Ok(self.registry_read()?.snapshot())
    }

    pub fn add_agent(&self, agent: Arc<dyn NpcAgent>) -> Result<(), DispatchError> {
        let id = agent.id().to_string();
        let name = agent.name().to_string();
        self.registry_write()?.add(agent)?;
        info!(agent_id = %id, name = %name, "registered agent");
        Ok(())
    }

    pub fn remove_agent(&self, id: &str) -> Result<(), DispatchError> {
        self.registry_write()?.remove(id)?;
        info!(agent_id = %id, "removed agent");
        Ok(())
    }

    pub fn mute_agent(&self, id: &str) -> Result<(), DispatchError> {
        self.registry_write()?.set_muted(id, true)?;
        info!(agent_id = %id, "muted agent");
        Ok(())
    }

    pub fn unmute_agent(&self, id: &str) -> Result<(), DispatchError> {
        self.registry_write()?.set_muted(id, false)?;
        info!(agent_id = %id, "unmuted agent");
        Ok(())
    }

    /// Records or clears a DM puppet override; `None` clears.
    pub fn set_puppet(
        &self,
        speaker_id: &str,
        target_id: Option<&str>,
    ) -> Result<(), DispatchError> {
        self.registry_write()?.set_puppet(speaker_id, target_id)?;
        match target_id {
            Some(target) => info!(speaker = speaker_id, target = %target, "puppet override set"),
            None => info!(speaker = speaker_id, "puppet override cleared"),
        }
        Ok(())
    }

    /// Pushes a scene update to every unmuted agent, best effort.
    ///
    /// Every agent is attempted regardless of individual failures; if any
    /// fail, the combined [`DispatchError::SceneBroadcast`] names them all.
    pub async fn broadcast_scene(
        &self,
        cancel: &CancellationToken,
        scene: &SceneUpdate,
    ) -> Result<(), DispatchError> {
        let targets: Vec<Arc<dyn NpcAgent>> = {
            let registry = self.registry_read()?;
            registry
                .snapshot()
                .into_iter()
                .filter(|snapshot| !snapshot.muted)
                .map(|snapshot| snapshot.agent)
                .collect()
        };

        let mut failures = Vec::new();
        for agent in targets {
            if let Err(err) = agent.update_scene(scene, cancel.clone()).await {
                warn!(agent_id = agent.id(), "scene update failed: {}", err);
                failures.push(format!("{}: {}", agent.id(), err));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::SceneBroadcast { failures })
        }
    }

    /// Full copy of the shared utterance log, for diagnostics.
    pub fn utterance_log(&self) -> Result<Vec<HeardUtterance>, DispatchError> {
        Ok(self.buffer_lock()?.list())
    }

    fn registry_write(&self) -> Result<RwLockWriteGuard<'_, Registry>, DispatchError> {
        self.registry
            .write()
            .map_err(|_| DispatchError::StatePoisoned)
    }

    fn registry_read(&self) -> Result<RwLockReadGuard<'_, Registry>, DispatchError> {
        self.registry
            .read()
            .map_err(|_| DispatchError::StatePoisoned)
    }

    fn buffer_lock(&self) -> Result<MutexGuard<'_, UtteranceBuffer>, DispatchError> {
        self.buffer.lock().map_err(|_| DispatchError::StatePoisoned)
    }
}
