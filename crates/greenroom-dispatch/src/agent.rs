//! Collaborator interfaces for NPC agents and their engines.
//!
//! The dispatch layer consumes these traits but never implements them: the
//! conversational machinery behind an agent (STT, LLM, TTS, response
//! synthesis, provider fallback) lives elsewhere. Dispatch only needs an
//! agent's identity, a way to push scene updates, and access to its engine
//! for context injection.

use crate::error::CollaboratorError;
use async_trait::async_trait;
use greenroom_types::{ContextUpdate, SceneUpdate};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The conversational engine behind a single NPC agent.
#[async_trait]
pub trait NpcEngine: Send + Sync {
    /// Injects recent cross-party utterances into the engine so the agent
    /// can react coherently to what others just said.
    ///
    /// Implementations must honor `cancel`: an in-flight injection should
    /// abort promptly when the token fires.
    async fn inject_context(
        &self,
        update: ContextUpdate,
        cancel: CancellationToken,
    ) -> Result<(), CollaboratorError>;
}

/// A handle to a single NPC's conversational agent.
///
/// Each agent owns exactly one underlying engine. Handles are shared as
/// `Arc<dyn NpcAgent>`; the registry keeps one clone and returns others to
/// callers performing conversational turns.
#[async_trait]
pub trait NpcAgent: Send + Sync {
    /// Stable identity of the agent, unique within a session.
    fn id(&self) -> &str;

    /// Display name the agent is addressed by (e.g. "Grimjaw the Blacksmith").
    fn name(&self) -> &str;

    /// The engine used for context injection ahead of a turn.
    fn engine(&self) -> Arc<dyn NpcEngine>;

    /// Pushes a scene change to the agent.
    async fn update_scene(
        &self,
        scene: &SceneUpdate,
        cancel: CancellationToken,
    ) -> Result<(), CollaboratorError>;
}

impl fmt::Debug for dyn NpcAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NpcAgent")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}
