//! Error types for the utterance dispatch layer.

/// Failure type returned by collaborator implementations (NPC agents and
/// their engines). The dispatch layer does not interpret these beyond
/// wrapping them with routing context.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during dispatch operations.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Address resolution found no valid candidate for the utterance.
    ///
    /// A distinguished outcome, not a transport fault: callers should ask
    /// the player to clarify who they are talking to.
    #[error("no agent could be resolved for the utterance")]
    NoTarget,

    /// A management operation referenced an agent ID that is not registered.
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    /// An agent with the same ID is already registered.
    #[error("agent already registered: {0}")]
    DuplicateAgent(String),

    /// The caller's cancellation signal fired before or during routing.
    #[error("routing cancelled")]
    Cancelled,

    /// Context injection into the target agent's engine failed.
    #[error("context injection failed for agent {agent}")]
    ContextInjection {
        agent: String,
        #[source]
        source: CollaboratorError,
    },

    /// One or more agents failed to receive a scene update. Every agent was
    /// attempted; the failures are joined here.
    #[error("scene broadcast failed: {}", .failures.join("; "))]
    SceneBroadcast { failures: Vec<String> },

    /// A dispatch state lock was poisoned by a panicking thread.
    #[error("dispatch state lock poisoned")]
    StatePoisoned,
}

impl DispatchError {
    /// Returns `true` for the no-target resolution outcome.
    ///
    /// Callers branch on this to prompt for clarification instead of
    /// treating the failure as a fault.
    pub fn is_no_target(&self) -> bool {
        matches!(self, Self::NoTarget)
    }
}
