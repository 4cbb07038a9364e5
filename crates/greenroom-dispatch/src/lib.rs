//! Utterance dispatch for the Greenroom platform.
//!
//! Routes spoken utterances in a multi-party voice session to the correct
//! one of several independently stateful NPC agents, and maintains the
//! minimal cross-agent shared state (who spoke recently, who is muted, who
//! is being puppeted) that keeps a multi-agent conversation coherent in
//! real time.
//!
//! The layer is composed of three parts plus an orchestrator:
//!
//! - [`Registry`] — identity-keyed agent table with per-agent mute flags,
//!   last-speaker continuity, and DM puppet overrides
//! - [`NameIndex`] / [`resolve_target`] — the address-detection heuristic
//!   chain that decides which agent an utterance was meant for
//! - [`UtteranceBuffer`] — bounded (age + count) shared log of recent
//!   utterances supplying cross-agent context
//! - [`Router`] — ties them together and calls out to agent engines,
//!   never while holding a lock
//!
//! Everything is session-scoped and in-memory: no persistence, no
//! cross-process state, no retry policy. Downstream failures are surfaced
//! to the caller, not masked.
//!
//! The conversational machinery behind each agent is an external
//! collaborator reached through the [`NpcAgent`] and [`NpcEngine`] traits.

pub mod address;
pub mod agent;
pub mod buffer;
pub mod config;
pub mod error;
pub mod registry;
pub mod router;

pub use address::{resolve_target, NameIndex};
pub use agent::{NpcAgent, NpcEngine};
pub use buffer::UtteranceBuffer;
pub use config::{BufferConfig, ContextConfig, DispatchConfig};
pub use error::{CollaboratorError, DispatchError};
pub use registry::{AgentEntry, AgentSnapshot, Registry};
pub use router::Router;
