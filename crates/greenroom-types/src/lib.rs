//! Shared types for the Greenroom platform.
//!
//! This crate provides the boundary types that cross between the dispatch
//! layer and its collaborators: inbound utterances, the shared conversation
//! log records injected into NPC engines, and scene update payloads.
//!
//! No crate in the workspace depends on anything *except* `greenroom-types`
//! for cross-cutting type definitions. This keeps the dependency graph clean
//! and prevents circular dependencies.

pub mod scene;
pub mod utterance;

pub use scene::SceneUpdate;
pub use utterance::{ContextUpdate, HeardUtterance, Utterance};
